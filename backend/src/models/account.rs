//! Account model
//!
//! A funded identity taking part in an agreement. Owners, brokers and payers
//! are all the same concrete type, distinguished only by a [`Role`] tag.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur during account operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Amount must be non-negative, got {0}")]
    NegativeAmount(i64),
}

/// Opaque unique account identifier
///
/// Generated identifiers are UUID v4 strings. Scenario files may also use
/// readable labels ("owner", "broker_1"); uniqueness is enforced by the
/// [`AccountBook`](crate::models::ledger::AccountBook) that issues them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an identifier from an explicit label
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Role an account plays towards an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Deploys and funds agreements
    Owner,
    /// Stakes into agreements and claims allocations
    Broker,
    /// Tops up agreements
    Payer,
}

/// A funded identity with a mutable balance
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::{Account, Role};
///
/// let mut broker = Account::new(Role::Broker, 100_00);
/// broker.debit(50_00).unwrap();
/// assert_eq!(broker.balance(), 50_00);
///
/// broker.credit(25_00);
/// assert_eq!(broker.balance(), 75_00);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    id: AccountId,
    role: Role,

    /// Current balance (i64 cents)
    ///
    /// The type does not forbid negative values; [`Account::debit`] refuses
    /// to overdraw, so a negative balance can only come from construction.
    balance: i64,
}

impl Account {
    /// Create an account with a freshly generated identifier
    pub fn new(role: Role, balance: i64) -> Self {
        Self::with_id(AccountId::generate(), role, balance)
    }

    /// Create an account with an explicit identifier
    pub fn with_id(id: AccountId, role: Role, balance: i64) -> Self {
        Self { id, role, balance }
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Get current balance (i64 cents)
    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Check if the account can afford a debit of `amount`
    pub fn can_pay(&self, amount: i64) -> bool {
        amount <= self.balance
    }

    /// Debit (decrease) balance
    ///
    /// Fails without touching the balance when the amount is negative or
    /// larger than the current balance.
    ///
    /// # Example
    /// ```
    /// use proposal_inverter_core_rs::{Account, AccountError, Role};
    ///
    /// let mut payer = Account::new(Role::Payer, 10_00);
    /// assert_eq!(
    ///     payer.debit(20_00),
    ///     Err(AccountError::InsufficientFunds { required: 20_00, available: 10_00 })
    /// );
    /// assert_eq!(payer.balance(), 10_00);
    /// ```
    pub fn debit(&mut self, amount: i64) -> Result<(), AccountError> {
        if amount < 0 {
            return Err(AccountError::NegativeAmount(amount));
        }
        if !self.can_pay(amount) {
            return Err(AccountError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }

        self.balance -= amount;
        Ok(())
    }

    /// Credit (increase) balance
    ///
    /// # Panics
    /// Panics if `amount` is negative; callers validate amounts first.
    pub fn credit(&mut self, amount: i64) {
        assert!(amount >= 0, "amount must be non-negative");
        self.balance += amount;
    }
}
