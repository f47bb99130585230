//! Account book
//!
//! The identity collaborator: issues account identifiers, holds balances,
//! and doubles as the external broker registry the owner drains on cancel.
//!
//! # Critical Invariants
//!
//! 1. **Identifier Uniqueness**: each account id appears exactly once
//! 2. **Balance Conservation**: outside of agreement operations the sum of
//!    balances only changes when accounts are created

use crate::models::account::{Account, AccountId, Role};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Account already exists: {0}")]
    DuplicateAccount(AccountId),

    #[error("Sum of account balances overflows")]
    BalanceOverflow,
}

/// All accounts known to a driver, ordered by identifier
///
/// # Example
///
/// ```rust
/// use proposal_inverter_core_rs::{AccountBook, Role};
///
/// let mut book = AccountBook::new();
/// let owner = book.create_account(Role::Owner, 1_000_00);
/// let broker = book.create_account(Role::Broker, 100_00);
///
/// assert_eq!(book.num_accounts(), 2);
/// assert_eq!(book.total_balance(), Ok(1_100_00));
/// assert_eq!(book.ids_with_role(Role::Broker), vec![broker]);
/// # let _ = owner;
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccountBook {
    accounts: BTreeMap<AccountId, Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new account with a generated identifier
    pub fn create_account(&mut self, role: Role, opening_balance: i64) -> AccountId {
        let account = Account::new(role, opening_balance);
        let id = account.id().clone();
        self.accounts.insert(id.clone(), account);
        id
    }

    /// Add an existing account
    pub fn insert(&mut self, account: Account) -> Result<(), LedgerError> {
        if self.accounts.contains_key(account.id()) {
            return Err(LedgerError::DuplicateAccount(account.id().clone()));
        }
        self.accounts.insert(account.id().clone(), account);
        Ok(())
    }

    pub fn get(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub fn get_mut(&mut self, id: &AccountId) -> Option<&mut Account> {
        self.accounts.get_mut(id)
    }

    pub fn balance(&self, id: &AccountId) -> Option<i64> {
        self.accounts.get(id).map(Account::balance)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Identifiers of all accounts holding `role`, in identifier order
    pub fn ids_with_role(&self, role: Role) -> Vec<AccountId> {
        self.accounts
            .values()
            .filter(|account| account.role() == role)
            .map(|account| account.id().clone())
            .collect()
    }

    pub fn num_accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of all balances (for conservation checks)
    ///
    /// # Errors
    /// `BalanceOverflow` when the sum does not fit in an `i64`
    pub fn total_balance(&self) -> Result<i64, LedgerError> {
        self.accounts
            .values()
            .try_fold(0i64, |total, account| total.checked_add(account.balance()))
            .ok_or(LedgerError::BalanceOverflow)
    }
}
