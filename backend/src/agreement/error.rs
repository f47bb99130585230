//! Agreement error types
//!
//! Two tiers:
//! - [`Rejection`]: an expected refusal (duplicate broker, capacity, ...).
//!   State is left unchanged and the caller carries on.
//! - Everything else in [`AgreementError`]: programmer errors and broken
//!   invariants, which must surface loudly.

use crate::models::account::{AccountError, AccountId};
use crate::oracle::OracleError;
use thiserror::Error;

/// Expected, non-fatal refusal of a request
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Rejection {
    #[error("Broker {0} already has a stake in this agreement")]
    AlreadyRegistered(AccountId),

    #[error("Maximum number of brokers reached ({max})")]
    CapacityReached { max: usize },

    #[error("Minimum stake not met: staked {stake}, minimum {min_stake}")]
    StakeBelowMinimum { stake: i64, min_stake: i64 },

    #[error("Account {0} is not part of this agreement")]
    NotRegistered(AccountId),

    #[error("Horizon {horizon} is lower than the minimum required horizon {min_horizon}")]
    HorizonBelowMinimum { horizon: f64, min_horizon: f64 },

    #[error("Agreement was cancelled at epoch {epoch}")]
    AgreementCancelled { epoch: usize },

    #[error("Broker {broker_id} not admitted: {reason}")]
    NotAdmitted { broker_id: AccountId, reason: String },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: i64, available: i64 },

    #[error("Account {0} is not the owner of this agreement")]
    NotOwner(AccountId),

    #[error("Unknown token: {0}")]
    UnknownToken(String),

    #[error("Admission policy '{0}' does not accept votes")]
    VotingNotSupported(&'static str),

    #[error("Deposit of {amount} would overflow agreement funds {funds}")]
    FundsOverflow { funds: i64, amount: i64 },
}

/// Errors returned by agreement operations
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AgreementError {
    /// Expected refusal; nothing changed
    #[error("Rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Per-broker division attempted with no brokers committed
    #[error("No brokers committed to the agreement")]
    NoBrokers,

    #[error("Amount must be non-negative, got {0}")]
    NegativeAmount(i64),

    #[error("Token quantity must be finite and non-negative, got {0}")]
    InvalidQuantity(f64),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl AgreementError {
    /// True for expected refusals, false for hard errors
    pub fn is_rejection(&self) -> bool {
        matches!(self, AgreementError::Rejected(_))
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            AgreementError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<AccountError> for AgreementError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InsufficientFunds {
                required,
                available,
            } => Rejection::InsufficientFunds {
                required,
                available,
            }
            .into(),
            AccountError::NegativeAmount(amount) => AgreementError::NegativeAmount(amount),
        }
    }
}

impl From<OracleError> for AgreementError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::UnknownToken(token) => Rejection::UnknownToken(token).into(),
            OracleError::InvalidQuantity(quantity) => AgreementError::InvalidQuantity(quantity),
            err @ OracleError::InvalidPrice { .. } => AgreementError::InvalidConfig(err.to_string()),
        }
    }
}
