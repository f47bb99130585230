//! Domain models for the proposal inverter

pub mod account;
pub mod agreement;
pub mod event;
pub mod ledger;

// Re-exports
pub use account::{Account, AccountError, AccountId, Role};
pub use agreement::{BrokerAgreement, BrokerRegistry, PayerAgreement};
pub use event::{Event, EventLog};
pub use ledger::{AccountBook, LedgerError};
