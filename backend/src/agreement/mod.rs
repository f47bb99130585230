//! Agreement engine
//!
//! The proposal-inverter state machine plus its configuration and errors.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{AgreementConfig, ConfigOverrides};
pub use engine::{Agreement, AgreementStatus, BrokerExit};
pub use error::{AgreementError, Rejection};
