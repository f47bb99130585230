//! Proposal Inverter Core - Rust Engine
//!
//! Epoch-driven simulator of a proposal-inverter funding agreement: an owner
//! pools funds, brokers stake to join and accrue a share of a fixed
//! per-epoch allocation, payers top the pool up, and the agreement cancels
//! itself when it stays unsustainable for too long.
//!
//! # Architecture
//!
//! - **core**: Epoch clock
//! - **models**: Domain types (Account, agreement records, events, account book)
//! - **agreement**: The agreement engine, its configuration and errors
//! - **admission**: Broker admission policies (open, predicate, whitelist voting)
//! - **deployment**: Owner-side deploy and cancel
//! - **oracle**: Token price table
//! - **scenario**: Scheduled scenario actions
//! - **orchestrator**: Scenario driver and snapshots
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. Rejected requests leave state unchanged
//! 3. Funds are conserved: agreement funds plus account balances never change
//!    except through deployment

// Module declarations
pub mod admission;
pub mod agreement;
pub mod core;
pub mod deployment;
pub mod models;
pub mod oracle;
pub mod orchestrator;
pub mod scenario;

// Re-exports for convenience
pub use admission::{AdmissionPolicy, AdmissionPolicyConfig};
pub use agreement::{
    Agreement, AgreementConfig, AgreementError, AgreementStatus, BrokerExit, ConfigOverrides,
    Rejection,
};
pub use core::epoch::EpochClock;
pub use deployment::{deploy, owner_cancel, CancellationSummary};
pub use models::{
    account::{Account, AccountError, AccountId, Role},
    agreement::{BrokerAgreement, BrokerRegistry, PayerAgreement},
    event::{Event, EventLog},
    ledger::{AccountBook, LedgerError},
};
pub use oracle::{OracleError, PriceOracle};
pub use orchestrator::{AgreementSnapshot, EpochResult, Orchestrator, ScenarioConfig, ScenarioError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn proposal_inverter_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PyOrchestrator>()?;
    Ok(())
}
