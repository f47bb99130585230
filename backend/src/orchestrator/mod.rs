//! Orchestrator - scenario driver
//!
//! Runs a scripted scenario against one agreement, epoch by epoch.
//!
//! See `engine.rs` for full implementation.

pub mod engine;
pub mod snapshot;

// Re-export main types for convenience
pub use engine::{
    AccountConfig, DeploymentConfig, EpochResult, Orchestrator, ScenarioConfig, ScenarioError,
};

pub use snapshot::{
    compute_config_hash, AccountSnapshot, AgreementSnapshot, PayerSnapshot, RecordSnapshot,
};
