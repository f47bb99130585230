//! Snapshot - Observable Agreement State
//!
//! A serializable view of an agreement and the accounts around it, tagged
//! with a SHA-256 fingerprint of the agreement configuration so that runs
//! under different parameters can be told apart.
//!
//! # Critical Invariants
//!
//! - **Determinism**: the same configuration always yields the same hash
//! - **Read-only**: capturing a snapshot never changes the agreement

use crate::agreement::engine::{Agreement, AgreementStatus};
use crate::models::account::{AccountId, Role};
use crate::models::agreement::BrokerAgreement;
use crate::models::ledger::AccountBook;
use crate::orchestrator::engine::ScenarioError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Aggregate agreement state at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgreementSnapshot {
    pub epoch: usize,
    pub cancel_epoch: usize,
    pub status: AgreementStatus,
    pub owner_id: AccountId,
    pub funds: i64,
    pub total_allocated: i64,
    pub total_stake: i64,
    pub horizon: f64,

    /// Broker records in admission order, then the owner's residual record
    pub records: Vec<RecordSnapshot>,

    pub payers: Vec<PayerSnapshot>,
    pub accounts: Vec<AccountSnapshot>,

    /// SHA256 hash of the agreement configuration
    pub config_hash: String,
}

/// Per-party accounting record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub account_id: AccountId,
    pub epoch_joined: usize,
    pub initial_stake: i64,
    pub allocated_funds: i64,
    pub total_claimed: i64,
}

impl From<&BrokerAgreement> for RecordSnapshot {
    fn from(record: &BrokerAgreement) -> Self {
        RecordSnapshot {
            account_id: record.broker_id().clone(),
            epoch_joined: record.epoch_joined(),
            initial_stake: record.initial_stake(),
            allocated_funds: record.allocated_funds(),
            total_claimed: record.total_claimed(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerSnapshot {
    pub payer_id: AccountId,
    pub total_contributions: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub id: AccountId,
    pub role: Role,
    pub balance: i64,
}

impl AgreementSnapshot {
    /// Capture the agreement and every account in `book`
    pub fn capture(agreement: &Agreement, book: &AccountBook) -> Result<Self, ScenarioError> {
        let records = agreement
            .brokers()
            .iter()
            .chain(agreement.owner_agreement())
            .map(RecordSnapshot::from)
            .collect();

        let payers = agreement
            .payers()
            .iter()
            .map(|(payer_id, record)| PayerSnapshot {
                payer_id: payer_id.clone(),
                total_contributions: record.total_contributions(),
            })
            .collect();

        let accounts = book
            .accounts()
            .map(|account| AccountSnapshot {
                id: account.id().clone(),
                role: account.role(),
                balance: account.balance(),
            })
            .collect();

        Ok(Self {
            epoch: agreement.current_epoch(),
            cancel_epoch: agreement.cancel_epoch(),
            status: agreement.status(),
            owner_id: agreement.owner_id().clone(),
            funds: agreement.funds(),
            total_allocated: agreement.total_allocated(),
            total_stake: agreement.total_stake(),
            horizon: agreement.horizon(),
            records,
            payers,
            accounts,
            config_hash: compute_config_hash(agreement.config())?,
        })
    }

    /// Sum of account balances plus agreement funds
    pub fn total_value(&self) -> i64 {
        self.accounts.iter().map(|a| a.balance).sum::<i64>() + self.funds
    }
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys so the hash does not
/// depend on field or map ordering.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, ScenarioError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        ScenarioError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        ScenarioError::Serialization(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
