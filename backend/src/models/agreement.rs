//! Agreement records
//!
//! Per-party accounting kept by the agreement engine:
//! - [`BrokerAgreement`]: stake, accrual buffer and claim history of a broker
//! - [`PayerAgreement`]: contribution history of a payer
//! - [`BrokerRegistry`]: the single, insertion-ordered set of broker records
//!
//! CRITICAL: All money values are i64 (cents)

use crate::models::account::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accounting record for one broker
///
/// `initial_stake` and `epoch_joined` are fixed at admission and only
/// readable afterwards. `total_claimed` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerAgreement {
    broker_id: AccountId,
    epoch_joined: usize,
    initial_stake: i64,

    /// Funds earmarked for the broker and not yet claimed
    allocated_funds: i64,

    /// Funds claimed so far
    total_claimed: i64,
}

impl BrokerAgreement {
    /// Create a fresh record with an empty accrual buffer
    pub fn new(broker_id: AccountId, epoch_joined: usize, initial_stake: i64) -> Self {
        Self {
            broker_id,
            epoch_joined,
            initial_stake,
            allocated_funds: 0,
            total_claimed: 0,
        }
    }

    pub fn broker_id(&self) -> &AccountId {
        &self.broker_id
    }

    pub fn epoch_joined(&self) -> usize {
        self.epoch_joined
    }

    pub fn initial_stake(&self) -> i64 {
        self.initial_stake
    }

    pub fn allocated_funds(&self) -> i64 {
        self.allocated_funds
    }

    pub fn total_claimed(&self) -> i64 {
        self.total_claimed
    }

    /// Number of whole epochs the broker has been committed at `current_epoch`
    pub fn epochs_committed(&self, current_epoch: usize) -> usize {
        current_epoch.saturating_sub(self.epoch_joined)
    }

    /// Earmark additional funds for this broker
    pub(crate) fn accrue(&mut self, amount: i64) {
        self.allocated_funds += amount;
    }

    /// Empty the accrual buffer into the claim history, returning the payout
    pub(crate) fn take_claim(&mut self) -> i64 {
        let claim = self.allocated_funds;
        self.allocated_funds = 0;
        self.total_claimed += claim;
        claim
    }
}

/// Contribution history for one payer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayerAgreement {
    /// Maps the epoch number to the amount contributed during that epoch
    contributions: BTreeMap<usize, i64>,
}

impl PayerAgreement {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, epoch: usize, amount: i64) {
        *self.contributions.entry(epoch).or_insert(0) += amount;
    }

    pub fn contributions(&self) -> &BTreeMap<usize, i64> {
        &self.contributions
    }

    pub fn total_contributions(&self) -> i64 {
        self.contributions.values().sum()
    }
}

/// Insertion-ordered broker records keyed by broker id
///
/// Membership and per-broker detail live in one structure, so the set of
/// committed brokers and the record map can never disagree. Iteration order
/// is admission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerRegistry {
    records: Vec<BrokerAgreement>,
}

impl BrokerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, broker_id: &AccountId) -> bool {
        self.get(broker_id).is_some()
    }

    pub fn get(&self, broker_id: &AccountId) -> Option<&BrokerAgreement> {
        self.records.iter().find(|r| r.broker_id() == broker_id)
    }

    pub(crate) fn get_mut(&mut self, broker_id: &AccountId) -> Option<&mut BrokerAgreement> {
        self.records.iter_mut().find(|r| r.broker_id() == broker_id)
    }

    /// Insert a record, returning `false` (and leaving the registry
    /// untouched) if the broker is already present
    pub(crate) fn insert(&mut self, record: BrokerAgreement) -> bool {
        if self.contains(record.broker_id()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub(crate) fn remove(&mut self, broker_id: &AccountId) -> Option<BrokerAgreement> {
        let index = self.records.iter().position(|r| r.broker_id() == broker_id)?;
        Some(self.records.remove(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &BrokerAgreement> {
        self.records.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut BrokerAgreement> {
        self.records.iter_mut()
    }

    /// Broker ids in admission order
    pub fn ids(&self) -> Vec<AccountId> {
        self.records.iter().map(|r| r.broker_id().clone()).collect()
    }

    /// Sum of unclaimed allocations across all brokers
    pub fn total_allocated(&self) -> i64 {
        self.records.iter().map(|r| r.allocated_funds()).sum()
    }

    /// Sum of initial stakes across all brokers
    pub fn total_stake(&self) -> i64 {
        self.records.iter().map(|r| r.initial_stake()).sum()
    }
}
