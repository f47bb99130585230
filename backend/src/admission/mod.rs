//! Broker Admission Policy Module
//!
//! Capacity and minimum-stake checks are built into the agreement. Any
//! further access control is delegated to an [`AdmissionPolicy`], consulted
//! by `admit_broker` after the built-in checks pass.
//!
//! # Policy Interface
//!
//! ```rust
//! use proposal_inverter_core_rs::admission::{
//!     AdmissionContext, AdmissionDecision, AdmissionPolicy,
//! };
//! use proposal_inverter_core_rs::models::AccountId;
//!
//! struct DenyAll;
//!
//! impl AdmissionPolicy for DenyAll {
//!     fn name(&self) -> &'static str {
//!         "deny_all"
//!     }
//!
//!     fn evaluate(&self, _broker_id: &AccountId, _ctx: &AdmissionContext<'_>) -> AdmissionDecision {
//!         AdmissionDecision::Refuse {
//!             reason: "closed".to_string(),
//!         }
//!     }
//! }
//! ```
//!
//! Available policies:
//! 1. **Open**: admit every broker (default)
//! 2. **Predicate**: wrap an arbitrary closure
//! 3. **Whitelist voting**: owner vote, payer vote, equal vote, weighted
//!    vote and consensus vote
//!
//! Declarative selection goes through [`AdmissionPolicyConfig`]:
//!
//! ```rust
//! use proposal_inverter_core_rs::admission::AdmissionPolicyConfig;
//!
//! let config: AdmissionPolicyConfig =
//!     serde_json::from_str(r#"{"type": "equal_vote", "min_vote": 0.75}"#).unwrap();
//! let policy = config.build();
//! assert_eq!(policy.name(), "equal_vote");
//! ```

use crate::agreement::error::Rejection;
use crate::models::{AccountId, PayerAgreement};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod open;
pub mod whitelist;

pub use open::{OpenAdmission, PredicateAdmission};
pub use whitelist::{VoteRule, WhitelistVoting};

/// Read-only view of the agreement handed to policies
#[derive(Debug, Clone, Copy)]
pub struct AdmissionContext<'a> {
    pub owner_id: &'a AccountId,
    pub payers: &'a BTreeMap<AccountId, PayerAgreement>,
    pub epoch: usize,
}

impl AdmissionContext<'_> {
    pub fn is_payer(&self, account_id: &AccountId) -> bool {
        self.payers.contains_key(account_id)
    }

    pub fn num_payers(&self) -> usize {
        self.payers.len()
    }

    /// Contribution of one payer; zero for accounts that never paid
    pub fn contribution_of(&self, account_id: &AccountId) -> i64 {
        self.payers
            .get(account_id)
            .map(PayerAgreement::total_contributions)
            .unwrap_or(0)
    }

    pub fn total_contributions(&self) -> i64 {
        self.payers.values().map(PayerAgreement::total_contributions).sum()
    }
}

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    Admit,
    Refuse { reason: String },
}

impl AdmissionDecision {
    pub fn is_admit(&self) -> bool {
        matches!(self, AdmissionDecision::Admit)
    }
}

/// Access-control hook for broker admission
pub trait AdmissionPolicy: Send {
    /// Short identifier used in logs and rejections
    fn name(&self) -> &'static str;

    /// Decide whether `broker_id` may join
    fn evaluate(&self, broker_id: &AccountId, ctx: &AdmissionContext<'_>) -> AdmissionDecision;

    /// Record a whitelist vote, returning whether the broker is whitelisted
    /// afterwards
    ///
    /// Policies without voting refuse every vote.
    fn record_vote(
        &mut self,
        _voter_id: &AccountId,
        _broker_id: &AccountId,
        _approve: bool,
        _ctx: &AdmissionContext<'_>,
    ) -> Result<bool, Rejection> {
        Err(Rejection::VotingNotSupported(self.name()))
    }
}

fn default_min_vote() -> f64 {
    0.5
}

/// Declarative admission policy selection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdmissionPolicyConfig {
    /// Admit every broker
    #[default]
    Open,

    /// Whitelisted once the owner votes yes
    OwnerVote,

    /// Whitelisted once any payer votes yes
    PayerVote,

    /// Whitelisted once the share of payers voting yes reaches `min_vote`
    EqualVote {
        #[serde(default = "default_min_vote")]
        min_vote: f64,
    },

    /// Whitelisted once the contribution-weighted yes share reaches `min_vote`
    WeightedVote {
        #[serde(default = "default_min_vote")]
        min_vote: f64,
    },

    /// Whitelisted once every payer has voted yes
    ConsensusVote,
}

impl AdmissionPolicyConfig {
    /// Build the policy object this configuration describes
    pub fn build(&self) -> Box<dyn AdmissionPolicy> {
        match self {
            AdmissionPolicyConfig::Open => Box::new(OpenAdmission),
            AdmissionPolicyConfig::OwnerVote => Box::new(WhitelistVoting::new(VoteRule::Owner)),
            AdmissionPolicyConfig::PayerVote => Box::new(WhitelistVoting::new(VoteRule::Payer)),
            AdmissionPolicyConfig::EqualVote { min_vote } => {
                Box::new(WhitelistVoting::new(VoteRule::Equal { min_vote: *min_vote }))
            }
            AdmissionPolicyConfig::WeightedVote { min_vote } => {
                Box::new(WhitelistVoting::new(VoteRule::Weighted { min_vote: *min_vote }))
            }
            AdmissionPolicyConfig::ConsensusVote => {
                Box::new(WhitelistVoting::new(VoteRule::Consensus))
            }
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            AdmissionPolicyConfig::EqualVote { min_vote }
            | AdmissionPolicyConfig::WeightedVote { min_vote } => {
                if !min_vote.is_finite() || *min_vote <= 0.0 || *min_vote > 1.0 {
                    return Err(format!("min_vote must be in (0, 1], got {}", min_vote));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
