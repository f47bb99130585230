//! Whitelist voting
//!
//! Brokers are admitted only once whitelisted. A vote for a broker that is
//! not whitelisted yet puts it on the waitlist and records the voter's
//! latest choice; the [`VoteRule`] then decides whether the broker moves to
//! the whitelist. Whitelisting is permanent.

use crate::admission::{AdmissionContext, AdmissionDecision, AdmissionPolicy};
use crate::agreement::error::Rejection;
use crate::models::AccountId;
use std::collections::{BTreeMap, BTreeSet};

/// Rule deciding when the votes for a broker suffice
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VoteRule {
    /// The owner voted yes
    Owner,

    /// Some payer voted yes
    Payer,

    /// Yes votes from payers / number of payers >= min_vote
    Equal { min_vote: f64 },

    /// Contributions of yes-voting payers / total contributions >= min_vote
    Weighted { min_vote: f64 },

    /// Every payer voted yes
    Consensus,
}

impl VoteRule {
    fn name(&self) -> &'static str {
        match self {
            VoteRule::Owner => "owner_vote",
            VoteRule::Payer => "payer_vote",
            VoteRule::Equal { .. } => "equal_vote",
            VoteRule::Weighted { .. } => "weighted_vote",
            VoteRule::Consensus => "consensus_vote",
        }
    }

    /// Whether `votes` (voter -> approve) whitelist a broker
    fn is_satisfied(&self, votes: &BTreeMap<AccountId, bool>, ctx: &AdmissionContext<'_>) -> bool {
        let approved_by = |voter: &AccountId| votes.get(voter).copied().unwrap_or(false);

        match *self {
            VoteRule::Owner => approved_by(ctx.owner_id),
            VoteRule::Payer => votes
                .iter()
                .any(|(voter, approve)| *approve && ctx.is_payer(voter)),
            VoteRule::Equal { min_vote } => {
                let num_payers = ctx.num_payers();
                if num_payers == 0 {
                    return false;
                }
                let yes = ctx.payers.keys().filter(|payer| approved_by(*payer)).count();
                yes as f64 / num_payers as f64 >= min_vote
            }
            VoteRule::Weighted { min_vote } => {
                let total = ctx.total_contributions();
                if total <= 0 {
                    return false;
                }
                let weighted_yes: i64 = ctx
                    .payers
                    .iter()
                    .filter(|(payer, _)| approved_by(*payer))
                    .map(|(_, record)| record.total_contributions())
                    .sum();
                weighted_yes as f64 / total as f64 >= min_vote
            }
            VoteRule::Consensus => {
                ctx.num_payers() > 0 && ctx.payers.keys().all(|payer| approved_by(payer))
            }
        }
    }
}

/// Voting-based admission policy
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::admission::{
///     AdmissionContext, AdmissionPolicy, VoteRule, WhitelistVoting,
/// };
/// use proposal_inverter_core_rs::models::AccountId;
/// use std::collections::BTreeMap;
///
/// let owner = AccountId::new("owner");
/// let broker = AccountId::new("broker");
/// let payers = BTreeMap::new();
/// let ctx = AdmissionContext { owner_id: &owner, payers: &payers, epoch: 0 };
///
/// let mut policy = WhitelistVoting::new(VoteRule::Owner);
/// assert!(!policy.evaluate(&broker, &ctx).is_admit());
///
/// assert!(policy.record_vote(&owner, &broker, true, &ctx).unwrap());
/// assert!(policy.evaluate(&broker, &ctx).is_admit());
/// ```
#[derive(Debug, Clone)]
pub struct WhitelistVoting {
    rule: VoteRule,
    whitelist: BTreeSet<AccountId>,
    waitlist: BTreeSet<AccountId>,

    /// Maps each waitlisted broker to voter -> latest vote
    votes: BTreeMap<AccountId, BTreeMap<AccountId, bool>>,
}

impl WhitelistVoting {
    pub fn new(rule: VoteRule) -> Self {
        Self {
            rule,
            whitelist: BTreeSet::new(),
            waitlist: BTreeSet::new(),
            votes: BTreeMap::new(),
        }
    }

    pub fn rule(&self) -> VoteRule {
        self.rule
    }

    pub fn is_whitelisted(&self, broker_id: &AccountId) -> bool {
        self.whitelist.contains(broker_id)
    }

    pub fn is_waitlisted(&self, broker_id: &AccountId) -> bool {
        self.waitlist.contains(broker_id)
    }

    pub fn whitelist(&self) -> &BTreeSet<AccountId> {
        &self.whitelist
    }

    pub fn waitlist(&self) -> &BTreeSet<AccountId> {
        &self.waitlist
    }

    /// Votes recorded for a broker (voter -> approve)
    pub fn votes_for(&self, broker_id: &AccountId) -> Option<&BTreeMap<AccountId, bool>> {
        self.votes.get(broker_id)
    }
}

impl AdmissionPolicy for WhitelistVoting {
    fn name(&self) -> &'static str {
        self.rule.name()
    }

    fn evaluate(&self, broker_id: &AccountId, _ctx: &AdmissionContext<'_>) -> AdmissionDecision {
        if self.is_whitelisted(broker_id) {
            AdmissionDecision::Admit
        } else {
            AdmissionDecision::Refuse {
                reason: format!("not whitelisted under {}", self.name()),
            }
        }
    }

    fn record_vote(
        &mut self,
        voter_id: &AccountId,
        broker_id: &AccountId,
        approve: bool,
        ctx: &AdmissionContext<'_>,
    ) -> Result<bool, Rejection> {
        if self.is_whitelisted(broker_id) {
            return Ok(true);
        }

        self.waitlist.insert(broker_id.clone());
        let votes = self.votes.entry(broker_id.clone()).or_default();
        votes.insert(voter_id.clone(), approve);

        if self.rule.is_satisfied(votes, ctx) {
            self.waitlist.remove(broker_id);
            self.whitelist.insert(broker_id.clone());
        }

        Ok(self.is_whitelisted(broker_id))
    }
}
