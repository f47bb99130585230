//! Non-voting admission policies

use crate::admission::{AdmissionContext, AdmissionDecision, AdmissionPolicy};
use crate::models::AccountId;

/// Admits every broker
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAdmission;

impl AdmissionPolicy for OpenAdmission {
    fn name(&self) -> &'static str {
        "open"
    }

    fn evaluate(&self, _broker_id: &AccountId, _ctx: &AdmissionContext<'_>) -> AdmissionDecision {
        AdmissionDecision::Admit
    }
}

/// Admits brokers for which a closure returns `true`
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::admission::{AdmissionPolicy, PredicateAdmission};
///
/// let policy = PredicateAdmission::new(|broker_id, _ctx| broker_id.as_str().starts_with("trusted_"));
/// assert_eq!(policy.name(), "predicate");
/// ```
pub struct PredicateAdmission<F> {
    predicate: F,
}

impl<F> PredicateAdmission<F>
where
    F: Fn(&AccountId, &AdmissionContext<'_>) -> bool + Send,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> AdmissionPolicy for PredicateAdmission<F>
where
    F: Fn(&AccountId, &AdmissionContext<'_>) -> bool + Send,
{
    fn name(&self) -> &'static str {
        "predicate"
    }

    fn evaluate(&self, broker_id: &AccountId, ctx: &AdmissionContext<'_>) -> AdmissionDecision {
        if (self.predicate)(broker_id, ctx) {
            AdmissionDecision::Admit
        } else {
            AdmissionDecision::Refuse {
                reason: "refused by admission predicate".to_string(),
            }
        }
    }
}
