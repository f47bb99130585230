//! Scenario action types
//!
//! # Design Principles
//!
//! 1. **Determinism**: actions run in configuration order within an epoch
//! 2. **Money is i64**: amounts are integer cents; token quantities are f64
//! 3. **Labels**: accounts are referenced by their scenario label

use serde::{Deserialize, Serialize};

/// A scripted request against the agreement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioAction {
    /// Broker stakes and joins
    AddBroker { broker: String, stake: i64 },

    /// Account claims its earmarked funds
    ClaimFunds { account: String },

    /// Broker leaves
    RemoveBroker { broker: String },

    /// Payer tops up the agreement
    Pay { payer: String, amount: i64 },

    /// Payer tops up in another token, converted through the price table
    PayInToken {
        payer: String,
        token: String,
        quantity: f64,
    },

    /// Cancel the agreement without draining it
    Cancel,

    /// Owner cancels and every account with a record claims
    OwnerCancel { issuer: String },

    /// Whitelist vote
    Vote {
        voter: String,
        broker: String,
        approve: bool,
    },
}

impl ScenarioAction {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioAction::AddBroker { .. } => "add_broker",
            ScenarioAction::ClaimFunds { .. } => "claim_funds",
            ScenarioAction::RemoveBroker { .. } => "remove_broker",
            ScenarioAction::Pay { .. } => "pay",
            ScenarioAction::PayInToken { .. } => "pay_in_token",
            ScenarioAction::Cancel => "cancel",
            ScenarioAction::OwnerCancel { .. } => "owner_cancel",
            ScenarioAction::Vote { .. } => "vote",
        }
    }

    /// Account labels the action refers to
    pub fn account_labels(&self) -> Vec<&str> {
        match self {
            ScenarioAction::AddBroker { broker, .. } | ScenarioAction::RemoveBroker { broker } => {
                vec![broker]
            }
            ScenarioAction::ClaimFunds { account } => vec![account],
            ScenarioAction::Pay { payer, .. } | ScenarioAction::PayInToken { payer, .. } => {
                vec![payer]
            }
            ScenarioAction::Cancel => Vec::new(),
            ScenarioAction::OwnerCancel { issuer } => vec![issuer],
            ScenarioAction::Vote { voter, broker, .. } => vec![voter, broker],
        }
    }
}

/// When to execute a scenario action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionSchedule {
    /// Execute once at a specific epoch
    OneTime { epoch: usize },

    /// Execute every `interval` epochs starting from `start_epoch`
    ///
    /// An interval of zero runs once, at `start_epoch`.
    Repeating { start_epoch: usize, interval: usize },
}

impl ActionSchedule {
    /// Check if this schedule triggers at the given epoch
    pub fn should_execute(&self, epoch: usize) -> bool {
        match *self {
            ActionSchedule::OneTime { epoch: at } => epoch == at,
            ActionSchedule::Repeating {
                start_epoch,
                interval: 0,
            } => epoch == start_epoch,
            ActionSchedule::Repeating {
                start_epoch,
                interval,
            } => epoch >= start_epoch && (epoch - start_epoch) % interval == 0,
        }
    }
}

/// A scenario action paired with its schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub action: ScenarioAction,
    pub schedule: ActionSchedule,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_labels() {
        let vote = ScenarioAction::Vote {
            voter: "owner".to_string(),
            broker: "b1".to_string(),
            approve: true,
        };

        assert_eq!(vote.account_labels(), vec!["owner", "b1"]);
        assert!(ScenarioAction::Cancel.account_labels().is_empty());
    }

    #[test]
    fn test_one_time_schedule() {
        let schedule = ActionSchedule::OneTime { epoch: 10 };

        assert!(!schedule.should_execute(9));
        assert!(schedule.should_execute(10));
        assert!(!schedule.should_execute(11));
    }

    #[test]
    fn test_repeating_schedule() {
        let schedule = ActionSchedule::Repeating {
            start_epoch: 10,
            interval: 5,
        };

        assert!(!schedule.should_execute(9));
        assert!(schedule.should_execute(10));
        assert!(!schedule.should_execute(11));
        assert!(schedule.should_execute(15));
        assert!(schedule.should_execute(20));
        assert!(!schedule.should_execute(22));
    }

    #[test]
    fn test_zero_interval_runs_once() {
        let schedule = ActionSchedule::Repeating {
            start_epoch: 3,
            interval: 0,
        };

        assert!(schedule.should_execute(3));
        assert!(!schedule.should_execute(4));
    }

    #[test]
    fn test_scheduled_action_from_json() {
        let json = r#"{
            "action": {"type": "add_broker", "broker": "broker_1", "stake": 5000},
            "schedule": {"epoch": 0}
        }"#;
        let scheduled: ScheduledAction = serde_json::from_str(json).unwrap();

        assert_eq!(
            scheduled.action,
            ScenarioAction::AddBroker {
                broker: "broker_1".to_string(),
                stake: 50_00,
            }
        );
        assert_eq!(scheduled.schedule, ActionSchedule::OneTime { epoch: 0 });
    }

    #[test]
    fn test_repeating_schedule_from_json() {
        let schedule: ActionSchedule =
            serde_json::from_str(r#"{"start_epoch": 2, "interval": 7}"#).unwrap();
        assert_eq!(
            schedule,
            ActionSchedule::Repeating {
                start_epoch: 2,
                interval: 7
            }
        );
    }
}
