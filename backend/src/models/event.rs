//! Event logging for agreement replay and auditing.
//!
//! Every state change of an agreement, and every rejected request, is
//! recorded as an [`Event`]. Events enable:
//! - Auditing (verify every unit of funds that moved)
//! - Debugging (understand why a forced cancel fired)
//! - Analysis (claims and accruals over time)
//!
//! # Example
//!
//! ```rust
//! use proposal_inverter_core_rs::models::{AccountId, Event, EventLog};
//!
//! let mut log = EventLog::new();
//! log.log(Event::BrokerAdmitted {
//!     epoch: 0,
//!     broker_id: AccountId::new("broker_1"),
//!     stake: 50_00,
//! });
//!
//! assert_eq!(log.events_of_type("BrokerAdmitted").len(), 1);
//! ```

use crate::models::account::AccountId;
use serde::Serialize;

/// Agreement event capturing a state change.
///
/// All events carry the epoch at which they happened. Events are logged in
/// the order they occur within an epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Agreement created and (possibly) funded by its owner
    Deployed {
        epoch: usize,
        owner_id: AccountId,
        initial_funds: i64,
    },

    /// Broker staked and joined
    BrokerAdmitted {
        epoch: usize,
        broker_id: AccountId,
        stake: i64,
    },

    /// Request refused without changing state
    Rejected {
        epoch: usize,
        account_id: Option<AccountId>,
        operation: &'static str,
        reason: String,
    },

    /// Earmarked funds paid out
    FundsClaimed {
        epoch: usize,
        account_id: AccountId,
        amount: i64,
    },

    /// Broker left; stake either refunded or forfeited
    BrokerRemoved {
        epoch: usize,
        broker_id: AccountId,
        stake_refunded: i64,
        stake_forfeited: i64,
    },

    /// External top-up
    Payment {
        epoch: usize,
        payer_id: AccountId,
        amount: i64,
    },

    /// Per-epoch allocation earmarked to all brokers
    Accrual {
        epoch: usize,
        num_brokers: usize,
        per_broker: i64,
    },

    /// No brokers committed, nothing accrued
    AccrualSkipped { epoch: usize },

    /// Unreserved funds could not cover the full allocation
    AllocationShortfall {
        epoch: usize,
        requested: i64,
        available: i64,
    },

    /// Sustainability failed this epoch; forced-cancel counter kept running
    Unsustainable {
        epoch: usize,
        epochs_since_sustainable: usize,
        horizon: f64,
        num_brokers: usize,
    },

    /// Agreement cancelled and all funds earmarked
    Cancelled {
        epoch: usize,
        forced: bool,
        residual: i64,
        owner_residual: i64,
    },

    /// Whitelist vote recorded by the admission policy
    VoteCast {
        epoch: usize,
        voter_id: AccountId,
        broker_id: AccountId,
        approve: bool,
        whitelisted: bool,
    },
}

impl Event {
    /// Get the epoch when this event occurred
    pub fn epoch(&self) -> usize {
        match self {
            Event::Deployed { epoch, .. } => *epoch,
            Event::BrokerAdmitted { epoch, .. } => *epoch,
            Event::Rejected { epoch, .. } => *epoch,
            Event::FundsClaimed { epoch, .. } => *epoch,
            Event::BrokerRemoved { epoch, .. } => *epoch,
            Event::Payment { epoch, .. } => *epoch,
            Event::Accrual { epoch, .. } => *epoch,
            Event::AccrualSkipped { epoch } => *epoch,
            Event::AllocationShortfall { epoch, .. } => *epoch,
            Event::Unsustainable { epoch, .. } => *epoch,
            Event::Cancelled { epoch, .. } => *epoch,
            Event::VoteCast { epoch, .. } => *epoch,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::Deployed { .. } => "Deployed",
            Event::BrokerAdmitted { .. } => "BrokerAdmitted",
            Event::Rejected { .. } => "Rejected",
            Event::FundsClaimed { .. } => "FundsClaimed",
            Event::BrokerRemoved { .. } => "BrokerRemoved",
            Event::Payment { .. } => "Payment",
            Event::Accrual { .. } => "Accrual",
            Event::AccrualSkipped { .. } => "AccrualSkipped",
            Event::AllocationShortfall { .. } => "AllocationShortfall",
            Event::Unsustainable { .. } => "Unsustainable",
            Event::Cancelled { .. } => "Cancelled",
            Event::VoteCast { .. } => "VoteCast",
        }
    }

    /// Get the account the event is about, if any
    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            Event::Deployed { owner_id, .. } => Some(owner_id),
            Event::BrokerAdmitted { broker_id, .. } => Some(broker_id),
            Event::Rejected { account_id, .. } => account_id.as_ref(),
            Event::FundsClaimed { account_id, .. } => Some(account_id),
            Event::BrokerRemoved { broker_id, .. } => Some(broker_id),
            Event::Payment { payer_id, .. } => Some(payer_id),
            Event::VoteCast { broker_id, .. } => Some(broker_id),
            _ => None,
        }
    }
}

/// Event log for storing and querying agreement events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific epoch
    pub fn events_at_epoch(&self, epoch: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.epoch() == epoch).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific account
    pub fn events_for_account(&self, account_id: &AccountId) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.account_id() == Some(account_id))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
