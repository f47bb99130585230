//! Scenario actions
//!
//! Scripted operations applied to an agreement at chosen epochs, loaded from
//! scenario JSON and executed by the orchestrator before each epoch step.

pub mod handler;
pub mod types;

pub use handler::ScenarioActionHandler;
pub use types::{ActionSchedule, ScenarioAction, ScheduledAction};
