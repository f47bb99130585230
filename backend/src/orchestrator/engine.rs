//! Orchestrator Engine
//!
//! Drives one agreement through a scripted scenario:
//! - Account setup (labelled accounts with opening balances)
//! - Deployment (owner, initial funds, configuration overrides)
//! - Scheduled actions (admissions, claims, payments, votes, cancels)
//! - Epoch stepping with invariant checks
//!
//! # Architecture
//!
//! ```text
//! For each epoch e:
//! 1. Execute actions scheduled for e (rejections are counted, not fatal)
//! 2. Step the agreement one epoch (accrual, sustainability, forced cancel)
//! 3. Check agreement invariants and funds conservation
//! ```
//!
//! # Example
//!
//! ```rust
//! use proposal_inverter_core_rs::orchestrator::{Orchestrator, ScenarioConfig};
//!
//! let config: ScenarioConfig = serde_json::from_str(r#"{
//!     "accounts": [
//!         {"label": "owner", "role": "owner", "balance": 100000},
//!         {"label": "broker", "role": "broker", "balance": 10000}
//!     ],
//!     "deployment": {"owner": "owner", "initial_funds": 50000},
//!     "epochs": 10,
//!     "actions": [
//!         {"action": {"type": "add_broker", "broker": "broker", "stake": 5000},
//!          "schedule": {"epoch": 0}}
//!     ]
//! }"#).unwrap();
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let results = orchestrator.run().unwrap();
//!
//! assert_eq!(results.len(), 10);
//! assert_eq!(orchestrator.agreement().total_allocated(), 100_00);
//! ```

use crate::agreement::config::ConfigOverrides;
use crate::agreement::engine::{Agreement, AgreementStatus};
use crate::agreement::error::AgreementError;
use crate::deployment::deploy;
use crate::models::account::{Account, AccountId, Role};
use crate::models::ledger::{AccountBook, LedgerError};
use crate::oracle::PriceOracle;
use crate::orchestrator::snapshot::AgreementSnapshot;
use crate::scenario::{ScenarioActionHandler, ScheduledAction};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete scenario configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Accounts taking part, addressed by label
    pub accounts: Vec<AccountConfig>,

    pub deployment: DeploymentConfig,

    /// Number of epochs to run
    pub epochs: usize,

    #[serde(default)]
    pub actions: Vec<ScheduledAction>,

    /// Token prices for `pay_in_token` actions
    #[serde(default)]
    pub prices: PriceOracle,
}

/// Per-account configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Unique label, used as the account id
    pub label: String,

    pub role: Role,

    /// Opening balance (i64 cents)
    pub balance: i64,
}

/// How the agreement is deployed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentConfig {
    /// Label of the deploying owner
    pub owner: String,

    /// Funds the owner puts in (i64 cents)
    pub initial_funds: i64,

    #[serde(default)]
    pub overrides: ConfigOverrides,
}

// ============================================================================
// Errors and Results
// ============================================================================

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("Unknown account: {0}")]
    UnknownAccount(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Agreement(#[from] AgreementError),

    #[error("Invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ScenarioError {
    /// True if the agreement refused a request
    pub fn is_rejection(&self) -> bool {
        matches!(self, ScenarioError::Agreement(err) if err.is_rejection())
    }
}

/// Outcome of one epoch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochResult {
    /// Epoch the actions ran at (before the step)
    pub epoch: usize,
    pub actions_executed: usize,
    pub rejections: usize,
    pub funds: i64,
    pub num_brokers: usize,
    pub total_allocated: i64,
    pub horizon: f64,
    pub status: AgreementStatus,
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Scenario driver around a single agreement
#[derive(Debug)]
pub struct Orchestrator {
    config: ScenarioConfig,
    book: AccountBook,
    agreement: Agreement,
    handler: ScenarioActionHandler,

    /// Sum of all balances plus agreement funds at deployment
    expected_total: i64,

    epochs_run: usize,
    total_rejections: usize,
}

impl Orchestrator {
    /// Create accounts and deploy the agreement
    ///
    /// # Errors
    /// - `Ledger` on duplicate labels or when opening balances overflow
    /// - `UnknownAccount` if the deploying owner or any action label is not listed
    /// - `Agreement` if deployment is refused or the configuration is invalid
    pub fn new(config: ScenarioConfig) -> Result<Self, ScenarioError> {
        let mut book = AccountBook::new();
        for account in &config.accounts {
            if account.balance < 0 {
                return Err(ScenarioError::InvalidScenario(format!(
                    "account {} has negative opening balance {}",
                    account.label, account.balance
                )));
            }
            book.insert(Account::with_id(
                AccountId::new(account.label.as_str()),
                account.role,
                account.balance,
            ))?;
        }

        for scheduled in &config.actions {
            for label in scheduled.action.account_labels() {
                if book.get(&AccountId::new(label)).is_none() {
                    return Err(ScenarioError::UnknownAccount(label.to_string()));
                }
            }
        }

        // Deployment only moves money between the owner and the agreement
        let expected_total = book.total_balance()?;

        let owner_label = &config.deployment.owner;
        let owner = book
            .get_mut(&AccountId::new(owner_label.as_str()))
            .ok_or_else(|| ScenarioError::UnknownAccount(owner_label.clone()))?;
        let agreement = deploy(
            owner,
            config.deployment.initial_funds,
            config.deployment.overrides.clone(),
        )?;

        let handler = ScenarioActionHandler::new(config.actions.clone());

        info!(
            accounts = book.num_accounts(),
            actions = handler.len(),
            epochs = config.epochs,
            "scenario loaded"
        );

        Ok(Self {
            config,
            book,
            agreement,
            handler,
            expected_total,
            epochs_run: 0,
            total_rejections: 0,
        })
    }

    /// Run every remaining configured epoch
    pub fn run(&mut self) -> Result<Vec<EpochResult>, ScenarioError> {
        let remaining = self.config.epochs.saturating_sub(self.epochs_run);
        let mut results = Vec::with_capacity(remaining);
        for _ in 0..remaining {
            results.push(self.epoch()?);
        }
        Ok(results)
    }

    /// Execute one epoch
    pub fn epoch(&mut self) -> Result<EpochResult, ScenarioError> {
        let epoch = self.agreement.current_epoch();
        let mut actions_executed = 0;
        let mut rejections = 0;

        for action in self.handler.actions_for_epoch(epoch) {
            match action.execute(&mut self.agreement, &mut self.book, &self.config.prices) {
                Ok(()) => actions_executed += 1,
                Err(err) if err.is_rejection() => {
                    debug!(epoch, action = action.name(), error = %err, "action rejected");
                    rejections += 1;
                }
                Err(err) => {
                    warn!(epoch, action = action.name(), error = %err, "action failed");
                    return Err(err);
                }
            }
        }

        self.agreement.step_epoch()?;
        self.agreement.check_invariants()?;
        self.check_conservation()?;

        self.epochs_run += 1;
        self.total_rejections += rejections;

        Ok(EpochResult {
            epoch,
            actions_executed,
            rejections,
            funds: self.agreement.funds(),
            num_brokers: self.agreement.number_of_brokers(),
            total_allocated: self.agreement.total_allocated(),
            horizon: self.agreement.horizon(),
            status: self.agreement.status(),
        })
    }

    fn check_conservation(&self) -> Result<(), ScenarioError> {
        let total = self.book.total_balance()?.checked_add(self.agreement.funds());
        if total != Some(self.expected_total) {
            return Err(AgreementError::InvariantViolation(format!(
                "funds conservation violated: expected {}, got {:?}",
                self.expected_total, total
            ))
            .into());
        }
        Ok(())
    }

    /// Observable state with a configuration fingerprint
    pub fn snapshot(&self) -> Result<AgreementSnapshot, ScenarioError> {
        AgreementSnapshot::capture(&self.agreement, &self.book)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn agreement(&self) -> &Agreement {
        &self.agreement
    }

    pub fn book(&self) -> &AccountBook {
        &self.book
    }

    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn current_epoch(&self) -> usize {
        self.agreement.current_epoch()
    }

    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    pub fn total_rejections(&self) -> usize {
        self.total_rejections
    }

    pub fn balance(&self, label: &str) -> Option<i64> {
        self.book.balance(&AccountId::new(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ActionSchedule, ScenarioAction};

    fn accounts() -> Vec<AccountConfig> {
        vec![
            AccountConfig {
                label: "owner".to_string(),
                role: Role::Owner,
                balance: 1_000_00,
            },
            AccountConfig {
                label: "broker".to_string(),
                role: Role::Broker,
                balance: 100_00,
            },
        ]
    }

    fn config(actions: Vec<ScheduledAction>) -> ScenarioConfig {
        ScenarioConfig {
            accounts: accounts(),
            deployment: DeploymentConfig {
                owner: "owner".to_string(),
                initial_funds: 500_00,
                overrides: ConfigOverrides::default(),
            },
            epochs: 5,
            actions,
            prices: PriceOracle::default(),
        }
    }

    #[test]
    fn test_new_deploys_agreement() {
        let orchestrator = Orchestrator::new(config(vec![])).unwrap();

        assert_eq!(orchestrator.agreement().funds(), 500_00);
        assert_eq!(orchestrator.balance("owner"), Some(500_00));
    }

    #[test]
    fn test_unknown_owner() {
        let mut config = config(vec![]);
        config.deployment.owner = "nobody".to_string();

        let err = Orchestrator::new(config).unwrap_err();
        assert_eq!(err, ScenarioError::UnknownAccount("nobody".to_string()));
    }

    #[test]
    fn test_duplicate_label() {
        let mut config = config(vec![]);
        config.accounts.push(AccountConfig {
            label: "broker".to_string(),
            role: Role::Payer,
            balance: 0,
        });

        assert!(matches!(
            Orchestrator::new(config),
            Err(ScenarioError::Ledger(LedgerError::DuplicateAccount(_)))
        ));
    }

    #[test]
    fn test_unknown_action_label() {
        let actions = vec![ScheduledAction {
            action: ScenarioAction::Vote {
                voter: "owner".to_string(),
                broker: "nobody".to_string(),
                approve: true,
            },
            schedule: ActionSchedule::OneTime { epoch: 3 },
        }];

        let err = Orchestrator::new(config(actions)).unwrap_err();
        assert_eq!(err, ScenarioError::UnknownAccount("nobody".to_string()));
    }

    #[test]
    fn test_opening_balances_overflow() {
        let mut config = config(vec![]);
        config.accounts.push(AccountConfig {
            label: "whale".to_string(),
            role: Role::Payer,
            balance: i64::MAX,
        });

        assert_eq!(
            Orchestrator::new(config).unwrap_err(),
            ScenarioError::Ledger(LedgerError::BalanceOverflow)
        );
    }

    #[test]
    fn test_rejections_are_counted_not_fatal() {
        let actions = vec![ScheduledAction {
            action: ScenarioAction::ClaimFunds {
                account: "broker".to_string(),
            },
            schedule: ActionSchedule::OneTime { epoch: 0 },
        }];
        let mut orchestrator = Orchestrator::new(config(actions)).unwrap();

        let result = orchestrator.epoch().unwrap();
        assert_eq!(result.rejections, 1);
        assert_eq!(result.actions_executed, 0);
        assert_eq!(orchestrator.total_rejections(), 1);
    }

    #[test]
    fn test_run_stops_at_configured_epochs() {
        let mut orchestrator = Orchestrator::new(config(vec![])).unwrap();

        orchestrator.epoch().unwrap();
        let results = orchestrator.run().unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(orchestrator.epochs_run(), 5);
        assert!(orchestrator.run().unwrap().is_empty());
    }
}
