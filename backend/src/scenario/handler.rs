//! Scenario action scheduling and execution

use crate::agreement::engine::Agreement;
use crate::deployment::owner_cancel;
use crate::models::account::{Account, AccountId};
use crate::models::ledger::AccountBook;
use crate::oracle::PriceOracle;
use crate::orchestrator::ScenarioError;
use crate::scenario::types::{ScenarioAction, ScheduledAction};

/// Handles scenario action scheduling
#[derive(Debug, Clone, Default)]
pub struct ScenarioActionHandler {
    actions: Vec<ScheduledAction>,
}

impl ScenarioActionHandler {
    pub fn new(actions: Vec<ScheduledAction>) -> Self {
        Self { actions }
    }

    /// All actions scheduled for `epoch`, in configuration order
    pub fn actions_for_epoch(&self, epoch: usize) -> Vec<&ScenarioAction> {
        self.actions
            .iter()
            .filter(|scheduled| scheduled.schedule.should_execute(epoch))
            .map(|scheduled| &scheduled.action)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ScenarioAction {
    /// Apply this action to `agreement`, moving funds in `book`
    ///
    /// Agreement rejections come back as `ScenarioError::Agreement`; the
    /// caller decides whether they are fatal.
    pub fn execute(
        &self,
        agreement: &mut Agreement,
        book: &mut AccountBook,
        oracle: &PriceOracle,
    ) -> Result<(), ScenarioError> {
        match self {
            ScenarioAction::AddBroker { broker, stake } => {
                agreement.admit_broker(account_mut(book, broker)?, *stake)?;
            }
            ScenarioAction::ClaimFunds { account } => {
                agreement.claim_funds(account_mut(book, account)?)?;
            }
            ScenarioAction::RemoveBroker { broker } => {
                agreement.remove_broker(account_mut(book, broker)?)?;
            }
            ScenarioAction::Pay { payer, amount } => {
                agreement.pay(account_mut(book, payer)?, *amount)?;
            }
            ScenarioAction::PayInToken {
                payer,
                token,
                quantity,
            } => {
                agreement.pay_in_token(account_mut(book, payer)?, token, *quantity, oracle)?;
            }
            ScenarioAction::Cancel => agreement.cancel()?,
            ScenarioAction::OwnerCancel { issuer } => {
                let issuer = known_id(book, issuer)?;
                owner_cancel(agreement, &issuer, book)?;
            }
            ScenarioAction::Vote {
                voter,
                broker,
                approve,
            } => {
                let voter = known_id(book, voter)?;
                let broker = known_id(book, broker)?;
                agreement.vote(&voter, &broker, *approve)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Account Lookup
// ============================================================================

fn account_mut<'a>(book: &'a mut AccountBook, label: &str) -> Result<&'a mut Account, ScenarioError> {
    book.get_mut(&AccountId::new(label))
        .ok_or_else(|| ScenarioError::UnknownAccount(label.to_string()))
}

fn known_id(book: &AccountBook, label: &str) -> Result<AccountId, ScenarioError> {
    let id = AccountId::new(label);
    if book.get(&id).is_none() {
        return Err(ScenarioError::UnknownAccount(label.to_string()));
    }
    Ok(id)
}
