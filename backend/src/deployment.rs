//! Owner-side operations
//!
//! Deployment gates agreement creation on a minimum horizon; the owner
//! cancel closes an agreement and pays every party out of an account book.

use crate::agreement::config::{AgreementConfig, ConfigOverrides};
use crate::agreement::engine::Agreement;
use crate::agreement::error::{AgreementError, Rejection};
use crate::models::account::{Account, AccountId};
use crate::models::ledger::AccountBook;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Deploy a new agreement owned by `owner`
///
/// Overrides are merged onto the default configuration. Deployment is
/// refused when `initial_funds` would not cover `min_horizon` epochs of
/// allocation.
///
/// # Example
/// ```
/// use proposal_inverter_core_rs::{deploy, Account, ConfigOverrides, Role};
///
/// let mut owner = Account::new(Role::Owner, 1_000_00);
///
/// // 50 epochs of runway at the default 10.00 per epoch
/// let agreement = deploy(&mut owner, 500_00, ConfigOverrides::default()).unwrap();
/// assert_eq!(agreement.funds(), 500_00);
///
/// // 6 epochs is below the default minimum horizon of 7
/// assert!(deploy(&mut owner, 60_00, ConfigOverrides::default()).is_err());
/// ```
pub fn deploy(
    owner: &mut Account,
    initial_funds: i64,
    overrides: ConfigOverrides,
) -> Result<Agreement, AgreementError> {
    let config = overrides.apply(AgreementConfig::default());
    config.validate()?;

    let horizon = config.horizon_for(initial_funds);
    if horizon < config.min_horizon {
        let rejection = Rejection::HorizonBelowMinimum {
            horizon,
            min_horizon: config.min_horizon,
        };
        warn!(owner = %owner.id(), initial_funds, reason = %rejection, "deployment rejected");
        return Err(rejection.into());
    }

    Agreement::new(owner, initial_funds, config)
}

/// Payouts made by an owner cancel
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CancellationSummary {
    /// Amount claimed on behalf of each account, keyed by account id
    pub payouts: BTreeMap<AccountId, i64>,

    /// Funds left in the agreement afterwards
    pub remaining_funds: i64,
}

impl CancellationSummary {
    pub fn total_paid(&self) -> i64 {
        self.payouts.values().sum()
    }
}

/// Cancel `agreement` on behalf of its owner and drain it into `book`
///
/// Claims for every account in `book` the agreement holds a record for,
/// including the owner's residual record. Cancelling an agreement that was
/// already (force) cancelled just drains it.
pub fn owner_cancel(
    agreement: &mut Agreement,
    issuer: &AccountId,
    book: &mut AccountBook,
) -> Result<CancellationSummary, AgreementError> {
    if issuer != agreement.owner_id() {
        return agreement.reject(
            Some(issuer),
            "owner_cancel",
            Rejection::NotOwner(issuer.clone()),
        );
    }

    if agreement.is_active() {
        agreement.cancel()?;
    }

    let claimants: Vec<AccountId> = book
        .accounts()
        .map(|account| account.id().clone())
        .filter(|id| agreement.has_record(id))
        .collect();

    let mut summary = CancellationSummary::default();
    for id in claimants {
        if let Some(account) = book.get_mut(&id) {
            let amount = agreement.claim_funds(account)?;
            summary.payouts.insert(id, amount);
        }
    }
    summary.remaining_funds = agreement.funds();

    info!(
        owner = %issuer,
        paid = summary.total_paid(),
        remaining = summary.remaining_funds,
        "owner cancel complete"
    );

    Ok(summary)
}
