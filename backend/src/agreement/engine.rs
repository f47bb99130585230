//! Agreement Engine
//!
//! Holds pooled funds, the broker registry and the epoch counter, and
//! implements admission, claims, removal, payments, per-epoch accrual and
//! cancellation.
//!
//! # Epoch Step
//!
//! ```text
//! For each epoch e (while active):
//! 1. Accrue allocation_per_epoch / n to every broker (capped by unreserved funds)
//! 2. Record e as the last sustainable epoch if brokers >= min_brokers
//!    or horizon >= min_horizon
//! 3. Force a cancel if e - cancel_epoch > buffer_period
//! 4. Advance to e + 1
//! ```
//!
//! # Critical Invariants
//!
//! 1. **Reserved funds**: while active, `funds >= total_allocated + total_stake`
//! 2. **Allocation coverage**: always, `funds >= total_allocated`
//! 3. **Atomic rejections**: a rejected request changes nothing except the
//!    event log
//!
//! # Example
//!
//! ```rust
//! use proposal_inverter_core_rs::{Account, Agreement, AgreementConfig, Role};
//!
//! let mut owner = Account::new(Role::Owner, 1_000_00);
//! let mut broker = Account::new(Role::Broker, 100_00);
//!
//! let mut agreement = Agreement::new(&mut owner, 500_00, AgreementConfig::default()).unwrap();
//! agreement.admit_broker(&mut broker, 50_00).unwrap();
//! agreement.advance_epoch(10).unwrap();
//!
//! assert_eq!(agreement.claim_funds(&mut broker).unwrap(), 100_00);
//! assert_eq!(broker.balance(), 150_00);
//! assert_eq!(agreement.funds(), 450_00);
//! ```

use crate::admission::{AdmissionContext, AdmissionDecision, AdmissionPolicy};
use crate::agreement::config::AgreementConfig;
use crate::agreement::error::{AgreementError, Rejection};
use crate::core::epoch::EpochClock;
use crate::models::account::{Account, AccountId};
use crate::models::agreement::{BrokerAgreement, BrokerRegistry, PayerAgreement};
use crate::models::event::{Event, EventLog};
use crate::oracle::{OracleError, PriceOracle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

// ============================================================================
// Status and Results
// ============================================================================

/// Lifecycle of an agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AgreementStatus {
    Active,
    Cancelled {
        /// Epoch at which the cancel happened
        epoch: usize,
        /// True if triggered by the sustainability check
        forced: bool,
    },
}

/// What a broker took home on removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BrokerExit {
    pub stake_refunded: i64,
    pub stake_forfeited: i64,
    pub claimed: i64,
}

impl BrokerExit {
    /// Total credited to the broker
    pub fn payout(&self) -> i64 {
        self.stake_refunded + self.claimed
    }
}

// ============================================================================
// Agreement
// ============================================================================

pub struct Agreement {
    owner_id: AccountId,
    config: AgreementConfig,

    /// Pooled funds held by the agreement (i64 cents)
    funds: i64,

    clock: EpochClock,

    /// Last epoch at which the sustainability conditions held
    cancel_epoch: usize,

    status: AgreementStatus,
    brokers: BrokerRegistry,

    /// Residual record for the owner, created by a cancel with no brokers
    owner_agreement: Option<BrokerAgreement>,

    payers: BTreeMap<AccountId, PayerAgreement>,
    admission: Box<dyn AdmissionPolicy>,
    event_log: EventLog,
}

impl fmt::Debug for Agreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agreement")
            .field("owner_id", &self.owner_id)
            .field("funds", &self.funds)
            .field("current_epoch", &self.current_epoch())
            .field("cancel_epoch", &self.cancel_epoch)
            .field("status", &self.status)
            .field("brokers", &self.brokers)
            .field("owner_agreement", &self.owner_agreement)
            .field("payers", &self.payers)
            .field("admission", &self.admission.name())
            .finish()
    }
}

impl Agreement {
    /// Create an agreement owned and funded by `owner`
    ///
    /// The owner is debited `initial_funds` only if it can afford them;
    /// otherwise the agreement starts with zero funds and a warning is
    /// logged. Deployment through [`crate::deployment::deploy`] adds the
    /// minimum-horizon check.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration fails validation
    /// - `NegativeAmount` if `initial_funds < 0`
    pub fn new(
        owner: &mut Account,
        initial_funds: i64,
        config: AgreementConfig,
    ) -> Result<Self, AgreementError> {
        config.validate()?;
        if initial_funds < 0 {
            return Err(AgreementError::NegativeAmount(initial_funds));
        }

        let funds = if owner.can_pay(initial_funds) {
            owner.debit(initial_funds)?;
            initial_funds
        } else {
            warn!(
                owner = %owner.id(),
                balance = owner.balance(),
                initial_funds,
                "owner cannot afford initial funds, agreement starts empty"
            );
            0
        };

        let clock = EpochClock::new(config.epoch_length, config.current_epoch);
        let mut agreement = Self {
            owner_id: owner.id().clone(),
            cancel_epoch: config.cancel_epoch,
            admission: config.admission.build(),
            config,
            funds,
            clock,
            status: AgreementStatus::Active,
            brokers: BrokerRegistry::new(),
            owner_agreement: None,
            payers: BTreeMap::new(),
            event_log: EventLog::new(),
        };

        agreement.event_log.log(Event::Deployed {
            epoch: agreement.current_epoch(),
            owner_id: agreement.owner_id.clone(),
            initial_funds: funds,
        });
        info!(owner = %agreement.owner_id, funds, "agreement deployed");

        Ok(agreement)
    }

    /// Replace the admission policy built from the configuration
    pub fn set_admission_policy(&mut self, policy: Box<dyn AdmissionPolicy>) {
        self.admission = policy;
    }

    // ========================================================================
    // Broker Operations
    // ========================================================================

    /// Stake `stake` from `broker` and register it
    ///
    /// Checks, in order: agreement active, not already registered, capacity,
    /// minimum stake, admission policy, broker balance, funds overflow. The
    /// first failure is returned as a rejection and nothing changes.
    pub fn admit_broker(&mut self, broker: &mut Account, stake: i64) -> Result<(), AgreementError> {
        const OP: &str = "admit_broker";

        if stake < 0 {
            return Err(AgreementError::NegativeAmount(stake));
        }
        let broker_id = broker.id().clone();

        if let AgreementStatus::Cancelled { epoch, .. } = self.status {
            return self.reject(Some(&broker_id), OP, Rejection::AgreementCancelled { epoch });
        }
        if self.brokers.contains(&broker_id) {
            return self.reject(Some(&broker_id), OP, Rejection::AlreadyRegistered(broker_id.clone()));
        }
        if self.brokers.len() + 1 > self.config.max_brokers {
            let max = self.config.max_brokers;
            return self.reject(Some(&broker_id), OP, Rejection::CapacityReached { max });
        }
        if stake < self.config.min_stake {
            let min_stake = self.config.min_stake;
            return self.reject(
                Some(&broker_id),
                OP,
                Rejection::StakeBelowMinimum { stake, min_stake },
            );
        }

        let ctx = AdmissionContext {
            owner_id: &self.owner_id,
            payers: &self.payers,
            epoch: self.clock.current_epoch(),
        };
        if let AdmissionDecision::Refuse { reason } = self.admission.evaluate(&broker_id, &ctx) {
            return self.reject(
                Some(&broker_id),
                OP,
                Rejection::NotAdmitted {
                    broker_id: broker_id.clone(),
                    reason,
                },
            );
        }

        if !broker.can_pay(stake) {
            let available = broker.balance();
            return self.reject(
                Some(&broker_id),
                OP,
                Rejection::InsufficientFunds {
                    required: stake,
                    available,
                },
            );
        }

        let Some(funds) = self.funds.checked_add(stake) else {
            let funds = self.funds;
            return self.reject(
                Some(&broker_id),
                OP,
                Rejection::FundsOverflow {
                    funds,
                    amount: stake,
                },
            );
        };
        broker.debit(stake)?;
        self.funds = funds;

        let epoch = self.current_epoch();
        self.brokers
            .insert(BrokerAgreement::new(broker_id.clone(), epoch, stake));

        self.event_log.log(Event::BrokerAdmitted {
            epoch,
            broker_id: broker_id.clone(),
            stake,
        });
        debug!(broker = %broker_id, stake, epoch, "broker admitted");

        Ok(())
    }

    /// Pay out everything earmarked for `account`
    ///
    /// Works for brokers and, after a cancel with no brokers, for the owner.
    /// Claiming with nothing earmarked succeeds and pays zero.
    pub fn claim_funds(&mut self, account: &mut Account) -> Result<i64, AgreementError> {
        let account_id = account.id().clone();

        let amount = match self.record(&account_id) {
            Some(record) => record.allocated_funds(),
            None => {
                return self.reject(
                    Some(&account_id),
                    "claim_funds",
                    Rejection::NotRegistered(account_id.clone()),
                )
            }
        };
        if amount > self.funds {
            return Err(AgreementError::InvariantViolation(format!(
                "claim of {} by {} exceeds funds {}",
                amount, account_id, self.funds
            )));
        }

        if let Some(record) = self.record_mut(&account_id) {
            record.take_claim();
        }
        self.funds -= amount;
        account.credit(amount);

        self.event_log.log(Event::FundsClaimed {
            epoch: self.current_epoch(),
            account_id: account_id.clone(),
            amount,
        });
        debug!(account = %account_id, amount, "funds claimed");

        Ok(amount)
    }

    /// Remove a broker, refunding its stake if it stayed `min_epochs`
    ///
    /// Early exits forfeit the stake to the agreement. Outstanding
    /// allocation is always paid out. After a cancel the stake has already
    /// been folded into the allocation, so only the claim is paid.
    pub fn remove_broker(&mut self, broker: &mut Account) -> Result<BrokerExit, AgreementError> {
        let broker_id = broker.id().clone();

        let Some(record) = self.brokers.get(&broker_id) else {
            return self.reject(
                Some(&broker_id),
                "remove_broker",
                Rejection::NotRegistered(broker_id.clone()),
            );
        };

        let stake = record.initial_stake();
        let claimed = record.allocated_funds();
        let vested = record.epochs_committed(self.current_epoch()) >= self.config.min_epochs;

        let (stake_refunded, stake_forfeited) = match self.status {
            AgreementStatus::Cancelled { .. } => (0, 0),
            AgreementStatus::Active if vested => (stake, 0),
            AgreementStatus::Active => (0, stake),
        };

        if stake_refunded + claimed > self.funds {
            return Err(AgreementError::InvariantViolation(format!(
                "exit of {} needs {} but funds are {}",
                broker_id,
                stake_refunded + claimed,
                self.funds
            )));
        }

        if let Some(mut record) = self.brokers.remove(&broker_id) {
            record.take_claim();
        }
        self.funds -= stake_refunded + claimed;
        broker.credit(stake_refunded + claimed);

        let epoch = self.current_epoch();
        self.event_log.log(Event::FundsClaimed {
            epoch,
            account_id: broker_id.clone(),
            amount: claimed,
        });
        self.event_log.log(Event::BrokerRemoved {
            epoch,
            broker_id: broker_id.clone(),
            stake_refunded,
            stake_forfeited,
        });
        debug!(
            broker = %broker_id,
            stake_refunded,
            stake_forfeited,
            claimed,
            "broker removed"
        );

        Ok(BrokerExit {
            stake_refunded,
            stake_forfeited,
            claimed,
        })
    }

    // ========================================================================
    // Payer Operations
    // ========================================================================

    /// Top up the agreement from `payer`
    pub fn pay(&mut self, payer: &mut Account, amount: i64) -> Result<(), AgreementError> {
        const OP: &str = "pay";

        if amount < 0 {
            return Err(AgreementError::NegativeAmount(amount));
        }
        let payer_id = payer.id().clone();

        if let AgreementStatus::Cancelled { epoch, .. } = self.status {
            return self.reject(Some(&payer_id), OP, Rejection::AgreementCancelled { epoch });
        }
        if !payer.can_pay(amount) {
            let available = payer.balance();
            return self.reject(
                Some(&payer_id),
                OP,
                Rejection::InsufficientFunds {
                    required: amount,
                    available,
                },
            );
        }

        let Some(funds) = self.funds.checked_add(amount) else {
            let funds = self.funds;
            return self.reject(Some(&payer_id), OP, Rejection::FundsOverflow { funds, amount });
        };
        payer.debit(amount)?;
        self.funds = funds;

        let epoch = self.current_epoch();
        self.payers
            .entry(payer_id.clone())
            .or_default()
            .record(epoch, amount);

        self.event_log.log(Event::Payment {
            epoch,
            payer_id: payer_id.clone(),
            amount,
        });
        debug!(payer = %payer_id, amount, "payment received");

        Ok(())
    }

    /// Pay `quantity` units of `token`, converted to cents through `oracle`
    ///
    /// Returns the amount credited to the agreement.
    pub fn pay_in_token(
        &mut self,
        payer: &mut Account,
        token: &str,
        quantity: f64,
        oracle: &PriceOracle,
    ) -> Result<i64, AgreementError> {
        let amount = match oracle.to_minor_units(token, quantity) {
            Ok(amount) => amount,
            Err(OracleError::UnknownToken(token)) => {
                let payer_id = payer.id().clone();
                return self.reject(Some(&payer_id), "pay_in_token", Rejection::UnknownToken(token));
            }
            Err(err) => return Err(err.into()),
        };

        self.pay(payer, amount)?;
        Ok(amount)
    }

    /// Cast a whitelist vote through the admission policy
    ///
    /// Returns whether `broker_id` is whitelisted afterwards.
    pub fn vote(
        &mut self,
        voter_id: &AccountId,
        broker_id: &AccountId,
        approve: bool,
    ) -> Result<bool, AgreementError> {
        const OP: &str = "vote";

        if let AgreementStatus::Cancelled { epoch, .. } = self.status {
            return self.reject(Some(voter_id), OP, Rejection::AgreementCancelled { epoch });
        }

        let epoch = self.current_epoch();
        let ctx = AdmissionContext {
            owner_id: &self.owner_id,
            payers: &self.payers,
            epoch,
        };
        let whitelisted = match self.admission.record_vote(voter_id, broker_id, approve, &ctx) {
            Ok(whitelisted) => whitelisted,
            Err(rejection) => return self.reject(Some(voter_id), OP, rejection),
        };

        self.event_log.log(Event::VoteCast {
            epoch,
            voter_id: voter_id.clone(),
            broker_id: broker_id.clone(),
            approve,
            whitelisted,
        });
        debug!(voter = %voter_id, broker = %broker_id, approve, whitelisted, "vote cast");

        Ok(whitelisted)
    }

    // ========================================================================
    // Epoch Processing
    // ========================================================================

    /// Run `n` full epoch steps
    pub fn advance_epoch(&mut self, n: usize) -> Result<(), AgreementError> {
        for _ in 0..n {
            self.step_epoch()?;
        }
        Ok(())
    }

    /// Run a single epoch step
    pub fn step_epoch(&mut self) -> Result<(), AgreementError> {
        if self.is_active() {
            self.accrue()?;
            self.check_sustainability();

            if self.current_epoch() - self.cancel_epoch > self.config.buffer_period {
                warn!(
                    epoch = self.current_epoch(),
                    cancel_epoch = self.cancel_epoch,
                    buffer_period = self.config.buffer_period,
                    "sustainability buffer exhausted, forcing cancel"
                );
                self.cancel_inner(true)?;
            }
        }

        debug!(
            epoch = self.current_epoch(),
            funds = self.funds,
            brokers = self.brokers.len(),
            "epoch complete"
        );
        self.clock.advance();

        Ok(())
    }

    /// Earmark this epoch's allocation, split evenly across brokers
    fn accrue(&mut self) -> Result<(), AgreementError> {
        let epoch = self.current_epoch();
        let num_brokers = self.brokers.len();

        if num_brokers == 0 {
            self.event_log.log(Event::AccrualSkipped { epoch });
            return Ok(());
        }

        let requested = self.config.allocation_per_epoch;
        let available = self.unreserved_funds().max(0);
        let budget = if available < requested {
            warn!(epoch, requested, available, "allocation capped by unreserved funds");
            self.event_log.log(Event::AllocationShortfall {
                epoch,
                requested,
                available,
            });
            available
        } else {
            requested
        };

        // Integer split; up to n - 1 cents per epoch stay unallocated
        let per_broker = budget / num_brokers as i64;
        for record in self.brokers.iter_mut() {
            record.accrue(per_broker);
        }

        self.event_log.log(Event::Accrual {
            epoch,
            num_brokers,
            per_broker,
        });

        Ok(())
    }

    fn check_sustainability(&mut self) {
        let num_brokers = self.brokers.len();
        let horizon = self.horizon();

        if num_brokers >= self.config.min_brokers || horizon >= self.config.min_horizon {
            self.cancel_epoch = self.current_epoch();
        } else {
            let epoch = self.current_epoch();
            self.event_log.log(Event::Unsustainable {
                epoch,
                epochs_since_sustainable: epoch - self.cancel_epoch,
                horizon,
                num_brokers,
            });
        }
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Cancel the agreement and earmark all remaining funds
    ///
    /// Each broker is allocated its stake plus an equal share of the
    /// residual `funds - total_stake - total_allocated`; the last broker in
    /// admission order also gets the remainder of the division. With no
    /// brokers the whole residual is earmarked for the owner. Funds stay in
    /// the agreement until the parties claim them.
    pub fn cancel(&mut self) -> Result<(), AgreementError> {
        if let AgreementStatus::Cancelled { epoch, .. } = self.status {
            let owner_id = self.owner_id.clone();
            return self.reject(Some(&owner_id), "cancel", Rejection::AgreementCancelled { epoch });
        }
        self.cancel_inner(false)
    }

    fn cancel_inner(&mut self, forced: bool) -> Result<(), AgreementError> {
        let epoch = self.current_epoch();
        let total_stake = self.brokers.total_stake();
        let residual = self.funds - total_stake - self.brokers.total_allocated();

        if residual < 0 {
            return Err(AgreementError::InvariantViolation(format!(
                "funds {} do not cover stakes {} and allocations {}",
                self.funds,
                total_stake,
                self.brokers.total_allocated()
            )));
        }

        let num_brokers = self.brokers.len();
        let owner_residual = if num_brokers == 0 {
            let mut record = BrokerAgreement::new(self.owner_id.clone(), epoch, 0);
            record.accrue(residual);
            self.owner_agreement = Some(record);
            residual
        } else {
            let share = residual / num_brokers as i64;
            let remainder = residual % num_brokers as i64;
            for (i, record) in self.brokers.iter_mut().enumerate() {
                let extra = if i + 1 == num_brokers { remainder } else { 0 };
                let amount = record.initial_stake() + share + extra;
                record.accrue(amount);
            }
            0
        };

        self.status = AgreementStatus::Cancelled { epoch, forced };
        self.event_log.log(Event::Cancelled {
            epoch,
            forced,
            residual,
            owner_residual,
        });
        info!(epoch, forced, residual, num_brokers, "agreement cancelled");

        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn funds(&self) -> i64 {
        self.funds
    }

    pub fn current_epoch(&self) -> usize {
        self.clock.current_epoch()
    }

    pub fn cancel_epoch(&self) -> usize {
        self.cancel_epoch
    }

    pub fn config(&self) -> &AgreementConfig {
        &self.config
    }

    pub fn owner_id(&self) -> &AccountId {
        &self.owner_id
    }

    pub fn status(&self) -> AgreementStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == AgreementStatus::Active
    }

    pub fn is_cancelled(&self) -> bool {
        !self.is_active()
    }

    pub fn number_of_brokers(&self) -> usize {
        self.brokers.len()
    }

    /// Per-broker share of one epoch's allocation
    ///
    /// Integer division: up to `n - 1` cents of each epoch's allocation stay
    /// unallocated, so brokers share equally only up to that truncation.
    ///
    /// # Errors
    /// `NoBrokers` when no broker is committed
    pub fn claimable_per_epoch(&self) -> Result<i64, AgreementError> {
        match self.brokers.len() {
            0 => Err(AgreementError::NoBrokers),
            n => Ok(self.config.allocation_per_epoch / n as i64),
        }
    }

    /// Unclaimed allocation across brokers and the owner's residual record
    pub fn total_allocated(&self) -> i64 {
        self.brokers.total_allocated()
            + self
                .owner_agreement
                .as_ref()
                .map(BrokerAgreement::allocated_funds)
                .unwrap_or(0)
    }

    pub fn total_stake(&self) -> i64 {
        self.brokers.total_stake()
    }

    /// Funds neither earmarked nor held as stake
    ///
    /// After a cancel the stakes are part of the allocation.
    pub fn unreserved_funds(&self) -> i64 {
        match self.status {
            AgreementStatus::Active => self.funds - self.total_allocated() - self.total_stake(),
            AgreementStatus::Cancelled { .. } => self.funds - self.total_allocated(),
        }
    }

    /// Unallocated funds in epochs of runway at the current allocation rate
    pub fn horizon(&self) -> f64 {
        self.config
            .horizon_for(self.funds - self.total_allocated())
    }

    pub fn broker_agreement(&self, broker_id: &AccountId) -> Option<&BrokerAgreement> {
        self.brokers.get(broker_id)
    }

    pub fn brokers(&self) -> &BrokerRegistry {
        &self.brokers
    }

    pub fn owner_agreement(&self) -> Option<&BrokerAgreement> {
        self.owner_agreement.as_ref()
    }

    pub fn payer_agreement(&self, payer_id: &AccountId) -> Option<&PayerAgreement> {
        self.payers.get(payer_id)
    }

    pub fn payers(&self) -> &BTreeMap<AccountId, PayerAgreement> {
        &self.payers
    }

    /// True if the agreement holds an accounting record for `account_id`
    pub fn has_record(&self, account_id: &AccountId) -> bool {
        self.record(account_id).is_some()
    }

    pub fn admission_policy(&self) -> &dyn AdmissionPolicy {
        self.admission.as_ref()
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn clock(&self) -> &EpochClock {
        &self.clock
    }

    /// Verify the funding invariants
    pub fn check_invariants(&self) -> Result<(), AgreementError> {
        let total_allocated = self.total_allocated();

        if self.funds < 0 {
            return Err(AgreementError::InvariantViolation(format!(
                "negative funds: {}",
                self.funds
            )));
        }
        if self.funds < total_allocated {
            return Err(AgreementError::InvariantViolation(format!(
                "funds {} below allocated {}",
                self.funds, total_allocated
            )));
        }
        if self.is_active() && self.funds < total_allocated + self.total_stake() {
            return Err(AgreementError::InvariantViolation(format!(
                "funds {} below allocated {} plus stakes {}",
                self.funds,
                total_allocated,
                self.total_stake()
            )));
        }
        if self.brokers.len() > self.config.max_brokers {
            return Err(AgreementError::InvariantViolation(format!(
                "{} brokers exceed max_brokers {}",
                self.brokers.len(),
                self.config.max_brokers
            )));
        }
        if self.cancel_epoch > self.current_epoch() {
            return Err(AgreementError::InvariantViolation(format!(
                "cancel_epoch {} after current epoch {}",
                self.cancel_epoch,
                self.current_epoch()
            )));
        }

        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn record(&self, account_id: &AccountId) -> Option<&BrokerAgreement> {
        self.brokers.get(account_id).or_else(|| {
            self.owner_agreement
                .as_ref()
                .filter(|record| record.broker_id() == account_id)
        })
    }

    fn record_mut(&mut self, account_id: &AccountId) -> Option<&mut BrokerAgreement> {
        if self.brokers.contains(account_id) {
            return self.brokers.get_mut(account_id);
        }
        self.owner_agreement
            .as_mut()
            .filter(|record| record.broker_id() == account_id)
    }

    /// Log a refusal and return it
    pub(crate) fn reject<T>(
        &mut self,
        account_id: Option<&AccountId>,
        operation: &'static str,
        rejection: Rejection,
    ) -> Result<T, AgreementError> {
        warn!(
            account = ?account_id.map(AccountId::as_str),
            operation,
            reason = %rejection,
            "request rejected"
        );
        self.event_log.log(Event::Rejected {
            epoch: self.current_epoch(),
            account_id: account_id.cloned(),
            operation,
            reason: rejection.to_string(),
        });
        Err(rejection.into())
    }
}
