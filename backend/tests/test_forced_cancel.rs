//! Forced cancellation
//!
//! An agreement that stays below both `min_brokers` and `min_horizon` for
//! more than `buffer_period` epochs cancels itself, earmarking every
//! remaining cent. CRITICAL: All money values are i64 (cents)

use proposal_inverter_core_rs::{
    deploy, Account, Agreement, AgreementStatus, ConfigOverrides, Event, Role,
};

fn owner() -> Account {
    Account::new(Role::Owner, 1_000_00)
}

fn broker() -> Account {
    Account::new(Role::Broker, 100_00)
}

fn inverter(owner: &mut Account, min_brokers: usize) -> Agreement {
    let overrides = ConfigOverrides {
        min_brokers: Some(min_brokers),
        ..Default::default()
    };
    deploy(owner, 100_00, overrides).unwrap()
}

fn assert_forced(agreement: &Agreement) {
    assert!(matches!(
        agreement.status(),
        AgreementStatus::Cancelled { forced: true, .. }
    ));
}

/// Too few brokers, funds run down until the horizon drops
#[test]
fn test_forced_cancel_case1() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 2);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();
    agreement.advance_epoch(10).unwrap();

    assert!(agreement.number_of_brokers() < agreement.config().min_brokers);
    assert!(agreement.horizon() < agreement.config().min_horizon);
    assert_eq!(agreement.total_allocated(), agreement.funds());
    assert_forced(&agreement);

    // Stake plus 100.00 accrued
    assert_eq!(agreement.claim_funds(&mut broker1).unwrap(), 110_00);
    assert_eq!(agreement.funds(), 0);
}

/// The only broker leaves; the owner gets the residual
#[test]
fn test_forced_cancel_case2() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 1);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 9_00).unwrap();
    agreement.advance_epoch(5).unwrap();
    agreement.remove_broker(&mut broker1).unwrap();

    // Early exit forfeits the stake
    assert_eq!(broker1.balance(), 141_00);
    assert_eq!(agreement.funds(), 59_00);
    assert!(agreement.is_active());

    agreement.advance_epoch(6).unwrap();

    assert_eq!(agreement.number_of_brokers(), 0);
    assert!(agreement.horizon() < agreement.config().min_horizon);
    assert_eq!(agreement.total_allocated(), agreement.funds());
    assert_forced(&agreement);

    let record = agreement.owner_agreement().unwrap();
    assert_eq!(record.allocated_funds(), 59_00);

    agreement.claim_funds(&mut owner).unwrap();
    assert_eq!(owner.balance(), 959_00);
    assert_eq!(agreement.funds(), 0);
}

/// Sustainable again for a while, then the buffer runs out
#[test]
fn test_forced_cancel_case3() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 2);
    let mut broker1 = broker();
    let mut broker2 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();
    agreement.advance_epoch(6).unwrap();

    assert!(agreement.number_of_brokers() < agreement.config().min_brokers);
    assert!(agreement.horizon() < agreement.config().min_horizon);
    assert!(agreement.total_allocated() < agreement.funds());
    assert!(agreement.is_active());

    agreement.admit_broker(&mut broker2, 60_00).unwrap();

    assert!(agreement.number_of_brokers() >= agreement.config().min_brokers);
    assert!(agreement.horizon() >= agreement.config().min_horizon);

    agreement.remove_broker(&mut broker1).unwrap();
    agreement.advance_epoch(6).unwrap();

    assert!(agreement.number_of_brokers() < agreement.config().min_brokers);
    assert!(agreement.horizon() < agreement.config().min_horizon);
    assert!(agreement.total_allocated() < agreement.funds());
    assert!(agreement.is_active());

    agreement.advance_epoch(4).unwrap();

    assert!(agreement.number_of_brokers() < agreement.config().min_brokers);
    assert!(agreement.horizon() < agreement.config().min_horizon);
    assert_eq!(agreement.total_allocated(), agreement.funds());
    assert_forced(&agreement);
}

#[test]
fn test_exactly_buffer_period_does_not_cancel() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 2);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();

    // Last sustainable epoch is 3; epoch 8 is exactly buffer_period later
    agreement.advance_epoch(9).unwrap();
    assert_eq!(agreement.cancel_epoch(), 3);
    assert!(agreement.is_active());

    agreement.step_epoch().unwrap();
    assert_eq!(
        agreement.status(),
        AgreementStatus::Cancelled {
            epoch: 9,
            forced: true
        }
    );
}

#[test]
fn test_unsustainable_epochs_are_logged() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 2);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();
    agreement.advance_epoch(10).unwrap();

    let unsustainable = agreement.event_log().events_of_type("Unsustainable");
    assert_eq!(unsustainable.len(), 6);
    assert!(matches!(
        unsustainable.last(),
        Some(Event::Unsustainable {
            epoch: 9,
            epochs_since_sustainable: 6,
            ..
        })
    ));

    let cancelled = agreement.event_log().events_of_type("Cancelled");
    assert_eq!(cancelled.len(), 1);
}

#[test]
fn test_enough_brokers_keeps_agreement_alive() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 1);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();
    agreement.advance_epoch(30).unwrap();

    // Allocation is capped once unreserved funds run out
    assert!(agreement.is_active());
    assert_eq!(agreement.cancel_epoch(), 29);
    assert_eq!(agreement.total_allocated(), 100_00);
    assert!(!agreement
        .event_log()
        .events_of_type("AllocationShortfall")
        .is_empty());
    agreement.check_invariants().unwrap();
}

#[test]
fn test_step_after_forced_cancel_is_inert() {
    let mut owner = owner();
    let mut agreement = inverter(&mut owner, 2);
    let mut broker1 = broker();

    agreement.admit_broker(&mut broker1, 10_00).unwrap();
    agreement.advance_epoch(10).unwrap();
    assert_forced(&agreement);

    let events = agreement.event_log().len();
    agreement.advance_epoch(5).unwrap();

    assert_eq!(agreement.current_epoch(), 15);
    assert_eq!(agreement.event_log().len(), events);
    assert_eq!(agreement.total_allocated(), agreement.funds());
}
