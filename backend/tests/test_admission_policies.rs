//! Broker admission through whitelist voting
//!
//! Votes go through the agreement, which hands the policy its owner and
//! payer records. CRITICAL: All money values are i64 (cents)

use proposal_inverter_core_rs::admission::{
    AdmissionContext, AdmissionPolicy, PredicateAdmission, VoteRule, WhitelistVoting,
};
use proposal_inverter_core_rs::{
    deploy, Account, AccountId, AdmissionPolicyConfig, Agreement, AgreementError, ConfigOverrides,
    Event, Rejection, Role,
};

struct Fixture {
    owner: Account,
    broker: Account,
    payers: Vec<Account>,
    agreement: Agreement,
}

fn setup(admission: AdmissionPolicyConfig) -> Fixture {
    let mut owner = Account::with_id(AccountId::new("owner"), Role::Owner, 1_000_00);
    let overrides = ConfigOverrides {
        admission: Some(admission),
        ..Default::default()
    };
    let agreement = deploy(&mut owner, 500_00, overrides).unwrap();

    Fixture {
        owner,
        broker: Account::with_id(AccountId::new("broker"), Role::Broker, 100_00),
        payers: (0..3)
            .map(|i| Account::with_id(AccountId::new(format!("payer{}", i)), Role::Payer, 100_00))
            .collect(),
        agreement,
    }
}

impl Fixture {
    /// Each payer contributes the matching amount
    fn fund(&mut self, amounts: &[i64]) {
        for (payer, amount) in self.payers.iter_mut().zip(amounts) {
            self.agreement.pay(payer, *amount).unwrap();
        }
    }

    fn vote(&mut self, voter: usize, approve: bool) -> bool {
        let voter_id = self.payers[voter].id().clone();
        self.agreement
            .vote(&voter_id, self.broker.id(), approve)
            .unwrap()
    }

    fn admit(&mut self) -> Result<(), AgreementError> {
        self.agreement.admit_broker(&mut self.broker, 10_00)
    }
}

fn assert_not_admitted(result: Result<(), AgreementError>) {
    assert!(matches!(
        result.unwrap_err().rejection(),
        Some(Rejection::NotAdmitted { .. })
    ));
}

#[test]
fn test_open_admission_by_default() {
    let mut fx = setup(AdmissionPolicyConfig::Open);
    fx.admit().unwrap();
    assert_eq!(fx.agreement.number_of_brokers(), 1);
}

#[test]
fn test_open_policy_refuses_votes() {
    let mut fx = setup(AdmissionPolicyConfig::Open);
    let owner_id = fx.owner.id().clone();

    let err = fx
        .agreement
        .vote(&owner_id, fx.broker.id(), true)
        .unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::VotingNotSupported("open")));
}

#[test]
fn test_owner_vote() {
    let mut fx = setup(AdmissionPolicyConfig::OwnerVote);
    assert_not_admitted(fx.admit());
    assert_eq!(fx.broker.balance(), 100_00);

    // A payer's vote does not count
    fx.fund(&[10_00]);
    assert!(!fx.vote(0, true));
    assert_not_admitted(fx.admit());

    let owner_id = fx.owner.id().clone();
    assert!(fx.agreement.vote(&owner_id, fx.broker.id(), true).unwrap());
    fx.admit().unwrap();
}

#[test]
fn test_payer_vote() {
    let mut fx = setup(AdmissionPolicyConfig::PayerVote);
    fx.fund(&[10_00]);

    assert!(!fx.vote(0, false));
    assert_not_admitted(fx.admit());

    assert!(fx.vote(0, true));
    fx.admit().unwrap();
}

#[test]
fn test_equal_vote() {
    let mut fx = setup(AdmissionPolicyConfig::EqualVote { min_vote: 0.6 });
    fx.fund(&[10_00, 10_00, 10_00]);

    assert!(!fx.vote(0, true));
    assert!(!fx.vote(1, false));
    assert_not_admitted(fx.admit());

    // A changed vote replaces the earlier one
    assert!(fx.vote(1, true));
    fx.admit().unwrap();
}

#[test]
fn test_weighted_vote() {
    let mut fx = setup(AdmissionPolicyConfig::WeightedVote { min_vote: 0.5 });
    fx.fund(&[10_00, 10_00, 30_00]);

    // 40% of contributions
    assert!(!fx.vote(0, true));
    assert!(!fx.vote(1, true));
    assert_not_admitted(fx.admit());

    assert!(fx.vote(2, true));
    fx.admit().unwrap();
}

#[test]
fn test_consensus_vote() {
    let mut fx = setup(AdmissionPolicyConfig::ConsensusVote);
    fx.fund(&[1_00, 1_00]);

    assert!(!fx.vote(0, true));
    assert_not_admitted(fx.admit());

    assert!(fx.vote(1, true));
    fx.admit().unwrap();
}

#[test]
fn test_votes_are_logged() {
    let mut fx = setup(AdmissionPolicyConfig::PayerVote);
    fx.fund(&[10_00]);
    fx.vote(0, true);

    let votes = fx.agreement.event_log().events_of_type("VoteCast");
    assert_eq!(votes.len(), 1);
    assert!(matches!(
        votes[0],
        Event::VoteCast {
            approve: true,
            whitelisted: true,
            ..
        }
    ));
}

#[test]
fn test_vote_after_cancel_rejected() {
    let mut fx = setup(AdmissionPolicyConfig::OwnerVote);
    fx.agreement.cancel().unwrap();
    let owner_id = fx.owner.id().clone();

    let err = fx
        .agreement
        .vote(&owner_id, fx.broker.id(), true)
        .unwrap_err();
    assert_eq!(
        err.rejection(),
        Some(&Rejection::AgreementCancelled { epoch: 0 })
    );
}

#[test]
fn test_builtin_checks_run_before_policy() {
    let mut fx = setup(AdmissionPolicyConfig::OwnerVote);

    let err = fx.agreement.admit_broker(&mut fx.broker, 1_00).unwrap_err();
    assert!(matches!(
        err.rejection(),
        Some(Rejection::StakeBelowMinimum { .. })
    ));
}

#[test]
fn test_custom_predicate_policy() {
    let mut fx = setup(AdmissionPolicyConfig::Open);
    fx.agreement
        .set_admission_policy(Box::new(PredicateAdmission::new(
            |_broker: &AccountId, ctx: &AdmissionContext<'_>| ctx.num_payers() >= 2,
        )));

    assert_not_admitted(fx.admit());

    fx.fund(&[1_00, 1_00]);
    fx.admit().unwrap();
}

#[test]
fn test_whitelist_moves_broker_off_waitlist() {
    let mut fx = setup(AdmissionPolicyConfig::Open);
    fx.fund(&[10_00, 10_00]);
    let ctx = AdmissionContext {
        owner_id: fx.owner.id(),
        payers: fx.agreement.payers(),
        epoch: fx.agreement.current_epoch(),
    };
    let broker_id = fx.broker.id();
    let (payer0, payer1) = (fx.payers[0].id(), fx.payers[1].id());

    let mut policy = WhitelistVoting::new(VoteRule::Consensus);
    assert_eq!(policy.rule(), VoteRule::Consensus);
    assert!(policy.votes_for(broker_id).is_none());

    assert!(!policy.record_vote(payer0, broker_id, true, &ctx).unwrap());
    assert!(policy.waitlist().contains(broker_id));
    assert!(policy.whitelist().is_empty());
    assert_eq!(policy.votes_for(broker_id).map(|votes| votes.len()), Some(1));

    assert!(policy.record_vote(payer1, broker_id, true, &ctx).unwrap());
    assert!(policy.waitlist().is_empty());
    assert_eq!(policy.whitelist().iter().collect::<Vec<_>>(), vec![broker_id]);
    assert_eq!(policy.votes_for(broker_id).unwrap().get(payer1), Some(&true));
    assert!(policy.evaluate(broker_id, &ctx).is_admit());
}
