//! Property tests: funds conservation and agreement invariants
//!
//! Random sequences of broker, payer and epoch operations must never create
//! or destroy money, and the agreement must never hold less than it owes.
//! CRITICAL: All money values are i64 (cents)

use proposal_inverter_core_rs::{
    deploy, owner_cancel, Account, AccountBook, AccountId, ConfigOverrides, Role,
};
use proptest::prelude::*;

const NUM_BROKERS: usize = 6;
const NUM_PAYERS: usize = 2;

#[derive(Debug, Clone)]
enum Op {
    Admit { broker: usize, stake: i64 },
    Claim { broker: usize },
    Remove { broker: usize },
    Pay { payer: usize, amount: i64 },
    Advance { epochs: usize },
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..NUM_BROKERS, 0i64..60_00).prop_map(|(broker, stake)| Op::Admit { broker, stake }),
        2 => (0..NUM_BROKERS).prop_map(|broker| Op::Claim { broker }),
        2 => (0..NUM_BROKERS).prop_map(|broker| Op::Remove { broker }),
        2 => (0..NUM_PAYERS, 0i64..40_00).prop_map(|(payer, amount)| Op::Pay { payer, amount }),
        4 => (1usize..15).prop_map(|epochs| Op::Advance { epochs }),
        1 => Just(Op::Cancel),
    ]
}

fn broker_id(i: usize) -> AccountId {
    AccountId::new(format!("broker{}", i))
}

fn payer_id(i: usize) -> AccountId {
    AccountId::new(format!("payer{}", i))
}

fn setup_book() -> AccountBook {
    let mut book = AccountBook::new();
    book.insert(Account::with_id(AccountId::new("owner"), Role::Owner, 1_000_00))
        .unwrap();
    for i in 0..NUM_BROKERS {
        book.insert(Account::with_id(broker_id(i), Role::Broker, 100_00))
            .unwrap();
    }
    for i in 0..NUM_PAYERS {
        book.insert(Account::with_id(payer_id(i), Role::Payer, 100_00))
            .unwrap();
    }
    book
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_funds_are_conserved(
        initial_funds in 70_00i64..600_00,
        min_brokers in 1usize..4,
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut book = setup_book();
        let expected_total = book.total_balance().unwrap();

        let overrides = ConfigOverrides {
            min_brokers: Some(min_brokers),
            ..Default::default()
        };
        let owner = book.get_mut(&AccountId::new("owner")).unwrap();
        let mut agreement = deploy(owner, initial_funds, overrides).unwrap();

        for op in ops {
            // Rejections are expected; anything else is a bug
            let result = match op {
                Op::Admit { broker, stake } => {
                    let account = book.get_mut(&broker_id(broker)).unwrap();
                    agreement.admit_broker(account, stake)
                }
                Op::Claim { broker } => {
                    let account = book.get_mut(&broker_id(broker)).unwrap();
                    agreement.claim_funds(account).map(|_| ())
                }
                Op::Remove { broker } => {
                    let account = book.get_mut(&broker_id(broker)).unwrap();
                    agreement.remove_broker(account).map(|_| ())
                }
                Op::Pay { payer, amount } => {
                    let account = book.get_mut(&payer_id(payer)).unwrap();
                    agreement.pay(account, amount)
                }
                Op::Advance { epochs } => agreement.advance_epoch(epochs),
                Op::Cancel => agreement.cancel(),
            };
            if let Err(err) = result {
                prop_assert!(err.is_rejection(), "unexpected error: {}", err);
            }

            prop_assert_eq!(book.total_balance().unwrap() + agreement.funds(), expected_total);
            prop_assert!(agreement.check_invariants().is_ok());
            prop_assert!(agreement.number_of_brokers() <= agreement.config().max_brokers);
        }

        // Draining through the owner leaves nothing behind
        owner_cancel(&mut agreement, &AccountId::new("owner"), &mut book).unwrap();
        prop_assert_eq!(agreement.funds(), 0);
        prop_assert_eq!(book.total_balance().unwrap(), expected_total);
    }

    #[test]
    fn prop_rejected_admission_changes_nothing(
        stake in 0i64..5_00,
        epochs in 0usize..40,
    ) {
        let mut book = setup_book();
        let owner = book.get_mut(&AccountId::new("owner")).unwrap();
        let mut agreement = deploy(owner, 500_00, ConfigOverrides::default()).unwrap();
        agreement.advance_epoch(epochs).unwrap();

        let funds = agreement.funds();
        let broker = book.get_mut(&broker_id(0)).unwrap();
        let err = agreement.admit_broker(broker, stake).unwrap_err();

        prop_assert!(err.is_rejection());
        prop_assert_eq!(agreement.funds(), funds);
        prop_assert_eq!(agreement.number_of_brokers(), 0);
        prop_assert_eq!(book.balance(&broker_id(0)), Some(100_00));
    }

    #[test]
    fn prop_cancel_earmarks_everything(
        stakes in prop::collection::vec(5_00i64..100_00, 0..5),
        epochs in 0usize..60,
    ) {
        let mut book = setup_book();
        let owner = book.get_mut(&AccountId::new("owner")).unwrap();
        let mut agreement = deploy(owner, 300_00, ConfigOverrides::default()).unwrap();

        for (i, stake) in stakes.iter().enumerate() {
            let broker = book.get_mut(&broker_id(i)).unwrap();
            agreement.admit_broker(broker, *stake).unwrap();
        }
        agreement.advance_epoch(epochs).unwrap();
        if agreement.is_active() {
            agreement.cancel().unwrap();
        }

        prop_assert_eq!(agreement.total_allocated(), agreement.funds());
        prop_assert_eq!(agreement.owner_agreement().is_some(), stakes.is_empty());
    }
}
