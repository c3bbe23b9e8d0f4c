//! Scenario tests for the reference deployment
//!
//! Lumix Token / LMX, 18 decimals, 10k initial supply, 100k cap, 10 token
//! faucet. Each test starts from a fresh deployment.

use token_ledger::{
    units::{parse_units, scale},
    AccountId, Amount, Error, Ledger, TokenEvent, TokenParams,
};

const DECIMALS: u8 = 18;
const INITIAL_SUPPLY: u64 = 10_000;
const CAP: u64 = 100_000;
const FAUCET_AMOUNT: u64 = 10;

fn tokens(whole: u64) -> Amount {
    scale(whole, DECIMALS).unwrap()
}

struct Fixture {
    ledger: Ledger,
    owner: AccountId,
    addr1: AccountId,
    addr2: AccountId,
}

fn deploy() -> Fixture {
    let owner = AccountId::parse("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
    let addr1 = AccountId::parse("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
    let addr2 = AccountId::parse("0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC").unwrap();

    let params = TokenParams {
        name: "Lumix Token".to_string(),
        symbol: "LMX".to_string(),
        decimals: DECIMALS,
        initial_supply: INITIAL_SUPPLY,
        cap: CAP,
        faucet_amount: FAUCET_AMOUNT,
    };
    let ledger = Ledger::new(owner.clone(), params).unwrap();

    Fixture {
        ledger,
        owner,
        addr1,
        addr2,
    }
}

mod deployment {
    use super::*;

    #[test]
    fn sets_the_right_owner() {
        let f = deploy();
        assert_eq!(f.ledger.contract_owner(), &f.owner);
    }

    #[test]
    fn assigns_total_supply_to_owner() {
        let f = deploy();
        assert_eq!(f.ledger.total_supply(), f.ledger.balance_of(&f.owner));
        assert_eq!(f.ledger.total_supply(), tokens(INITIAL_SUPPLY));
    }

    #[test]
    fn sets_token_parameters() {
        let f = deploy();
        assert_eq!(f.ledger.name(), "Lumix Token");
        assert_eq!(f.ledger.symbol(), "LMX");
        assert_eq!(f.ledger.decimals(), DECIMALS);
        assert_eq!(f.ledger.cap(), parse_units("100000", DECIMALS).unwrap());
        assert_eq!(f.ledger.faucet_amount(), parse_units("10", DECIMALS).unwrap());
    }
}

mod minting {
    use super::*;

    #[test]
    fn rejected_when_paused() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();

        let err = f.ledger.mint(&f.owner, tokens(100)).unwrap_err();
        assert_eq!(err.to_string(), "Contract is paused");
    }

    #[test]
    fn emits_mint_event() {
        let mut f = deploy();
        let receipt = f.ledger.mint(&f.owner, tokens(100)).unwrap();

        let events: Vec<_> = receipt.payloads().cloned().collect();
        assert_eq!(
            events,
            vec![TokenEvent::Mint {
                to: f.owner.clone(),
                amount: tokens(100)
            }]
        );
    }

    #[test]
    fn owner_can_mint() {
        let mut f = deploy();
        f.ledger.mint(&f.owner, tokens(1_000)).unwrap();
        assert_eq!(f.ledger.total_supply(), tokens(INITIAL_SUPPLY) + tokens(1_000));
    }

    #[test]
    fn rejected_above_cap() {
        let mut f = deploy();
        let err = f.ledger.mint(&f.owner, tokens(CAP + 1)).unwrap_err();
        assert!(err.to_string().starts_with("Cap exceeded"));
        assert!(matches!(err, Error::CapExceeded { .. }));
    }

    #[test]
    fn rejected_for_non_owner() {
        let mut f = deploy();
        let err = f.ledger.mint(&f.addr1, tokens(1)).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Only owner can perform this action"));
    }
}

mod burning {
    use super::*;

    #[test]
    fn rejected_when_paused() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();

        let err = f.ledger.burn(&f.owner, tokens(100)).unwrap_err();
        assert!(matches!(err, Error::Paused));
    }

    #[test]
    fn emits_burn_event() {
        let mut f = deploy();
        let amount = tokens(INITIAL_SUPPLY / 2);
        let receipt = f.ledger.burn(&f.owner, amount).unwrap();

        assert_eq!(
            receipt.events[0].event,
            TokenEvent::Burn {
                from: f.owner.clone(),
                amount
            }
        );
    }

    #[test]
    fn owner_can_burn() {
        let mut f = deploy();
        f.ledger.burn(&f.owner, tokens(1_000)).unwrap();
        assert_eq!(f.ledger.total_supply(), tokens(INITIAL_SUPPLY) - tokens(1_000));
    }

    #[test]
    fn rejected_above_balance() {
        let mut f = deploy();
        let amount = f.ledger.balance_of(&f.owner) + tokens(1);

        let err = f.ledger.burn(&f.owner, amount).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient balance to burn"));
    }
}

mod pausing {
    use super::*;

    #[test]
    fn owner_can_pause_and_unpause() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();
        assert!(f.ledger.is_paused());

        f.ledger.unpause(&f.owner).unwrap();
        assert!(!f.ledger.is_paused());
    }

    #[test]
    fn pause_and_unpause_are_idempotent() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();
        f.ledger.pause(&f.owner).unwrap();
        assert!(f.ledger.is_paused());

        f.ledger.unpause(&f.owner).unwrap();
        f.ledger.unpause(&f.owner).unwrap();
        assert!(!f.ledger.is_paused());
    }

    #[test]
    fn non_owner_cannot_pause() {
        let mut f = deploy();
        let err = f.ledger.pause(&f.addr1).unwrap_err();
        assert!(matches!(err, Error::NotOwner { .. }));
        assert!(!f.ledger.is_paused());
    }
}

mod ownership {
    use super::*;

    #[test]
    fn emits_ownership_transferred() {
        let mut f = deploy();
        let receipt = f.ledger.transfer_ownership(&f.owner, f.addr1.clone()).unwrap();

        assert_eq!(
            receipt.events[0].event,
            TokenEvent::OwnershipTransferred {
                previous_owner: f.owner.clone(),
                new_owner: f.addr1.clone()
            }
        );
    }

    #[test]
    fn owner_can_transfer_ownership() {
        let mut f = deploy();
        f.ledger.transfer_ownership(&f.owner, f.addr1.clone()).unwrap();
        assert_eq!(f.ledger.contract_owner(), &f.addr1);
    }

    #[test]
    fn non_owner_cannot_transfer_ownership() {
        let mut f = deploy();
        let err = f
            .ledger
            .transfer_ownership(&f.addr1, f.addr2.clone())
            .unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Only owner can perform this action"));
        assert_eq!(f.ledger.contract_owner(), &f.owner);
    }

    #[test]
    fn rejects_malformed_new_owner() {
        let mut f = deploy();
        let err = f
            .ledger
            .transfer_ownership(&f.owner, AccountId::new(""))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}

mod transfers {
    use super::*;

    #[test]
    fn rejected_when_paused() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();

        let err = f
            .ledger
            .transfer(&f.owner, f.addr1.clone(), tokens(100))
            .unwrap_err();
        assert_eq!(err.to_string(), "Contract is paused");
    }

    #[test]
    fn emits_transfer_event() {
        let mut f = deploy();
        let amount = tokens(INITIAL_SUPPLY / 2);
        let receipt = f.ledger.transfer(&f.owner, f.addr1.clone(), amount).unwrap();

        assert_eq!(
            receipt.events[0].event,
            TokenEvent::Transfer {
                from: f.owner.clone(),
                to: f.addr1.clone(),
                amount
            }
        );
    }

    #[test]
    fn moves_tokens_between_accounts() {
        let mut f = deploy();
        let amount = tokens(50);
        let owner_before = f.ledger.balance_of(&f.owner);

        f.ledger.transfer(&f.owner, f.addr1.clone(), amount).unwrap();
        assert_eq!(f.ledger.balance_of(&f.owner), owner_before - amount);
        assert_eq!(f.ledger.balance_of(&f.addr1), amount);

        f.ledger.transfer(&f.addr1, f.addr2.clone(), amount).unwrap();
        assert_eq!(f.ledger.balance_of(&f.addr1), 0);
        assert_eq!(f.ledger.balance_of(&f.addr2), amount);
        assert_eq!(f.ledger.total_supply(), tokens(INITIAL_SUPPLY));
    }

    #[test]
    fn fails_without_enough_tokens() {
        let mut f = deploy();
        let owner_before = f.ledger.balance_of(&f.owner);

        let err = f.ledger.transfer(&f.addr1, f.owner.clone(), 1).unwrap_err();
        assert!(err.to_string().starts_with("Insufficient balance"));
        assert!(!err.to_string().starts_with("Insufficient balance to burn"));
        assert_eq!(f.ledger.balance_of(&f.owner), owner_before);
    }
}

mod allowances {
    use super::*;

    #[test]
    fn approve_rejected_when_paused() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();

        let err = f
            .ledger
            .approve(&f.owner, f.addr1.clone(), tokens(100))
            .unwrap_err();
        assert!(matches!(err, Error::Paused));
    }

    #[test]
    fn emits_approval_event() {
        let mut f = deploy();
        let receipt = f
            .ledger
            .approve(&f.owner, f.addr1.clone(), tokens(100))
            .unwrap();

        assert_eq!(
            receipt.events[0].event,
            TokenEvent::Approval {
                owner: f.owner.clone(),
                spender: f.addr1.clone(),
                amount: tokens(100)
            }
        );
    }

    #[test]
    fn approve_updates_allowance() {
        let mut f = deploy();
        f.ledger.approve(&f.owner, f.addr1.clone(), tokens(100)).unwrap();
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), tokens(100));
    }

    #[test]
    fn increase_allowance() {
        let mut f = deploy();
        f.ledger
            .increase_allowance(&f.owner, f.addr1.clone(), tokens(100))
            .unwrap();
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), tokens(100));
    }

    #[test]
    fn decrease_allowance() {
        let mut f = deploy();
        f.ledger
            .increase_allowance(&f.owner, f.addr1.clone(), tokens(100))
            .unwrap();
        f.ledger
            .decrease_allowance(&f.owner, f.addr1.clone(), tokens(50))
            .unwrap();
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), tokens(50));
    }

    #[test]
    fn increase_then_decrease_restores_allowance() {
        let mut f = deploy();
        f.ledger.approve(&f.owner, f.addr1.clone(), tokens(7)).unwrap();
        f.ledger
            .increase_allowance(&f.owner, f.addr1.clone(), tokens(30))
            .unwrap();
        f.ledger
            .decrease_allowance(&f.owner, f.addr1.clone(), tokens(30))
            .unwrap();
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), tokens(7));
    }

    #[test]
    fn decrease_below_zero_rejected() {
        let mut f = deploy();
        let err = f
            .ledger
            .decrease_allowance(&f.owner, f.addr1.clone(), tokens(50))
            .unwrap_err();
        assert!(err.to_string().starts_with("Decreased allowance below zero"));
        assert!(matches!(err, Error::AllowanceUnderflow { .. }));
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), 0);
    }

    #[test]
    fn transfer_from_rejected_when_paused() {
        let mut f = deploy();
        f.ledger.approve(&f.owner, f.addr1.clone(), tokens(100)).unwrap();
        f.ledger.pause(&f.owner).unwrap();

        let err = f
            .ledger
            .transfer_from(&f.addr1, f.owner.clone(), f.addr2.clone(), tokens(100))
            .unwrap_err();
        assert_eq!(err.to_string(), "Contract is paused");
    }

    #[test]
    fn transfer_from_uses_allowance() {
        let mut f = deploy();
        let amount = tokens(INITIAL_SUPPLY / 2);
        f.ledger.approve(&f.owner, f.addr1.clone(), amount).unwrap();

        let owner_before = f.ledger.balance_of(&f.owner);
        let receipt = f
            .ledger
            .transfer_from(&f.addr1, f.owner.clone(), f.addr2.clone(), amount)
            .unwrap();

        assert_eq!(f.ledger.balance_of(&f.owner), owner_before - amount);
        assert_eq!(f.ledger.balance_of(&f.addr2), amount);
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), 0);
        assert_eq!(
            receipt.events[0].event,
            TokenEvent::Transfer {
                from: f.owner.clone(),
                to: f.addr2.clone(),
                amount
            }
        );
    }

    #[test]
    fn transfer_from_above_allowance_rejected() {
        let mut f = deploy();
        f.ledger.approve(&f.owner, f.addr1.clone(), tokens(99)).unwrap();

        let err = f
            .ledger
            .transfer_from(&f.addr1, f.owner.clone(), f.addr2.clone(), tokens(100))
            .unwrap_err();
        assert!(err.to_string().starts_with("Insufficient allowance"));
        assert_eq!(f.ledger.allowance(&f.owner, &f.addr1), tokens(99));
    }
}

mod faucet {
    use super::*;

    #[test]
    fn rejected_when_paused() {
        let mut f = deploy();
        f.ledger.pause(&f.owner).unwrap();

        let err = f.ledger.claim_faucet(&f.addr1).unwrap_err();
        assert_eq!(err.to_string(), "Contract is paused");
    }

    #[test]
    fn increases_total_supply() {
        let mut f = deploy();
        f.ledger.claim_faucet(&f.addr1).unwrap();
        assert_eq!(
            f.ledger.total_supply(),
            tokens(INITIAL_SUPPLY + FAUCET_AMOUNT)
        );
    }

    #[test]
    fn credits_claimer() {
        let mut f = deploy();
        f.ledger.claim_faucet(&f.addr1).unwrap();
        assert_eq!(f.ledger.balance_of(&f.addr1), tokens(FAUCET_AMOUNT));
        assert!(f.ledger.has_claimed_faucet(&f.addr1));
    }

    #[test]
    fn second_claim_rejected() {
        let mut f = deploy();
        f.ledger.claim_faucet(&f.addr1).unwrap();
        let before = f.ledger.snapshot();

        let err = f.ledger.claim_faucet(&f.addr1).unwrap_err();
        assert!(err.to_string().starts_with("Already claimed faucet"));
        assert_eq!(f.ledger.snapshot(), before);
    }

    #[test]
    fn claim_survives_balance_changes() {
        let mut f = deploy();
        f.ledger.claim_faucet(&f.addr1).unwrap();
        f.ledger
            .transfer(&f.addr1, f.addr2.clone(), tokens(FAUCET_AMOUNT))
            .unwrap();

        let err = f.ledger.claim_faucet(&f.addr1).unwrap_err();
        assert!(matches!(err, Error::AlreadyClaimed { .. }));
    }
}

#[test]
fn end_to_end_lifecycle() {
    let mut f = deploy();
    assert_eq!(f.ledger.balance_of(&f.owner), tokens(10_000));
    assert_eq!(f.ledger.total_supply(), tokens(10_000));

    f.ledger.mint(&f.owner, tokens(1_000)).unwrap();
    assert_eq!(f.ledger.total_supply(), tokens(11_000));

    f.ledger.burn(&f.owner, tokens(500)).unwrap();
    assert_eq!(f.ledger.total_supply(), tokens(10_500));

    let owner_before = f.ledger.balance_of(&f.owner);
    f.ledger.transfer(&f.owner, f.addr1.clone(), tokens(50)).unwrap();
    assert_eq!(f.ledger.balance_of(&f.owner), owner_before - tokens(50));
    assert_eq!(f.ledger.balance_of(&f.addr1), tokens(50));

    f.ledger.pause(&f.owner).unwrap();
    let err = f
        .ledger
        .transfer(&f.owner, f.addr1.clone(), tokens(1))
        .unwrap_err();
    assert!(matches!(err, Error::Paused));

    f.ledger.unpause(&f.owner).unwrap();
    f.ledger.transfer(&f.owner, f.addr1.clone(), tokens(1)).unwrap();
    assert_eq!(f.ledger.balance_of(&f.addr1), tokens(51));
    assert_eq!(f.ledger.sequence(), 6);
}

#[test]
fn mint_exactly_to_cap_then_one_more() {
    let mut f = deploy();
    let headroom = f.ledger.cap() - f.ledger.total_supply();

    f.ledger.mint(&f.owner, headroom).unwrap();
    assert_eq!(f.ledger.total_supply(), f.ledger.cap());

    let err = f.ledger.mint(&f.owner, 1).unwrap_err();
    assert!(matches!(err, Error::CapExceeded { .. }));
    assert_eq!(f.ledger.total_supply(), f.ledger.cap());
}
