use super::*;
use snapshot_token::{SnapshotToken, SnapshotTokenClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Env, String,
};

const HALF: u128 = WAD / 2;

struct Setup<'a> {
    engine: ContributionPeriodClient<'a>,
    sale: SnapshotTokenClient<'a>,
    base: token::Client<'a>,
    wallet: Address,
    post_sale: Address,
    alice: Address,
    bob: Address,
    carol: Address,
}

fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| {
        li.timestamp = timestamp;
    });
}

fn config() -> PeriodConfig {
    PeriodConfig {
        initial_supply: 100,
        init_min_target: 10,
        init_max_target: 40,
        threshold_coefficient: WAD,
        cap_coefficient: 2 * WAD,
        round_count: 2,
        min_contribution: 2,
    }
}

fn setup<'a>(env: &Env) -> Setup<'a> {
    setup_with(env, &config(), 100)
}

/// Every contributor starts with `funding` of the base currency
fn setup_with<'a>(env: &Env, config: &PeriodConfig, funding: i128) -> Setup<'a> {
    env.mock_all_auths();

    let admin = Address::generate(env);
    let wallet = Address::generate(env);
    let post_sale = Address::generate(env);
    let alice = Address::generate(env);
    let bob = Address::generate(env);
    let carol = Address::generate(env);

    let engine_id = env.register_contract(None, ContributionPeriod);

    // the engine controls the sale token from the start
    let sale_id = env.register_contract(None, SnapshotToken);
    let sale = SnapshotTokenClient::new(env, &sale_id);
    sale.initialize(
        &engine_id,
        &7,
        &String::from_str(env, "Sale Token"),
        &String::from_str(env, "SALE"),
        &None,
        &0,
    );

    let issuer = Address::generate(env);
    let base_id = env.register_stellar_asset_contract_v2(issuer).address();
    let base_admin = token::StellarAssetClient::new(env, &base_id);
    for contributor in [&alice, &bob, &carol] {
        base_admin.mint(contributor, &funding);
    }

    let engine = ContributionPeriodClient::new(env, &engine_id);
    engine.initialize(&admin, &base_id, &sale_id, &wallet, &post_sale, config);

    Setup {
        engine,
        sale,
        base: token::Client::new(env, &base_id),
        wallet,
        post_sale,
        alice,
        bob,
        carol,
    }
}

/// Round 0 over [100, 200] at 50%, optionally round 1 over [300, 400] at 50%
fn schedule(env: &Env, s: &Setup, both_rounds: bool) {
    set_time(env, 50);
    s.engine.initialize_round(&0, &100, &200, &HALF);
    if both_rounds {
        s.engine.initialize_round(&1, &300, &400, &HALF);
    }
}

#[test]
fn test_initialize() {
    let env = Env::default();
    let s = setup(&env);

    assert_eq!(s.sale.balance(&s.engine.address), 100);
    assert_eq!(s.sale.total_supply(), 100);
    assert_eq!(s.sale.hook(), Some(s.engine.address.clone()));

    let state = s.engine.get_state();
    assert_eq!(state.current_round, 0);
    assert!(!state.ended);
    assert_eq!(s.engine.get_config(), config());

    let result = s.engine.try_initialize(
        &Address::generate(&env),
        &s.base.address,
        &s.sale.address,
        &s.wallet,
        &s.post_sale,
        &config(),
    );
    assert_eq!(result, Err(Ok(Error::AlreadyInitialized)));
}

#[test]
fn test_initialize_rejects_bad_config() {
    let env = Env::default();
    env.mock_all_auths();

    let engine_id = env.register_contract(None, ContributionPeriod);
    let engine = ContributionPeriodClient::new(&env, &engine_id);

    let mut bad = config();
    bad.cap_coefficient = WAD / 2;
    let result = engine.try_initialize(
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &bad,
    );
    assert_eq!(result, Err(Ok(Error::InvalidConfig)));

    let mut bad = config();
    bad.round_count = 0;
    let result = engine.try_initialize(
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &Address::generate(&env),
        &bad,
    );
    assert_eq!(result, Err(Ok(Error::InvalidConfig)));
}

#[test]
fn test_first_round_allocation() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    let round = s.engine.get_round(&0);
    assert_eq!(round.available, 50);
    assert_eq!(round.threshold, 5);
    assert_eq!(round.cap, 20);
    assert_eq!(round.price, 0);

    assert_eq!(s.engine.round_status(&0), RoundStatus::Initialized);
    assert_eq!(s.engine.round_status(&1), RoundStatus::Uninitialized);
    assert_eq!(s.engine.get_state().cumulative_percentage, HALF);

    set_time(&env, 100);
    assert_eq!(s.engine.round_status(&0), RoundStatus::Active);

    assert_eq!(s.engine.try_get_round(&2), Err(Ok(Error::InvalidRound)));
}

#[test]
fn test_contribute_at_threshold_then_claim() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    assert_eq!(s.engine.contribute(&s.alice, &5), 5);
    assert_eq!(s.engine.contribution_of(&s.alice, &0), 5);

    let result = s.engine.try_finalize_round(&0);
    assert_eq!(result, Err(Ok(Error::RoundStillOpen)));

    set_time(&env, 201);
    s.engine.finalize_round(&0);

    let round = s.engine.get_round(&0);
    assert_eq!(round.price, WAD / 10);
    assert_eq!(round.distribution, 50);
    assert_eq!(s.engine.round_status(&0), RoundStatus::Finalized);

    assert_eq!(s.engine.claim(&s.alice, &0), 50);
    assert_eq!(s.sale.balance(&s.alice), 50);
    assert_eq!(s.engine.claimed_of(&s.alice, &0), 50);

    // replay is a no-op
    assert_eq!(s.engine.claim(&s.alice, &0), 0);
    assert_eq!(s.sale.balance(&s.alice), 50);

    assert_eq!(s.engine.claim(&s.bob, &0), 0);
}

#[test]
fn test_contribution_below_threshold() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &2);

    set_time(&env, 201);
    s.engine.finalize_round(&0);

    let round = s.engine.get_round(&0);
    assert_eq!(round.price, WAD / 10);
    assert_eq!(round.distribution, 20);
    assert_eq!(s.engine.claim(&s.alice, &0), 20);
}

#[test]
fn test_contribution_over_cap_is_refunded() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    assert_eq!(s.engine.contribute(&s.alice, &18), 18);
    assert_eq!(s.engine.contribute(&s.bob, &7), 2);

    assert_eq!(s.base.balance(&s.bob), 98);
    assert_eq!(s.base.balance(&s.engine.address), 20);

    // reaching the cap finalizes on the spot
    let round = s.engine.get_round(&0);
    assert_eq!(round.total_contributed, 20);
    assert_eq!(round.price, 4 * WAD / 10);
    assert_eq!(round.distribution, 50);
    assert_eq!(s.engine.get_state().current_round, 1);

    let result = s.engine.try_contribute(&s.alice, &5);
    assert_eq!(result, Err(Ok(Error::RoundNotOpen)));

    let alice_reward = s.engine.claim(&s.alice, &0);
    let bob_reward = s.engine.claim(&s.bob, &0);
    assert_eq!(alice_reward, 45);
    assert_eq!(bob_reward, 5);
    assert!((alice_reward + bob_reward) as u128 <= round.distribution);
}

#[test]
fn test_claims_stay_payable_at_inexact_price() {
    const UNIT: i128 = WAD as i128;

    let env = Env::default();
    let config = PeriodConfig {
        initial_supply: 3 * WAD,
        init_min_target: WAD,
        init_max_target: 2 * WAD,
        threshold_coefficient: WAD,
        cap_coefficient: 2 * WAD,
        round_count: 1,
        min_contribution: 1,
    };
    let s = setup_with(&env, &config, UNIT);

    set_time(&env, 50);
    s.engine.initialize_round(&0, &100, &200, &WAD);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &(UNIT / 2));
    s.engine.contribute(&s.bob, &(3 * UNIT / 10));
    s.engine.contribute(&s.carol, &(UNIT / 5));

    set_time(&env, 201);
    s.engine.finalize_round(&0);

    let round = s.engine.get_round(&0);
    assert_eq!(round.price, 333_333_333_333_333_333);
    assert_eq!(round.distribution, 3 * WAD);
    assert!(s.engine.get_state().ended);

    let mut paid: i128 = 0;
    for account in [&s.alice, &s.bob, &s.carol] {
        let claimable = s.engine.contribution_info(account).get_unchecked(0).claimable;
        let claimed = s.engine.claim(account, &0);
        assert_eq!(claimed as u128, claimable);
        paid += claimed;
    }

    assert!(paid as u128 <= round.distribution);
    assert_eq!(paid, 3 * UNIT);
    assert_eq!(s.sale.balance(&s.alice), 3 * UNIT / 2);
    assert_eq!(s.sale.balance(&s.engine.address), 0);
}

#[test]
fn test_next_round_derived_on_finalize() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, true);

    assert_eq!(s.engine.get_round(&1).available, 0);
    assert_eq!(s.engine.get_state().cumulative_percentage, WAD);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &20);

    let previous = s.engine.get_round(&0);
    let round = s.engine.get_round(&1);
    assert_eq!(round.available, 50);
    assert_eq!(round.threshold, 20);
    assert_eq!(round.cap, 40);

    // opening price never below the previous settlement
    assert!(wad::wdiv(round.threshold, round.available).unwrap() >= previous.price);
}

#[test]
fn test_round_scheduled_after_finalize_is_derived() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &20);
    assert_eq!(s.engine.get_round(&1).available, 0);

    s.engine.initialize_round(&1, &300, &400, &HALF);

    let round = s.engine.get_round(&1);
    assert_eq!(round.available, 50);
    assert_eq!(round.threshold, 20);
    assert_eq!(round.cap, 40);
}

#[test]
fn test_period_end_hands_over_control() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, true);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &20);
    assert_eq!(s.engine.claim(&s.alice, &0), 50);

    // sale tokens are locked while the period runs
    let result = s.sale.try_transfer(&s.alice, &s.bob, &10);
    assert_eq!(result, Err(Ok(snapshot_token::Error::TransferRejected)));

    set_time(&env, 350);
    assert_eq!(s.engine.contribute(&s.bob, &10), 10);

    set_time(&env, 401);
    s.engine.finalize_round(&1);

    let round = s.engine.get_round(&1);
    assert_eq!(round.price, 4 * WAD / 10);
    assert_eq!(round.distribution, 25);

    let state = s.engine.get_state();
    assert!(state.ended);
    assert_eq!(state.cumulative_distribution, 75);
    assert_eq!(state.cumulative_contribution, 30);

    assert_eq!(s.sale.balance(&s.post_sale), 25);
    assert_eq!(s.sale.controller(), s.post_sale);

    assert_eq!(s.engine.claim(&s.bob, &1), 25);
    assert_eq!(s.sale.balance(&s.engine.address), 0);

    s.sale.transfer(&s.alice, &s.bob, &10);
    assert_eq!(s.sale.balance(&s.bob), 35);

    let result = s.engine.try_contribute(&s.alice, &5);
    assert_eq!(result, Err(Ok(Error::PeriodEnded)));
    let result = s.engine.try_finalize_round(&1);
    assert_eq!(result, Err(Ok(Error::PeriodEnded)));
}

#[test]
fn test_claim_finalizes_expired_round() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &5);

    set_time(&env, 250);
    assert_eq!(s.engine.claim(&s.alice, &0), 50);
    assert_eq!(s.engine.get_state().current_round, 1);
    assert_eq!(s.engine.round_status(&0), RoundStatus::Finalized);

    assert_eq!(s.engine.try_claim(&s.alice, &2), Err(Ok(Error::InvalidRound)));
}

#[test]
fn test_claim_all() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, true);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &20);

    set_time(&env, 350);
    s.engine.contribute(&s.alice, &8);

    let info = s.engine.contribution_info(&s.alice);
    assert_eq!(info.len(), 2);
    assert_eq!(
        info.get_unchecked(0),
        AccountRoundInfo {
            round: 0,
            contributed: 20,
            claimed: 0,
            claimable: 50,
        }
    );
    assert_eq!(info.get_unchecked(1).contributed, 8);
    assert_eq!(info.get_unchecked(1).claimable, 0);

    // round 1 closes unfinalized, claim_all settles it and ends the period
    set_time(&env, 401);
    assert_eq!(s.engine.claim_all(&s.alice), 70);
    assert_eq!(s.sale.balance(&s.alice), 70);
    assert!(s.engine.get_state().ended);

    assert_eq!(s.engine.claim_all(&s.alice), 0);

    let info = s.engine.contribution_info(&s.alice);
    assert_eq!(info.get_unchecked(1).claimed, 20);
    assert_eq!(info.get_unchecked(1).claimable, 0);
}

#[test]
fn test_zero_contribution_round() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 201);
    s.engine.finalize_round(&0);

    let round = s.engine.get_round(&0);
    assert_eq!(round.price, WAD / 10);
    assert_eq!(round.distribution, 0);
    assert_eq!(s.engine.claim(&s.alice, &0), 0);
}

#[test]
fn test_initialize_round_validation() {
    let env = Env::default();
    let s = setup(&env);
    set_time(&env, 50);

    let result = s.engine.try_initialize_round(&0, &40, &200, &HALF);
    assert_eq!(result, Err(Ok(Error::InvalidSchedule)));
    let result = s.engine.try_initialize_round(&0, &100, &100, &HALF);
    assert_eq!(result, Err(Ok(Error::InvalidSchedule)));
    let result = s.engine.try_initialize_round(&2, &100, &200, &HALF);
    assert_eq!(result, Err(Ok(Error::InvalidRound)));
    let result = s.engine.try_initialize_round(&1, &300, &400, &HALF);
    assert_eq!(result, Err(Ok(Error::PreviousRoundNotScheduled)));
    let result = s.engine.try_initialize_round(&0, &100, &200, &0);
    assert_eq!(result, Err(Ok(Error::InvalidPercentage)));

    s.engine.initialize_round(&0, &100, &200, &HALF);

    let result = s.engine.try_initialize_round(&1, &150, &400, &HALF);
    assert_eq!(result, Err(Ok(Error::InvalidSchedule)));
    let result = s.engine.try_initialize_round(&1, &300, &400, &(6 * WAD / 10));
    assert_eq!(result, Err(Ok(Error::InvalidPercentage)));

    // rescheduling before the window opens recomputes the allocation
    s.engine.initialize_round(&0, &100, &200, &(WAD / 4));
    let round = s.engine.get_round(&0);
    assert_eq!(round.available, 25);
    assert_eq!(round.threshold, 2);
    assert_eq!(round.cap, 10);
    assert_eq!(s.engine.get_state().cumulative_percentage, WAD / 4);

    set_time(&env, 100);
    let result = s.engine.try_initialize_round(&0, &150, &200, &HALF);
    assert_eq!(result, Err(Ok(Error::RoundAlreadyStarted)));
}

#[test]
fn test_contribute_validation() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    let result = s.engine.try_contribute(&s.alice, &5);
    assert_eq!(result, Err(Ok(Error::RoundNotOpen)));

    set_time(&env, 150);
    let result = s.engine.try_contribute(&s.alice, &1);
    assert_eq!(result, Err(Ok(Error::BelowMinimumContribution)));
    let result = s.engine.try_contribute(&s.alice, &0);
    assert_eq!(result, Err(Ok(Error::InvalidAmount)));

    set_time(&env, 201);
    let result = s.engine.try_contribute(&s.alice, &5);
    assert_eq!(result, Err(Ok(Error::RoundNotOpen)));
}

#[test]
fn test_finalize_round_validation() {
    let env = Env::default();
    let s = setup(&env);

    let result = s.engine.try_finalize_round(&0);
    assert_eq!(result, Err(Ok(Error::RoundNotInitialized)));

    schedule(&env, &s, false);
    let result = s.engine.try_finalize_round(&1);
    assert_eq!(result, Err(Ok(Error::NotCurrentRound)));

    set_time(&env, 201);
    s.engine.finalize_round(&0);
    let result = s.engine.try_finalize_round(&0);
    assert_eq!(result, Err(Ok(Error::RoundAlreadyFinalized)));
}

#[test]
fn test_collect_funds() {
    let env = Env::default();
    let s = setup(&env);
    schedule(&env, &s, false);

    set_time(&env, 150);
    s.engine.contribute(&s.alice, &5);
    s.engine.contribute(&s.bob, &3);

    assert_eq!(s.engine.collect_funds(), 8);
    assert_eq!(s.base.balance(&s.wallet), 8);
    assert_eq!(s.base.balance(&s.engine.address), 0);

    assert_eq!(s.engine.collect_funds(), 0);
}

#[test]
fn test_error_codes_do_not_overlap_sale_token() {
    let engine = [
        Error::AlreadyInitialized,
        Error::NotInitialized,
        Error::InvalidConfig,
        Error::PeriodEnded,
        Error::InvalidRound,
        Error::RoundAlreadyStarted,
        Error::InvalidSchedule,
        Error::PreviousRoundNotScheduled,
        Error::RoundNotOpen,
        Error::RoundNotInitialized,
        Error::RoundAlreadyFinalized,
        Error::RoundStillOpen,
        Error::NotCurrentRound,
        Error::InvalidAmount,
        Error::BelowMinimumContribution,
        Error::InvalidPercentage,
        Error::InvalidAllocation,
        Error::ArithmeticOverflow,
    ];
    let sale = [
        snapshot_token::Error::AlreadyInitialized,
        snapshot_token::Error::NotInitialized,
        snapshot_token::Error::InvalidParent,
        snapshot_token::Error::Unauthorized,
        snapshot_token::Error::TransferRejected,
        snapshot_token::Error::ApprovalRejected,
        snapshot_token::Error::SnapshotAlreadyTaken,
        snapshot_token::Error::InvalidAmount,
        snapshot_token::Error::InsufficientBalance,
        snapshot_token::Error::InsufficientAllowance,
        snapshot_token::Error::InvalidExpiration,
        snapshot_token::Error::ArithmeticOverflow,
    ];

    for ours in engine {
        for theirs in sale {
            assert_ne!(ours as u32, theirs as u32);
        }
    }
    assert_eq!(Error::BelowMinimumContribution as u32, 141);
}
