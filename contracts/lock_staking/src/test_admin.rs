extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

use crate::{ContractError, LockStakingContract, LockStakingContractClient};

// ── Test helpers ─────────────────────────────────────────────────────────────

fn setup() -> (Env, LockStakingContractClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(0);
    env.ledger().set_timestamp(0);

    let token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(LockStakingContract, ());
    let client = LockStakingContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin, &token, &10);

    StellarAssetClient::new(&env, &token).mint(&contract_id, &1_000_000);

    (env, client, admin, token)
}

// ── Reward rate ──────────────────────────────────────────────────────────────

#[test]
fn test_rate_change_is_not_retroactive() {
    let (env, client, admin, token) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &token).mint(&staker, &100);

    client.stake(&staker, &100, &0);

    // 10 × 5 = 50 at the old rate, then 20 × 5 = 100 at the new one.
    env.ledger().set_sequence_number(5);
    client.set_reward_rate(&admin, &20);
    assert_eq!(client.get_reward_rate(), 20);
    assert_eq!(client.get_pool().last_sync_tick, 5);

    env.ledger().set_sequence_number(10);
    assert_eq!(client.get_pending_reward(&staker, &0), 150);
}

#[test]
fn test_rate_set_to_zero_stops_emission() {
    let (env, client, admin, token) = setup();
    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &token).mint(&staker, &100);

    client.stake(&staker, &100, &0);

    env.ledger().set_sequence_number(5);
    client.set_reward_rate(&admin, &0);

    env.ledger().set_sequence_number(500);
    assert_eq!(client.get_pending_reward(&staker, &0), 50);
}

#[test]
fn test_set_reward_rate_by_non_admin_fails() {
    let (env, client, _admin, _token) = setup();

    let intruder = Address::generate(&env);
    match client.try_set_reward_rate(&intruder, &999) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    assert_eq!(client.get_reward_rate(), 10);
}

#[test]
fn test_negative_reward_rate_fails() {
    let (_env, client, admin, _token) = setup();

    match client.try_set_reward_rate(&admin, &-1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }
}

// ── Token recovery ───────────────────────────────────────────────────────────

#[test]
fn test_recover_foreign_token() {
    let (env, client, admin, _token) = setup();

    let stray = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    StellarAssetClient::new(&env, &stray).mint(&client.address, &250);

    let to = Address::generate(&env);
    client.recover_token(&admin, &stray, &to, &250);

    let stray_client = TokenClient::new(&env, &stray);
    assert_eq!(stray_client.balance(&to), 250);
    assert_eq!(stray_client.balance(&client.address), 0);
}

#[test]
fn test_recover_stake_token_fails() {
    let (env, client, admin, token) = setup();

    let to = Address::generate(&env);
    match client.try_recover_token(&admin, &token, &to, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::CannotRecoverStakeToken),
        _ => unreachable!("Expected CannotRecoverStakeToken error"),
    }
    assert_eq!(TokenClient::new(&env, &token).balance(&client.address), 1_000_000);
}

#[test]
fn test_recover_by_non_admin_fails() {
    let (env, client, _admin, _token) = setup();

    let stray = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let intruder = Address::generate(&env);
    match client.try_recover_token(&intruder, &stray, &intruder, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

// ── Admin transfer (two-step) ────────────────────────────────────────────────

#[test]
fn test_admin_handover() {
    let (env, client, admin, _token) = setup();
    let successor = Address::generate(&env);

    client.propose_admin(&admin, &successor);
    assert_eq!(client.get_pending_admin(), Some(successor.clone()));
    // Nothing changes until the successor accepts.
    assert_eq!(client.get_admin(), admin);

    client.accept_admin(&successor);
    assert_eq!(client.get_admin(), successor);
    assert_eq!(client.get_pending_admin(), None);

    // The old admin lost its powers.
    match client.try_set_reward_rate(&admin, &1) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    client.set_reward_rate(&successor, &1);
}

#[test]
fn test_accept_by_wrong_address_fails() {
    let (env, client, admin, _token) = setup();
    let successor = Address::generate(&env);
    let impostor = Address::generate(&env);

    client.propose_admin(&admin, &successor);
    match client.try_accept_admin(&impostor) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}

#[test]
fn test_second_nomination_replaces_first() {
    let (env, client, admin, _token) = setup();
    let first = Address::generate(&env);
    let second = Address::generate(&env);

    match client.try_accept_admin(&first) {
        Err(Ok(e)) => assert_eq!(e, ContractError::InvalidInput),
        _ => unreachable!("Expected InvalidInput error"),
    }

    client.propose_admin(&admin, &first);
    client.propose_admin(&admin, &second);
    match client.try_accept_admin(&first) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
    client.accept_admin(&second);
    assert_eq!(client.get_admin(), second);
}

#[test]
fn test_propose_by_non_admin_fails() {
    let (env, client, _admin, _token) = setup();
    let intruder = Address::generate(&env);

    match client.try_propose_admin(&intruder, &intruder) {
        Err(Ok(e)) => assert_eq!(e, ContractError::Unauthorized),
        _ => unreachable!("Expected Unauthorized error"),
    }
}
