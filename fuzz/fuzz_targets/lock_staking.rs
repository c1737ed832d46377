#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use lock_staking::{LockStakingContract, LockStakingContractClient};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env,
};

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Stake { amount: u64, lock_mode: u8 },
    Unstake { deposit_id: u8, with_rewards: bool },
    ClaimRewards { deposit_id: u8 },
    EmergencyWithdraw { deposit_id: u8 },
    FundRewards { amount: u32 },
    SetRewardRate { rate: u32 },
    Advance { ticks: u8, days: u8 },
}

fuzz_target!(|input: (u16, Vec<FuzzAction>)| {
    let (rate, actions) = input;
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
    client.initialize(&admin, &token, &i128::from(rate));

    let minter = StellarAssetClient::new(&env, &token);
    let mut users = vec![admin.clone()];
    for _ in 0..4 {
        let user = Address::generate(&env);
        minter.mint(&user, &(u64::MAX as i128));
        users.push(user);
    }

    // Looking for panics (overflow, out-of-bounds) and solvency breaks; every
    // call goes through try_* so contract errors are expected noise.
    for (i, action) in actions.into_iter().enumerate() {
        let caller = &users[i % users.len()];
        match action {
            FuzzAction::Stake { amount, lock_mode } => {
                let _ = client.try_stake(caller, &(amount as i128), &u32::from(lock_mode));
            }
            FuzzAction::Unstake { deposit_id, with_rewards } => {
                let _ = client.try_unstake(caller, &u32::from(deposit_id), &with_rewards);
            }
            FuzzAction::ClaimRewards { deposit_id } => {
                let _ = client.try_claim_rewards(caller, &u32::from(deposit_id));
            }
            FuzzAction::EmergencyWithdraw { deposit_id } => {
                let _ = client.try_emergency_withdraw(caller, &u32::from(deposit_id));
            }
            FuzzAction::FundRewards { amount } => {
                let _ = client.try_fund_rewards(caller, &i128::from(amount));
            }
            FuzzAction::SetRewardRate { rate } => {
                let _ = client.try_set_reward_rate(&admin, &i128::from(rate));
            }
            FuzzAction::Advance { ticks, days } => {
                let ledger = env.ledger();
                ledger.set_sequence_number(ledger.sequence() + u32::from(ticks));
                ledger.set_timestamp(ledger.timestamp() + u64::from(days) * 86_400);
            }
        }

        let pool = client.get_pool();
        let custody = TokenClient::new(&env, &token).balance(&contract_id);
        assert!(custody >= pool.total_locked_principal + pool.unclaimed_reward);
    }
});
