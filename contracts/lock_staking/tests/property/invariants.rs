#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Random operation sequences against the full contract.
//!
//! Invariants checked after every step, whether the step succeeded or not:
//! - pool and per-account weight/principal equal the sums over open deposits
//! - custody covers `total_locked_principal + unclaimed_reward`
//! - the accumulator never decreases

use proptest::prelude::*;

use crate::common::{setup, TestContext};

const DAY: u64 = 86_400;

#[derive(Clone, Debug)]
enum Op {
    Stake { who: usize, amount: i128, mode: u32 },
    Unstake { who: usize, slot: u32, with_rewards: bool },
    Claim { who: usize, slot: u32 },
    Emergency { who: usize, slot: u32 },
    Fund { who: usize, amount: i128 },
    Advance { ticks: u32, days: u64 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0usize..3, 1i128..5_000, 0u32..5)
            .prop_map(|(who, amount, mode)| Op::Stake { who, amount, mode }),
        2 => (0usize..3, 0u32..4, any::<bool>())
            .prop_map(|(who, slot, with_rewards)| Op::Unstake { who, slot, with_rewards }),
        2 => (0usize..3, 0u32..4).prop_map(|(who, slot)| Op::Claim { who, slot }),
        1 => (0usize..3, 0u32..4).prop_map(|(who, slot)| Op::Emergency { who, slot }),
        1 => (0usize..3, 1i128..2_000).prop_map(|(who, amount)| Op::Fund { who, amount }),
        3 => (0u32..25, 0u64..60).prop_map(|(ticks, days)| Op::Advance { ticks, days }),
    ]
}

fn apply(ctx: &TestContext, op: &Op) {
    match *op {
        Op::Stake { who, amount, mode } => {
            let _ = ctx.client.try_stake(&ctx.stakers[who], &amount, &mode);
        }
        Op::Unstake { who, slot, with_rewards } => {
            let _ = ctx.client.try_unstake(&ctx.stakers[who], &slot, &with_rewards);
        }
        Op::Claim { who, slot } => {
            let _ = ctx.client.try_claim_rewards(&ctx.stakers[who], &slot);
        }
        Op::Emergency { who, slot } => {
            let _ = ctx.client.try_emergency_withdraw(&ctx.stakers[who], &slot);
        }
        Op::Fund { who, amount } => {
            let _ = ctx.client.try_fund_rewards(&ctx.stakers[who], &amount);
        }
        Op::Advance { ticks, days } => ctx.advance(ticks, days * DAY),
    }
}

/// Returns `(Σ principal, Σ weight)` over every open deposit, asserting the
/// per-account aggregates on the way.
fn sum_open_deposits(ctx: &TestContext) -> Result<(i128, i128), TestCaseError> {
    let mut principal = 0i128;
    let mut weight = 0i128;
    for staker in &ctx.stakers {
        let account = ctx.client.get_account(staker);
        let mut account_principal = 0i128;
        let mut account_weight = 0i128;
        for id in 0..account.deposit_count {
            let deposit = ctx.client.get_deposit(staker, &id);
            if deposit.principal == 0 {
                prop_assert_eq!(deposit.weight, 0, "tombstone must carry no weight");
            }
            account_principal += deposit.principal;
            account_weight += deposit.weight;
        }
        prop_assert_eq!(account.total_principal, account_principal);
        prop_assert_eq!(account.total_weight, account_weight);
        principal += account_principal;
        weight += account_weight;
    }
    Ok((principal, weight))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_ledger_stays_consistent_and_solvent(
        rate in 0i128..50,
        funding in 0i128..20_000,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let ctx = setup(rate, funding, 3, 20_000);
        let mut last_acc = 0i128;

        for op in &ops {
            apply(&ctx, op);

            let pool = ctx.client.get_pool();
            let (principal, weight) = sum_open_deposits(&ctx)?;
            prop_assert_eq!(pool.total_locked_weight, weight);
            prop_assert_eq!(pool.total_locked_principal, principal);

            prop_assert!(pool.unclaimed_reward >= 0);
            prop_assert!(
                ctx.custody_balance() >= pool.total_locked_principal + pool.unclaimed_reward,
                "custody {} < principal {} + unclaimed {}",
                ctx.custody_balance(),
                pool.total_locked_principal,
                pool.unclaimed_reward
            );

            prop_assert!(pool.acc_reward_per_weight >= last_acc);
            last_acc = pool.acc_reward_per_weight;
        }
    }

    #[test]
    fn prop_tokens_are_conserved(
        rate in 0i128..50,
        funding in 0i128..20_000,
        ops in proptest::collection::vec(op_strategy(), 1..40),
    ) {
        let wallet = 20_000i128;
        let ctx = setup(rate, funding, 3, wallet);

        for op in &ops {
            apply(&ctx, op);
        }

        // Nothing is minted or burned: every token is in custody or a wallet.
        let wallets: i128 = ctx.stakers.iter().map(|s| ctx.token_balance(s)).sum();
        prop_assert_eq!(wallets + ctx.custody_balance(), funding + 3 * wallet);
    }
}
