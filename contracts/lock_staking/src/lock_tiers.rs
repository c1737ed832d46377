//! Lock economics: the mapping from a lock-mode selector to its duration and
//! weight multiplier.
//!
//! Nothing else in the contract knows what a tier is worth. The accumulator
//! and ledger only ever see the resulting `weight` and `unlock_time`.

use soroban_sdk::contracttype;

use crate::errors::ContractError;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Multiplier denominator: 10 000 bps = ×1.00.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Duration and weight multiplier for one lock mode.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct LockTier {
    /// Seconds the principal stays locked after staking.
    pub duration: u64,
    /// Weight multiplier in basis points.
    pub multiplier_bps: u32,
}

const TIERS: [LockTier; 4] = [
    LockTier {
        duration: 7 * SECONDS_PER_DAY,
        multiplier_bps: 10_000,
    },
    LockTier {
        duration: 30 * SECONDS_PER_DAY,
        multiplier_bps: 11_000,
    },
    LockTier {
        duration: 90 * SECONDS_PER_DAY,
        multiplier_bps: 14_000,
    },
    LockTier {
        duration: 180 * SECONDS_PER_DAY,
        multiplier_bps: 20_000,
    },
];

/// Look up the tier for `lock_mode`.
pub fn tier(lock_mode: u32) -> Result<LockTier, ContractError> {
    TIERS
        .get(lock_mode as usize)
        .copied()
        .ok_or(ContractError::InvalidLockMode)
}

impl LockTier {
    /// Reward weight for `principal` locked under this tier.
    pub fn weight_of(&self, principal: i128) -> Result<i128, ContractError> {
        principal
            .checked_mul(i128::from(self.multiplier_bps))
            .ok_or(ContractError::Overflow)?
            .checked_div(BPS_DENOMINATOR)
            .ok_or(ContractError::DivisionByZero)
    }

    /// Timestamp after which a deposit opened at `now` may be withdrawn.
    pub fn unlock_time(&self, now: u64) -> Result<u64, ContractError> {
        now.checked_add(self.duration)
            .ok_or(ContractError::Overflow)
    }
}
