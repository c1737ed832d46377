//! Reward accumulator.
//!
//! A single global counter, `acc_reward_per_weight`, records how much reward
//! one unit of weight has earned since the pool started (scaled by [`SCALE`]).
//! A deposit's pending reward is then
//!
//! ```text
//! pending = weight × acc / SCALE − reward_debt
//! ```
//!
//! where `reward_debt` is the same product taken at the deposit's last
//! settlement. Stakers are never iterated; each tick interval is folded into
//! the counter lazily by [`PoolState::sync`].

use soroban_sdk::contracttype;

use crate::errors::ContractError;

/// Fixed-point scale applied to `acc_reward_per_weight`.
pub const SCALE: i128 = 1_000_000_000_000;

/// Global pool state. Stored as one instance entry and loaded by value into
/// every entry point.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PoolState {
    pub last_sync_tick: u64,
    pub acc_reward_per_weight: i128,
    pub total_locked_principal: i128,
    pub total_locked_weight: i128,
    /// Reward emitted per tick across the whole pool.
    pub reward_rate: i128,
    /// Upper bound on reward owed to depositors but not yet paid out.
    pub unclaimed_reward: i128,
}

impl PoolState {
    pub fn new(reward_rate: i128, current_tick: u64) -> Self {
        Self {
            last_sync_tick: current_tick,
            acc_reward_per_weight: 0,
            total_locked_principal: 0,
            total_locked_weight: 0,
            reward_rate,
            unclaimed_reward: 0,
        }
    }

    /// Fold the ticks since `last_sync_tick` into the accumulator.
    ///
    /// Nothing is written unless the whole step succeeds: on
    /// `InsufficientFunding` the interval stays unsynced and is retried by the
    /// next call.
    pub fn sync(&mut self, current_tick: u64, custody_balance: i128) -> Result<(), ContractError> {
        if current_tick <= self.last_sync_tick {
            return Ok(());
        }
        if self.total_locked_weight == 0 {
            // Nothing to distribute against; the interval's reward is dropped.
            self.last_sync_tick = current_tick;
            return Ok(());
        }

        let elapsed = i128::from(current_tick - self.last_sync_tick);
        let emitted = elapsed
            .checked_mul(self.reward_rate)
            .ok_or(ContractError::Overflow)?;

        if self.free_balance(custody_balance)? < emitted {
            return Err(ContractError::InsufficientFunding);
        }

        let unclaimed = self
            .unclaimed_reward
            .checked_add(emitted)
            .ok_or(ContractError::Overflow)?;
        let delta = emitted
            .checked_mul(SCALE)
            .ok_or(ContractError::Overflow)?
            .checked_div(self.total_locked_weight)
            .ok_or(ContractError::DivisionByZero)?;
        let acc = self
            .acc_reward_per_weight
            .checked_add(delta)
            .ok_or(ContractError::Overflow)?;

        self.unclaimed_reward = unclaimed;
        self.acc_reward_per_weight = acc;
        self.last_sync_tick = current_tick;
        Ok(())
    }

    /// Accumulator value a `sync` at `current_tick` would produce, without
    /// committing it.
    ///
    /// When custody cannot back the interval the last committed value is
    /// returned, since that is all a claim could actually settle against.
    pub fn projected_accumulator(
        &self,
        current_tick: u64,
        custody_balance: i128,
    ) -> Result<i128, ContractError> {
        let mut projected = self.clone();
        match projected.sync(current_tick, custody_balance) {
            Ok(()) => Ok(projected.acc_reward_per_weight),
            Err(ContractError::InsufficientFunding) => Ok(self.acc_reward_per_weight),
            Err(e) => Err(e),
        }
    }

    /// Custody holdings not already spoken for by principal or owed reward.
    /// Negative when the pool is under-collateralised.
    pub fn free_balance(&self, custody_balance: i128) -> Result<i128, ContractError> {
        custody_balance
            .checked_sub(self.total_locked_principal)
            .and_then(|b| b.checked_sub(self.unclaimed_reward))
            .ok_or(ContractError::Overflow)
    }

    /// Add a freshly opened deposit to the pool totals.
    pub fn lock(&mut self, principal: i128, weight: i128) -> Result<(), ContractError> {
        let total_principal = self
            .total_locked_principal
            .checked_add(principal)
            .ok_or(ContractError::Overflow)?;
        let total_weight = self
            .total_locked_weight
            .checked_add(weight)
            .ok_or(ContractError::Overflow)?;
        self.total_locked_principal = total_principal;
        self.total_locked_weight = total_weight;
        Ok(())
    }

    /// Remove a closed deposit from the pool totals and extinguish the reward
    /// it had accrued, paid or not. Returns the settled part of `reward`
    /// (see [`PoolState::settle`]).
    pub fn release(
        &mut self,
        principal: i128,
        weight: i128,
        reward: i128,
    ) -> Result<i128, ContractError> {
        let total_principal = self
            .total_locked_principal
            .checked_sub(principal)
            .ok_or(ContractError::Overflow)?;
        let total_weight = self
            .total_locked_weight
            .checked_sub(weight)
            .ok_or(ContractError::Overflow)?;
        self.total_locked_principal = total_principal;
        self.total_locked_weight = total_weight;
        Ok(self.settle(reward))
    }

    /// Take `reward` out of the outstanding liability and return how much of
    /// it is actually backed.
    ///
    /// Per-deposit flooring can credit a position up to one unit more than
    /// its exact share, so the settled amount is capped at
    /// `unclaimed_reward`. Paying only the settled amount keeps
    /// `balance >= total_locked_principal + unclaimed_reward` exact.
    pub fn settle(&mut self, reward: i128) -> i128 {
        let settled = reward.clamp(0, self.unclaimed_reward.max(0));
        self.unclaimed_reward -= settled;
        settled
    }
}

/// `weight × acc / SCALE`: the reward a weight has earned since the pool
/// began, as of accumulator value `acc`.
pub fn accrued(weight: i128, acc: i128) -> Result<i128, ContractError> {
    weight
        .checked_mul(acc)
        .ok_or(ContractError::Overflow)?
        .checked_div(SCALE)
        .ok_or(ContractError::DivisionByZero)
}

/// Reward earned by a position since its debt snapshot.
pub fn pending(weight: i128, acc: i128, reward_debt: i128) -> Result<i128, ContractError> {
    let earned = accrued(weight, acc)?;
    // acc is monotonic, so the debt never exceeds the current product.
    Ok(earned.checked_sub(reward_debt).ok_or(ContractError::Overflow)?.max(0))
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure accumulator math, no Soroban environment needed.
