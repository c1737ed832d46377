#![no_std]

pub mod clock;
pub mod custodian;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod lock_tiers;
pub mod rewards;

use soroban_sdk::{contract, contractimpl, symbol_short, token, Address, Env, Symbol};

use clock::Clock;
use custodian::Custodian;

pub use errors::ContractError;
pub use ledger::{AccountLedger, Deposit};
pub use lock_tiers::LockTier;
pub use rewards::{PoolState, SCALE};

// ── Storage key constants ────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const PENDING_ADMIN: Symbol = symbol_short!("PEND_ADM");
const INITIALIZED: Symbol = symbol_short!("INIT");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const POOL: Symbol = symbol_short!("POOL");

const INSTANCE_TTL_THRESHOLD: u32 = 100_800;
const INSTANCE_TTL_EXTEND_TO: u32 = 518_400;

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct LockStakingContract;

#[contractimpl]
impl LockStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token` – SAC address of the asset that is both locked and paid
    ///   out as reward.
    /// * `reward_rate` – tokens emitted **per ledger** across all deposits.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_rate: i128,
    ) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }
        if reward_rate < 0 {
            return Err(ContractError::InvalidInput);
        }

        let pool = PoolState::new(reward_rate, Clock::read(&env).tick);

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);
        env.storage().instance().set(&STAKE_TOKEN, &stake_token);
        Self::save_pool(&env, &pool);

        events::publish_initialized(&env, admin, stake_token, reward_rate);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Lock `amount` under `lock_mode` and return the new deposit id.
    ///
    /// The accumulator is synced before the pool weight grows, so the deposit
    /// only earns from this ledger onwards.
    pub fn stake(
        env: Env,
        staker: Address,
        amount: i128,
        lock_mode: u32,
    ) -> Result<u32, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        let tier = lock_tiers::tier(lock_mode)?;
        let clock = Clock::read(&env);
        let weight = tier.weight_of(amount)?;
        let unlock_time = tier.unlock_time(clock.timestamp)?;

        let custodian = Custodian::new(&env, &Self::stake_token(&env)?);
        let mut pool = Self::load_pool(&env)?;

        // 1. Flush the accumulator at the old weight.
        pool.sync(clock.tick, custodian.balance())?;

        // 2. Snapshot the debt so prior accrual is excluded.
        let deposit = Deposit {
            principal: amount,
            weight,
            lock_mode,
            unlock_time,
            reward_debt: rewards::accrued(weight, pool.acc_reward_per_weight)?,
        };
        pool.lock(amount, weight)?;

        // 3. Escrow the principal, then record the deposit.
        custodian.transfer_in(&staker, amount);

        let mut account = ledger::load_account(&env, &staker);
        let deposit_id = ledger::open_deposit(&env, &staker, &mut account, &deposit)?;
        ledger::save_account(&env, &staker, &account);
        Self::save_pool(&env, &pool);

        events::publish_staked(&env, staker, deposit_id, amount, weight, unlock_time);

        Ok(deposit_id)
    }

    // ── Withdrawal ──────────────────────────────────────────────────────────

    /// Close an unlocked deposit, returning its principal and, when
    /// `with_rewards` is set, its accrued reward. Returns the amount paid.
    pub fn unstake(
        env: Env,
        staker: Address,
        deposit_id: u32,
        with_rewards: bool,
    ) -> Result<i128, ContractError> {
        Self::withdraw_deposit(&env, &staker, deposit_id, with_rewards)
    }

    /// Close an unlocked deposit for its principal only, forfeiting reward.
    ///
    /// Never blocked by a reward-funding shortfall.
    pub fn emergency_withdraw(
        env: Env,
        staker: Address,
        deposit_id: u32,
    ) -> Result<i128, ContractError> {
        Self::withdraw_deposit(&env, &staker, deposit_id, false)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Pay out the reward a deposit has accrued without touching its
    /// principal. Returns the amount paid.
    pub fn claim_rewards(
        env: Env,
        staker: Address,
        deposit_id: u32,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let clock = Clock::read(&env);
        let mut account = ledger::load_account(&env, &staker);
        let mut deposit = ledger::load_deposit(&env, &staker, &account, deposit_id)?;
        Self::require_withdrawable(&deposit, &clock)?;

        let custodian = Custodian::new(&env, &Self::stake_token(&env)?);
        let mut pool = Self::load_pool(&env)?;
        pool.sync(clock.tick, custodian.balance())?;

        let reward =
            rewards::pending(deposit.weight, pool.acc_reward_per_weight, deposit.reward_debt)?;
        if reward == 0 {
            // Nothing to claim; keep the sync.
            Self::save_pool(&env, &pool);
            return Ok(0);
        }

        // Additive debt: a second claim at the same accumulator sees zero.
        deposit.reward_debt = deposit
            .reward_debt
            .checked_add(reward)
            .ok_or(ContractError::Overflow)?;
        let settled = pool.settle(reward);
        account.record_claim(settled)?;

        ledger::store_deposit(&env, &staker, deposit_id, &deposit);
        ledger::save_account(&env, &staker, &account);
        Self::save_pool(&env, &pool);

        let paid = custodian.transfer_out(&staker, settled);

        events::publish_claimed(&env, staker, deposit_id, settled);

        Ok(paid)
    }

    /// Top up reward funding. The tokens back future emission and earn
    /// nothing for `funder`. Returns the new custody balance.
    pub fn fund_rewards(env: Env, funder: Address, amount: i128) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        funder.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }

        let custodian = Custodian::new(&env, &Self::stake_token(&env)?);
        custodian.transfer_in(&funder, amount);
        let custody_balance = custodian.balance();

        events::publish_rewards_funded(&env, funder, amount, custody_balance);

        Ok(custody_balance)
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Principal currently locked by `staker` across all open deposits.
    pub fn get_balance(env: Env, staker: Address) -> i128 {
        ledger::load_account(&env, &staker).total_principal
    }

    /// Reward weight currently held by `staker` across all open deposits.
    pub fn get_weight(env: Env, staker: Address) -> i128 {
        ledger::load_account(&env, &staker).total_weight
    }

    pub fn get_account(env: Env, staker: Address) -> AccountLedger {
        ledger::load_account(&env, &staker)
    }

    /// Number of deposit ids issued to `staker`, closed ones included.
    pub fn get_deposit_count(env: Env, staker: Address) -> u32 {
        ledger::load_account(&env, &staker).deposit_count
    }

    pub fn get_deposit(
        env: Env,
        staker: Address,
        deposit_id: u32,
    ) -> Result<Deposit, ContractError> {
        let account = ledger::load_account(&env, &staker);
        ledger::load_deposit(&env, &staker, &account, deposit_id)
    }

    /// Reward a deposit could claim right now, projected to the current
    /// ledger without syncing.
    pub fn get_pending_reward(
        env: Env,
        staker: Address,
        deposit_id: u32,
    ) -> Result<i128, ContractError> {
        let account = ledger::load_account(&env, &staker);
        let deposit = ledger::load_deposit(&env, &staker, &account, deposit_id)?;
        if !deposit.is_active() {
            return Err(ContractError::EmptyDeposit);
        }

        let pool = Self::load_pool(&env)?;
        let custody_balance = Custodian::new(&env, &Self::stake_token(&env)?).balance();
        let acc = pool.projected_accumulator(Clock::read(&env).tick, custody_balance)?;

        rewards::pending(deposit.weight, acc, deposit.reward_debt)
    }

    /// Global pool state as of the last sync.
    pub fn get_pool(env: Env) -> Result<PoolState, ContractError> {
        Self::load_pool(&env)
    }

    pub fn get_reward_rate(env: Env) -> Result<i128, ContractError> {
        Ok(Self::load_pool(&env)?.reward_rate)
    }

    pub fn get_lock_tier(_env: Env, lock_mode: u32) -> Result<LockTier, ContractError> {
        lock_tiers::tier(lock_mode)
    }

    pub fn get_stake_token(env: Env) -> Result<Address, ContractError> {
        Self::stake_token(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    // ── Admin functions ──────────────────────────────────────────────────────

    /// Update the per-ledger emission rate.
    ///
    /// The accumulator is flushed at the old rate first so the new rate is
    /// never applied retroactively. Fails with `InsufficientFunding` if that
    /// flush cannot be backed.
    pub fn set_reward_rate(env: Env, caller: Address, new_rate: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        if new_rate < 0 {
            return Err(ContractError::InvalidInput);
        }

        let custodian = Custodian::new(&env, &Self::stake_token(&env)?);
        let mut pool = Self::load_pool(&env)?;
        pool.sync(Clock::read(&env).tick, custodian.balance())?;

        let old_rate = pool.reward_rate;
        pool.reward_rate = new_rate;
        Self::save_pool(&env, &pool);

        events::publish_reward_rate_set(&env, old_rate, new_rate);

        Ok(())
    }

    /// Sweep a foreign token that was sent to the contract by mistake.
    /// The staked asset itself can never leave through this path.
    pub fn recover_token(
        env: Env,
        caller: Address,
        token: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        if amount <= 0 {
            return Err(ContractError::InvalidInput);
        }
        if token == Self::stake_token(&env)? {
            return Err(ContractError::CannotRecoverStakeToken);
        }

        token::Client::new(&env, &token).transfer(&env.current_contract_address(), &to, &amount);

        events::publish_token_recovered(&env, token, to, amount);

        Ok(())
    }

    // ── Admin handover ──────────────────────────────────────────────────────

    /// Nominate `new_admin` to take over rate changes and token recovery.
    /// A later nomination replaces an earlier one; `current_admin` stays in
    /// charge until the nominee calls `accept_admin`.
    pub fn propose_admin(
        env: Env,
        current_admin: Address,
        new_admin: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_admin.require_auth();
        Self::require_admin(&env, &current_admin)?;

        env.storage().instance().set(&PENDING_ADMIN, &new_admin);
        events::publish_admin_transfer_proposed(&env, current_admin, new_admin);
        Ok(())
    }

    /// Called by the nominee to take over. Fails with `InvalidInput` when no
    /// nomination is open.
    pub fn accept_admin(env: Env, new_admin: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_admin.require_auth();

        if Self::pending_admin(&env)? != new_admin {
            return Err(ContractError::Unauthorized);
        }
        let old_admin = Self::get_admin(env.clone())?;

        env.storage().instance().set(&ADMIN, &new_admin);
        env.storage().instance().remove(&PENDING_ADMIN);

        events::publish_admin_transfer_accepted(&env, old_admin, new_admin);
        Ok(())
    }

    pub fn get_pending_admin(env: Env) -> Option<Address> {
        env.storage().instance().get(&PENDING_ADMIN)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Shared body of `unstake` and `emergency_withdraw`.
    fn withdraw_deposit(
        env: &Env,
        staker: &Address,
        deposit_id: u32,
        with_rewards: bool,
    ) -> Result<i128, ContractError> {
        Self::require_initialized(env)?;
        staker.require_auth();

        let clock = Clock::read(env);
        let mut account = ledger::load_account(env, staker);
        let deposit = ledger::load_deposit(env, staker, &account, deposit_id)?;
        Self::require_withdrawable(&deposit, &clock)?;

        let custodian = Custodian::new(env, &Self::stake_token(env)?);
        let mut pool = Self::load_pool(env)?;

        // Sync before the pool weight shrinks. A principal-only exit must not
        // depend on reward funding, so an unbacked interval is left unsynced
        // and the forfeited reward is measured at the last committed value.
        match pool.sync(clock.tick, custodian.balance()) {
            Ok(()) => {}
            Err(ContractError::InsufficientFunding) if !with_rewards => {}
            Err(e) => return Err(e),
        }

        let reward =
            rewards::pending(deposit.weight, pool.acc_reward_per_weight, deposit.reward_debt)?;

        // The reward leaves the liability either way: paid here, or forfeited.
        let settled = pool.release(deposit.principal, deposit.weight, reward)?;
        account.record_claim(settled)?;
        let payout = if with_rewards {
            deposit
                .principal
                .checked_add(settled)
                .ok_or(ContractError::Overflow)?
        } else {
            deposit.principal
        };

        ledger::close_deposit(env, staker, &mut account, deposit_id, &deposit)?;
        ledger::save_account(env, staker, &account);
        Self::save_pool(env, &pool);

        let paid = custodian.transfer_out(staker, payout);

        events::publish_unstaked(env, staker.clone(), deposit_id, deposit.principal, paid);
        if with_rewards {
            events::publish_claimed(env, staker.clone(), deposit_id, settled);
        }

        Ok(paid)
    }

    /// Guard: the deposit is open and its lock has expired.
    fn require_withdrawable(deposit: &Deposit, clock: &Clock) -> Result<(), ContractError> {
        if !deposit.is_active() {
            return Err(ContractError::EmptyDeposit);
        }
        if clock.timestamp <= deposit.unlock_time {
            return Err(ContractError::StillLocked);
        }
        Ok(())
    }

    fn pending_admin(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&PENDING_ADMIN)
            .ok_or(ContractError::InvalidInput)
    }

    /// Guard: revert if the contract is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` is not the stored admin.
    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin: Address = env
            .storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    fn stake_token(env: &Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&STAKE_TOKEN)
            .ok_or(ContractError::NotInitialized)
    }

    fn load_pool(env: &Env) -> Result<PoolState, ContractError> {
        env.storage()
            .instance()
            .get(&POOL)
            .ok_or(ContractError::NotInitialized)
    }

    fn save_pool(env: &Env, pool: &PoolState) {
        env.storage().instance().set(&POOL, pool);
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_admin;
