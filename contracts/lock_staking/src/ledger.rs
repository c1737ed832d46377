//! Per-account deposit ledger.
//!
//! Deposits live in an append-only arena: slot `(DEPOSIT, owner, index)` for
//! `index in 0..deposit_count`. Closing a deposit zeroes its slot in place so
//! identifiers already handed out keep pointing at the same position.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::errors::ContractError;

const ACCOUNT: Symbol = symbol_short!("ACCOUNT");
const DEPOSIT: Symbol = symbol_short!("DEPOSIT");

const TTL_THRESHOLD: u32 = 100_800;
const TTL_EXTEND_TO: u32 = 518_400;

/// One locked position.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Deposit {
    pub principal: i128,
    pub weight: i128,
    pub lock_mode: u32,
    pub unlock_time: u64,
    /// `weight × acc / SCALE` at the last settlement.
    pub reward_debt: i128,
}

impl Deposit {
    pub fn is_active(&self) -> bool {
        self.principal > 0
    }

    fn tombstone() -> Self {
        Self {
            principal: 0,
            weight: 0,
            lock_mode: 0,
            unlock_time: 0,
            reward_debt: 0,
        }
    }
}

/// Aggregates over an account's active deposits.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountLedger {
    pub total_principal: i128,
    pub total_weight: i128,
    pub total_rewards_claimed: i128,
    /// Number of deposit slots ever issued, closed ones included.
    pub deposit_count: u32,
}

impl AccountLedger {
    /// Count `reward` as paid to this account.
    pub fn record_claim(&mut self, reward: i128) -> Result<(), ContractError> {
        self.total_rewards_claimed = self
            .total_rewards_claimed
            .checked_add(reward)
            .ok_or(ContractError::Overflow)?;
        Ok(())
    }
}

fn account_key(owner: &Address) -> (Symbol, Address) {
    (ACCOUNT, owner.clone())
}

fn deposit_key(owner: &Address, id: u32) -> (Symbol, Address, u32) {
    (DEPOSIT, owner.clone(), id)
}

pub fn load_account(env: &Env, owner: &Address) -> AccountLedger {
    let key = account_key(owner);
    let account: Option<AccountLedger> = env.storage().persistent().get(&key);
    match account {
        Some(account) => {
            env.storage()
                .persistent()
                .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
            account
        }
        None => AccountLedger::default(),
    }
}

pub fn save_account(env: &Env, owner: &Address, account: &AccountLedger) {
    let key = account_key(owner);
    env.storage().persistent().set(&key, account);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Fetch deposit `id`; ids that were never issued are `InvalidInput`.
pub fn load_deposit(
    env: &Env,
    owner: &Address,
    account: &AccountLedger,
    id: u32,
) -> Result<Deposit, ContractError> {
    if id >= account.deposit_count {
        return Err(ContractError::InvalidInput);
    }
    let key = deposit_key(owner, id);
    let deposit: Deposit = env
        .storage()
        .persistent()
        .get(&key)
        .ok_or(ContractError::InvalidInput)?;
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    Ok(deposit)
}

pub fn store_deposit(env: &Env, owner: &Address, id: u32, deposit: &Deposit) {
    let key = deposit_key(owner, id);
    env.storage().persistent().set(&key, deposit);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Append `deposit` to the arena and fold it into the account totals.
/// Returns the new deposit id.
pub fn open_deposit(
    env: &Env,
    owner: &Address,
    account: &mut AccountLedger,
    deposit: &Deposit,
) -> Result<u32, ContractError> {
    let id = account.deposit_count;
    let total_principal = account
        .total_principal
        .checked_add(deposit.principal)
        .ok_or(ContractError::Overflow)?;
    let total_weight = account
        .total_weight
        .checked_add(deposit.weight)
        .ok_or(ContractError::Overflow)?;
    let next = id.checked_add(1).ok_or(ContractError::Overflow)?;

    account.total_principal = total_principal;
    account.total_weight = total_weight;
    account.deposit_count = next;
    store_deposit(env, owner, id, deposit);
    Ok(id)
}

/// Remove `deposit` from the account totals and tombstone its slot.
pub fn close_deposit(
    env: &Env,
    owner: &Address,
    account: &mut AccountLedger,
    id: u32,
    deposit: &Deposit,
) -> Result<(), ContractError> {
    let total_principal = account
        .total_principal
        .checked_sub(deposit.principal)
        .ok_or(ContractError::Overflow)?;
    let total_weight = account
        .total_weight
        .checked_sub(deposit.weight)
        .ok_or(ContractError::Overflow)?;

    account.total_principal = total_principal;
    account.total_weight = total_weight;
    store_deposit(env, owner, id, &Deposit::tombstone());
    Ok(())
}
