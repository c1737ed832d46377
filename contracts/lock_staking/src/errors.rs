/// Errors returned by the lock-staking contract.
///
/// Any of these aborts the invocation; the host discards every storage write
/// made during the failed call.
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    /// Zero or negative amount/rate, or a deposit index that was never issued.
    InvalidInput = 4,
    /// Lock-mode selector outside the tier table.
    InvalidLockMode = 5,
    /// Withdrawal or claim attempted while `now <= unlock_time`.
    StillLocked = 6,
    /// The deposit has already been closed.
    EmptyDeposit = 7,
    /// Custody cannot back the reward a sync would emit.
    InsufficientFunding = 8,
    Overflow = 9,
    DivisionByZero = 10,
    /// `recover_token` was pointed at the staked asset.
    CannotRecoverStakeToken = 11,
}
