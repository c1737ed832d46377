use soroban_sdk::Env;

/// The two independent clocks the engine reads.
///
/// `tick` (the ledger sequence number) drives reward emission; `timestamp`
/// (ledger close time, seconds) drives lock expiry. Neither is ever derived
/// from the other.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Clock {
    pub tick: u64,
    pub timestamp: u64,
}

impl Clock {
    pub fn read(env: &Env) -> Self {
        let ledger = env.ledger();
        Self {
            tick: u64::from(ledger.sequence()),
            timestamp: ledger.timestamp(),
        }
    }
}
