use soroban_sdk::{token, Address, Env};

/// Escrow for the staked asset, held by this contract's own address.
///
/// Principal and reward are the same asset, so a single token balance backs
/// both.
pub struct Custodian<'a> {
    token: token::Client<'a>,
    custody: Address,
}

impl<'a> Custodian<'a> {
    pub fn new(env: &Env, asset: &Address) -> Self {
        Self {
            token: token::Client::new(env, asset),
            custody: env.current_contract_address(),
        }
    }

    pub fn balance(&self) -> i128 {
        self.token.balance(&self.custody)
    }

    /// Pull exactly `amount` from `from`. A failed transfer aborts the
    /// whole invocation.
    pub fn transfer_in(&self, from: &Address, amount: i128) {
        self.token.transfer(from, &self.custody, &amount);
    }

    /// Pay up to `amount` to `to` and return what was actually sent.
    ///
    /// If custody holds less than `amount` the full balance is paid instead;
    /// a rounding shortfall must never block a withdrawal.
    pub fn transfer_out(&self, to: &Address, amount: i128) -> i128 {
        let paid = amount.min(self.balance());
        if paid <= 0 {
            return 0;
        }
        self.token.transfer(&self.custody, to, &paid);
        paid
    }
}
