use crate::types::Action;
use solana_sdk::pubkey::Pubkey;

/// Builder for constructing a role's permission set.
#[derive(Debug, Clone, Default)]
pub struct ActionsBuilder {
    actions: Vec<Action>,
}

impl ActionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(mut self) -> Self {
        self.actions.push(Action::All);
        self
    }

    pub fn manage_authority(mut self) -> Self {
        self.actions.push(Action::ManageAuthority);
        self
    }

    pub fn sol_limit(mut self, lamports: u64) -> Self {
        self.actions.push(Action::SolLimit { amount: lamports });
        self
    }

    pub fn token_limit(mut self, mint: Pubkey, amount: u64) -> Self {
        self.actions.push(Action::TokenLimit { mint, amount });
        self
    }

    pub fn build(self) -> Vec<Action> {
        self.actions
    }
}
