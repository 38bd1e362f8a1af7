use crate::advanced::instructions;
use crate::basic::proxy::ProxyBuilder;
use crate::basic::wallet::SwigWallet;
use crate::error::{Result, SwigSdkError};
use crate::types::Action;
use crate::utils::derive_swig_pda;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;

pub struct CreateSwigBuilder {
    payer: Option<Pubkey>,
    owner: Option<Pubkey>,
    program_id: Pubkey,
    actions: Vec<Action>,
}

impl CreateSwigBuilder {
    pub fn new() -> Self {
        Self {
            payer: None,
            owner: None,
            program_id: SwigWallet::DEFAULT_PROGRAM_ID,
            actions: vec![Action::All],
        }
    }

    pub fn with_program_id(mut self, program_id: Pubkey) -> Self {
        self.program_id = program_id;
        self
    }

    pub fn with_payer(mut self, payer: Pubkey) -> Self {
        self.payer = Some(payer);
        self
    }

    pub fn with_owner(mut self, owner: Pubkey) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// Address of the wallet this builder will create.
    pub fn get_address(&self) -> Result<Pubkey> {
        let owner = self
            .owner
            .ok_or_else(|| SwigSdkError::InvalidInstruction("Owner required".into()))?;
        Ok(derive_swig_pda(&self.program_id, &owner).0)
    }

    pub fn build_instruction(&self) -> Result<Instruction> {
        let owner = self
            .owner
            .ok_or_else(|| SwigSdkError::InvalidInstruction("Owner required".into()))?;
        let payer = self.payer.unwrap_or(owner);

        instructions::create_swig(&self.program_id, &payer, &owner, &self.actions)
    }
}

impl Default for CreateSwigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct AddAuthorityBuilder<'a> {
    wallet: &'a SwigWallet,
    new_authority: Option<Pubkey>,
    actions: Vec<Action>,
    acting_role_id: u32,
    authorizer: Option<Pubkey>,
}

impl<'a> AddAuthorityBuilder<'a> {
    pub fn new(wallet: &'a SwigWallet) -> Self {
        Self {
            wallet,
            new_authority: None,
            actions: vec![Action::All],
            acting_role_id: 0,
            authorizer: None,
        }
    }

    pub fn with_authority(mut self, authority: Pubkey) -> Self {
        self.new_authority = Some(authority);
        self
    }

    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_acting_role(mut self, role: u32) -> Self {
        self.acting_role_id = role;
        self
    }

    pub fn with_authorizer(mut self, authorizer: Pubkey) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn build_instruction(&self, payer: Pubkey) -> Result<Instruction> {
        let new_authority = self
            .new_authority
            .ok_or_else(|| SwigSdkError::InvalidInstruction("New authority required".into()))?;
        if self.actions.is_empty() {
            return Err(SwigSdkError::InvalidInstruction(
                "A role needs at least one action".into(),
            ));
        }
        let authorizer = self.authorizer.unwrap_or(payer);

        instructions::add_authority(
            &self.wallet.program_id,
            &self.wallet.address,
            &payer,
            &authorizer,
            self.acting_role_id,
            &new_authority,
            &self.actions,
        )
    }
}

pub struct RemoveAuthorityBuilder<'a> {
    wallet: &'a SwigWallet,
    acting_role_id: u32,
    target_role_id: Option<u32>,
    authorizer: Option<Pubkey>,
}

impl<'a> RemoveAuthorityBuilder<'a> {
    pub fn new(wallet: &'a SwigWallet) -> Self {
        Self {
            wallet,
            acting_role_id: 0,
            target_role_id: None,
            authorizer: None,
        }
    }

    pub fn with_acting_role(mut self, role: u32) -> Self {
        self.acting_role_id = role;
        self
    }

    pub fn with_target_role(mut self, role: u32) -> Self {
        self.target_role_id = Some(role);
        self
    }

    pub fn with_authorizer(mut self, authorizer: Pubkey) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn build_instruction(&self, payer: Pubkey) -> Result<Instruction> {
        let target_role = self
            .target_role_id
            .ok_or_else(|| SwigSdkError::InvalidInstruction("Target role required".into()))?;
        let authorizer = self.authorizer.unwrap_or(payer);

        instructions::remove_authority(
            &self.wallet.program_id,
            &self.wallet.address,
            &payer,
            &authorizer,
            self.acting_role_id,
            target_role,
        )
    }
}

/// Builds a role-authorized `SignV1` wrapping instructions that spend from
/// the wallet.
pub struct SignBuilder<'a> {
    wallet: &'a SwigWallet,
    proxy_builder: ProxyBuilder,
    role_id: u32,
    authorizer: Option<Pubkey>,
}

impl<'a> SignBuilder<'a> {
    pub fn new(wallet: &'a SwigWallet) -> Self {
        Self {
            wallet,
            proxy_builder: ProxyBuilder::new(wallet.address),
            role_id: 0,
            authorizer: None,
        }
    }

    pub fn add_instruction(mut self, ix: Instruction) -> Self {
        self.proxy_builder = self.proxy_builder.add_instruction(ix);
        self
    }

    pub fn add_instructions(mut self, ixs: impl IntoIterator<Item = Instruction>) -> Self {
        self.proxy_builder = self.proxy_builder.add_instructions(ixs);
        self
    }

    pub fn with_role_id(mut self, role: u32) -> Self {
        self.role_id = role;
        self
    }

    pub fn with_authorizer(mut self, authorizer: Pubkey) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    pub fn build_instruction(&self, payer: Pubkey) -> Result<Instruction> {
        let authorizer = self.authorizer.unwrap_or(payer);
        let (compact, accounts) = self
            .proxy_builder
            .clone()
            .build([self.wallet.address, payer, authorizer])?;

        instructions::sign(
            &self.wallet.program_id,
            &self.wallet.address,
            &payer,
            &authorizer,
            self.role_id,
            compact,
            accounts,
        )
    }
}
