//! Transaction composition.
//!
//! Builds the ordered instruction list for an operation. Debits of the
//! wallet are wrapped in a role-authorized `SignV1`; deposits are plain
//! instructions signed by the caller. Only read-only existence and
//! metadata lookups touch the network here.

use crate::error::{AgentError, Result};
use rust_decimal::Decimal;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_instruction;
use swig_sdk::core::constants::SOL_DECIMALS;
use swig_sdk::token::{
    create_associated_token_account, fetch_mint_decimals, get_associated_token_address,
    token_account_exists, transfer_checked,
};
use swig_sdk::{Action, RoleInfo, SolConnection, SwigWallet};
use tracing::debug;

/// Scale a human amount to base units with exact decimal arithmetic.
///
/// Fails when the amount is not positive, carries more fractional digits
/// than `decimals`, or does not fit in a u64.
pub fn scale_amount(amount: Decimal, decimals: u8) -> Result<u64> {
    if amount <= Decimal::ZERO {
        return Err(AgentError::parse(
            format!("Amount {} must be greater than zero", amount),
            "Specify a positive amount such as 1.5",
        ));
    }

    let normalized = amount.normalize();
    let scale = normalized.scale();
    let decimals = u32::from(decimals);
    if scale > decimals {
        return Err(AgentError::parse(
            format!(
                "Amount {} has more than {} decimal places",
                normalized, decimals
            ),
            format!("Use at most {} digits after the decimal point", decimals),
        ));
    }

    let overflow = || {
        AgentError::parse(
            format!("Amount {} is too large", normalized),
            "Specify a smaller amount",
        )
    };
    let factor = 10i128.checked_pow(decimals - scale).ok_or_else(overflow)?;
    let units = normalized
        .mantissa()
        .checked_mul(factor)
        .ok_or_else(overflow)?;
    u64::try_from(units).map_err(|_| overflow())
}

/// Human-readable amount from base units.
pub fn format_amount(units: u64, decimals: u8) -> String {
    match Decimal::try_from_i128_with_scale(i128::from(units), u32::from(decimals)) {
        Ok(amount) => amount.normalize().to_string(),
        Err(_) => units.to_string(),
    }
}

pub fn lamports(amount: Decimal) -> Result<u64> {
    scale_amount(amount, SOL_DECIMALS)
}

/// Output of a token transfer composition.
#[derive(Debug, Clone)]
pub struct TokenTransfer {
    pub instructions: Vec<Instruction>,
    pub units: u64,
    pub decimals: u8,
    /// Whether the destination token account is created by this transaction
    pub creates_account: bool,
}

/// Composes instructions paid for and signed by `payer`, the caller.
pub struct Composer<'a> {
    connection: &'a dyn SolConnection,
    payer: Pubkey,
}

impl<'a> Composer<'a> {
    pub fn new(connection: &'a dyn SolConnection, payer: Pubkey) -> Self {
        Self { connection, payer }
    }

    pub fn create_wallet(&self, program_id: Pubkey) -> Result<Vec<Instruction>> {
        let ix = SwigWallet::create()
            .with_program_id(program_id)
            .with_payer(self.payer)
            .with_owner(self.payer)
            .build_instruction()?;
        Ok(vec![ix])
    }

    pub fn add_authority(
        &self,
        wallet: &SwigWallet,
        acting: &RoleInfo,
        authority: Pubkey,
        actions: Vec<Action>,
    ) -> Result<Vec<Instruction>> {
        let ix = wallet
            .add_authority()
            .with_authority(authority)
            .with_actions(actions)
            .with_acting_role(acting.id)
            .with_authorizer(self.payer)
            .build_instruction(self.payer)?;
        Ok(vec![ix])
    }

    pub fn remove_authority(
        &self,
        wallet: &SwigWallet,
        acting: &RoleInfo,
        target: &RoleInfo,
    ) -> Result<Vec<Instruction>> {
        let ix = wallet
            .remove_authority()
            .with_acting_role(acting.id)
            .with_target_role(target.id)
            .with_authorizer(self.payer)
            .build_instruction(self.payer)?;
        Ok(vec![ix])
    }

    /// Caller to wallet, native.
    pub fn sol_into_wallet(&self, wallet: &SwigWallet, lamports: u64) -> Vec<Instruction> {
        vec![system_instruction::transfer(&self.payer, &wallet.address, lamports)]
    }

    /// Wallet to `destination`, native, authorized by `role`.
    pub fn sol_out_of_wallet(
        &self,
        wallet: &SwigWallet,
        role: &RoleInfo,
        destination: &Pubkey,
        lamports: u64,
    ) -> Result<Vec<Instruction>> {
        let inner = system_instruction::transfer(&wallet.address, destination, lamports);
        Ok(vec![self.wrap(wallet, role, vec![inner])?])
    }

    /// Caller to wallet, token. The caller must hold a token account for
    /// `mint`; the wallet's account is created when absent.
    pub async fn token_into_wallet(
        &self,
        wallet: &SwigWallet,
        mint: &Pubkey,
        amount: Decimal,
    ) -> Result<TokenTransfer> {
        let decimals = fetch_mint_decimals(self.connection, mint).await?;
        let units = scale_amount(amount, decimals)?;

        if !token_account_exists(self.connection, &self.payer, mint).await? {
            return Err(AgentError::Chain(format!(
                "Caller {} has no token account for mint {}",
                self.payer, mint
            )));
        }

        let mut instructions = Vec::with_capacity(2);
        let creates_account = self.ensure_token_account(&mut instructions, &wallet.address, mint).await?;
        instructions.push(transfer_checked(
            &get_associated_token_address(&self.payer, mint),
            mint,
            &get_associated_token_address(&wallet.address, mint),
            &self.payer,
            units,
            decimals,
        ));

        Ok(TokenTransfer {
            instructions,
            units,
            decimals,
            creates_account,
        })
    }

    /// Wallet to `owner`, token, authorized by `role`. The destination's
    /// account is created when absent, paid for by the caller.
    pub async fn token_out_of_wallet(
        &self,
        wallet: &SwigWallet,
        role: &RoleInfo,
        owner: &Pubkey,
        mint: &Pubkey,
        amount: Decimal,
    ) -> Result<TokenTransfer> {
        let decimals = fetch_mint_decimals(self.connection, mint).await?;
        let units = scale_amount(amount, decimals)?;

        let mut instructions = Vec::with_capacity(2);
        let creates_account = self.ensure_token_account(&mut instructions, owner, mint).await?;
        let inner = transfer_checked(
            &get_associated_token_address(&wallet.address, mint),
            mint,
            &get_associated_token_address(owner, mint),
            &wallet.address,
            units,
            decimals,
        );
        instructions.push(self.wrap(wallet, role, vec![inner])?);

        Ok(TokenTransfer {
            instructions,
            units,
            decimals,
            creates_account,
        })
    }

    /// Push an account-creation instruction for `owner`'s token account when
    /// it does not exist yet.
    async fn ensure_token_account(
        &self,
        instructions: &mut Vec<Instruction>,
        owner: &Pubkey,
        mint: &Pubkey,
    ) -> Result<bool> {
        if token_account_exists(self.connection, owner, mint).await? {
            return Ok(false);
        }
        debug!(%owner, %mint, "destination token account missing, creating it");
        instructions.push(create_associated_token_account(&self.payer, owner, mint));
        Ok(true)
    }

    fn wrap(&self, wallet: &SwigWallet, role: &RoleInfo, inner: Vec<Instruction>) -> Result<Instruction> {
        Ok(wallet
            .sign()
            .add_instructions(inner)
            .with_role_id(role.id)
            .with_authorizer(self.payer)
            .build_instruction(self.payer)?)
    }
}
