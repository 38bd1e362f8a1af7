use crate::basic::actions::{
    AddAuthorityBuilder, CreateSwigBuilder, RemoveAuthorityBuilder, SignBuilder,
};
use crate::core::connection::SolConnection;
use crate::error::{Result, SwigSdkError};
use crate::types::WalletInfo;
use crate::utils;
use solana_sdk::pubkey::Pubkey;

/// Represents a Swig Smart Wallet on-chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwigWallet {
    /// Wallet PDA - holds roles, native balance, and owns token accounts
    pub address: Pubkey,

    /// Program ID of the Swig contract
    pub program_id: Pubkey,

    /// PDA bump seed
    pub bump: u8,
}

impl SwigWallet {
    pub const DEFAULT_PROGRAM_ID: Pubkey = crate::core::constants::SWIG_PROGRAM_ID;

    /// Derive the wallet belonging to `owner` without touching the chain
    pub fn for_owner(program_id: Pubkey, owner: &Pubkey) -> Self {
        let (address, bump) = utils::derive_swig_pda(&program_id, owner);
        Self {
            address,
            program_id,
            bump,
        }
    }

    /// Fetch an existing wallet belonging to `owner`
    ///
    /// # Returns
    /// `AccountNotFound` when no wallet has been created for `owner`
    pub async fn fetch(
        connection: &dyn SolConnection,
        owner: &Pubkey,
        program_id: Option<Pubkey>,
    ) -> Result<Self> {
        let wallet = Self::for_owner(program_id.unwrap_or(Self::DEFAULT_PROGRAM_ID), owner);
        let data = utils::fetch_wallet_account(connection, &wallet.address).await?;
        utils::parse_wallet_header(&data)?;
        Ok(wallet)
    }

    /// Check whether the wallet account exists
    pub async fn exists(&self, connection: &dyn SolConnection) -> Result<bool> {
        utils::wallet_exists(connection, &self.address).await
    }

    /// Fetch complete wallet information including all roles
    pub async fn fetch_info(&self, connection: &dyn SolConnection) -> Result<WalletInfo> {
        utils::fetch_wallet_info(connection, &self.address).await
    }

    /// Native balance held by the wallet, in lamports
    pub async fn balance(&self, connection: &dyn SolConnection) -> Result<u64> {
        connection
            .get_balance(&self.address)
            .await
            .map_err(|e| SwigSdkError::Connection(e.to_string()))
    }

    /// Create a new wallet
    pub fn create() -> CreateSwigBuilder {
        CreateSwigBuilder::new()
    }

    /// Start building an AddAuthority instruction
    pub fn add_authority(&self) -> AddAuthorityBuilder<'_> {
        AddAuthorityBuilder::new(self)
    }

    pub fn remove_authority(&self) -> RemoveAuthorityBuilder<'_> {
        RemoveAuthorityBuilder::new(self)
    }

    /// Wrap instructions so they execute with the wallet as signer
    pub fn sign(&self) -> SignBuilder<'_> {
        SignBuilder::new(self)
    }
}
