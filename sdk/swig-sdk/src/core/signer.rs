use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::{Keypair, Signature};
use solana_sdk::signer::Signer;

/// Abstraction for an entity that can sign messages/transactions.
/// This allows the SDK to work with:
/// 1. Local Keypairs (Backend/CLI)
/// 2. Remote signing providers (KMS, wallet services)
#[async_trait]
pub trait SwigSigner: Send + Sync {
    fn pubkey(&self) -> Pubkey;

    /// Sign serialized transaction message bytes.
    /// Returns Err if the provider refused or failed.
    async fn sign_message(&self, message: &[u8]) -> Result<Signature, String>;
}

#[async_trait]
impl SwigSigner for Keypair {
    fn pubkey(&self) -> Pubkey {
        Signer::pubkey(self)
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Signature, String> {
        Signer::try_sign_message(self, message).map_err(|e| e.to_string())
    }
}
