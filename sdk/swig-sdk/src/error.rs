use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// Errors raised by the Swig SDK
#[derive(Debug, Error)]
pub enum SwigSdkError {
    /// RPC call failed
    #[error("Connection error: {0}")]
    Connection(String),

    /// Account does not exist on-chain
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Wallet, mint or token account bytes do not match the expected layout
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Instruction could not be assembled
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    /// Borsh encoding of instruction data failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] std::io::Error),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SwigSdkError>;
