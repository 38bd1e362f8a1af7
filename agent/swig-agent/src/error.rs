use solana_sdk::pubkey::Pubkey;
use swig_sdk::SwigSdkError;
use thiserror::Error;

/// Failure of a single agent invocation.
///
/// Every variant is terminal for the invocation; nothing is retried.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Signing key absent or unparseable, or another invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required entity is missing or malformed
    #[error("{message}. {guidance}")]
    Parse { message: String, guidance: String },

    /// Caller or target does not satisfy the wallet's role constraints
    #[error("{0}")]
    Authorization(String),

    /// The operation's category is turned off in settings
    #[error("{0} are disabled in the agent settings")]
    FeatureDisabled(&'static str),

    /// The caller has no wallet yet
    #[error("No Swig wallet found for {0}. Create one first with \"create swig\"")]
    WalletNotFound(Pubkey),

    /// RPC, submission, confirmation or account decoding failure
    #[error("{0}")]
    Chain(String),
}

impl AgentError {
    pub fn parse(message: impl Into<String>, guidance: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            guidance: guidance.into(),
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization(message.into())
    }

    /// Short machine-usable tag for the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::Config(_) => "config_error",
            AgentError::Parse { .. } => "parse_error",
            AgentError::Authorization(_) => "authorization_error",
            AgentError::FeatureDisabled(_) => "feature_disabled",
            AgentError::WalletNotFound(_) => "wallet_not_found",
            AgentError::Chain(_) => "chain_error",
        }
    }
}

impl From<SwigSdkError> for AgentError {
    fn from(err: SwigSdkError) -> Self {
        AgentError::Chain(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for AgentError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        AgentError::Chain(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
