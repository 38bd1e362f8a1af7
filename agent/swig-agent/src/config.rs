//! Agent settings.
//!
//! Values come from a [`Settings`] accessor supplied by the host. The CLI
//! reads the process environment (after loading `.env` via dotenvy); tests
//! and embedding hosts pass a [`MapSettings`].

use crate::error::{AgentError, Result};
use secrecy::{ExposeSecret, SecretString};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Keypair;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use swig_sdk::SWIG_PROGRAM_ID;

pub const SOLANA_PRIVATE_KEY: &str = "SOLANA_PRIVATE_KEY";
pub const SOLANA_RPC_URL: &str = "SOLANA_RPC_URL";
pub const SWIG_PROGRAM_ID_KEY: &str = "SWIG_PROGRAM_ID";
pub const SWIG_COMMITMENT: &str = "SWIG_COMMITMENT";
pub const SWIG_ENABLE_TRANSFERS: &str = "SWIG_ENABLE_TRANSFERS";
pub const SWIG_ENABLE_AUTHORITY_MANAGEMENT: &str = "SWIG_ENABLE_AUTHORITY_MANAGEMENT";

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Key/value settings accessor provided by the host runtime.
pub trait Settings: Send + Sync {
    fn get_setting(&self, key: &str) -> Option<String>;
}

/// Reads settings from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSettings;

impl Settings for EnvSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// In-memory settings.
#[derive(Debug, Default, Clone)]
pub struct MapSettings(HashMap<String, String>);

impl MapSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for MapSettings {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl Settings for MapSettings {
    fn get_setting(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

pub struct AgentConfig {
    /// Caller key material; parsed on use so a bad key fails only the
    /// invocation that needs it
    private_key: Option<SecretString>,
    pub rpc_url: String,
    pub program_id: Pubkey,
    pub commitment: CommitmentConfig,
    pub transfers_enabled: bool,
    pub authority_management_enabled: bool,
}

impl AgentConfig {
    pub fn from_settings(settings: &dyn Settings) -> Result<Self> {
        let program_id = match non_empty(settings, SWIG_PROGRAM_ID_KEY) {
            Some(raw) => Pubkey::from_str(raw.trim()).map_err(|e| {
                AgentError::Config(format!("{} is not a valid address: {}", SWIG_PROGRAM_ID_KEY, e))
            })?,
            None => SWIG_PROGRAM_ID,
        };

        let commitment = match non_empty(settings, SWIG_COMMITMENT) {
            Some(raw) => parse_commitment(&raw)?,
            None => CommitmentConfig::confirmed(),
        };

        Ok(Self {
            private_key: non_empty(settings, SOLANA_PRIVATE_KEY).map(SecretString::from),
            rpc_url: non_empty(settings, SOLANA_RPC_URL).unwrap_or_else(|| DEFAULT_RPC_URL.to_string()),
            program_id,
            commitment,
            transfers_enabled: parse_flag(settings, SWIG_ENABLE_TRANSFERS, true)?,
            authority_management_enabled: parse_flag(
                settings,
                SWIG_ENABLE_AUTHORITY_MANAGEMENT,
                true,
            )?,
        })
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn has_private_key(&self) -> bool {
        self.private_key.is_some()
    }

    /// Parse the caller's signing key.
    ///
    /// Accepts a base58 encoded 64-byte keypair or a JSON byte array as
    /// written by `solana-keygen`.
    pub fn keypair(&self) -> Result<Keypair> {
        let secret = self
            .private_key
            .as_ref()
            .ok_or_else(|| AgentError::Config(format!("{} is not set", SOLANA_PRIVATE_KEY)))?;
        parse_keypair(secret.expose_secret())
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("rpc_url", &self.rpc_url)
            .field("program_id", &self.program_id)
            .field("commitment", &self.commitment.commitment)
            .field("transfers_enabled", &self.transfers_enabled)
            .field("authority_management_enabled", &self.authority_management_enabled)
            .finish()
    }
}

fn non_empty(settings: &dyn Settings, key: &str) -> Option<String> {
    settings
        .get_setting(key)
        .filter(|value| !value.trim().is_empty())
}

fn parse_keypair(raw: &str) -> Result<Keypair> {
    let raw = raw.trim();
    let bytes = if raw.starts_with('[') {
        serde_json::from_str::<Vec<u8>>(raw).map_err(|e| {
            AgentError::Config(format!("{} is not a valid byte array: {}", SOLANA_PRIVATE_KEY, e))
        })?
    } else {
        bs58::decode(raw).into_vec().map_err(|e| {
            AgentError::Config(format!("{} is not valid base58: {}", SOLANA_PRIVATE_KEY, e))
        })?
    };

    if bytes.len() != 64 {
        return Err(AgentError::Config(format!(
            "{} must decode to 64 bytes, got {}",
            SOLANA_PRIVATE_KEY,
            bytes.len()
        )));
    }
    Keypair::from_bytes(&bytes)
        .map_err(|e| AgentError::Config(format!("{} is not a valid keypair: {}", SOLANA_PRIVATE_KEY, e)))
}

fn parse_commitment(raw: &str) -> Result<CommitmentConfig> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "processed" => Ok(CommitmentConfig::processed()),
        "confirmed" => Ok(CommitmentConfig::confirmed()),
        "finalized" => Ok(CommitmentConfig::finalized()),
        other => Err(AgentError::Config(format!(
            "{} must be processed, confirmed or finalized, got {:?}",
            SWIG_COMMITMENT, other
        ))),
    }
}

fn parse_flag(settings: &dyn Settings, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = non_empty(settings, key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(AgentError::Config(format!(
            "{} must be a boolean, got {:?}",
            key, other
        ))),
    }
}
