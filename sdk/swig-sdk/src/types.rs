use serde::{Serialize, Serializer};
use solana_sdk::pubkey::Pubkey;

/// Authority kinds understood by the Swig program.
///
/// Only `Ed25519` authorities are created by this SDK; the other tags are
/// recognized so that wallets holding them still parse.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorityType {
    None = 0,
    Ed25519 = 1,
    Ed25519Session = 2,
    Secp256k1 = 3,
    Secp256k1Session = 4,
    Secp256r1 = 5,
    Secp256r1Session = 6,
}

impl TryFrom<u16> for AuthorityType {
    type Error = u16;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(AuthorityType::None),
            1 => Ok(AuthorityType::Ed25519),
            2 => Ok(AuthorityType::Ed25519Session),
            3 => Ok(AuthorityType::Secp256k1),
            4 => Ok(AuthorityType::Secp256k1Session),
            5 => Ok(AuthorityType::Secp256r1),
            6 => Ok(AuthorityType::Secp256r1Session),
            other => Err(other),
        }
    }
}

/// A single permission attached to a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Unrestricted: may manage authorities and move any asset.
    All,
    /// May add and remove authorities.
    ManageAuthority,
    /// May move native SOL out of the wallet up to `amount` lamports.
    SolLimit { amount: u64 },
    /// May move tokens of `mint` out of the wallet up to `amount` base units.
    TokenLimit {
        #[serde(serialize_with = "display")]
        mint: Pubkey,
        amount: u64,
    },
}

impl Action {
    pub fn permits_authority_management(&self) -> bool {
        matches!(self, Action::All | Action::ManageAuthority)
    }

    pub fn permits_sol(&self) -> bool {
        matches!(self, Action::All | Action::SolLimit { .. })
    }

    pub fn permits_token(&self, token_mint: &Pubkey) -> bool {
        match self {
            Action::All => true,
            Action::TokenLimit { mint, .. } => mint == token_mint,
            _ => false,
        }
    }

    /// Short human-readable label used when listing roles.
    pub fn label(&self) -> String {
        match self {
            Action::All => "all".to_string(),
            Action::ManageAuthority => "manage authority".to_string(),
            Action::SolLimit { amount } => format!("sol limit {} lamports", amount),
            Action::TokenLimit { mint, amount } => format!("token limit {} of {}", amount, mint),
        }
    }
}

/// Information about a role in the wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleInfo {
    /// Role ID, unique within the wallet and never reused
    pub id: u32,

    /// Authority type code
    pub authority_type: AuthorityType,

    /// Raw authority bytes as stored on-chain
    #[serde(skip)]
    pub authority_data: Vec<u8>,

    /// For Ed25519 authorities: the public key
    #[serde(serialize_with = "display_opt")]
    pub ed25519_pubkey: Option<Pubkey>,

    /// Permissions granted to this role
    pub actions: Vec<Action>,
}

impl RoleInfo {
    /// Build an Ed25519 role record.
    pub fn ed25519(id: u32, authority: Pubkey, actions: Vec<Action>) -> Self {
        Self {
            id,
            authority_type: AuthorityType::Ed25519,
            authority_data: authority.to_bytes().to_vec(),
            ed25519_pubkey: Some(authority),
            actions,
        }
    }

    /// Check whether `key` is the authority bound to this role
    pub fn is_bound_to(&self, key: &Pubkey) -> bool {
        self.ed25519_pubkey.as_ref() == Some(key)
    }

    pub fn can_manage_authorities(&self) -> bool {
        self.actions.iter().any(Action::permits_authority_management)
    }

    pub fn can_spend_sol(&self) -> bool {
        self.actions.iter().any(Action::permits_sol)
    }

    pub fn can_spend_token(&self, mint: &Pubkey) -> bool {
        self.actions.iter().any(|a| a.permits_token(mint))
    }
}

/// Parsed wallet information
#[derive(Debug, Clone, Serialize)]
pub struct WalletInfo {
    /// Wallet (PDA) address
    #[serde(serialize_with = "display")]
    pub address: Pubkey,

    /// Number of roles in the wallet
    pub role_count: u16,

    /// Total roles ever created (for ID assignment)
    pub role_counter: u32,

    /// PDA bump seed
    pub bump: u8,

    /// List of all roles
    pub roles: Vec<RoleInfo>,
}

fn display<S: Serializer>(key: &Pubkey, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(key)
}

fn display_opt<S: Serializer>(
    key: &Option<Pubkey>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match key {
        Some(key) => serializer.collect_str(key),
        None => serializer.serialize_none(),
    }
}
