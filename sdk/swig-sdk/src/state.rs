//! Swig wallet account layout.
//!
//! ```text
//! [SwigHeader (40)] [Position (16)][authority][actions] [Position (16)]...
//! ```
//!
//! `Position::boundary` is the absolute offset of the end of its role
//! record, so roles can be walked without decoding authority or action data.

use crate::error::{Result, SwigSdkError};
use crate::types::{Action, RoleInfo};
use solana_sdk::pubkey::Pubkey;

/// Account type discriminator for Swig wallet accounts.
pub const SWIG_DISCRIMINATOR: u8 = 1;

/// Wallet account header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwigHeader {
    /// Account type discriminator (= 1)
    pub discriminator: u8,

    /// PDA bump seed
    pub bump: u8,

    /// Seed used to derive the wallet address (the creating owner's key)
    pub id: [u8; 32],

    /// Number of active roles
    pub role_count: u16,

    /// Counter for generating unique role IDs (auto-increment)
    pub role_counter: u32,
}

impl SwigHeader {
    /// Header size: 1 + 1 + 32 + 2 + 4 = 40 bytes
    pub const LEN: usize = 40;

    pub fn new(id: [u8; 32], bump: u8) -> Self {
        Self {
            discriminator: SWIG_DISCRIMINATOR,
            bump,
            id,
            role_count: 0,
            role_counter: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.discriminator == SWIG_DISCRIMINATOR
    }

    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(SwigSdkError::InvalidAccountData(
                "Account data too small for wallet header".to_string(),
            ));
        }
        let mut id = [0u8; 32];
        id.copy_from_slice(&data[2..34]);
        Ok(Self {
            discriminator: data[0],
            bump: data[1],
            id,
            role_count: read_u16(data, 34)?,
            role_counter: read_u32(data, 36)?,
        })
    }

    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.push(self.discriminator);
        buffer.push(self.bump);
        buffer.extend_from_slice(&self.id);
        buffer.extend_from_slice(&self.role_count.to_le_bytes());
        buffer.extend_from_slice(&self.role_counter.to_le_bytes());
    }
}

/// Position header for a Role in the dynamic buffer.
///
/// Memory layout (16 bytes):
/// - authority_type: u16
/// - authority_length: u16
/// - num_actions: u16
/// - padding: u16
/// - id: u32
/// - boundary: u32
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub authority_type: u16,
    pub authority_length: u16,
    pub num_actions: u16,
    pub padding: u16,
    pub id: u32,
    pub boundary: u32,
}

impl Position {
    pub const LEN: usize = 16;

    pub fn read(data: &[u8]) -> Result<Self> {
        if data.len() < Self::LEN {
            return Err(SwigSdkError::InvalidAccountData(
                "Insufficient data for position header".to_string(),
            ));
        }
        Ok(Self {
            authority_type: read_u16(data, 0)?,
            authority_length: read_u16(data, 2)?,
            num_actions: read_u16(data, 4)?,
            padding: read_u16(data, 6)?,
            id: read_u32(data, 8)?,
            boundary: read_u32(data, 12)?,
        })
    }

    pub fn write(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.authority_type.to_le_bytes());
        buffer.extend_from_slice(&self.authority_length.to_le_bytes());
        buffer.extend_from_slice(&self.num_actions.to_le_bytes());
        buffer.extend_from_slice(&self.padding.to_le_bytes());
        buffer.extend_from_slice(&self.id.to_le_bytes());
        buffer.extend_from_slice(&self.boundary.to_le_bytes());
    }
}

const ACTION_ALL: u16 = 1;
const ACTION_MANAGE_AUTHORITY: u16 = 2;
const ACTION_SOL_LIMIT: u16 = 3;
const ACTION_TOKEN_LIMIT: u16 = 4;

/// Encode actions as `[action_type: u16][length: u16][payload]` records.
pub fn encode_actions(actions: &[Action]) -> Vec<u8> {
    let mut buffer = Vec::new();
    for action in actions {
        let (kind, payload) = match action {
            Action::All => (ACTION_ALL, Vec::new()),
            Action::ManageAuthority => (ACTION_MANAGE_AUTHORITY, Vec::new()),
            Action::SolLimit { amount } => (ACTION_SOL_LIMIT, amount.to_le_bytes().to_vec()),
            Action::TokenLimit { mint, amount } => {
                let mut payload = mint.to_bytes().to_vec();
                payload.extend_from_slice(&amount.to_le_bytes());
                (ACTION_TOKEN_LIMIT, payload)
            },
        };
        buffer.extend_from_slice(&kind.to_le_bytes());
        buffer.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        buffer.extend_from_slice(&payload);
    }
    buffer
}

/// Decode `count` action records from `data`.
pub fn decode_actions(data: &[u8], count: u16) -> Result<Vec<Action>> {
    let mut actions = Vec::with_capacity(count as usize);
    let mut cursor = 0;

    for _ in 0..count {
        let kind = read_u16(data, cursor)?;
        let length = read_u16(data, cursor + 2)? as usize;
        let start = cursor + 4;
        let end = start + length;
        if end > data.len() {
            return Err(SwigSdkError::InvalidAccountData(
                "Insufficient data for action payload".to_string(),
            ));
        }
        let payload = &data[start..end];

        let action = match (kind, length) {
            (ACTION_ALL, 0) => Action::All,
            (ACTION_MANAGE_AUTHORITY, 0) => Action::ManageAuthority,
            (ACTION_SOL_LIMIT, 8) => Action::SolLimit {
                amount: read_u64(payload, 0)?,
            },
            (ACTION_TOKEN_LIMIT, 40) => Action::TokenLimit {
                mint: read_pubkey(payload, 0)?,
                amount: read_u64(payload, 32)?,
            },
            _ => {
                return Err(SwigSdkError::InvalidAccountData(format!(
                    "Unknown action type {} (length {})",
                    kind, length
                )))
            },
        };
        actions.push(action);
        cursor = end;
    }

    Ok(actions)
}

/// Serialize a full wallet account from a header and its roles.
///
/// `role_count` is taken from `roles`; boundaries are recomputed.
pub fn encode_swig_account(header: &SwigHeader, roles: &[RoleInfo]) -> Vec<u8> {
    let mut buffer = Vec::new();
    let header = SwigHeader {
        role_count: roles.len() as u16,
        ..*header
    };
    header.write(&mut buffer);

    for role in roles {
        let actions = encode_actions(&role.actions);
        let boundary = buffer.len() + Position::LEN + role.authority_data.len() + actions.len();
        let position = Position {
            authority_type: role.authority_type as u16,
            authority_length: role.authority_data.len() as u16,
            num_actions: role.actions.len() as u16,
            padding: 0,
            id: role.id,
            boundary: boundary as u32,
        };
        position.write(&mut buffer);
        buffer.extend_from_slice(&role.authority_data);
        buffer.extend_from_slice(&actions);
    }

    buffer
}

pub(crate) fn read_u16(data: &[u8], offset: usize) -> Result<u16> {
    let bytes = data
        .get(offset..offset + 2)
        .ok_or_else(|| SwigSdkError::InvalidAccountData(format!("u16 out of range at {}", offset)))?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

pub(crate) fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .ok_or_else(|| SwigSdkError::InvalidAccountData(format!("u32 out of range at {}", offset)))?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    Ok(u32::from_le_bytes(raw))
}

pub(crate) fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let bytes = data
        .get(offset..offset + 8)
        .ok_or_else(|| SwigSdkError::InvalidAccountData(format!("u64 out of range at {}", offset)))?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_le_bytes(raw))
}

pub(crate) fn read_pubkey(data: &[u8], offset: usize) -> Result<Pubkey> {
    let bytes = data.get(offset..offset + 32).ok_or_else(|| {
        SwigSdkError::InvalidAccountData(format!("pubkey out of range at {}", offset))
    })?;
    let mut raw = [0u8; 32];
    raw.copy_from_slice(bytes);
    Ok(Pubkey::new_from_array(raw))
}
