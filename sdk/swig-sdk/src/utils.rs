use crate::core::connection::SolConnection;
use crate::core::constants::SWIG_SEED;
use crate::error::{Result, SwigSdkError};
use crate::state::{decode_actions, Position, SwigHeader};
use crate::types::{AuthorityType, RoleInfo, WalletInfo};
use solana_sdk::pubkey::Pubkey;

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive the wallet PDA for an owner key: `["swig", owner]`
pub fn derive_swig_pda(program_id: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[SWIG_SEED, owner.as_ref()], program_id)
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch wallet account data from the blockchain
pub async fn fetch_wallet_account(connection: &dyn SolConnection, swig: &Pubkey) -> Result<Vec<u8>> {
    let account = connection
        .get_account(swig)
        .await
        .map_err(|e| SwigSdkError::Connection(e.to_string()))?
        .ok_or(SwigSdkError::AccountNotFound(*swig))?;

    Ok(account.data)
}

/// Check whether a wallet account exists at `swig`
pub async fn wallet_exists(connection: &dyn SolConnection, swig: &Pubkey) -> Result<bool> {
    let account = connection
        .get_account(swig)
        .await
        .map_err(|e| SwigSdkError::Connection(e.to_string()))?;
    Ok(account.is_some())
}

/// Parse wallet header from account data
pub fn parse_wallet_header(data: &[u8]) -> Result<SwigHeader> {
    let header = SwigHeader::read(data)?;
    if !header.is_valid() {
        return Err(SwigSdkError::InvalidAccountData(format!(
            "Unexpected discriminator {}",
            header.discriminator
        )));
    }
    Ok(header)
}

/// Parse all roles from wallet account data
pub fn parse_roles(data: &[u8]) -> Result<Vec<RoleInfo>> {
    let header = parse_wallet_header(data)?;
    let mut roles = Vec::with_capacity(header.role_count as usize);
    let mut cursor = SwigHeader::LEN;

    for _ in 0..header.role_count {
        if cursor + Position::LEN > data.len() {
            return Err(SwigSdkError::InvalidAccountData(
                "Insufficient data for position header".to_string(),
            ));
        }
        let position = Position::read(&data[cursor..])?;

        let auth_start = cursor + Position::LEN;
        let auth_end = auth_start + position.authority_length as usize;
        let boundary = position.boundary as usize;

        if auth_end > boundary || boundary > data.len() {
            return Err(SwigSdkError::InvalidAccountData(format!(
                "Role {} overruns account data",
                position.id
            )));
        }

        let auth_data = &data[auth_start..auth_end];
        let actions = decode_actions(&data[auth_end..boundary], position.num_actions)?;
        roles.push(parse_role_info(position, auth_data, actions)?);

        cursor = boundary;
    }

    Ok(roles)
}

/// Parse a single role from position and authority data
fn parse_role_info(
    position: Position,
    auth_data: &[u8],
    actions: Vec<crate::types::Action>,
) -> Result<RoleInfo> {
    let authority_type = AuthorityType::try_from(position.authority_type).map_err(|t| {
        SwigSdkError::InvalidAccountData(format!("Invalid authority type: {}", t))
    })?;

    // Layout for Ed25519 and Ed25519Session: [0..32] public key
    let ed25519_pubkey = match authority_type {
        AuthorityType::Ed25519 | AuthorityType::Ed25519Session if auth_data.len() >= 32 => {
            let mut key = [0u8; 32];
            key.copy_from_slice(&auth_data[..32]);
            Some(Pubkey::new_from_array(key))
        },
        _ => None,
    };

    Ok(RoleInfo {
        id: position.id,
        authority_type,
        authority_data: auth_data.to_vec(),
        ed25519_pubkey,
        actions,
    })
}

/// Fetch and parse complete wallet information
pub async fn fetch_wallet_info(connection: &dyn SolConnection, swig: &Pubkey) -> Result<WalletInfo> {
    let data = fetch_wallet_account(connection, swig).await?;
    let header = parse_wallet_header(&data)?;
    let roles = parse_roles(&data)?;

    Ok(WalletInfo {
        address: *swig,
        role_count: header.role_count,
        role_counter: header.role_counter,
        bump: header.bump,
        roles,
    })
}

/// Find a specific role by ID
pub fn find_role(roles: &[RoleInfo], role_id: u32) -> Option<&RoleInfo> {
    roles.iter().find(|r| r.id == role_id)
}

/// Find every role bound to an Ed25519 authority key
pub fn find_roles_by_authority<'a>(roles: &'a [RoleInfo], authority: &Pubkey) -> Vec<&'a RoleInfo> {
    roles.iter().filter(|r| r.is_bound_to(authority)).collect()
}
