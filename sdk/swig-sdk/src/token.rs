//! SPL Token and Associated Token Account helpers.
//!
//! Instructions are assembled from their documented byte layouts so the SDK
//! does not pull in the on-chain program crates.

use crate::core::connection::SolConnection;
use crate::error::{Result, SwigSdkError};
use crate::state::{read_pubkey, read_u64};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

pub const TOKEN_PROGRAM_ID: Pubkey = pubkey!("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    pubkey!("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// SPL mint account size
pub const MINT_LEN: usize = 82;
/// SPL token account size
pub const TOKEN_ACCOUNT_LEN: usize = 165;

const MINT_DECIMALS_OFFSET: usize = 44;
const TOKEN_ACCOUNT_MINT_OFFSET: usize = 0;
const TOKEN_ACCOUNT_OWNER_OFFSET: usize = 32;
const TOKEN_ACCOUNT_AMOUNT_OFFSET: usize = 64;

const TOKEN_IX_TRANSFER_CHECKED: u8 = 12;
const ATA_IX_CREATE: u8 = 0;

/// Associated token account of `owner` for `mint`: PDA of
/// `[owner, token_program, mint]` under the ATA program.
pub fn get_associated_token_address(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    )
    .0
}

/// Create the associated token account of `owner` for `mint`, funded by `payer`.
pub fn create_associated_token_account(payer: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    let ata = get_associated_token_address(owner, mint);
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(ata, false),
            AccountMeta::new_readonly(*owner, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(system_program::id(), false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![ATA_IX_CREATE],
    }
}

/// SPL `TransferChecked`: data `[12][amount: u64][decimals: u8]`.
pub fn transfer_checked(
    source: &Pubkey,
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Instruction {
    let mut data = Vec::with_capacity(10);
    data.push(TOKEN_IX_TRANSFER_CHECKED);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(decimals);

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// Decimals of an SPL mint account
pub fn parse_mint_decimals(data: &[u8]) -> Result<u8> {
    if data.len() < MINT_LEN {
        return Err(SwigSdkError::InvalidAccountData(
            "Account data too small for a mint".to_string(),
        ));
    }
    Ok(data[MINT_DECIMALS_OFFSET])
}

/// `(mint, owner, amount)` of an SPL token account
pub fn parse_token_account(data: &[u8]) -> Result<(Pubkey, Pubkey, u64)> {
    if data.len() < TOKEN_ACCOUNT_LEN {
        return Err(SwigSdkError::InvalidAccountData(
            "Account data too small for a token account".to_string(),
        ));
    }
    Ok((
        read_pubkey(data, TOKEN_ACCOUNT_MINT_OFFSET)?,
        read_pubkey(data, TOKEN_ACCOUNT_OWNER_OFFSET)?,
        read_u64(data, TOKEN_ACCOUNT_AMOUNT_OFFSET)?,
    ))
}

/// Fetch the decimals of `mint`
pub async fn fetch_mint_decimals(connection: &dyn SolConnection, mint: &Pubkey) -> Result<u8> {
    let account = connection
        .get_account(mint)
        .await
        .map_err(|e| SwigSdkError::Connection(e.to_string()))?
        .ok_or(SwigSdkError::AccountNotFound(*mint))?;

    if account.owner != TOKEN_PROGRAM_ID {
        return Err(SwigSdkError::InvalidAccountData(format!(
            "{} is not an SPL token mint",
            mint
        )));
    }
    parse_mint_decimals(&account.data)
}

/// Check whether `owner`'s associated token account for `mint` exists
pub async fn token_account_exists(
    connection: &dyn SolConnection,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<bool> {
    let ata = get_associated_token_address(owner, mint);
    let account = connection
        .get_account(&ata)
        .await
        .map_err(|e| SwigSdkError::Connection(e.to_string()))?;
    Ok(account.is_some())
}

/// Balance of `owner`'s associated token account for `mint`, in base units.
///
/// Returns `None` when the account does not exist.
pub async fn fetch_token_balance(
    connection: &dyn SolConnection,
    owner: &Pubkey,
    mint: &Pubkey,
) -> Result<Option<u64>> {
    let ata = get_associated_token_address(owner, mint);
    let account = connection
        .get_account(&ata)
        .await
        .map_err(|e| SwigSdkError::Connection(e.to_string()))?;

    match account {
        Some(account) => {
            let (account_mint, _, amount) = parse_token_account(&account.data)?;
            if account_mint != *mint {
                return Err(SwigSdkError::InvalidAccountData(format!(
                    "Token account {} holds mint {}, expected {}",
                    ata, account_mint, mint
                )));
            }
            Ok(Some(amount))
        },
        None => Ok(None),
    }
}
