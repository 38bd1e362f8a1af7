//! In-memory ledger implementing `SolConnection`.
//!
//! Executes the Swig, System, SPL Token and Associated Token Account
//! instructions the SDK emits, with signature and blockhash checks, so
//! wallet flows can run end to end without a validator.

#![allow(dead_code)]

use async_trait::async_trait;
use borsh::BorshDeserialize;
use solana_sdk::account::Account;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::rent::Rent;
use solana_sdk::signature::{Keypair, Signature, Signer};
use solana_sdk::system_program;
use solana_sdk::transaction::Transaction;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::sync::Mutex;
use swig_sdk::core::connection::SolConnection;
use swig_sdk::instruction::{CompactInstruction, SwigInstruction};
use swig_sdk::state::{decode_actions, encode_swig_account, SwigHeader};
use swig_sdk::token::{
    get_associated_token_address, parse_token_account, ASSOCIATED_TOKEN_PROGRAM_ID, MINT_LEN,
    TOKEN_ACCOUNT_LEN, TOKEN_PROGRAM_ID,
};
use swig_sdk::types::{Action, AuthorityType, RoleInfo};
use swig_sdk::utils::{derive_swig_pda, parse_roles, parse_wallet_header};
use swig_sdk::SWIG_PROGRAM_ID;

pub const FEE_PER_SIGNATURE: u64 = 5_000;
pub const INITIAL_PAYER_LAMPORTS: u64 = 100_000_000_000;

type LedgerResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Default)]
struct Ledger {
    accounts: HashMap<Pubkey, Account>,
    blockhashes: HashSet<Hash>,
    confirmed: HashSet<Signature>,
    transactions: Vec<Transaction>,
    blockhash_requests: usize,
    offline: bool,
}

pub struct TestContext {
    pub payer: Keypair,
    pub program_id: Pubkey,
    ledger: Mutex<Ledger>,
}

impl TestContext {
    pub fn new() -> Self {
        let payer = Keypair::new();
        let context = Self {
            payer,
            program_id: SWIG_PROGRAM_ID,
            ledger: Mutex::new(Ledger::default()),
        };
        context.airdrop(&context.payer.pubkey(), INITIAL_PAYER_LAMPORTS);
        context
    }

    pub fn airdrop(&self, to: &Pubkey, lamports: u64) {
        let mut ledger = self.ledger.lock().unwrap();
        let account = ledger
            .accounts
            .entry(*to)
            .or_insert_with(|| Account::new(0, 0, &system_program::id()));
        account.lamports += lamports;
    }

    /// Create an SPL mint with `decimals`
    pub fn create_mint(&self, decimals: u8) -> Pubkey {
        let mint = Pubkey::new_unique();
        let mut data = vec![0u8; MINT_LEN];
        data[44] = decimals;
        data[45] = 1;
        let account = Account {
            lamports: Rent::default().minimum_balance(MINT_LEN),
            data,
            owner: TOKEN_PROGRAM_ID,
            executable: false,
            rent_epoch: 0,
        };
        self.ledger.lock().unwrap().accounts.insert(mint, account);
        mint
    }

    /// Credit `amount` base units to `owner`'s associated token account,
    /// creating it when absent.
    pub fn mint_to(&self, mint: &Pubkey, owner: &Pubkey, amount: u64) {
        let mut ledger = self.ledger.lock().unwrap();
        let ata = get_associated_token_address(owner, mint);
        let account = ledger
            .accounts
            .entry(ata)
            .or_insert_with(|| token_account(mint, owner, 0));
        let current = u64::from_le_bytes(account.data[64..72].try_into().unwrap());
        account.data[64..72].copy_from_slice(&(current + amount).to_le_bytes());
    }

    pub fn token_balance(&self, owner: &Pubkey, mint: &Pubkey) -> Option<u64> {
        let ledger = self.ledger.lock().unwrap();
        ledger
            .accounts
            .get(&get_associated_token_address(owner, mint))
            .map(|a| parse_token_account(&a.data).unwrap().2)
    }

    pub fn lamports(&self, key: &Pubkey) -> u64 {
        let ledger = self.ledger.lock().unwrap();
        ledger.accounts.get(key).map(|a| a.lamports).unwrap_or(0)
    }

    pub fn account(&self, key: &Pubkey) -> Option<Account> {
        self.ledger.lock().unwrap().accounts.get(key).cloned()
    }

    pub fn roles(&self, swig: &Pubkey) -> Vec<RoleInfo> {
        let account = self.account(swig).expect("wallet account");
        parse_roles(&account.data).unwrap()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.ledger.lock().unwrap().transactions.clone()
    }

    pub fn blockhash_requests(&self) -> usize {
        self.ledger.lock().unwrap().blockhash_requests
    }

    /// Make every gateway call fail, simulating an unreachable RPC node
    pub fn set_offline(&self, offline: bool) {
        self.ledger.lock().unwrap().offline = offline;
    }

    /// Sign and submit `instructions` with the context payer, returning the
    /// signature once the ledger accepted the transaction.
    pub async fn process(
        &self,
        instructions: &[solana_sdk::instruction::Instruction],
        extra_signers: &[&Keypair],
    ) -> LedgerResult<Signature> {
        let blockhash = self.get_latest_blockhash().await?;
        let mut signers: Vec<&Keypair> = vec![&self.payer];
        signers.extend_from_slice(extra_signers);
        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&self.payer.pubkey()),
            &signers,
            blockhash,
        );
        let signature = self.send_transaction(&tx).await?;
        self.confirm_transaction(&signature).await?;
        Ok(signature)
    }

    fn check_online(&self) -> LedgerResult<()> {
        if self.ledger.lock().unwrap().offline {
            return Err("connection refused".into());
        }
        Ok(())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SolConnection for TestContext {
    async fn send_transaction(&self, tx: &Transaction) -> LedgerResult<Signature> {
        self.check_online()?;
        tx.verify()
            .map_err(|e| format!("signature verification failed: {}", e))?;

        let mut ledger = self.ledger.lock().unwrap();
        if !ledger.blockhashes.contains(&tx.message.recent_blockhash) {
            return Err("Blockhash not found".into());
        }

        let message = &tx.message;
        let signer_count = message.header.num_required_signatures as usize;
        let signers: HashSet<Pubkey> = message.account_keys[..signer_count].iter().copied().collect();
        let fee_payer = message.account_keys[0];

        // Execute against a scratch copy so a failing instruction leaves no trace
        let mut accounts = ledger.accounts.clone();
        debit(&mut accounts, &fee_payer, FEE_PER_SIGNATURE * signer_count as u64)
            .map_err(|_| "insufficient funds for fee")?;

        for ix in &message.instructions {
            let program_id = message.account_keys[ix.program_id_index as usize];
            let keys: Vec<Pubkey> = ix
                .accounts
                .iter()
                .map(|i| message.account_keys[*i as usize])
                .collect();
            execute(&mut accounts, &program_id, &keys, &ix.data, &signers)?;
        }

        ledger.accounts = accounts;
        let signature = tx.signatures[0];
        ledger.confirmed.insert(signature);
        ledger.transactions.push(tx.clone());
        Ok(signature)
    }

    async fn confirm_transaction(&self, signature: &Signature) -> LedgerResult<()> {
        self.check_online()?;
        if self.ledger.lock().unwrap().confirmed.contains(signature) {
            Ok(())
        } else {
            Err(format!("Transaction {} was not confirmed", signature).into())
        }
    }

    async fn get_account(&self, pubkey: &Pubkey) -> LedgerResult<Option<Account>> {
        self.check_online()?;
        Ok(self.account(pubkey))
    }

    async fn get_balance(&self, pubkey: &Pubkey) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(self.lamports(pubkey))
    }

    async fn get_latest_blockhash(&self) -> LedgerResult<Hash> {
        self.check_online()?;
        let mut ledger = self.ledger.lock().unwrap();
        let hash = Hash::new_unique();
        ledger.blockhashes.insert(hash);
        ledger.blockhash_requests += 1;
        Ok(hash)
    }

    async fn get_minimum_balance_for_rent_exemption(&self, data_len: usize) -> LedgerResult<u64> {
        self.check_online()?;
        Ok(Rent::default().minimum_balance(data_len))
    }
}

fn token_account(mint: &Pubkey, owner: &Pubkey, amount: u64) -> Account {
    let mut data = vec![0u8; TOKEN_ACCOUNT_LEN];
    data[..32].copy_from_slice(mint.as_ref());
    data[32..64].copy_from_slice(owner.as_ref());
    data[64..72].copy_from_slice(&amount.to_le_bytes());
    data[108] = 1;
    Account {
        lamports: Rent::default().minimum_balance(TOKEN_ACCOUNT_LEN),
        data,
        owner: TOKEN_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

fn debit(accounts: &mut HashMap<Pubkey, Account>, key: &Pubkey, lamports: u64) -> LedgerResult<()> {
    let account = accounts.get_mut(key).ok_or("account not found")?;
    account.lamports = account
        .lamports
        .checked_sub(lamports)
        .ok_or("insufficient lamports")?;
    Ok(())
}

fn credit(accounts: &mut HashMap<Pubkey, Account>, key: &Pubkey, lamports: u64) {
    accounts
        .entry(*key)
        .or_insert_with(|| Account::new(0, 0, &system_program::id()))
        .lamports += lamports;
}

fn require_signer(signers: &HashSet<Pubkey>, key: &Pubkey) -> LedgerResult<()> {
    if signers.contains(key) {
        Ok(())
    } else {
        Err(format!("missing required signature for {}", key).into())
    }
}

fn account_at(keys: &[Pubkey], index: usize) -> LedgerResult<Pubkey> {
    keys.get(index)
        .copied()
        .ok_or_else(|| "not enough account keys".into())
}

fn execute(
    accounts: &mut HashMap<Pubkey, Account>,
    program_id: &Pubkey,
    keys: &[Pubkey],
    data: &[u8],
    signers: &HashSet<Pubkey>,
) -> LedgerResult<()> {
    if *program_id == system_program::id() {
        execute_system(accounts, keys, data, signers)
    } else if *program_id == TOKEN_PROGRAM_ID {
        execute_token(accounts, keys, data, signers)
    } else if *program_id == ASSOCIATED_TOKEN_PROGRAM_ID {
        execute_ata(accounts, keys, signers)
    } else if *program_id == SWIG_PROGRAM_ID {
        execute_swig(accounts, program_id, keys, data, signers)
    } else {
        Err(format!("unknown program {}", program_id).into())
    }
}

/// Only `Transfer` (tag 2) is supported. The wallet program debits its own
/// account directly, so a signing wallet may be the source despite holding
/// data.
fn execute_system(
    accounts: &mut HashMap<Pubkey, Account>,
    keys: &[Pubkey],
    data: &[u8],
    signers: &HashSet<Pubkey>,
) -> LedgerResult<()> {
    let (lamports, from, to) = decode_system_transfer(keys, data)?;
    require_signer(signers, &from)?;
    debit(accounts, &from, lamports)?;
    credit(accounts, &to, lamports);
    Ok(())
}

fn decode_system_transfer(keys: &[Pubkey], data: &[u8]) -> LedgerResult<(u64, Pubkey, Pubkey)> {
    if data.len() != 12 || u32::from_le_bytes(data[..4].try_into()?) != 2 {
        return Err("unsupported system instruction".into());
    }
    let lamports = u64::from_le_bytes(data[4..12].try_into()?);
    Ok((lamports, account_at(keys, 0)?, account_at(keys, 1)?))
}

/// Only `TransferChecked` (tag 12) is supported.
fn execute_token(
    accounts: &mut HashMap<Pubkey, Account>,
    keys: &[Pubkey],
    data: &[u8],
    signers: &HashSet<Pubkey>,
) -> LedgerResult<()> {
    if data.len() != 10 || data[0] != 12 {
        return Err("unsupported token instruction".into());
    }
    let amount = u64::from_le_bytes(data[1..9].try_into()?);
    let decimals = data[9];
    let (source, mint, destination, authority) = (
        account_at(keys, 0)?,
        account_at(keys, 1)?,
        account_at(keys, 2)?,
        account_at(keys, 3)?,
    );
    require_signer(signers, &authority)?;

    let mint_account = accounts.get(&mint).ok_or("mint not found")?;
    if mint_account.data[44] != decimals {
        return Err("mint decimals mismatch".into());
    }

    let source_account = accounts.get(&source).ok_or("source token account not found")?;
    let (source_mint, source_owner, source_amount) = parse_token_account(&source_account.data)?;
    if source_owner != authority {
        return Err("owner does not match".into());
    }
    if source_mint != mint {
        return Err("account not associated with this mint".into());
    }
    if source_amount < amount {
        return Err("insufficient token funds".into());
    }

    let dest_account = accounts
        .get(&destination)
        .ok_or("destination token account not found")?;
    let (dest_mint, _, dest_amount) = parse_token_account(&dest_account.data)?;
    if dest_mint != mint {
        return Err("account not associated with this mint".into());
    }

    set_token_amount(accounts, &source, source_amount - amount);
    // Re-read in case source and destination are the same account
    let dest_amount = if source == destination {
        source_amount - amount
    } else {
        dest_amount
    };
    set_token_amount(accounts, &destination, dest_amount + amount);
    Ok(())
}

fn set_token_amount(accounts: &mut HashMap<Pubkey, Account>, key: &Pubkey, amount: u64) {
    if let Some(account) = accounts.get_mut(key) {
        account.data[64..72].copy_from_slice(&amount.to_le_bytes());
    }
}

fn execute_ata(
    accounts: &mut HashMap<Pubkey, Account>,
    keys: &[Pubkey],
    signers: &HashSet<Pubkey>,
) -> LedgerResult<()> {
    let (payer, ata, owner, mint) = (
        account_at(keys, 0)?,
        account_at(keys, 1)?,
        account_at(keys, 2)?,
        account_at(keys, 3)?,
    );
    require_signer(signers, &payer)?;
    if get_associated_token_address(&owner, &mint) != ata {
        return Err("associated address does not match seed derivation".into());
    }
    if accounts.contains_key(&ata) {
        return Err(format!("account {} already in use", ata).into());
    }
    let account = token_account(&mint, &owner, 0);
    debit(accounts, &payer, account.lamports)?;
    accounts.insert(ata, account);
    Ok(())
}

fn execute_swig(
    accounts: &mut HashMap<Pubkey, Account>,
    program_id: &Pubkey,
    keys: &[Pubkey],
    data: &[u8],
    signers: &HashSet<Pubkey>,
) -> LedgerResult<()> {
    let instruction = SwigInstruction::try_from_slice(data)?;
    let swig = account_at(keys, 0)?;
    let payer = account_at(keys, 1)?;
    require_signer(signers, &payer)?;

    match instruction {
        SwigInstruction::CreateV1 {
            id,
            bump,
            authority_type,
            authority_data,
            num_actions,
            actions,
        } => {
            let (expected, expected_bump) = derive_swig_pda(program_id, &Pubkey::new_from_array(id));
            if expected != swig || expected_bump != bump {
                return Err("invalid seeds for wallet address".into());
            }
            if accounts.get(&swig).is_some_and(|a| !a.data.is_empty()) {
                return Err(format!("account {} already in use", swig).into());
            }
            let mut header = SwigHeader::new(id, bump);
            header.role_counter = 1;
            let role = new_role(0, authority_type, authority_data, num_actions, &actions)?;
            let data = encode_swig_account(&header, &[role]);
            let rent = Rent::default().minimum_balance(data.len());
            debit(accounts, &payer, rent)?;
            let existing = accounts.get(&swig).map(|a| a.lamports).unwrap_or(0);
            accounts.insert(
                swig,
                Account {
                    lamports: existing + rent,
                    data,
                    owner: *program_id,
                    executable: false,
                    rent_epoch: 0,
                },
            );
            Ok(())
        },
        SwigInstruction::AddAuthorityV1 {
            acting_role_id,
            authority_type,
            authority_data,
            num_actions,
            actions,
        } => {
            let (mut header, mut roles) = load_wallet(accounts, &swig)?;
            let acting = authorize(&roles, acting_role_id, keys.get(3), signers)?;
            if !acting.can_manage_authorities() {
                return Err("role may not manage authorities".into());
            }
            let role = new_role(header.role_counter, authority_type, authority_data, num_actions, &actions)?;
            roles.push(role);
            header.role_counter += 1;
            store_wallet(accounts, &swig, &payer, &header, &roles)
        },
        SwigInstruction::RemoveAuthorityV1 {
            acting_role_id,
            authority_to_remove_id,
        } => {
            let (header, mut roles) = load_wallet(accounts, &swig)?;
            let acting = authorize(&roles, acting_role_id, keys.get(3), signers)?;
            if !acting.can_manage_authorities() {
                return Err("role may not manage authorities".into());
            }
            if roles.len() <= 1 {
                return Err("cannot remove the last authority".into());
            }
            let before = roles.len();
            roles.retain(|r| r.id != authority_to_remove_id);
            if roles.len() == before {
                return Err(format!("role {} not found", authority_to_remove_id).into());
            }
            store_wallet(accounts, &swig, &payer, &header, &roles)
        },
        SwigInstruction::SignV1 { role_id, instructions } => {
            let (_, roles) = load_wallet(accounts, &swig)?;
            let role = authorize(&roles, role_id, keys.get(2), signers)?.clone();

            let mut inner_signers = signers.clone();
            inner_signers.insert(swig);

            for compact in &instructions {
                let (inner_program, inner_keys) = expand(keys, compact)?;
                check_spend(&role, &swig, &inner_program, &inner_keys, &compact.data)?;
                execute(accounts, &inner_program, &inner_keys, &compact.data, &inner_signers)?;
            }
            Ok(())
        },
    }
}

fn new_role(
    id: u32,
    authority_type: u16,
    authority_data: Vec<u8>,
    num_actions: u16,
    actions: &[u8],
) -> LedgerResult<RoleInfo> {
    let authority_type = AuthorityType::try_from(authority_type)
        .map_err(|t| format!("invalid authority type {}", t))?;
    if authority_type != AuthorityType::Ed25519 || authority_data.len() != 32 {
        return Err("unsupported authority".into());
    }
    let key = Pubkey::new_from_array(authority_data[..32].try_into()?);
    Ok(RoleInfo::ed25519(id, key, decode_actions(actions, num_actions)?))
}

fn load_wallet(
    accounts: &HashMap<Pubkey, Account>,
    swig: &Pubkey,
) -> LedgerResult<(SwigHeader, Vec<RoleInfo>)> {
    let account = accounts.get(swig).ok_or("wallet account not found")?;
    Ok((parse_wallet_header(&account.data)?, parse_roles(&account.data)?))
}

fn store_wallet(
    accounts: &mut HashMap<Pubkey, Account>,
    swig: &Pubkey,
    payer: &Pubkey,
    header: &SwigHeader,
    roles: &[RoleInfo],
) -> LedgerResult<()> {
    let data = encode_swig_account(header, roles);
    let required = Rent::default().minimum_balance(data.len());
    let current_rent = accounts
        .get(swig)
        .map(|a| Rent::default().minimum_balance(a.data.len()))
        .unwrap_or(0);
    if required > current_rent {
        debit(accounts, payer, required - current_rent)?;
        credit(accounts, swig, required - current_rent);
    }
    if let Some(account) = accounts.get_mut(swig) {
        account.data = data;
    }
    Ok(())
}

fn authorize<'a>(
    roles: &'a [RoleInfo],
    role_id: u32,
    authority: Option<&Pubkey>,
    signers: &HashSet<Pubkey>,
) -> LedgerResult<&'a RoleInfo> {
    let authority = authority.ok_or("missing authority account")?;
    let role = roles
        .iter()
        .find(|r| r.id == role_id)
        .ok_or_else(|| format!("role {} not found", role_id))?;
    if !role.is_bound_to(authority) {
        return Err(format!("authority {} does not hold role {}", authority, role_id).into());
    }
    require_signer(signers, authority)?;
    Ok(role)
}

fn expand(keys: &[Pubkey], compact: &CompactInstruction) -> LedgerResult<(Pubkey, Vec<Pubkey>)> {
    let program = account_at(keys, compact.program_id_index as usize)?;
    let inner = compact
        .accounts
        .iter()
        .map(|i| account_at(keys, *i as usize))
        .collect::<LedgerResult<Vec<_>>>()?;
    Ok((program, inner))
}

/// Enforce the role's spend permissions for debits of the wallet.
fn check_spend(
    role: &RoleInfo,
    swig: &Pubkey,
    program: &Pubkey,
    keys: &[Pubkey],
    data: &[u8],
) -> LedgerResult<()> {
    if *program == system_program::id() {
        let (lamports, from, _) = decode_system_transfer(keys, data)?;
        if from == *swig {
            let allowed = role.actions.iter().any(|a| match a {
                Action::All => true,
                Action::SolLimit { amount } => lamports <= *amount,
                _ => false,
            });
            if !allowed {
                return Err(format!("role {} may not spend {} lamports", role.id, lamports).into());
            }
        }
    } else if *program == TOKEN_PROGRAM_ID {
        let authority = account_at(keys, 3)?;
        let mint = account_at(keys, 1)?;
        if authority == *swig && !role.can_spend_token(&mint) {
            return Err(format!("role {} may not spend {}", role.id, mint).into());
        }
    } else if *program == SWIG_PROGRAM_ID {
        return Err("reentrant wallet instruction".into());
    }
    Ok(())
}
