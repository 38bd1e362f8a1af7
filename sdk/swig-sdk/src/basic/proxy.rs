use crate::error::{Result, SwigSdkError};
use crate::instruction::CompactInstruction;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;

/// Number of fixed accounts preceding inner accounts in `SignV1`:
/// `[swig, payer, authority]`.
pub const SIGN_PREFIX_ACCOUNTS: usize = 3;

/// Wraps external instructions into the form carried by Swig's `SignV1`.
///
/// Accounts: [Swig, Payer, Authority, ...InnerAccounts]. Inner accounts are
/// deduplicated; the Swig account is never marked as a signer because the
/// program signs for it.
#[derive(Clone)]
pub struct ProxyBuilder {
    swig: Pubkey,
    instructions: Vec<Instruction>,
}

impl ProxyBuilder {
    pub fn new(swig: Pubkey) -> Self {
        Self {
            swig,
            instructions: Vec::new(),
        }
    }

    pub fn add_instruction(mut self, ix: Instruction) -> Self {
        self.instructions.push(ix);
        self
    }

    pub fn add_instructions(mut self, ixs: impl IntoIterator<Item = Instruction>) -> Self {
        self.instructions.extend(ixs);
        self
    }

    /// Build the compact instructions and the inner account list.
    ///
    /// `prefix` holds the keys occupying the first `SIGN_PREFIX_ACCOUNTS`
    /// slots so inner references to them reuse those indexes.
    pub fn build(self, prefix: [Pubkey; SIGN_PREFIX_ACCOUNTS]) -> Result<(Vec<CompactInstruction>, Vec<AccountMeta>)> {
        if self.instructions.is_empty() {
            return Err(SwigSdkError::InvalidInstruction(
                "No inner instruction provided".to_string(),
            ));
        }

        let mut accounts: Vec<AccountMeta> = Vec::new();
        let mut compact = Vec::with_capacity(self.instructions.len());

        for ix in self.instructions {
            let program_id_index = index_of(
                &prefix,
                &mut accounts,
                AccountMeta::new_readonly(ix.program_id, false),
                &self.swig,
            )?;

            let mut indexes = Vec::with_capacity(ix.accounts.len());
            for meta in ix.accounts {
                indexes.push(index_of(&prefix, &mut accounts, meta, &self.swig)?);
            }

            compact.push(CompactInstruction {
                program_id_index,
                accounts: indexes,
                data: ix.data,
            });
        }

        Ok((compact, accounts))
    }
}

fn index_of(
    prefix: &[Pubkey; SIGN_PREFIX_ACCOUNTS],
    accounts: &mut Vec<AccountMeta>,
    mut meta: AccountMeta,
    swig: &Pubkey,
) -> Result<u8> {
    if meta.pubkey == *swig {
        meta.is_signer = false;
    }

    let index = if let Some(pos) = prefix.iter().position(|k| *k == meta.pubkey) {
        pos
    } else if let Some(pos) = accounts.iter().position(|a| a.pubkey == meta.pubkey) {
        let existing = &mut accounts[pos];
        existing.is_writable |= meta.is_writable;
        existing.is_signer |= meta.is_signer;
        SIGN_PREFIX_ACCOUNTS + pos
    } else {
        accounts.push(meta);
        SIGN_PREFIX_ACCOUNTS + accounts.len() - 1
    };

    u8::try_from(index).map_err(|_| {
        SwigSdkError::InvalidInstruction("Too many accounts for a single sign instruction".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::system_instruction;

    #[test]
    fn test_swig_reuses_prefix_slot_and_is_not_signer() {
        let swig = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let recipient = Pubkey::new_unique();

        let (compact, accounts) = ProxyBuilder::new(swig)
            .add_instruction(system_instruction::transfer(&swig, &recipient, 10))
            .build([swig, payer, payer])
            .unwrap();

        assert_eq!(compact.len(), 1);
        // system program first, then recipient
        assert_eq!(accounts.len(), 2);
        assert_eq!(compact[0].program_id_index, 3);
        assert_eq!(compact[0].accounts, vec![0, 4]);
        assert!(accounts.iter().all(|a| !a.is_signer));
        assert!(accounts[1].is_writable);
    }

    #[test]
    fn test_shared_accounts_are_deduplicated() {
        let swig = Pubkey::new_unique();
        let payer = Pubkey::new_unique();
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();

        let (compact, accounts) = ProxyBuilder::new(swig)
            .add_instruction(system_instruction::transfer(&swig, &a, 1))
            .add_instruction(system_instruction::transfer(&swig, &b, 1))
            .build([swig, payer, payer])
            .unwrap();

        assert_eq!(accounts.len(), 3);
        assert_eq!(compact[0].program_id_index, compact[1].program_id_index);
    }

    #[test]
    fn test_empty_builder_rejected() {
        let swig = Pubkey::new_unique();
        assert!(ProxyBuilder::new(swig).build([swig, swig, swig]).is_err());
    }
}
