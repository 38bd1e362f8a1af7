//! Swig program instruction definitions

use borsh::{BorshDeserialize, BorshSerialize};

/// An inner instruction carried by `SignV1`, with program and account
/// references expressed as indexes into the `SignV1` account list.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CompactInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub enum SwigInstruction {
    /// Create a new Swig wallet with a single root role (id 0)
    ///
    /// Accounts:
    /// 0. `[writable]` Swig account (PDA: ["swig", id])
    /// 1. `[writable, signer]` Payer
    /// 2. `[]` System program
    CreateV1 {
        /// Seed of the wallet PDA (the owner's key)
        id: [u8; 32],
        /// PDA bump seed
        bump: u8,
        /// Root authority type
        authority_type: u16,
        /// Root authority data (pubkey or key data)
        authority_data: Vec<u8>,
        /// Number of encoded action records
        num_actions: u16,
        /// Encoded action records
        actions: Vec<u8>,
    },

    /// Add a new authority (role) to the wallet
    ///
    /// Accounts:
    /// 0. `[writable]` Swig account
    /// 1. `[writable, signer]` Payer
    /// 2. `[]` System program
    /// 3. `[signer]` Authority of the acting role
    AddAuthorityV1 {
        /// Acting role ID (must permit authority management)
        acting_role_id: u32,
        /// New authority type
        authority_type: u16,
        /// New authority data
        authority_data: Vec<u8>,
        /// Number of encoded action records
        num_actions: u16,
        /// Encoded action records
        actions: Vec<u8>,
    },

    /// Remove an authority from the wallet
    ///
    /// Accounts:
    /// 0. `[writable]` Swig account
    /// 1. `[writable, signer]` Payer
    /// 2. `[]` System program
    /// 3. `[signer]` Authority of the acting role
    RemoveAuthorityV1 {
        /// Acting role ID
        acting_role_id: u32,
        /// Role ID to remove
        authority_to_remove_id: u32,
    },

    /// Execute inner instructions with the Swig account as signer
    ///
    /// Accounts:
    /// 0. `[writable]` Swig account (signs inner instructions)
    /// 1. `[writable, signer]` Payer
    /// 2. `[signer]` Authority of the acting role
    /// 3+ Inner programs and accounts referenced by `instructions`
    SignV1 {
        /// Role ID authorizing the inner instructions
        role_id: u32,
        /// Inner instructions
        instructions: Vec<CompactInstruction>,
    },
}
