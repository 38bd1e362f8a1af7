use crate::error::Result;
use crate::instruction::{CompactInstruction, SwigInstruction};
use crate::state::encode_actions;
use crate::types::{Action, AuthorityType};
use crate::utils::derive_swig_pda;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::system_program;

pub fn create_swig(
    program_id: &Pubkey,
    payer: &Pubkey,
    owner: &Pubkey,
    actions: &[Action],
) -> Result<Instruction> {
    let (swig, bump) = derive_swig_pda(program_id, owner);

    let instruction = SwigInstruction::CreateV1 {
        id: owner.to_bytes(),
        bump,
        authority_type: AuthorityType::Ed25519 as u16,
        authority_data: owner.to_bytes().to_vec(),
        num_actions: actions.len() as u16,
        actions: encode_actions(actions),
    };

    let accounts = vec![
        AccountMeta::new(swig, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: borsh::to_vec(&instruction)?,
    })
}

pub fn add_authority(
    program_id: &Pubkey,
    swig: &Pubkey,
    payer: &Pubkey,
    acting_authority: &Pubkey,
    acting_role_id: u32,
    new_authority: &Pubkey,
    actions: &[Action],
) -> Result<Instruction> {
    let instruction = SwigInstruction::AddAuthorityV1 {
        acting_role_id,
        authority_type: AuthorityType::Ed25519 as u16,
        authority_data: new_authority.to_bytes().to_vec(),
        num_actions: actions.len() as u16,
        actions: encode_actions(actions),
    };

    let accounts = vec![
        AccountMeta::new(*swig, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(*acting_authority, true),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: borsh::to_vec(&instruction)?,
    })
}

pub fn remove_authority(
    program_id: &Pubkey,
    swig: &Pubkey,
    payer: &Pubkey,
    acting_authority: &Pubkey,
    acting_role_id: u32,
    target_role_id: u32,
) -> Result<Instruction> {
    let instruction = SwigInstruction::RemoveAuthorityV1 {
        acting_role_id,
        authority_to_remove_id: target_role_id,
    };

    let accounts = vec![
        AccountMeta::new(*swig, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(*acting_authority, true),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: borsh::to_vec(&instruction)?,
    })
}

/// Build `SignV1` from already-compacted inner instructions.
///
/// `inner_accounts` are appended after the fixed `[swig, payer, authority]`
/// prefix; compact indexes must already account for that prefix.
pub fn sign(
    program_id: &Pubkey,
    swig: &Pubkey,
    payer: &Pubkey,
    authority: &Pubkey,
    role_id: u32,
    instructions: Vec<CompactInstruction>,
    inner_accounts: Vec<AccountMeta>,
) -> Result<Instruction> {
    let instruction = SwigInstruction::SignV1 {
        role_id,
        instructions,
    };

    let mut accounts = vec![
        AccountMeta::new(*swig, false),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(*authority, true),
    ];
    accounts.extend(inner_accounts);

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: borsh::to_vec(&instruction)?,
    })
}
