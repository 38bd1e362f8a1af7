//! Operation catalog and the strategies plugged into the pipeline engine.

mod authority;
mod query;
mod token;
mod transfer;
mod wallet;

pub use authority::{AddSwigAuthority, RemoveSwigAuthority};
pub use query::{GetSwigAuthorities, GetSwigBalance, GetSwigTokenBalance};
pub use token::TokenTransfer;
pub use transfer::NativeTransfer;
pub use wallet::{CreateSwig, GetSwigAddress};

use crate::error::AgentError;
use crate::extract::{Destination, Entities, TransferRequest};
use crate::pipeline::{Context, Operation};
use crate::resolver::Target;
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::str::FromStr;
use swig_sdk::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    CreateSwig,
    GetSwigAddress,
    GetSwigBalance,
    GetSwigTokenBalance,
    GetSwigAuthorities,
    AddSwigAuthority,
    RemoveSwigAuthority,
    TransferToSwig,
    TransferFromSwig,
    TransferToAuthority,
    TransferTokenToSwig,
    TransferTokenFromSwig,
    TransferTokenToAuthority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Wallet,
    Query,
    Authority,
    Transfer,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Wallet => "Wallet operations",
            Category::Query => "Queries",
            Category::Authority => "Authority management operations",
            Category::Transfer => "Transfers",
        }
    }
}

impl OperationKind {
    /// Catalog order; the host dispatches the first match in this order.
    pub const ALL: [OperationKind; 13] = [
        OperationKind::CreateSwig,
        OperationKind::GetSwigAddress,
        OperationKind::GetSwigBalance,
        OperationKind::GetSwigTokenBalance,
        OperationKind::GetSwigAuthorities,
        OperationKind::AddSwigAuthority,
        OperationKind::RemoveSwigAuthority,
        OperationKind::TransferToSwig,
        OperationKind::TransferFromSwig,
        OperationKind::TransferToAuthority,
        OperationKind::TransferTokenToSwig,
        OperationKind::TransferTokenFromSwig,
        OperationKind::TransferTokenToAuthority,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateSwig => "CREATE_SWIG",
            OperationKind::GetSwigAddress => "GET_SWIG_ADDRESS",
            OperationKind::GetSwigBalance => "GET_SWIG_BALANCE",
            OperationKind::GetSwigTokenBalance => "GET_SWIG_TOKEN_BALANCE",
            OperationKind::GetSwigAuthorities => "GET_SWIG_AUTHORITIES",
            OperationKind::AddSwigAuthority => "ADD_SWIG_AUTHORITY",
            OperationKind::RemoveSwigAuthority => "REMOVE_SWIG_AUTHORITY",
            OperationKind::TransferToSwig => "TRANSFER_TO_SWIG",
            OperationKind::TransferFromSwig => "TRANSFER_FROM_SWIG",
            OperationKind::TransferToAuthority => "TRANSFER_TO_AUTHORITY",
            OperationKind::TransferTokenToSwig => "TRANSFER_TOKEN_TO_SWIG",
            OperationKind::TransferTokenFromSwig => "TRANSFER_TOKEN_FROM_SWIG",
            OperationKind::TransferTokenToAuthority => "TRANSFER_TOKEN_TO_AUTHORITY",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            OperationKind::CreateSwig => Category::Wallet,
            OperationKind::GetSwigAddress
            | OperationKind::GetSwigBalance
            | OperationKind::GetSwigTokenBalance
            | OperationKind::GetSwigAuthorities => Category::Query,
            OperationKind::AddSwigAuthority | OperationKind::RemoveSwigAuthority => {
                Category::Authority
            },
            _ => Category::Transfer,
        }
    }

    /// Completes "Failed to ..." in failure replies
    pub fn describe(&self) -> &'static str {
        match self {
            OperationKind::CreateSwig => "create Swig wallet",
            OperationKind::GetSwigAddress => "get Swig wallet address",
            OperationKind::GetSwigBalance => "get Swig wallet balance",
            OperationKind::GetSwigTokenBalance => "get Swig wallet token balance",
            OperationKind::GetSwigAuthorities => "list Swig wallet authorities",
            OperationKind::AddSwigAuthority => "add Swig wallet authority",
            OperationKind::RemoveSwigAuthority => "remove Swig wallet authority",
            OperationKind::TransferToSwig => "transfer SOL to Swig wallet",
            OperationKind::TransferFromSwig => "transfer SOL from Swig wallet",
            OperationKind::TransferToAuthority => "transfer SOL to Swig authority",
            OperationKind::TransferTokenToSwig => "transfer tokens to Swig wallet",
            OperationKind::TransferTokenFromSwig => "transfer tokens from Swig wallet",
            OperationKind::TransferTokenToAuthority => "transfer tokens to Swig authority",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase().replace('-', "_");
        OperationKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| format!("unknown action {:?}", s))
    }
}

/// Parsed, operation-specific request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    None,
    TokenBalance { mint: Pubkey },
    AddAuthority { authority: Pubkey, actions: Vec<Action> },
    RemoveAuthority(Target),
    Transfer(TransferRequest),
}

/// Every strategy, in catalog order.
pub fn catalog() -> Vec<Box<dyn Operation>> {
    vec![
        Box::new(CreateSwig),
        Box::new(GetSwigAddress),
        Box::new(GetSwigBalance),
        Box::new(GetSwigTokenBalance),
        Box::new(GetSwigAuthorities),
        Box::new(AddSwigAuthority),
        Box::new(RemoveSwigAuthority),
        Box::new(NativeTransfer::to_swig()),
        Box::new(NativeTransfer::from_swig()),
        Box::new(NativeTransfer::to_authority()),
        Box::new(TokenTransfer::to_swig()),
        Box::new(TokenTransfer::from_swig()),
        Box::new(TokenTransfer::to_authority()),
    ]
}

/// Fail with `WalletNotFound` unless the caller's wallet exists.
async fn require_wallet(ctx: &Context<'_>) -> crate::error::Result<()> {
    if ctx.wallet.exists(ctx.connection).await? {
        Ok(())
    } else {
        Err(AgentError::WalletNotFound(ctx.caller))
    }
}

fn unexpected(kind: OperationKind) -> AgentError {
    AgentError::Config(format!("{} received a request it cannot handle", kind))
}

fn require_amount(entities: &Entities, example: &str) -> crate::error::Result<rust_decimal::Decimal> {
    entities.amount.ok_or_else(|| {
        AgentError::parse("No amount found in the message", format!("Try \"{}\"", example))
    })
}

/// Authority named by role id, else by key.
fn authority_target(entities: &Entities, example: &str) -> crate::error::Result<Target> {
    if let Some(id) = entities.role_id {
        return Ok(Target::Role(id));
    }
    entities
        .recipient_or_first()
        .map(Target::Address)
        .ok_or_else(|| {
            AgentError::parse(
                "No role id or authority address found in the message",
                format!("Try \"{}\"", example),
            )
        })
}

fn destination_of(target: Target) -> Destination {
    match target {
        Target::Role(id) => Destination::Role(id),
        Target::Address(address) => Destination::Address(address),
    }
}

fn target_of(destination: Destination) -> Option<Target> {
    match destination {
        Destination::Role(id) => Some(Target::Role(id)),
        Destination::Address(address) => Some(Target::Address(address)),
        Destination::Wallet => None,
    }
}
