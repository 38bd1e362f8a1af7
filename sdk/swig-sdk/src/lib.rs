pub mod advanced;
pub mod basic;
pub mod core;
pub mod error;
pub mod instruction;
pub mod state;
pub mod token;
pub mod types;
pub mod utils;

pub use crate::basic::wallet::SwigWallet;
pub use crate::core::connection::SolConnection;
pub use crate::core::constants::SWIG_PROGRAM_ID;
pub use crate::core::rpc::RpcConnection;
pub use crate::core::signer::SwigSigner;
pub use crate::error::{Result, SwigSdkError};
pub use crate::types::{Action, AuthorityType, RoleInfo, WalletInfo};
pub use crate::utils::{
    derive_swig_pda, fetch_wallet_account, fetch_wallet_info, find_role, find_roles_by_authority,
    parse_roles, parse_wallet_header,
};
