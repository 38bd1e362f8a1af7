use solana_sdk::pubkey;
use solana_sdk::pubkey::Pubkey;

/// Swig program ID (mainnet/devnet)
pub const SWIG_PROGRAM_ID: Pubkey = pubkey!("swigypWHEksbC64pWKwah1WTeh9JXwx8H1rJHLdbQMB");

/// Seed prefix for the wallet PDA: `["swig", owner]`
pub const SWIG_SEED: &[u8] = b"swig";

/// Native SOL decimals
pub const SOL_DECIMALS: u8 = 9;
