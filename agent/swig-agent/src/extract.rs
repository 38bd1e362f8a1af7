//! Entity extraction from free text.
//!
//! Extraction never fails: missing values come back as `None` or empty and
//! the operation that needs them decides what is required.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;
use std::ops::Range;
use std::str::FromStr;
use tracing::debug;

const BASE58: &str = "[1-9A-HJ-NP-Za-km-z]";

static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w.])(\d+(?:\.\d+)?)").unwrap());
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b{}{{32,44}}\b", BASE58)).unwrap());
static ROLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\brole\s*(?:id\s*)?[:#]?\s*(\d+)\b").unwrap());
static SOL_LIMIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\blimit(?:ed)?\s*(?:of\s+|to\s+|at\s+|:\s*)?(\d+(?:\.\d+)?)|(?:^|[^\w.])(\d+(?:\.\d+)?)\s*sol\b",
    )
    .unwrap()
});
static MINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i:\bmint\s*(?:address\s*)?)[:=]?\s*({}{{32,44}})\b",
        BASE58
    ))
    .unwrap()
});
static RECIPIENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i:\bto\s+(?:the\s+)?(?:authority\s+|address\s+|wallet\s+|recipient\s+)?)({}{{32,44}})\b",
        BASE58
    ))
    .unwrap()
});

/// Where a transfer lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    /// The caller's Swig wallet
    Wallet,
    /// The authority bound to a role id
    Role(u32),
    /// A plain address, or an authority named by its key
    Address(Pubkey),
}

/// A parsed value transfer. Exists for one invocation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Human amount, always positive
    pub amount: Decimal,
    /// `None` for native SOL
    pub mint: Option<Pubkey>,
    pub from_wallet: bool,
    pub destination: Destination,
}

/// Everything the extractor could find in one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub amount: Option<Decimal>,
    /// Amount next to a `limit` or `SOL` cue
    pub sol_limit: Option<Decimal>,
    pub role_id: Option<u32>,
    pub mint: Option<Pubkey>,
    pub recipient: Option<Pubkey>,
    /// All address-like tokens, left to right
    pub addresses: Vec<Pubkey>,
}

impl Entities {
    pub fn from_text(text: &str) -> Self {
        Self {
            amount: extract_amount(text),
            sol_limit: extract_sol_limit(text),
            role_id: extract_role_id(text),
            mint: extract_mint(text),
            recipient: extract_recipient(text),
            addresses: extract_addresses(text),
        }
    }

    /// Addresses not already claimed by a keyword-tagged slot
    fn untagged(&self) -> impl Iterator<Item = &Pubkey> {
        self.addresses
            .iter()
            .filter(move |a| Some(**a) != self.mint && Some(**a) != self.recipient)
    }

    /// Mint for a single-mint operation: the `mint`-tagged address, else the
    /// first address in the message.
    pub fn mint_or_first(&self) -> Option<Pubkey> {
        self.mint.or_else(|| {
            let first = self.addresses.first().copied();
            if let Some(mint) = first {
                debug!(%mint, "mint taken from first address");
            }
            first
        })
    }

    /// Mint and recipient for a token transfer.
    ///
    /// Keyword-tagged addresses win. Otherwise addresses are taken in order:
    /// first is the mint, second is the recipient.
    pub fn mint_and_recipient(&self) -> (Option<Pubkey>, Option<Pubkey>) {
        let mut untagged = self.untagged();
        let mint = self.mint.or_else(|| untagged.next().copied());
        let recipient = self.recipient.or_else(|| untagged.next().copied());
        if self.mint.is_none() || self.recipient.is_none() {
            debug!(
                mint = ?mint,
                recipient = ?recipient,
                "token transfer addresses resolved by position"
            );
        }
        (mint, recipient)
    }

    /// Recipient of a native transfer: the `to`-tagged address, else the first
    /// address in the message.
    pub fn recipient_or_first(&self) -> Option<Pubkey> {
        self.recipient.or_else(|| {
            let first = self.addresses.first().copied();
            if let Some(recipient) = first {
                debug!(%recipient, "recipient taken from first address");
            }
            first
        })
    }
}

/// First decimal or integer number outside addresses and role references.
/// A unit may be glued to the number, as in "1.5SOL".
pub fn extract_amount(text: &str) -> Option<Decimal> {
    let claimed: Vec<Range<usize>> = ADDRESS_RE
        .find_iter(text)
        .chain(ROLE_RE.find_iter(text))
        .map(|m| m.range())
        .collect();
    AMOUNT_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .filter(|m| !claimed.iter().any(|span| span.start < m.end() && m.start() < span.end))
        .filter(|m| !continues_number(&text[m.end()..]))
        .find_map(|m| Decimal::from_str(m.as_str()).ok())
}

/// Spend limit for a new authority. Only a number tied to `limit` or `SOL`
/// counts, so a role number is never read as a limit.
pub fn extract_sol_limit(text: &str) -> Option<Decimal> {
    SOL_LIMIT_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).or_else(|| c.get(2)))
        .filter(|m| !continues_number(&text[m.end()..]))
        .find_map(|m| Decimal::from_str(m.as_str()).ok())
}

/// The regex engine has no lookahead, so "1.2.3" is rejected here.
fn continues_number(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().is_some_and(|c| c.is_ascii_digit()),
        _ => false,
    }
}

/// Address-like tokens that decode to 32-byte keys, left to right.
pub fn extract_addresses(text: &str) -> Vec<Pubkey> {
    ADDRESS_RE
        .find_iter(text)
        .filter_map(|m| Pubkey::from_str(m.as_str()).ok())
        .collect()
}

pub fn extract_role_id(text: &str) -> Option<u32> {
    ROLE_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

pub fn extract_mint(text: &str) -> Option<Pubkey> {
    MINT_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| Pubkey::from_str(m.as_str()).ok())
}

pub fn extract_recipient(text: &str) -> Option<Pubkey> {
    RECIPIENT_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| Pubkey::from_str(m.as_str()).ok())
}
