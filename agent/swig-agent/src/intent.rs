//! Intent classification.
//!
//! Each operation has its own predicate over the case-folded message: a
//! combination of coarse lexical signals, or-ed with a list of trigger
//! phrases. Predicates are independent, so several operations may match
//! the same message; choosing between them is left to the host.

use crate::extract::extract_amount;
use crate::operations::OperationKind;
use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};

fn word_re(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap()
}

static TRANSFER: Lazy<Regex> =
    Lazy::new(|| word_re(r"\b(transfer|send|pay|move|withdraw|deposit|fund)\b"));
static SWIG: Lazy<Regex> = Lazy::new(|| word_re(r"\bswig\b"));
static AUTHORITY: Lazy<Regex> =
    Lazy::new(|| word_re(r"\b(authority|authorities|role|roles|signer|signers)\b"));
static TOKEN: Lazy<Regex> = Lazy::new(|| word_re(r"\b(token|tokens|spl|mint|usdc|usdt)\b"));
static FROM_SWIG: Lazy<Regex> = Lazy::new(|| word_re(r"\bfrom\s+(my\s+|the\s+)?swig\b"));
static TO_SWIG: Lazy<Regex> = Lazy::new(|| word_re(r"\b(to|into)\s+(my\s+|the\s+)?swig\b"));
static BALANCE: Lazy<Regex> = Lazy::new(|| word_re(r"\b(balance|balances|holdings)\b"));
static CREATE: Lazy<Regex> =
    Lazy::new(|| word_re(r"\b(create|make|setup|initialize|init|open)\b|\bset up\b"));
static LIST: Lazy<Regex> =
    Lazy::new(|| word_re(r"\b(list|show|get|view|display|who|what)\b"));
static ADD: Lazy<Regex> = Lazy::new(|| word_re(r"\b(add|grant|register)\b"));
static REMOVE: Lazy<Regex> = Lazy::new(|| word_re(r"\b(remove|revoke|delete|drop)\b"));
static ADDRESS: Lazy<Regex> = Lazy::new(|| word_re(r"\baddress\b"));

/// Coarse lexical signals of one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub transfer: bool,
    pub swig: bool,
    pub authority: bool,
    pub token: bool,
    pub amount: bool,
    pub from_swig: bool,
    pub to_swig: bool,
    pub balance: bool,
    pub create: bool,
    pub list: bool,
    pub add: bool,
    pub remove: bool,
    pub address: bool,
}

impl Signals {
    /// Scan the raw message. Amounts are read before folding so addresses
    /// keep their case.
    pub fn scan(raw: &str) -> Self {
        let text = raw.to_lowercase();
        let text = text.as_str();
        Self {
            transfer: TRANSFER.is_match(text),
            swig: SWIG.is_match(text),
            authority: AUTHORITY.is_match(text),
            token: TOKEN.is_match(text),
            amount: extract_amount(raw).is_some(),
            from_swig: FROM_SWIG.is_match(text),
            to_swig: TO_SWIG.is_match(text),
            balance: BALANCE.is_match(text),
            create: CREATE.is_match(text),
            list: LIST.is_match(text),
            add: ADD.is_match(text),
            remove: REMOVE.is_match(text),
            address: ADDRESS.is_match(text),
        }
    }

    /// Moves value, as opposed to administering or querying
    fn moves_value(&self) -> bool {
        (self.transfer || self.amount) && !self.add && !self.remove && !self.balance
    }
}

/// Evaluate the lexical rule for `kind`.
fn signal_rule(kind: OperationKind, s: &Signals) -> bool {
    use OperationKind::*;
    match kind {
        CreateSwig => s.create && s.swig && !s.transfer && !s.authority,
        GetSwigAddress => s.swig && s.address && !s.transfer && !s.balance && !s.authority,
        GetSwigBalance => s.swig && s.balance && !s.token && !s.transfer,
        GetSwigTokenBalance => s.swig && s.balance && s.token && !s.transfer,
        GetSwigAuthorities => {
            s.swig && s.authority && s.list && !s.add && !s.remove && !s.transfer
        },
        AddSwigAuthority => s.add && s.authority && !s.remove && !s.transfer,
        RemoveSwigAuthority => s.remove && s.authority && !s.add && !s.transfer,
        TransferToSwig => s.moves_value() && s.to_swig && !s.from_swig && !s.token,
        TransferFromSwig => {
            s.moves_value() && s.from_swig && !s.to_swig && !s.authority && !s.token
        },
        TransferToAuthority => {
            s.moves_value() && s.authority && !s.token && (s.from_swig || s.swig) && !s.to_swig
        },
        TransferTokenToSwig => s.moves_value() && s.token && s.to_swig && !s.from_swig,
        TransferTokenFromSwig => {
            s.moves_value() && s.token && s.from_swig && !s.to_swig && !s.authority
        },
        TransferTokenToAuthority => {
            s.moves_value() && s.token && s.authority && (s.from_swig || s.swig) && !s.to_swig
        },
    }
}

/// Trigger phrases for `kind`, matched against the case-folded message.
fn phrases(kind: OperationKind) -> &'static [&'static str] {
    use OperationKind::*;
    match kind {
        CreateSwig => &[
            r"^\s*new swig( wallet)?\s*$",
            r"\b(create|make) (me )?(a |my )?(new )?(swig|smart) wallet\b",
        ],
        GetSwigAddress => &[
            r"\bwhat('s| is) my swig\b",
            r"\bwhere is my swig\b",
            r"\bmy swig (wallet )?address\b",
        ],
        GetSwigBalance => &[
            r"\bhow much sol (is )?(in|does) (my )?swig\b",
            r"\bswig sol balance\b",
        ],
        GetSwigTokenBalance => &[
            r"\bhow many tokens (are )?in (my )?swig\b",
            r"\bswig token balances?\b",
        ],
        GetSwigAuthorities => &[
            r"\bwho can sign\b",
            r"\b(list|show|view) (the |my )?(swig )?(authorities|roles|signers)\b",
        ],
        AddSwigAuthority => &[r"\badd (a |an )?(new )?(authority|signer|role)\b"],
        RemoveSwigAuthority => &[r"\b(remove|revoke) (the )?(authority|signer|role)\b"],
        TransferToSwig => &[
            r"\b(deposit|fund) \d+(\.\d+)?\s*sol\b.*\bswig\b",
            r"\btop up (my )?swig\b",
        ],
        TransferFromSwig => &[r"\bwithdraw \d+(\.\d+)?\s*sol from (my )?swig to [1-9a-z]{32,44}\b"],
        TransferToAuthority => &[
            r"\b(send|transfer|pay) \d+(\.\d+)?\s*sol\b.*\bto (authority|role)\b",
        ],
        TransferTokenToSwig => &[r"\bdeposit \d+(\.\d+)?\s*tokens?\b.*\bswig\b"],
        TransferTokenFromSwig => {
            &[r"\bwithdraw \d+(\.\d+)?\s*tokens? from (my )?swig to [1-9a-z]{32,44}\b"]
        },
        TransferTokenToAuthority => {
            &[r"\b(send|transfer|pay) \d+(\.\d+)?\s*tokens?\b.*\bto (authority|role)\b"]
        },
    }
}

static PHRASE_SETS: Lazy<Vec<(OperationKind, RegexSet)>> = Lazy::new(|| {
    OperationKind::ALL
        .iter()
        .map(|kind| (*kind, RegexSet::new(phrases(*kind)).unwrap()))
        .collect()
});

fn phrase_rule(kind: OperationKind, text: &str) -> bool {
    PHRASE_SETS
        .iter()
        .find(|(k, _)| *k == kind)
        .is_some_and(|(_, set)| set.is_match(text))
}

/// Does `text` express the intent of `kind`?
pub fn matches(kind: OperationKind, text: &str) -> bool {
    signal_rule(kind, &Signals::scan(text)) || phrase_rule(kind, &text.to_lowercase())
}

/// Every operation whose predicate accepts `text`, in catalog order.
pub fn matching_operations(text: &str) -> Vec<OperationKind> {
    let folded = text.to_lowercase();
    let signals = Signals::scan(text);
    OperationKind::ALL
        .iter()
        .copied()
        .filter(|kind| signal_rule(*kind, &signals) || phrase_rule(*kind, &folded))
        .collect()
}
