//! Currency codes and the normalizer that maps free-text tokens onto them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

/// Fiat codes the gateway will route to the fiat provider.
pub const KNOWN_FIAT: &[&str] = &[
    "USD", "EUR", "THB", "GBP", "JPY", "CNY", "INR", "KRW", "VND", "MYR", "PHP", "CHF", "CAD",
    "AUD", "SGD", "HKD", "IDR", "NZD", "SEK", "NOK", "DKK", "TWD", "MXN", "ZAR", "TRY", "BRL",
    "PLN", "CZK", "HUF", "ILS", "AED", "SAR",
];

/// The one crypto asset we can price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoAsset {
    pub code: &'static str,
    /// Identifier used by the crypto price provider.
    pub provider_id: &'static str,
}

pub const BITCOIN: CryptoAsset = CryptoAsset {
    code: "BTC",
    provider_id: "bitcoin",
};

const SYMBOLS: &[(&str, &str)] = &[
    ("$", "USD"),
    ("€", "EUR"),
    ("฿", "THB"),
    ("£", "GBP"),
    ("¥", "JPY"),
    ("₹", "INR"),
    ("₩", "KRW"),
    ("₫", "VND"),
    ("₿", "BTC"),
];

const NAMES: &[(&str, &str)] = &[
    ("dollar", "USD"),
    ("dollars", "USD"),
    ("euro", "EUR"),
    ("euros", "EUR"),
    ("baht", "THB"),
    ("pound", "GBP"),
    ("pounds", "GBP"),
    ("yen", "JPY"),
    ("yuan", "CNY"),
    ("rupee", "INR"),
    ("rupees", "INR"),
    ("won", "KRW"),
    ("dong", "VND"),
    ("ringgit", "MYR"),
    ("peso", "PHP"),
    ("franc", "CHF"),
    ("canadian dollar", "CAD"),
    ("canadian dollars", "CAD"),
    ("australian dollar", "AUD"),
    ("australian dollars", "AUD"),
    ("singapore dollar", "SGD"),
    ("singapore dollars", "SGD"),
    ("hong kong dollar", "HKD"),
    ("hong kong dollars", "HKD"),
    ("new zealand dollar", "NZD"),
    ("new zealand dollars", "NZD"),
    ("taiwan dollar", "TWD"),
    ("taiwan dollars", "TWD"),
    ("bitcoin", "BTC"),
    ("btc", "BTC"),
];

static ALIASES: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut aliases: HashMap<String, &'static str> = KNOWN_FIAT
        .iter()
        .map(|code| (code.to_lowercase(), *code))
        .collect();
    for (name, code) in NAMES {
        aliases.insert((*name).to_string(), *code);
    }
    aliases
});

/// Words that only ever qualify a generic name ("hong" in "hong kong dollar").
static QUALIFIERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    NAMES
        .iter()
        .flat_map(|&(name, _)| {
            let words: Vec<&'static str> = name.split(' ').collect();
            words[..words.len() - 1].to_vec()
        })
        .collect()
});

/// True for a word that is part of a multi-word currency name but not its
/// last word, so dropping it would change which currency is meant.
pub fn is_qualifier(word: &str) -> bool {
    QUALIFIERS.contains(word.to_lowercase().as_str())
}

/// Characters stripped from either end of a token before the alias retry.
pub fn is_symbol_char(c: char) -> bool {
    SYMBOLS.iter().any(|(glyph, _)| glyph.starts_with(c))
}

/// Returns every alias key, lowercase. Multi-word names included.
pub fn alias_keys() -> impl Iterator<Item = &'static str> {
    ALIASES.keys().map(String::as_str)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyClass {
    Fiat,
    Crypto,
    Unknown,
}

/// Canonical, always-uppercase currency identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Self {
        CurrencyCode(code.trim().to_uppercase())
    }

    pub fn usd() -> Self {
        CurrencyCode::new("USD")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn class(&self) -> CurrencyClass {
        if self.0 == BITCOIN.code {
            CurrencyClass::Crypto
        } else if KNOWN_FIAT.contains(&self.0.as_str()) {
            CurrencyClass::Fiat
        } else {
            CurrencyClass::Unknown
        }
    }

    pub fn is_crypto(&self) -> bool {
        self.class() == CurrencyClass::Crypto
    }

    pub fn is_fiat(&self) -> bool {
        self.class() == CurrencyClass::Fiat
    }

    /// Known fiat code or the supported crypto asset.
    pub fn is_known(&self) -> bool {
        self.class() != CurrencyClass::Unknown
    }
}

impl From<String> for CurrencyCode {
    fn from(s: String) -> Self {
        CurrencyCode::new(&s)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonical(token: &str) -> String {
    token
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace('.', "")
}

fn lookup_alias(token: &str) -> Option<CurrencyCode> {
    ALIASES.get(token).map(|code| CurrencyCode::new(code))
}

/// Symbol glyph, alias, and symbol-stripped alias lookups. Never guesses.
pub fn resolve_alias(token: &str) -> Option<CurrencyCode> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some((_, code)) = SYMBOLS.iter().find(|(glyph, _)| *glyph == trimmed) {
        return Some(CurrencyCode::new(code));
    }
    let lowered = canonical(trimmed);
    if let Some(code) = lookup_alias(&lowered) {
        return Some(code);
    }
    let stripped = lowered.trim_matches(is_symbol_char).trim();
    lookup_alias(stripped)
}

/// Maps a free-text token ("€", "euro", "usd", "$usd", "xyz") to a code.
///
/// Falls back to reading any 3-letter alphabetic token as an ISO code, so
/// the result may be a code no provider knows; see [`CurrencyCode::class`].
pub fn normalize(token: &str) -> Option<CurrencyCode> {
    if let Some(code) = resolve_alias(token) {
        return Some(code);
    }
    let lowered = canonical(token);
    let stripped = lowered.trim_matches(is_symbol_char).trim();
    if stripped.chars().count() == 3 && stripped.chars().all(|c| c.is_ascii_alphabetic()) {
        return Some(CurrencyCode::new(stripped));
    }
    None
}
