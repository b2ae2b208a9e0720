//! Detects conversion and rate questions in free text.
//!
//! An ordered list of [`PatternRule`]s is tried against the text; the first
//! rule whose captures survive normalization wins. Rules never look at each
//! other, so each one can be exercised on its own through [`rules`].

use crate::core::currency::{self, CurrencyCode};
use crate::core::trace::ResolutionTrace;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const GLYPH: &str = r"[$€£¥฿₹₩₫₿]";
const TOKEN: &str = r"(?:[$€£¥฿₹₩₫₿]|[a-z]+(?:\s+[a-z]+){0,2})";
const LAZY_TOKEN: &str = r"(?:[$€£¥฿₹₩₫₿]|[a-z]+(?:\s+[a-z]+){0,2}?)";
const SEP: &str = r"(?:\s+(?:to|in|into)\s+|\s*(?:->|→|⇒|=)\s*)";
const AMOUNT: &str = r"(?P<amount>\d[\d,]*(?:\.\d+)?)";
const END: &str = r"\s*(?:[?!.,;:]|$)";

const SEPARATOR_WORDS: &[&str] = &["to", "in", "into"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Convert,
    Rate,
}

/// A recognized request: convert `amount` of `source` into `destination`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntent {
    pub kind: IntentKind,
    pub amount: f64,
    pub source: CurrencyCode,
    pub destination: Option<CurrencyCode>,
}

/// Raw text pulled out by one rule, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleCaptures {
    pub amount: Option<String>,
    pub source: Option<String>,
    pub destination: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenPolicy {
    /// Full normalizer, including the 3-letter ISO guess.
    Lenient,
    /// Only glyphs and aliases of known currencies.
    KnownOnly,
}

/// What a rule does when it captured no destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingDestination {
    /// Crypto sources are quoted in USD; fiat sources reject the match.
    CryptoInUsd,
    /// Fill in the configured default currency.
    ConfiguredDefault,
}

pub struct PatternRule {
    pub name: &'static str,
    pub kind: IntentKind,
    regex: Regex,
    tokens: TokenPolicy,
    missing_destination: MissingDestination,
}

impl PatternRule {
    fn new(
        name: &'static str,
        kind: IntentKind,
        template: &str,
        tokens: TokenPolicy,
        missing_destination: MissingDestination,
    ) -> Self {
        let pattern = format!(
            "(?i){}",
            template
                .replace("<GLYPH>", GLYPH)
                .replace("<TOKEN>", TOKEN)
                .replace("<LAZY>", LAZY_TOKEN)
                .replace("<SEP>", SEP)
                .replace("<AMOUNT>", AMOUNT)
                .replace("<END>", END)
        );
        PatternRule {
            name,
            kind,
            regex: Regex::new(&pattern).expect("Invalid query pattern"),
            tokens,
            missing_destination,
        }
    }

    /// Leftmost structural match only; no normalization.
    pub fn captures(&self, text: &str) -> Option<RuleCaptures> {
        self.captures_all(text).next()
    }

    /// Every structural match, leftmost first. Matches may overlap: after
    /// each one the search restarts one character past its start.
    pub fn captures_all<'t>(&'t self, text: &'t str) -> impl Iterator<Item = RuleCaptures> + 't {
        let mut start = 0;
        std::iter::from_fn(move || {
            if start > text.len() {
                return None;
            }
            let caps = self.regex.captures_at(text, start)?;
            let whole = caps.get(0)?;
            start = whole.start()
                + text[whole.start()..]
                    .chars()
                    .next()
                    .map_or(1, char::len_utf8);

            let group = |name: &str| {
                caps.name(name)
                    .map(|m| m.as_str().trim().to_string())
                    .filter(|s| !s.is_empty())
            };
            Some(RuleCaptures {
                amount: group("amount"),
                source: group("src").or_else(|| group("glyph")),
                destination: group("dst"),
            })
        })
    }
}

static RULES: Lazy<Vec<PatternRule>> = Lazy::new(|| {
    use IntentKind::{Convert, Rate};
    use MissingDestination::{ConfiguredDefault, CryptoInUsd};
    use TokenPolicy::{KnownOnly, Lenient};

    vec![
        PatternRule::new(
            "convert amount",
            Convert,
            r"\b(?:convert|exchange)\s+<AMOUNT>\s*(?P<src><LAZY>)(?:<SEP>(?P<dst><TOKEN>)|<END>)",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "convert symbol amount",
            Convert,
            r"\b(?:convert|exchange)\s+(?P<glyph><GLYPH>)\s*<AMOUNT>(?:<SEP>(?P<dst><TOKEN>)|<END>)",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "amount pair",
            Convert,
            r"\b<AMOUNT>\s*(?P<src><LAZY>)<SEP>(?P<dst><TOKEN>)",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "symbol amount pair",
            Convert,
            r"(?P<glyph><GLYPH>)\s*<AMOUNT><SEP>(?P<dst><TOKEN>)",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "rate for",
            Rate,
            r"\brate\s+(?:for|of)\s+(?P<src><LAZY>)(?:<SEP>(?P<dst><TOKEN>)|<END>)",
            Lenient,
            ConfiguredDefault,
        ),
        PatternRule::new(
            "exchange rate",
            Rate,
            r"\bexchange\s+rate\s+(?P<src><LAZY>)(?:<SEP>(?P<dst><TOKEN>)|<END>)",
            Lenient,
            ConfiguredDefault,
        ),
        PatternRule::new(
            "crypto price",
            Rate,
            r"\b(?P<src>btc|bitcoin)\s+price(?:\s+in\s+(?P<dst><TOKEN>))?",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "price of crypto",
            Rate,
            r"\bprice\s+of\s+(?P<src>btc|bitcoin)(?:\s+in\s+(?P<dst><TOKEN>))?",
            Lenient,
            CryptoInUsd,
        ),
        PatternRule::new(
            "crypto rate question",
            Rate,
            r"\bwhat(?:'s|\s+is)?\s+the\s+(?:current\s+)?(?:exchange\s+)?rate\s+for\s+(?P<src>btc|bitcoin)(?:<SEP>(?P<dst><TOKEN>))?",
            Lenient,
            ConfiguredDefault,
        ),
        PatternRule::new(
            "bare pair",
            Rate,
            r"(?P<src><GLYPH>|\b[a-z]+(?:\s+[a-z]+){0,2}?)<SEP>(?P<dst><TOKEN>)",
            KnownOnly,
            CryptoInUsd,
        ),
    ]
});

/// The cascade, in priority order.
pub fn rules() -> &'static [PatternRule] {
    &RULES
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

fn has_separator_word(token: &str) -> bool {
    token
        .split_whitespace()
        .any(|word| SEPARATOR_WORDS.contains(&word.to_lowercase().as_str()))
}

/// Whole token first; failing that, the longest known phrase left after
/// dropping leading or trailing filler words ("much is dollar", "eur
/// please"). A drop that would remove a qualifier such as "kong" or
/// "canadian" fails instead, so a half-recognized name is never read as
/// plain dollars. Sub-phrases never use the ISO guess.
fn resolve_token(raw: &str, policy: TokenPolicy) -> Option<CurrencyCode> {
    let whole = match policy {
        TokenPolicy::Lenient => currency::normalize(raw),
        TokenPolicy::KnownOnly => currency::resolve_alias(raw).filter(CurrencyCode::is_known),
    };
    if whole.is_some() {
        return whole;
    }

    let words: Vec<&str> = raw.split_whitespace().collect();
    for len in (1..words.len()).rev() {
        let cut = words.len() - len;
        let candidates = [
            (&words[cut..], &words[..cut]),
            (&words[..len], &words[len..]),
        ];
        for (kept, dropped) in candidates {
            if dropped.iter().any(|word| currency::is_qualifier(word)) {
                continue;
            }
            if let Some(code) = currency::resolve_alias(&kept.join(" ")) {
                return Some(code);
            }
        }
    }
    None
}

/// Cheap keyword/symbol screen run before the cascade.
///
/// Accepts every text the cascade could accept: a resolvable source needs a
/// glyph or an alias somewhere in the text, and the rules that allow ISO
/// guesses all need a digit or a convert/exchange/rate keyword.
pub fn should_attempt_parse(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if lowered.chars().any(currency::is_symbol_char) {
        return true;
    }
    if lowered.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    if ["convert", "exchange", "rate", "price"]
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return true;
    }
    let squashed = lowered.replace('.', "");
    currency::alias_keys().any(|alias| squashed.contains(alias))
}

pub struct QueryParser {
    default_currency: CurrencyCode,
}

impl QueryParser {
    /// `default_currency` fills in the destination of rate questions that
    /// name none ("exchange rate for bitcoin").
    pub fn new(default_currency: CurrencyCode) -> Self {
        QueryParser { default_currency }
    }

    /// Runs the cascade. `trace` is cleared first and then records which
    /// rules matched and why they were accepted or rejected.
    pub fn parse(&self, text: &str, trace: &mut ResolutionTrace) -> Option<ParsedIntent> {
        trace.clear();
        trace.record(format!("Parsing query: {text:?}"));

        for rule in rules() {
            for captures in rule.captures_all(text) {
                debug!(rule = rule.name, ?captures, "Pattern matched");
                match self.accept(rule, &captures) {
                    Some(intent) => {
                        trace.record(format!(
                            "Rule '{}' matched: src={}, dst={}, amt={}",
                            rule.name,
                            intent.source,
                            intent
                                .destination
                                .as_ref()
                                .map_or("-".to_string(), ToString::to_string),
                            intent.amount
                        ));
                        return Some(intent);
                    }
                    None => trace.record(format!(
                        "Rule '{}' matched but its currencies did not resolve ({:?} -> {:?})",
                        rule.name, captures.source, captures.destination
                    )),
                }
            }
        }

        trace.record("No currency pattern matched.");
        None
    }

    fn accept(&self, rule: &PatternRule, captures: &RuleCaptures) -> Option<ParsedIntent> {
        let amount = match captures.amount.as_deref() {
            Some(raw) => parse_amount(raw)?,
            None => 1.0,
        };

        let raw_source = captures.source.as_deref()?;
        if has_separator_word(raw_source) {
            return None;
        }
        let source = resolve_token(raw_source, rule.tokens)?;

        let destination = match captures.destination.as_deref() {
            Some(raw) => resolve_token(raw, rule.tokens)?,
            None => match rule.missing_destination {
                MissingDestination::ConfiguredDefault => self.default_currency.clone(),
                MissingDestination::CryptoInUsd if source.is_crypto() => CurrencyCode::usd(),
                MissingDestination::CryptoInUsd => return None,
            },
        };

        Some(ParsedIntent {
            kind: rule.kind,
            amount,
            source,
            destination: Some(destination),
        })
    }
}
