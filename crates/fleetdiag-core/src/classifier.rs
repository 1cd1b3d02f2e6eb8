//! Severity classifier: re-derives a canonical [`Level`] from a trouble code
//! and a message.
//!
//! The level token written in raw logs is unreliable, so it is ignored. The
//! classifier runs two ordered rule tables:
//!
//! 1. **Code pass**: first matching [`CodeRule`] wins. Curated exact-match
//!    families come first, then the broad prefix families. The airbag,
//!    seatbelt and ABS sets are filed under the `B0`/`C0` groups, so their
//!    `B1xxx`/`C1xxx` members only match with `extended_families` enabled.
//! 2. **Keyword pass**: every matching [`KeywordRule`] overwrites the level,
//!    so the last match in table order (ERROR, WARNING, DEBUG, INFO) wins.
//!
//! With no signal from either pass the configured fallback (INFO) applies.
//! Classification is pure: no I/O, no hidden state.

use std::sync::LazyLock;

use phf::phf_set;
use regex::Regex;

use crate::config::{ClassifierConfig, KeywordConfig};
use crate::error::CoreError;
use crate::parser::clean_code;
use crate::types::Level;

// ---------------------------------------------------------------------------
// Curated trouble-code families
// ---------------------------------------------------------------------------

static MISFIRE: phf::Set<&'static str> = phf_set! {
    "P0300", "P0301", "P0302", "P0303", "P0304", "P0305", "P0306", "P0307", "P0308",
};

static FUEL_TRIM: phf::Set<&'static str> = phf_set! { "P0171", "P0172", "P0174", "P0175" };

static CATALYST: phf::Set<&'static str> = phf_set! { "P0420", "P0430" };

static MASS_AIR_FLOW: phf::Set<&'static str> = phf_set! {
    "P0100", "P0101", "P0102", "P0103", "P0104", "P0105", "P0106", "P0107", "P0108", "P0109",
};

static INJECTOR: phf::Set<&'static str> = phf_set! {
    "P0200", "P0201", "P0202", "P0203", "P0204", "P0205", "P0206", "P0207", "P0208",
};

static AIRBAG: phf::Set<&'static str> = phf_set! {
    "B1000", "B1001", "B1002", "B1003", "B1004", "B1005", "B1006", "B1007", "B1008", "B1009",
};

static SEATBELT: phf::Set<&'static str> = phf_set! {
    "B1100", "B1101", "B1102", "B1103", "B1104", "B1105", "B1106", "B1107", "B1108", "B1109",
};

static BRAKE_CRITICAL: phf::Set<&'static str> = phf_set! {
    "C0000", "C0001", "C0002", "C0003", "C0004", "C0005", "C0006", "C0007", "C0008", "C0009",
};

static ABS: phf::Set<&'static str> = phf_set! {
    "C1000", "C1001", "C1002", "C1003", "C1004", "C1005", "C1006", "C1007", "C1008", "C1009",
};

static NETWORK_CRITICAL: phf::Set<&'static str> = phf_set! { "U0000", "U0001", "U0002" };

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// How a [`CodeRule`] decides whether a cleaned code belongs to it.
#[derive(Debug, Clone, Copy)]
pub enum CodeMatch {
    Exact(&'static phf::Set<&'static str>),
    /// Exact membership, checked only for codes under the prefix.
    ExactUnder(&'static phf::Set<&'static str>, &'static str),
    Prefix(&'static [&'static str]),
}

impl CodeMatch {
    fn matches(&self, code: &str) -> bool {
        match self {
            CodeMatch::Exact(set) => set.contains(code),
            CodeMatch::ExactUnder(set, prefix) => code.starts_with(prefix) && set.contains(code),
            CodeMatch::Prefix(prefixes) => prefixes.iter().any(|p| code.starts_with(p)),
        }
    }
}

/// One row of the code table.
#[derive(Debug, Clone, Copy)]
pub struct CodeRule {
    /// Stable name reported by [`Classifier::explain`].
    pub family: &'static str,
    pub matcher: CodeMatch,
    pub level: Level,
}

/// One row of the keyword table.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub level: Level,
    pub keywords: Vec<String>,
    pattern: Regex,
}

impl KeywordRule {
    /// Keywords match as case-insensitive substrings anywhere in the
    /// message, so `ok` matches both `okay` and `broken`.
    pub fn new(level: Level, keywords: Vec<String>) -> Result<Option<Self>, CoreError> {
        let alternatives: Vec<String> = keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if alternatives.is_empty() {
            return Ok(None);
        }
        let pattern = Regex::new(&format!(r"(?i)(?:{})", alternatives.join("|")))
            .map_err(|source| CoreError::InvalidKeywordRule { level, source })?;
        Ok(Some(Self { level, keywords, pattern }))
    }

    pub fn matches(&self, message: &str) -> bool {
        self.pattern.is_match(message)
    }
}

/// The outcome of a classification, with the rules that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub level: Level,
    /// Family of the code rule that matched, if any.
    pub code_family: Option<&'static str>,
    /// Level of the last keyword rule that matched, if any.
    pub keyword_level: Option<Level>,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

/// The two rule tables plus the no-signal fallback.
#[derive(Debug, Clone)]
pub struct Classifier {
    code_rules: Vec<CodeRule>,
    keyword_rules: Vec<KeywordRule>,
    fallback: Level,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::from_config(&ClassifierConfig::default())
            .expect("built-in keyword rules must compile")
    }
}

impl Classifier {
    pub fn from_config(cfg: &ClassifierConfig) -> Result<Self, CoreError> {
        Ok(Self {
            code_rules: code_rules(cfg),
            keyword_rules: keyword_rules(&cfg.keywords)?,
            fallback: cfg.fallback,
        })
    }

    pub fn code_rules(&self) -> &[CodeRule] {
        &self.code_rules
    }

    pub fn keyword_rules(&self) -> &[KeywordRule] {
        &self.keyword_rules
    }

    /// Derive the level for `(code, message)`.
    pub fn classify(&self, code: &str, message: &str) -> Level {
        self.explain(code, message).level
    }

    /// Like [`classify`](Self::classify), also reporting which rules fired.
    pub fn explain(&self, code: &str, message: &str) -> Classification {
        let code = clean_code(code);

        let code_rule = if code.is_empty() {
            None
        } else {
            self.code_rules.iter().find(|rule| rule.matcher.matches(&code))
        };

        let keyword_level = if message.trim().is_empty() {
            None
        } else {
            self.keyword_rules
                .iter()
                .filter(|rule| rule.matches(message))
                .last()
                .map(|rule| rule.level)
        };

        let level = keyword_level
            .or(code_rule.map(|rule| rule.level))
            .unwrap_or(self.fallback);

        Classification {
            level,
            code_family: code_rule.map(|rule| rule.family),
            keyword_level,
        }
    }
}

fn code_rules(cfg: &ClassifierConfig) -> Vec<CodeRule> {
    use CodeMatch::{Exact, Prefix};
    let filed = |set: &'static phf::Set<&'static str>, prefix: &'static str| {
        if cfg.extended_families {
            Exact(set)
        } else {
            CodeMatch::ExactUnder(set, prefix)
        }
    };
    vec![
        CodeRule { family: "misfire", matcher: Exact(&MISFIRE), level: Level::Error },
        CodeRule { family: "fuel_trim", matcher: Exact(&FUEL_TRIM), level: Level::Warning },
        CodeRule { family: "catalyst", matcher: Exact(&CATALYST), level: Level::Warning },
        CodeRule { family: "mass_air_flow", matcher: Exact(&MASS_AIR_FLOW), level: Level::Warning },
        CodeRule { family: "injector", matcher: Exact(&INJECTOR), level: Level::Warning },
        CodeRule { family: "airbag", matcher: filed(&AIRBAG, "B0"), level: Level::Error },
        CodeRule { family: "seatbelt", matcher: filed(&SEATBELT, "B0"), level: Level::Warning },
        CodeRule { family: "brake_critical", matcher: Exact(&BRAKE_CRITICAL), level: Level::Error },
        CodeRule { family: "abs", matcher: filed(&ABS, "C0"), level: Level::Warning },
        CodeRule { family: "network_critical", matcher: Exact(&NETWORK_CRITICAL), level: Level::Error },
        CodeRule { family: "powertrain", matcher: Prefix(&["P0"]), level: cfg.unrecognized_powertrain },
        CodeRule {
            family: "manufacturer_powertrain",
            matcher: Prefix(&["P1", "P2", "P3"]),
            level: cfg.manufacturer_powertrain,
        },
        CodeRule { family: "body", matcher: Prefix(&["B0"]), level: cfg.body_default },
        CodeRule { family: "chassis", matcher: Prefix(&["C0"]), level: cfg.chassis_default },
        CodeRule { family: "network", matcher: Prefix(&["U0"]), level: cfg.network_default },
    ]
}

// Table order is significant: later matches overwrite earlier ones.
fn keyword_rules(cfg: &KeywordConfig) -> Result<Vec<KeywordRule>, CoreError> {
    let table = [
        (Level::Error, &cfg.error),
        (Level::Warning, &cfg.warning),
        (Level::Debug, &cfg.debug),
        (Level::Info, &cfg.info),
    ];
    let mut rules = Vec::with_capacity(table.len());
    for (level, keywords) in table {
        if let Some(rule) = KeywordRule::new(level, keywords.clone())? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

/// Classify with the built-in rule table.
pub fn classify(code: &str, message: &str) -> Level {
    DEFAULT_CLASSIFIER.classify(code, message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
