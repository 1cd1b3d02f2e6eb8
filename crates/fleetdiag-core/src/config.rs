//! Configuration types for fleetdiag.
//!
//! [`Config::load`] layers, in order: the embedded defaults, an optional TOML
//! file (explicit path, else `./fleetdiag.toml` if present), and
//! `FLEETDIAG__<SECTION>__<KEY>` environment variables. [`Config::defaults`]
//! returns the embedded defaults without touching the filesystem (useful in
//! tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::types::Level;

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
bind             = "127.0.0.1:3000"
api_prefix       = "/api"
max_upload_bytes = 10485760

[store]
data_file = "data/diagnostic-logs.json"

[ingest]
timestamp_policy = "fallback_to_now"

[classifier]
unrecognized_powertrain = "WARNING"
manufacturer_powertrain = "WARNING"
body_default            = "WARNING"
chassis_default         = "WARNING"
network_default         = "WARNING"
fallback                = "INFO"
extended_families       = false

[classifier.keywords]
error   = ["fault", "failure", "critical"]
warning = ["warning", "below threshold"]
debug   = ["debug", "test"]
info    = ["info", "status", "normal", "ok"]
"#;

const LOCAL_CONFIG_FILE: &str = "fleetdiag.toml";
const ENV_PREFIX: &str = "FLEETDIAG";

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Mount point for the REST routes; `/logs` is appended.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String { "127.0.0.1:3000".to_string() }
fn default_api_prefix() -> String { "/api".to_string() }
fn default_max_upload_bytes() -> usize { 10 * 1024 * 1024 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            api_prefix: default_api_prefix(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

fn default_data_file() -> PathBuf { PathBuf::from("data/diagnostic-logs.json") }

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_file: default_data_file() }
    }
}

/// What the line parser does with a timestamp it cannot read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    /// Substitute the current time and keep the line.
    #[default]
    FallbackToNow,
    /// Treat the whole line as unparsable.
    Reject,
}

/// `[ingest]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngestConfig {
    #[serde(default)]
    pub timestamp_policy: TimestampPolicy,
}

/// `[classifier]` section: levels for the prefix families and the keyword
/// lists for the message pass.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// `P0` codes outside the curated families.
    #[serde(default = "default_warning")]
    pub unrecognized_powertrain: Level,
    /// `P1`, `P2`, `P3` codes.
    #[serde(default = "default_warning")]
    pub manufacturer_powertrain: Level,
    #[serde(default = "default_warning")]
    pub body_default: Level,
    #[serde(default = "default_warning")]
    pub chassis_default: Level,
    #[serde(default = "default_warning")]
    pub network_default: Level,
    /// Used when neither the code nor the message gives a signal.
    #[serde(default = "default_fallback")]
    pub fallback: Level,
    /// Match the airbag, seatbelt and ABS sets outside the `B0`/`C0` groups.
    #[serde(default)]
    pub extended_families: bool,
    #[serde(default)]
    pub keywords: KeywordConfig,
}

fn default_warning() -> Level { Level::Warning }
fn default_fallback() -> Level { Level::Info }

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unrecognized_powertrain: default_warning(),
            manufacturer_powertrain: default_warning(),
            body_default: default_warning(),
            chassis_default: default_warning(),
            network_default: default_warning(),
            fallback: default_fallback(),
            extended_families: false,
            keywords: KeywordConfig::default(),
        }
    }
}

/// `[classifier.keywords]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_error_keywords")]
    pub error: Vec<String>,
    #[serde(default = "default_warning_keywords")]
    pub warning: Vec<String>,
    #[serde(default = "default_debug_keywords")]
    pub debug: Vec<String>,
    #[serde(default = "default_info_keywords")]
    pub info: Vec<String>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn default_error_keywords() -> Vec<String> { strings(&["fault", "failure", "critical"]) }
fn default_warning_keywords() -> Vec<String> { strings(&["warning", "below threshold"]) }
fn default_debug_keywords() -> Vec<String> { strings(&["debug", "test"]) }
fn default_info_keywords() -> Vec<String> { strings(&["info", "status", "normal", "ok"]) }

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            error: default_error_keywords(),
            warning: default_warning_keywords(),
            debug: default_debug_keywords(),
            info: default_info_keywords(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load the layered configuration. An explicit `path` must exist;
    /// `./fleetdiag.toml` is only used if present.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml));

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::from(Path::new(LOCAL_CONFIG_FILE)).required(false)),
        };

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        Self::from_toml("").expect("built-in default config must deserialize correctly")
    }

    /// Defaults overlaid with an inline TOML document.
    pub fn from_toml(overrides: &str) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from_str(overrides, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
