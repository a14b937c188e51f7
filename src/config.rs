use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{normalizer::DEFAULT_STOP_TERMS, scoring::DEFAULT_CACHE_SIZE, EngineConfig, EngineError};
use crate::models::MatchThresholds;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub matching: MatchingSettings,
    #[serde(default)]
    pub aggregation: AggregationSettings,
    #[serde(default)]
    pub normalizer: NormalizerSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSettings {
    #[serde(default = "default_confident_threshold")]
    pub confident_threshold: f64,
    #[serde(default = "default_ambiguity_margin")]
    pub ambiguity_margin: f64,
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    pub workers: Option<usize>,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            confident_threshold: default_confident_threshold(),
            ambiguity_margin: default_ambiguity_margin(),
            cache_size: default_cache_size(),
            parallel: default_parallel(),
            workers: None,
        }
    }
}

fn default_confident_threshold() -> f64 { 0.85 }
fn default_ambiguity_margin() -> f64 { 0.05 }
fn default_cache_size() -> usize { DEFAULT_CACHE_SIZE }
fn default_parallel() -> bool { EngineConfig::default().parallel }

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregationSettings {
    /// Keep `none` results in the output for diagnostics
    #[serde(default)]
    pub include_unmatched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerSettings {
    #[serde(default = "default_stop_terms")]
    pub stop_terms: Vec<String>,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            stop_terms: default_stop_terms(),
        }
    }
}

fn default_stop_terms() -> Vec<String> {
    DEFAULT_STOP_TERMS.iter().map(|t| t.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Hotels whose known country differs are dropped at load time
    #[serde(default = "default_country_filter")]
    pub country_filter: Option<String>,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            country_filter: default_country_filter(),
        }
    }
}

fn default_country_filter() -> Option<String> { Some("CH".to_string()) }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with VLINK_)
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., VLINK__MATCHING__CONFIDENT_THRESHOLD -> matching.confident_threshold
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(environment())
            .build()?
            .try_deserialize()
    }

    /// Reject thresholds outside their valid ranges before any matching
    pub fn validate(&self) -> Result<(), EngineError> {
        self.engine_config().validate()
    }

    /// Engine configuration derived from these settings
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            thresholds: MatchThresholds {
                confident_threshold: self.matching.confident_threshold,
                ambiguity_margin: self.matching.ambiguity_margin,
            },
            include_unmatched: self.aggregation.include_unmatched,
            stop_terms: self.normalizer.stop_terms.clone(),
            cache_size: self.matching.cache_size,
            parallel: self.matching.parallel,
            workers: self.matching.workers,
        }
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("VLINK")
        .prefix_separator("__")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("normalizer.stop_terms")
        .try_parsing(true)
}
