use std::time::Duration;

use config::{Config, ConfigError, Environment};
use pokeduel_battle::DamageFormula;
use serde::Deserialize;

/// Server settings. Every field can be overridden with a `POKEDUEL_`
/// environment variable, e.g. `POKEDUEL_BIND_ADDRESS=0.0.0.0:9001`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_level: String,
    /// Active battles with no command for this long are dropped
    pub idle_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    /// Damage pace for new battles
    pub base_multiplier: f64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:9001".to_string(),
            log_level: "info".to_string(),
            idle_timeout_secs: 600,
            sweep_interval_secs: 30,
            base_multiplier: DamageFormula::default().base_multiplier,
        }
    }
}

impl ServerConfig {
    /// Load from the environment on top of the defaults
    pub fn load() -> Result<Self, ConfigError> {
        let source = Config::builder()
            .add_source(Environment::with_prefix("POKEDUEL").try_parsing(true))
            .build()?;
        Self::from_config(source)
    }

    pub fn from_config(source: Config) -> Result<Self, ConfigError> {
        source.try_deserialize()
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }

    /// Formula every battle created by this server starts with
    pub fn damage_formula(&self) -> DamageFormula {
        DamageFormula::default().with_base_multiplier(self.base_multiplier)
    }
}
