// @file: src/utils/config.rs
// @description: Layered configuration (defaults, optional config file, APP_ env overrides).
// @author: LAS.

use serde::Deserialize;
use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, File, Environment};
use std::time::Duration;
use crate::core::models::Granularity;
use crate::error::{IngestError, Result};
use crate::utils::time::ClockZone;


//
// CONSTANTS
//

/// GDAX allows 3 public requests per second; 350 ms keeps us under that.
pub const MIN_REQUEST_DELAY_MS: u64 = 350;


//
// TYPE DEFINITIONS
//

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,

    // Universe
    pub symbols: Vec<String>,
    pub quote_currency: String,

    // GDAX REST
    pub gdax_rest_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    pub request_delay_ms: u64,

    // Normalization
    pub granularity: u32,
    pub timezone: String,

    // Output
    pub output_dir: String,
}

impl AppConfig {
    //
    // PUBLIC INTERFACE
    //

    /// Defaults, then an optional `config` file, then `APP_*` variables.
    pub fn load() -> Result<Self> {
        let builder = Self::defaults()?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("symbols"),
            );

        Self::finish(builder)
    }

    /// Built-in defaults only; ignores the config file and the environment.
    pub fn from_defaults() -> Result<Self> {
        Self::finish(Self::defaults()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(IngestError::Config("symbols must not be empty".to_string()));
        }
        Granularity::try_from(self.granularity)?;
        self.clock_zone()?;
        Ok(())
    }

    /// Product ids as GDAX expects them, e.g. `BTC` -> `BTC-USD`.
    /// Entries that already carry a quote leg are left alone.
    pub fn product_ids(&self) -> Vec<String> {
        self.symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .map(|s| {
                if s.contains('-') {
                    s
                } else {
                    format!("{}-{}", s, self.quote_currency.to_uppercase())
                }
            })
            .collect()
    }

    pub fn clock_zone(&self) -> Result<ClockZone> {
        self.timezone.parse()
    }

    /// Never shorter than the exchange's rate ceiling allows.
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms.max(MIN_REQUEST_DELAY_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }


    //
    // BUILDER STAGES
    //

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = Config::builder()
            .set_default("log_level", "info")?
            .set_default("symbols", vec!["BTC", "BCH", "ETH", "LTC"])?
            .set_default("quote_currency", "USD")?

            // GDAX Endpoint
            .set_default("gdax_rest_url", "https://api.exchange.coinbase.com")?
            .set_default("user_agent", concat!("gdax_bundle/", env!("CARGO_PKG_VERSION")))?
            .set_default("request_timeout_secs", 30)?
            .set_default("request_delay_ms", 350)?

            // Normalization Defaults
            .set_default("granularity", 86400)?
            .set_default("timezone", "local")?

            .set_default("output_dir", "bundle")?;

        Ok(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}
