// @file: src/connectors/mod.rs
// @description: Factory for the candle source used by the normalizer.
// @author: LAS.

pub mod gdax_rest;

use std::sync::Arc;
use crate::core::interfaces::CandleSource;
use crate::error::Result;
use crate::utils::config::AppConfig;
use self::gdax_rest::GdaxRestClient;

//
// FACTORY FUNCTION
//

pub fn source_from_config(config: &AppConfig) -> Result<Arc<dyn CandleSource>> {
    let client: GdaxRestClient = GdaxRestClient::new(
        &config.gdax_rest_url,
        &config.user_agent,
        config.request_timeout(),
    )?;

    Ok(Arc::new(client))
}
