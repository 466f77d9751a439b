// @file: src/core/interfaces.rs
// @description: Capabilities the normalizer depends on: a candle source and a pacer.
// @author: LAS.

use async_trait::async_trait;
use std::time::Duration;
use crate::core::models::{Candle, Granularity};
use crate::error::Result;

//
// TRAIT DEFINITIONS
//

#[async_trait]
pub trait CandleSource: Send + Sync {
    // #1. One request per call; no pagination, no retry.
    // `start`/`end` are ISO-8601 strings passed through untouched.
    async fn fetch_historic_rates(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        granularity: Granularity,
    ) -> Result<Vec<Candle>>;
}

#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, delay: Duration);
}


//
// DEFAULT PACER
//

pub struct TokioPacer;

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}
