// @file: src/connectors/gdax_rest.rs
// @description: HTTP client for fetching historic rates (candles) from the GDAX public API.
// @author: LAS.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use url::Url;
use crate::core::interfaces::CandleSource;
use crate::core::models::{Candle, Granularity};
use crate::error::{IngestError, Result};


//
// CONSTANTS
//

/// Largest number of buckets GDAX returns for a single request.
pub const MAX_CANDLES_PER_REQUEST: usize = 300;


//
// CLIENT
//

pub struct GdaxRestClient {
    client: Client,
    base_url: Url,
}

impl GdaxRestClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        // #1. Validate base URL up front
        let base_url: Url = Url::parse(base_url.trim().trim_end_matches('/'))
            .map_err(|e| IngestError::Config(format!("Invalid GDAX base url '{}': {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(IngestError::Config(format!("GDAX base url '{}' cannot be a base", base_url)));
        }

        // #2. GDAX rejects requests without a User-Agent
        let client: Client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(GdaxRestClient { client, base_url })
    }

    /// `{base}/products/{symbol}/candles?start=..&end=..&granularity=..`
    pub fn candles_url(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        granularity: Granularity,
    ) -> Result<Url> {
        let mut url: Url = self.base_url.clone();

        url.path_segments_mut()
            .map_err(|_| IngestError::Config(format!("GDAX base url '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["products", symbol, "candles"]);

        {
            let mut query = url.query_pairs_mut();
            if let Some(start) = start {
                query.append_pair("start", start);
            }
            if let Some(end) = end {
                query.append_pair("end", end);
            }
            query.append_pair("granularity", &granularity.seconds().to_string());
        }

        Ok(url)
    }
}

#[async_trait]
impl CandleSource for GdaxRestClient {
    async fn fetch_historic_rates(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        granularity: Granularity,
    ) -> Result<Vec<Candle>> {
        // #1. Construct URL
        let url: Url = self.candles_url(symbol, start, end, granularity)?;
        debug!("GET {}", url);

        // #2. Execute Request
        let response = self.client.get(url).send().await
            .map_err(|e| IngestError::fetch(symbol, format!("Request failed: {}", e)))?;

        let status = response.status();
        let body: String = response.text().await
            .map_err(|e| IngestError::fetch(symbol, format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            // Error bodies are `{"message": "..."}` when GDAX answers at all
            let message: String = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(IngestError::fetch(symbol, format!("API Error {}: {}", status, message)));
        }

        let json: Value = serde_json::from_str(&body)
            .map_err(|e| IngestError::fetch(symbol, format!("JSON Parse Error: {}", e)))?;

        // #3. Parse Response
        let candles: Vec<Candle> = parse_candle_array(symbol, json)?;

        if candles.len() >= MAX_CANDLES_PER_REQUEST {
            warn!(
                "{}: received {} candles, the request window was probably truncated",
                symbol, candles.len()
            );
        }

        Ok(candles)
    }
}


//
// INTERNAL HELPERS
//

/// GDAX returns an array of arrays:
/// `[ [time, low, high, open, close, volume], ... ]`
pub fn parse_candle_array(symbol: &str, json: Value) -> Result<Vec<Candle>> {
    if let Some(message) = json.get("message").and_then(Value::as_str) {
        return Err(IngestError::fetch(symbol, format!("API Error: {}", message)));
    }

    let raw_list = json.as_array()
        .ok_or_else(|| IngestError::fetch(symbol, "Invalid response format: Expected array"))?;

    let mut candles: Vec<Candle> = Vec::with_capacity(raw_list.len());

    // A dropped row would silently shift the derived date range
    for item in raw_list {
        let candle: Candle = parse_candle_row(item)
            .ok_or_else(|| IngestError::fetch(symbol, format!("malformed candle {}", item)))?;
        candles.push(candle);
    }

    Ok(candles)
}

fn parse_candle_row(item: &Value) -> Option<Candle> {
    let arr = item.as_array()?;
    if arr.len() < 6 {
        return None;
    }

    // Epoch may arrive as a float; whole seconds only
    let time: i64 = arr[0].as_i64().or_else(|| arr[0].as_f64().map(|f| f.trunc() as i64))?;

    Some(Candle {
        time,
        low: parse_decimal(&arr[1])?,
        high: parse_decimal(&arr[2])?,
        open: parse_decimal(&arr[3])?,
        close: parse_decimal(&arr[4])?,
        volume: parse_decimal(&arr[5])?,
    })
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text: String = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        _ => return None,
    };

    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
