// @file: src/core/normalizer.rs
// @description: Sequential fetch-and-assemble pass producing the metadata table and per-symbol series.
// @author: LAS.

use std::sync::Arc;
use std::time::Duration;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use crate::core::interfaces::{CandleSource, Pacer, TokioPacer};
use crate::core::models::{
    Bar, Candle, CandleSeries, Dataset, DailyBars, Granularity, MetadataRow, MetadataTable,
    EXCHANGE_NAME,
};
use crate::error::{IngestError, Result};
use crate::utils::config::{AppConfig, MIN_REQUEST_DELAY_MS};
use crate::utils::time::{self, ClockZone};


//
// NORMALIZER STRUCT
//

pub struct RateNormalizer {
    source: Arc<dyn CandleSource>,
    pacer: Arc<dyn Pacer>,
    zone: ClockZone,
    delay: Duration,
}

impl RateNormalizer {
    //
    // INITIALIZATION
    //

    pub fn new(source: Arc<dyn CandleSource>, zone: ClockZone) -> Self {
        RateNormalizer {
            source,
            pacer: Arc::new(TokioPacer),
            zone,
            delay: Duration::from_millis(MIN_REQUEST_DELAY_MS),
        }
    }

    pub fn from_config(source: Arc<dyn CandleSource>, config: &AppConfig) -> Result<Self> {
        let zone: ClockZone = config.clock_zone()?;
        Ok(Self::new(source, zone).with_delay(config.request_delay()))
    }

    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    /// Delays below the 3 req/s ceiling are raised to the minimum.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        let floor: Duration = Duration::from_millis(MIN_REQUEST_DELAY_MS);
        if delay < floor {
            warn!("Request delay {:?} below GDAX limit, using {:?}", delay, floor);
        }
        self.delay = delay.max(floor);
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn zone(&self) -> ClockZone {
        self.zone
    }


    //
    // PUBLIC INTERFACE
    //

    pub async fn build_dataset<S: AsRef<str>>(
        &self,
        symbols: &[S],
        start: Option<&str>,
        end: Option<&str>,
        granularity_secs: u32,
    ) -> Result<Dataset> {
        // #1. Reject bad input before touching the network
        let granularity: Granularity = Granularity::try_from(granularity_secs)?;
        for bound in [start, end].into_iter().flatten() {
            time::validate_time_bound(bound)?;
        }

        // #2. Pre-size the table, one row per symbol
        let mut metadata: MetadataTable = MetadataTable::with_rows(symbols.len());
        let mut data: DailyBars = Vec::with_capacity(symbols.len());

        info!(
            "Building dataset for {} symbols at {} ({:?} -> {:?})",
            symbols.len(), granularity, start, end
        );

        // #3. Strictly sequential, paced after every request
        for (sid, symbol) in symbols.iter().enumerate() {
            let symbol: &str = symbol.as_ref();

            let series: CandleSeries = self.fetch_series(symbol, start, end, granularity).await?;
            let row: MetadataRow = derive_metadata(&series)?;

            debug!("{} start_date {}", symbol, row.start_date);
            debug!("{} end_date {}", symbol, row.end_date);
            debug!("{} auto_close_date {}", symbol, row.auto_close_date);

            info!("[{}] {}: {} bars", sid, symbol, series.len());

            data.push((sid, series));
            metadata.assign(sid, row)?;

            self.pacer.pause(self.delay).await;
        }

        // #4. Every asset resolves to the GDAX calendar
        metadata.set_exchange(EXCHANGE_NAME);

        Ok(Dataset { metadata, data })
    }

    /// Single request for one product, converted into a series.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        start: Option<&str>,
        end: Option<&str>,
        granularity: Granularity,
    ) -> Result<CandleSeries> {
        let candles: Vec<Candle> = self
            .source
            .fetch_historic_rates(symbol, start, end, granularity)
            .await
            .map_err(|e| match e {
                IngestError::FetchFailure { .. } => e,
                other => IngestError::fetch(symbol, other.to_string()),
            })?;

        if candles.is_empty() {
            return Err(IngestError::fetch(symbol, "source returned no candles"));
        }

        normalize_candles(symbol, candles, &self.zone)
    }
}


//
// TRANSFORM HELPERS
//

/// Orders candles by time and converts their timestamps into the series index.
pub fn normalize_candles(symbol: &str, mut candles: Vec<Candle>, zone: &ClockZone) -> Result<CandleSeries> {
    if candles.is_empty() {
        return Err(IngestError::fetch(symbol, "source returned no candles"));
    }

    // GDAX hands candles back newest first
    if !candles.windows(2).all(|w| w[0].time <= w[1].time) {
        if !candles.windows(2).all(|w| w[0].time >= w[1].time) {
            warn!("{}: candles arrived unordered, sorting by time", symbol);
        }
        candles.sort_by_key(|c| c.time);
    }

    let mut bars: Vec<Bar> = Vec::with_capacity(candles.len());
    for candle in candles {
        let time: NaiveDateTime = time::epoch_to_wall_clock(candle.time, zone)?;
        bars.push(Bar {
            time,
            low: candle.low,
            high: candle.high,
            open: candle.open,
            close: candle.close,
            volume: candle.volume,
        });
    }

    Ok(CandleSeries {
        symbol: symbol.to_string(),
        bars,
    })
}

pub fn derive_metadata(series: &CandleSeries) -> Result<MetadataRow> {
    let (start_date, end_date) = match (series.first_time(), series.last_time()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(IngestError::fetch(&series.symbol, "series has no bars")),
    };

    // Same wall-clock time on the following date
    let auto_close_date: NaiveDateTime = time::next_calendar_day(end_date)?;

    Ok(MetadataRow {
        start_date,
        end_date,
        auto_close_date,
        symbol: series.symbol.clone(),
    })
}
