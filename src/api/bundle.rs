// @file: src/api/bundle.rs
// @description: Bundle registration glue forwarding the normalized dataset to a daily-bar writer.
// @author: LAS.

use log::info;
use crate::core::models::{DailyBars, Granularity, SymbolMetadata};
use crate::core::normalizer::RateNormalizer;
use crate::error::Result;


//
// CONSTANTS
//

pub const BUNDLE_NAME: &str = "gdax";


//
// WRITER INTERFACE
//

/// Downstream store. Owns the persistence format.
pub trait BundleWriter {
    fn write_asset_metadata(&mut self, records: &[SymbolMetadata]) -> Result<()>;

    fn write_daily_bars(&mut self, bars: &DailyBars) -> Result<()>;
}


//
// BUNDLE DEFINITION
//

#[derive(Debug, Clone)]
pub struct GdaxBundle {
    symbols: Vec<String>,
    start: Option<String>,
    end: Option<String>,
    granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestSummary {
    pub assets: usize,
    pub bars: usize,
}

impl GdaxBundle {
    pub fn new<S: Into<String>>(symbols: impl IntoIterator<Item = S>) -> Self {
        GdaxBundle {
            symbols: symbols.into_iter().map(Into::into).collect(),
            start: None,
            end: None,
            granularity: Granularity::OneDay,
        }
    }

    /// Fixed bounds that take precedence over the session window passed to `ingest`.
    pub fn with_window(mut self, start: Option<String>, end: Option<String>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Bar size requested from the source. Daily unless overridden.
    pub fn with_granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub async fn ingest<W: BundleWriter + ?Sized>(
        &self,
        normalizer: &RateNormalizer,
        session_start: Option<&str>,
        session_end: Option<&str>,
        writer: &mut W,
    ) -> Result<IngestSummary> {
        // #1. Resolve window
        let start: Option<&str> = self.start.as_deref().or(session_start);
        let end: Option<&str> = self.end.as_deref().or(session_end);

        info!(
            "Ingesting bundle '{}' for {} assets at {}",
            BUNDLE_NAME,
            self.symbols.len(),
            self.granularity
        );

        // #2. Fetch and normalize
        let (metadata, data) = normalizer
            .build_dataset(self.symbols.as_slice(), start, end, self.granularity.seconds())
            .await?
            .into_parts();

        // #3. Hand off to the store
        let records: Vec<SymbolMetadata> = metadata.records()?;
        writer.write_asset_metadata(&records)?;
        writer.write_daily_bars(&data)?;

        let summary = IngestSummary {
            assets: records.len(),
            bars: data.iter().map(|(_, series)| series.len()).sum(),
        };

        info!("Bundle '{}' written: {} assets, {} bars", BUNDLE_NAME, summary.assets, summary.bars);
        Ok(summary)
    }
}
