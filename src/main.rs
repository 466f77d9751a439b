// @file: src/main.rs
// @description: Direct invocation: pulls yesterday-to-now daily candles for the configured pairs and dumps the bundle.
// @author: LAS.

use std::process::ExitCode;
use std::sync::Arc;
use chrono::{Days, Local, NaiveDate};
use log::{debug, error, info};
use gdax_bundle::api::bundle::{BundleWriter, GdaxBundle};
use gdax_bundle::api::json_writer::JsonBundleWriter;
use gdax_bundle::connectors;
use gdax_bundle::core::interfaces::CandleSource;
use gdax_bundle::core::models::{DailyBars, Granularity, SymbolMetadata};
use gdax_bundle::utils::config::AppConfig;
use gdax_bundle::{RateNormalizer, Result};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. Environment & Config
    dotenv::dotenv().ok();

    let config: AppConfig = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // 2. Logger (RUST_LOG wins over config)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level)).init();

    info!(">>> GDAX bundle ingestion starting <<<");

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Ingestion aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &AppConfig) -> Result<()> {
    // 3. Window: start of yesterday until now, local time
    let yesterday: NaiveDate = Local::now()
        .date_naive()
        .checked_sub_days(Days::new(1))
        .unwrap_or_else(|| Local::now().date_naive());
    let start_iso: String = yesterday.format("%Y-%m-%d").to_string();
    let end_iso: String = Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S").to_string();

    let symbols: Vec<String> = config.product_ids();
    info!("Symbols {:?}, window {} -> {}", symbols, start_iso, end_iso);

    // 4. Wire components
    let source: Arc<dyn CandleSource> = connectors::source_from_config(config)?;
    let normalizer: RateNormalizer = RateNormalizer::from_config(source, config)?;

    let bundle: GdaxBundle = GdaxBundle::new(symbols)
        .with_window(Some(start_iso), Some(end_iso))
        .with_granularity(Granularity::try_from(config.granularity)?);
    let mut writer = InspectingWriter {
        inner: JsonBundleWriter::new(&config.output_dir),
    };

    // 5. Run
    let summary = bundle.ingest(&normalizer, None, None, &mut writer).await?;
    info!(
        "Done: {} assets, {} bars written to {}",
        summary.assets, summary.bars, writer.inner.root().display()
    );

    Ok(())
}

/// Logs what goes to disk at debug level.
struct InspectingWriter {
    inner: JsonBundleWriter,
}

impl BundleWriter for InspectingWriter {
    fn write_asset_metadata(&mut self, records: &[SymbolMetadata]) -> Result<()> {
        for record in records {
            debug!("metadata {:?}", record);
        }
        self.inner.write_asset_metadata(records)
    }

    fn write_daily_bars(&mut self, bars: &DailyBars) -> Result<()> {
        for (sid, series) in bars {
            debug!("sid {} {} index {:?}", sid, series.symbol, series.index());
            for (name, values) in series.columns() {
                debug!("sid {} {} {:?}", sid, name, values);
            }
        }
        self.inner.write_daily_bars(bars)
    }
}
