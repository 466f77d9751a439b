// @file: src/tests/bundle_suite.rs
// @description: Bundle ingest hand-off and the JSON dump writer.
// @author: LAS.

#[cfg(test)]
mod bundle_tests {
    use crate::api::bundle::{BundleWriter, GdaxBundle, IngestSummary};
    use crate::api::json_writer::JsonBundleWriter;
    use crate::core::models::{CandleSeries, DailyBars, Granularity, SymbolMetadata};
    use crate::core::normalizer::RateNormalizer;
    use crate::error::{IngestError, Result};
    use crate::tests::doubles::{daily_run, RecordingPacer, ScriptedSource, JAN_29};
    use crate::utils::time::ClockZone;
    use std::fs;
    use std::sync::Arc;

    //
    // IN-MEMORY WRITER
    //

    #[derive(Default)]
    struct MemoryWriter {
        metadata: Vec<SymbolMetadata>,
        bars: DailyBars,
    }

    impl BundleWriter for MemoryWriter {
        fn write_asset_metadata(&mut self, records: &[SymbolMetadata]) -> Result<()> {
            self.metadata = records.to_vec();
            Ok(())
        }

        fn write_daily_bars(&mut self, bars: &DailyBars) -> Result<()> {
            self.bars = bars.clone();
            Ok(())
        }
    }

    fn setup() -> (Arc<ScriptedSource>, RateNormalizer) {
        let source = Arc::new(
            ScriptedSource::new()
                .with("BTC-USD", daily_run(JAN_29, 3))
                .with("ETH-USD", daily_run(JAN_29, 2)),
        );
        let zone: ClockZone = "UTC".parse().unwrap();
        let normalizer = RateNormalizer::new(source.clone(), zone)
            .with_pacer(Arc::new(RecordingPacer::default()));
        (source, normalizer)
    }


    //
    // TESTS
    //

    #[tokio::test]
    async fn test_ingest_forwards_metadata_and_daily_bars() {
        let (source, normalizer) = setup();
        let bundle = GdaxBundle::new(["BTC-USD", "ETH-USD"]);
        let mut writer = MemoryWriter::default();

        let summary = bundle
            .ingest(&normalizer, Some("2023-01-29"), Some("2023-01-31"), &mut writer)
            .await
            .unwrap();

        assert_eq!(summary, IngestSummary { assets: 2, bars: 5 });
        assert_eq!(writer.metadata.len(), 2);
        assert!(writer.metadata.iter().all(|m| m.exchange == "GDAX"));
        assert_eq!(writer.bars.iter().map(|(sid, _)| *sid).collect::<Vec<_>>(), vec![0, 1]);

        // Session bounds used, daily by default
        let calls = source.call_log();
        assert!(calls.iter().all(|c| c.granularity == 86_400));
        assert_eq!(calls[0].start.as_deref(), Some("2023-01-29"));
        assert_eq!(calls[0].end.as_deref(), Some("2023-01-31"));
    }

    #[tokio::test]
    async fn test_own_window_overrides_session() {
        let (source, normalizer) = setup();
        let bundle = GdaxBundle::new(vec!["BTC-USD".to_string()])
            .with_window(Some("2023-01-01".to_string()), None);
        let mut writer = MemoryWriter::default();

        bundle
            .ingest(&normalizer, Some("2022-06-01"), Some("2023-01-31"), &mut writer)
            .await
            .unwrap();

        let calls = source.call_log();
        assert_eq!(calls[0].start.as_deref(), Some("2023-01-01"));
        assert_eq!(calls[0].end.as_deref(), Some("2023-01-31"));
    }

    #[tokio::test]
    async fn test_configured_granularity_reaches_source() {
        let (source, normalizer) = setup();
        let bundle = GdaxBundle::new(["BTC-USD", "ETH-USD"]).with_granularity(Granularity::OneHour);
        let mut writer = MemoryWriter::default();

        bundle.ingest(&normalizer, None, None, &mut writer).await.unwrap();

        let calls = source.call_log();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|c| c.granularity == 3_600));
        assert_eq!(bundle.granularity(), Granularity::OneHour);
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let (_, normalizer) = setup();
        let bundle = GdaxBundle::new(["BTC-USD", "DOGE-USD"]);
        let mut writer = MemoryWriter::default();

        let err = bundle.ingest(&normalizer, None, None, &mut writer).await.unwrap_err();

        assert!(matches!(err, IngestError::FetchFailure { ref symbol, .. } if symbol == "DOGE-USD"));
        assert!(writer.metadata.is_empty());
        assert!(writer.bars.is_empty());
    }

    #[tokio::test]
    async fn test_json_writer_dumps_tables() {
        let (_, normalizer) = setup();
        let root = std::env::temp_dir().join(format!("gdax_bundle_test_{}", std::process::id()));
        let mut writer = JsonBundleWriter::new(&root);

        GdaxBundle::new(["BTC-USD", "ETH-USD"])
            .ingest(&normalizer, None, None, &mut writer)
            .await
            .unwrap();

        // #1. Metadata round-trips
        let raw = fs::read_to_string(writer.metadata_path()).unwrap();
        let metadata: Vec<SymbolMetadata> = serde_json::from_str(&raw).unwrap();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata[1].symbol, "ETH-USD");

        // #2. One file per sid
        let raw = fs::read_to_string(writer.daily_path(0)).unwrap();
        let series: CandleSeries = serde_json::from_str(&raw).unwrap();
        assert_eq!(series.symbol, "BTC-USD");
        assert_eq!(series.len(), 3);
        assert!(writer.daily_path(1).exists());

        fs::remove_dir_all(&root).unwrap();
    }
}
