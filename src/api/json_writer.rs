// @file: src/api/json_writer.rs
// @description: Plain JSON dump of the bundle tables into an output directory.
// @author: LAS.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::debug;
use serde::Serialize;
use crate::api::bundle::BundleWriter;
use crate::core::models::{DailyBars, SymbolMetadata};
use crate::error::Result;

/// Writes `metadata.json` and `daily/<sid>.json` under `root`.
pub struct JsonBundleWriter {
    root: PathBuf,
}

impl JsonBundleWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonBundleWriter { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join("metadata.json")
    }

    pub fn daily_path(&self, sid: usize) -> PathBuf {
        self.root.join("daily").join(format!("{}.json", sid))
    }

    fn dump<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file: File = File::create(path)?;
        let mut out: BufWriter<File> = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, value)?;
        out.flush()?;
        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl BundleWriter for JsonBundleWriter {
    fn write_asset_metadata(&mut self, records: &[SymbolMetadata]) -> Result<()> {
        Self::dump(&self.metadata_path(), records)
    }

    fn write_daily_bars(&mut self, bars: &DailyBars) -> Result<()> {
        for (sid, series) in bars {
            Self::dump(&self.daily_path(*sid), series)?;
        }
        Ok(())
    }
}
