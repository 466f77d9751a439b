// @file: src/core/models.rs
// @description: Candle, series and metadata structures handed to the bundle writer.
// @author: LAS.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use crate::error::{IngestError, Result};


//
// CONSTANTS
//

pub const EXCHANGE_NAME: &str = "GDAX";

/// Column order of every series (time is the index, not a column).
pub const SERIES_COLUMNS: [&str; 5] = ["low", "high", "open", "close", "volume"];


//
// GRANULARITY
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "u32", into = "u32")]
pub enum Granularity {
    OneMinute,
    FiveMinutes,
    FifteenMinutes,
    OneHour,
    SixHours,
    OneDay,
}

impl Granularity {
    pub const ALL: [Granularity; 6] = [
        Granularity::OneMinute,
        Granularity::FiveMinutes,
        Granularity::FifteenMinutes,
        Granularity::OneHour,
        Granularity::SixHours,
        Granularity::OneDay,
    ];

    pub fn seconds(self) -> u32 {
        match self {
            Granularity::OneMinute => 60,
            Granularity::FiveMinutes => 300,
            Granularity::FifteenMinutes => 900,
            Granularity::OneHour => 3600,
            Granularity::SixHours => 21600,
            Granularity::OneDay => 86400,
        }
    }
}

impl TryFrom<u32> for Granularity {
    type Error = IngestError;

    fn try_from(seconds: u32) -> Result<Self> {
        Granularity::ALL
            .iter()
            .copied()
            .find(|g| g.seconds() == seconds)
            .ok_or(IngestError::InvalidGranularity(seconds))
    }
}

impl From<Granularity> for u32 {
    fn from(g: Granularity) -> u32 {
        g.seconds()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}s", self.seconds())
    }
}


//
// RAW CANDLE (as returned by the source)
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub low: Decimal,
    pub high: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}


//
// NORMALIZED SERIES
//

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub time: NaiveDateTime,
    pub low: Decimal,
    pub high: Decimal,
    pub open: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Bar {
    /// Values in `SERIES_COLUMNS` order.
    pub fn values(&self) -> [Decimal; 5] {
        [self.low, self.high, self.open, self.close, self.volume]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl CandleSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn index(&self) -> Vec<NaiveDateTime> {
        self.bars.iter().map(|b| b.time).collect()
    }

    /// Column-major view, named and ordered as `SERIES_COLUMNS`.
    pub fn columns(&self) -> Vec<(&'static str, Vec<Decimal>)> {
        SERIES_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, name)| (*name, self.bars.iter().map(|b| b.values()[i]).collect()))
            .collect()
    }

    pub fn first_time(&self) -> Option<NaiveDateTime> {
        self.bars.first().map(|b| b.time)
    }

    pub fn last_time(&self) -> Option<NaiveDateTime> {
        self.bars.last().map(|b| b.time)
    }
}


//
// METADATA
//

/// Per-symbol row before the exchange column is stamped.
#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRow {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub auto_close_date: NaiveDateTime,
    pub symbol: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetadata {
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub auto_close_date: NaiveDateTime,
    pub symbol: String,
    pub exchange: String,
}

/// Fixed-capacity metadata table. Each slot is written once, by position.
#[derive(Debug, Clone)]
pub struct MetadataTable {
    slots: Vec<Option<MetadataRow>>,
    exchange: Option<String>,
}

impl MetadataTable {
    pub fn with_rows(row_count: usize) -> Self {
        MetadataTable {
            slots: vec![None; row_count],
            exchange: None,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn assign(&mut self, position: usize, row: MetadataRow) -> Result<()> {
        let capacity: usize = self.slots.len();
        let slot = self.slots.get_mut(position).ok_or_else(|| {
            IngestError::MetadataSlot(format!("row {} outside table of {} rows", position, capacity))
        })?;

        if slot.is_some() {
            return Err(IngestError::MetadataSlot(format!("row {} already assigned", position)));
        }

        *slot = Some(row);
        Ok(())
    }

    pub fn set_exchange(&mut self, exchange: &str) {
        self.exchange = Some(exchange.to_string());
    }

    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    pub fn get(&self, position: usize) -> Option<SymbolMetadata> {
        let row: &MetadataRow = self.slots.get(position)?.as_ref()?;
        let exchange: &str = self.exchange.as_deref()?;

        Some(SymbolMetadata {
            start_date: row.start_date,
            end_date: row.end_date,
            auto_close_date: row.auto_close_date,
            symbol: row.symbol.clone(),
            exchange: exchange.to_string(),
        })
    }

    /// All rows as complete records; fails if any slot or the exchange is unset.
    pub fn records(&self) -> Result<Vec<SymbolMetadata>> {
        (0..self.slots.len())
            .map(|i| {
                self.get(i).ok_or_else(|| {
                    IngestError::MetadataSlot(format!("row {} is incomplete", i))
                })
            })
            .collect()
    }
}


//
// DATASET
//

pub type DailyBars = Vec<(usize, CandleSeries)>;

#[derive(Debug, Clone)]
pub struct Dataset {
    pub metadata: MetadataTable,
    pub data: DailyBars,
}

impl Dataset {
    pub fn into_parts(self) -> (MetadataTable, DailyBars) {
        (self.metadata, self.data)
    }
}
