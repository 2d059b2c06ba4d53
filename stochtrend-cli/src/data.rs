//! CSV bar files.
//!
//! Expected header: `timestamp,open,high,low,close,volume`. `timestamp` is
//! the instant the bar closed, either RFC 3339 or `YYYY-MM-DD HH:MM:SS` read
//! as UTC. Rows must already be sorted; ordering and sanity are enforced by
//! the engine, not here.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use stochtrend_core::domain::Bar;

const NAIVE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Deserialize)]
struct BarRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarRow {
    fn into_bar(self) -> Result<Bar> {
        let ts = parse_timestamp(&self.timestamp)?;
        Ok(Bar::new(ts, self.open, self.high, self.low, self.close, self.volume))
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, NAIVE_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| anyhow!("unrecognised timestamp {raw:?}"))
}

pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open bar file {}", path.display()))?;
    read_bars(file).with_context(|| format!("failed to parse bar file {}", path.display()))
}

pub fn read_bars(reader: impl Read) -> Result<Vec<Bar>> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();
    for (row, record) in rdr.deserialize::<BarRow>().enumerate() {
        // +2: header line and 1-based numbering
        let bar = record
            .map_err(anyhow::Error::from)
            .and_then(BarRow::into_bar)
            .with_context(|| format!("line {}", row + 2))?;
        bars.push(bar);
    }
    Ok(bars)
}
