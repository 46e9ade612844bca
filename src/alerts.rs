//! Parsing of TradingView alert-log exports.

use crate::constituents::is_csv_file;
use crate::{ticker, Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_derive::*;

const TICKER_COLUMNS: &[&str] = &["ticker", "symbol"];
const NAME_COLUMNS: &[&str] = &["name", "alert name", "alert"];
const DESCRIPTION_COLUMNS: &[&str] = &["description", "message"];
const TIME_COLUMNS: &[&str] = &["time", "date", "trigger time"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagType {
    High,
    Low,
    Unknown,
}

impl FlagType {
    /// classify by the words an alert carries, "below" or "highlight"
    /// do not count
    pub fn detect(text: &str) -> FlagType {
        let mut high = false;
        let mut low = false;
        for word in text.split(|c: char| !c.is_ascii_alphanumeric()) {
            match word.to_ascii_lowercase().as_str() {
                "high" | "highs" => high = true,
                "low" | "lows" => low = true,
                _ => (),
            }
        }
        match (high, low) {
            (true, false) => FlagType::High,
            (false, true) => FlagType::Low,
            _ => FlagType::Unknown,
        }
    }
}

/// One alert as read from the file, before name resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRow {
    pub ticker: String,
    pub source_name: String,
    pub flag_type: FlagType,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: usize,
    pub highs: usize,
    pub lows: usize,
}

impl AlertSummary {
    pub fn of<'a, I>(flags: I) -> Self
    where
        I: IntoIterator<Item = &'a FlagType>,
    {
        let mut s = AlertSummary::default();
        for f in flags {
            s.total_alerts += 1;
            match f {
                FlagType::High => s.highs += 1,
                FlagType::Low => s.lows += 1,
                FlagType::Unknown => (),
            }
        }
        s
    }
}

// positions of the recognised columns in the header
struct Columns {
    ticker: usize,
    name: Option<usize>,
    description: Option<usize>,
    time: Option<usize>,
}

impl Columns {
    fn locate(header: &csv::StringRecord) -> Result<Columns> {
        let find = |names: &[&str]| {
            header.iter().position(|h| {
                let h = h.trim_start_matches('\u{feff}').trim().to_lowercase();
                names.contains(&h.as_str())
            })
        };
        let ticker = find(TICKER_COLUMNS)
            .ok_or_else(|| Error::Malformed("missing ticker column".to_owned()))?;
        Ok(Columns {
            ticker,
            name: find(NAME_COLUMNS),
            description: find(DESCRIPTION_COLUMNS),
            time: find(TIME_COLUMNS),
        })
    }
}

/// Parse an uploaded alert export. The file must have a header row naming
/// at least the ticker column.
pub fn parse_alerts(file_name: &str, contents: &[u8]) -> Result<Vec<AlertRow>> {
    if !is_csv_file(file_name) {
        return Err(Error::InvalidFileType(file_name.to_owned()));
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(contents);
    let cols = Columns::locate(reader.headers()?)?;
    let mut rows = Vec::new();
    for r in reader.records() {
        let record = r?;
        let cell = |pos: Option<usize>| pos.and_then(|p| record.get(p)).unwrap_or("");
        let ticker = match ticker::normalize_exported(cell(Some(cols.ticker))) {
            Some(t) => t,
            None => continue,
        };
        let source_name = cell(cols.name).trim().to_owned();
        let description = cell(cols.description);
        rows.push(AlertRow {
            ticker,
            flag_type: FlagType::detect(&format!("{} {}", source_name, description)),
            source_name,
            date: parse_date(cell(cols.time)),
        });
    }
    if rows.is_empty() {
        return Err(Error::EmptyFile);
    }
    Ok(rows)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.date_naive());
    }
    for fmt in &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ts.date());
        }
    }
    for fmt in &["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y"] {
        if let Ok(dt) = NaiveDate::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    None
}
