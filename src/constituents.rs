//! Parsing of uploaded index constituent files.

use crate::commonality::round2;
use crate::{ticker, Error, Result};
use std::collections::HashSet;

// header cells naming the ticker column
const TICKER_HEADERS: &[&str] = &["symbol", "ticker", "tradingsymbol"];

/// An uploaded constituent file, validated and normalised, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstituentUpload {
    pub file_name: String,
    pub index_name: String,
    pub display_name: String,
    /// distinct normalised tickers in first-seen order
    pub tickers: Vec<String>,
    pub file_size_kb: f64,
}

/// Validate and parse one uploaded constituent file.
pub fn parse_constituents(file_name: &str, contents: &[u8]) -> Result<ConstituentUpload> {
    if !is_csv_file(file_name) {
        return Err(Error::InvalidFileType(file_name.to_owned()));
    }
    let index_name = ticker::derive_index_name(file_name)
        .ok_or_else(|| Error::InvalidName(file_name.to_owned()))?;
    let tickers = read_tickers(contents)?;
    if tickers.is_empty() {
        return Err(Error::EmptyFile);
    }
    Ok(ConstituentUpload {
        file_name: file_name.to_owned(),
        display_name: ticker::display_name(&index_name),
        index_name,
        tickers,
        file_size_kb: round2(contents.len() as f64 / 1024.0),
    })
}

pub fn is_csv_file(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".csv")
}

/// Read distinct normalised tickers from csv content.
///
/// When the first row names a ticker column the header is skipped and that
/// column is used, otherwise the first column of every row.
pub fn read_tickers(contents: &[u8]) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents);
    let mut column = 0;
    let mut seen = HashSet::new();
    let mut tickers = Vec::new();
    for (i, r) in reader.records().enumerate() {
        let record = r?;
        if i == 0 {
            if let Some(pos) = record.iter().position(is_ticker_header) {
                log::debug!("header row found, tickers in column {}", pos);
                column = pos;
                continue;
            }
        }
        let cell = match record.get(column) {
            Some(cell) => cell.trim_start_matches('\u{feff}'),
            None => continue,
        };
        if let Some(t) = ticker::normalize(cell) {
            if seen.insert(t.clone()) {
                tickers.push(t);
            }
        }
    }
    Ok(tickers)
}

fn is_ticker_header(cell: &str) -> bool {
    let cell = cell.trim_start_matches('\u{feff}').trim().to_lowercase();
    TICKER_HEADERS.contains(&cell.as_str())
}
