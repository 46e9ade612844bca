//! Core of the index overlap service.
//!
//! Everything here is pure: parsing of uploaded byte buffers, ticker and
//! index-name normalisation, and the cross-index commonality computation.
//! Storage and HTTP live in the `overlap-web` crate.

pub mod alerts;
pub mod category;
pub mod commonality;
pub mod constituents;
mod error;
pub mod ticker;

pub use alerts::{parse_alerts, AlertRow, AlertSummary, FlagType};
pub use category::Category;
pub use commonality::{analyze, AnalysisResult, AnalysisSummary, IndexLabel, StockCommonality};
pub use constituents::{parse_constituents, ConstituentUpload};
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Identifier of a stored index.
pub type IndexId = i32;
