//! Cross-index commonality.
//!
//! For each ticker found in the selected indices, count how many of them
//! contain it and derive summary statistics over the whole selection.

use crate::IndexId;
use serde_derive::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// share of the selected indices a ticker must appear in, as a percentage
pub const HIGH_OVERLAP_PERCENT: usize = 70;

/// A selected index as known to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexLabel {
    pub id: IndexId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCommonality {
    pub stock: String,
    pub appears_in: usize,
    pub indices: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_unique_stocks: usize,
    /// mean of appears_in, rounded to 2 decimal places
    pub avg_overlap: f64,
    pub high_overlap_stocks: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_of: Vec<String>,
    pub commonality: Vec<StockCommonality>,
    pub summary: AnalysisSummary,
}

/// Compute commonality over the given selection.
///
/// `selection` is the ordered list of indices to analyze; a repeated id only
/// counts once, at its first position. Memberships of indices outside the
/// selection are ignored, as are duplicated pairs.
///
/// Rows are sorted by appears_in descending, then by ticker ascending.
pub fn analyze<'a, I>(selection: &[IndexLabel], memberships: I) -> AnalysisResult
where
    I: IntoIterator<Item = (IndexId, &'a str)>,
{
    let mut positions: HashMap<IndexId, usize> = HashMap::new();
    let mut labels: Vec<&IndexLabel> = Vec::new();
    for label in selection {
        if !positions.contains_key(&label.id) {
            positions.insert(label.id, labels.len());
            labels.push(label);
        }
    }
    if labels.is_empty() {
        return AnalysisResult::default();
    }

    // ticker -> positions of the selected indices containing it
    let mut hits: BTreeMap<&str, BTreeSet<usize>> = BTreeMap::new();
    for (index_id, ticker) in memberships {
        if let Some(&pos) = positions.get(&index_id) {
            hits.entry(ticker).or_default().insert(pos);
        }
    }

    let mut commonality: Vec<StockCommonality> = hits
        .into_iter()
        .map(|(ticker, found)| StockCommonality {
            stock: ticker.to_owned(),
            appears_in: found.len(),
            indices: found
                .into_iter()
                .map(|pos| labels[pos].display_name.clone())
                .collect(),
        })
        .collect();
    // hits is keyed by ticker so the stable sort keeps tickers ascending on ties
    commonality.sort_by(|a, b| b.appears_in.cmp(&a.appears_in));

    let summary = summarize(&commonality, labels.len());
    AnalysisResult {
        analysis_of: labels.iter().map(|l| l.display_name.clone()).collect(),
        commonality,
        summary,
    }
}

fn summarize(commonality: &[StockCommonality], selected: usize) -> AnalysisSummary {
    let total_unique_stocks = commonality.len();
    if total_unique_stocks == 0 || selected == 0 {
        return AnalysisSummary::default();
    }
    let appearances: usize = commonality.iter().map(|c| c.appears_in).sum();
    let high_overlap_stocks = commonality
        .iter()
        .filter(|c| is_high_overlap(c.appears_in, selected))
        .count();
    AnalysisSummary {
        total_unique_stocks,
        avg_overlap: round2(appearances as f64 / total_unique_stocks as f64),
        high_overlap_stocks,
    }
}

/// appears_in / selected >= 70%, in integer arithmetic
pub fn is_high_overlap(appears_in: usize, selected: usize) -> bool {
    appears_in * 100 >= HIGH_OVERLAP_PERCENT * selected
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: IndexId, name: &str) -> IndexLabel {
        IndexLabel {
            id,
            display_name: name.to_owned(),
        }
    }

    #[test]
    fn test_analyze_empty_selection() {
        let r = analyze(&[], vec![(1, "X")]);
        assert_eq!(AnalysisResult::default(), r);
        assert_eq!(0.0, r.summary.avg_overlap);
    }

    #[test]
    fn test_analyze_single_index() {
        let r = analyze(&[label(1, "A")], vec![(1, "Y"), (1, "X"), (2, "Z")]);
        assert_eq!(vec!["A"], r.analysis_of);
        assert_eq!(2, r.commonality.len());
        assert!(r.commonality.iter().all(|c| c.appears_in == 1));
        assert_eq!("X", r.commonality[0].stock);
        assert_eq!(2, r.summary.total_unique_stocks);
        assert_eq!(2, r.summary.high_overlap_stocks);
        assert_eq!(1.0, r.summary.avg_overlap);
    }

    #[test]
    fn test_analyze_ties_and_order() {
        let selection = vec![label(2, "B"), label(1, "A")];
        let r = analyze(
            &selection,
            vec![(1, "MM"), (2, "MM"), (1, "AA"), (2, "ZZ"), (1, "BB")],
        );
        let stocks: Vec<&str> = r.commonality.iter().map(|c| c.stock.as_str()).collect();
        assert_eq!(vec!["MM", "AA", "BB", "ZZ"], stocks);
        // index names follow selection order
        assert_eq!(vec!["B", "A"], r.commonality[0].indices);
        assert_eq!(vec!["B", "A"], r.analysis_of);
    }

    #[test]
    fn test_analyze_duplicates_collapse() {
        let selection = vec![label(1, "A"), label(1, "A"), label(2, "B")];
        let r = analyze(&selection, vec![(1, "X"), (1, "X"), (2, "X")]);
        assert_eq!(vec!["A", "B"], r.analysis_of);
        assert_eq!(2, r.commonality[0].appears_in);
        assert_eq!(1, r.summary.high_overlap_stocks);
    }

    #[test]
    fn test_high_overlap_threshold() {
        assert!(is_high_overlap(7, 10));
        assert!(!is_high_overlap(6, 10));
        assert!(!is_high_overlap(2, 3));
        assert!(is_high_overlap(3, 3));
        assert!(is_high_overlap(1, 1));
    }

    #[test]
    fn test_round2() {
        assert_eq!(1.67, round2(5.0 / 3.0));
        assert_eq!(2.0, round2(2.0));
        assert_eq!(1.33, round2(4.0 / 3.0));
    }
}
