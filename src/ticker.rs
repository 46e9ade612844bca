//! Ticker and index-name normalisation.

/// trim and uppercase a ticker, returning None when nothing is left
pub fn normalize(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        return None;
    }
    Some(t.to_uppercase())
}

/// normalize a ticker cell as exported by TradingView
///
/// the cell may carry an exchange prefix and a trailing
/// interval, e.g. "NSE:HDFCBANK, 1D"
pub fn normalize_exported(raw: &str) -> Option<String> {
    let head = raw
        .trim()
        .split(|c: char| c == ',' || c.is_whitespace())
        .next()
        .unwrap_or("");
    let symbol = match head.rfind(':') {
        Some(pos) => &head[pos + 1..],
        None => head,
    };
    normalize(symbol)
}

/// Derive the stored index name from an uploaded filename.
///
/// The final extension is removed, letters are uppercased and every run of
/// characters that are not ASCII alphanumeric becomes a single `_`.
/// Leading and trailing separators are dropped.
///
/// "nifty bank.csv" and "Nifty-Bank.CSV" both become "NIFTY_BANK".
pub fn derive_index_name(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(file_name);
    let stem = match base.rfind('.') {
        Some(pos) => &base[..pos],
        None => base,
    };
    let name = join_tokens(&tokens(stem));
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

pub fn display_name(index_name: &str) -> String {
    index_name.replace('_', " ")
}

/// Alphanumeric-only key used to detect near-duplicate index names,
/// e.g. "NIFTYBANK" and "NIFTY_BANK" share the key "NIFTYBANK".
pub fn index_key(index_name: &str) -> String {
    index_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

// words an alert name commonly carries after the index it refers to
const ALERT_SUFFIXES: &[&str] = &[
    "HIGH", "LOW", "52W", "52WK", "52WEEK", "52", "WEEK", "NEW", "ALERT", "ALERTS",
];

/// Guess the index name an alert refers to from its source name.
///
/// "Nifty Bank 52W High" -> "NIFTY_BANK"
pub fn alert_index_name(source_name: &str) -> Option<String> {
    let mut toks = tokens(source_name);
    while let Some(last) = toks.last() {
        if ALERT_SUFFIXES.contains(&last.as_str()) {
            toks.pop();
        } else {
            break;
        }
    }
    let name = join_tokens(&toks);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Normalise a name-mapping source string: trimmed, inner whitespace
/// collapsed, uppercased.
pub fn mapping_key(source_name: &str) -> String {
    source_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn tokens(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_uppercase())
        .collect()
}

fn join_tokens(toks: &[String]) -> String {
    toks.join("_")
}
