use super::mappings::upsert_mapping;
use super::upload::{read_form, UploadConfig};
use crate::helpers::respond_json;
use crate::schema::{indices, name_mappings};
use crate::{DbPool, Error, Result};
use actix_multipart::Multipart;
use actix_web::post;
use actix_web::web::{self, Json};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::SqliteConnection;
use overlap::ticker::{alert_index_name, mapping_key};
use overlap::{parse_alerts, AlertSummary, FlagType};
use serde_derive::*;
use std::collections::{BTreeSet, HashMap};

/// An alert with its source name resolved against the tracked indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub ticker: String,
    pub flag_type: FlagType,
    pub source_name: String,
    pub mapped_index_id: Option<i32>,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReport {
    pub records: Vec<AlertRecord>,
    pub summary: AlertSummary,
    /// source names nothing maps to yet, for the user to resolve
    pub unmapped_names: Vec<String>,
}

#[post("/alerts/upload")]
pub async fn api_upload_alerts(
    pool: web::Data<DbPool>,
    cfg: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<Json<AlertReport>> {
    let form = read_form(payload, &cfg).await?;
    let file = form
        .files
        .into_iter()
        .next()
        .ok_or_else(|| Error::bad_request("missing alert file"))?;
    if let Some(error) = &file.error {
        return Err(Error::bad_request(error.clone()));
    }
    let rs = web::block(move || process_alerts(&pool, &file.filename, &file.contents)).await??;
    respond_json(rs)
}

/// Parse an alert export and resolve every alert to an index where possible.
/// Alerts themselves are not stored.
pub fn process_alerts(pool: &DbPool, file_name: &str, contents: &[u8]) -> Result<AlertReport> {
    let rows = parse_alerts(file_name, contents)?;
    let mut conn = pool.get()?;
    let resolved = resolve_source_names(&mut conn, rows.iter().map(|r| r.source_name.as_str()))?;

    let mut unmapped = BTreeSet::new();
    let records: Vec<AlertRecord> = rows
        .into_iter()
        .map(|r| {
            let mapped_index_id = resolved.get(&r.source_name).copied();
            if mapped_index_id.is_none() && !r.source_name.is_empty() {
                unmapped.insert(r.source_name.clone());
            }
            AlertRecord {
                ticker: r.ticker,
                flag_type: r.flag_type,
                source_name: r.source_name,
                mapped_index_id,
                date: r.date,
            }
        })
        .collect();
    let summary = AlertSummary::of(records.iter().map(|r| &r.flag_type));
    Ok(AlertReport {
        records,
        summary,
        unmapped_names: unmapped.into_iter().collect(),
    })
}

/// Map source names to index ids.
///
/// A saved mapping wins; otherwise a name whose index part equals a stored
/// index name gets an inferred mapping saved for it. Names that resolve to
/// nothing are absent from the result.
fn resolve_source_names<'a, I>(
    conn: &mut SqliteConnection,
    names: I,
) -> Result<HashMap<String, i32>>
where
    I: IntoIterator<Item = &'a str>,
{
    let saved: HashMap<String, i32> = name_mappings::table
        .select((name_mappings::source_name, name_mappings::index_id))
        .load::<(String, i32)>(conn)?
        .into_iter()
        .collect();
    let index_ids: HashMap<String, i32> = indices::table
        .select((indices::name, indices::id))
        .load::<(String, i32)>(conn)?
        .into_iter()
        .collect();

    let mut resolved = HashMap::new();
    for name in names {
        if name.is_empty() || resolved.contains_key(name) {
            continue;
        }
        let key = mapping_key(name);
        if let Some(id) = saved.get(&key) {
            resolved.insert(name.to_owned(), *id);
            continue;
        }
        let inferred = alert_index_name(name).and_then(|n| index_ids.get(&n).copied());
        if let Some(id) = inferred {
            upsert_mapping(conn, &key, id, true)?;
            log::info!("inferred mapping {:?} -> index {}", key, id);
            resolved.insert(name.to_owned(), id);
        }
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::setup_db;
    use crate::handlers::indices::{ingest_files, list_indices};
    use crate::handlers::mappings::{list_mappings, save_mapping};
    use crate::handlers::upload::UploadedFile;
    use overlap::Category;

    const EXPORT: &str = "Alert ID,Ticker,Name,Description,Time\n\
        1,NSE:HDFCBANK,Nifty Bank 52W High,Crossing 52 week high,2024-03-01 09:30:00\n\
        2,NSE:SBIN,Nifty Bank 52W Low,New low,2024-03-01 10:00:00\n\
        3,NSE:TCS,My IT picks,Crossing up,2024-03-02 10:00:00\n\
        4,NSE:INFY,Momentum screen,Fresh high,2024-03-02 11:00:00\n";

    fn setup_indices(pool: &DbPool) -> (i32, i32) {
        let files = vec![
            UploadedFile::new("nifty_bank.csv", b"HDFCBANK\nSBIN\n".to_vec()),
            UploadedFile::new("nifty_it.csv", b"TCS\nINFY\n".to_vec()),
        ];
        ingest_files(pool, Category::Sectoral, files).unwrap();
        let all = list_indices(pool).unwrap();
        let id = |name: &str| all.iter().find(|i| i.name == name).unwrap().id;
        (id("NIFTY_BANK"), id("NIFTY_IT"))
    }

    #[test]
    fn test_process_alerts() -> Result<()> {
        let db = setup_db();
        let (bank, it) = setup_indices(&db.pool);
        save_mapping(&db.pool, "my it picks", it)?;

        let report = process_alerts(&db.pool, "alerts.csv", EXPORT.as_bytes())?;
        assert_eq!(
            AlertSummary {
                total_alerts: 4,
                highs: 2,
                lows: 1
            },
            report.summary
        );
        let mapped: Vec<Option<i32>> = report.records.iter().map(|r| r.mapped_index_id).collect();
        assert_eq!(vec![Some(bank), Some(bank), Some(it), None], mapped);
        assert_eq!(vec!["Momentum screen"], report.unmapped_names);

        // both bank alert names were inferred and saved
        let mappings = list_mappings(&db.pool)?;
        assert_eq!(3, mappings.len());
        assert_eq!(2, mappings.iter().filter(|m| m.inferred).count());
        Ok(())
    }

    #[test]
    fn test_process_alerts_rejects_bad_files() {
        let db = setup_db();
        let err = process_alerts(&db.pool, "alerts.csv", b"Name\nfoo\n").unwrap_err();
        assert_eq!(crate::ErrorKind::BadRequest, err.kind());
        let err = process_alerts(&db.pool, "alerts.csv", b"Ticker,Name\n").unwrap_err();
        assert_eq!(crate::ErrorKind::BadRequest, err.kind());
    }
}
