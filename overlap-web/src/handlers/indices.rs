use super::upload::{read_form, UploadConfig, UploadedFile};
use crate::helpers::respond_json;
use crate::models::{Index, NewConstituent, NewIndex, Stock};
use crate::schema::{index_constituents, indices, name_mappings, stocks};
use crate::{DbPool, Error, Result};
use actix_multipart::Multipart;
use actix_web::web::{self, Json};
use actix_web::{delete, get, post, HttpResponse};
use diesel::prelude::*;
use diesel::SqliteConnection;
use overlap::{parse_constituents, ticker, Category, ConstituentUpload};
use serde_derive::*;

/// What happened to one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum FileOutcome {
    /// stored under an existing or newly created index
    Matched {
        filename: String,
        index_id: i32,
        index_name: String,
        created: bool,
        stocks_added: usize,
    },
    /// the derived name only differs by separators from existing indices,
    /// nothing was written
    AmbiguousNeedsMapping {
        filename: String,
        derived_name: String,
        candidates: Vec<String>,
    },
    Rejected {
        filename: String,
        error: String,
    },
}

impl FileOutcome {
    fn rejected(filename: &str, error: String) -> Self {
        FileOutcome::Rejected {
            filename: filename.to_owned(),
            error,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReport {
    pub detail: String,
    pub processed: Vec<FileOutcome>,
    pub needs_mapping: Vec<FileOutcome>,
    pub errors: Vec<FileOutcome>,
}

impl UploadReport {
    pub fn new(outcomes: Vec<FileOutcome>) -> Self {
        let total = outcomes.len();
        let mut report = UploadReport {
            detail: String::new(),
            processed: Vec::new(),
            needs_mapping: Vec::new(),
            errors: Vec::new(),
        };
        for o in outcomes {
            match o {
                FileOutcome::Matched { .. } => report.processed.push(o),
                FileOutcome::AmbiguousNeedsMapping { .. } => report.needs_mapping.push(o),
                FileOutcome::Rejected { .. } => report.errors.push(o),
            }
        }
        report.detail = format!("Processed {} of {} files.", report.processed.len(), total);
        report
    }

    /// no file was stored nor is waiting for a decision
    pub fn all_failed(&self) -> bool {
        self.processed.is_empty() && self.needs_mapping.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub detail: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConstituentsResponse {
    pub index: Index,
    pub tickers: Vec<String>,
}

#[get("/indices")]
pub async fn api_get_indices(pool: web::Data<DbPool>) -> Result<Json<Vec<Index>>> {
    let rs = web::block(move || list_indices(&pool)).await??;
    respond_json(rs)
}

#[post("/indices/upload")]
pub async fn api_upload_indices(
    pool: web::Data<DbPool>,
    cfg: web::Data<UploadConfig>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_form(payload, &cfg).await?;
    let category: Category = form
        .field("category")
        .ok_or_else(|| Error::bad_request("missing category"))?
        .parse()?;
    let target = form
        .field("target_index")
        .map(|s| s.trim().parse::<i32>())
        .transpose()
        .map_err(|_| Error::bad_request("target_index must be an index id"))?;
    if form.files.is_empty() {
        return Err(Error::bad_request("no files uploaded"));
    }
    let files = form.files;
    let report =
        web::block(move || ingest_files_into(&pool, category, files, target)).await??;
    if report.all_failed() {
        return Ok(HttpResponse::BadRequest().json(report));
    }
    Ok(HttpResponse::Ok().json(report))
}

#[get("/indices/{id}/constituents")]
pub async fn api_get_index_constituents(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<Json<ConstituentsResponse>> {
    let id = path.into_inner();
    let rs = web::block(move || list_constituents(&pool, id)).await??;
    respond_json(rs)
}

#[delete("/indices/{id}")]
pub async fn api_delete_index(
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> Result<Json<DeleteResponse>> {
    let id = path.into_inner();
    web::block(move || delete_index(&pool, id)).await??;
    respond_json(DeleteResponse {
        status: "success".into(),
        detail: "Index and constituents deleted".into(),
    })
}

/// all indices, most recently uploaded first
pub fn list_indices(pool: &DbPool) -> Result<Vec<Index>> {
    let mut conn = pool.get()?;
    let rs = indices::table
        .order((indices::upload_date.desc(), indices::id.desc()))
        .load::<Index>(&mut conn)?;
    Ok(rs)
}

pub fn list_constituents(pool: &DbPool, id: i32) -> Result<ConstituentsResponse> {
    let mut conn = pool.get()?;
    let index = find_index(&mut conn, id)?;
    let tickers = index_constituents::table
        .inner_join(stocks::table)
        .filter(index_constituents::index_id.eq(id))
        .select(stocks::ticker)
        .order(stocks::ticker.asc())
        .load::<String>(&mut conn)?;
    Ok(ConstituentsResponse { index, tickers })
}

pub fn delete_index(pool: &DbPool, id: i32) -> Result<()> {
    let mut conn = pool.get()?;
    conn.immediate_transaction::<_, Error, _>(|conn| {
        // dependents first, same as the schema cascade
        diesel::delete(index_constituents::table.filter(index_constituents::index_id.eq(id)))
            .execute(conn)?;
        diesel::delete(name_mappings::table.filter(name_mappings::index_id.eq(id)))
            .execute(conn)?;
        let n = diesel::delete(indices::table.find(id)).execute(conn)?;
        if n == 0 {
            return Err(Error::not_found(format!("index {} not found", id)));
        }
        log::info!("deleted index {}", id);
        Ok(())
    })
}

/// Ingest a batch of uploaded files, one outcome per file.
///
/// A failing file never stops the others.
pub fn ingest_files(
    pool: &DbPool,
    category: Category,
    files: Vec<UploadedFile>,
) -> Result<UploadReport> {
    ingest_files_into(pool, category, files, None)
}

/// Same as [`ingest_files`], storing files whose name is ambiguous into
/// `target` when one is given.
pub fn ingest_files_into(
    pool: &DbPool,
    category: Category,
    files: Vec<UploadedFile>,
    target: Option<i32>,
) -> Result<UploadReport> {
    let mut conn = pool.get()?;
    let mut outcomes = Vec::with_capacity(files.len());
    for f in files {
        let parsed = match &f.error {
            Some(error) => Err(error.clone()),
            None => parse_constituents(&f.filename, &f.contents).map_err(|e| e.to_string()),
        };
        let outcome = match parsed {
            Err(error) => FileOutcome::rejected(&f.filename, error),
            Ok(upload) => match ingest_constituents(&mut conn, &upload, category, target) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("failed to store {}: {}", f.filename, e);
                    FileOutcome::rejected(&f.filename, e.public_message())
                }
            },
        };
        match &outcome {
            FileOutcome::Matched {
                index_name,
                stocks_added,
                created,
                ..
            } => log::info!(
                "{}: {} tickers into {} index {}",
                f.filename,
                stocks_added,
                if *created { "new" } else { "existing" },
                index_name
            ),
            FileOutcome::AmbiguousNeedsMapping { candidates, .. } => log::warn!(
                "{}: ambiguous index name, candidates {:?}",
                f.filename,
                candidates
            ),
            FileOutcome::Rejected { error, .. } => {
                log::warn!("{}: rejected, {}", f.filename, error)
            }
        }
        outcomes.push(outcome);
    }
    Ok(UploadReport::new(outcomes))
}

/// Store one parsed file under the index named after it.
///
/// An existing index keeps its id, has its metadata refreshed and all of its
/// memberships replaced. A name only differing by separators from stored
/// ones goes into `target` if given, keeping the target's name, and is left
/// for the user to decide otherwise.
///
/// Runs in one immediate transaction: concurrent uploads wait on the write
/// lock rather than reading first.
pub fn ingest_constituents(
    conn: &mut SqliteConnection,
    upload: &ConstituentUpload,
    category: Category,
    target: Option<i32>,
) -> Result<FileOutcome> {
    conn.immediate_transaction::<_, Error, _>(|conn| {
        let existing = indices::table
            .filter(indices::name.eq(&upload.index_name))
            .select(indices::id)
            .first::<i32>(conn)
            .optional()?;
        let (index_id, index_name, created) = match existing {
            Some(id) => {
                diesel::update(indices::table.find(id))
                    .set(&index_record(&upload.index_name, &upload.display_name, upload, category))
                    .execute(conn)?;
                (id, upload.index_name.clone(), false)
            }
            None => {
                let candidates = similar_index_names(conn, &upload.index_name)?;
                match (candidates.is_empty(), target) {
                    (true, _) => {
                        let id = diesel::insert_into(indices::table)
                            .values(&index_record(&upload.index_name, &upload.display_name, upload, category))
                            .returning(indices::id)
                            .get_result::<i32>(conn)?;
                        (id, upload.index_name.clone(), true)
                    }
                    (false, Some(target)) => {
                        let index = find_index(conn, target)?;
                        diesel::update(indices::table.find(index.id))
                            .set(&index_record(&index.name, &index.display_name, upload, category))
                            .execute(conn)?;
                        (index.id, index.name, false)
                    }
                    (false, None) => {
                        return Ok(FileOutcome::AmbiguousNeedsMapping {
                            filename: upload.file_name.clone(),
                            derived_name: upload.index_name.clone(),
                            candidates,
                        })
                    }
                }
            }
        };

        // replace memberships wholesale
        diesel::delete(index_constituents::table.filter(index_constituents::index_id.eq(index_id)))
            .execute(conn)?;
        for t in &upload.tickers {
            let stock = get_or_create_stock(conn, t)?;
            diesel::insert_into(index_constituents::table)
                .values(&NewConstituent {
                    index_id,
                    stock_id: stock.id,
                })
                .execute(conn)?;
        }
        Ok(FileOutcome::Matched {
            filename: upload.file_name.clone(),
            index_id,
            index_name,
            created,
            stocks_added: upload.tickers.len(),
        })
    })
}

fn index_record<'a>(
    name: &'a str,
    display_name: &'a str,
    upload: &'a ConstituentUpload,
    category: Category,
) -> NewIndex<'a> {
    NewIndex {
        name,
        display_name,
        category: category.as_str(),
        original_filename: &upload.file_name,
        upload_date: chrono::Utc::now().naive_utc(),
        file_size_kb: upload.file_size_kb,
        record_count: upload.tickers.len() as i32,
    }
}

pub(crate) fn find_index(conn: &mut SqliteConnection, id: i32) -> Result<Index> {
    indices::table
        .find(id)
        .first::<Index>(conn)
        .optional()?
        .ok_or_else(|| Error::not_found(format!("index {} not found", id)))
}

fn get_or_create_stock(conn: &mut SqliteConnection, input_ticker: &str) -> Result<Stock> {
    diesel::insert_or_ignore_into(stocks::table)
        .values(stocks::ticker.eq(input_ticker))
        .execute(conn)?;
    let stock = stocks::table
        .filter(stocks::ticker.eq(input_ticker))
        .first::<Stock>(conn)?;
    Ok(stock)
}

// existing index names sharing the alphanumeric key of `name`
fn similar_index_names(conn: &mut SqliteConnection, name: &str) -> Result<Vec<String>> {
    let key = ticker::index_key(name);
    let names = indices::table
        .select(indices::name)
        .order(indices::name.asc())
        .load::<String>(conn)?;
    Ok(names
        .into_iter()
        .filter(|n| n != name && ticker::index_key(n) == key)
        .collect())
}
