use super::indices::find_index;
use crate::helpers::respond_json;
use crate::models::{NameMapping, NewNameMapping};
use crate::schema::name_mappings;
use crate::{DbPool, Error, Result};
use actix_web::web::{self, Json};
use actix_web::{get, post};
use diesel::prelude::*;
use diesel::SqliteConnection;
use overlap::ticker::mapping_key;
use serde_derive::*;

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingRequest {
    pub source_name: String,
    pub index_id: i32,
}

#[get("/mappings")]
pub async fn api_get_mappings(pool: web::Data<DbPool>) -> Result<Json<Vec<NameMapping>>> {
    let rs = web::block(move || list_mappings(&pool)).await??;
    respond_json(rs)
}

#[post("/mappings")]
pub async fn api_save_mapping(
    pool: web::Data<DbPool>,
    web::Json(req): web::Json<MappingRequest>,
) -> Result<Json<NameMapping>> {
    let rs = web::block(move || save_mapping(&pool, &req.source_name, req.index_id)).await??;
    respond_json(rs)
}

pub fn list_mappings(pool: &DbPool) -> Result<Vec<NameMapping>> {
    let mut conn = pool.get()?;
    let rs = name_mappings::table
        .order(name_mappings::source_name.asc())
        .load::<NameMapping>(&mut conn)?;
    Ok(rs)
}

/// Create or update the mapping of an alert source name, as chosen by a user.
pub fn save_mapping(pool: &DbPool, source_name: &str, index_id: i32) -> Result<NameMapping> {
    let key = mapping_key(source_name);
    if key.is_empty() {
        return Err(Error::bad_request("source_name must not be empty"));
    }
    let mut conn = pool.get()?;
    find_index(&mut conn, index_id)?;
    let m = upsert_mapping(&mut conn, &key, index_id, false)?;
    log::info!("mapped {:?} to index {}", m.source_name, m.index_id);
    Ok(m)
}

/// Insert or replace the mapping stored under `key`, an already
/// normalised source name.
pub(crate) fn upsert_mapping(
    conn: &mut SqliteConnection,
    key: &str,
    index_id: i32,
    inferred: bool,
) -> Result<NameMapping> {
    let row = NewNameMapping {
        source_name: key,
        index_id,
        inferred,
        updated_at: chrono::Utc::now().naive_utc(),
    };
    diesel::insert_into(name_mappings::table)
        .values(&row)
        .on_conflict(name_mappings::source_name)
        .do_update()
        .set(&row)
        .execute(conn)?;
    let m = name_mappings::table
        .filter(name_mappings::source_name.eq(key))
        .first::<NameMapping>(conn)?;
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::setup_db;
    use crate::handlers::indices::{delete_index, ingest_files, list_indices};
    use crate::handlers::upload::UploadedFile;
    use crate::ErrorKind;
    use overlap::Category;

    fn one_index(pool: &DbPool) -> i32 {
        let file = UploadedFile::new("nifty_bank.csv", b"HDFCBANK\n".to_vec());
        ingest_files(pool, Category::Sectoral, vec![file]).unwrap();
        list_indices(pool).unwrap()[0].id
    }

    #[test]
    fn test_save_mapping_upserts() -> Result<()> {
        let db = setup_db();
        let id = one_index(&db.pool);
        let first = save_mapping(&db.pool, "  Bank   highs ", id)?;
        assert_eq!("BANK HIGHS", first.source_name);
        assert!(!first.inferred);
        let second = save_mapping(&db.pool, "bank highs", id)?;
        assert_eq!(first.id, second.id);
        assert_eq!(1, list_mappings(&db.pool)?.len());
        Ok(())
    }

    #[test]
    fn test_save_mapping_rejections() {
        let db = setup_db();
        let id = one_index(&db.pool);
        let err = save_mapping(&db.pool, "   ", id).unwrap_err();
        assert_eq!(ErrorKind::BadRequest, err.kind());
        let err = save_mapping(&db.pool, "bank highs", id + 100).unwrap_err();
        assert_eq!(ErrorKind::NotFound, err.kind());
    }

    #[test]
    fn test_mappings_follow_index_deletion() -> Result<()> {
        let db = setup_db();
        let id = one_index(&db.pool);
        save_mapping(&db.pool, "bank highs", id)?;
        delete_index(&db.pool, id)?;
        assert!(list_mappings(&db.pool)?.is_empty());
        Ok(())
    }
}
