use crate::helpers::respond_json;
use crate::schema::{index_constituents, indices, stocks};
use crate::{DbPool, Result};
use actix_web::web::{self, Json};
use actix_web::post;
use diesel::prelude::*;
use overlap::{analyze, AnalysisResult, IndexLabel};
use serde_derive::*;
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub index_ids: Vec<i32>,
}

#[post("/analysis/common-stocks")]
pub async fn api_analyze_common_stocks(
    pool: web::Data<DbPool>,
    web::Json(req): web::Json<AnalysisRequest>,
) -> Result<Json<AnalysisResult>> {
    let rs = web::block(move || common_stocks(&pool, &req.index_ids)).await??;
    respond_json(rs)
}

/// Commonality over the requested indices.
///
/// Ids that match no stored index are dropped, so an empty or entirely
/// unknown selection gives the zero result.
pub fn common_stocks(pool: &DbPool, index_ids: &[i32]) -> Result<AnalysisResult> {
    if index_ids.is_empty() {
        return Ok(AnalysisResult::default());
    }
    let mut conn = pool.get()?;
    let names: HashMap<i32, String> = indices::table
        .filter(indices::id.eq_any(index_ids.to_vec()))
        .select((indices::id, indices::display_name))
        .load::<(i32, String)>(&mut conn)?
        .into_iter()
        .collect();
    // keep the requested order
    let selection: Vec<IndexLabel> = index_ids
        .iter()
        .filter_map(|id| {
            names.get(id).map(|n| IndexLabel {
                id: *id,
                display_name: n.clone(),
            })
        })
        .collect();
    let memberships = index_constituents::table
        .inner_join(stocks::table)
        .filter(index_constituents::index_id.eq_any(index_ids.to_vec()))
        .select((index_constituents::index_id, stocks::ticker))
        .load::<(i32, String)>(&mut conn)?;
    Ok(analyze(
        &selection,
        memberships.iter().map(|(id, t)| (*id, t.as_str())),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::setup_db;
    use crate::handlers::indices::{delete_index, ingest_files, list_indices};
    use crate::handlers::upload::UploadedFile;
    use overlap::Category;

    fn upload(pool: &DbPool, name: &str, content: &str) -> i32 {
        let file = UploadedFile::new(name, content.as_bytes().to_vec());
        ingest_files(pool, Category::Custom, vec![file]).unwrap();
        let index_name = overlap::ticker::derive_index_name(name).unwrap();
        list_indices(pool)
            .unwrap()
            .into_iter()
            .find(|i| i.name == index_name)
            .unwrap()
            .id
    }

    #[test]
    fn test_common_stocks() -> Result<()> {
        let db = setup_db();
        let a = upload(&db.pool, "a.csv", "X\nY\nZ\n");
        let b = upload(&db.pool, "b.csv", "y\n z \n");
        let c = upload(&db.pool, "c.csv", "Z\n");

        let rs = common_stocks(&db.pool, &[a, b, c, 999])?;
        assert_eq!(vec!["A", "B", "C"], rs.analysis_of);
        let rows: Vec<(&str, usize)> = rs
            .commonality
            .iter()
            .map(|c| (c.stock.as_str(), c.appears_in))
            .collect();
        assert_eq!(vec![("Z", 3), ("Y", 2), ("X", 1)], rows);
        assert_eq!(3, rs.summary.total_unique_stocks);
        assert_eq!(2.0, rs.summary.avg_overlap);
        assert_eq!(1, rs.summary.high_overlap_stocks);

        // re-uploading the same content changes nothing
        upload(&db.pool, "b.csv", "y\n z \n");
        assert_eq!(rs, common_stocks(&db.pool, &[a, b, c])?);

        delete_index(&db.pool, c)?;
        let rs = common_stocks(&db.pool, &[a, b, c])?;
        assert_eq!(vec!["A", "B"], rs.analysis_of);
        assert_eq!(2, rs.summary.high_overlap_stocks);
        Ok(())
    }

    #[test]
    fn test_common_stocks_empty_selection() -> Result<()> {
        let db = setup_db();
        assert_eq!(AnalysisResult::default(), common_stocks(&db.pool, &[])?);
        assert_eq!(AnalysisResult::default(), common_stocks(&db.pool, &[42])?);
        Ok(())
    }
}
