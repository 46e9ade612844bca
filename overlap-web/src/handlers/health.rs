use crate::helpers::respond_json;
use crate::{DbPool, Result};
use actix_web::web::{self, Json};
use serde_derive::*;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

pub async fn api_get_health(pool: web::Data<DbPool>) -> Result<Json<HealthResponse>> {
    // non-blocking, an exhausted pool also reports unavailable
    let database = match pool.try_get() {
        Some(_) => "ok",
        None => "unavailable",
    };
    respond_json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        database: database.into(),
    })
}
