use crate::handlers::alerts::api_upload_alerts;
use crate::handlers::analysis::api_analyze_common_stocks;
use crate::handlers::health::api_get_health;
use crate::handlers::indices::{
    api_delete_index, api_get_index_constituents, api_get_indices, api_upload_indices,
};
use crate::handlers::mappings::{api_get_mappings, api_save_mapping};
use crate::handlers::upload::UploadConfig;
use crate::{DbPool, Error};
use actix_web::web;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(api_get_health))
        .service(api_get_indices)
        .service(api_upload_indices)
        .service(api_get_index_constituents)
        .service(api_delete_index)
        .service(api_analyze_common_stocks)
        .service(api_upload_alerts)
        .service(api_get_mappings)
        .service(api_save_mapping);
}

/// Shared state, extractor settings and routes of the application.
pub fn app_config(pool: DbPool, upload: UploadConfig) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(pool))
            .app_data(web::Data::new(upload))
            .app_data(json_config())
            .configure(routes);
    }
}

// malformed json bodies are client errors with the usual error body
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| Error::bad_request(format!("invalid request body: {}", err)).into())
}
