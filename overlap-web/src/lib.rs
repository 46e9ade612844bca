#![forbid(unsafe_code)]

#[macro_use]
extern crate diesel;

pub mod db;
mod errors;
pub mod handlers;
mod helpers;
pub mod models;
pub mod routes;
pub mod schema;

use actix_cors::Cors;
use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use diesel::r2d2::{self, ConnectionManager};
use diesel::SqliteConnection;

pub use errors::{Error, ErrorKind, ErrorResponse};
pub use handlers::upload::UploadConfig;
pub type Result<T> = std::result::Result<T, Error>;

// use r2d2 to manage sqlite connections
pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

/// Server settings, assembled from command line flags and environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub dburl: String,
    pub static_dir: Option<String>,
    /// allowed CORS origin, "*" allows any
    pub cors_origin: String,
    pub max_upload_kb: usize,
}

pub async fn server(cfg: ServerConfig) -> Result<()> {
    let pool = db::connect(&cfg.dburl)?;
    let upload = UploadConfig {
        max_file_bytes: cfg.max_upload_kb * 1024,
    };
    let cors_origin = cfg.cors_origin.clone();
    let static_dir = cfg.static_dir.clone();
    log::info!("listening on {}:{}, database {}", cfg.host, cfg.port, cfg.dburl);

    HttpServer::new(move || {
        let cors = if cors_origin == "*" {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_origin(&cors_origin)
                .allow_any_method()
                .allow_any_header()
                .supports_credentials()
                .max_age(3600)
        };
        let app = App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::app_config(pool.clone(), upload));
        // 前端静态资源
        match &static_dir {
            Some(dir) => app.service(Files::new("/", dir).index_file("index.html")),
            None => app,
        }
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await?;
    Ok(())
}
