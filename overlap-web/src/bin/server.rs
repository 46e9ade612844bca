use dotenv::dotenv;
use std::env;
use structopt::StructOpt;
use overlap_web::{server, Result, ServerConfig};

const DEFAULT_DBURL: &str = "./overlap.db";

#[actix_rt::main]
async fn main() -> Result<()> {
    dotenv().ok();
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "actix_web=info,overlap_web=info");
    }
    env_logger::init();

    let opt = ServerOpt::from_args();
    let dburl = opt
        .dburl
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_DBURL.to_owned());
    server(ServerConfig {
        host: opt.host,
        port: opt.port,
        dburl,
        static_dir: opt.static_dir,
        cors_origin: opt.cors_origin,
        max_upload_kb: opt.max_upload_kb,
    })
    .await?;
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(name = "overlap-web", about = "command to run index overlap web server")]
pub struct ServerOpt {
    #[structopt(
        long,
        help = "specify host to bind, by default 127.0.0.1",
        default_value = "127.0.0.1"
    )]
    host: String,
    #[structopt(
        short,
        long,
        help = "specify server port to listen, by default 8080",
        default_value = "8080"
    )]
    port: u16,
    #[structopt(
        short,
        long,
        help = "specify sqlite database file, falls back to DATABASE_URL"
    )]
    dburl: Option<String>,
    #[structopt(short, long, help = "specify directory of frontend static files")]
    static_dir: Option<String>,
    #[structopt(
        long,
        help = "specify allowed CORS origin, * for any",
        default_value = "http://localhost:3000"
    )]
    cors_origin: String,
    #[structopt(
        long,
        help = "specify max size in KB of one uploaded file",
        default_value = "10240"
    )]
    max_upload_kb: usize,
}
