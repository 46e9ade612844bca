//! Command line tool working directly on the index overlap database

use dotenv::dotenv;
use overlap::Category;
use overlap_web::handlers::alerts::process_alerts;
use overlap_web::handlers::analysis::common_stocks;
use overlap_web::handlers::indices::{delete_index, ingest_files_into, list_indices, FileOutcome};
use overlap_web::handlers::mappings::save_mapping;
use overlap_web::handlers::upload::UploadedFile;
use overlap_web::{db, DbPool, Result};
use std::env;
use std::path::PathBuf;
use structopt::StructOpt;

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let opt = ToolOpt::from_args();
    let dburl = opt
        .dburl
        .or_else(|| env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "./overlap.db".to_owned());
    let pool = db::build_pool(&dburl)?;
    let applied = db::run_migrations(&pool)?;
    if let ToolCmd::Migrate = opt.cmd {
        println!("applied {} migrations to {}", applied, dburl);
        return Ok(());
    }
    exec(&pool, opt.cmd)
}

#[derive(Debug, StructOpt)]
#[structopt(name = "overlap-tool", about = "command to manage indices and run analyses")]
pub struct ToolOpt {
    #[structopt(short, long, help = "specify sqlite database file, falls back to DATABASE_URL")]
    dburl: Option<String>,
    #[structopt(subcommand)]
    cmd: ToolCmd,
}

#[derive(Debug, StructOpt)]
pub enum ToolCmd {
    /// apply pending migrations only
    Migrate,
    List,
    Ingest {
        #[structopt(short, long, help = "one of broad, sectoral, thematic, strategy, custom")]
        category: Category,
        #[structopt(short, long, help = "index id receiving files whose name is ambiguous")]
        target: Option<i32>,
        #[structopt(parse(from_os_str), required = true)]
        files: Vec<PathBuf>,
    },
    Analyze {
        #[structopt(required = true)]
        ids: Vec<i32>,
    },
    Delete {
        id: i32,
    },
    Map {
        source_name: String,
        index_id: i32,
    },
    Alerts {
        #[structopt(parse(from_os_str))]
        file: PathBuf,
    },
}

fn exec(pool: &DbPool, cmd: ToolCmd) -> Result<()> {
    match cmd {
        ToolCmd::Migrate => {}
        ToolCmd::List => {
            for i in list_indices(pool)? {
                println!(
                    "{:5}{:25}{:12}{:8}{:10.2}  {}",
                    i.id, i.display_name, i.category, i.record_count, i.file_size_kb, i.upload_date
                );
            }
        }
        ToolCmd::Ingest {
            category,
            target,
            files,
        } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in files {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                uploads.push(UploadedFile::new(filename, std::fs::read(&path)?));
            }
            let report = ingest_files_into(pool, category, uploads, target)?;
            println!("{}", report.detail);
            for o in report
                .processed
                .iter()
                .chain(&report.needs_mapping)
                .chain(&report.errors)
            {
                match o {
                    FileOutcome::Matched {
                        filename,
                        index_name,
                        stocks_added,
                        ..
                    } => println!("{:30}{:25}{}", filename, index_name, stocks_added),
                    FileOutcome::AmbiguousNeedsMapping {
                        filename,
                        candidates,
                        ..
                    } => println!("{:30}needs mapping, similar to {}", filename, candidates.join(", ")),
                    FileOutcome::Rejected { filename, error } => {
                        println!("{:30}{}", filename, error)
                    }
                }
            }
        }
        ToolCmd::Analyze { ids } => {
            let rs = common_stocks(pool, &ids)?;
            println!("analysis of: {}", rs.analysis_of.join(", "));
            for c in &rs.commonality {
                println!("{:15}{:4}  {}", c.stock, c.appears_in, c.indices.join(", "));
            }
            println!(
                "unique stocks {}, average overlap {:.2}, high overlap {}",
                rs.summary.total_unique_stocks, rs.summary.avg_overlap, rs.summary.high_overlap_stocks
            );
        }
        ToolCmd::Delete { id } => {
            delete_index(pool, id)?;
            println!("deleted index {}", id);
        }
        ToolCmd::Map {
            source_name,
            index_id,
        } => {
            let m = save_mapping(pool, &source_name, index_id)?;
            println!("{} -> {}", m.source_name, m.index_id);
        }
        ToolCmd::Alerts { file } => {
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let report = process_alerts(pool, &filename, &std::fs::read(&file)?)?;
            for r in &report.records {
                let mapped = r
                    .mapped_index_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_owned());
                let date = r.date.map(|d| d.to_string()).unwrap_or_default();
                println!("{:15}{:10}{:6}{:12}{}", r.ticker, format!("{:?}", r.flag_type), mapped, date, r.source_name);
            }
            println!(
                "alerts {}, highs {}, lows {}",
                report.summary.total_alerts, report.summary.highs, report.summary.lows
            );
            if !report.unmapped_names.is_empty() {
                println!("unmapped: {}", report.unmapped_names.join(", "));
            }
        }
    }
    Ok(())
}
