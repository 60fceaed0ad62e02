//! subject-backfill: resolve legacy free-text subject names on exercises
//! into canonical Subject records.
//!
//! Safe to re-run: exercises already pointing at a subject are skipped.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use solvehub_db::Database;
use solvehub_tools::subject_backfill;

#[derive(Parser)]
#[command(name = "subject-backfill", about = "Backfill canonical subjects from legacy names")]
struct Args {
    /// Exercises fetched per batch.
    #[arg(long, default_value_t = 500)]
    batch_size: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solvehub_tools=info,subject_backfill=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/solvehub".to_string());

    // A connection failure here is the one fatal error: the process exits
    // nonzero. Per-record failures below only affect the counters.
    let db = Database::connect(&database_url).await?;

    let stats = subject_backfill::run(&db, args.batch_size).await?;

    println!("Subject backfill summary:");
    println!("  scanned:           {}", stats.scanned);
    println!("  migrated:          {}", stats.migrated);
    println!("  failed:            {}", stats.failed);
    println!("  distinct subjects: {}", stats.distinct_subjects);
    Ok(())
}
