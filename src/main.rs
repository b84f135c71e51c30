use cpc_leaderboard::cli::Cli;
use cpc_leaderboard::client::cpc::Cpc;
use cpc_leaderboard::config::Settings;
use cpc_leaderboard::membership::MembershipStore;
use cpc_leaderboard::messaging::{console, handler::CommandHandler};
use cpc_leaderboard::scheduler::{JobProcess, Scheduler};
use cpc_leaderboard::storage::MemoryCache;

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::new(&cli)?;

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(settings.get_trace_level())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Setting default subscriber failed");

    // Bad leaderboard definitions are fatal, better now than at query time.
    let leaderboards = settings.leaderboards()?;
    info!(
        "Loaded leaderboards: {}",
        leaderboards.all_options().join(", ")
    );

    let store = MembershipStore::load(&settings.db_path).await?;
    let cache = MemoryCache::new();
    let source = Arc::new(Cpc::from_settings(&settings)?);

    let sched = Scheduler::new(cache.clone(), source).await?;

    info!("Fetching users and problems.");
    sched.initialize().await;

    let every = Duration::from_secs(settings.refresh_interval_sec);
    let jobs = vec![
        JobProcess::RefreshUsers(every),
        JobProcess::RefreshProblems(every),
    ];
    for job in jobs {
        sched.add_job(job).await?;
    }

    info!("Starting scheduler.");
    sched.start().await?;

    let handler = CommandHandler::new(leaderboards, settings.admins.clone(), cache, store);
    console::serve(handler).await?;

    Ok(())
}
