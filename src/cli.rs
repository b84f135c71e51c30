use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Parser, Serialize)]
#[command(about = "Leaderboards over the CPC backend")]
pub struct Cli {
    /// Configuration file holding leaderboards, aliases and admins (yaml or json)
    #[arg(short, long, default_value = "config.yaml")]
    #[serde(skip)]
    pub config: PathBuf,
    /// Where membership entries are persisted
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
    /// One of TRACE, DEBUG, INFO, WARN, ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
}
