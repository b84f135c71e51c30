use thiserror::Error;
use tokio_cron_scheduler::JobSchedulerError;

/// Custom Error and Result types to unify errors from all sources.
pub type BotResult<T> = Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("HTTP Error: {0}")]
    Http(String),
    /// Remote payload could not be decoded into users or problems.
    #[error("Ingestion Error: {0}")]
    Ingestion(String),
    #[error("Unknown leaderboard '{0}'")]
    UnknownLeaderboard(String),
    #[error("No such user '{0}'")]
    NoSuchUser(String),
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
    #[error("Config Error: {0}")]
    Config(String),
    #[error("Storage Error: {0}")]
    Storage(String),
    #[error("Scheduler Error: {0}")]
    Scheduler(String),
    #[error("Template Error: {0}")]
    Template(String),
}

impl BotError {
    /// Errors raised while pulling data from the backend. Those are retried on
    /// the next refresh and never reach a command reply.
    pub fn is_ingestion(&self) -> bool {
        matches!(self, BotError::Http(_) | BotError::Ingestion(_))
    }
}

impl From<reqwest::Error> for BotError {
    fn from(error: reqwest::Error) -> Self {
        BotError::Http(error.to_string())
    }
}

impl From<serde_json::Error> for BotError {
    fn from(error: serde_json::Error) -> Self {
        BotError::Ingestion(error.to_string())
    }
}

impl From<JobSchedulerError> for BotError {
    fn from(error: JobSchedulerError) -> Self {
        BotError::Scheduler(error.to_string())
    }
}

impl From<figment::Error> for BotError {
    fn from(error: figment::Error) -> Self {
        BotError::Config(error.to_string())
    }
}

impl From<minijinja::Error> for BotError {
    fn from(error: minijinja::Error) -> Self {
        BotError::Template(error.to_string())
    }
}

impl From<std::io::Error> for BotError {
    fn from(error: std::io::Error) -> Self {
        BotError::Storage(error.to_string())
    }
}
