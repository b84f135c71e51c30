pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod membership;
pub mod messaging;
pub mod refresh;
pub mod scheduler;
pub mod storage;
pub mod utils;
