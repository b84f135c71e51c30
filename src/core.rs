pub mod commands;
pub mod leaderboard;
pub mod problem;
pub mod scoring;
pub mod standings;
pub mod templates;
pub mod user;
