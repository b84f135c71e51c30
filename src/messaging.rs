pub mod console;
pub mod handler;
