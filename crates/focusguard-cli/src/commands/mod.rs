pub mod config;
pub mod history;
pub mod monitor;
pub mod stats;
