pub mod analysis;
pub mod change;
pub mod config;
pub mod marketplace;
pub mod message;
pub mod models;
pub mod notify;
pub mod pricing;
pub mod watcher;

pub use config::BotConfig;
pub use models::*;
pub use watcher::{CycleOutcome, FloorWatcher};
