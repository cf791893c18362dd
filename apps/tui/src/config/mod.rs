#[allow(clippy::module_inception)]
mod config;

pub use config::{AppConfig, DEFAULT_DATA_DIR};
