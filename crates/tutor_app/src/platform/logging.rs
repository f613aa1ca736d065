//! Logging initialization for the terminal client.
//!
//! The terminal belongs to the UI, so log records go to a file only.

use std::fs::{self, File};
use std::path::Path;

use log::LevelFilter;
use simplelog::{Config, ConfigBuilder, WriteLogger};

/// Initialize the global logger writing to `log_file` at `level`.
///
/// Creates the parent directory when missing. If the file cannot be created
/// the application keeps running without a logger.
pub fn initialize(log_file: &Path, level: LevelFilter) {
    if let Some(parent) = log_file.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            eprintln!("Warning: Could not create log directory {:?}: {}", parent, err);
            return;
        }
    }

    match File::create(log_file) {
        Ok(file) => {
            let _ = WriteLogger::init(level, build_config(), file);
        }
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", log_file, err);
        }
    }
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}
