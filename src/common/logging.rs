use anyhow::{Context, Result};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::Path;
use time::macros::format_description;

/// Parse a log level string into a LevelFilter; NONE and OFF silence logging
pub fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_uppercase().as_str() {
        "DEBUG" => LevelFilter::Debug,
        "INFO" => LevelFilter::Info,
        "WARN" | "WARNING" => LevelFilter::Warn,
        "ERROR" | "CRITICAL" => LevelFilter::Error,
        "NONE" | "OFF" => LevelFilter::Off,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to INFO.", level);
            LevelFilter::Info
        }
    }
}

/// Set up logging with the specified level, to stdout or to a fresh log file
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> Result<()> {
    let level = parse_log_level(log_level);

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to create log file: {}", path.display()))?;
        let config = ConfigBuilder::new().set_time_format_rfc3339().build();
        WriteLogger::init(level, config, file)?;
        return Ok(());
    }

    SimpleLogger::new()
        .with_level(level)
        .with_timestamp_format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .init()?;
    Ok(())
}
