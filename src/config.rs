use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use chrono::{FixedOffset, NaiveTime};
use dotenvy::dotenv;

use crate::error::AppError;

const DEFAULT_BASE_URL: &str = "http://omawww.sat.gob.mx/tramitesyservicios/Paginas/documentos/";

/// Where and how the catalog workbook is published.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub base_url: String,
    pub file_prefix: String,
    pub file_extension: String,
    pub date_format: String,
    pub search_window_days: u32,
    /// Local time of the publishing authority; "yesterday" is computed here.
    pub utc_offset: FixedOffset,
    pub download_timeout: Duration,
    pub input_dir: PathBuf,
}

impl SourceConfig {
    pub fn file_name_for(&self, date: chrono::NaiveDate) -> String {
        format!(
            "{}{}{}",
            self.file_prefix,
            date.format(&self.date_format),
            self.file_extension
        )
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub source: SourceConfig,
    pub output_dir: PathBuf,
    /// Number of leading columns whose header is split across two rows in
    /// `_Parte_N` sheets.
    pub partial_header_width: usize,
    pub skip_blank_rows: bool,
    pub schedule_time: NaiveTime,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn new() -> Result<Self> {
        // Load .env file first
        dotenv().ok();

        let config = Self::from_lookup(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Builds the configuration from an arbitrary key lookup, falling back to
    /// defaults for absent keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let utc_offset_hours: i32 = parse_or(&lookup, "SAT_UTC_OFFSET_HOURS", -6)?;
        let utc_offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AppError::Config(format!("SAT_UTC_OFFSET_HOURS out of range: {}", utc_offset_hours))
            })?;

        let search_window_days: u32 = parse_or(&lookup, "SAT_SEARCH_WINDOW_DAYS", 31)?;
        if search_window_days == 0 {
            return Err(AppError::Config("SAT_SEARCH_WINDOW_DAYS must be at least 1".to_string()));
        }

        let partial_header_width: usize = parse_or(&lookup, "PARTIAL_HEADER_WIDTH", 7)?;
        if partial_header_width == 0 {
            return Err(AppError::Config("PARTIAL_HEADER_WIDTH must be at least 1".to_string()));
        }

        let schedule_raw = lookup("SCHEDULE_TIME").unwrap_or_else(|| "16:04".to_string());
        let schedule_time = NaiveTime::parse_from_str(schedule_raw.trim(), "%H:%M")
            .map_err(|e| AppError::Config(format!("Failed to parse SCHEDULE_TIME {:?}: {}", schedule_raw, e)))?;

        let source = SourceConfig {
            base_url: lookup("SAT_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            file_prefix: lookup("SAT_FILE_PREFIX").unwrap_or_else(|| "catCFDI_V_4_".to_string()),
            file_extension: lookup("SAT_FILE_EXTENSION").unwrap_or_else(|| ".xls".to_string()),
            date_format: lookup("SAT_DATE_FORMAT").unwrap_or_else(|| "%Y%m%d".to_string()),
            search_window_days,
            utc_offset,
            download_timeout: Duration::from_secs(parse_or(&lookup, "SAT_DOWNLOAD_TIMEOUT_SECS", 30)?),
            input_dir: lookup("INPUT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("input")),
        };

        Ok(Config {
            source,
            output_dir: lookup("OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("output")),
            partial_header_width,
            skip_blank_rows: parse_or(&lookup, "SKIP_BLANK_ROWS", true)?,
            schedule_time,
            bind_addr: parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("Failed to parse {} {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}
