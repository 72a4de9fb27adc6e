//! Service configuration from `PDF2HTML_*` environment variables

use pdf2html_core::application::constants::{
    DEFAULT_CONVERSION_TIMEOUT, DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL,
};
use pdf2html_core::{AppError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_CONVERTER_BIN: &str = "pdf2htmlEX";
const DEFAULT_ZOOM: &str = "1.3";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
const WORK_DIR_NAME: &str = "pdf2html";

/// Log output style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub work_dir: PathBuf,
    pub converter_bin: PathBuf,
    pub zoom: String,
    pub timeout: Duration,
    pub retention: Duration,
    pub sweep_interval: Duration,
    pub max_upload_bytes: usize,
    pub log_format: LogFormat,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (tests pass a map)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let work_dir = get("PDF2HTML_WORK_DIR")
            .map(|v| PathBuf::from(shellexpand::tilde(&v).into_owned()))
            .unwrap_or_else(|| std::env::temp_dir().join(WORK_DIR_NAME));

        let converter_bin = get("PDF2HTML_CONVERTER_BIN")
            .map(|v| PathBuf::from(shellexpand::tilde(&v).into_owned()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONVERTER_BIN));

        let zoom = get("PDF2HTML_ZOOM").unwrap_or_else(|| DEFAULT_ZOOM.to_string());
        match zoom.parse::<f64>() {
            Ok(z) if z > 0.0 && z.is_finite() => {}
            _ => {
                return Err(AppError::Config(format!(
                    "PDF2HTML_ZOOM must be a positive number, got '{}'",
                    zoom
                )))
            }
        }

        let log_format = match get("PDF2HTML_LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "PDF2HTML_LOG_FORMAT must be 'pretty' or 'json', got '{}'",
                    other
                )))
            }
        };

        Ok(Self {
            host: get("PDF2HTML_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse(&get, "PDF2HTML_PORT", DEFAULT_PORT)?,
            work_dir,
            converter_bin,
            zoom,
            timeout: seconds(&get, "PDF2HTML_TIMEOUT_SECS", DEFAULT_CONVERSION_TIMEOUT)?,
            retention: seconds(&get, "PDF2HTML_RETENTION_SECS", DEFAULT_RETENTION)?,
            sweep_interval: seconds(&get, "PDF2HTML_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL)?,
            max_upload_bytes: parse(&get, "PDF2HTML_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            log_format,
        })
    }
}

fn parse<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a valid number: '{}'", key, raw))),
    }
}

// Zero would mean "no deadline" or a busy sweep loop
fn seconds<G>(get: &G, key: &str, default: Duration) -> Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let secs: u64 = parse(get, key, default.as_secs())?;
    if secs == 0 {
        return Err(AppError::Config(format!("{} must be greater than zero", key)));
    }
    Ok(Duration::from_secs(secs))
}
