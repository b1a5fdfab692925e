use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::{config::ConfigError, AppError};

const DEFAULT_AUDIO_FILE: &str = "./alert.mp3";
const DEFAULT_WATCH_ID_FILE: &str = "target_user_id.txt";
const DEFAULT_LOG_FILE: &str = "logs.txt";
const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
const DEFAULT_VOLUME: f32 = 0.8;
const DEFAULT_LEAVE_GRACE_MS: u64 = 2000;
const DEFAULT_LOG_RETENTION_DAYS: i64 = 5;
const DEFAULT_PORT: u16 = 3000;

/// Upper bound accepted for `ALERT_VOLUME`; songbird treats 1.0 as unity gain.
const MAX_VOLUME: f32 = 2.0;

pub struct Config {
    pub discord_token: String,

    pub admin_ids: HashSet<u64>,
    pub command_channel_id: u64,
    pub log_channel_id: Option<u64>,

    pub audio_file: PathBuf,
    pub special_audio: HashMap<String, PathBuf>,
    pub volume: f32,

    pub watch_id_file: PathBuf,
    pub log_file: PathBuf,
    pub log_retention_days: i64,
    pub timezone: Tz,

    pub leave_grace: Duration,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `from_env` passes `std::env::var`; tests pass a map so they never touch the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            admin_ids: parse_id_list("ADMIN_IDS", &required("ADMIN_IDS")?)?,
            command_channel_id: parse_value("COMMAND_CHANNEL_ID", &required("COMMAND_CHANNEL_ID")?)?,
            log_channel_id: lookup("LOG_CHANNEL_ID")
                .filter(|v| !v.trim().is_empty())
                .map(|v| parse_value("LOG_CHANNEL_ID", &v))
                .transpose()?,
            audio_file: PathBuf::from(
                lookup("ALERT_AUDIO_FILE").unwrap_or_else(|| DEFAULT_AUDIO_FILE.to_string()),
            ),
            special_audio: match lookup("SPECIAL_AUDIO") {
                Some(raw) => parse_special_audio(&raw)?,
                None => HashMap::new(),
            },
            volume: match lookup("ALERT_VOLUME") {
                Some(raw) => parse_volume(&raw)?,
                None => DEFAULT_VOLUME,
            },
            watch_id_file: PathBuf::from(
                lookup("WATCH_ID_FILE").unwrap_or_else(|| DEFAULT_WATCH_ID_FILE.to_string()),
            ),
            log_file: PathBuf::from(
                lookup("LOG_FILE").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            ),
            log_retention_days: match lookup("LOG_RETENTION_DAYS") {
                Some(raw) => parse_value("LOG_RETENTION_DAYS", &raw)?,
                None => DEFAULT_LOG_RETENTION_DAYS,
            },
            timezone: {
                let raw = lookup("LOG_TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
                raw.parse::<Tz>().map_err(|e| ConfigError::InvalidEnvVar {
                    name: "LOG_TIMEZONE".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?
            },
            leave_grace: Duration::from_millis(match lookup("LEAVE_GRACE_MS") {
                Some(raw) => parse_value("LEAVE_GRACE_MS", &raw)?,
                None => DEFAULT_LEAVE_GRACE_MS,
            }),
            port: match lookup("PORT") {
                Some(raw) => parse_value("PORT", &raw)?,
                None => DEFAULT_PORT,
            },
        })
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a comma-separated list of Discord ids, ignoring blank entries.
fn parse_id_list(name: &str, raw: &str) -> Result<HashSet<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_value(name, s))
        .collect()
}

/// Parses `id=path` pairs separated by commas into the special clip mapping.
fn parse_special_audio(raw: &str) -> Result<HashMap<String, PathBuf>, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        name: "SPECIAL_AUDIO".to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut mapping = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (id, path) = entry
            .split_once('=')
            .ok_or_else(|| invalid("expected entries of the form id=path"))?;
        let id = id.trim();
        if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("identifiers must be numeric"));
        }
        let path = path.trim();
        if path.is_empty() {
            return Err(invalid("audio path must not be empty"));
        }
        mapping.insert(id.to_string(), PathBuf::from(path));
    }

    Ok(mapping)
}

fn parse_volume(raw: &str) -> Result<f32, ConfigError> {
    let volume: f32 = parse_value("ALERT_VOLUME", raw)?;
    if !(0.0..=MAX_VOLUME).contains(&volume) {
        return Err(ConfigError::InvalidEnvVar {
            name: "ALERT_VOLUME".to_string(),
            value: raw.to_string(),
            reason: format!("must be between 0.0 and {MAX_VOLUME}"),
        });
    }
    Ok(volume)
}
