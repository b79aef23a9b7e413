use crate::ai::{DEFAULT_API_URL, DEFAULT_MODEL};
use crate::error::ConfigError;
use crate::scoring::Banding;
use crate::session::TimeLimit;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Backend,
    OpenRouter,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub source: SourceKind,
    pub model: String,
    pub time_limit: TimeLimit,
    pub banding: Banding,
    pub token: Option<String>,
    pub token_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

/// `~/.local/share/quiz-room`, or `.quiz-room` in the working directory when
/// no home directory is known.
fn data_dir(home: Option<String>) -> PathBuf {
    match home {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("quiz-room"),
        None => PathBuf::from(".quiz-room"),
    }
}

impl Config {
    /// Read `.env` if present, then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let source = match var("QUIZ_ROOM_SOURCE") {
            Some(v) => parse_source(&v)?,
            None => SourceKind::Backend,
        };

        let time_limit = match var("QUIZ_ROOM_TIME_LIMIT") {
            Some(v) => parse_time_limit(&v)?,
            None => TimeLimit::default(),
        };

        let defaults = Banding::default();
        let banding = Banding {
            positive_at: match var("QUIZ_ROOM_POSITIVE_AT") {
                Some(v) => parse_percent(&v)?,
                None => defaults.positive_at,
            },
            encouraging_at: match var("QUIZ_ROOM_ENCOURAGING_AT") {
                Some(v) => parse_percent(&v)?,
                None => defaults.encouraging_at,
            },
        };
        if banding.encouraging_at > banding.positive_at {
            return Err(ConfigError::InvalidThreshold(format!(
                "encouraging tier ({}) above positive tier ({})",
                banding.encouraging_at, banding.positive_at
            )));
        }

        let log_level = match var("QUIZ_ROOM_LOG_LEVEL") {
            Some(v) => v
                .trim()
                .parse::<LevelFilter>()
                .map_err(|_| ConfigError::InvalidLogLevel(v.clone()))?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            api_url: var("QUIZ_ROOM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            source,
            model: var("QUIZ_ROOM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            time_limit,
            banding,
            token: var("QUIZ_ROOM_TOKEN"),
            token_file: var("QUIZ_ROOM_TOKEN_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| {
                    data_dir(var("HOME").or_else(|| var("USERPROFILE"))).join("token")
                }),
            log_file: var("QUIZ_ROOM_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("quiz-room.log")),
            log_level,
        })
    }
}

pub fn parse_source(value: &str) -> Result<SourceKind, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "backend" => Ok(SourceKind::Backend),
        "openrouter" => Ok(SourceKind::OpenRouter),
        _ => Err(ConfigError::InvalidSource(value.to_string())),
    }
}

/// `none` / `off` / `0` disable the countdown, any other value is seconds.
pub fn parse_time_limit(value: &str) -> Result<TimeLimit, ConfigError> {
    let value = value.trim();
    match value.to_lowercase().as_str() {
        "none" | "off" | "0" => Ok(TimeLimit::Unlimited),
        other => other
            .parse::<u32>()
            .map(TimeLimit::Seconds)
            .map_err(|_| ConfigError::InvalidTimeLimit(value.to_string())),
    }
}

fn parse_percent(value: &str) -> Result<f64, ConfigError> {
    match value.trim().parse::<f64>() {
        Ok(p) if (0.0..=100.0).contains(&p) => Ok(p),
        _ => Err(ConfigError::InvalidThreshold(format!(
            "'{}' is not a percentage between 0 and 100",
            value
        ))),
    }
}
