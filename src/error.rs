use std::fmt;

/// Failure talking to a quiz, explanation or flashcard source.
#[derive(Debug)]
pub enum SourceError {
    /// The request never produced a response (connection, timeout, TLS).
    Transport(String),

    /// The service answered with a non-success status.
    Status { code: u16, message: String },

    /// The body could not be decoded.
    Decode(String),

    /// The upstream model or client library reported an error.
    Upstream(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Transport(msg) => write!(f, "transport error: {}", msg),
            SourceError::Status { code, message } => {
                write!(f, "service returned {}: {}", code, message)
            }
            SourceError::Decode(msg) => write!(f, "could not decode response: {}", msg),
            SourceError::Upstream(msg) => write!(f, "upstream error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            SourceError::Status {
                code: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SourceError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

impl From<String> for SourceError {
    fn from(msg: String) -> Self {
        SourceError::Upstream(msg)
    }
}

/// An action the quiz session refused in its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NotInProgress,
    NotCompleted,
    EmptyAnswer,
    NoSuchQuestion(usize),
    ExplanationCached(usize),
    ExplanationPending(usize),
    Closed,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotInProgress => write!(f, "no question is active"),
            SessionError::NotCompleted => write!(f, "the quiz is not finished yet"),
            SessionError::EmptyAnswer => write!(f, "answer is empty"),
            SessionError::NoSuchQuestion(index) => write!(f, "no question at index {}", index),
            SessionError::ExplanationCached(index) => {
                write!(f, "explanation for question {} is already available", index + 1)
            }
            SessionError::ExplanationPending(index) => {
                write!(f, "explanation for question {} is still loading", index + 1)
            }
            SessionError::Closed => write!(f, "session has been shut down"),
        }
    }
}

impl std::error::Error for SessionError {}

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidTimeLimit(String),
    InvalidSource(String),
    InvalidThreshold(String),
    InvalidLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimeLimit(v) => {
                write!(f, "invalid time limit '{}': expected seconds or 'none'", v)
            }
            ConfigError::InvalidSource(v) => {
                write!(f, "invalid source '{}': expected 'backend' or 'openrouter'", v)
            }
            ConfigError::InvalidThreshold(v) => write!(f, "invalid tier threshold: {}", v),
            ConfigError::InvalidLogLevel(v) => write!(f, "invalid log level '{}'", v),
        }
    }
}

impl std::error::Error for ConfigError {}
