//! Shared domain types, input validation and configuration for ytdash.

pub mod app_config;
pub mod config;
pub mod credentials;
pub mod duration;
pub mod model;
pub mod request;

use chrono::NaiveDate;
use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use duration::parse_duration;
pub use model::{
    engagement_rate, ChannelSummary, DateWindow, ResultsTable, VideoDetails, VideoRecord,
    DEFAULT_WINDOW_DAYS,
};
pub use request::FetchRequest;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Caller input rejected before any provider or store call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("email domain '{0}' is not allowed")]
    DomainNotAllowed(String),

    #[error("password {0}")]
    WeakPassword(String),

    #[error("at least one channel ID is required")]
    NoChannels,

    #[error("start date {start} is after end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}
