use thiserror::Error;

pub mod app_config;
pub mod config;
pub mod model;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use model::{
    Channel, ContentItem, ExternalVideo, FormatMix, Language, LanguageTrack,
    SchedulingPreferences, Topic, VideoStatus, VideoType,
};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid language: {0}")]
    InvalidLanguage(String),
    #[error("invalid video status: {0}")]
    InvalidStatus(String),
    #[error("invalid video type: {0}")]
    InvalidVideoType(String),
    #[error("invalid format mix: {0}")]
    InvalidFormatMix(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
