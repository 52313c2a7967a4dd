//! Shared configuration and record types for Sentimeter.

pub mod app_config;
pub mod companies;
pub mod config;
pub mod error;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use companies::{load_companies, CompaniesFile, CompanyConfig, TrackedCompanies};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use types::{Category, RawReply, ReplyRecord, Sentiment};
