//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CrmConfig, DatabaseConfig, LogFormat, LoggingConfig, ServerConfig, TeamsConfig,
};
