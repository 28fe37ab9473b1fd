pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{MonitorConfig, NotifierSettings, TlsSettings};
pub use error::ConfigError;
pub use provider::{ConfigProvider, FileConfigProvider, StaticConfigProvider};
pub use types::*;
