//! Configuration providers consulted by the scheduler between cycles.
//!
//! A provider is asked for the current config once per cycle, before any
//! target is probed, so a cycle never observes a half-applied reload.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::error::ConfigResult;

/// Source of the monitor configuration.
pub trait ConfigProvider: Send {
    /// Configuration to use for the cycle about to start.
    fn current(&mut self) -> &MonitorConfig;
}

/// Always returns the same configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigProvider {
    config: MonitorConfig,
}

impl StaticConfigProvider {
    pub fn new(config: MonitorConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn current(&mut self) -> &MonitorConfig {
        &self.config
    }
}

/// Identifies a particular revision of the file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn read(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

/// Loads the config from a file and reloads it whenever the file changes.
///
/// A reload that fails to read, parse or validate is logged and the
/// previously loaded config stays in effect.
#[derive(Debug)]
pub struct FileConfigProvider {
    path: PathBuf,
    config: MonitorConfig,
    stamp: Option<FileStamp>,
}

impl FileConfigProvider {
    /// Load the initial configuration. Errors here are fatal to the caller.
    pub fn open(path: impl Into<PathBuf>) -> ConfigResult<Self> {
        let path = path.into();
        let stamp = FileStamp::read(&path).ok();
        let config = MonitorConfig::from_file(&path)?;
        info!(
            path = %path.display(),
            targets = config.targets.len(),
            interval_secs = config.interval_seconds,
            "config loaded"
        );
        Ok(Self {
            path,
            config,
            stamp,
        })
    }

    /// The config currently in effect, without checking the file.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Reload the file if it changed since the last load.
    ///
    /// Returns `true` if a new config was adopted.
    pub fn refresh(&mut self) -> bool {
        let stamp = match FileStamp::read(&self.path) {
            Ok(stamp) => stamp,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "config file unreadable, keeping previous config");
                return false;
            }
        };
        if self.stamp == Some(stamp) {
            return false;
        }

        debug!(path = %self.path.display(), "config file changed, reloading");
        // Remember the revision even if it is invalid so the same broken
        // file is not re-parsed every cycle.
        self.stamp = Some(stamp);

        match MonitorConfig::from_file(&self.path) {
            Ok(config) => {
                self.config = config;
                info!(
                    targets = self.config.targets.len(),
                    interval_secs = self.config.interval_seconds,
                    "config reloaded"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "config reload failed, keeping previous config");
                false
            }
        }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn current(&mut self) -> &MonitorConfig {
        self.refresh();
        &self.config
    }
}
