use crate::settings::{DeviceSettings, FileSettings, MemorySettings, SettingsError};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Runtime configuration from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Orders loaded once the feed is acknowledged.
    pub fetch_limit: usize,
    /// Capacity of the reconciler's request channel.
    pub reconciler_buffer: usize,
    pub notification_title: String,
    /// Where device settings are persisted; in memory when unset.
    pub settings_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetch_limit: 20,
            reconciler_buffer: 32,
            notification_title: "StreetR Seller".to_string(),
            settings_path: None,
        }
    }
}

impl AppConfig {
    /// Reads `ORDER_FETCH_LIMIT`, `RECONCILER_BUFFER`, `NOTIFICATION_TITLE` and
    /// `SETTINGS_PATH`, falling back to the defaults for anything missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let fetch_limit = env::var("ORDER_FETCH_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.fetch_limit);

        let reconciler_buffer = env::var("RECONCILER_BUFFER")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.reconciler_buffer);

        let notification_title = env::var("NOTIFICATION_TITLE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.notification_title);

        let settings_path = env::var("SETTINGS_PATH").ok().map(PathBuf::from);

        Self {
            fetch_limit,
            reconciler_buffer,
            notification_title,
            settings_path,
        }
    }

    pub fn open_settings(&self) -> Result<Arc<dyn DeviceSettings>, SettingsError> {
        Ok(match &self.settings_path {
            Some(path) => Arc::new(FileSettings::open(path)?),
            None => Arc::new(MemorySettings::new()),
        })
    }
}
