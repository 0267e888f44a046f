//! Device-local seller preferences.
//!
//! Only one key matters today: [`AUTO_CONFIRM_KEY`]. It is read on every insert event
//! rather than cached, so a toggle takes effect for the very next order.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const AUTO_CONFIRM_KEY: &str = "autoConfirmOrders";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Settings file is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait DeviceSettings: Send + Sync {
    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;

    /// Absent means off.
    fn auto_confirm(&self) -> bool {
        self.get_bool(AUTO_CONFIRM_KEY).unwrap_or(false)
    }
}

#[derive(Default)]
pub struct MemorySettings {
    values: Mutex<HashMap<String, bool>>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceSettings for MemorySettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Settings persisted as a flat JSON object, rewritten on every change.
pub struct FileSettings {
    path: PathBuf,
    values: Mutex<HashMap<String, bool>>,
}

impl FileSettings {
    /// Loads `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No settings file yet");
                HashMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, bool>) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(values)?;
        std::fs::write(&self.path, text).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Could not write settings");
        })?;
        Ok(())
    }
}

impl DeviceSettings for FileSettings {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }

    fn set_bool(&self, key: &str, value: bool) -> Result<(), SettingsError> {
        let mut values = self.values.lock();
        values.insert(key.to_string(), value);
        self.persist(&values)
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            self.persist(&values)?;
        }
        Ok(())
    }
}
