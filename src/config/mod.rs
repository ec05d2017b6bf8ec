//! Label store backed by a JSON config file
//!
//! Lives at `$XDG_CONFIG_HOME/slack/config.json` (or `~/.config/slack/config.json`):
//!
//! ```json
//! {
//!   "user_labels": {
//!     "mom": "U0123ABCD",
//!     "boss": "boss@example.com"
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::ConfigError;

#[cfg(test)]
mod tests;

const APP_DIR: &str = "slack";
const CONFIG_FILE: &str = "config.json";
const LABELS_KEY: &str = "user_labels";

/// Resolve the config file path
///
/// `--config` wins, then `$XDG_CONFIG_HOME`, then `~/.config`.
pub fn config_path(override_path: Option<&str>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = override_path {
        return expand_home(path);
    }

    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.trim().is_empty() => expand_home(&dir)?,
        _ => dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config"),
    };

    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

fn expand_home(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return dirs::home_dir().ok_or(ConfigError::NoConfigDir);
    }
    match path.strip_prefix("~/") {
        Some(rest) => Ok(dirs::home_dir().ok_or(ConfigError::NoConfigDir)?.join(rest)),
        None => Ok(PathBuf::from(path)),
    }
}

/// In-memory view of the config file
///
/// Keeps the whole JSON document so keys other than `user_labels` survive a save.
#[derive(Debug, Clone)]
pub struct LabelStore {
    path: PathBuf,
    document: Map<String, Value>,
    labels: BTreeMap<String, String>,
}

impl LabelStore {
    /// Load the store from `path`
    ///
    /// Never fails: a missing or unreadable file yields an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let document = read_document(&path);
        let labels = normalize_labels(document.get(LABELS_KEY));
        debug!(path = %path.display(), labels = labels.len(), "loaded label store");
        Self {
            path,
            document,
            labels,
        }
    }

    /// Path this store reads from and writes to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up the identifier stored under `label`
    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }

    /// All labels, sorted by name
    #[cfg(test)]
    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    /// Insert or replace a label
    ///
    /// Both sides are trimmed; empty input is rejected. Call [`save`](Self::save)
    /// to persist.
    pub fn add_label(&mut self, label: &str, value: &str) -> Result<(), ConfigError> {
        let label = label.trim();
        let value = value.trim();
        if label.is_empty() {
            return Err(ConfigError::EmptyLabel);
        }
        if value.is_empty() {
            return Err(ConfigError::EmptyValue);
        }
        self.labels.insert(label.to_string(), value.to_string());
        Ok(())
    }

    /// Write the whole document back, replacing the file atomically
    pub fn save(&mut self) -> Result<(), ConfigError> {
        let labels: Map<String, Value> = self
            .labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        self.document
            .insert(LABELS_KEY.to_string(), Value::Object(labels));

        // serde_json::Map is a BTreeMap without `preserve_order`, so output is key-sorted
        let mut contents = serde_json::to_string_pretty(&self.document)?;
        contents.push('\n');

        let write_err = |source| ConfigError::Write {
            path: self.path.display().to_string(),
            source,
        };

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).map_err(write_err)?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(contents.as_bytes()).map_err(write_err)?;
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;

        debug!(path = %self.path.display(), "saved label store");
        Ok(())
    }
}

fn read_document(path: &Path) -> Map<String, Value> {
    if !path.exists() {
        return Map::new();
    }

    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Unable to read config at {}: {}", path.display(), e);
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(map)) => map,
        Ok(Value::Null) => Map::new(),
        Ok(_) => {
            warn!(
                "Config at {} is not a JSON object; ignoring it",
                path.display()
            );
            Map::new()
        }
        Err(e) => {
            warn!("Unable to parse config at {}: {}", path.display(), e);
            Map::new()
        }
    }
}

/// Keep only string labels with a non-blank value, trimmed
fn normalize_labels(raw: Option<&Value>) -> BTreeMap<String, String> {
    let Some(Value::Object(entries)) = raw else {
        if matches!(raw, Some(v) if !v.is_null()) {
            warn!("user_labels must be a JSON object; ignoring it");
        }
        return BTreeMap::new();
    };

    entries
        .iter()
        .filter_map(|(key, value)| {
            let value = value.as_str()?.trim();
            (!value.is_empty()).then(|| (key.clone(), value.to_string()))
        })
        .collect()
}
