//! TOML-backed binding store
//!
//! Persists per-device-class binding tables, named profiles and preferred
//! devices. Settings are stored in TOML format in the platform-specific
//! config directory, or at an explicit path handed in by the embedder.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Errors from loading or persisting the binding store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed binding store: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("binding store could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("binding store has no backing path and no config directory is available")]
    NoPath,
}

/// Per-axis activation parameters as stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisParamsConfig {
    #[serde(default)]
    pub center: i32,
    #[serde(default = "default_axis_threshold")]
    pub threshold: i32,
}

fn default_axis_threshold() -> i32 {
    0x4000
}

impl Default for AxisParamsConfig {
    fn default() -> Self {
        Self {
            center: 0,
            threshold: default_axis_threshold(),
        }
    }
}

/// Stored bindings for one device class.
///
/// All tables are string-keyed so the file stays hand-editable: key names
/// ("Z", "ArrowUp"), button indices ("3"), axes with a sign suffix ("0+"),
/// hats with a direction suffix ("0.up"). Values are pad key names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassConfig {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub keys: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub buttons: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub axes: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub hats: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub axis_params: HashMap<String, AxisParamsConfig>,
}

impl ClassConfig {
    /// True when no binding of any kind is stored.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.buttons.is_empty() && self.axes.is_empty()
            && self.hats.is_empty()
    }
}

/// Key-value persistence for input bindings, keyed by device class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BindingStore {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    class: HashMap<String, ClassConfig>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    profile: HashMap<String, HashMap<String, ClassConfig>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    preferred: HashMap<String, String>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl BindingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform-specific configuration directory.
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("io.emberware", "", "Emberpad")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("input.toml"))
    }

    /// Loads the store from the default location.
    ///
    /// A missing or unreadable file yields an empty store; a file that exists
    /// but fails to parse is reported so stale bindings are not silently
    /// discarded.
    pub fn open_default() -> Result<Self, StoreError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_path(&path),
            Some(path) => Ok(Self {
                path: Some(path),
                ..Self::default()
            }),
            None => Ok(Self::default()),
        }
    }

    /// Loads the store from an explicit path, remembering it for `write`.
    pub fn load_path(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut store: BindingStore = toml::from_str(&content)?;
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Persists the store to an explicit path, remembering it for `write`.
    pub fn save_path(&mut self, path: &Path) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(self)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| StoreError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| StoreError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// Persists to the remembered path, falling back to the default location.
    pub fn write(&mut self) -> Result<(), StoreError> {
        let path = self
            .path
            .clone()
            .or_else(Self::default_path)
            .ok_or(StoreError::NoPath)?;
        self.save_path(&path)
    }

    /// Stored bindings for a device class, if any.
    pub fn class_config(&self, class: &str) -> Option<&ClassConfig> {
        self.class.get(class)
    }

    pub fn set_class_config(&mut self, class: &str, config: ClassConfig) {
        self.class.insert(class.to_string(), config);
    }

    /// Stored bindings for a device class under a named profile.
    pub fn profile_config(&self, profile: &str, class: &str) -> Option<&ClassConfig> {
        self.profile.get(profile).and_then(|p| p.get(class))
    }

    pub fn set_profile_config(&mut self, profile: &str, class: &str, config: ClassConfig) {
        self.profile
            .entry(profile.to_string())
            .or_default()
            .insert(class.to_string(), config);
    }

    /// Preferred device name for a class and player slot.
    pub fn preferred_device(&self, class: &str, player: usize) -> Option<&str> {
        self.preferred
            .get(&format!("{class}.{player}"))
            .map(String::as_str)
    }

    pub fn set_preferred_device(&mut self, class: &str, player: usize, name: &str) {
        self.preferred.insert(format!("{class}.{player}"), name.to_string());
    }
}
