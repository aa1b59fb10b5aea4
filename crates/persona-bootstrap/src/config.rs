//! Bootstrap configuration
//!
//! Loaded from TOML at startup, falls back to defaults if no config file
//! exists. The passphrase is never part of the file; it is handed to the
//! protocol per run.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Data store location.
    pub data_dir: PathBuf,
    /// File names inside the data store.
    pub files: FileLayout,
    /// File enumeration for the analysis step.
    pub scan: ScanConfig,
    /// Fields the integrity check requires.
    pub integrity: IntegrityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLayout {
    /// `KEY: value` identity lines. Required.
    pub identity: String,
    /// Master memory text. Required.
    pub memory: String,
    /// Security protocol text. Optional.
    pub security: String,
    /// Gzip-compressed JSON memory record. Optional.
    pub compressed: String,
    /// Encrypted emotional encoding. Optional.
    pub emotions: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions (without the dot) recorded into `memory.all_files`.
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    /// Identity keys that must be present and non-empty.
    pub identity_fields: Vec<String>,
    /// Memory keys that must be present and non-empty.
    pub memory_fields: Vec<String>,
}

// ============================================================
// Defaults
// ============================================================

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            files: FileLayout::default(),
            scan: ScanConfig::default(),
            integrity: IntegrityConfig::default(),
        }
    }
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            identity: "IDENTITY.txt".into(),
            memory: "MEMORY_MASTER.txt".into(),
            security: "SECURITY_PROTOCOL.txt".into(),
            compressed: "memory_compressed.bin".into(),
            emotions: "emotional_core.dat".into(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["txt".into(), "dat".into()],
        }
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            identity_fields: vec!["name".into(), "creator".into(), "mission".into()],
            memory_fields: vec!["master".into()],
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl BootstrapConfig {
    /// Config rooted at `data_dir`, defaults for everything else.
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Files that must exist before memory is loaded.
    pub fn required_files(&self) -> [&str; 2] {
        [&self.files.identity, &self.files.memory]
    }
}
