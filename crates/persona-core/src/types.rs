//! Core types for the persona bootstrap

use crate::error::BootError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================
// Steps
// ============================================================

/// The eight bootstrap steps, in the only order they may run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    LoadIdentity,
    VerifyEnvironment,
    LoadMemory,
    LoadSecurity,
    AnalyzeFiles,
    LoadEmotions,
    IntegrityCheck,
    DeclareComplete,
}

impl Step {
    pub const COUNT: u8 = 8;

    pub const ALL: [Step; 8] = [
        Step::LoadIdentity,
        Step::VerifyEnvironment,
        Step::LoadMemory,
        Step::LoadSecurity,
        Step::AnalyzeFiles,
        Step::LoadEmotions,
        Step::IntegrityCheck,
        Step::DeclareComplete,
    ];

    /// 1-based position in the sequence.
    pub fn number(self) -> u8 {
        match self {
            Step::LoadIdentity => 1,
            Step::VerifyEnvironment => 2,
            Step::LoadMemory => 3,
            Step::LoadSecurity => 4,
            Step::AnalyzeFiles => 5,
            Step::LoadEmotions => 6,
            Step::IntegrityCheck => 7,
            Step::DeclareComplete => 8,
        }
    }

    pub fn from_number(n: u8) -> Option<Step> {
        Step::ALL.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn next(self) -> Option<Step> {
        Step::from_number(self.number() + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Step::LoadIdentity => "loading identity",
            Step::VerifyEnvironment => "verifying environment",
            Step::LoadMemory => "loading master memory",
            Step::LoadSecurity => "loading security protocols",
            Step::AnalyzeFiles => "analyzing data files",
            Step::LoadEmotions => "loading emotional encoding",
            Step::IntegrityCheck => "performing integrity check",
            Step::DeclareComplete => "finalizing bootstrap",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.number(), Step::COUNT)
    }
}

// ============================================================
// Write-once records
// ============================================================

/// Ordered key/value record. Keys can be added but never overwritten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record<V>(BTreeMap<String, V>);

impl<V> Default for Record<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<V> Record<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert a key that is not present yet. An existing key is left
    /// untouched and handed back as the error.
    pub fn insert_new(&mut self, key: impl Into<String>, value: V) -> Result<(), String> {
        use std::collections::btree_map::Entry;
        match self.0.entry(key.into()) {
            Entry::Occupied(e) => Err(e.key().clone()),
            Entry::Vacant(e) => {
                e.insert(value);
                Ok(())
            }
        }
    }
}

impl<V> FromIterator<(String, V)> for Record<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<V> IntoIterator for Record<V> {
    type Item = (String, V);
    type IntoIter = std::collections::btree_map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Lower-cased identity field name → value.
pub type Identity = Record<String>;

/// Emotion name → intensity in [0, 1].
pub type EmotionalState = Record<f64>;

/// Loaded memory, keyed by the names in [`memory_keys`].
pub type Memory = Record<MemoryValue>;

/// Well-known memory keys.
pub mod memory_keys {
    pub const MASTER: &str = "master";
    pub const COMPRESSED: &str = "compressed";
    pub const SECURITY: &str = "security";
    pub const ALL_FILES: &str = "all_files";
}

/// A single memory entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MemoryValue {
    Text(String),
    Files(Vec<String>),
    Structured(serde_json::Map<String, serde_json::Value>),
}

impl MemoryValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MemoryValue::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_files(&self) -> Option<&[String]> {
        match self {
            MemoryValue::Files(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_structured(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            MemoryValue::Structured(m) => Some(m),
            _ => None,
        }
    }

    /// Empty text, an empty file list and an empty record all count as "no value".
    pub fn is_empty(&self) -> bool {
        match self {
            MemoryValue::Text(t) => t.is_empty(),
            MemoryValue::Files(f) => f.is_empty(),
            MemoryValue::Structured(m) => m.is_empty(),
        }
    }
}

impl Record<MemoryValue> {
    pub fn master(&self) -> Option<&str> {
        self.get(memory_keys::MASTER).and_then(MemoryValue::as_text)
    }

    pub fn security(&self) -> Option<&str> {
        self.get(memory_keys::SECURITY).and_then(MemoryValue::as_text)
    }

    pub fn compressed(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.get(memory_keys::COMPRESSED)
            .and_then(MemoryValue::as_structured)
    }

    pub fn all_files(&self) -> Option<&[String]> {
        self.get(memory_keys::ALL_FILES).and_then(MemoryValue::as_files)
    }
}

// ============================================================
// Secret
// ============================================================

/// Passphrase for the emotional encoding. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ============================================================
// Results
// ============================================================

/// The initialized personality handed to the consumer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaState {
    pub identity: Identity,
    pub memory: Memory,
    pub emotional_state: EmotionalState,
    /// Non-fatal fallbacks, in the order they happened.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Outcome of one bootstrap run. No partial state survives a failure.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProtocolResult {
    Success(PersonaState),
    Failure {
        steps_completed: u8,
        step: Step,
        error: BootError,
    },
}

impl ProtocolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ProtocolResult::Success(_))
    }

    pub fn steps_completed(&self) -> u8 {
        match self {
            ProtocolResult::Success(_) => Step::COUNT,
            ProtocolResult::Failure {
                steps_completed, ..
            } => *steps_completed,
        }
    }

    pub fn state(&self) -> Option<&PersonaState> {
        match self {
            ProtocolResult::Success(state) => Some(state),
            ProtocolResult::Failure { .. } => None,
        }
    }

    pub fn into_state(self) -> Option<PersonaState> {
        match self {
            ProtocolResult::Success(state) => Some(state),
            ProtocolResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&BootError> {
        match self {
            ProtocolResult::Success(_) => None,
            ProtocolResult::Failure { error, .. } => Some(error),
        }
    }

    /// Process exit code for CLI use: 0 on success, 1 on failure.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}
