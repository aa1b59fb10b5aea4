//! Identity file parsing: `KEY: value` lines

use persona_core::Identity;
use std::collections::{BTreeMap, HashSet};

/// Parsed identity plus keys that appeared more than once.
#[derive(Debug, Clone, Default)]
pub struct ParsedIdentity {
    pub identity: Identity,
    /// Lower-cased keys seen on more than one line. The last line wins.
    pub duplicates: Vec<String>,
}

/// Split every line on its first `:`. Keys are trimmed and lower-cased,
/// values trimmed. Lines without a separator, or with nothing before it,
/// are ignored.
pub fn parse_identity(text: &str) -> ParsedIdentity {
    let mut fields = BTreeMap::new();
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        if !seen.insert(key.clone()) && !duplicates.contains(&key) {
            duplicates.push(key.clone());
        }
        fields.insert(key, value.trim().to_string());
    }

    ParsedIdentity {
        identity: fields.into_iter().collect(),
        duplicates,
    }
}
