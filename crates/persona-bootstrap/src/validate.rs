//! Required-field validation shared by the environment and integrity steps

use std::fmt;

/// A required key that was absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Missing {
    pub entity: String,
    pub key: String,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.entity, self.key)
    }
}

/// Check each of `required` against `present` and return every key that
/// fails, in the order given. Never stops at the first miss.
pub fn require_fields<'a, I, F>(entity: &str, required: I, present: F) -> Vec<Missing>
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> bool,
{
    required
        .into_iter()
        .filter(|key| !present(key))
        .map(|key| Missing {
            entity: entity.to_string(),
            key: key.to_string(),
        })
        .collect()
}
