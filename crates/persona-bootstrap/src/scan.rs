//! Data file enumeration for the analysis step

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use tracing::warn;

/// Build a matcher for `*.<ext>` over each extension. Extensions that do
/// not form a valid glob are skipped with a warning.
pub fn extension_matcher(extensions: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for ext in extensions {
        let ext = ext.trim_start_matches('.');
        match Glob::new(&format!("*.{}", ext)) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!("Skipping scan extension {:?}: {}", ext, e),
        }
    }
    builder.build().unwrap_or_else(|e| {
        warn!("Scan matcher failed to build: {}", e);
        GlobSet::empty()
    })
}

/// Names matching one of `extensions`, each exactly once, sorted.
pub fn matching_files<I>(names: I, extensions: &[String]) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let matcher = extension_matcher(extensions);
    names
        .into_iter()
        .filter(|name| matcher.is_match(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts() -> Vec<String> {
        vec!["txt".into(), "dat".into()]
    }

    #[test]
    fn keeps_only_scanned_extensions() {
        let names = vec![
            "IDENTITY.txt".to_string(),
            "emotional_core.dat".to_string(),
            "memory_compressed.bin".to_string(),
            "notes.md".to_string(),
        ];
        assert_eq!(
            matching_files(names, &exts()),
            vec!["IDENTITY.txt", "emotional_core.dat"]
        );
    }

    #[test]
    fn each_name_appears_once_whatever_the_order() {
        let forward = vec![
            "IDENTITY.txt".to_string(),
            "MEMORY_MASTER.txt".to_string(),
            "IDENTITY.txt".to_string(),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let a = matching_files(forward, &exts());
        let b = matching_files(backward, &exts());
        assert_eq!(a, b);
        assert_eq!(a.iter().filter(|n| *n == "IDENTITY.txt").count(), 1);
    }

    #[test]
    fn leading_dot_in_extension_is_tolerated() {
        let names = vec!["a.log".to_string(), "b.txt".to_string()];
        assert_eq!(matching_files(names, &[".log".to_string()]), vec!["a.log"]);
    }

    #[test]
    fn no_extensions_matches_nothing() {
        let names = vec!["a.txt".to_string()];
        assert!(matching_files(names, &[]).is_empty());
    }
}
