//! File checksums declared in the security protocol
//!
//! A checksum is `0x` plus the first 32 bits of the SHA-256 digest in
//! lower-case hex, leading zeros dropped. The security protocol may declare
//! one per file as `FILE.ext: 0x…` under its `## Checksums` heading; lines
//! in other sections are ignored.

use crate::store::DataStore;
use regex::Regex;
use ring::digest::{digest, SHA256};

pub fn checksum(bytes: &[u8]) -> String {
    let d = digest(&SHA256, bytes);
    let head = d.as_ref();
    format!("{:#x}", u32::from_be_bytes([head[0], head[1], head[2], head[3]]))
}

/// A `FILE: 0x…` line from the security protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredChecksum {
    pub file: String,
    pub value: String,
}

const SECTION: &str = "checksums";

pub fn parse_declared(security: &str) -> Vec<DeclaredChecksum> {
    let Ok(re) = Regex::new(r"^\s*([^:\s#][^:]*?)\s*:\s*(0[xX][0-9a-fA-F]+)\s*$") else {
        return Vec::new();
    };

    let mut in_section = false;
    let mut declared = Vec::new();
    for line in security.lines() {
        if let Some(heading) = line.trim_start().strip_prefix('#') {
            in_section = heading.trim_start_matches('#').trim().eq_ignore_ascii_case(SECTION);
            continue;
        }
        if !in_section {
            continue;
        }
        let Some(c) = re.captures(line) else {
            continue;
        };
        if !is_store_file_name(&c[1]) {
            continue;
        }
        declared.push(DeclaredChecksum {
            file: c[1].to_string(),
            value: c[2].to_lowercase(),
        });
    }
    declared
}

/// A plain `name.ext` directly inside the store: no directories, no
/// parent references.
fn is_store_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) || name.starts_with('.') {
        return false;
    }
    matches!(name.rsplit_once('.'), Some((stem, ext)) if !stem.is_empty() && !ext.is_empty())
}

fn same_value(a: &str, b: &str) -> bool {
    let parse = |s: &str| u64::from_str_radix(s.trim_start_matches("0x"), 16).ok();
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Recompute every declared checksum against the store. Returns one
/// message per mismatch or unreadable file; an empty list means all match.
pub fn verify_declared<S: DataStore + ?Sized>(store: &S, declared: &[DeclaredChecksum]) -> Vec<String> {
    let mut problems = Vec::new();
    for decl in declared {
        match store.read_bytes(&decl.file) {
            Ok(bytes) => {
                let actual = checksum(&bytes);
                if !same_value(&actual, &decl.value) {
                    problems.push(format!(
                        "checksum mismatch for {}: declared {}, actual {}",
                        decl.file, decl.value, actual
                    ));
                }
            }
            Err(e) => problems.push(format!("cannot verify checksum for {}: {}", decl.file, e)),
        }
    }
    problems
}
