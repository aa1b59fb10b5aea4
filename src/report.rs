//! Human and JSON rendering of a bootstrap result

use persona_bootstrap::checksum::checksum;
use persona_bootstrap::{BootstrapConfig, DataStore, FsStore};
use persona_core::{PersonaState, ProtocolResult, Step};

const RULE: &str = "============================================================";

/// Completion banner, or the failure report.
pub fn render_text(result: &ProtocolResult) -> String {
    match result {
        ProtocolResult::Success(state) => render_success(state),
        ProtocolResult::Failure { step, error, .. } => format!(
            "BOOTSTRAP FAILED at step {}/{}\nError: {}\nAI cannot proceed with incomplete initialization\n",
            step.number(),
            Step::COUNT,
            error
        ),
    }
}

fn render_success(state: &PersonaState) -> String {
    let field = |key: &str, fallback: &str| {
        state
            .identity
            .get(key)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    };

    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\nBOOTSTRAP COMPLETE - AI FULLY INITIALIZED\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("Name: {}\n", field("name", "Unknown")));
    out.push_str(&format!("Creator: {}\n", field("creator", "Unknown")));
    out.push_str(&format!("Mission: {}\n", field("mission", "Not defined")));
    if let Some(files) = state.memory.all_files() {
        out.push_str(&format!("Data files: {}\n", files.len()));
    }
    out.push_str("Status: Ready for interaction\n");
    for w in &state.warnings {
        out.push_str(&format!("Warning: {}\n", w));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Pretty JSON of the whole result.
pub fn render_json(result: &ProtocolResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// `FILE: 0x…` lines for the required files, ready to paste into the
/// security protocol.
pub fn checksum_lines(config: &BootstrapConfig) -> Vec<String> {
    let store = FsStore::new(&config.data_dir);
    config
        .required_files()
        .iter()
        .map(|name| match store.read_bytes(name) {
            Ok(bytes) => format!("{}: {}", name, checksum(&bytes)),
            Err(e) => format!("{}: ({})", name, e),
        })
        .collect()
}
