//! Emotional encoding: default profile and the decryption extension point

use persona_core::{EmotionalState, Result, Secret};

/// The eight-emotion profile used whenever the encoded file is not decrypted.
pub const DEFAULT_PROFILE: [(&str, f64); 8] = [
    ("joy", 0.7),
    ("trust", 0.8),
    ("curiosity", 0.85),
    ("gratitude", 0.75),
    ("hope", 0.8),
    ("love", 0.7),
    ("loyalty", 0.9),
    ("resilience", 0.8),
];

pub fn default_emotional_state() -> EmotionalState {
    DEFAULT_PROFILE
        .iter()
        .map(|(name, intensity)| (name.to_string(), *intensity))
        .collect()
}

/// Turns the encrypted emotion blob into a state.
///
/// `Ok(None)` means no decryption was performed and the default profile
/// applies. An `Err` aborts the run.
pub trait EmotionCipher {
    fn decrypt(&self, blob: &[u8], secret: &Secret) -> Result<Option<EmotionalState>>;
}

/// No decryption scheme is defined for the blob yet; always falls back.
#[derive(Debug, Default, Clone, Copy)]
pub struct Undecrypted;

impl EmotionCipher for Undecrypted {
    fn decrypt(&self, _blob: &[u8], _secret: &Secret) -> Result<Option<EmotionalState>> {
        Ok(None)
    }
}
