//! Step outputs and the write-once merge
//!
//! Steps never touch the accumulated state. Each returns a [`Delta`] with
//! only the keys it contributes; [`Draft::merge`] applies it and refuses
//! any key an earlier step already set.

use persona_core::{
    BootError, EmotionalState, Identity, Memory, MemoryValue, PersonaState, Record, Result, Step,
};

/// What one step adds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delta {
    pub identity: Vec<(String, String)>,
    pub memory: Vec<(String, MemoryValue)>,
    pub emotions: Vec<(String, f64)>,
    pub warnings: Vec<String>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity.extend(identity);
        self
    }

    pub fn with_memory(mut self, key: &str, value: MemoryValue) -> Self {
        self.memory.push((key.to_string(), value));
        self
    }

    pub fn with_emotions(mut self, emotions: EmotionalState) -> Self {
        self.emotions.extend(emotions);
        self
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// State accumulated across the steps of one run.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub identity: Identity,
    pub memory: Memory,
    pub emotional_state: EmotionalState,
    pub warnings: Vec<String>,
}

impl Draft {
    /// Apply `delta` as contributed by `step`. Either every key lands or,
    /// on the first conflict, nothing does. Returns the warnings that landed.
    pub fn merge(&mut self, step: Step, delta: Delta) -> Result<&[String]> {
        let identity = merge_into(&self.identity, delta.identity, "identity", step)?;
        let memory = merge_into(&self.memory, delta.memory, "memory", step)?;
        let emotional_state =
            merge_into(&self.emotional_state, delta.emotions, "emotional_state", step)?;

        self.identity = identity;
        self.memory = memory;
        self.emotional_state = emotional_state;
        let first = self.warnings.len();
        self.warnings.extend(delta.warnings);
        Ok(&self.warnings[first..])
    }

    pub fn into_state(self) -> PersonaState {
        PersonaState {
            identity: self.identity,
            memory: self.memory,
            emotional_state: self.emotional_state,
            warnings: self.warnings,
        }
    }
}

fn merge_into<V: Clone>(
    current: &Record<V>,
    entries: Vec<(String, V)>,
    entity: &str,
    step: Step,
) -> Result<Record<V>> {
    let mut next = current.clone();
    for (key, value) in entries {
        next.insert_new(key, value)
            .map_err(|key| BootError::key_conflict(entity, key, step.number()))?;
    }
    Ok(next)
}
