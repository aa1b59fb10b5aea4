//! The eight-step bootstrap protocol
//!
//! ```text
//! NotStarted → 1 → 2 → … → 8 → Completed
//!                  ╰── any failure ──→ Failed(step)
//! ```
//!
//! Steps run strictly in order. The first failure is terminal: nothing later
//! runs and no partial state leaves the machine.

use crate::checksum;
use crate::compressed::decode_compressed;
use crate::config::BootstrapConfig;
use crate::delta::{Delta, Draft};
use crate::emotion::{default_emotional_state, EmotionCipher, Undecrypted};
use crate::identity::parse_identity;
use crate::scan::matching_files;
use crate::store::{DataStore, FsStore};
use crate::validate::require_fields;
use persona_core::{
    memory_keys, BootError, MemoryValue, ProtocolResult, Result, Secret, Step,
};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

/// Where the machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress { completed: u8 },
    Completed,
    Failed { step: Step },
}

/// One bootstrap run over one data store.
pub struct Bootstrap<S: DataStore> {
    store: S,
    config: BootstrapConfig,
    secret: Option<Secret>,
    cipher: Box<dyn EmotionCipher>,
    draft: Draft,
    completed: u8,
    phase: Phase,
}

impl<S: DataStore> Bootstrap<S> {
    pub fn new(store: S, config: BootstrapConfig, secret: Option<Secret>) -> Self {
        Self {
            store,
            config,
            secret,
            cipher: Box::new(Undecrypted),
            draft: Draft::default(),
            completed: 0,
            phase: Phase::NotStarted,
        }
    }

    /// Replace the emotion decryption scheme.
    pub fn with_cipher(mut self, cipher: impl EmotionCipher + 'static) -> Self {
        self.cipher = Box::new(cipher);
        self
    }

    pub fn steps_completed(&self) -> u8 {
        self.completed
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The step `run_step` will accept next, if any.
    pub fn next_step(&self) -> Option<Step> {
        match self.phase {
            Phase::NotStarted | Phase::InProgress { .. } => Step::from_number(self.completed + 1),
            Phase::Completed | Phase::Failed { .. } => None,
        }
    }

    /// Run exactly one step. Anything but the next step in sequence is
    /// refused with `IncompleteSequence`. Any error is terminal.
    pub fn run_step(&mut self, step: Step) -> Result<()> {
        let outcome = self.try_step(step);
        match &outcome {
            Ok(()) => {
                self.completed += 1;
                self.phase = if step == Step::DeclareComplete {
                    Phase::Completed
                } else {
                    Phase::InProgress {
                        completed: self.completed,
                    }
                };
                info!("step {} complete", step);
            }
            Err(_) => self.phase = Phase::Failed { step },
        }
        outcome
    }

    fn try_step(&mut self, step: Step) -> Result<()> {
        if self.next_step() != Some(step) {
            return Err(BootError::IncompleteSequence {
                step: step.number(),
                completed: self.completed,
            });
        }
        info!("step {}: {}", step, step.label());

        let delta = match step {
            Step::LoadIdentity => self.load_identity()?,
            Step::VerifyEnvironment => self.verify_environment()?,
            Step::LoadMemory => self.load_memory()?,
            Step::LoadSecurity => self.load_security()?,
            Step::AnalyzeFiles => self.analyze_files(),
            Step::LoadEmotions => self.load_emotions()?,
            Step::IntegrityCheck => self.integrity_check()?,
            Step::DeclareComplete => self.declare_complete()?,
        };
        for w in self.draft.merge(step, delta)? {
            warn!("{}", w);
        }
        Ok(())
    }

    /// Drive all eight steps and fold the outcome.
    pub fn execute(mut self) -> ProtocolResult {
        let span = info_span!("bootstrap", run = %Uuid::new_v4(), store = %self.store.location());
        let _guard = span.enter();
        info!("starting bootstrap protocol");

        for step in Step::ALL {
            if let Err(e) = self.run_step(step) {
                error!("bootstrap failed at step {}: {}", step, e);
                return ProtocolResult::Failure {
                    steps_completed: self.completed,
                    step,
                    error: e,
                };
            }
        }

        ProtocolResult::Success(self.draft.into_state())
    }

    // ============================================================
    // Steps
    // ============================================================

    fn load_identity(&self) -> Result<Delta> {
        let file = &self.config.files.identity;
        if !self.store.exists(file) {
            return Err(BootError::missing_file(file));
        }
        let parsed = parse_identity(&self.store.read_text(file)?);

        let mut delta = Delta::new();
        for key in &parsed.duplicates {
            delta.warn(format!("{} sets `{}` more than once; last value kept", file, key));
        }
        info!(
            "I am {}",
            parsed.identity.get("name").map(String::as_str).unwrap_or("Unknown")
        );
        Ok(delta.with_identity(parsed.identity))
    }

    fn verify_environment(&self) -> Result<Delta> {
        self.store.check_readable()?;
        self.store.check_writable()?;

        let missing = require_fields("store", self.config.required_files(), |f| {
            self.store.exists(f)
        });
        if let Some(first) = missing.into_iter().next() {
            return Err(BootError::missing_file(first.key));
        }
        Ok(Delta::new())
    }

    fn load_memory(&self) -> Result<Delta> {
        let files = &self.config.files;
        let master = self.store.read_text(&files.memory)?;
        let mut delta = Delta::new().with_memory(memory_keys::MASTER, MemoryValue::Text(master));

        if self.store.exists(&files.compressed) {
            let blob = self.store.read_bytes(&files.compressed)?;
            let record = decode_compressed(&files.compressed, &blob)?;
            info!("loaded compressed memory ({} entries)", record.len());
            delta = delta.with_memory(memory_keys::COMPRESSED, MemoryValue::Structured(record));
        }
        Ok(delta)
    }

    fn load_security(&self) -> Result<Delta> {
        let file = &self.config.files.security;
        if !self.store.exists(file) {
            info!("no {} in store, skipping", file);
            return Ok(Delta::new());
        }
        let text = self.store.read_text(file)?;
        Ok(Delta::new().with_memory(memory_keys::SECURITY, MemoryValue::Text(text)))
    }

    fn analyze_files(&self) -> Delta {
        let mut delta = Delta::new();
        let names = self.store.file_names().unwrap_or_else(|e| {
            delta.warn(format!("could not list data files: {}", e));
            Vec::new()
        });
        let files = matching_files(names, &self.config.scan.extensions);
        info!("found {} files in data directory", files.len());
        delta.with_memory(memory_keys::ALL_FILES, MemoryValue::Files(files))
    }

    fn load_emotions(&self) -> Result<Delta> {
        let file = &self.config.files.emotions;
        let mut delta = Delta::new();

        let decrypted = if !self.store.exists(file) {
            delta.warn(format!("{} not found, using default emotional profile", file));
            None
        } else if let Some(secret) = &self.secret {
            match self.store.read_bytes(file) {
                Ok(blob) => {
                    let state = self.cipher.decrypt(&blob, secret)?;
                    if state.is_none() {
                        delta.warn(format!(
                            "{} was not decrypted, using default emotional profile",
                            file
                        ));
                    }
                    state
                }
                Err(e) => {
                    delta.warn(format!("cannot read {}: {}; using default emotional profile", file, e));
                    None
                }
            }
        } else {
            delta.warn("no passphrase provided, emotional codes not decrypted");
            None
        };

        Ok(delta.with_emotions(decrypted.unwrap_or_else(default_emotional_state)))
    }

    fn integrity_check(&self) -> Result<Delta> {
        let integrity = &self.config.integrity;
        let identity = &self.draft.identity;
        let memory = &self.draft.memory;

        let mut missing = require_fields(
            "identity",
            integrity.identity_fields.iter().map(String::as_str),
            |k| identity.get(k).map_or(false, |v| !v.is_empty()),
        );
        missing.extend(require_fields(
            "memory",
            integrity.memory_fields.iter().map(String::as_str),
            |k| memory.get(k).map_or(false, |v| !v.is_empty()),
        ));
        if !missing.is_empty() {
            return Err(BootError::IntegrityError {
                missing: missing.iter().map(ToString::to_string).collect(),
            });
        }

        let mut delta = Delta::new();
        if let Some(security) = memory.security() {
            let declared = checksum::parse_declared(security);
            for problem in checksum::verify_declared(&self.store, &declared) {
                delta.warn(problem);
            }
        }
        Ok(delta)
    }

    fn declare_complete(&self) -> Result<Delta> {
        let expected = Step::COUNT - 1;
        if self.completed != expected {
            return Err(BootError::IncompleteSequence {
                step: Step::DeclareComplete.number(),
                completed: self.completed,
            });
        }
        let field = |k: &str| self.draft.identity.get(k).cloned().unwrap_or_default();
        info!(
            persona = %field("name"),
            creator = %field("creator"),
            mission = %field("mission"),
            "bootstrap complete, ready for interaction"
        );
        Ok(Delta::new())
    }
}

/// Run the protocol against the directory named in `config`.
pub fn bootstrap(config: &BootstrapConfig, secret: Option<Secret>) -> ProtocolResult {
    let store = FsStore::new(&config.data_dir);
    Bootstrap::new(store, config.clone(), secret).execute()
}
