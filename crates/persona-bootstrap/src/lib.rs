//! Persona Bootstrap: ordered, fail-fast initialization of a persona
//!
//! Reads a data store in eight dependent steps:
//! 1. identity (`KEY: value` lines)
//! 2. environment (store readable, writable, required files present)
//! 3. master memory, plus the optional compressed record
//! 4. security protocol (optional)
//! 5. data file listing
//! 6. emotional encoding, or the default profile
//! 7. integrity of the required fields
//! 8. completion
//!
//! The first failing step ends the run with the number of steps that
//! completed before it.

pub mod checksum;
pub mod compressed;
pub mod config;
pub mod delta;
pub mod emotion;
pub mod identity;
pub mod protocol;
pub mod scan;
pub mod store;
pub mod validate;

pub use config::BootstrapConfig;
pub use emotion::{default_emotional_state, EmotionCipher, Undecrypted};
pub use protocol::{bootstrap, Bootstrap, Phase};
pub use store::{DataStore, FsStore};
