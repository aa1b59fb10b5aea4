//! Persona Core - Types and error handling shared by the bootstrap and its consumers

pub mod error;
pub mod types;

pub use error::{Access, BootError, Result};
pub use types::*;
