//! Persona Common - Shared types for the personad daemon
//!
//! Data model for analysis requests and persona results, the error
//! taxonomy, Ollama wire structs, and the capability interfaces
//! (authentication, authorization, rate limiting).

pub mod capability;
pub mod error;
pub mod types;
pub mod wire;

pub use error::*;
pub use types::*;
