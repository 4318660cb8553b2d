//! personad - API persona analysis daemon
//!
//! Accepts endpoint descriptions or OpenAPI references over HTTP,
//! analyzes them with a local Ollama model (deterministic mock
//! fallback when it is unreachable), and parses the output into a
//! structured persona record.

pub mod analyzer;
pub mod config;
pub mod mock;
pub mod ollama;
pub mod parser;
pub mod routes;
pub mod server;
