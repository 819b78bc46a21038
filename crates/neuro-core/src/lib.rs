//! Core types, the on-disk TOON format, configuration, and error taxonomy
//! shared across all neurocode crates:
//! - [`types`] — the Repository Intermediate Representation (modules, classes, functions, edges)
//! - [`toon`] — the line-oriented tabular serializer/parser for `.neurocode/*.toon` documents
//! - [`config`] — configuration loading from `neurocode.toml`
//! - [`hash`] — deterministic content hashing (base62 of xxhash64)
//! - [`error`] — the engine's closed error taxonomy
//! - [`clock`] — dependency-free UTC timestamps for build metadata and history

pub mod clock;
pub mod config;
pub mod error;
pub mod hash;
pub mod toon;
pub mod types;

pub use error::{NeurocodeError, Result};
