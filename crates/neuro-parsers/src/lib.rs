//! Python source extraction and call-graph resolution for neurocode.
//!
//! [`python`] walks a single file's tree-sitter AST into an unresolved
//! [`neuro_core::types::ModuleIR`]. [`resolver`] assigns dense repository-wide
//! ids across every extracted module and resolves call sites into
//! [`neuro_core::types::CallEdge`]s. [`build`] ties the two together into a
//! full-repository build: parallel per-file extraction over a worker pool,
//! then the resolver's two strictly-serial passes.

pub mod build;
pub mod python;
pub mod resolver;
pub mod walker;
