//! dot-organize manifest validator
//!
//! Validates manifests that organize source tables ("frames") around
//! shared business identifiers ("hooks"). A run turns a parsed
//! [`Manifest`] into a complete, deterministic list of diagnostics and a
//! single [`Outcome`].
//!
//! ## Pipeline
//!
//! ```text
//! YAML/JSON ──reader──▶ Manifest ──rules──▶ [Diagnostic] ──▶ Outcome
//!                          │
//!                          └─registry──▶ key identifiers, key sets
//! ```
//!
//! Structural problems (bad syntax, wrong types) stop at the reader.
//! Everything else is a diagnostic; the engine never fails fast.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod expression;
pub mod model;
pub mod naming;
pub mod present;
pub mod reader;
pub mod registry;
pub mod rules;
pub mod validate;

pub use config::ValidatorConfig;
pub use diagnostics::{Diagnostic, Outcome, Severity};
pub use error::{ManifestError, Result};
pub use expression::{classify, ExprClass};
pub use model::{Concept, Frame, FrameSource, Hook, HookRole, Manifest, Metadata, Settings};
pub use reader::{read_manifest_file, read_manifest_str, Format, ReadError};
pub use registry::{derive_key_identifiers, derive_key_sets, key_identifier, KeySet};
pub use validate::{validate, validate_file, validate_with, Report};
