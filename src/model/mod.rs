//! Typed manifest model
//!
//! The tree is built once per validation run (by the reader or by hand) and
//! only read afterwards. Shape checks that serde can express happen at
//! construction; everything semantic is left to the rule engine so a
//! malformed manifest still produces a complete diagnostic list.

mod concept;
mod frame;
mod manifest;

pub use concept::Concept;
pub use frame::{Frame, FrameSource, Hook, HookRole};
pub use manifest::{Manifest, Metadata, Settings, KNOWN_TOP_LEVEL_FIELDS};
