//! Option registry
//!
//! Data model for modules/options, the adapter trait the interchange
//! pipeline is written against, and the file-backed store implementation.

pub mod adapter;
pub mod model;
pub mod store;

pub use adapter::OptionRegistry;
pub use model::{ModuleDecl, OptionDecl, OptionKind, OptionView, ValueShape};
pub use store::{SettingsStore, StagedWrite};
