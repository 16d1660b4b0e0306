//! Application version history
//!
//! Settings blobs are only compatible within a single release; the importer
//! compares a blob's manifest version against the latest entry here.

/// Released versions, oldest first. The last entry is the current release
/// and must match the crate version in Cargo.toml.
pub const VERSION_HISTORY: &[&str] = &["0.1.0", "0.2.0", "0.3.0", "0.3.1", "0.4.0"];

/// The version stamped into export manifests and checked on import.
pub fn current_version() -> &'static str {
    VERSION_HISTORY
        .last()
        .copied()
        .unwrap_or(env!("CARGO_PKG_VERSION"))
}
