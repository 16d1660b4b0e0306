//! Settings interchange pipeline
//!
//! Export resolution, blob serialization, discovery, validation, and staged
//! import. Everything here talks to the settings store through the
//! `OptionRegistry` trait and performs no IO of its own.

pub mod locator;
pub mod resolver;
pub mod serializer;
pub mod stager;
pub mod validator;

pub use locator::{BlobLocator, CodeBlockLocator, ScanCache, ScanReport, Scanner};
pub use resolver::{resolve, ExportCollectionRow, ExportTriple};
pub use serializer::{build_blob, serialize, ExportContext, Manifest, OptionEntry, SettingsBlob};
pub use stager::{stage, EntryError, EntryErrorKind, StageReport};
pub use validator::{validate, validate_against, BlobRejection};
