//! Settings blob serialization
//!
//! Builds the portable JSON document from a resolved export spec: a manifest
//! describing who exported what and when, plus the option values themselves.

use crate::error::Result;
use crate::interchange::resolver::ExportTriple;
use crate::registry::OptionRegistry;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Export context snapshot, written once at serialization time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub exported: String,

    pub version: String,
}

impl Manifest {
    /// Stamp a manifest with the current time
    pub fn new(username: &str, version: &str) -> Self {
        Self {
            username: username.to_string(),
            exported: Utc::now().to_rfc2822(),
            version: version.to_string(),
        }
    }
}

/// One exported option value. Fields are optional on the wire; the importer
/// rejects incomplete entries individually instead of failing the blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionEntry {
    #[serde(rename = "moduleID", default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,

    #[serde(rename = "optionKey", default, skip_serializing_if = "Option::is_none")]
    pub option_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl OptionEntry {
    pub fn new(module_id: &str, option_key: &str, value: Value) -> Self {
        Self {
            module_id: Some(module_id.to_string()),
            option_key: Some(option_key.to_string()),
            value: Some(value),
        }
    }
}

/// The portable settings document: manifest plus ordered option values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsBlob {
    pub manifest: Manifest,
    pub options: Vec<OptionEntry>,
}

/// Who is exporting, and from which release
#[derive(Debug, Clone)]
pub struct ExportContext {
    pub username: String,
    pub version: String,
}

/// Read the current value of every resolved option and wrap the result as
/// a settings blob. Apart from the timestamp this is deterministic for a
/// given registry state and context.
pub fn build_blob(
    registry: &dyn OptionRegistry,
    triples: &[ExportTriple],
    context: &ExportContext,
) -> SettingsBlob {
    let options = triples
        .iter()
        .filter_map(|triple| {
            match registry.get_option(&triple.module_id, &triple.option_key) {
                Some(view) => Some(OptionEntry::new(&triple.module_id, &triple.option_key, view.value)),
                None => {
                    warn!(
                        module = %triple.module_id,
                        option = %triple.option_key,
                        "option disappeared between resolution and serialization"
                    );
                    None
                }
            }
        })
        .collect();

    SettingsBlob {
        manifest: Manifest::new(&context.username, &context.version),
        options,
    }
}

/// `build_blob` encoded as interchange text
pub fn serialize(
    registry: &dyn OptionRegistry,
    triples: &[ExportTriple],
    context: &ExportContext,
) -> Result<String> {
    Ok(serde_json::to_string(&build_blob(registry, triples, context))?)
}
