//! Staged import of validated blobs
//!
//! Walks a blob's entries in order and buffers each value into the registry.
//! Entry problems are recorded and skipped; an entry later in the blob is
//! still applied when an earlier one is rejected. Committing the buffered
//! writes is the caller's concern.

use crate::interchange::serializer::SettingsBlob;
use crate::registry::{OptionRegistry, ValueShape};
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// Why one entry was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryErrorKind {
    MissingField(&'static str),
    UnknownModule(String),
    UnknownOption(String, String),
}

/// A skipped entry, by position in the blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryError {
    pub index: usize,
    pub kind: EntryErrorKind,
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EntryErrorKind::MissingField(field) => {
                write!(f, "entry {}: missing field '{}'", self.index, field)
            }
            EntryErrorKind::UnknownModule(module_id) => {
                write!(f, "entry {}: unknown module '{}'", self.index, module_id)
            }
            EntryErrorKind::UnknownOption(module_id, option_key) => {
                write!(
                    f,
                    "entry {}: unknown option '{}.{}'",
                    self.index, module_id, option_key
                )
            }
        }
    }
}

/// Outcome of staging one blob
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageReport {
    pub applied: usize,
    pub skipped: Vec<EntryError>,
}

impl StageReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Stage every entry of a validated blob into the registry.
///
/// Scalar options are overwritten outright; vector options get the imported
/// value appended to the current array. Reads go through the registry view,
/// so repeated appends to the same option within one blob compound.
pub fn stage(registry: &mut dyn OptionRegistry, blob: &SettingsBlob) -> StageReport {
    let mut report = StageReport::default();

    for (index, entry) in blob.options.iter().enumerate() {
        let skip = |kind: EntryErrorKind| {
            warn!(index, error = %EntryError { index, kind: kind.clone() }, "skipping settings entry");
            EntryError { index, kind }
        };

        let module_id = match entry.module_id.as_deref() {
            Some(id) if !id.is_empty() => id,
            _ => {
                report.skipped.push(skip(EntryErrorKind::MissingField("moduleID")));
                continue;
            }
        };
        let option_key = match entry.option_key.as_deref() {
            Some(key) if !key.is_empty() => key,
            _ => {
                report.skipped.push(skip(EntryErrorKind::MissingField("optionKey")));
                continue;
            }
        };
        let value = match &entry.value {
            Some(value) => value,
            None => {
                report.skipped.push(skip(EntryErrorKind::MissingField("value")));
                continue;
            }
        };

        if !registry.has_module(module_id) {
            report
                .skipped
                .push(skip(EntryErrorKind::UnknownModule(module_id.to_string())));
            continue;
        }
        let view = match registry.get_option(module_id, option_key) {
            Some(view) => view,
            None => {
                report.skipped.push(skip(EntryErrorKind::UnknownOption(
                    module_id.to_string(),
                    option_key.to_string(),
                )));
                continue;
            }
        };

        let staged = match view.shape() {
            ValueShape::Scalar => value.clone(),
            ValueShape::Vector => {
                let mut items = view.value.as_array().cloned().unwrap_or_default();
                items.push(value.clone());
                Value::Array(items)
            }
        };

        registry.stage_value(module_id, option_key, staged);
        report.applied += 1;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::serializer::{Manifest, OptionEntry, SettingsBlob};
    use crate::registry::{OptionDecl, OptionKind, OptionRegistry, SettingsStore};
    use serde_json::json;

    fn registry() -> SettingsStore {
        let mut store = SettingsStore::new();
        store.insert_option(
            "keyboardNav",
            "focusBorder",
            OptionDecl::new(OptionKind::Text, json!("#ff0000")),
        );
        store.insert_option(
            "filters",
            "keywords",
            OptionDecl::new(OptionKind::Table, json!([["spoiler"]])),
        );
        store.insert_option(
            "filters",
            "legacyList",
            // scalar-declared, array-valued: duck-typed vector
            OptionDecl::new(OptionKind::Text, json!(["old"])),
        );
        store
    }

    fn blob(entries: Vec<OptionEntry>) -> SettingsBlob {
        SettingsBlob {
            manifest: Manifest::new("tester", "0.4.0"),
            options: entries,
        }
    }

    #[test]
    fn test_scalar_overwrite() {
        let mut store = registry();
        let report = stage(
            &mut store,
            &blob(vec![OptionEntry::new("keyboardNav", "focusBorder", json!("#0000ff"))]),
        );
        assert_eq!(report.applied, 1);
        assert!(report.is_clean());
        assert_eq!(
            store.get_option("keyboardNav", "focusBorder").unwrap().value,
            json!("#0000ff")
        );
    }

    #[test]
    fn test_vector_append_not_replace() {
        let mut store = registry();
        let report = stage(
            &mut store,
            &blob(vec![OptionEntry::new("filters", "keywords", json!(["nsfw"]))]),
        );
        assert_eq!(report.applied, 1);
        assert_eq!(
            store.get_option("filters", "keywords").unwrap().value,
            json!([["spoiler"], ["nsfw"]])
        );
    }

    #[test]
    fn test_duck_typed_vector_appends() {
        let mut store = registry();
        stage(
            &mut store,
            &blob(vec![OptionEntry::new("filters", "legacyList", json!("new"))]),
        );
        assert_eq!(
            store.get_option("filters", "legacyList").unwrap().value,
            json!(["old", "new"])
        );
    }

    #[test]
    fn test_double_stage_appends_twice() {
        let mut store = registry();
        let entries = vec![
            OptionEntry::new("filters", "keywords", json!(["a"])),
            OptionEntry::new("filters", "keywords", json!(["b"])),
        ];
        let report = stage(&mut store, &blob(entries));
        assert_eq!(report.applied, 2);
        assert_eq!(
            store.get_option("filters", "keywords").unwrap().value,
            json!([["spoiler"], ["a"], ["b"]])
        );
    }

    #[test]
    fn test_bad_entry_skipped_later_entry_applied() {
        let mut store = registry();
        let entries = vec![
            OptionEntry::new("keyboardNav", "focusBorder", json!("#111111")),
            OptionEntry {
                module_id: Some("keyboardNav".to_string()),
                option_key: None,
                value: Some(json!(true)),
            },
            OptionEntry::new("keyboardNav", "focusBorder", json!("#222222")),
        ];
        let report = stage(&mut store, &blob(entries));
        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
        assert_eq!(
            report.skipped[0].kind,
            EntryErrorKind::MissingField("optionKey")
        );
        assert_eq!(
            store.get_option("keyboardNav", "focusBorder").unwrap().value,
            json!("#222222")
        );
    }

    #[test]
    fn test_unknown_module_and_option_recorded() {
        let mut store = registry();
        let entries = vec![
            OptionEntry::new("noSuchModule", "x", json!(1)),
            OptionEntry::new("filters", "noSuchOption", json!(1)),
        ];
        let report = stage(&mut store, &blob(entries));
        assert_eq!(report.applied, 0);
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(report.skipped[0].kind, EntryErrorKind::UnknownModule(_)));
        assert!(matches!(report.skipped[1].kind, EntryErrorKind::UnknownOption(_, _)));
    }

    #[test]
    fn test_nothing_committed_by_stager() {
        let mut store = registry();
        stage(
            &mut store,
            &blob(vec![OptionEntry::new("keyboardNav", "focusBorder", json!("#333333"))]),
        );
        assert_eq!(store.staged_len(), 1);
        assert_eq!(
            store.module("keyboardNav").unwrap().options["focusBorder"].value,
            json!("#ff0000")
        );
    }
}
