//! Export spec resolution
//!
//! Expands the user-authored collection rows into one (module, option key,
//! include-private) triple per exported option. Rows referencing unknown
//! modules or options are logged and dropped; nothing here aborts an export.

use crate::registry::OptionRegistry;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One row of the user's export collection table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportCollectionRow {
    /// Name of the collection this row belongs to
    pub collection: String,

    pub module_id: String,

    /// Comma-separated option keys of that module
    pub option_keys: String,

    /// Export options marked private as well
    #[serde(default)]
    pub include_private: bool,
}

/// Unrolled form of a collection row: one exported option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportTriple {
    pub module_id: String,
    pub option_key: String,
    pub include_private: bool,
}

/// Expand and filter the rows of one collection.
///
/// Row order is preserved, then key order within each row. Unknown modules
/// and options are dropped with a warning; private options are dropped
/// silently unless the row opts in.
pub fn resolve(
    registry: &dyn OptionRegistry,
    rows: &[ExportCollectionRow],
    collection: &str,
) -> Vec<ExportTriple> {
    let unrolled = rows
        .iter()
        .filter(|row| row.collection == collection)
        .flat_map(|row| {
            row.option_keys.split(',').map(|key| ExportTriple {
                module_id: row.module_id.clone(),
                option_key: key.trim().to_string(),
                include_private: row.include_private,
            })
        });

    unrolled
        .filter(|triple| {
            if !registry.has_module(&triple.module_id) {
                warn!(module = %triple.module_id, "skipping export row: unknown module");
                return false;
            }
            let option = match registry.get_option(&triple.module_id, &triple.option_key) {
                Some(option) => option,
                None => {
                    warn!(
                        module = %triple.module_id,
                        option = %triple.option_key,
                        "skipping export row: unknown option"
                    );
                    return false;
                }
            };
            // policy filter, not an error
            if option.private && !triple.include_private {
                return false;
            }
            true
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{OptionDecl, OptionKind, SettingsStore};
    use serde_json::json;

    fn registry() -> SettingsStore {
        let mut store = SettingsStore::new();
        store.insert_option(
            "keyboardNav",
            "focusBorder",
            OptionDecl::new(OptionKind::Text, json!("#ff0000")),
        );
        store.insert_option(
            "keyboardNav",
            "commentsNav",
            OptionDecl::new(OptionKind::Boolean, json!(true)),
        );
        store.insert_option(
            "keyboardNav",
            "scrollStyle",
            OptionDecl::new(OptionKind::Enum, json!("directional")),
        );
        store.insert_option(
            "accounts",
            "apiToken",
            OptionDecl::new(OptionKind::Text, json!("s3cret")).private(),
        );
        store
    }

    fn row(collection: &str, module_id: &str, keys: &str, include_private: bool) -> ExportCollectionRow {
        ExportCollectionRow {
            collection: collection.to_string(),
            module_id: module_id.to_string(),
            option_keys: keys.to_string(),
            include_private,
        }
    }

    #[test]
    fn test_unrolls_keys_in_order() {
        let rows = vec![row("nav", "keyboardNav", "focusBorder,commentsNav,scrollStyle", false)];
        let triples = resolve(&registry(), &rows, "nav");
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].option_key, "focusBorder");
        assert_eq!(triples[1].option_key, "commentsNav");
        assert_eq!(triples[2].option_key, "scrollStyle");
        assert!(triples.iter().all(|t| t.module_id == "keyboardNav"));
        assert!(triples.iter().all(|t| !t.include_private));
    }

    #[test]
    fn test_filters_by_collection_name() {
        let rows = vec![
            row("nav", "keyboardNav", "focusBorder", false),
            row("other", "keyboardNav", "commentsNav", false),
        ];
        let triples = resolve(&registry(), &rows, "nav");
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].option_key, "focusBorder");
    }

    #[test]
    fn test_unknown_module_yields_no_triples() {
        let rows = vec![row("nav", "noSuchModule", "a,b,c", false)];
        assert!(resolve(&registry(), &rows, "nav").is_empty());
    }

    #[test]
    fn test_unknown_option_is_dropped_not_fatal() {
        let rows = vec![row("nav", "keyboardNav", "focusBorder,bogus,commentsNav", false)];
        let triples = resolve(&registry(), &rows, "nav");
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[0].option_key, "focusBorder");
        assert_eq!(triples[1].option_key, "commentsNav");
    }

    #[test]
    fn test_private_option_dropped_unless_opted_in() {
        let rows = vec![row("all", "accounts", "apiToken", false)];
        assert!(resolve(&registry(), &rows, "all").is_empty());

        let rows = vec![row("all", "accounts", "apiToken", true)];
        let triples = resolve(&registry(), &rows, "all");
        assert_eq!(triples.len(), 1);
        assert!(triples[0].include_private);
    }

    #[test]
    fn test_row_order_preserved_across_rows() {
        let rows = vec![
            row("mix", "accounts", "apiToken", true),
            row("mix", "keyboardNav", "commentsNav,focusBorder", false),
        ];
        let triples = resolve(&registry(), &rows, "mix");
        let keys: Vec<&str> = triples.iter().map(|t| t.option_key.as_str()).collect();
        assert_eq!(keys, vec!["apiToken", "commentsNav", "focusBorder"]);
    }
}
