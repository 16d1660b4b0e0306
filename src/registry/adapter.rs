//! Registry adapter interface
//!
//! The interchange pipeline never touches the settings store directly; it
//! goes through this trait so the core stays testable without a real store
//! on disk.

use super::model::OptionView;
use serde_json::Value;

pub trait OptionRegistry {
    /// Ids of all known modules
    fn list_modules(&self) -> Vec<String>;

    /// Look up one option; `None` when the module or option is unknown
    fn get_option(&self, module_id: &str, option_key: &str) -> Option<OptionView>;

    /// Buffer a value write. Writes targeting unknown options are dropped;
    /// callers are expected to validate first.
    fn stage_value(&mut self, module_id: &str, option_key: &str, value: Value);

    fn has_module(&self, module_id: &str) -> bool {
        self.list_modules().iter().any(|m| m == module_id)
    }
}
