//! File-backed settings store
//!
//! The store declares the host application's modules and options and holds
//! their current values. Imported values land in a staging buffer first;
//! `commit` applies the buffer to the stored values and persists the file.

use crate::error::{Result, SettexError};
use crate::registry::adapter::OptionRegistry;
use crate::registry::model::{ModuleDecl, OptionDecl, OptionView};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One buffered write, kept in arrival order until commit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagedWrite {
    pub module_id: String,
    pub option_key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    modules: BTreeMap<String, ModuleDecl>,
}

/// Settings store with a write-ahead staging buffer
#[derive(Debug, Default)]
pub struct SettingsStore {
    modules: BTreeMap<String, ModuleDecl>,
    staged: Vec<StagedWrite>,
    path: Option<PathBuf>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a store from its JSON document form
    pub fn from_json(contents: &str) -> Result<Self> {
        let file: StoreFile = serde_json::from_str(contents)?;
        Ok(Self {
            modules: file.modules,
            staged: Vec::new(),
            path: None,
        })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SettexError::store(format!("cannot read settings store {}: {e}", path.display()))
        })?;
        let mut store = Self::from_json(&contents)?;
        store.path = Some(path.to_path_buf());
        debug!(path = %path.display(), modules = store.modules.len(), "loaded settings store");
        Ok(store)
    }

    pub fn to_json(&self) -> Result<String> {
        let file = StoreFile {
            modules: self.modules.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| SettexError::store("settings store has no backing file"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    pub fn module(&self, module_id: &str) -> Option<&ModuleDecl> {
        self.modules.get(module_id)
    }

    pub fn modules(&self) -> impl Iterator<Item = (&String, &ModuleDecl)> {
        self.modules.iter()
    }

    /// Register a module declaration, replacing any previous one
    pub fn insert_module(&mut self, module_id: &str, module: ModuleDecl) {
        self.modules.insert(module_id.to_string(), module);
    }

    pub fn insert_option(&mut self, module_id: &str, option_key: &str, decl: OptionDecl) {
        self.modules
            .entry(module_id.to_string())
            .or_default()
            .options
            .insert(option_key.to_string(), decl);
    }

    pub fn staged_len(&self) -> usize {
        self.staged.len()
    }

    pub fn clear_staged(&mut self) {
        self.staged.clear();
    }

    /// Latest staged value for an option, if any
    fn staged_value(&self, module_id: &str, option_key: &str) -> Option<&Value> {
        self.staged
            .iter()
            .rev()
            .find(|w| w.module_id == module_id && w.option_key == option_key)
            .map(|w| &w.value)
    }

    /// Apply staged writes in arrival order, persist if file-backed, and
    /// return the number of writes applied.
    pub fn commit(&mut self) -> Result<usize> {
        let staged = std::mem::take(&mut self.staged);
        let applied = staged.len();
        for write in staged {
            match self
                .modules
                .get_mut(&write.module_id)
                .and_then(|m| m.options.get_mut(&write.option_key))
            {
                Some(decl) => decl.value = write.value,
                None => {
                    // stage_value already filters unknown targets
                    warn!(
                        module = %write.module_id,
                        option = %write.option_key,
                        "dropping staged write for vanished option"
                    );
                }
            }
        }
        if self.path.is_some() {
            self.save()?;
        }
        Ok(applied)
    }
}

impl OptionRegistry for SettingsStore {
    fn list_modules(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn get_option(&self, module_id: &str, option_key: &str) -> Option<OptionView> {
        let decl = self.modules.get(module_id)?.options.get(option_key)?;
        let value = self
            .staged_value(module_id, option_key)
            .cloned()
            .unwrap_or_else(|| decl.value.clone());
        Some(OptionView {
            kind: decl.kind,
            value,
            private: decl.private,
        })
    }

    fn stage_value(&mut self, module_id: &str, option_key: &str, value: Value) {
        let known = self
            .modules
            .get(module_id)
            .is_some_and(|m| m.options.contains_key(option_key));
        if !known {
            warn!(module = %module_id, option = %option_key, "ignoring staged write for unknown option");
            return;
        }
        self.staged.push(StagedWrite {
            module_id: module_id.to_string(),
            option_key: option_key.to_string(),
            value,
        });
    }

    fn has_module(&self, module_id: &str) -> bool {
        self.modules.contains_key(module_id)
    }
}
