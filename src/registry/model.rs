//! Settings store data model
//!
//! This module defines the declared shape of modules and their options,
//! plus the scalar/vector classification used when staging imported values.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Declared kind of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Text,
    Boolean,
    Integer,
    Enum,
    Color,
    /// Rows of structured values
    Table,
    /// Multiple selections from a fixed set
    Multi,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Text => "text",
            OptionKind::Boolean => "boolean",
            OptionKind::Integer => "integer",
            OptionKind::Enum => "enum",
            OptionKind::Color => "color",
            OptionKind::Table => "table",
            OptionKind::Multi => "multi",
        }
    }
}

/// Whether staged values replace the stored value or append to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    Vector,
}

impl ValueShape {
    /// Classify an option from its declared kind, falling back to the shape
    /// of its current value for options whose declaration predates the
    /// vector kinds.
    pub fn classify(kind: OptionKind, current_value: &Value) -> Self {
        match kind {
            OptionKind::Table | OptionKind::Multi => ValueShape::Vector,
            _ if current_value.is_array() => ValueShape::Vector,
            _ => ValueShape::Scalar,
        }
    }
}

/// A single option as declared in the settings store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionDecl {
    pub kind: OptionKind,

    #[serde(default)]
    pub value: Value,

    /// Excluded from exports unless the collection row opts in
    #[serde(default)]
    pub private: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionDecl {
    pub fn new(kind: OptionKind, value: Value) -> Self {
        Self {
            kind,
            value,
            private: false,
            description: None,
        }
    }

    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    pub fn shape(&self) -> ValueShape {
        ValueShape::classify(self.kind, &self.value)
    }
}

/// A module groups related options under one id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModuleDecl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub options: BTreeMap<String, OptionDecl>,
}

/// Read view of one option, as handed out by the registry adapter.
/// The value reflects any staged-but-uncommitted write.
#[derive(Debug, Clone)]
pub struct OptionView {
    pub kind: OptionKind,
    pub value: Value,
    pub private: bool,
}

impl OptionView {
    pub fn shape(&self) -> ValueShape {
        ValueShape::classify(self.kind, &self.value)
    }
}
