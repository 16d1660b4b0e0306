use thiserror::Error;

/// Main error type for settex operations
#[derive(Debug, Error)]
pub enum SettexError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Settings store error: {0}")]
    StoreError(String),

    #[error("Collection not found: {name}")]
    CollectionNotFound { name: String },

    #[error("Unknown module: {module_id}")]
    UnknownModule { module_id: String },

    #[error("Unknown option: {module_id}.{option_key}")]
    UnknownOption {
        module_id: String,
        option_key: String,
    },

    #[error("Invalid settings blob: {0}")]
    InvalidBlob(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl SettexError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn collection_not_found<S: Into<String>>(name: S) -> Self {
        Self::CollectionNotFound { name: name.into() }
    }

    pub fn unknown_module<S: Into<String>>(module_id: S) -> Self {
        Self::UnknownModule {
            module_id: module_id.into(),
        }
    }

    pub fn unknown_option<S: Into<String>>(module_id: S, option_key: S) -> Self {
        Self::UnknownOption {
            module_id: module_id.into(),
            option_key: option_key.into(),
        }
    }

    pub fn invalid_blob<S: Into<String>>(msg: S) -> Self {
        Self::InvalidBlob(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type alias for settex operations
pub type Result<T> = std::result::Result<T, SettexError>;
