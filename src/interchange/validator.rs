//! Candidate blob validation
//!
//! Structural and version checks for text that claims to be a settings
//! blob. Per-entry problems are deliberately left to the import stager so
//! one bad entry cannot sink an otherwise usable blob.

use crate::interchange::serializer::SettingsBlob;
use crate::version;
use serde_json::Value;
use thiserror::Error;

/// Why a candidate was rejected as a whole
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlobRejection {
    #[error("not a settings blob: {0}")]
    ParseError(String),

    #[error("malformed settings blob: {0}")]
    MalformedBlob(String),

    #[error("settings blob is from another release (blob {found}, current {current})")]
    VersionMismatch { found: String, current: String },
}

/// Validate a candidate against the current application version
pub fn validate(candidate: &str) -> Result<SettingsBlob, BlobRejection> {
    validate_against(candidate, version::current_version())
}

/// Validate a candidate against an explicit version string.
///
/// Checks run in order: JSON well-formedness, presence of
/// `manifest.version`, version equality, then the full document shape.
/// There is no cross-version migration; a mismatch is reported, never
/// coerced.
pub fn validate_against(candidate: &str, current: &str) -> Result<SettingsBlob, BlobRejection> {
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| BlobRejection::ParseError(e.to_string()))?;

    let found = value
        .get("manifest")
        .and_then(|m| m.get("version"))
        .and_then(Value::as_str)
        .ok_or_else(|| BlobRejection::MalformedBlob("missing manifest.version".to_string()))?;

    if found != current {
        return Err(BlobRejection::VersionMismatch {
            found: found.to_string(),
            current: current.to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| BlobRejection::MalformedBlob(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURRENT: &str = "5.0.0";

    fn blob_text(version: &str) -> String {
        format!(
            r#"{{"manifest":{{"username":"bob","exported":"yesterday","version":"{version}"}},"options":[{{"moduleID":"m","optionKey":"k","value":1}}]}}"#
        )
    }

    #[test]
    fn test_rejects_non_json() {
        assert!(matches!(
            validate_against("not json", CURRENT),
            Err(BlobRejection::ParseError(_))
        ));
    }

    #[test]
    fn test_rejects_missing_version() {
        assert!(matches!(
            validate_against(r#"{"manifest":{}}"#, CURRENT),
            Err(BlobRejection::MalformedBlob(_))
        ));
        assert!(matches!(
            validate_against(r#"{"options":[]}"#, CURRENT),
            Err(BlobRejection::MalformedBlob(_))
        ));
    }

    #[test]
    fn test_rejects_version_mismatch() {
        let err = validate_against(&blob_text("9.9.9"), CURRENT).unwrap_err();
        assert_eq!(
            err,
            BlobRejection::VersionMismatch {
                found: "9.9.9".to_string(),
                current: CURRENT.to_string(),
            }
        );
    }

    #[test]
    fn test_accepts_matching_blob() {
        let blob = validate_against(&blob_text(CURRENT), CURRENT).unwrap();
        assert_eq!(blob.manifest.username, "bob");
        assert_eq!(blob.options.len(), 1);
    }

    #[test]
    fn test_accepts_blob_with_incomplete_entries() {
        // entry-level problems are the stager's concern
        let text = format!(
            r#"{{"manifest":{{"version":"{CURRENT}"}},"options":[{{"moduleID":"m"}}]}}"#
        );
        let blob = validate_against(&text, CURRENT).unwrap();
        assert_eq!(blob.options[0].option_key, None);
    }

    #[test]
    fn test_rejects_wrong_document_shape() {
        let text = format!(r#"{{"manifest":{{"version":"{CURRENT}"}},"options":{{}}}}"#);
        assert!(matches!(
            validate_against(&text, CURRENT),
            Err(BlobRejection::MalformedBlob(_))
        ));
    }

    #[test]
    fn test_default_validate_uses_release_version() {
        let text = blob_text(crate::version::current_version());
        assert!(validate(&text).is_ok());
    }
}
