//! Snapshot codec: the lossless JSON form of the session.
//!
//! The same payload serves as the autosave record, the "export data" download
//! and the import format.
//!
//! # Shapes
//! ```text
//! wrapped: { "version": 1, "exportedAt": "...", "dark": false, "compact": false, "form": { ...Resume } }
//! bare:    { ...Resume }
//! ```
//! The decoder treats any top-level object carrying a `form` key as wrapped.
//! Bare payloads come from older builds and carry no preferences.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Preferences, Resume};

/// Newest payload version this build writes and reads.
pub const SNAPSHOT_VERSION: u32 = 1;

/// The full restorable session state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub resume: Resume,
    pub preferences: Preferences,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot has an unexpected shape: {0}")]
    Shape(String),

    #[error("snapshot version {0} is newer than this build supports")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WrappedOut<'a> {
    version: u32,
    exported_at: DateTime<Utc>,
    dark: bool,
    compact: bool,
    form: &'a Resume,
}

#[derive(Deserialize)]
struct WrappedIn {
    #[serde(default = "legacy_version")]
    version: u32,
    #[serde(default)]
    dark: bool,
    #[serde(default)]
    compact: bool,
    form: Resume,
}

/// Wrapped payloads written before versioning carried no tag.
fn legacy_version() -> u32 {
    SNAPSHOT_VERSION
}

/// Serializes the resume and preferences as pretty-printed wrapped JSON.
pub fn serialize(resume: &Resume, preferences: &Preferences) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(&WrappedOut {
        version: SNAPSHOT_VERSION,
        exported_at: Utc::now(),
        dark: preferences.dark,
        compact: preferences.compact,
        form: resume,
    })
}

/// Decodes a wrapped or bare payload.
pub fn deserialize(bytes: &[u8]) -> Result<Snapshot, DecodeError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    let wrapped = value
        .as_object()
        .map(|object| object.contains_key("form"))
        .ok_or_else(|| DecodeError::Shape("top level is not an object".to_string()))?;

    if wrapped {
        let envelope: WrappedIn =
            serde_json::from_value(value).map_err(|e| DecodeError::Shape(e.to_string()))?;
        if envelope.version > SNAPSHOT_VERSION {
            return Err(DecodeError::UnsupportedVersion(envelope.version));
        }
        Ok(Snapshot {
            resume: envelope.form,
            preferences: Preferences {
                dark: envelope.dark,
                compact: envelope.compact,
            },
        })
    } else {
        let resume: Resume =
            serde_json::from_value(value).map_err(|e| DecodeError::Shape(e.to_string()))?;
        Ok(Snapshot {
            resume,
            preferences: Preferences::default(),
        })
    }
}
