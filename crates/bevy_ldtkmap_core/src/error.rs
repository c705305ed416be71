//! Errors raised while building or loading the typed project graph.

use std::fmt;
use std::sync::Arc;

use bevy_ldtkmap_assets::fetch::FetchError;
use thiserror::Error;

use crate::field::FieldKind;

/// What kind of id a [`LdtkError::DanglingReference`] failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// A neighbour entry's `levelUid`
    Level,
    /// The enum named by a field type string
    Enum,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Level => write!(f, "level"),
            ReferenceKind::Enum => write!(f, "enum"),
        }
    }
}

/// Error type for the typed project graph.
///
/// Cloneable so a failed external level load can be handed to every caller
/// that was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum LdtkError {
    /// A field's type string does not follow `[Array<](Scalar|LocalEnum.X|ExternalEnum.X)[>]`.
    #[error("Malformed type '{type_name}' on field '{field}' of '{owner}'")]
    MalformedFieldType {
        field: String,
        owner: String,
        type_name: String,
    },

    /// A field's raw value does not have the JSON shape its type declares.
    #[error("Field '{field}' of '{owner}' does not hold a valid {expected} value")]
    FieldValueMismatch {
        field: String,
        owner: String,
        expected: FieldKind,
    },

    /// An id that the format guarantees to exist resolved to nothing.
    #[error("Unknown {kind} '{id}' referenced by '{referrer}'")]
    DanglingReference {
        kind: ReferenceKind,
        id: String,
        referrer: String,
    },

    /// A layer instance whose `__type` is not one of the four layer kinds.
    #[error("Layer '{layer}' has unknown type '{kind}'")]
    UnknownLayerKind { layer: String, kind: String },

    /// No level with this identifier exists in the project.
    #[error("Level '{0}' not found")]
    LevelNotFound(String),

    /// A level record that should carry layer data does not.
    #[error("Level '{0}' has no layer instances")]
    MissingLayerData(String),

    /// An external level was requested from a world with no way to fetch it.
    #[error("Level '{0}' is stored externally but the world has no level source")]
    NoLevelSource(String),

    #[error("Failed to fetch '{path}': {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("Failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// One or more levels failed during a bulk load. Levels that loaded are kept.
    #[error("Failed to load {} level(s): {}", .0.len(), failed_identifiers(.0))]
    LevelsFailed(Vec<(String, LdtkError)>),
}

fn failed_identifiers(failures: &[(String, LdtkError)]) -> String {
    failures
        .iter()
        .map(|(identifier, _)| identifier.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

impl LdtkError {
    /// Identifiers of the levels that failed, for [`LdtkError::LevelsFailed`].
    pub fn failed_levels(&self) -> Vec<&str> {
        match self {
            LdtkError::LevelsFailed(failures) => {
                failures.iter().map(|(identifier, _)| identifier.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl From<bevy_ldtkmap_assets::path::PathError> for LdtkError {
    fn from(error: bevy_ldtkmap_assets::path::PathError) -> Self {
        match error {
            bevy_ldtkmap_assets::path::PathError::InvalidPath(path) => LdtkError::InvalidPath(path),
        }
    }
}
