//! Error types for the Megaverse environment abstraction.

use crate::types::{MapKind, ObjectKind};
use thiserror::Error;

/// Errors raised by collaborators (remote API, simulator) and by decoding
/// remote payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// A goal or current map could not be retrieved or decoded
    #[error("Unable to retrieve {map} map: {message}")]
    MapFetch { map: MapKind, message: String },

    /// A create call for one object failed
    #[error("Unable to create {kind}: {message}")]
    Create { kind: ObjectKind, message: String },

    /// A delete call for one object failed
    #[error("Unable to delete {kind}: {message}")]
    Delete { kind: ObjectKind, message: String },

    /// Grid rows are ragged or not square
    #[error("Malformed grid: {0}")]
    MalformedGrid(String),

    /// A goal label names no known entity
    #[error("Unknown entity type: {0}")]
    UnknownEntityKind(String),
}

impl EnvError {
    /// Creates a map retrieval error.
    pub fn map_fetch(map: MapKind, msg: impl std::fmt::Display) -> Self {
        Self::MapFetch {
            map,
            message: msg.to_string(),
        }
    }

    /// Creates a per-kind create error.
    pub fn create(kind: ObjectKind, msg: impl std::fmt::Display) -> Self {
        Self::Create {
            kind,
            message: msg.to_string(),
        }
    }

    /// Creates a per-kind delete error.
    pub fn delete(kind: ObjectKind, msg: impl std::fmt::Display) -> Self {
        Self::Delete {
            kind,
            message: msg.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_use_remote_vocabulary() {
        let err = EnvError::create(ObjectKind::Polyanet, "Request failed with status code 500");
        assert_eq!(
            err.to_string(),
            "Unable to create polyanet: Request failed with status code 500"
        );

        let err = EnvError::map_fetch(MapKind::Goal, "timeout");
        assert_eq!(err.to_string(), "Unable to retrieve goal map: timeout");

        let err = EnvError::delete(ObjectKind::Cometh, "gone");
        assert_eq!(err.to_string(), "Unable to delete cometh: gone");
    }
}
