//! Itinerary engine error types.
//!
//! Routing failures deliberately do not appear here: the engine absorbs
//! them into estimated legs instead of failing the mutation that needed
//! the route.

use std::fmt;

/// The kind of entity an operation failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Trip,
    Stint,
    Stop,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Trip => "trip",
            EntityKind::Stint => "stint",
            EntityKind::Stop => "stop",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by itinerary mutations and queries.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// A referenced entity does not exist
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: String },

    /// The acting user may not do this, or a structural rule was violated
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request contradicts itself or the current state
    #[error("conflict: {0}")]
    Conflict(String),
}

impl EngineError {
    /// Convenience constructor for missing entities.
    pub fn not_found(kind: EntityKind, id: impl fmt::Display) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
