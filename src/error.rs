//! Engine errors.
//!
//! Illegal player actions never produce an error; they leave state
//! unchanged. Errors here mean the content tables or a persisted snapshot
//! are corrupt.

/// Fatal engine error.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Card id not present in the catalog
    #[error("unknown card definition: {0}")]
    UnknownCard(String),

    /// Enemy id not present in the catalog
    #[error("unknown enemy definition: {0}")]
    UnknownEnemy(String),

    /// Enemy pack id not present in the catalog
    #[error("unknown enemy pack: {0}")]
    UnknownPack(String),

    /// Ally id not present in the catalog
    #[error("unknown ally definition: {0}")]
    UnknownAlly(String),

    /// Relic id not present in the catalog
    #[error("unknown relic definition: {0}")]
    UnknownRelic(String),

    /// Item id not present in the catalog
    #[error("unknown item definition: {0}")]
    UnknownItem(String),

    /// Special event id not present in the catalog
    #[error("unknown event definition: {0}")]
    UnknownEvent(String),

    /// A pool the engine must draw from is empty
    #[error("empty content pool: {0}")]
    EmptyPool(&'static str),

    /// Content or state JSON failed to parse or encode
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// State could not be encoded for hashing
    #[error("state encoding error: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// Engine result type.
pub type Result<T> = std::result::Result<T, EngineError>;
