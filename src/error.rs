use thiserror::Error;

/// Errors produced by the engine. Validation failures never touch the
/// network; backend failures are terminal for the triggering action (no
/// automatic retry anywhere).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Locally detected operator input problems, one message per field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The backend answered with a non-success status.
    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Connection-level failure before any backend answer.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A save for this room is already in flight; the full-replace
    /// discipline would clobber concurrent local edits.
    #[error("a save for this room is already in flight")]
    SaveInFlight,

    #[error("unknown sector at index {0}")]
    UnknownSector(usize),

    #[error("no seat at the selected position")]
    UnknownSeat,
}
