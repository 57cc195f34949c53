//! Error types for the duel engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),

    #[error("Controller has no {0} bound (init was not called)")]
    MissingBinding(&'static str),

    #[error("View transition already in flight")]
    TransitionInFlight,

    #[error("Session is not running")]
    NotRunning,

    #[error("Session is already running")]
    AlreadyRunning,

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DuelError>;
