//! Game orchestration: controllers, turn rotation, and logging

pub mod controller;
pub mod logger;
pub mod session;

pub use controller::{Controller, ControllerState, StagedStats, TurnEvent};
pub use logger::{GameLogger, LogEntry, LogGuard, OutputMode, VerbosityLevel};
pub use session::{
    DuelResult, DuelSession, GameEndReason, NoHooks, SessionHooks, SessionState, PARTICIPANT_A,
    PARTICIPANT_B,
};
