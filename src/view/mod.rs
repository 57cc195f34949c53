//! View bindings: the render sink and user-intent source
//!
//! A `ViewBinding` is the only channel by which duel state becomes
//! visible and the only channel by which user input reaches the engine.
//! The engine pushes `StatSnapshot`s out and drains edge-triggered
//! `ViewIntent`s back in; it never queries display state.

pub mod console;
pub mod scripted;
pub mod transition;

pub use console::ConsoleView;
pub use scripted::ScriptedView;
pub use transition::{Transition, TransitionGate, TransitionState};

use crate::core::StatSnapshot;
use crate::error::Result;
use std::cell::RefCell;
use std::rc::Rc;

/// A user action requested through a view surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewIntent {
    Attack,
    Heal,
}

impl std::fmt::Display for ViewIntent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewIntent::Attack => write!(f, "attack"),
            ViewIntent::Heal => write!(f, "heal"),
        }
    }
}

impl std::str::FromStr for ViewIntent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attack" | "a" => Ok(ViewIntent::Attack),
            "heal" | "h" => Ok(ViewIntent::Heal),
            _ => Err(format!("invalid intent '{s}' (expected: attack/a, heal/h)")),
        }
    }
}

/// Capability contract a UI surface implements for one participant
///
/// Show and hide are asynchronous: they return a [`Transition`] that the
/// surface completes when its visual effect finishes. At most one
/// transition may be in flight per binding. The `_now` variants exist for
/// swapping bindings without animating.
///
/// Intents are edge-triggered: a surface latches at most one intent per
/// user action, only while shown with input enabled, and `take_intent`
/// drains the latch.
pub trait ViewBinding {
    /// Push name/health/power/points to the display
    fn render_stats(&mut self, snapshot: &StatSnapshot);

    /// Enable or disable the action affordances; idempotent
    fn set_input_enabled(&mut self, enabled: bool);

    fn show(&mut self) -> Result<Transition>;

    fn hide(&mut self) -> Result<Transition>;

    fn show_now(&mut self);

    fn hide_now(&mut self);

    /// Drain the latched intent, if any
    fn take_intent(&mut self) -> Option<ViewIntent>;

    /// Permanently dispose the binding; later calls are absorbed as no-ops
    fn release(&mut self);
}

/// Shared handle to a view binding
///
/// Single-threaded UI ownership: the controller holds the binding through
/// this handle while the host keeps a concrete-typed clone for feeding
/// input.
pub type SharedView = Rc<RefCell<dyn ViewBinding>>;
