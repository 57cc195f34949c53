//! Show/hide transition handles
//!
//! A `Transition` is the promise half of an asynchronous reveal or
//! conceal: the binding flips it to complete when its visual effect
//! finishes, and callers poll it instead of assuming completion. There is
//! no cancellation; a binding allows at most one transition in flight.

use crate::error::{DuelError, Result};
use std::cell::Cell;
use std::rc::Rc;

/// Where a transition is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Pending,
    Complete,
}

/// Shared two-state completion handle
///
/// Clones observe the same underlying flag. Completing twice is a no-op.
#[derive(Debug, Clone)]
pub struct Transition {
    complete: Rc<Cell<bool>>,
}

impl Transition {
    /// A transition that has not finished yet
    pub fn pending() -> Self {
        Transition {
            complete: Rc::new(Cell::new(false)),
        }
    }

    /// A transition that finished before the caller could observe it
    /// (non-animated surfaces)
    pub fn completed() -> Self {
        Transition {
            complete: Rc::new(Cell::new(true)),
        }
    }

    /// Mark the transition finished
    pub fn complete(&self) {
        self.complete.set(true);
    }

    pub fn is_complete(&self) -> bool {
        self.complete.get()
    }

    pub fn state(&self) -> TransitionState {
        if self.is_complete() {
            TransitionState::Complete
        } else {
            TransitionState::Pending
        }
    }
}

/// Single in-flight guard for one binding
///
/// Bindings that animate keep one of these; `begin` refuses a second
/// transition while the first is still pending.
#[derive(Debug, Default)]
pub struct TransitionGate {
    in_flight: Option<Transition>,
}

impl TransitionGate {
    pub fn new() -> Self {
        TransitionGate { in_flight: None }
    }

    /// Start a new transition, or fail if one is still pending
    pub fn begin(&mut self) -> Result<Transition> {
        if self.is_busy() {
            return Err(DuelError::TransitionInFlight);
        }
        let transition = Transition::pending();
        self.in_flight = Some(transition.clone());
        Ok(transition)
    }

    /// Complete the in-flight transition, if any
    ///
    /// Returns true when a pending transition was driven to completion.
    pub fn finish(&mut self) -> bool {
        match self.in_flight.take() {
            Some(transition) if !transition.is_complete() => {
                transition.complete();
                true
            }
            _ => false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
            .as_ref()
            .map(|t| !t.is_complete())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_completes_once() {
        let transition = Transition::pending();
        let observer = transition.clone();

        assert_eq!(observer.state(), TransitionState::Pending);
        transition.complete();
        transition.complete();
        assert_eq!(observer.state(), TransitionState::Complete);
    }

    #[test]
    fn test_gate_refuses_second_transition() {
        let mut gate = TransitionGate::new();
        let first = gate.begin().unwrap();

        assert!(gate.begin().is_err());

        first.complete();
        assert!(!gate.is_busy());
        assert!(gate.begin().is_ok());
    }

    #[test]
    fn test_gate_finish_drives_completion() {
        let mut gate = TransitionGate::new();
        let transition = gate.begin().unwrap();

        assert!(gate.finish());
        assert!(transition.is_complete());
        assert!(!gate.finish());
    }
}
