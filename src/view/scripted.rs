//! Scripted view binding for bots and deterministic testing
//!
//! Plays the role of a UI surface without a UI: intents come from a
//! predetermined script or a (seedable) random source, and every render
//! is recorded for assertions. Show/hide stay pending until the host
//! pumps the animation, which makes transition-ordering behavior
//! testable.

use crate::core::StatSnapshot;
use crate::error::Result;
use crate::view::{Transition, TransitionGate, ViewBinding, ViewIntent};
use rand::Rng;
use std::collections::VecDeque;

enum IntentSource {
    /// Predetermined sequence; exhausted script falls back to Attack
    Script(VecDeque<ViewIntent>),
    /// Uniform random choice between attack and heal
    Random(Box<dyn rand::RngCore>),
}

/// A view surface driven by a script instead of a human
///
/// Latches its next intent the moment input is enabled, so one session
/// pump per turn is enough to keep a bot duel moving.
pub struct ScriptedView {
    source: IntentSource,
    gate: TransitionGate,
    visible: bool,
    input_enabled: bool,
    released: bool,
    latched: Option<ViewIntent>,
    renders: Vec<StatSnapshot>,
}

impl ScriptedView {
    /// Follow a fixed intent sequence; Attack once the script runs out
    pub fn with_script(script: impl IntoIterator<Item = ViewIntent>) -> Self {
        Self::from_source(IntentSource::Script(script.into_iter().collect()))
    }

    /// Choose intents uniformly at random
    pub fn random() -> Self {
        Self::from_source(IntentSource::Random(Box::new(rand::thread_rng())))
    }

    /// Random intents from a seeded RNG (for deterministic testing)
    pub fn with_seed(seed: u64) -> Self {
        use rand::SeedableRng;
        Self::from_source(IntentSource::Random(Box::new(
            rand::rngs::StdRng::seed_from_u64(seed),
        )))
    }

    fn from_source(source: IntentSource) -> Self {
        ScriptedView {
            source,
            gate: TransitionGate::new(),
            visible: false,
            input_enabled: false,
            released: false,
            latched: None,
            renders: Vec::new(),
        }
    }

    /// Complete the in-flight show/hide transition, if any
    ///
    /// Returns true when a pending transition finished on this pump.
    pub fn pump_animation(&mut self) -> bool {
        self.gate.finish()
    }

    /// Every snapshot this view has been asked to render, oldest first
    pub fn renders(&self) -> &[StatSnapshot] {
        &self.renders
    }

    pub fn last_render(&self) -> Option<&StatSnapshot> {
        self.renders.last()
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn next_intent(&mut self) -> ViewIntent {
        match &mut self.source {
            IntentSource::Script(script) => script.pop_front().unwrap_or(ViewIntent::Attack),
            IntentSource::Random(rng) => {
                if rng.gen_range(0..2) == 0 {
                    ViewIntent::Attack
                } else {
                    ViewIntent::Heal
                }
            }
        }
    }
}

impl ViewBinding for ScriptedView {
    fn render_stats(&mut self, snapshot: &StatSnapshot) {
        if self.released {
            return;
        }
        self.renders.push(snapshot.clone());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if self.released {
            return;
        }
        self.input_enabled = enabled;
        // the bot "presses" as soon as its turn opens
        if enabled && self.visible && self.latched.is_none() {
            let intent = self.next_intent();
            self.latched = Some(intent);
        }
    }

    fn show(&mut self) -> Result<Transition> {
        if self.released {
            return Ok(Transition::completed());
        }
        let transition = self.gate.begin()?;
        self.visible = true;
        Ok(transition)
    }

    fn hide(&mut self) -> Result<Transition> {
        if self.released {
            return Ok(Transition::completed());
        }
        let transition = self.gate.begin()?;
        self.visible = false;
        self.latched = None;
        Ok(transition)
    }

    fn show_now(&mut self) {
        if self.released {
            return;
        }
        self.visible = true;
    }

    fn hide_now(&mut self) {
        if self.released {
            return;
        }
        self.visible = false;
        self.latched = None;
    }

    fn take_intent(&mut self) -> Option<ViewIntent> {
        self.latched.take()
    }

    fn release(&mut self) {
        self.visible = false;
        self.input_enabled = false;
        self.latched = None;
        self.released = true;
    }
}
