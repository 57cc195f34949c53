//! Terminal view binding for interactive play
//!
//! Renders a text health bar to stdout and latches intents fed by the
//! CLI input loop. Terminal output needs no animation, so show and hide
//! complete immediately.

use crate::core::StatSnapshot;
use crate::error::Result;
use crate::view::{Transition, ViewBinding, ViewIntent};

const HEALTH_BAR_WIDTH: usize = 20;

/// Console-backed view surface for one participant
pub struct ConsoleView {
    visible: bool,
    input_enabled: bool,
    released: bool,
    latched: Option<ViewIntent>,
}

impl ConsoleView {
    pub fn new() -> Self {
        ConsoleView {
            visible: false,
            input_enabled: false,
            released: false,
            latched: None,
        }
    }

    /// Simulate pressing the attack button
    ///
    /// Latches only while shown with input enabled, and only if no other
    /// press is waiting to be drained.
    pub fn press_attack(&mut self) {
        self.press(ViewIntent::Attack);
    }

    /// Simulate pressing the heal button
    pub fn press_heal(&mut self) {
        self.press(ViewIntent::Heal);
    }

    pub fn input_enabled(&self) -> bool {
        self.input_enabled && !self.released
    }

    fn press(&mut self, intent: ViewIntent) {
        if self.released || !self.visible || !self.input_enabled {
            return;
        }
        if self.latched.is_none() {
            self.latched = Some(intent);
        }
    }

    fn health_bar(snapshot: &StatSnapshot) -> String {
        let max = snapshot.max_health.max(1) as usize;
        let filled = (snapshot.current_health.max(0) as usize * HEALTH_BAR_WIDTH) / max;
        let filled = filled.min(HEALTH_BAR_WIDTH);
        format!(
            "[{}{}]",
            "#".repeat(filled),
            "-".repeat(HEALTH_BAR_WIDTH - filled)
        )
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBinding for ConsoleView {
    fn render_stats(&mut self, snapshot: &StatSnapshot) {
        if self.released || !self.visible {
            return;
        }
        let bar = Self::health_bar(snapshot);
        let points = if snapshot.free_points > 0 {
            format!("  (+{} pts to allocate)", snapshot.free_points)
        } else {
            String::new()
        };
        println!(
            "  {:<12} {} {}/{}  pow {}{}",
            snapshot.name, bar, snapshot.current_health, snapshot.max_health, snapshot.power, points
        );
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if self.released {
            return;
        }
        self.input_enabled = enabled;
    }

    fn show(&mut self) -> Result<Transition> {
        self.show_now();
        Ok(Transition::completed())
    }

    fn hide(&mut self) -> Result<Transition> {
        self.hide_now();
        Ok(Transition::completed())
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
