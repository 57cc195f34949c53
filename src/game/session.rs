//! Turn coordination between the two participants
//!
//! `DuelSession` owns both controllers and everything cross-participant:
//! the rotation queue, round counting, attack/heal resolution, defeat
//! detection, and the restart handshake with the host. Controllers never
//! talk to each other directly.
//!
//! The session is pump-driven: the host calls [`DuelSession::pump`] from
//! its event loop, and one pump synchronously drains every intent that
//! is ready (including intents latched by bot views mid-drain, so a
//! bot-vs-bot game can finish inside a single pump).

use crate::core::{ParticipantId, PlayerConfig, PlayerName, StatModel, StatSnapshot};
use crate::error::{DuelError, Result};
use crate::game::controller::{Controller, TurnEvent};
use crate::game::logger::{GameLogger, VerbosityLevel};
use crate::view::{SharedView, ViewIntent};
use smallvec::SmallVec;

/// First to act in every round
pub const PARTICIPANT_A: ParticipantId = ParticipantId::new(0);
pub const PARTICIPANT_B: ParticipantId = ParticipantId::new(1);

/// Session life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No game in progress; the start affordance is available
    Idle,
    /// Turns are rotating
    Running,
    /// Termination detected, finalization pending
    GameOver,
}

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEndReason {
    /// A participant reached zero health; the payload is the winner
    PlayerDefeat(ParticipantId),
    /// Round cap reached without a defeat
    RoundLimit,
}

/// Result of a completed game
#[derive(Debug, Clone)]
pub struct DuelResult {
    /// Winner's name (None on a round-limit draw)
    pub winner: Option<PlayerName>,
    /// Completed rounds at termination
    pub rounds: u32,
    pub end_reason: GameEndReason,
}

/// Callbacks into the hosting environment
///
/// The host flips its "start" affordance on these; the core never owns
/// that widget.
pub trait SessionHooks {
    fn start_affordance(&mut self, _enabled: bool) {}
    fn winner_announced(&mut self, _winner: &PlayerName, _rounds: u32) {}
}

/// Hooks that ignore everything (headless hosts, tests)
pub struct NoHooks;

impl SessionHooks for NoHooks {}

/// Coordinates two controllers through rotating turns
pub struct DuelSession {
    configs: [PlayerConfig; 2],
    controllers: Option<[Controller; 2]>,
    rotation: SmallVec<[ParticipantId; 2]>,
    round: u32,
    max_rounds: u32,
    active: Option<ParticipantId>,
    game_over: bool,
    winner: Option<ParticipantId>,
    end_reason: Option<GameEndReason>,
    state: SessionState,
    hooks: Box<dyn SessionHooks>,
    logger: GameLogger,
    last_result: Option<DuelResult>,
}

impl DuelSession {
    pub fn new(config_a: PlayerConfig, config_b: PlayerConfig) -> Self {
        DuelSession {
            configs: [config_a, config_b],
            controllers: None,
            rotation: SmallVec::new(),
            round: 0,
            max_rounds: 1000,
            active: None,
            game_over: false,
            winner: None,
            end_reason: None,
            state: SessionState::Idle,
            hooks: Box::new(NoHooks),
            logger: GameLogger::new(),
            last_result: None,
        }
    }

    /// Install host callbacks (builder pattern)
    pub fn with_hooks(mut self, hooks: Box<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Set verbosity level for game output (builder pattern)
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.logger.set_verbosity(verbosity);
        self
    }

    /// Set the round cap before a forced draw (builder pattern)
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn logger(&self) -> &GameLogger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut GameLogger {
        &mut self.logger
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current round number (0 before the first game)
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Whose turn it is, if a game is running
    pub fn active_participant(&self) -> Option<ParticipantId> {
        self.active
    }

    pub fn controller(&self, id: ParticipantId) -> Option<&Controller> {
        self.controllers
            .as_ref()
            .and_then(|c| c.get(id.index()))
    }

    pub fn controller_mut(&mut self, id: ParticipantId) -> Option<&mut Controller> {
        self.controllers
            .as_mut()
            .and_then(|c| c.get_mut(id.index()))
    }

    pub fn snapshot(&self, id: ParticipantId) -> Result<StatSnapshot> {
        self.controller(id)
            .ok_or(DuelError::NotRunning)?
            .snapshot()
    }

    /// Construct both controllers and open round 1
    ///
    /// Fresh view surfaces are supplied per game; controllers from a
    /// previous game are torn down first.
    pub fn start_game(&mut self, view_a: SharedView, view_b: SharedView) -> Result<()> {
        if self.state == SessionState::Running {
            return Err(DuelError::AlreadyRunning);
        }
        if let Some(mut previous) = self.controllers.take() {
            for controller in previous.iter_mut() {
                controller.shutdown();
            }
        }

        let mut controller_a = Controller::new(PARTICIPANT_A, self.configs[0].clone());
        controller_a.init(StatModel::from_config(&self.configs[0]), view_a)?;
        let mut controller_b = Controller::new(PARTICIPANT_B, self.configs[1].clone());
        controller_b.init(StatModel::from_config(&self.configs[1]), view_b)?;
        self.controllers = Some([controller_a, controller_b]);

        self.hooks.start_affordance(false);
        self.logger.log_normal(&format!(
            "{} vs {}",
            self.configs[0].name, self.configs[1].name
        ));

        self.game_over = false;
        self.winner = None;
        self.end_reason = None;
        self.last_result = None;
        self.state = SessionState::Running;
        self.round = 1;
        self.rotation.clear();
        self.rotation.push(PARTICIPANT_A);
        self.rotation.push(PARTICIPANT_B);
        self.logger
            .log_category(VerbosityLevel::Normal, "round", "-- Round 1 --");
        self.advance_turn()
    }

    /// Drain ready intents and transition completions
    ///
    /// Returns the game result on the pump that finalizes it.
    pub fn pump(&mut self) -> Result<Option<DuelResult>> {
        if self.state != SessionState::Running {
            return Ok(self.last_result.take());
        }

        {
            let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
            for controller in controllers.iter_mut() {
                controller.poll_transitions()?;
            }
        }

        while self.state == SessionState::Running {
            match self.take_pending_intent()? {
                Some((actor, intent)) => self.resolve_intent(actor, intent)?,
                None => break,
            }
        }

        Ok(self.last_result.take())
    }

    fn take_pending_intent(&mut self) -> Result<Option<(ParticipantId, ViewIntent)>> {
        let active = self.active;
        let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
        let mut found = None;
        for controller in controllers.iter_mut() {
            if let Some(intent) = controller.take_intent() {
                if Some(controller.id()) == active && found.is_none() {
                    found = Some((controller.id(), intent));
                } else {
                    // off-turn surfaces have input disabled; anything
                    // latched anyway is dropped, not queued
                    self.logger.log_verbose(&format!(
                        "{} intent '{}' ignored (not the active participant)",
                        controller.id(),
                        intent
                    ));
                }
            }
        }
        Ok(found)
    }

    fn resolve_intent(&mut self, actor: ParticipantId, intent: ViewIntent) -> Result<()> {
        let event = {
            let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
            let actor_idx = actor.index();
            let power = controllers[actor_idx].power()?;

            match intent {
                ViewIntent::Attack => {
                    let target_idx = 1 - actor_idx;
                    let event = controllers[target_idx].apply_damage(power)?;
                    let target = controllers[target_idx].snapshot()?;
                    self.logger.log_category(
                        VerbosityLevel::Normal,
                        "effect",
                        &format!(
                            "{} attacks {} for {} ({}/{} left)",
                            controllers[actor_idx].name(),
                            controllers[target_idx].name(),
                            power,
                            target.current_health,
                            target.max_health
                        ),
                    );
                    event
                }
                ViewIntent::Heal => {
                    controllers[actor_idx].apply_heal(power)?;
                    let actor_stats = controllers[actor_idx].snapshot()?;
                    self.logger.log_category(
                        VerbosityLevel::Normal,
                        "effect",
                        &format!(
                            "{} heals for {} ({}/{})",
                            controllers[actor_idx].name(),
                            power,
                            actor_stats.current_health,
                            actor_stats.max_health
                        ),
                    );
                    TurnEvent::None
                }
            }
        };

        {
            let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
            controllers[actor.index()].deactivate()?;
        }

        if let TurnEvent::Defeated(defeated) = event {
            self.on_participant_defeated(defeated);
        }
        self.advance_turn()
    }

    /// Record the survivor as winner and suppress further rotation
    fn on_participant_defeated(&mut self, defeated: ParticipantId) {
        let survivor = if defeated == PARTICIPANT_A {
            PARTICIPANT_B
        } else {
            PARTICIPANT_A
        };
        self.logger
            .log_verbose(&format!("{} is defeated", defeated));
        self.winner = Some(survivor);
        self.end_reason = Some(GameEndReason::PlayerDefeat(survivor));
        self.game_over = true;
        self.state = SessionState::GameOver;
    }

    fn advance_turn(&mut self) -> Result<()> {
        if self.game_over {
            return self.finalize();
        }

        if self.rotation.is_empty() {
            if self.round >= self.max_rounds {
                self.end_reason = Some(GameEndReason::RoundLimit);
                self.game_over = true;
                self.state = SessionState::GameOver;
                return self.finalize();
            }
            self.round += 1;
            self.refill_rotation()?;
            self.logger.log_category(
                VerbosityLevel::Normal,
                "round",
                &format!("-- Round {} --", self.round),
            );
        }

        if self.rotation.is_empty() {
            // both participants defeated cannot happen while the game is
            // live; nothing to activate
            return Ok(());
        }
        let next = self.rotation.remove(0);
        self.active = Some(next);
        self.logger
            .log_verbose(&format!("{} takes the turn", next));
        let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
        controllers[next.index()].activate()
    }

    /// Exactly the set of living participants, A before B
    fn refill_rotation(&mut self) -> Result<()> {
        let controllers = self.controllers.as_ref().ok_or(DuelError::NotRunning)?;
        self.rotation.clear();
        for controller in controllers.iter() {
            if !controller.is_defeated() {
                self.rotation.push(controller.id());
            }
        }
        Ok(())
    }

    /// Close the game: announce, reset both sides, give the start
    /// affordance back to the host
    fn finalize(&mut self) -> Result<()> {
        let rounds = self.round;
        let winner_name = self.winner.map(|id| self.configs[id.index()].name.clone());
        let end_reason = self.end_reason.unwrap_or(GameEndReason::RoundLimit);

        match &winner_name {
            Some(name) => {
                self.logger.log_category(
                    VerbosityLevel::Minimal,
                    "outcome",
                    &format!("{} wins after {} round(s)", name, rounds),
                );
                self.hooks.winner_announced(name, rounds);
            }
            None => {
                self.logger.log_category(
                    VerbosityLevel::Minimal,
                    "outcome",
                    &format!("Draw after {} round(s)", rounds),
                );
            }
        }

        {
            let controllers = self.controllers.as_mut().ok_or(DuelError::NotRunning)?;
            for controller in controllers.iter_mut() {
                controller.reset()?;
            }
        }
        self.hooks.start_affordance(true);

        self.active = None;
        self.rotation.clear();
        self.game_over = false;
        self.winner = None;
        self.state = SessionState::Idle;
        self.last_result = Some(DuelResult {
            winner: winner_name,
            rounds,
            end_reason,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::logger::OutputMode;
    use crate::view::ScriptedView;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scripted_pair(
        script_a: Vec<ViewIntent>,
        script_b: Vec<ViewIntent>,
    ) -> (
        Rc<RefCell<ScriptedView>>,
        Rc<RefCell<ScriptedView>>,
        SharedView,
        SharedView,
    ) {
        let a = Rc::new(RefCell::new(ScriptedView::with_script(script_a)));
        let b = Rc::new(RefCell::new(ScriptedView::with_script(script_b)));
        let shared_a: SharedView = a.clone();
        let shared_b: SharedView = b.clone();
        (a, b, shared_a, shared_b)
    }

    fn capture_session(config_a: PlayerConfig, config_b: PlayerConfig) -> DuelSession {
        let mut session = DuelSession::new(config_a, config_b);
        session.logger_mut().set_output_mode(OutputMode::Memory);
        session
    }

    #[test]
    fn test_start_activates_first_participant() {
        let (_a, _b, shared_a, shared_b) = scripted_pair(vec![], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 100, 20),
            PlayerConfig::new("Bob", 100, 30),
        );

        session.start_game(shared_a, shared_b).unwrap();

        assert_eq!(session.state(), SessionState::Running);
        assert_eq!(session.round(), 1);
        assert_eq!(session.active_participant(), Some(PARTICIPANT_A));
    }

    #[test]
    fn test_turn_passes_after_intent_resolves() {
        let (a, _b, shared_a, shared_b) = scripted_pair(vec![ViewIntent::Attack], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 100, 20),
            PlayerConfig::new("Bob", 100, 30),
        );
        session.start_game(shared_a, shared_b).unwrap();

        // only A's reveal finishes, so only A gets to act this pump
        a.borrow_mut().pump_animation();
        session.pump().unwrap();

        assert_eq!(session.active_participant(), Some(PARTICIPANT_B));
        assert_eq!(
            session.snapshot(PARTICIPANT_B).unwrap().current_health,
            80
        );
    }

    #[test]
    fn test_round_counter_increments_per_refill() {
        // zero power keeps both alive; the cap forces the draw
        let (a, b, shared_a, shared_b) = scripted_pair(vec![], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 100, 0),
            PlayerConfig::new("Bob", 100, 0),
        )
        .with_max_rounds(3);
        session.start_game(shared_a, shared_b).unwrap();

        a.borrow_mut().pump_animation();
        b.borrow_mut().pump_animation();
        let result = session.pump().unwrap().expect("round cap ends the game");

        assert_eq!(result.rounds, 3);
        assert_eq!(result.winner, None);
        assert_eq!(result.end_reason, GameEndReason::RoundLimit);

        let round_headers: Vec<String> = session
            .logger()
            .logs()
            .iter()
            .filter(|entry| entry.category == Some("round"))
            .map(|entry| entry.message.clone())
            .collect();
        assert_eq!(
            round_headers,
            vec!["-- Round 1 --", "-- Round 2 --", "-- Round 3 --"]
        );
    }

    #[test]
    fn test_defeat_announces_survivor_and_goes_idle() {
        // B one-shots A on its first turn
        let (a, b, shared_a, shared_b) = scripted_pair(vec![ViewIntent::Heal], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 50, 5),
            PlayerConfig::new("Bob", 100, 50),
        );
        session.start_game(shared_a, shared_b).unwrap();

        a.borrow_mut().pump_animation();
        b.borrow_mut().pump_animation();
        let result = session.pump().unwrap().expect("defeat ends the game");

        assert_eq!(result.winner.as_ref().map(|n| n.as_str()), Some("Bob"));
        assert_eq!(result.rounds, 1);
        assert_eq!(
            result.end_reason,
            GameEndReason::PlayerDefeat(PARTICIPANT_B)
        );
        assert_eq!(session.state(), SessionState::Idle);

        // finalization reset both sides for the next game
        assert_eq!(session.snapshot(PARTICIPANT_A).unwrap().current_health, 50);
        assert_eq!(
            session.snapshot(PARTICIPANT_B).unwrap().current_health,
            100
        );
    }

    #[test]
    fn test_start_affordance_flips_across_game() {
        struct RecordingHooks {
            flips: Rc<RefCell<Vec<bool>>>,
            winners: Rc<RefCell<Vec<String>>>,
        }
        impl SessionHooks for RecordingHooks {
            fn start_affordance(&mut self, enabled: bool) {
                self.flips.borrow_mut().push(enabled);
            }
            fn winner_announced(&mut self, winner: &PlayerName, _rounds: u32) {
                self.winners.borrow_mut().push(winner.to_string());
            }
        }

        let flips = Rc::new(RefCell::new(Vec::new()));
        let winners = Rc::new(RefCell::new(Vec::new()));
        let hooks = RecordingHooks {
            flips: flips.clone(),
            winners: winners.clone(),
        };

        let (a, b, shared_a, shared_b) = scripted_pair(vec![], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 100, 50),
            PlayerConfig::new("Bob", 40, 50),
        )
        .with_hooks(Box::new(hooks));
        session.start_game(shared_a, shared_b).unwrap();

        a.borrow_mut().pump_animation();
        b.borrow_mut().pump_animation();
        // Alice acts first and one-shots Bob
        session.pump().unwrap();

        assert_eq!(*flips.borrow(), vec![false, true]);
        assert_eq!(*winners.borrow(), vec!["Alice".to_string()]);
    }

    #[test]
    fn test_second_start_while_running_fails() {
        let (_a, _b, shared_a, shared_b) = scripted_pair(vec![], vec![]);
        let (_a2, _b2, shared_a2, shared_b2) = scripted_pair(vec![], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 100, 20),
            PlayerConfig::new("Bob", 100, 30),
        );

        session.start_game(shared_a, shared_b).unwrap();
        assert!(matches!(
            session.start_game(shared_a2, shared_b2),
            Err(DuelError::AlreadyRunning)
        ));
    }

    #[test]
    fn test_restart_releases_previous_views() {
        let (a, b, shared_a, shared_b) = scripted_pair(vec![ViewIntent::Heal], vec![]);
        let mut session = capture_session(
            PlayerConfig::new("Alice", 50, 5),
            PlayerConfig::new("Bob", 100, 50),
        );
        session.start_game(shared_a, shared_b).unwrap();
        a.borrow_mut().pump_animation();
        b.borrow_mut().pump_animation();
        session.pump().unwrap().expect("game ends");

        let (a2, _b2, shared_a2, shared_b2) = scripted_pair(vec![], vec![]);
        session.start_game(shared_a2, shared_b2).unwrap();

        assert!(a.borrow().is_released());
        assert!(b.borrow().is_released());
        assert_eq!(session.active_participant(), Some(PARTICIPANT_A));
        assert!(!a2.borrow().is_released());
    }
}
