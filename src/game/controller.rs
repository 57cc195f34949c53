//! Per-participant controller
//!
//! A controller mediates one participant: it owns that side's stat model
//! and view binding, wires the view into the model's observer list, and
//! turns view intents into gameplay effects. Cross-participant effects
//! never happen here - the session routes an attack to the opponent's
//! controller and calls `apply_damage` on it.

use crate::core::{
    ObserverId, ParticipantId, PlayerConfig, PlayerName, StatChange, StatModel, StatSnapshot,
    StatsObserver,
};
use crate::error::{DuelError, Result};
use crate::view::{SharedView, Transition, ViewBinding, ViewIntent};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Controller life cycle
///
/// `Defeated` is terminal until `reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    /// Created but not yet bound to a model and view
    Idle,
    /// Bound, input disabled, waiting for its turn
    Waiting,
    /// Input enabled, may issue one intent
    Active,
    /// Health reached zero
    Defeated,
}

/// What a gameplay effect did to this participant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnEvent {
    None,
    /// Health reached zero; reported upward exactly once
    Defeated(ParticipantId),
}

/// Stats being edited before `apply_stats` commits them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StagedStats {
    pub max_health: i32,
    pub power: i32,
    pub free_points: i32,
}

impl StagedStats {
    fn from_snapshot(snapshot: &StatSnapshot) -> Self {
        StagedStats {
            max_health: snapshot.max_health,
            power: snapshot.power,
            free_points: snapshot.free_points,
        }
    }
}

/// Forwards model notifications to the bound view
///
/// Holds the view weakly: the registration must not keep a released
/// surface alive.
struct ViewStatsObserver {
    view: Weak<RefCell<dyn ViewBinding>>,
}

impl StatsObserver for ViewStatsObserver {
    fn on_stat_changed(&mut self, _change: StatChange, snapshot: &StatSnapshot) {
        if let Some(view) = self.view.upgrade() {
            view.borrow_mut().render_stats(snapshot);
        }
    }
}

/// Mediator between one participant's model and view
pub struct Controller {
    id: ParticipantId,
    config: PlayerConfig,
    model: Option<Rc<RefCell<StatModel>>>,
    view: Option<SharedView>,
    view_observer: Option<Rc<RefCell<ViewStatsObserver>>>,
    observer_id: Option<ObserverId>,
    state: ControllerState,
    pending_show: Option<Transition>,
    pending_hide: Option<Transition>,
    release_after_hide: bool,
    activate_when_shown: bool,
    staged: StagedStats,
}

impl Controller {
    pub fn new(id: ParticipantId, config: PlayerConfig) -> Self {
        Controller {
            id,
            config,
            model: None,
            view: None,
            view_observer: None,
            observer_id: None,
            state: ControllerState::Idle,
            pending_show: None,
            pending_hide: None,
            release_after_hide: false,
            activate_when_shown: false,
            staged: StagedStats::default(),
        }
    }

    pub fn id(&self) -> ParticipantId {
        self.id
    }

    pub fn name(&self) -> &PlayerName {
        &self.config.name
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn is_defeated(&self) -> bool {
        self.state == ControllerState::Defeated
    }

    /// Bind model and view, subscribe the view as a stats observer, push
    /// an initial render, and start revealing the view
    ///
    /// Input stays disabled until the reveal transition completes and the
    /// controller is activated.
    pub fn init(&mut self, model: StatModel, view: SharedView) -> Result<()> {
        let model = Rc::new(RefCell::new(model));

        let snapshot = model.borrow().snapshot();
        view.borrow_mut().render_stats(&snapshot);

        let observer = Rc::new(RefCell::new(ViewStatsObserver {
            view: Rc::downgrade(&view),
        }));
        let id = model.borrow_mut().subscribe(downgrade_observer(&observer));

        let transition = view.borrow_mut().show()?;

        self.staged = StagedStats::from_snapshot(&snapshot);
        self.model = Some(model);
        self.view = Some(view);
        self.view_observer = Some(observer);
        self.observer_id = Some(id);
        self.pending_show = Some(transition);
        self.pending_hide = None;
        self.release_after_hide = false;
        self.activate_when_shown = false;
        self.state = ControllerState::Waiting;
        Ok(())
    }

    /// Open this participant's turn: enable input
    ///
    /// If the reveal transition is still pending, the input enable is
    /// deferred until `poll_transitions` observes completion, so a press
    /// can never land on a half-visible surface. Activating a defeated
    /// controller is absorbed.
    pub fn activate(&mut self) -> Result<()> {
        if self.state == ControllerState::Defeated {
            return Ok(());
        }
        self.state = ControllerState::Active;
        if self.show_in_flight() {
            self.activate_when_shown = true;
        } else {
            self.view_ref()?.borrow_mut().set_input_enabled(true);
        }
        Ok(())
    }

    /// Close this participant's turn: disable input
    pub fn deactivate(&mut self) -> Result<()> {
        self.activate_when_shown = false;
        if self.state == ControllerState::Active {
            self.state = ControllerState::Waiting;
        }
        self.view_ref()?.borrow_mut().set_input_enabled(false);
        Ok(())
    }

    /// Drive deferred work that waits on view transitions
    pub fn poll_transitions(&mut self) -> Result<()> {
        if self
            .pending_show
            .as_ref()
            .map(|t| t.is_complete())
            .unwrap_or(false)
        {
            self.pending_show = None;
            if self.activate_when_shown && self.state == ControllerState::Active {
                self.view_ref()?.borrow_mut().set_input_enabled(true);
            }
            self.activate_when_shown = false;
        }

        if self
            .pending_hide
            .as_ref()
            .map(|t| t.is_complete())
            .unwrap_or(false)
        {
            self.pending_hide = None;
            if self.release_after_hide {
                self.release_after_hide = false;
                if let Some(view) = &self.view {
                    view.borrow_mut().release();
                }
            }
        }
        Ok(())
    }

    /// Drain the intent latched by this participant's view, if any
    pub fn take_intent(&mut self) -> Option<ViewIntent> {
        self.view
            .as_ref()
            .and_then(|view| view.borrow_mut().take_intent())
    }

    /// Reduce own health; entering zero health is reported as `Defeated`
    pub fn apply_damage(&mut self, amount: i32) -> Result<TurnEvent> {
        let model = self.model_ref()?.clone();
        let stored = {
            let mut model = model.borrow_mut();
            let target = model.current_health() - amount;
            model.change_current_health(target)
        };
        if stored == 0 && self.state != ControllerState::Defeated {
            self.state = ControllerState::Defeated;
            self.activate_when_shown = false;
            self.view_ref()?.borrow_mut().set_input_enabled(false);
            return Ok(TurnEvent::Defeated(self.id));
        }
        Ok(TurnEvent::None)
    }

    /// Restore own health, clamped to the maximum
    pub fn apply_heal(&mut self, amount: i32) -> Result<()> {
        let model = self.model_ref()?.clone();
        let mut model = model.borrow_mut();
        let target = model.current_health() + amount;
        model.change_current_health(target);
        Ok(())
    }

    /// This participant's current attack/heal strength
    pub fn power(&self) -> Result<i32> {
        Ok(self.model_ref()?.borrow().power())
    }

    pub fn snapshot(&self) -> Result<StatSnapshot> {
        Ok(self.model_ref()?.borrow().snapshot())
    }

    /// Swap in a fresh model; the view follows the new one from now on
    ///
    /// The old model loses its registration before being discarded, the
    /// view re-renders from the new model immediately (no stale fields).
    pub fn replace_model(&mut self, model: StatModel) -> Result<()> {
        let observer = self
            .view_observer
            .as_ref()
            .ok_or(DuelError::MissingBinding("view"))?
            .clone();
        if let (Some(old), Some(id)) = (&self.model, self.observer_id) {
            old.borrow_mut().unsubscribe(id);
        }

        let model = Rc::new(RefCell::new(model));
        let id = model.borrow_mut().subscribe(downgrade_observer(&observer));
        let snapshot = model.borrow().snapshot();
        self.view_ref()?.borrow_mut().render_stats(&snapshot);

        self.staged = StagedStats::from_snapshot(&snapshot);
        self.model = Some(model);
        self.observer_id = Some(id);
        Ok(())
    }

    /// Swap in a new view surface; the old one is released
    ///
    /// Swapping does not animate: the new surface appears immediately in
    /// whatever input state the controller is in.
    pub fn replace_view(&mut self, view: SharedView) -> Result<()> {
        let model = self.model_ref()?.clone();

        if let Some(id) = self.observer_id {
            model.borrow_mut().unsubscribe(id);
        }
        if let Some(old_view) = self.view.take() {
            old_view.borrow_mut().release();
        }
        self.pending_show = None;
        self.pending_hide = None;
        self.release_after_hide = false;
        self.activate_when_shown = false;

        let observer = Rc::new(RefCell::new(ViewStatsObserver {
            view: Rc::downgrade(&view),
        }));
        let id = model.borrow_mut().subscribe(downgrade_observer(&observer));

        {
            let mut surface = view.borrow_mut();
            surface.show_now();
            surface.render_stats(&model.borrow().snapshot());
            surface.set_input_enabled(self.state == ControllerState::Active);
        }

        self.view = Some(view);
        self.view_observer = Some(observer);
        self.observer_id = Some(id);
        Ok(())
    }

    /// Rebuild the model from the original configuration, clear
    /// `Defeated`, and return to `Waiting` with input disabled
    pub fn reset(&mut self) -> Result<()> {
        self.replace_model(StatModel::from_config(&self.config))?;
        self.state = ControllerState::Waiting;
        self.activate_when_shown = false;
        self.view_ref()?.borrow_mut().set_input_enabled(false);
        Ok(())
    }

    /// Conceal the view, then release it once the conceal completes
    pub fn complete(&mut self) -> Result<()> {
        let transition = self.view_ref()?.borrow_mut().hide()?;
        self.pending_hide = Some(transition);
        self.release_after_hide = true;
        self.state = ControllerState::Idle;
        Ok(())
    }

    /// Tear down immediately (no animation); used when a session restarts
    /// with fresh surfaces
    pub fn shutdown(&mut self) {
        if let (Some(model), Some(id)) = (&self.model, self.observer_id) {
            model.borrow_mut().unsubscribe(id);
        }
        if let Some(view) = self.view.take() {
            let mut surface = view.borrow_mut();
            surface.hide_now();
            surface.release();
        }
        self.model = None;
        self.view_observer = None;
        self.observer_id = None;
        self.pending_show = None;
        self.pending_hide = None;
        self.release_after_hide = false;
        self.activate_when_shown = false;
        self.state = ControllerState::Idle;
    }

    // ---- free-point allocation ----------------------------------------

    /// Stats currently staged for allocation
    pub fn staged_stats(&self) -> StagedStats {
        self.staged
    }

    /// Move one free point into max health; refused on an empty pool
    pub fn max_health_up(&mut self) -> bool {
        if self.staged.free_points <= 0 {
            return false;
        }
        self.staged.max_health += 1;
        self.staged.free_points -= 1;
        true
    }

    /// Move one point from max health back to the pool
    pub fn max_health_down(&mut self) -> bool {
        if self.staged.max_health <= 0 {
            return false;
        }
        self.staged.max_health -= 1;
        self.staged.free_points += 1;
        true
    }

    /// Move one free point into power; refused on an empty pool
    pub fn power_up(&mut self) -> bool {
        if self.staged.free_points <= 0 {
            return false;
        }
        self.staged.power += 1;
        self.staged.free_points -= 1;
        true
    }

    /// Move one point from power back to the pool
    pub fn power_down(&mut self) -> bool {
        if self.staged.power <= 0 {
            return false;
        }
        self.staged.power -= 1;
        self.staged.free_points += 1;
        true
    }

    /// Commit the staged stats into the model (each commit notifies)
    pub fn apply_stats(&mut self) -> Result<()> {
        let model = self.model_ref()?.clone();
        let mut model = model.borrow_mut();
        model.change_free_points(self.staged.free_points);
        model.change_power(self.staged.power);
        model.change_max_health(self.staged.max_health);
        Ok(())
    }

    /// Throw away staged edits and re-stage from the model
    pub fn cancel_stats(&mut self) -> Result<()> {
        let snapshot = self.model_ref()?.borrow().snapshot();
        self.staged = StagedStats::from_snapshot(&snapshot);
        Ok(())
    }

    // -------------------------------------------------------------------

    fn show_in_flight(&self) -> bool {
        self.pending_show
            .as_ref()
            .map(|t| !t.is_complete())
            .unwrap_or(false)
    }

    fn model_ref(&self) -> Result<&Rc<RefCell<StatModel>>> {
        self.model.as_ref().ok_or(DuelError::MissingBinding("model"))
    }

    fn view_ref(&self) -> Result<&SharedView> {
        self.view.as_ref().ok_or(DuelError::MissingBinding("view"))
    }
}

fn downgrade_observer(
    observer: &Rc<RefCell<ViewStatsObserver>>,
) -> Weak<RefCell<dyn StatsObserver>> {
    let shared: Rc<RefCell<dyn StatsObserver>> = observer.clone();
    Rc::downgrade(&shared)
}
