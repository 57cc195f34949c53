//! Participant stat model with observer notification
//!
//! `StatModel` owns one participant's mutable stats and pushes every
//! change to subscribed observers. Health is clamped into
//! `[0, max_health]` on write; other stats are stored as-is. The model
//! never decides defeat itself - the controller reacts to a zero-health
//! notification.
//!
//! Observers are registered under a stable handle and held weakly, so a
//! dropped view disappears from the registry without an explicit
//! unsubscribe. Notification fan-out iterates over a snapshot of the
//! registration taken when the mutation lands; observers must not mutate
//! the model they are being notified for (single-threaded contract).

use crate::core::{PlayerConfig, PlayerName};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;
use std::rc::Weak;

/// Stable handle for one observer registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(u32);

impl ObserverId {
    pub const fn new(id: u32) -> Self {
        ObserverId(id)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Observer({})", self.0)
    }
}

/// Which stat changed, with its new value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatChange {
    MaxHealth(i32),
    CurrentHealth(i32),
    Power(i32),
    FreePoints(i32),
}

/// Copyable view of a model's current values
///
/// The render path and observer callbacks receive snapshots, never the
/// model itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub name: PlayerName,
    pub max_health: i32,
    pub current_health: i32,
    pub power: i32,
    pub free_points: i32,
}

/// Receives stat change notifications
pub trait StatsObserver {
    fn on_stat_changed(&mut self, change: StatChange, snapshot: &StatSnapshot);
}

type SharedObserver = Weak<RefCell<dyn StatsObserver>>;

/// One participant's mutable stats plus its observer registry
#[derive(Debug)]
pub struct StatModel {
    name: PlayerName,
    max_health: i32,
    current_health: i32,
    power: i32,
    free_points: i32,

    observers: FxHashMap<ObserverId, SharedObserver>,
    next_observer: u32,
}

impl StatModel {
    /// Build a model from static configuration
    ///
    /// Starting health is clamped into `[0, max_health]` so the invariant
    /// holds from the first render.
    pub fn from_config(config: &PlayerConfig) -> Self {
        StatModel {
            name: config.name.clone(),
            max_health: config.max_health,
            current_health: clamp_health(config.current_health, config.max_health),
            power: config.power,
            free_points: config.free_points,
            observers: FxHashMap::default(),
            next_observer: 0,
        }
    }

    pub fn name(&self) -> &PlayerName {
        &self.name
    }

    pub fn max_health(&self) -> i32 {
        self.max_health
    }

    pub fn current_health(&self) -> i32 {
        self.current_health
    }

    pub fn power(&self) -> i32 {
        self.power
    }

    pub fn free_points(&self) -> i32 {
        self.free_points
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            name: self.name.clone(),
            max_health: self.max_health,
            current_health: self.current_health,
            power: self.power,
            free_points: self.free_points,
        }
    }

    /// Set current health, clamped into `[0, max_health]`, and notify
    ///
    /// Returns the value actually stored. A result of 0 means the
    /// participant is out of health; deciding defeat is the caller's job.
    pub fn change_current_health(&mut self, value: i32) -> i32 {
        self.current_health = clamp_health(value, self.max_health);
        self.notify(StatChange::CurrentHealth(self.current_health));
        self.current_health
    }

    /// Set the health ceiling and notify
    ///
    /// If the new maximum is below the current health, the current health
    /// is re-clamped and a second notification goes out for it.
    pub fn change_max_health(&mut self, value: i32) {
        self.max_health = value;
        self.notify(StatChange::MaxHealth(value));
        if self.current_health > self.max_health {
            self.change_current_health(self.current_health);
        }
    }

    pub fn change_power(&mut self, value: i32) {
        self.power = value;
        self.notify(StatChange::Power(value));
    }

    pub fn change_free_points(&mut self, value: i32) {
        self.free_points = value;
        self.notify(StatChange::FreePoints(value));
    }

    /// Register an observer and return its handle
    ///
    /// Subscribing a capability that is already registered is a no-op and
    /// returns the existing handle.
    pub fn subscribe(&mut self, observer: SharedObserver) -> ObserverId {
        if let Some(id) = self.find_registration(&observer) {
            return id;
        }
        let id = ObserverId::new(self.next_observer);
        self.next_observer += 1;
        self.observers.insert(id, observer);
        id
    }

    /// Remove a registration; unknown handles are silently ignored
    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.remove(&id);
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn find_registration(&self, observer: &SharedObserver) -> Option<ObserverId> {
        self.observers
            .iter()
            .find(|(_, existing)| std::ptr::addr_eq(existing.as_ptr(), observer.as_ptr()))
            .map(|(id, _)| *id)
    }

    fn notify(&mut self, change: StatChange) {
        let snapshot = self.snapshot();
        // Iterate a snapshot of the registration so a subscribe or
        // unsubscribe from inside a callback cannot invalidate the walk.
        let live: SmallVec<[SharedObserver; 2]> = self.observers.values().cloned().collect();
        for observer in live {
            if let Some(observer) = observer.upgrade() {
                observer.borrow_mut().on_stat_changed(change, &snapshot);
            }
        }
        self.observers.retain(|_, weak| weak.strong_count() > 0);
    }
}

fn clamp_health(value: i32, max_health: i32) -> i32 {
    value.min(max_health).max(0)
}
