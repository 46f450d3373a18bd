//! Channel scheduler
//!
//! Keeps at most one tween per named channel and drives every registered
//! tween once per frame. Callbacks fired during a tick (setters and
//! completion callbacks) may call back into the scheduler: the registry is
//! never borrowed while user code runs.
//!
//! ```rust
//! use cadence_animation::{ChannelScheduler, TweenFactory};
//! use cadence_core::ManualClock;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = ManualClock::new(0.0);
//! let scheduler = ChannelScheduler::new(clock.clone());
//!
//! let opacity = Rc::new(Cell::new(0.0f32));
//! let sink = opacity.clone();
//! let fade = TweenFactory::lerp(0.0f32, 1.0, 0.0, 1.0)
//!     .unwrap()
//!     .with_setter(move |v| sink.set(v));
//! scheduler.set("fade", fade);
//!
//! clock.set(0.5);
//! scheduler.tick();
//! assert_eq!(opacity.get(), 0.5);
//!
//! clock.set(1.0);
//! scheduler.tick();
//! assert_eq!(opacity.get(), 1.0);
//! assert!(!scheduler.has_state("fade"));
//! ```

use crate::config::{SchedulerConfig, TickOrder};
use crate::error::{Result, TweenError};
use crate::tween::{Tween, TweenSnapshot, TweenState};
use cadence_core::{FrameClock, SystemClock};
use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::type_name;
use std::cell::{RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

new_key_type! {
    /// Identity of one registered tween state
    struct TweenId;
}

/// One registered state
struct Slot {
    name: String,
    /// `None` while the running tick has the state checked out
    state: Option<Box<dyn TweenState>>,
    /// Pause change requested while checked out
    pending_pause: Option<bool>,
    /// `complete()` was requested while checked out
    complete_on_return: bool,
    /// Last tick whose `dt` was added to a paused start time
    absorbed_tick: u64,
}

impl Slot {
    fn new(name: String, state: Box<dyn TweenState>) -> Self {
        Self {
            name,
            state: Some(state),
            pending_pause: None,
            complete_on_return: false,
            absorbed_tick: 0,
        }
    }

    fn set_paused(&mut self, paused: bool) {
        match self.state.as_mut() {
            Some(state) => state.set_paused(paused),
            None => self.pending_pause = Some(paused),
        }
    }

    fn is_paused(&self) -> bool {
        match (&self.state, self.pending_pause) {
            (_, Some(paused)) => paused,
            (Some(state), None) => state.is_paused(),
            (None, None) => false,
        }
    }
}

/// Internal state of the channel scheduler
struct SchedulerInner {
    config: SchedulerConfig,
    slots: SlotMap<TweenId, Slot>,
    channels: IndexMap<String, TweenId, FxBuildHasher>,
    solo: Option<TweenId>,
    last_tick: Option<f32>,
    ticking: bool,
    tick_serial: u64,
    unpause_after_tick: bool,
}

impl SchedulerInner {
    fn set_all_paused(&mut self, paused: bool) {
        for id in self.channels.values() {
            if let Some(slot) = self.slots.get_mut(*id) {
                slot.set_paused(paused);
            }
        }
    }

    /// Shift paused states by `dt`, at most once per tick each
    fn absorb_pause(&mut self, ids: &[TweenId], dt: f32) {
        let serial = self.tick_serial;
        for id in ids {
            let Some(slot) = self.slots.get_mut(*id) else {
                continue;
            };
            let Some(state) = slot.state.as_mut() else {
                continue;
            };
            if state.is_paused() && slot.absorbed_tick != serial {
                state.set_start_time(state.start_time() + dt);
                slot.absorbed_tick = serial;
            }
        }
    }

    fn forget_solo(&mut self, id: TweenId) {
        if self.solo == Some(id) {
            self.solo = None;
        }
    }
}

struct Shared {
    inner: RefCell<SchedulerInner>,
    clock: Box<dyn FrameClock>,
}

/// Drives named tween channels once per frame
///
/// Cloning is cheap and yields another handle to the same registry. Callbacks
/// stored inside tweens should capture a [`SchedulerHandle`] instead, so the
/// registry does not keep itself alive.
#[derive(Clone)]
pub struct ChannelScheduler {
    shared: Rc<Shared>,
}

/// Weak handle to a [`ChannelScheduler`], for use inside callbacks
#[derive(Clone)]
pub struct SchedulerHandle {
    shared: Weak<Shared>,
}

impl SchedulerHandle {
    /// Get the scheduler back, if it is still alive
    pub fn upgrade(&self) -> Option<ChannelScheduler> {
        self.shared
            .upgrade()
            .map(|shared| ChannelScheduler { shared })
    }

    pub fn is_alive(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl fmt::Debug for SchedulerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl ChannelScheduler {
    /// Create a scheduler ticking against `clock`
    pub fn new(clock: impl FrameClock + 'static) -> Self {
        Self::with_config(clock, SchedulerConfig::default())
    }

    pub fn with_config(clock: impl FrameClock + 'static, config: SchedulerConfig) -> Self {
        Self {
            shared: Rc::new(Shared {
                inner: RefCell::new(SchedulerInner {
                    config,
                    slots: SlotMap::with_key(),
                    channels: IndexMap::default(),
                    solo: None,
                    last_tick: None,
                    ticking: false,
                    tick_serial: 0,
                    unpause_after_tick: false,
                }),
                clock: Box::new(clock),
            }),
        }
    }

    /// Get a weak handle to this scheduler for capturing in callbacks
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            shared: Rc::downgrade(&self.shared),
        }
    }

    /// Current time according to the scheduler's clock
    pub fn now(&self) -> f32 {
        self.shared.clock.now()
    }

    pub fn config(&self) -> SchedulerConfig {
        self.inner().config.clone()
    }

    fn inner(&self) -> RefMut<'_, SchedulerInner> {
        self.shared.inner.borrow_mut()
    }

    // ========================================================================
    // Registry
    // ========================================================================

    /// Register `state` on `name` unless the channel is already occupied
    ///
    /// Returns whether the state was inserted.
    pub fn set_if_vacant(&self, name: impl Into<String>, state: impl TweenState) -> bool {
        let name = name.into();
        let mut guard = self.inner();
        let inner = &mut *guard;
        if inner.channels.contains_key(&name) {
            return false;
        }

        let id = inner.slots.insert(Slot::new(name.clone(), Box::new(state)));
        tracing::debug!("ChannelScheduler[{}]: set '{}'", inner.config.label, name);
        inner.channels.insert(name, id);
        warn_if_crowded(inner);
        true
    }

    /// Register `state` on `name`, silently discarding any tween already there
    ///
    /// The discarded tween gets no completion or cancellation callback.
    pub fn set(&self, name: impl Into<String>, state: impl TweenState) {
        let name = name.into();
        let _discarded = {
            let mut guard = self.inner();
            let inner = &mut *guard;
            let id = inner.slots.insert(Slot::new(name.clone(), Box::new(state)));

            match inner.channels.get_mut(&name) {
                Some(existing) => {
                    let old = std::mem::replace(existing, id);
                    inner.forget_solo(old);
                    tracing::debug!(
                        "ChannelScheduler[{}]: replaced '{}'",
                        inner.config.label,
                        name
                    );
                    inner.slots.remove(old)
                }
                None => {
                    tracing::debug!("ChannelScheduler[{}]: set '{}'", inner.config.label, name);
                    inner.channels.insert(name, id);
                    warn_if_crowded(inner);
                    None
                }
            }
        };
    }

    /// Copy of the `Tween<T>` registered on `name`
    ///
    /// Returns `Ok(None)` for an empty channel and
    /// [`TweenError::TypeMismatch`] if the channel holds a different state type.
    pub fn get<T: Clone + 'static>(&self, name: &str) -> Result<Option<TweenSnapshot<T>>> {
        let inner = self.shared.inner.borrow();
        let Some(slot) = inner.channels.get(name).and_then(|id| inner.slots.get(*id)) else {
            return Ok(None);
        };
        let Some(state) = slot.state.as_deref() else {
            return Err(TweenError::Busy {
                channel: name.to_string(),
            });
        };

        match state.as_any().downcast_ref::<Tween<T>>() {
            Some(tween) => {
                let mut snapshot = TweenSnapshot::of(tween);
                snapshot.paused = slot.is_paused();
                Ok(Some(snapshot))
            }
            None => Err(TweenError::TypeMismatch {
                channel: name.to_string(),
                expected: type_name::<Tween<T>>(),
                found: state.value_type_name(),
            }),
        }
    }

    pub fn has_state(&self, name: &str) -> bool {
        self.shared.inner.borrow().channels.contains_key(name)
    }

    /// True while any channel is registered
    pub fn is_animating(&self) -> bool {
        !self.shared.inner.borrow().channels.is_empty()
    }

    /// Number of registered channels
    pub fn len(&self) -> usize {
        self.shared.inner.borrow().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        !self.is_animating()
    }

    /// Registered channel names, in insertion order
    pub fn channel_names(&self) -> Vec<String> {
        self.shared.inner.borrow().channels.keys().cloned().collect()
    }

    /// Remove a channel without running any completion side effects
    ///
    /// Returns whether a channel was present.
    pub fn stop(&self, name: &str) -> bool {
        let removed = {
            let mut guard = self.inner();
            let inner = &mut *guard;
            let Some(id) = inner.channels.shift_remove(name) else {
                return false;
            };
            inner.forget_solo(id);
            tracing::debug!("ChannelScheduler[{}]: stopped '{}'", inner.config.label, name);
            inner.slots.remove(id)
        };
        drop(removed);
        true
    }

    /// Remove a channel and immediately apply its end value and completion callback
    ///
    /// Returns whether a channel was present.
    pub fn complete(&self, name: &str) -> bool {
        let mut state = {
            let mut guard = self.inner();
            let inner = &mut *guard;
            let Some(id) = inner.channels.shift_remove(name) else {
                return false;
            };
            inner.forget_solo(id);
            tracing::debug!("ChannelScheduler[{}]: completing '{}'", inner.config.label, name);

            let Some(slot) = inner.slots.get_mut(id) else {
                return true;
            };
            match slot.state.take() {
                Some(state) => {
                    inner.slots.remove(id);
                    state
                }
                None => {
                    // Checked out by the running tick, which completes it on return
                    slot.complete_on_return = true;
                    return true;
                }
            }
        };
        state.complete();
        true
    }

    /// Complete every registered channel and empty the registry
    ///
    /// Channels registered by completion callbacks during this call are kept.
    pub fn complete_all(&self) {
        let ready = {
            let mut guard = self.inner();
            let inner = &mut *guard;
            inner.solo = None;
            tracing::debug!(
                "ChannelScheduler[{}]: completing all {} channels",
                inner.config.label,
                inner.channels.len()
            );

            let mut ready = Vec::with_capacity(inner.channels.len());
            for (_, id) in inner.channels.drain(..) {
                let Some(slot) = inner.slots.get_mut(id) else {
                    continue;
                };
                match slot.state.take() {
                    Some(state) => {
                        inner.slots.remove(id);
                        ready.push(state);
                    }
                    None => slot.complete_on_return = true,
                }
            }
            ready
        };

        for mut state in ready {
            state.complete();
        }
    }

    /// Remove every channel without running completion side effects
    pub fn clear(&self) {
        // Draining keeps key versions, so ids held by a running tick go stale
        let _discarded: Vec<_> = {
            let mut guard = self.inner();
            let inner = &mut *guard;
            tracing::debug!(
                "ChannelScheduler[{}]: cleared {} channels",
                inner.config.label,
                inner.channels.len()
            );
            inner.channels.clear();
            inner.solo = None;
            inner.slots.drain().collect()
        };
    }

    // ========================================================================
    // Pausing
    // ========================================================================

    pub fn is_paused(&self, name: &str) -> Option<bool> {
        let inner = self.shared.inner.borrow();
        let id = inner.channels.get(name)?;
        inner.slots.get(*id).map(Slot::is_paused)
    }

    /// Pause or resume a single channel
    ///
    /// Time elapsed since the last tick is not absorbed, so resuming is
    /// accurate to one tick. Returns whether the channel exists.
    pub fn set_paused(&self, name: &str, paused: bool) -> bool {
        let mut guard = self.inner();
        let inner = &mut *guard;
        let Some(&id) = inner.channels.get(name) else {
            return false;
        };
        match inner.slots.get_mut(id) {
            Some(slot) => {
                slot.set_paused(paused);
                true
            }
            None => false,
        }
    }

    pub fn pause_all(&self) {
        self.inner().set_all_paused(true);
    }

    /// Resume every channel
    ///
    /// Runs one tick first so time elapsed while paused is absorbed. Called
    /// from a callback during a tick, the resume happens when that tick ends.
    pub fn unpause_all(&self) {
        {
            let mut inner = self.inner();
            if inner.ticking {
                inner.unpause_after_tick = true;
                return;
            }
        }

        self.tick();
        let mut inner = self.inner();
        inner.solo = None;
        inner.set_all_paused(false);
    }

    /// Pause every channel except `name`
    ///
    /// When the soloed tween finishes naturally every channel resumes. If
    /// `name` is not registered this behaves as [`unpause_all`](Self::unpause_all).
    pub fn solo(&self, name: &str) {
        {
            let mut guard = self.inner();
            let inner = &mut *guard;
            if let Some(&id) = inner.channels.get(name) {
                inner.set_all_paused(true);
                if let Some(slot) = inner.slots.get_mut(id) {
                    slot.set_paused(false);
                }
                inner.solo = Some(id);
                tracing::debug!("ChannelScheduler[{}]: solo '{}'", inner.config.label, name);
                return;
            }
        }
        self.unpause_all();
    }

    /// Name of the soloed channel, while a solo is in effect
    pub fn soloed_channel(&self) -> Option<String> {
        let inner = self.shared.inner.borrow();
        let id = inner.solo?;
        inner.slots.get(id).map(|slot| slot.name.clone())
    }

    // ========================================================================
    // Ticking
    // ========================================================================

    /// Advance all channels to the clock's current time
    ///
    /// Elapsed time is measured from the previous tick; the first tick uses
    /// zero. Returns true if any channel is still registered.
    pub fn tick(&self) -> bool {
        let now = self.now();
        let dt = match self.shared.inner.borrow().last_tick {
            Some(last) => now - last,
            None => 0.0,
        };
        self.tick_at(now, dt)
    }

    /// Advance all channels to `now`, with `dt` seconds elapsed since the previous tick
    ///
    /// Returns true if any channel is still registered.
    pub fn tick_at(&self, now: f32, dt: f32) -> bool {
        let (ids, dt) = {
            let mut inner = self.inner();
            if inner.ticking {
                tracing::warn!(
                    "ChannelScheduler[{}]: tick requested during a tick, ignoring",
                    inner.config.label
                );
                return !inner.channels.is_empty();
            }
            inner.ticking = true;
            inner.tick_serial = inner.tick_serial.wrapping_add(1);

            tracing::trace!(
                "ChannelScheduler[{}]: tick now={} dt={} channels={}",
                inner.config.label,
                now,
                dt,
                inner.channels.len()
            );
            let dt = if dt < 0.0 {
                tracing::warn!(
                    "ChannelScheduler[{}]: clock went backwards by {}s",
                    inner.config.label,
                    -dt
                );
                0.0
            } else {
                dt
            };
            let ids: SmallVec<[TweenId; 16]> = match inner.config.order {
                TickOrder::NewestFirst => inner.channels.values().rev().copied().collect(),
                TickOrder::OldestFirst => inner.channels.values().copied().collect(),
            };
            (ids, dt)
        };

        for (i, &id) in ids.iter().enumerate() {
            self.step(id, &ids[i + 1..], now, dt);
        }

        let mut inner = self.inner();
        inner.ticking = false;
        inner.last_tick = Some(now);
        if std::mem::take(&mut inner.unpause_after_tick) {
            inner.solo = None;
            inner.set_all_paused(false);
        }
        !inner.channels.is_empty()
    }

    /// Drive one state; finished states are removed before they complete
    ///
    /// `rest` holds the ids this tick has not reached yet.
    fn step(&self, id: TweenId, rest: &[TweenId], now: f32, dt: f32) {
        let mut state = {
            let mut inner = self.inner();
            inner.absorb_pause(std::slice::from_ref(&id), dt);
            let Some(slot) = inner.slots.get_mut(id) else {
                return;
            };
            let Some(state) = slot.state.take() else {
                return;
            };
            slot.pending_pause = Some(state.is_paused());
            state
        };

        let running = state.update(now);

        {
            let mut guard = self.inner();
            let inner = &mut *guard;
            // Stopped, replaced or cleared while the setter ran
            let Some(slot) = inner.slots.get_mut(id) else {
                return;
            };
            if let Some(paused) = slot.pending_pause.take() {
                state.set_paused(paused);
            }
            if running && !slot.complete_on_return {
                slot.state = Some(state);
                return;
            }

            let forced = slot.complete_on_return;
            let Some(slot) = inner.slots.remove(id) else {
                return;
            };
            if !forced {
                if inner.channels.get(&slot.name) == Some(&id) {
                    inner.channels.shift_remove(&slot.name);
                }
                if inner.solo == Some(id) {
                    tracing::debug!(
                        "ChannelScheduler[{}]: solo '{}' finished, resuming all",
                        inner.config.label,
                        slot.name
                    );
                    // Resume before the callback runs, so it can pause or solo again
                    inner.solo = None;
                    inner.absorb_pause(rest, dt);
                    inner.set_all_paused(false);
                }
            }
            tracing::debug!("ChannelScheduler[{}]: finished '{}'", inner.config.label, slot.name);
        }

        // Removed first: the callback may reuse the channel name
        state.complete();
    }
}

fn warn_if_crowded(inner: &SchedulerInner) {
    if let Some(max) = inner.config.max_channels {
        if inner.channels.len() > max {
            tracing::warn!(
                "ChannelScheduler[{}]: {} channels registered, limit is {}",
                inner.config.label,
                inner.channels.len(),
                max
            );
        }
    }
}

impl Default for ChannelScheduler {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}

impl fmt::Debug for ChannelScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.shared.inner.borrow();
        f.debug_struct("ChannelScheduler")
            .field("label", &inner.config.label)
            .field("channels", &inner.channels.keys().collect::<Vec<_>>())
            .field("solo", &inner.solo.and_then(|id| inner.slots.get(id)).map(|s| &s.name))
            .field("last_tick", &inner.last_tick)
            .finish()
    }
}
