// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::error::ScheduleError;
use super::event::{EventCallback, Repeat, ScheduledEvent};
use crate::pool::{SlotKey, SlotPool};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

/// A cancellable reference to a scheduled event.
///
/// Ids are unique for the scheduler's whole lifetime; once the event has
/// fired its last repeat or been cancelled, the id is permanently dead and
/// all queries on it read as absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(SlotKey);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Default)]
struct SchedulerInner {
    events: SlotPool<ScheduledEvent>,
    /// Keys staged for removal: cancellations plus events that spent their
    /// last repeat. Always a subset of the live pool keys; drained in one
    /// batch at the end of each update.
    retired: HashSet<SlotKey>,
}

/// Advances timed callbacks once per tick.
///
/// The scheduler is a cheap clonable handle over shared state, so callbacks
/// that captured a clone can schedule, cancel, and clear from inside their
/// own invocation. A sweep walks a snapshot of the live keys: events added
/// mid-sweep are first advanced on the next update, and staged removals are
/// applied in one batch after the sweep completes, so iteration is never
/// invalidated by callback side effects.
///
/// `update` and the callbacks it runs are not re-entrant: a callback must
/// not call `update` again.
#[derive(Debug, Clone, Default)]
pub struct EventScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl EventScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        log::info!("EventScheduler initialized.");
        Self::default()
    }

    /// Schedules a callback that fires every `period` seconds until
    /// cancelled, the first time once `delay` seconds have accumulated.
    ///
    /// A zero delay fires on the very first update. The callback receives
    /// `(total_elapsed, repeat_index)`.
    ///
    /// ## Errors
    /// [`ScheduleError`] if `period` or `delay` is negative or non-finite.
    pub fn schedule_repeating(
        &self,
        period: f64,
        delay: f64,
        callback: impl FnMut(f64, usize) + 'static,
    ) -> Result<EventId, ScheduleError> {
        self.schedule_event(Repeat::Infinite, period, delay, callback)
    }

    /// Schedules a callback that fires every `period` seconds, exactly
    /// `repeats` times, the first time once `delay` seconds have
    /// accumulated.
    ///
    /// ## Errors
    /// [`ScheduleError`] if `period` or `delay` is negative or non-finite,
    /// or if `repeats` is zero.
    pub fn schedule_fixed(
        &self,
        period: f64,
        delay: f64,
        repeats: usize,
        callback: impl FnMut(f64, usize) + 'static,
    ) -> Result<EventId, ScheduleError> {
        if repeats == 0 {
            return Err(ScheduleError::ZeroRepeats);
        }
        self.schedule_event(Repeat::Fixed(repeats), period, delay, callback)
    }

    /// Schedules one fixed event per entry in `delays`, all sharing the
    /// callback and a common cycle equal to the sum of the entries; entry
    /// `k` is offset within the cycle by the cumulative sum through `k`.
    ///
    /// With `delays = [0.2, 0.3, 0.5]` the three events fire at 0.2s, 0.5s
    /// and 1.0s of every 1.0s cycle. Each member repeats `repeats` times
    /// independently; cancelling one id leaves its siblings running.
    ///
    /// ## Errors
    /// [`ScheduleError`] if `delays` is empty, an entry is negative or
    /// non-finite, or `repeats` is zero. Nothing is scheduled on error.
    pub fn schedule_series(
        &self,
        delays: &[f64],
        repeats: usize,
        callback: impl FnMut(f64, usize) + 'static,
    ) -> Result<Vec<EventId>, ScheduleError> {
        if delays.is_empty() {
            return Err(ScheduleError::EmptySeries);
        }
        for &delay in delays {
            check_delay(delay)?;
        }
        if repeats == 0 {
            return Err(ScheduleError::ZeroRepeats);
        }

        let period: f64 = delays.iter().sum();
        let callback: EventCallback = Rc::new(RefCell::new(callback));
        let mut inner = self.inner.borrow_mut();
        let mut ids = Vec::with_capacity(delays.len());
        let mut offset = 0.0;
        for &delay in delays {
            offset += delay;
            let event =
                ScheduledEvent::new(Repeat::Fixed(repeats), period, offset, Rc::clone(&callback));
            ids.push(EventId(inner.events.insert(event)));
        }
        log::debug!(
            "Scheduled a series of {} event(s) over a {period:.3}s cycle.",
            ids.len()
        );
        Ok(ids)
    }

    /// Schedules a single firing of `callback` once `delay` seconds have
    /// accumulated.
    ///
    /// ## Errors
    /// [`ScheduleError`] if `delay` is negative or non-finite.
    pub fn schedule_delayed(
        &self,
        delay: f64,
        callback: impl FnOnce() + 'static,
    ) -> Result<EventId, ScheduleError> {
        let mut callback = Some(callback);
        self.schedule_event(Repeat::Fixed(1), 0.0, delay, move |_, _| {
            if let Some(callback) = callback.take() {
                callback();
            }
        })
    }

    /// Stages the event for removal. It fires no more, including later in
    /// the sweep currently running; the pool slot itself is reclaimed in the
    /// batch at the end of the next (or current) update.
    ///
    /// Cancelling an id that already fired its last repeat, was already
    /// cancelled, or never existed is a no-op.
    pub fn cancel(&self, id: EventId) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        if inner.events.contains(id.0) && inner.retired.insert(id.0) {
            log::debug!("Event {id} cancelled; removal staged for the end of the sweep.");
        }
    }

    /// Advances every live event by `dt` seconds, invoking the callbacks of
    /// all events whose period elapsed, then applies every staged removal in
    /// one batch.
    ///
    /// Per-event bookkeeping completes before its callback runs, so a
    /// callback observing the scheduler sees post-firing state. A negative
    /// or non-finite `dt` advances nothing and is logged as an error.
    pub fn update(&self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            log::error!("{}", ScheduleError::InvalidDelta { dt });
            return;
        }

        let snapshot: Vec<SlotKey> = {
            let guard = self.inner.borrow();
            guard.events.keys().collect()
        };
        log::trace!("Scheduler sweep over {} event(s), dt = {dt:.4}s.", snapshot.len());

        for key in snapshot {
            let firing = {
                let mut guard = self.inner.borrow_mut();
                let inner = &mut *guard;
                if inner.retired.contains(&key) {
                    None
                } else {
                    match inner.events.get_mut(key) {
                        Some(event) => match event.advance(dt) {
                            Some((total, index)) => {
                                let callback = event.callback();
                                if event.is_spent() {
                                    inner.retired.insert(key);
                                }
                                Some((callback, total, index))
                            }
                            None => None,
                        },
                        // Removed by a clear() from an earlier callback.
                        None => None,
                    }
                }
            };
            if let Some((callback, total, index)) = firing {
                log::trace!("Event firing at {total:.4}s (repeat {index}).");
                (callback.borrow_mut())(total, index);
            }
        }

        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        for key in inner.retired.drain() {
            if inner.events.remove(key).is_err() {
                log::warn!("Retired event key {key} had already left the pool.");
            }
        }
    }

    /// Removes every event unconditionally and immediately. Safe to call
    /// from inside a callback; the rest of the running sweep finds nothing
    /// left to fire.
    pub fn clear(&self) {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        let dropped = inner.events.len();
        inner.events.clear();
        inner.retired.clear();
        if dropped > 0 {
            log::debug!("Cleared {dropped} scheduled event(s).");
        }
    }

    /// Number of scheduled events, excluding ones staged for removal.
    pub fn len(&self) -> usize {
        let guard = self.inner.borrow();
        guard.events.len() - guard.retired.len()
    }

    /// Returns `true` if no events are scheduled.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `id` refers to an event that can still fire.
    pub fn contains(&self, id: EventId) -> bool {
        let guard = self.inner.borrow();
        guard.events.contains(id.0) && !guard.retired.contains(&id.0)
    }

    /// Seconds until the event's next firing, or `None` for a dead id.
    pub fn time_left(&self, id: EventId) -> Option<f64> {
        self.query(id, |event| event.time_left())
    }

    /// Whether the event fires until cancelled, or `None` for a dead id.
    pub fn is_infinite(&self, id: EventId) -> Option<bool> {
        self.query(id, |event| event.is_infinite())
    }

    /// Remaining firings of a fixed event. `None` for a dead id and for
    /// infinite events; pair with [`EventScheduler::is_infinite`] to tell
    /// the two apart.
    pub fn repeats_left(&self, id: EventId) -> Option<usize> {
        self.query(id, |event| event.repeats_left()).flatten()
    }

    fn schedule_event(
        &self,
        repeat: Repeat,
        period: f64,
        delay: f64,
        callback: impl FnMut(f64, usize) + 'static,
    ) -> Result<EventId, ScheduleError> {
        check_period(period)?;
        check_delay(delay)?;

        let event = ScheduledEvent::new(repeat, period, delay, Rc::new(RefCell::new(callback)));
        let key = self.inner.borrow_mut().events.insert(event);
        let id = EventId(key);
        log::debug!("Scheduled event {id} ({repeat:?}, period {period:.3}s, delay {delay:.3}s).");
        Ok(id)
    }

    fn query<R>(&self, id: EventId, read: impl FnOnce(&ScheduledEvent) -> R) -> Option<R> {
        let guard = self.inner.borrow();
        if guard.retired.contains(&id.0) {
            return None;
        }
        guard.events.get(id.0).map(read)
    }
}

fn check_period(period: f64) -> Result<(), ScheduleError> {
    if !period.is_finite() || period < 0.0 {
        return Err(ScheduleError::InvalidPeriod { period });
    }
    Ok(())
}

fn check_delay(delay: f64) -> Result<(), ScheduleError> {
    if !delay.is_finite() || delay < 0.0 {
        return Err(ScheduleError::InvalidDelay { delay });
    }
    Ok(())
}
