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

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Callback invoked on every firing with `(total_elapsed, repeat_index)`:
/// the seconds accumulated since the event was scheduled, and the zero-based
/// index of this firing.
pub(crate) type EventCallback = Rc<RefCell<dyn FnMut(f64, usize)>>;

/// Whether an event retires itself after a fixed number of firings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Repeat {
    /// Fires until cancelled.
    Infinite,
    /// Fires the given number of remaining times, then retires.
    Fixed(usize),
}

/// A single timed callback owned by the scheduler.
///
/// The delay only shifts the first firing: the elapsed counter starts at
/// `period - delay`, so the firing condition `elapsed >= period` is first met
/// once `delay` seconds of updates have accumulated, and every `period`
/// thereafter. A zero delay fires on the very first advance.
pub(crate) struct ScheduledEvent {
    repeat: Repeat,
    period: f64,
    elapsed: f64,
    total: f64,
    fired: usize,
    callback: EventCallback,
}

impl ScheduledEvent {
    pub(crate) fn new(repeat: Repeat, period: f64, delay: f64, callback: EventCallback) -> Self {
        Self {
            repeat,
            period,
            elapsed: period - delay,
            total: 0.0,
            fired: 0,
            callback,
        }
    }

    /// Moves the event's clock forward by `dt` and reports a firing as
    /// `Some((total_elapsed, repeat_index))` if the period boundary was
    /// crossed.
    ///
    /// At most one firing per call: crossing the boundary resets the elapsed
    /// counter to exactly zero, so overshoot is discarded rather than
    /// replayed. All bookkeeping completes here, before the caller invokes
    /// the callback.
    pub(crate) fn advance(&mut self, dt: f64) -> Option<(f64, usize)> {
        self.elapsed += dt;
        self.total += dt;
        if self.elapsed < self.period {
            return None;
        }
        self.elapsed = 0.0;
        let index = self.fired;
        self.fired += 1;
        if let Repeat::Fixed(left) = &mut self.repeat {
            *left -= 1;
        }
        Some((self.total, index))
    }

    /// `true` once a fixed event has used up all its firings. The scheduler
    /// removes spent events at the end of the sweep that spent them.
    pub(crate) fn is_spent(&self) -> bool {
        matches!(self.repeat, Repeat::Fixed(0))
    }

    pub(crate) fn is_infinite(&self) -> bool {
        matches!(self.repeat, Repeat::Infinite)
    }

    /// Remaining firings, or `None` for an infinite event.
    pub(crate) fn repeats_left(&self) -> Option<usize> {
        match self.repeat {
            Repeat::Infinite => None,
            Repeat::Fixed(left) => Some(left),
        }
    }

    /// Seconds until the next firing, clamped at zero.
    pub(crate) fn time_left(&self) -> f64 {
        (self.period - self.elapsed).max(0.0)
    }

    pub(crate) fn callback(&self) -> EventCallback {
        Rc::clone(&self.callback)
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("repeat", &self.repeat)
            .field("period", &self.period)
            .field("elapsed", &self.elapsed)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}
