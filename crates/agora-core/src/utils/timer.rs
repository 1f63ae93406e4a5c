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

//! Wall-clock measurement for tick loops.

use std::time::{Duration, Instant};

/// Measures the real time between ticks of a frame loop.
///
/// A frame driver calls [`TickClock::tick`] once per iteration and feeds
/// the returned delta to the scheduler as `dt`.
#[derive(Debug, Clone)]
pub struct TickClock {
    started: Instant,
    last_tick: Instant,
}

impl TickClock {
    /// Creates a clock whose first tick measures from this moment.
    #[inline]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
        }
    }

    /// Returns the seconds since the previous tick (or since creation for
    /// the first one) and starts the next interval.
    ///
    /// `Instant` is monotonic, so the delta is never negative.
    #[inline]
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f64();
        self.last_tick = now;
        delta
    }

    /// Returns the total time since the clock was created.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Returns the total time since the clock was created, in seconds.
    #[inline]
    pub fn elapsed_secs_f64(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}
