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

//! Errors reported when registering events with the scheduler.

use std::fmt;

/// A malformed scheduling request, rejected before any event is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleError {
    /// The period is negative, NaN, or infinite. Zero is allowed: a
    /// zero-period event is due on every update.
    InvalidPeriod {
        /// The rejected period, in seconds.
        period: f64,
    },
    /// A delay (or series entry) is negative, NaN, or infinite.
    InvalidDelay {
        /// The rejected delay, in seconds.
        delay: f64,
    },
    /// A fixed schedule needs at least one repeat.
    ZeroRepeats,
    /// A series needs at least one delay entry.
    EmptySeries,
    /// The frame delta passed to `update` is negative, NaN, or infinite.
    InvalidDelta {
        /// The rejected delta, in seconds.
        dt: f64,
    },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::InvalidPeriod { period } => {
                write!(f, "Invalid period {period}s: must be finite and non-negative")
            }
            ScheduleError::InvalidDelay { delay } => {
                write!(f, "Invalid delay {delay}s: must be finite and non-negative")
            }
            ScheduleError::ZeroRepeats => {
                write!(f, "A fixed event needs at least one repeat")
            }
            ScheduleError::EmptySeries => {
                write!(f, "A scheduled series needs at least one delay entry")
            }
            ScheduleError::InvalidDelta { dt } => {
                write!(f, "Invalid frame delta {dt}s: must be finite and non-negative")
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
