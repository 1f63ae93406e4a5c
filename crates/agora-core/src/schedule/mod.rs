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

//! Time-driven callback scheduling.
//!
//! The [`EventScheduler`] advances a pool of timed events once per tick.
//! Callbacks may themselves schedule and cancel events mid-sweep: additions
//! join the pool immediately but are first advanced on the next tick, and
//! removals are staged and applied in one batch after the sweep, so the
//! running iteration is never invalidated.

mod error;
mod event;
mod scheduler;

pub use self::error::ScheduleError;
pub use self::scheduler::{EventId, EventScheduler};
