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

//! # Agora Core
//!
//! Decoupled event infrastructure for the Agora engine: a typed message bus
//! with deferred, batched delivery and a time-driven event scheduler backed
//! by a stable-key slotted pool.
//!
//! The core is single-threaded and tick-based. Each logical frame performs,
//! in order: deliver all buffered messages ([`MessageBus::distribute_all`]),
//! run game logic (which may send, subscribe, schedule, and cancel), then
//! advance timed callbacks ([`EventScheduler::update`]).

#![warn(missing_docs)]

pub mod message;
pub mod pool;
pub mod schedule;
pub mod utils;

pub use message::{MessageBus, SubscriberId, Subscription};
pub use pool::{PoolError, SlotKey, SlotPool};
pub use schedule::{EventId, EventScheduler, ScheduleError};
pub use utils::timer::TickClock;
