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

//! Stable-key, densely packed storage.
//!
//! A [`SlotPool`] keeps its elements contiguous for fast iteration while
//! handing out [`SlotKey`]s that stay valid no matter which other elements
//! are removed. Removal compacts the storage by relocating the last element
//! into the freed slot, so callers may rely on key stability but never on
//! positional stability.

mod slot_pool;

pub use self::slot_pool::{PoolError, SlotKey, SlotPool};
