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

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A stable reference into a [`SlotPool`], distinct from the element's
/// physical storage position.
///
/// Keys are allocated from a monotonically increasing counter and are never
/// reused, not even after [`SlotPool::clear`]. Once its element is removed,
/// a key is permanently invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotKey(u64);

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An error reported by [`SlotPool`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// The key does not resolve to a live slot: its element was removed, or
    /// the key never came from this pool.
    StaleKey {
        /// The offending key.
        key: SlotKey,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::StaleKey { key } => {
                write!(f, "Stale pool key {key}: slot was removed or never existed")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// A generic stable-key container that keeps live elements densely packed.
///
/// Values are stored in a contiguous block so iteration touches no holes and
/// needs no per-element existence checks. Removal is O(1): the last element
/// is swapped into the freed slot and both key↔position mappings are fixed
/// up. Positions therefore shuffle across removals; keys never do.
#[derive(Debug)]
pub struct SlotPool<T> {
    values: Vec<T>,
    keys: Vec<SlotKey>,
    positions: HashMap<SlotKey, usize>,
    next_key: u64,
}

impl<T> SlotPool<T> {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            keys: Vec::new(),
            positions: HashMap::new(),
            next_key: 0,
        }
    }

    /// Creates an empty pool with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            keys: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
            next_key: 0,
        }
    }

    /// Inserts a value and returns the key that will address it for the rest
    /// of its lifetime in the pool.
    pub fn insert(&mut self, value: T) -> SlotKey {
        let key = SlotKey(self.next_key);
        self.next_key += 1;
        self.positions.insert(key, self.values.len());
        self.keys.push(key);
        self.values.push(value);
        key
    }

    /// Removes the value addressed by `key` and returns it.
    ///
    /// The last element is relocated into the freed position and its mapping
    /// is fixed up, keeping the storage dense.
    ///
    /// ## Errors
    /// [`PoolError::StaleKey`] if `key` does not address a live slot. This is
    /// surfaced rather than swallowed because it indicates a lifetime bug in
    /// the caller.
    pub fn remove(&mut self, key: SlotKey) -> Result<T, PoolError> {
        let position = self
            .positions
            .remove(&key)
            .ok_or(PoolError::StaleKey { key })?;
        let value = self.values.swap_remove(position);
        self.keys.swap_remove(position);
        if position < self.values.len() {
            let relocated = self.keys[position];
            self.positions.insert(relocated, position);
        }
        Ok(value)
    }

    /// Returns a reference to the value addressed by `key`, or `None` if the
    /// key is stale.
    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.positions.get(&key).map(|&position| &self.values[position])
    }

    /// Returns a mutable reference to the value addressed by `key`, or `None`
    /// if the key is stale.
    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        match self.positions.get(&key) {
            Some(&position) => Some(&mut self.values[position]),
            None => None,
        }
    }

    /// Returns `true` if `key` addresses a live slot.
    pub fn contains(&self, key: SlotKey) -> bool {
        self.positions.contains_key(&key)
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the pool holds no elements.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Removes every element. Key allocation is not reset, so keys handed
    /// out before the clear stay permanently invalid instead of aliasing
    /// future elements.
    pub fn clear(&mut self) {
        self.values.clear();
        self.keys.clear();
        self.positions.clear();
    }

    /// Iterates over the keys of all live elements, in storage order.
    pub fn keys(&self) -> impl Iterator<Item = SlotKey> + '_ {
        self.keys.iter().copied()
    }

    /// Iterates over `(key, &value)` pairs of all live elements.
    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> {
        self.keys.iter().copied().zip(self.values.iter())
    }

    /// Iterates over `(key, &mut value)` pairs of all live elements.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotKey, &mut T)> {
        self.keys.iter().copied().zip(self.values.iter_mut())
    }
}

impl<T> Default for SlotPool<T> {
    fn default() -> Self {
        Self::new()
    }
}
