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
use std::any::{self, Any};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Identifies one subscriber within one message kind's channel.
///
/// Ids are the smallest unused non-negative integer at registration time and
/// become reusable once the subscriber deregisters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(u32);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callback invoked with a kind's entire pending batch, once per
/// distribution pass.
pub(crate) type BatchCallback<M> = Rc<RefCell<dyn FnMut(&[M])>>;

/// One entry in a channel's subscriber table.
///
/// Freed ids are reused, so the id alone cannot identify a registration
/// across a distribution pass. The generation is stamped at registration
/// and never repeats within a channel; a roster snapshot compares it to
/// tell the current occupant of an id from the one it replaced.
struct Registration<M: 'static> {
    generation: u64,
    callback: BatchCallback<M>,
}

/// Type-erased face of a channel, so the bus can store and distribute
/// channels of every message kind behind one map.
pub(crate) trait AnyChannel {
    fn as_rc_any(self: Rc<Self>) -> Rc<dyn Any>;
    fn distribute(&self);
    fn pending_len(&self) -> usize;
    fn subscriber_len(&self) -> usize;
}

/// Queue and subscriber table for exactly one message kind.
///
/// The pending queue is a flume channel whose both ends the struct owns;
/// sends buffer there until [`MessageChannel::distribute`] drains them.
pub(crate) struct MessageChannel<M: 'static> {
    kind: &'static str,
    sender: flume::Sender<M>,
    receiver: flume::Receiver<M>,
    subscribers: RefCell<HashMap<SubscriberId, Registration<M>>>,
    next_generation: Cell<u64>,
}

impl<M: 'static> MessageChannel<M> {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        let kind = any::type_name::<M>();
        log::debug!("Message channel opened for {kind}.");
        Self {
            kind,
            sender,
            receiver,
            subscribers: RefCell::new(HashMap::new()),
            next_generation: Cell::new(0),
        }
    }

    /// Appends a message to the pending queue. Never invokes a subscriber.
    pub(crate) fn push(&self, message: M) {
        log::trace!("Queued a message of {}.", self.kind);
        if let Err(e) = self.sender.send(message) {
            log::error!("Failed to queue a message of {}: {e}.", self.kind);
        }
    }

    /// Registers a callback under the smallest currently-unused id.
    pub(crate) fn register(&self, callback: BatchCallback<M>) -> SubscriberId {
        let mut subscribers = self.subscribers.borrow_mut();
        let mut raw = 0u32;
        while subscribers.contains_key(&SubscriberId(raw)) {
            raw += 1;
        }
        let id = SubscriberId(raw);
        let generation = self.next_generation.get();
        self.next_generation.set(generation + 1);
        subscribers.insert(
            id,
            Registration {
                generation,
                callback,
            },
        );
        log::debug!("Subscriber {id} registered for {}.", self.kind);
        id
    }

    /// Removes a registration, making its id reusable. Returns whether the
    /// id was registered.
    pub(crate) fn deregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.borrow_mut().remove(&id).is_some();
        if removed {
            log::debug!("Subscriber {id} deregistered from {}.", self.kind);
        }
        removed
    }

    pub(crate) fn is_registered(&self, id: SubscriberId) -> bool {
        self.subscribers.borrow().contains_key(&id)
    }

    /// Drains the pending queue and hands the whole batch to every
    /// subscriber that is still registered when its turn comes.
    ///
    /// The queue is drained before any callback runs, so messages sent from
    /// inside a callback wait for the next pass. The subscriber roster is
    /// snapshotted the same way: additions during the pass are not called,
    /// and removals during the pass are skipped, even when a newcomer has
    /// already reused the freed id. Call order across subscribers is
    /// unspecified.
    pub(crate) fn distribute(&self) {
        let batch: Vec<M> = self.receiver.try_iter().collect();
        if batch.is_empty() {
            return;
        }
        let roster: Vec<(SubscriberId, u64, BatchCallback<M>)> = self
            .subscribers
            .borrow()
            .iter()
            .map(|(id, entry)| (*id, entry.generation, Rc::clone(&entry.callback)))
            .collect();
        log::trace!(
            "Distributing {} message(s) of {} to {} subscriber(s).",
            batch.len(),
            self.kind,
            roster.len()
        );
        for (id, generation, callback) in roster {
            // A reused id belongs to a different registration; only the
            // matching generation may fire.
            let current = self
                .subscribers
                .borrow()
                .get(&id)
                .map(|entry| entry.generation);
            if current != Some(generation) {
                continue;
            }
            (callback.borrow_mut())(&batch);
        }
    }
}

impl<M: 'static> AnyChannel for MessageChannel<M> {
    fn as_rc_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn distribute(&self) {
        MessageChannel::distribute(self);
    }

    fn pending_len(&self) -> usize {
        self.receiver.len()
    }

    fn subscriber_len(&self) -> usize {
        self.subscribers.borrow().len()
    }
}
