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

use super::channel::{AnyChannel, BatchCallback, MessageChannel};
use super::subscription::Subscription;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Owns one message channel per message kind and distributes their batches.
///
/// A channel is created exactly once per kind, on the first `send` or
/// `subscribe` of that kind, and lives as long as the bus; the message kind
/// is its Rust type, so no global registry of kinds exists anywhere.
///
/// Sending is enqueue-only. Delivery happens when the frame driver calls
/// [`MessageBus::distribute_all`], once per tick; a callback therefore never
/// re-enters a distribution for its own kind mid-pass. `distribute_all`
/// itself is not re-entrant: callbacks may send, subscribe, and drop
/// subscriptions, but must not call `distribute_all` again.
pub struct MessageBus {
    channels: RefCell<HashMap<TypeId, Rc<dyn AnyChannel>>>,
}

impl MessageBus {
    /// Creates a bus with no channels.
    pub fn new() -> Self {
        log::info!("MessageBus initialized.");
        Self {
            channels: RefCell::new(HashMap::new()),
        }
    }

    /// Appends `message` to the pending queue of its kind. No subscriber
    /// runs until the next [`MessageBus::distribute_all`].
    pub fn send<M: 'static>(&self, message: M) {
        self.channel_for::<M>().push(message);
    }

    /// Registers `callback` for all future batches of kind `M` and returns
    /// the handle that owns the registration.
    ///
    /// The callback receives the kind's entire pending batch once per
    /// distribution pass. Dropping the returned [`Subscription`] is the
    /// supported way to unsubscribe.
    pub fn subscribe<M, F>(&self, callback: F) -> Subscription<M>
    where
        M: 'static,
        F: FnMut(&[M]) + 'static,
    {
        let channel = self.channel_for::<M>();
        let callback: BatchCallback<M> = Rc::new(RefCell::new(callback));
        let id = channel.register(Rc::clone(&callback));
        Subscription::new(Rc::downgrade(&channel), id, callback)
    }

    /// Runs one distribution pass: every channel with pending messages hands
    /// its whole batch to each of its subscribers, then starts empty.
    ///
    /// Messages a callback sends of its own kind wait for the next pass.
    /// Order across kinds and across subscribers is unspecified.
    pub fn distribute_all(&self) {
        let channels: Vec<Rc<dyn AnyChannel>> =
            self.channels.borrow().values().map(Rc::clone).collect();
        log::trace!("Distribution pass over {} channel(s).", channels.len());
        for channel in channels {
            channel.distribute();
        }
    }

    /// Number of messages of kind `M` waiting for the next pass. Zero for a
    /// kind whose channel was never created; asking does not create it.
    pub fn pending_count<M: 'static>(&self) -> usize {
        self.channels
            .borrow()
            .get(&TypeId::of::<M>())
            .map_or(0, |channel| channel.pending_len())
    }

    /// Number of live subscribers of kind `M`. Zero for a kind whose channel
    /// was never created; asking does not create it.
    pub fn subscriber_count<M: 'static>(&self) -> usize {
        self.channels
            .borrow()
            .get(&TypeId::of::<M>())
            .map_or(0, |channel| channel.subscriber_len())
    }

    /// Number of channels created so far.
    pub fn channel_count(&self) -> usize {
        self.channels.borrow().len()
    }

    /// Returns the kind's channel, creating it on first use.
    fn channel_for<M: 'static>(&self) -> Rc<MessageChannel<M>> {
        let entry = {
            let mut channels = self.channels.borrow_mut();
            Rc::clone(
                channels
                    .entry(TypeId::of::<M>())
                    .or_insert_with(|| Rc::new(MessageChannel::<M>::new()) as Rc<dyn AnyChannel>),
            )
        };
        entry
            .as_rc_any()
            .downcast::<MessageChannel<M>>()
            .expect("channel map entry does not match its TypeId key")
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("channel_count", &self.channel_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Local game-flavored message kinds, as a collaborator would define.
    #[derive(Debug, Clone, PartialEq)]
    struct EntityDied {
        entity: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct WaveCleared;

    #[test]
    fn batch_reaches_subscriber_once_per_pass() {
        let bus = MessageBus::new();
        let batches: Rc<RefCell<Vec<Vec<EntityDied>>>> = Rc::new(RefCell::new(Vec::new()));

        let batches_hook = Rc::clone(&batches);
        let subscription = bus.subscribe(move |batch: &[EntityDied]| {
            batches_hook.borrow_mut().push(batch.to_vec());
        });

        bus.send(EntityDied { entity: 1 });
        bus.send(EntityDied { entity: 2 });
        bus.send(EntityDied { entity: 3 });
        bus.distribute_all();

        {
            let batches = batches.borrow();
            assert_eq!(batches.len(), 1, "N sends make one batched delivery");
            assert_eq!(
                batches[0],
                vec![
                    EntityDied { entity: 1 },
                    EntityDied { entity: 2 },
                    EntityDied { entity: 3 }
                ],
                "FIFO within the kind"
            );
        }

        bus.distribute_all();
        assert_eq!(
            batches.borrow().len(),
            1,
            "No further delivery until new messages are sent"
        );
        drop(subscription);
    }

    #[test]
    fn channels_are_created_lazily_and_once() {
        let bus = MessageBus::new();
        assert_eq!(bus.channel_count(), 0);

        bus.send(EntityDied { entity: 1 });
        assert_eq!(bus.channel_count(), 1);

        let subscription = bus.subscribe(|_: &[EntityDied]| {});
        assert_eq!(bus.channel_count(), 1, "Same kind reuses its channel");

        bus.send(WaveCleared);
        assert_eq!(bus.channel_count(), 2);
        drop(subscription);
    }

    #[test]
    fn kinds_are_isolated() {
        let bus = MessageBus::new();
        let deaths = Rc::new(Cell::new(0));
        let waves = Rc::new(Cell::new(0));

        let deaths_hook = Rc::clone(&deaths);
        let _deaths_sub = bus.subscribe(move |batch: &[EntityDied]| {
            deaths_hook.set(deaths_hook.get() + batch.len());
        });
        let waves_hook = Rc::clone(&waves);
        let _waves_sub = bus.subscribe(move |batch: &[WaveCleared]| {
            waves_hook.set(waves_hook.get() + batch.len());
        });

        bus.send(EntityDied { entity: 7 });
        bus.distribute_all();

        assert_eq!(deaths.get(), 1);
        assert_eq!(waves.get(), 0, "Other kinds must stay untouched");
    }

    #[test]
    fn unheard_batches_are_discarded_at_distribution() {
        let bus = MessageBus::new();

        bus.send(EntityDied { entity: 1 });
        assert_eq!(bus.pending_count::<EntityDied>(), 1);
        bus.distribute_all();
        assert_eq!(bus.pending_count::<EntityDied>(), 0);

        // A later subscriber must not see the discarded batch.
        let count = Rc::new(Cell::new(0));
        let hook = Rc::clone(&count);
        let _subscription = bus.subscribe(move |batch: &[EntityDied]| {
            hook.set(hook.get() + batch.len());
        });
        bus.distribute_all();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn every_subscriber_gets_the_batch() {
        let bus = MessageBus::new();
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let first_hook = Rc::clone(&first);
        let _first_sub = bus.subscribe(move |batch: &[EntityDied]| {
            first_hook.set(first_hook.get() + batch.len());
        });
        let second_hook = Rc::clone(&second);
        let _second_sub = bus.subscribe(move |batch: &[EntityDied]| {
            second_hook.set(second_hook.get() + batch.len());
        });

        bus.send(EntityDied { entity: 4 });
        bus.send(EntityDied { entity: 5 });
        bus.distribute_all();

        assert_eq!(first.get(), 2);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn introspection_does_not_create_channels() {
        let bus = MessageBus::new();

        assert_eq!(bus.pending_count::<EntityDied>(), 0);
        assert_eq!(bus.subscriber_count::<EntityDied>(), 0);
        assert_eq!(
            bus.channel_count(),
            0,
            "Counting must not allocate a channel"
        );

        let subscription = bus.subscribe(|_: &[EntityDied]| {});
        assert_eq!(bus.subscriber_count::<EntityDied>(), 1);
        drop(subscription);
        assert_eq!(bus.subscriber_count::<EntityDied>(), 0);
        assert_eq!(bus.channel_count(), 1, "The channel itself persists");
    }

    #[test]
    fn sends_from_inside_a_callback_wait_for_the_next_pass() {
        let bus = Rc::new(MessageBus::new());
        let batches: Rc<RefCell<Vec<Vec<EntityDied>>>> = Rc::new(RefCell::new(Vec::new()));

        // Chain reaction: the death of entity 0 kills entity 1, once.
        let bus_hook = Rc::clone(&bus);
        let batches_hook = Rc::clone(&batches);
        let _subscription = bus.subscribe(move |batch: &[EntityDied]| {
            batches_hook.borrow_mut().push(batch.to_vec());
            for death in batch {
                if death.entity == 0 {
                    bus_hook.send(EntityDied { entity: 1 });
                }
            }
        });

        bus.send(EntityDied { entity: 0 });
        bus.distribute_all();
        {
            let batches = batches.borrow();
            assert_eq!(
                batches.len(),
                1,
                "A chained send must not extend the current pass"
            );
            assert_eq!(batches[0], vec![EntityDied { entity: 0 }]);
        }

        bus.distribute_all();
        let batches = batches.borrow();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1], vec![EntityDied { entity: 1 }]);
    }
}
