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

use super::channel::{BatchCallback, MessageChannel, SubscriberId};
use std::fmt;
use std::rc::{Rc, Weak};

/// RAII registration for one callback on one message kind.
///
/// Created by [`MessageBus::subscribe`](super::MessageBus::subscribe); the
/// registration lives exactly as long as this handle. Dropping it
/// unregisters synchronously, so a callback is never invoked after its
/// owner let the handle go, even for messages already pending at that
/// moment.
///
/// Cloning registers a second, independent id that shares the same
/// callback; each clone unregisters itself alone. Moving the handle
/// transfers the registration untouched. The handle holds no strong
/// reference to the bus: if the bus is dropped first the handle goes
/// inert and its drop is a no-op.
#[must_use = "a subscription unregisters when dropped; bind it to keep receiving messages"]
pub struct Subscription<M: 'static> {
    channel: Weak<MessageChannel<M>>,
    id: SubscriberId,
    callback: BatchCallback<M>,
}

impl<M: 'static> Subscription<M> {
    pub(crate) fn new(
        channel: Weak<MessageChannel<M>>,
        id: SubscriberId,
        callback: BatchCallback<M>,
    ) -> Self {
        Self {
            channel,
            id,
            callback,
        }
    }

    /// The id this handle holds on its kind's channel.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the registration is still live, i.e. the bus still exists
    /// and this id is still on its roster.
    pub fn is_active(&self) -> bool {
        self.channel
            .upgrade()
            .is_some_and(|channel| channel.is_registered(self.id))
    }
}

impl<M: 'static> Clone for Subscription<M> {
    fn clone(&self) -> Self {
        let id = match self.channel.upgrade() {
            Some(channel) => channel.register(Rc::clone(&self.callback)),
            // The bus is gone; the clone is as inert as the original.
            None => self.id,
        };
        Self {
            channel: Weak::clone(&self.channel),
            id,
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<M: 'static> Drop for Subscription<M> {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            if !channel.deregister(self.id) {
                log::warn!(
                    "Subscriber {} was already gone from its channel at drop.",
                    self.id
                );
            }
        }
    }
}

impl<M: 'static> fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
