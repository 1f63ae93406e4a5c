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

//! Typed publish/subscribe messaging with deferred, batched delivery.
//!
//! The [`MessageBus`] keeps one channel per message kind, created lazily on
//! first use. Sending never invokes a subscriber: messages buffer until the
//! frame driver calls [`MessageBus::distribute_all`], which hands every
//! subscriber the kind's whole batch in one call. Subscribing returns an
//! RAII [`Subscription`]; dropping it is the supported way to unsubscribe
//! and takes effect immediately.

mod bus;
mod channel;
mod subscription;

pub use self::bus::MessageBus;
pub use self::channel::SubscriberId;
pub use self::subscription::Subscription;
