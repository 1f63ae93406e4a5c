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

use agora_core::{EventId, EventScheduler, MessageBus, Subscription};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

// --- DUMMY MESSAGES FOR THIS TEST ---
#[derive(Debug, Clone, PartialEq)]
struct EnemySpawned {
    wave: u32,
}

#[derive(Debug, Clone, PartialEq)]
struct EnemySlain {
    entity: u64,
}

/// One frame of the cooperative loop: deliver last frame's messages, then
/// advance the clock-driven events.
fn run_frame(bus: &MessageBus, scheduler: &EventScheduler, dt: f64) {
    bus.distribute_all();
    scheduler.update(dt);
}

#[test]
fn test_scheduled_spawner_feeds_subscribers_one_frame_later() {
    // --- 1. ARRANGE ---
    // A spawner event sends a message each second; a quest tracker listens.
    let bus = Rc::new(MessageBus::new());
    let scheduler = EventScheduler::new();

    let bus_hook = Rc::clone(&bus);
    scheduler
        .schedule_repeating(1.0, 1.0, move |_, index| {
            bus_hook.send(EnemySpawned {
                wave: index as u32 + 1,
            });
        })
        .expect("Well-formed schedule");

    let seen_waves: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));
    let tracker_hook = Rc::clone(&seen_waves);
    let _tracker = bus.subscribe(move |batch: &[EnemySpawned]| {
        for spawn in batch {
            tracker_hook.borrow_mut().push(spawn.wave);
        }
    });

    // --- 2. ACT ---
    // Frame 1: nothing is pending yet; the spawner fires during update.
    run_frame(&bus, &scheduler, 1.0);
    assert!(
        seen_waves.borrow().is_empty(),
        "A message sent during update is not visible in the same frame"
    );
    assert_eq!(bus.pending_count::<EnemySpawned>(), 1);

    // Frames 2 and 3: each delivers the previous frame's spawn.
    run_frame(&bus, &scheduler, 1.0);
    run_frame(&bus, &scheduler, 1.0);

    // --- 3. ASSERT ---
    assert_eq!(
        *seen_waves.borrow(),
        vec![1, 2],
        "Each frame delivers exactly the wave spawned one frame earlier"
    );
    assert_eq!(
        bus.pending_count::<EnemySpawned>(),
        1,
        "Wave 3 is still in flight for the next frame"
    );
}

#[test]
fn test_handle_dropped_mid_tick_misses_already_pending_messages() {
    // --- 1. ARRANGE ---
    // Two subscribers; messages are already queued when one of them quits.
    let bus = MessageBus::new();
    let quitter_count = Rc::new(Cell::new(0));
    let stayer_seen: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));

    let quitter_hook = Rc::clone(&quitter_count);
    let quitter = bus.subscribe(move |batch: &[EnemySlain]| {
        quitter_hook.set(quitter_hook.get() + batch.len());
    });
    let stayer_hook = Rc::clone(&stayer_seen);
    let _stayer = bus.subscribe(move |batch: &[EnemySlain]| {
        stayer_hook
            .borrow_mut()
            .extend(batch.iter().map(|slain| slain.entity));
    });

    bus.send(EnemySlain { entity: 1 });
    bus.send(EnemySlain { entity: 2 });

    // --- 2. ACT ---
    drop(quitter);
    bus.distribute_all();

    // --- 3. ASSERT ---
    assert_eq!(
        quitter_count.get(),
        0,
        "Messages pending at drop time must never reach the dropped handle"
    );
    assert_eq!(
        *stayer_seen.borrow(),
        vec![1, 2],
        "The surviving subscriber still gets the whole batch in order"
    );
}

#[test]
fn test_subscriber_can_cancel_the_event_that_feeds_it() {
    // --- 1. ARRANGE ---
    // The quest tracker calls off the spawner once three enemies are out.
    let bus = Rc::new(MessageBus::new());
    let scheduler = EventScheduler::new();

    let spawner_slot: Rc<Cell<Option<EventId>>> = Rc::new(Cell::new(None));
    let bus_hook = Rc::clone(&bus);
    let spawner = scheduler
        .schedule_repeating(1.0, 1.0, move |_, index| {
            bus_hook.send(EnemySpawned {
                wave: index as u32 + 1,
            });
        })
        .expect("Well-formed schedule");
    spawner_slot.set(Some(spawner));

    let spawn_count = Rc::new(Cell::new(0));
    let tracker_hook = Rc::clone(&spawn_count);
    let scheduler_hook = scheduler.clone();
    let _tracker = bus.subscribe(move |batch: &[EnemySpawned]| {
        tracker_hook.set(tracker_hook.get() + batch.len());
        if tracker_hook.get() >= 3 {
            if let Some(id) = spawner_slot.get() {
                scheduler_hook.cancel(id);
            }
        }
    });

    // --- 2. ACT ---
    // Spawns land one frame after firing, so the third is seen in frame 4.
    for _ in 0..6 {
        run_frame(&bus, &scheduler, 1.0);
    }

    // --- 3. ASSERT ---
    assert_eq!(
        spawn_count.get(),
        3,
        "No spawn may be delivered after the tracker cancelled the spawner"
    );
    assert!(
        !scheduler.contains(spawner),
        "The cancelled spawner is gone from the scheduler"
    );
    assert!(scheduler.is_empty());
    assert_eq!(
        bus.pending_count::<EnemySpawned>(),
        0,
        "Nothing is left in flight once the spawner is silent"
    );
}

/// A subsystem the way surrounding game code writes one: subscriptions ride
/// along as fields, and scheduled events are cancelled in drop.
struct CombatScreen {
    scheduler: EventScheduler,
    regen: EventId,
    _slain_sub: Subscription<EnemySlain>,
}

impl CombatScreen {
    fn enter(
        bus: &MessageBus,
        scheduler: &EventScheduler,
        slain_seen: &Rc<Cell<usize>>,
        healed: &Rc<Cell<u32>>,
    ) -> Self {
        let slain_hook = Rc::clone(slain_seen);
        let slain_sub = bus.subscribe(move |batch: &[EnemySlain]| {
            slain_hook.set(slain_hook.get() + batch.len());
        });
        let heal_hook = Rc::clone(healed);
        let regen = scheduler
            .schedule_repeating(1.0, 1.0, move |_, _| {
                heal_hook.set(heal_hook.get() + 5);
            })
            .expect("Well-formed schedule");
        Self {
            scheduler: scheduler.clone(),
            regen,
            _slain_sub: slain_sub,
        }
    }
}

impl Drop for CombatScreen {
    fn drop(&mut self) {
        self.scheduler.cancel(self.regen);
    }
}

#[test]
fn test_screen_teardown_silences_all_of_its_callbacks() {
    // --- 1. ARRANGE ---
    let bus = MessageBus::new();
    let scheduler = EventScheduler::new();
    let slain_seen = Rc::new(Cell::new(0));
    let healed = Rc::new(Cell::new(0));

    let screen = CombatScreen::enter(&bus, &scheduler, &slain_seen, &healed);

    // One live frame while the screen is up.
    bus.send(EnemySlain { entity: 9 });
    run_frame(&bus, &scheduler, 1.0);
    assert_eq!(slain_seen.get(), 1, "The live screen hears its messages");
    assert_eq!(healed.get(), 5, "The live screen's regen ticks");

    // --- 2. ACT ---
    // Leaving the screen must silence both the subscription and the event.
    drop(screen);
    bus.send(EnemySlain { entity: 10 });
    run_frame(&bus, &scheduler, 1.0);
    run_frame(&bus, &scheduler, 1.0);

    // --- 3. ASSERT ---
    assert_eq!(
        slain_seen.get(),
        1,
        "Messages after teardown must not reach the dead screen"
    );
    assert_eq!(healed.get(), 5, "The cancelled regen event must not tick");
    assert!(scheduler.is_empty(), "Teardown left no events behind");
    assert_eq!(
        bus.subscriber_count::<EnemySlain>(),
        0,
        "Teardown left no registrations behind"
    );
    assert_eq!(
        bus.channel_count(),
        1,
        "The kind's channel itself persists for future subscribers"
    );
}
