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

// Agora Sandbox
// Main binary for testing and demos

use agora_core::{EventId, EventScheduler, MessageBus, TickClock};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::cell::Cell;
use std::fs;
use std::rc::Rc;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SandboxConfig {
    /// Fixed simulation step fed to the scheduler each frame.
    tick_seconds: f64,
    frames: usize,
    spawn_period: f64,
    wave_size: u32,
    slay_quota: u32,
    /// Delays between day phases; the series cycles over their sum.
    day_phases: Vec<f64>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 0.5,
            frames: 40,
            spawn_period: 2.0,
            wave_size: 3,
            slay_quota: 12,
            day_phases: vec![3.0, 2.0, 5.0],
        }
    }
}

#[derive(Debug, Clone)]
struct EnemySpawned {
    wave: u32,
    count: u32,
}

#[derive(Debug, Clone)]
struct EnemySlain {
    entity: u64,
}

fn load_config() -> Result<SandboxConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file '{path}'"))?;
            let config = serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config file '{path}'"))?;
            log::info!("Loaded sandbox config from '{path}'.");
            Ok(config)
        }
        None => Ok(SandboxConfig::default()),
    }
}

fn run_simulation(config: &SandboxConfig) -> Result<()> {
    let bus = Rc::new(MessageBus::new());
    let scheduler = EventScheduler::new();

    // --- Step 1: Wire the subscribers up ---
    // Combat engages every spawned wave and reports the kills.
    let bus_hook = Rc::clone(&bus);
    let _combat = bus.subscribe(move |batch: &[EnemySpawned]| {
        for spawn in batch {
            log::info!("Combat: wave {} engaged ({} enemies).", spawn.wave, spawn.count);
            for offset in 0..spawn.count {
                bus_hook.send(EnemySlain {
                    entity: u64::from(spawn.wave) * 100 + u64::from(offset),
                });
            }
        }
    });

    // The quest tracker counts kills and calls the spawner off at the quota.
    let spawner_slot: Rc<Cell<Option<EventId>>> = Rc::new(Cell::new(None));
    let slain_total = Rc::new(Cell::new(0u32));
    let tracker_hook = Rc::clone(&slain_total);
    let slot_hook = Rc::clone(&spawner_slot);
    let scheduler_hook = scheduler.clone();
    let quota = config.slay_quota;
    let _quest = bus.subscribe(move |batch: &[EnemySlain]| {
        for slain in batch {
            log::debug!("Quest: confirmed the kill of entity {}.", slain.entity);
        }
        tracker_hook.set(tracker_hook.get() + batch.len() as u32);
        log::info!("Quest: {}/{} enemies slain.", tracker_hook.get(), quota);
        if tracker_hook.get() >= quota {
            if let Some(spawner) = slot_hook.take() {
                scheduler_hook.cancel(spawner);
                log::info!("Quest complete; the spawner stands down.");
            }
        }
    });

    // Tutorial hints ride along for the first half of the run only.
    let mut tutorial_hints = Some(bus.subscribe(|batch: &[EnemySpawned]| {
        for spawn in batch {
            log::info!("Hint: wave {} incoming, ready your defenses!", spawn.wave);
        }
    }));

    // --- Step 2: Schedule the clock-driven events ---
    let bus_hook = Rc::clone(&bus);
    let wave_size = config.wave_size;
    let spawner = scheduler.schedule_repeating(
        config.spawn_period,
        config.spawn_period,
        move |_, index| {
            bus_hook.send(EnemySpawned {
                wave: index as u32 + 1,
                count: wave_size,
            });
        },
    )?;
    spawner_slot.set(Some(spawner));
    log::info!(
        " -> Spawner scheduled every {:.1}s as event {spawner}.",
        config.spawn_period
    );

    let phase_count = config.day_phases.len();
    let mut firings = 0usize;
    let day_ids = scheduler.schedule_series(&config.day_phases, 2, move |total, day| {
        let phase = firings % phase_count + 1;
        firings += 1;
        log::info!("Day {}: phase {phase}/{phase_count} at {total:.1}s.", day + 1);
    })?;
    log::info!(" -> Day cycle scheduled as {} staggered event(s).", day_ids.len());

    scheduler.schedule_delayed(7.5, || {
        log::info!("A distant roar: the boss stirs.");
    })?;

    // --- Step 3: Run the frame loop ---
    // Fixed simulation steps; the wall clock only reports real frame cost.
    let mut clock = TickClock::new();
    for frame in 0..config.frames {
        bus.distribute_all();

        if frame == config.frames / 2 && tutorial_hints.is_some() {
            drop(tutorial_hints.take());
            log::info!("Tutorial dismissed; its hint subscription is gone.");
        }

        scheduler.update(config.tick_seconds);
        log::trace!("Frame {frame} took {:.3}ms.", clock.tick() * 1000.0);
    }

    // --- Step 4: Report ---
    log::info!(
        "Simulation over: {:.1}s simulated across {} frames in {:.1}ms of real time.",
        config.tick_seconds * config.frames as f64,
        config.frames,
        clock.elapsed_secs_f64() * 1000.0
    );
    log::info!(
        "Final state: {} slain, {} bus channel(s), {} live scheduled event(s).",
        slain_total.get(),
        bus.channel_count(),
        scheduler.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    log::info!("Sandbox starting: {config:?}");
    run_simulation(&config)
}
