//! Fixed timestep simulation tick
//!
//! Core frame loop that advances the world deterministically.

use glam::Vec2;

use super::events::SceneEvent;
use super::state::{CraftState, GamePhase};
use super::world::GameWorld;
use crate::consts::*;

/// Input polled for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position, normalized to [-1, 1] on both axes
    pub pointer: Vec2,
    /// Narrow touch-screen steering layout
    pub touch: bool,
    /// Start (or restart) a run
    pub start: bool,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut GameWorld, input: &TickInput) {
    // Timers: every due task runs to completion before the next is taken
    world.scheduler.advance(SIM_STEP);
    while let Some(task) = world.scheduler.pop_due() {
        world.dispatch(task);
    }

    if input.start {
        world.start_run();
    }

    update_craft(world, input);

    let report = world.entities.animate(&mut world.events);
    if report.bounce_finished {
        if let Some(craft) = world.craft.as_mut() {
            craft.cooldown = false;
        }
    }

    world.terrain.scroll();
    world.starfield.spin();

    if let Some(craft) = world.craft.as_mut() {
        world
            .collisions
            .check(craft, &mut world.state, &mut world.entities);
    }

    if world.craft_flying() {
        world.state.advance_frame();
    }
    if let Some(interval) = world
        .spawner
        .retune(world.state.distance, &mut world.scheduler)
    {
        world.state.spawn_interval = interval;
    }
}

fn update_craft(world: &mut GameWorld, input: &TickInput) {
    let bounce = world.entities.bounce_offset();
    let settings = &world.settings.craft;
    let Some(craft) = world.craft.as_mut() else {
        return;
    };

    match craft.state {
        CraftState::PreLaunch => {
            craft.fly_in(settings);
            craft.steer(input.pointer, input.touch, bounce, settings);
        }
        CraftState::Flying => {
            craft.steer(input.pointer, input.touch, bounce, settings);
        }
        CraftState::Destroyed => {
            if craft.descend(settings) {
                world.craft = None;
                world.events.push(SceneEvent::CraftRemoved);
                world.state.phase = GamePhase::GameOver;
                log::info!("Game over at distance {}", world.state.distance);
            }
        }
    }
}

/// Turns measured frame time into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    /// Start request held until a step consumes it
    start_latched: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed `elapsed` seconds of wall time and run the steps it covers.
    /// One-shot inputs are consumed by the first step, which may fall in a
    /// later frame. Returns the step count.
    pub fn advance(&mut self, world: &mut GameWorld, input: &TickInput, elapsed: f32) -> u32 {
        self.accumulator += elapsed.clamp(0.0, MAX_FRAME_DT);
        self.start_latched |= input.start;

        let mut input = input.clone();
        input.start = self.start_latched;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(world, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.start = false;
            self.start_latched = false;
        }
        substeps
    }

    /// Time carried over to the next frame (seconds)
    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}
