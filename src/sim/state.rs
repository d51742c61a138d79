//! Game state and the player craft
//!
//! Counters, hit points and the run phase live in [`GameState`]; the craft's
//! motion state machine lives in [`PlayerCraft`].

use std::time::Duration;

use glam::{EulerRot, Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{INITIAL_HIT_POINTS, REGEN_FULL, REGEN_PER_FRAME};
use crate::map_linear;
use crate::settings::{CraftSettings, Span};

/// Pointer range mapped onto the steering spans (slightly biased right/up)
const POINTER_MIN: f32 = -1.0;
const POINTER_MAX: f32 = 1.1;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start
    Title,
    /// A run is in progress (including the destroyed craft's fall)
    Running,
    /// The wreck left the scene; waiting for a restart
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CraftState {
    /// Flying in toward the play plane
    PreLaunch,
    Flying,
    /// Terminal for the run: falling out of the scene
    Destroyed,
}

/// The player's ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerCraft {
    pub position: Vec3,
    /// Nose-down rotation around x (radians, non-positive)
    pub pitch: f32,
    /// Rotation around y, only changes while falling
    pub yaw: f32,
    pub state: CraftState,
    /// Set on a hit, cleared once the bounce settles
    pub cooldown: bool,
}

impl PlayerCraft {
    pub fn launch(settings: &CraftSettings) -> Self {
        Self {
            position: settings.launch_position,
            pitch: 0.0,
            yaw: 0.0,
            state: CraftState::PreLaunch,
            cooldown: false,
        }
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.pitch, self.yaw, 0.0)
    }

    pub fn is_flying(&self) -> bool {
        self.state == CraftState::Flying
    }

    /// Close in on the play plane; becomes `Flying` on arrival
    pub fn fly_in(&mut self, settings: &CraftSettings) {
        if self.state != CraftState::PreLaunch {
            return;
        }
        self.position.z -= settings.fly_in_speed;
        if self.position.z <= 0.0 {
            self.position.z = 0.0;
            self.state = CraftState::Flying;
            log::info!("Craft launched");
        }
    }

    /// Follow the pointer, pushed back by the current bounce offset
    pub fn steer(&mut self, pointer: Vec2, touch: bool, bounce: f32, settings: &CraftSettings) {
        if self.state == CraftState::Destroyed {
            return;
        }
        let x_span = if touch {
            settings.steer_x_touch
        } else {
            settings.steer_x
        };
        self.position.x = map_pointer(pointer.x, x_span) - bounce;
        self.position.y = map_pointer(pointer.y, settings.steer_y) + bounce;
        self.pitch = -map_pointer(pointer.y, settings.pitch);
    }

    pub fn destroy(&mut self) {
        self.state = CraftState::Destroyed;
    }

    /// One frame of the wreck's fall. Returns true once it has left the scene.
    pub fn descend(&mut self, settings: &CraftSettings) -> bool {
        if self.position.x <= settings.wreck_limit_x {
            return true;
        }
        self.position.x += settings.descent.x;
        self.position.y += settings.descent.y;
        self.yaw += settings.descent.z;
        false
    }
}

fn map_pointer(v: f32, span: Span) -> f32 {
    map_linear(v, POINTER_MIN, POINTER_MAX, span.min, span.max)
}

/// Run counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Frames flown this run
    pub distance: u64,
    /// Negative means the craft is destroyed
    pub hit_points: i32,
    /// Regeneration gauge in tenths of a percent
    pub regen: u16,
    /// Asteroid spawn interval currently in effect
    pub spawn_interval: Duration,
}

impl GameState {
    pub fn new(base_interval: Duration) -> Self {
        Self {
            phase: GamePhase::Title,
            distance: 0,
            hit_points: INITIAL_HIT_POINTS,
            regen: 0,
            spawn_interval: base_interval,
        }
    }

    /// Fresh counters for a new run; the phase is left to the caller
    pub fn reset(&mut self, base_interval: Duration) {
        *self = Self {
            phase: self.phase,
            ..Self::new(base_interval)
        };
    }

    /// Count one flying frame. Returns true when a hit point was regenerated.
    pub fn advance_frame(&mut self) -> bool {
        self.distance += 1;
        self.regen += REGEN_PER_FRAME;
        if self.regen >= REGEN_FULL {
            self.regen = 0;
            self.hit_points += 1;
            log::debug!("Hit point regenerated ({} now)", self.hit_points);
            return true;
        }
        false
    }

    pub fn regen_percent(&self) -> f32 {
        self.regen as f32 / 10.0
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            phase: self.phase,
            distance: self.distance,
            hit_points: self.hit_points,
            regen_percent: self.regen_percent(),
        }
    }
}

/// Values the UI shows each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudSnapshot {
    pub phase: GamePhase,
    pub distance: u64,
    pub hit_points: i32,
    pub regen_percent: f32,
}
