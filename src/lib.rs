//! Hex Flight - simulation core for an endless hex-terrain space-flight game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (terrain streaming, entities, collisions, game state)
//! - `settings`: Data-driven tuning, loaded from JSON and validated at startup
//! - `error`: Configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::ConfigError;
pub use settings::Settings;

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Fixed simulation rate; every per-frame increment is tuned against it
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / SIM_HZ as f32;
    /// Fixed simulation timestep as a scheduler duration
    pub const SIM_STEP: Duration = Duration::from_nanos(1_000_000_000 / SIM_HZ as u64);
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest measured frame delta fed into the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Number of terrain tiles kept alive in the sliding window
    pub const TILE_WINDOW: usize = 6;
    /// Discrete rotation steps a tile can take (one full turn)
    pub const TILE_ANGLE_STEPS: u8 = 24;

    /// Hit points a fresh run starts with
    pub const INITIAL_HIT_POINTS: i32 = 1;
    /// Regeneration gauge resolution: tenths of a percent, 1000 = full
    pub const REGEN_FULL: u16 = 1000;
    /// Gauge gained per flying frame (0.1 %)
    pub const REGEN_PER_FRAME: u16 = 1;

    /// Orbit angle every spawned body starts at (radians)
    pub const ORBIT_START_ANGLE: f32 = std::f32::consts::FRAC_PI_4 * 6.5;
    /// Orbit angle past which a body has left the play area
    pub const ORBIT_RETIRE_ANGLE: f32 = 7.5;

    /// Bounce-back peak offset after a collision
    pub const BOUNCE_PEAK: f32 = 15.0;
    /// Offset gained per frame while bouncing out
    pub const BOUNCE_RISE: f32 = 3.0;
    /// Offset lost per frame while settling back
    pub const BOUNCE_FALL: f32 = 0.5;
}

/// Linear remap of `x` from `[a1, a2]` to `[b1, b2]` (unclamped)
#[inline]
pub fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

/// Position of a body orbiting the z axis: the point `(0, radius, depth)`
/// rotated by `angle` around z.
#[inline]
pub fn orbit_to_cartesian(radius: f32, angle: f32, depth: f32) -> Vec3 {
    Quat::from_rotation_z(angle) * Vec3::new(0.0, radius, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_map_linear_endpoints() {
        assert!((map_linear(-1.0, -1.0, 1.1, 190.0, 220.0) - 190.0).abs() < 1e-4);
        assert!((map_linear(1.1, -1.0, 1.1, 190.0, 220.0) - 220.0).abs() < 1e-4);
    }

    #[test]
    fn test_orbit_to_cartesian() {
        let top = orbit_to_cartesian(200.0, 0.0, -20.0);
        assert!((top - Vec3::new(0.0, 200.0, -20.0)).length() < 1e-3);

        // A quarter turn counter-clockwise moves the body to -x
        let left = orbit_to_cartesian(200.0, FRAC_PI_2, 0.0);
        assert!((left - Vec3::new(-200.0, 0.0, 0.0)).length() < 1e-3);

        let full = orbit_to_cartesian(200.0, TAU, 0.0);
        assert!((full - top.with_z(0.0)).length() < 1e-3);
    }
}
