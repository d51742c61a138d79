//! Simulation settings
//!
//! Every tuning value lives here with a default matching the shipped game.
//! Settings load from JSON (missing fields fall back to defaults) and are
//! validated once at startup; a bad value is fatal.

use std::path::Path;
use std::time::Duration;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sim::table::{BandTable, IntervalTable};
use crate::sim::terrain::Biome;

/// Largest hex cell count a single terrain tile may hold
pub const MAX_TILE_CELLS: u64 = 1 << 16;
/// Deepest icosphere subdivision a spawned body may use
pub const MAX_DETAIL: u32 = 6;

/// Closed numeric range used for randomized spawn parameters and input maps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Uniform sample; a degenerate span always yields `min`
    pub fn sample<R: Rng>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min.is_finite() && self.max.is_finite() && self.min <= self.max {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                field,
                min: self.min as f64,
                max: self.max as f64,
            })
        }
    }
}

/// One biome band: heights strictly above `above × max_height`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSetting {
    pub biome: Biome,
    pub above: f32,
}

/// One difficulty step: from `distance` onward, spawn every `interval_ms`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalStep {
    pub distance: u64,
    pub interval_ms: u64,
}

/// Terrain generation and streaming
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Seed for the height field; derived from the run seed when unset
    pub noise_seed: Option<u64>,
    /// Cells on each side of a tile's center column (tile is 2n+1 wide)
    pub half_width: i32,
    /// Cells on each side of a tile's center row (tile is 2n+1 tall)
    pub half_height: i32,
    /// Hex circumradius in world units
    pub cell_size: f32,
    /// Lattice-to-noise frequency
    pub noise_frequency: f64,
    /// Offset added to raw noise before normalizing
    pub noise_offset: f64,
    /// Gain applied after the offset
    pub noise_gain: f64,
    /// Exponent biasing heights toward the middle of the range
    pub height_exponent: f64,
    /// Tallest possible cell
    pub max_height: f32,
    /// Lowest displayed height, as a fraction of `max_height`
    pub sand_floor: f32,
    /// Bands ordered from highest threshold to lowest
    pub bands: Vec<BandSetting>,
    /// Band for everything under the last threshold
    pub floor_band: Biome,
    /// Time between window advances
    pub advance_interval_ms: u64,
    /// Scroll angle gained per frame by the whole terrain group (radians)
    pub scroll_speed: f32,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            noise_seed: None,
            half_width: 12,
            half_height: 24,
            cell_size: 0.97,
            noise_frequency: 0.07,
            noise_offset: 0.8,
            noise_gain: 0.54,
            height_exponent: 1.2,
            max_height: 30.0,
            sand_floor: 0.15,
            bands: vec![
                BandSetting { biome: Biome::Snow, above: 0.8 },
                BandSetting { biome: Biome::LightSnow, above: 0.6 },
                BandSetting { biome: Biome::Rock, above: 0.5 },
                BandSetting { biome: Biome::Forest, above: 0.4 },
                BandSetting { biome: Biome::Grass, above: 0.2 },
                BandSetting { biome: Biome::Sand, above: 0.15 },
                BandSetting { biome: Biome::ShallowWater, above: 0.1 },
                BandSetting { biome: Biome::Water, above: 0.05 },
            ],
            floor_band: Biome::DeepWater,
            advance_interval_ms: 670,
            scroll_speed: 0.0065,
        }
    }
}

impl TerrainSettings {
    /// Noise seed for this run, or an error if it overflows the generator
    pub fn resolve_seed(&self, run_seed: u64) -> Result<u32, ConfigError> {
        match self.noise_seed {
            Some(seed) => u32::try_from(seed).map_err(|_| ConfigError::InvalidSeed { seed }),
            None => Ok((run_seed ^ (run_seed >> 32)) as u32),
        }
    }

    /// Band thresholds scaled to world heights
    pub fn band_table(&self) -> Result<BandTable<Biome>, ConfigError> {
        BandTable::new(
            "terrain band",
            self.bands
                .iter()
                .map(|b| (b.above * self.max_height, b.biome))
                .collect(),
            self.floor_band,
        )
    }

    pub fn advance_interval(&self) -> Duration {
        Duration::from_millis(self.advance_interval_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(seed) = self.noise_seed {
            u32::try_from(seed).map_err(|_| ConfigError::InvalidSeed { seed })?;
        }
        positive("terrain.half_width", self.half_width as f64)?;
        positive("terrain.half_height", self.half_height as f64)?;
        let cells = (2 * self.half_width as u64 + 1).checked_mul(2 * self.half_height as u64 + 1);
        match cells {
            Some(cells) if cells <= MAX_TILE_CELLS => {}
            _ => {
                return Err(ConfigError::TooLarge {
                    field: "terrain cells per tile",
                    max: MAX_TILE_CELLS,
                });
            }
        }
        positive("terrain.cell_size", self.cell_size as f64)?;
        positive("terrain.noise_frequency", self.noise_frequency)?;
        positive("terrain.noise_gain", self.noise_gain)?;
        positive("terrain.height_exponent", self.height_exponent)?;
        positive("terrain.max_height", self.max_height as f64)?;
        positive("terrain.advance_interval_ms", self.advance_interval_ms as f64)?;
        Span::new(0.0, 1.0).contains(self.sand_floor).then_some(()).ok_or(
            ConfigError::InvalidRange {
                field: "terrain.sand_floor",
                min: self.sand_floor as f64,
                max: 1.0,
            },
        )?;
        self.band_table().map(|_| ())
    }
}

/// Per-kind spawn parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodySettings {
    /// Spawn annulus: distance from the orbit axis
    pub orbit_radius: Span,
    /// Offset along the orbit axis
    pub depth: f32,
    pub scale: Span,
    /// Orbit angle gained per frame (radians)
    pub orbit_rate: f32,
    /// Euler spin gained per frame (radians)
    pub spin_rate: Vec3,
    /// Icosphere subdivision level of the base polyhedron
    pub detail: u32,
}

/// Spawn timers and difficulty
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub asteroid_intervals: Vec<IntervalStep>,
    pub min_asteroid_interval_ms: u64,
    pub planet_interval_min_ms: u64,
    pub planet_interval_max_ms: u64,
    pub asteroid: BodySettings,
    pub planet: BodySettings,
    /// Planet surface noise amplitude
    pub planet_amplitude: f32,
    /// Displacement above which a planet vertex is a high tier
    pub tier_high: f32,
    /// Displacement above which a planet vertex is a medium tier
    pub tier_medium: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        let step = |distance, interval_ms| IntervalStep {
            distance,
            interval_ms,
        };
        Self {
            asteroid_intervals: vec![
                step(0, 3000),
                step(800, 2500),
                step(1500, 2000),
                step(2200, 1200),
                step(2800, 800),
                step(3300, 600),
                step(3700, 450),
                step(4000, 300),
                step(4200, 250),
            ],
            min_asteroid_interval_ms: 250,
            planet_interval_min_ms: 4000,
            planet_interval_max_ms: 20000,
            asteroid: BodySettings {
                orbit_radius: Span::new(190.0, 230.0),
                depth: 0.0,
                scale: Span::new(2.7, 3.5),
                orbit_rate: 0.007,
                spin_rate: Vec3::new(0.0, -0.05, -0.05),
                detail: 0,
            },
            planet: BodySettings {
                orbit_radius: Span::new(200.0, 230.0),
                depth: -20.0,
                scale: Span::new(3.0, 9.0),
                orbit_rate: 0.001,
                spin_rate: Vec3::new(0.0, 0.012, 0.0),
                detail: 3,
            },
            planet_amplitude: 0.09,
            tier_high: 0.04,
            tier_medium: 0.02,
        }
    }
}

impl SpawnSettings {
    pub fn interval_table(&self) -> Result<IntervalTable, ConfigError> {
        IntervalTable::new(
            "asteroid interval",
            self.asteroid_intervals
                .iter()
                .map(|s| (s.distance, Duration::from_millis(s.interval_ms)))
                .collect(),
            Duration::from_millis(self.min_asteroid_interval_ms),
        )
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.interval_table()?;
        positive("spawn.planet_interval_min_ms", self.planet_interval_min_ms as f64)?;
        if self.planet_interval_max_ms < self.planet_interval_min_ms {
            return Err(ConfigError::InvalidRange {
                field: "spawn.planet_interval_ms",
                min: self.planet_interval_min_ms as f64,
                max: self.planet_interval_max_ms as f64,
            });
        }
        for (name, detail, body) in [
            ("spawn.asteroid", "spawn.asteroid.detail", &self.asteroid),
            ("spawn.planet", "spawn.planet.detail", &self.planet),
        ] {
            if body.detail > MAX_DETAIL {
                return Err(ConfigError::TooLarge {
                    field: detail,
                    max: MAX_DETAIL as u64,
                });
            }
            body.orbit_radius.validate(name)?;
            body.scale.validate(name)?;
            positive(name, body.scale.min as f64)?;
            positive(name, body.orbit_rate as f64)?;
        }
        positive("spawn.planet_amplitude", self.planet_amplitude as f64)?;
        if self.tier_high <= self.tier_medium {
            return Err(ConfigError::NonMonotonic {
                table: "planet tier",
                index: 1,
            });
        }
        Ok(())
    }
}

/// Player craft motion and hull
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftSettings {
    /// Position the craft launches from (z is the fly-in depth)
    pub launch_position: Vec3,
    /// Depth lost per frame while flying in
    pub fly_in_speed: f32,
    pub steer_x: Span,
    /// Narrower horizontal range for touch layouts
    pub steer_x_touch: Span,
    pub steer_y: Span,
    /// Nose-down pitch range mapped from the pointer's vertical axis
    pub pitch: Span,
    /// Per-frame movement of a destroyed craft (x, y, yaw)
    pub descent: Vec3,
    /// x at which a falling wreck leaves the scene
    pub wreck_limit_x: f32,
    /// Hit box center relative to the craft position
    pub hull_offset: Vec3,
    pub hull_half_extents: Vec3,
}

impl Default for CraftSettings {
    fn default() -> Self {
        Self {
            launch_position: Vec3::new(0.0, 200.0, 80.0),
            fly_in_speed: 1.0,
            steer_x: Span::new(-40.0, 15.0),
            steer_x_touch: Span::new(-20.0, 0.0),
            steer_y: Span::new(190.0, 220.0),
            pitch: Span::new(0.0, 5.0),
            descent: Vec3::new(-0.5, -0.2, -0.02),
            wreck_limit_x: -120.0,
            hull_offset: Vec3::new(10.7, 0.0, 0.0),
            hull_half_extents: Vec3::new(0.7, 0.99, 0.99),
        }
    }
}

impl CraftSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        positive("craft.fly_in_speed", self.fly_in_speed as f64)?;
        self.steer_x.validate("craft.steer_x")?;
        self.steer_x_touch.validate("craft.steer_x_touch")?;
        self.steer_y.validate("craft.steer_y")?;
        self.pitch.validate("craft.pitch")?;
        if self.descent.x >= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "craft.descent.x (leftward speed)",
            });
        }
        if !self.hull_half_extents.cmpgt(Vec3::ZERO).all() {
            return Err(ConfigError::NonPositive {
                field: "craft.hull_half_extents",
            });
        }
        Ok(())
    }
}

/// Complete simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed; the runner picks one from the clock when unset
    pub seed: Option<u64>,
    pub terrain: TerrainSettings,
    pub spawn: SpawnSettings,
    pub craft: CraftSettings,
}

impl Settings {
    /// Check every value; the first violation is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.terrain.validate()?;
        self.spawn.validate()?;
        self.craft.validate()
    }

    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load and validate settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field })
    }
}
