//! Timer-driven spawning of asteroids and planets
//!
//! Each kind owns one one-shot task that is re-armed every time it fires.
//! The asteroid interval follows the difficulty table; the planet interval is
//! drawn fresh on every fire.

use std::time::Duration;

use glam::Vec3;
use rand::Rng;

use super::entity::{
    Entity, EntityId, EntityKind, EntityState, Geometry, Orbit, PLANET_PALETTES, SurfaceTier,
};
use super::events::SceneEvent;
use super::lifecycle::EntityLifecycleManager;
use super::noise_field::NoiseField;
use super::scheduler::{Scheduler, Task, TaskId, TaskKind};
use super::table::{BandTable, IntervalTable};
use crate::consts::ORBIT_START_ANGLE;
use crate::error::ConfigError;
use crate::settings::{BodySettings, SpawnSettings};

#[derive(Debug)]
pub struct ObjectSpawner {
    asteroid: BodySettings,
    planet: BodySettings,
    intervals: IntervalTable,
    planet_interval_ms: (u64, u64),
    planet_amplitude: f32,
    tiers: BandTable<SurfaceTier>,
    /// Interval the asteroid task is currently armed with
    asteroid_interval: Duration,
    asteroid_task: Option<TaskId>,
    planet_task: Option<TaskId>,
}

impl ObjectSpawner {
    pub fn from_settings(s: &SpawnSettings) -> Result<Self, ConfigError> {
        let intervals = s.interval_table()?;
        let tiers = BandTable::new(
            "planet tier",
            vec![(s.tier_high, SurfaceTier::High), (s.tier_medium, SurfaceTier::Medium)],
            SurfaceTier::Low,
        )?;
        Ok(Self {
            asteroid: s.asteroid,
            planet: s.planet,
            asteroid_interval: intervals.base(),
            intervals,
            planet_interval_ms: (s.planet_interval_min_ms, s.planet_interval_max_ms),
            planet_amplitude: s.planet_amplitude,
            tiers,
            asteroid_task: None,
            planet_task: None,
        })
    }

    /// Asteroid interval in effect at `distance`
    pub fn interval_for(&self, distance: u64) -> Duration {
        self.intervals.interval_at(distance)
    }

    pub fn asteroid_interval(&self) -> Duration {
        self.asteroid_interval
    }

    pub fn pending_task(&self, kind: EntityKind) -> Option<TaskId> {
        match kind {
            EntityKind::Asteroid => self.asteroid_task,
            EntityKind::Planet => self.planet_task,
        }
    }

    /// Arm both timers, replacing any pending ones
    pub fn arm_all<R: Rng>(&mut self, scheduler: &mut Scheduler, rng: &mut R) {
        self.arm(EntityKind::Asteroid, scheduler, rng);
        self.arm(EntityKind::Planet, scheduler, rng);
    }

    fn arm<R: Rng>(&mut self, kind: EntityKind, scheduler: &mut Scheduler, rng: &mut R) {
        let delay = match kind {
            EntityKind::Asteroid => self.asteroid_interval,
            EntityKind::Planet => {
                let (min, max) = self.planet_interval_ms;
                Duration::from_millis(rng.random_range(min..=max))
            }
        };
        let slot = match kind {
            EntityKind::Asteroid => &mut self.asteroid_task,
            EntityKind::Planet => &mut self.planet_task,
        };
        if let Some(id) = slot.take() {
            scheduler.cancel(id);
        }
        *slot = Some(scheduler.schedule(TaskKind::Spawn(kind), delay));
    }

    /// Re-arm the asteroid timer if the difficulty step changed.
    /// Returns the new interval when it did.
    pub fn retune(&mut self, distance: u64, scheduler: &mut Scheduler) -> Option<Duration> {
        let interval = self.interval_for(distance);
        if interval == self.asteroid_interval {
            return None;
        }
        log::info!(
            "Asteroid interval {:?} -> {:?} at distance {}",
            self.asteroid_interval,
            interval,
            distance
        );
        self.asteroid_interval = interval;
        if let Some(id) = self.asteroid_task.take() {
            scheduler.cancel(id);
        }
        self.asteroid_task = Some(scheduler.schedule(TaskKind::Spawn(EntityKind::Asteroid), interval));
        Some(interval)
    }

    /// Timer callback. Spawns only while the craft is flying; always re-arms.
    pub fn on_timer<R: Rng>(
        &mut self,
        task: &Task,
        flying: bool,
        scheduler: &mut Scheduler,
        rng: &mut R,
        lifecycle: &mut EntityLifecycleManager,
        events: &mut Vec<SceneEvent>,
    ) -> Option<EntityId> {
        let TaskKind::Spawn(kind) = task.kind else {
            return None;
        };
        if self.pending_task(kind) != Some(task.id) {
            log::trace!("Ignoring stale {:?} spawn task", kind);
            return None;
        }
        match kind {
            EntityKind::Asteroid => self.asteroid_task = None,
            EntityKind::Planet => self.planet_task = None,
        }

        let spawned = if flying {
            let entity = self.spawn(kind, lifecycle.allocate_id(), rng);
            let id = entity.id;
            log::debug!(
                "Spawned {:?} {:?} at radius {:.1}, scale {:.2}",
                kind,
                id,
                entity.orbit.radius,
                entity.scale
            );
            lifecycle.insert(entity, events);
            Some(id)
        } else {
            log::trace!("Craft not flying, skipping {:?} spawn", kind);
            None
        };

        self.arm(kind, scheduler, rng);
        spawned
    }

    /// Build a new body of `kind` with freshly generated geometry
    pub fn spawn<R: Rng>(&self, kind: EntityKind, id: EntityId, rng: &mut R) -> Entity {
        let body = match kind {
            EntityKind::Asteroid => &self.asteroid,
            EntityKind::Planet => &self.planet,
        };
        let noise = NoiseField::new(rng.random());
        let geometry = match kind {
            EntityKind::Asteroid => Geometry::asteroid(&noise, body.detail),
            EntityKind::Planet => {
                let palette = &PLANET_PALETTES[rng.random_range(0..PLANET_PALETTES.len())];
                Geometry::planet(&noise, body.detail, self.planet_amplitude, &self.tiers, palette)
            }
        };

        Entity {
            id,
            kind,
            geometry,
            orbit: Orbit {
                radius: body.orbit_radius.sample(rng),
                angle: ORBIT_START_ANGLE,
                depth: body.depth,
            },
            orbit_rate: body.orbit_rate,
            spin: Vec3::ZERO,
            spin_rate: body.spin_rate,
            scale: body.scale.sample(rng),
            state: EntityState::Flying,
        }
    }

    /// Back to the base interval for a fresh run
    pub fn reset(&mut self, scheduler: &mut Scheduler) {
        self.retune(0, scheduler);
    }
}
