//! The simulation context
//!
//! Everything mutable lives in one [`GameWorld`] that the frame tick threads
//! through each subsystem. Two worlds built from the same seed and settings
//! evolve identically under the same inputs.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::CollisionDetector;
use super::events::SceneEvent;
use super::lifecycle::EntityLifecycleManager;
use super::scheduler::{Scheduler, Task, TaskKind};
use super::spawner::ObjectSpawner;
use super::starfield::Starfield;
use super::state::{GamePhase, GameState, HudSnapshot, PlayerCraft};
use super::terrain::TerrainStreamer;
use crate::error::ConfigError;
use crate::settings::Settings;

#[derive(Debug)]
pub struct GameWorld {
    pub seed: u64,
    pub settings: Settings,
    pub rng: Pcg32,
    pub scheduler: Scheduler,
    pub terrain: TerrainStreamer,
    pub spawner: ObjectSpawner,
    pub entities: EntityLifecycleManager,
    pub collisions: CollisionDetector,
    pub state: GameState,
    /// Absent before the first run and after the wreck leaves the scene
    pub craft: Option<PlayerCraft>,
    pub starfield: Starfield,
    pub(crate) events: Vec<SceneEvent>,
}

impl GameWorld {
    /// Validate settings, fill the terrain window and arm every timer
    pub fn new(seed: u64, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut scheduler = Scheduler::new();
        let mut events = Vec::new();

        let mut terrain = TerrainStreamer::from_settings(&settings.terrain, seed)?;
        terrain.fill(&mut events);
        terrain.arm(&mut scheduler);

        let mut spawner = ObjectSpawner::from_settings(&settings.spawn)?;
        spawner.arm_all(&mut scheduler, &mut rng);

        let starfield = Starfield::generate(&mut rng);
        let collisions = CollisionDetector::from_settings(&settings.craft);
        let state = GameState::new(spawner.asteroid_interval());

        log::info!(
            "World created with seed {} (terrain noise seed {})",
            seed,
            terrain.noise().seed()
        );

        Ok(Self {
            seed,
            settings,
            rng,
            scheduler,
            terrain,
            spawner,
            entities: EntityLifecycleManager::new(),
            collisions,
            state,
            craft: None,
            starfield,
            events,
        })
    }

    pub fn craft_flying(&self) -> bool {
        self.craft.as_ref().is_some_and(PlayerCraft::is_flying)
    }

    /// Hand a due task to the component that owns it
    pub fn dispatch(&mut self, task: Task) {
        match task.kind {
            TaskKind::AdvanceTerrain => {
                self.terrain
                    .on_timer(task.id, &mut self.scheduler, &mut self.events);
            }
            TaskKind::Spawn(_) => {
                let flying = self.craft_flying();
                self.spawner.on_timer(
                    &task,
                    flying,
                    &mut self.scheduler,
                    &mut self.rng,
                    &mut self.entities,
                    &mut self.events,
                );
            }
        }
    }

    /// Begin a fresh run. Ignored while a run is already in progress.
    pub fn start_run(&mut self) -> bool {
        if self.state.phase == GamePhase::Running {
            log::trace!("Start ignored, run already in progress");
            return false;
        }
        if self.craft.take().is_some() {
            self.events.push(SceneEvent::CraftRemoved);
        }

        self.spawner.reset(&mut self.scheduler);
        self.state.reset(self.spawner.asteroid_interval());
        self.state.phase = GamePhase::Running;
        self.craft = Some(PlayerCraft::launch(&self.settings.craft));
        self.events.push(SceneEvent::CraftAdded);

        log::info!("Run started");
        true
    }

    pub fn hud(&self) -> HudSnapshot {
        self.state.hud()
    }

    /// Scene changes queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn pending_events(&self) -> &[SceneEvent] {
        &self.events
    }
}
