//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order for entities, window order for tiles)
//! - No rendering or platform dependencies

pub mod collision;
pub mod entity;
pub mod events;
pub mod hex;
pub mod lifecycle;
pub mod noise_field;
pub mod scheduler;
pub mod spawner;
pub mod starfield;
pub mod state;
pub mod table;
pub mod terrain;
pub mod tick;
pub mod world;

pub use collision::{Aabb, CollisionDetector};
pub use entity::{BoundingSphere, Entity, EntityId, EntityKind, EntityState, Geometry, SurfaceTier};
pub use events::SceneEvent;
pub use hex::Axial;
pub use lifecycle::{AnimateReport, EntityLifecycleManager};
pub use noise_field::NoiseField;
pub use scheduler::{Scheduler, Task, TaskId, TaskKind};
pub use spawner::ObjectSpawner;
pub use starfield::{StarLayer, Starfield};
pub use state::{CraftState, GamePhase, GameState, HudSnapshot, PlayerCraft};
pub use table::{BandTable, IntervalTable};
pub use terrain::{Biome, HexCell, TerrainLayout, TerrainStreamer, Tile, TileCoord, TileState};
pub use tick::{FrameClock, TickInput, tick};
pub use world::GameWorld;
