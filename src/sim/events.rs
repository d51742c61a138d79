//! Render handoff events
//!
//! The simulation never touches scene nodes. It queues these on the world and
//! the renderer drains them once per frame to add or release its nodes.

use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityKind};
use super::terrain::TileCoord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SceneEvent {
    TileAdded { coord: TileCoord },
    TileRemoved { coord: TileCoord },
    EntityAdded { id: EntityId, kind: EntityKind },
    EntityRemoved { id: EntityId },
    CraftAdded,
    CraftRemoved,
}
