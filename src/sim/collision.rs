//! Craft-vs-body hit detection
//!
//! The craft's hull is an axis-aligned box, each body a bounding sphere. Only
//! one collision is ever in flight: while a body is bouncing off the craft,
//! no further hits are tested.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::entity::{BoundingSphere, Entity, EntityId};
use super::lifecycle::EntityLifecycleManager;
use super::state::{GameState, PlayerCraft};
use crate::settings::CraftSettings;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// World box enclosing a local box after rotation and translation
    pub fn from_oriented(local_center: Vec3, half_extents: Vec3, rotation: Quat, translation: Vec3) -> Self {
        let center = translation + rotation * local_center;
        let mut extent = Vec3::ZERO;
        for (axis, half) in [(Vec3::X, half_extents.x), (Vec3::Y, half_extents.y), (Vec3::Z, half_extents.z)] {
            extent += (rotation * axis).abs() * half;
        }
        Self::from_center_half_extents(center, extent)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Touching counts as intersecting
    pub fn intersects_sphere(&self, sphere: &BoundingSphere) -> bool {
        self.closest_point(sphere.center).distance_squared(sphere.center)
            <= sphere.radius * sphere.radius
    }
}

#[derive(Debug, Clone)]
pub struct CollisionDetector {
    hull_offset: Vec3,
    hull_half_extents: Vec3,
}

impl CollisionDetector {
    pub fn from_settings(craft: &CraftSettings) -> Self {
        Self {
            hull_offset: craft.hull_offset,
            hull_half_extents: craft.hull_half_extents,
        }
    }

    /// World-space hull box of the craft
    pub fn hull_bounds(&self, craft: &PlayerCraft) -> Aabb {
        Aabb::from_oriented(
            self.hull_offset,
            self.hull_half_extents,
            craft.rotation(),
            craft.position,
        )
    }

    /// First flying obstacle touching the hull, in spawn order
    pub fn detect<'a>(
        &self,
        craft: &PlayerCraft,
        entities: impl IntoIterator<Item = &'a Entity>,
    ) -> Option<EntityId> {
        let hull = self.hull_bounds(craft);
        entities
            .into_iter()
            .filter(|e| e.is_flying() && e.kind.is_obstacle())
            .find(|e| hull.intersects_sphere(&e.world_bounds()))
            .map(|e| e.id)
    }

    /// Test for a new hit and apply the response. No-op unless the craft is
    /// flying with no cooldown and nothing else is bouncing.
    pub fn check(
        &self,
        craft: &mut PlayerCraft,
        state: &mut GameState,
        lifecycle: &mut EntityLifecycleManager,
    ) -> Option<EntityId> {
        if !craft.is_flying() || craft.cooldown || lifecycle.colliding().is_some() {
            return None;
        }
        let id = self.detect(craft, lifecycle.iter())?;
        apply_hit(id, craft, state, lifecycle);
        Some(id)
    }
}

/// Lose a hit point and start the bounce. Dropping below zero destroys the craft.
pub fn apply_hit(
    id: EntityId,
    craft: &mut PlayerCraft,
    state: &mut GameState,
    lifecycle: &mut EntityLifecycleManager,
) {
    assert!(
        state.hit_points >= 0,
        "hit registered with hit points already at {}",
        state.hit_points
    );
    state.hit_points -= 1;
    lifecycle.begin_collision(id);
    craft.cooldown = true;
    log::debug!("Craft hit by {:?}, {} hit points left", id, state.hit_points);

    if state.hit_points < 0 {
        craft.destroy();
        log::info!("Craft destroyed at distance {}", state.distance);
    }
}
