//! Per-frame animation and retirement of spawned bodies

use super::entity::{Entity, EntityId, EntityState};
use super::events::SceneEvent;
use crate::consts::{BOUNCE_FALL, BOUNCE_PEAK, BOUNCE_RISE, ORBIT_RETIRE_ANGLE};

/// Tumble applied to a bouncing body each frame (x, z)
const BOUNCE_SPIN_X: f32 = -0.03;
const BOUNCE_SPIN_Z: f32 = -0.025;

/// What happened during one [`EntityLifecycleManager::animate`] call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimateReport {
    pub retired: Vec<EntityId>,
    /// The colliding body finished its bounce and was released
    pub bounce_finished: bool,
}

/// Owns every live entity, in spawn order
#[derive(Debug, Default)]
pub struct EntityLifecycleManager {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityLifecycleManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn insert(&mut self, entity: Entity, events: &mut Vec<SceneEvent>) {
        events.push(SceneEvent::EntityAdded {
            id: entity.id,
            kind: entity.kind,
        });
        self.entities.push(entity);
    }

    /// Advance every body one frame and release the ones that are done
    pub fn animate(&mut self, events: &mut Vec<SceneEvent>) -> AnimateReport {
        let mut report = AnimateReport::default();

        for entity in &mut self.entities {
            match entity.state {
                EntityState::Flying => {
                    entity.orbit.angle += entity.orbit_rate;
                    entity.spin += entity.spin_rate;
                    if entity.orbit.angle > ORBIT_RETIRE_ANGLE {
                        entity.state = EntityState::Retiring;
                    }
                }
                EntityState::Colliding { offset, returning } => {
                    entity.state = match bounce_step(offset, returning) {
                        Some((offset, returning)) => {
                            entity.spin.x += BOUNCE_SPIN_X;
                            entity.spin.z += BOUNCE_SPIN_Z;
                            EntityState::Colliding { offset, returning }
                        }
                        None => {
                            report.bounce_finished = true;
                            EntityState::Retiring
                        }
                    };
                }
                EntityState::Retiring => {}
            }
        }

        self.entities.retain(|entity| {
            if entity.state == EntityState::Retiring {
                report.retired.push(entity.id);
                events.push(SceneEvent::EntityRemoved { id: entity.id });
                false
            } else {
                true
            }
        });

        if !report.retired.is_empty() {
            log::trace!("Retired {} entities", report.retired.len());
        }
        report
    }

    /// Start the bounce for `id`. Panics if another body is already bouncing.
    pub fn begin_collision(&mut self, id: EntityId) {
        assert!(
            self.colliding().is_none(),
            "collision with {id:?} while another collision is in progress"
        );
        if let Some(entity) = self.entities.iter_mut().find(|e| e.id == id) {
            entity.state = EntityState::Colliding {
                offset: 0.0,
                returning: false,
            };
        }
    }

    /// The body currently bouncing off the craft, if any
    pub fn colliding(&self) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|e| matches!(e.state, EntityState::Colliding { .. }))
            .map(|e| e.id)
    }

    /// Offset the craft is pushed back by (0 when nothing is bouncing)
    pub fn bounce_offset(&self) -> f32 {
        self.entities
            .iter()
            .find_map(|e| match e.state {
                EntityState::Colliding { offset, .. } => Some(offset),
                _ => None,
            })
            .unwrap_or(0.0)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Live entities in spawn order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// One bounce frame: rise to the peak, then settle back to zero.
/// `None` once the offset is back at rest.
fn bounce_step(offset: f32, returning: bool) -> Option<(f32, bool)> {
    if !returning && offset < BOUNCE_PEAK {
        Some((offset + BOUNCE_RISE, false))
    } else if offset > 0.0 {
        Some(((offset - BOUNCE_FALL).max(0.0), true))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ORBIT_START_ANGLE;
    use crate::sim::entity::{EntityKind, Geometry, Orbit};
    use glam::Vec3;

    fn body(lm: &mut EntityLifecycleManager, kind: EntityKind, angle: f32) -> Entity {
        Entity {
            id: lm.allocate_id(),
            kind,
            geometry: Geometry::from_vertices(vec![Vec3::X, -Vec3::X], None),
            orbit: Orbit {
                radius: 200.0,
                angle,
                depth: 0.0,
            },
            orbit_rate: 0.007,
            spin: Vec3::ZERO,
            spin_rate: Vec3::new(0.0, -0.05, -0.05),
            scale: 3.0,
            state: EntityState::Flying,
        }
    }

    #[test]
    fn test_ids_increase() {
        let mut lm = EntityLifecycleManager::new();
        let a = lm.allocate_id();
        let b = lm.allocate_id();
        assert!(b > a);
    }

    #[test]
    fn test_orbit_advances_and_retires() {
        let mut lm = EntityLifecycleManager::new();
        let mut events = Vec::new();
        let e = body(&mut lm, EntityKind::Asteroid, ORBIT_START_ANGLE);
        let id = e.id;
        lm.insert(e, &mut events);

        lm.animate(&mut events);
        let angle = lm.get(id).unwrap().orbit.angle;
        assert!((angle - (ORBIT_START_ANGLE + 0.007)).abs() < 1e-6);
        assert_eq!(lm.get(id).unwrap().spin, Vec3::new(0.0, -0.05, -0.05));

        let mut frames = 1;
        while !lm.is_empty() {
            let report = lm.animate(&mut events);
            frames += 1;
            if !report.retired.is_empty() {
                assert_eq!(report.retired, vec![id]);
            }
            assert!(frames < 1000);
        }
        // (7.5 - 6.5 * PI / 4) / 0.007 is about 342.1 frames
        assert_eq!(frames, 343);
        assert_eq!(events.last(), Some(&SceneEvent::EntityRemoved { id }));
    }

    #[test]
    fn test_bounce_profile() {
        let mut lm = EntityLifecycleManager::new();
        let mut events = Vec::new();
        let e = body(&mut lm, EntityKind::Asteroid, 5.0);
        let id = e.id;
        lm.insert(e, &mut events);
        let other = body(&mut lm, EntityKind::Asteroid, 5.0);
        let other_id = other.id;
        lm.insert(other, &mut events);

        lm.begin_collision(id);
        assert_eq!(lm.colliding(), Some(id));

        let mut offsets = Vec::new();
        loop {
            let report = lm.animate(&mut events);
            if report.bounce_finished {
                assert_eq!(report.retired, vec![id]);
                break;
            }
            offsets.push(lm.bounce_offset());
        }

        assert_eq!(&offsets[..5], &[3.0, 6.0, 9.0, 12.0, 15.0]);
        assert_eq!(offsets[5], 14.5);
        assert_eq!(*offsets.last().unwrap(), 0.0);
        assert_eq!(offsets.len(), 5 + 30);
        assert_eq!(lm.colliding(), None);
        assert_eq!(lm.bounce_offset(), 0.0);
        // The bystander kept orbiting the whole time
        assert!(lm.get(other_id).unwrap().is_flying());
    }

    #[test]
    fn test_colliding_body_holds_its_orbit() {
        let mut lm = EntityLifecycleManager::new();
        let mut events = Vec::new();
        let e = body(&mut lm, EntityKind::Asteroid, 5.0);
        let id = e.id;
        lm.insert(e, &mut events);
        lm.begin_collision(id);
        lm.animate(&mut events);
        let entity = lm.get(id).unwrap();
        assert_eq!(entity.orbit.angle, 5.0);
        assert_eq!(entity.spin, Vec3::new(BOUNCE_SPIN_X, 0.0, BOUNCE_SPIN_Z));
    }

    #[test]
    #[should_panic(expected = "another collision")]
    fn test_second_collision_panics() {
        let mut lm = EntityLifecycleManager::new();
        let mut events = Vec::new();
        let a = body(&mut lm, EntityKind::Asteroid, 5.0);
        let b = body(&mut lm, EntityKind::Asteroid, 5.0);
        let (a_id, b_id) = (a.id, b.id);
        lm.insert(a, &mut events);
        lm.insert(b, &mut events);
        lm.begin_collision(a_id);
        lm.begin_collision(b_id);
    }
}
