//! Transient bodies orbiting through the play area
//!
//! Bodies ride a circular orbit around the z axis: the body sits at
//! `(0, radius, depth)` and the whole orbit rotates by `angle`. Geometry is
//! generated once at spawn and never mutated afterwards.

use std::collections::HashMap;

use glam::{EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::noise_field::NoiseField;
use super::table::BandTable;
use crate::orbit_to_cartesian;

/// Unique per run, monotonically increasing, never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Asteroid,
    Planet,
}

impl EntityKind {
    /// Whether the craft can hit this kind (planets are backdrop)
    pub fn is_obstacle(self) -> bool {
        matches!(self, EntityKind::Asteroid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityState {
    Flying,
    /// Bounce animation after hitting the craft
    Colliding { offset: f32, returning: bool },
    Retiring,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub radius: f32,
    pub angle: f32,
    pub depth: f32,
}

impl Orbit {
    pub fn position(&self) -> Vec3 {
        orbit_to_cartesian(self.radius, self.angle, self.depth)
    }
}

/// Planet surface tier picked from the displacement of each vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceTier {
    Low,
    Medium,
    High,
}

impl SurfaceTier {
    /// Extra displacement added on top of the sampled noise
    pub fn lift(self) -> f32 {
        match self {
            SurfaceTier::High => 0.08,
            SurfaceTier::Medium => 0.04,
            SurfaceTier::Low => 0.0,
        }
    }
}

/// Linear RGB per surface tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetPalette {
    pub low: Vec3,
    pub medium: Vec3,
    pub high: Vec3,
}

impl PlanetPalette {
    pub fn color(&self, tier: SurfaceTier) -> Vec3 {
        match tier {
            SurfaceTier::Low => self.low,
            SurfaceTier::Medium => self.medium,
            SurfaceTier::High => self.high,
        }
    }
}

const fn palette(low: [f32; 3], medium: [f32; 3], high: [f32; 3]) -> PlanetPalette {
    PlanetPalette {
        low: Vec3::from_array(low),
        medium: Vec3::from_array(medium),
        high: Vec3::from_array(high),
    }
}

pub const PLANET_PALETTES: [PlanetPalette; 8] = [
    palette([0.204, 0.243, 0.278], [0.643, 0.608, 0.447], [0.765, 0.631, 0.443]),
    palette([1.0, 0.773, 0.580], [0.957, 0.631, 0.361], [0.8, 0.51, 0.216]),
    palette([1.0, 0.945, 0.835], [0.867, 0.769, 0.686], [0.588, 0.522, 0.439]),
    palette([0.882, 0.933, 0.933], [0.776, 0.827, 0.89], [0.851, 0.867, 0.957]),
    palette([0.839, 0.376, 0.514], [0.266, 0.706, 0.753], [0.416, 0.243, 0.725]),
    palette([0.914, 0.996, 0.996], [0.62, 0.412, 0.996], [0.965, 0.863, 0.996]),
    palette([0.012, 0.867, 0.839], [0.922, 0.91, 0.812], [0.6, 0.518, 0.412]),
    palette([0.729, 0.294, 0.047], [0.561, 0.098, 0.059], [0.333, 0.118, 0.141]),
];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Sphere centered on the points' bounding box, reaching the farthest point
    pub fn from_points(points: &[Vec3]) -> Self {
        let Some(&first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        let center = (min + max) * 0.5;
        let radius = points
            .iter()
            .map(|p| p.distance_squared(center))
            .fold(0.0f32, f32::max)
            .sqrt();
        Self { center, radius }
    }
}

/// Displaced surface of a spawned body, in local unit space
#[derive(Debug, Clone)]
pub struct Geometry {
    vertices: Vec<Vec3>,
    colors: Option<Vec<Vec3>>,
    bounds: BoundingSphere,
}

impl Geometry {
    pub fn from_vertices(vertices: Vec<Vec3>, colors: Option<Vec<Vec3>>) -> Self {
        let bounds = BoundingSphere::from_points(&vertices);
        Self {
            vertices,
            colors,
            bounds,
        }
    }

    /// Rocky body: every vertex pushed out by `1 + noise`
    pub fn asteroid(noise: &NoiseField, detail: u32) -> Self {
        let vertices = icosphere(detail)
            .into_iter()
            .map(|v| v * (1.0 + sample(noise, v)))
            .collect();
        Self::from_vertices(vertices, None)
    }

    /// Tiered planet surface coloured from `palette`
    pub fn planet(
        noise: &NoiseField,
        detail: u32,
        amplitude: f32,
        tiers: &BandTable<SurfaceTier>,
        palette: &PlanetPalette,
    ) -> Self {
        let unit = icosphere(detail);
        let mut vertices = Vec::with_capacity(unit.len());
        let mut colors = Vec::with_capacity(unit.len());
        for v in unit {
            let d = sample(noise, v) * amplitude;
            let tier = tiers.classify(d);
            vertices.push(v * (1.0 + d + tier.lift()));
            colors.push(palette.color(tier));
        }
        Self::from_vertices(vertices, Some(colors))
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Per-vertex colours, planets only
    pub fn colors(&self) -> Option<&[Vec3]> {
        self.colors.as_deref()
    }

    pub fn bounds(&self) -> BoundingSphere {
        self.bounds
    }
}

fn sample(noise: &NoiseField, v: Vec3) -> f32 {
    noise.sample_3d(v.x as f64, v.y as f64, v.z as f64) as f32
}

const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Unique unit vertices of an icosahedron subdivided `detail` times
/// (`10 * 4^detail + 2` points)
pub fn icosphere(detail: u32) -> Vec<Vec3> {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let mut vertices: Vec<Vec3> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(|(x, y, z)| Vec3::new(x, y, z).normalize())
    .collect();

    let mut faces = ICOSAHEDRON_FACES.to_vec();
    for _ in 0..detail {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let m = (vertices[a as usize] + vertices[b as usize]).normalize();
                vertices.push(m);
                (vertices.len() - 1) as u32
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.extend([[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]);
        }
        faces = next;
    }
    vertices
}

/// A live spawned body
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub geometry: Geometry,
    pub orbit: Orbit,
    /// Orbit angle gained per frame
    pub orbit_rate: f32,
    /// Euler XYZ spin of the body around its own center
    pub spin: Vec3,
    pub spin_rate: Vec3,
    pub scale: f32,
    pub state: EntityState,
}

impl Entity {
    pub fn position(&self) -> Vec3 {
        self.orbit.position()
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.spin.x, self.spin.y, self.spin.z)
    }

    /// Local bounding sphere carried through spin, scale and orbit
    pub fn world_bounds(&self) -> BoundingSphere {
        let local = self.geometry.bounds();
        let offset = self.rotation() * (local.center * self.scale);
        let body = Vec3::new(0.0, self.orbit.radius, self.orbit.depth);
        BoundingSphere {
            center: Quat::from_rotation_z(self.orbit.angle) * (body + offset),
            radius: local.radius * self.scale,
        }
    }

    pub fn is_flying(&self) -> bool {
        self.state == EntityState::Flying
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_icosphere_vertex_counts() {
        assert_eq!(icosphere(0).len(), 12);
        assert_eq!(icosphere(1).len(), 42);
        assert_eq!(icosphere(3).len(), 642);
        for v in icosphere(2) {
            assert!((v.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_bounding_sphere_from_points() {
        let points = [Vec3::new(-1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)];
        let bs = BoundingSphere::from_points(&points);
        assert_eq!(bs.center, Vec3::new(1.0, 0.5, 0.0));
        assert!((bs.radius - 2.0615528).abs() < 1e-5);
        assert_eq!(BoundingSphere::from_points(&[]), BoundingSphere::default());
    }

    #[test]
    fn test_asteroid_geometry_is_displaced() {
        let noise = NoiseField::new(3);
        let geometry = Geometry::asteroid(&noise, 0);
        assert_eq!(geometry.vertices().len(), 12);
        assert!(geometry.colors().is_none());
        assert!(geometry.vertices().iter().any(|v| (v.length() - 1.0).abs() > 1e-4));
        for v in geometry.vertices() {
            assert!(geometry.bounds().center.distance(*v) <= geometry.bounds().radius + 1e-4);
        }
    }

    #[test]
    fn test_planet_tiers_and_colors() {
        let noise = NoiseField::new(11);
        let tiers = BandTable::new(
            "planet tier",
            vec![(0.04, SurfaceTier::High), (0.02, SurfaceTier::Medium)],
            SurfaceTier::Low,
        )
        .unwrap();
        let palette = PLANET_PALETTES[4];
        let geometry = Geometry::planet(&noise, 2, 0.09, &tiers, &palette);
        let colors = geometry.colors().unwrap();
        assert_eq!(colors.len(), geometry.vertices().len());

        for (v, c) in geometry.vertices().iter().zip(colors) {
            let d = v.length() - 1.0;
            // Lifted tiers leave gaps: low <= 0.02, medium in (0.06, 0.08], high > 0.12
            let expected = if d > 0.10 {
                palette.high
            } else if d > 0.04 {
                palette.medium
            } else {
                palette.low
            };
            assert_eq!(*c, expected, "vertex displaced by {d}");
        }
    }

    #[test]
    fn test_world_bounds_follow_orbit() {
        let entity = Entity {
            id: EntityId(1),
            kind: EntityKind::Asteroid,
            geometry: Geometry::from_vertices(vec![Vec3::X, -Vec3::X, Vec3::Y, -Vec3::Y], None),
            orbit: Orbit {
                radius: 200.0,
                angle: TAU,
                depth: 0.0,
            },
            orbit_rate: 0.007,
            spin: Vec3::new(0.3, -1.2, 0.7),
            spin_rate: Vec3::ZERO,
            scale: 3.0,
            state: EntityState::Flying,
        };
        let bs = entity.world_bounds();
        assert!((bs.center - Vec3::new(0.0, 200.0, 0.0)).length() < 1e-2);
        assert!((bs.radius - 3.0).abs() < 1e-5);
        assert!(entity.is_flying());
        assert!(entity.kind.is_obstacle());
        assert!(!EntityKind::Planet.is_obstacle());
    }
}
