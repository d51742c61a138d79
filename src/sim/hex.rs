//! Axial hex coordinates
//!
//! Pointy-top layout: `q` runs along the scroll direction, `r` across it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

const SQRT_3: f32 = 1.732_050_8;

/// Neighbor offsets in axial space, counter-clockwise from +q
pub const NEIGHBOR_OFFSETS: [Axial; 6] = [
    Axial::new(1, 0),
    Axial::new(1, -1),
    Axial::new(0, -1),
    Axial::new(-1, 0),
    Axial::new(-1, 1),
    Axial::new(0, 1),
];

/// A hex lattice coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const ZERO: Self = Self::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Center of this hex on the ground plane for hexes of circumradius `size`
    pub fn to_world(self, size: f32) -> Vec2 {
        axial_to_world(self.q as f32, self.r as f32, size)
    }

    pub fn neighbors(self) -> impl Iterator<Item = Axial> {
        NEIGHBOR_OFFSETS
            .into_iter()
            .map(move |o| Axial::new(self.q + o.q, self.r + o.r))
    }

    /// Hex distance in steps
    pub fn distance(self, other: Axial) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }
}

impl std::ops::Add for Axial {
    type Output = Axial;

    fn add(self, rhs: Axial) -> Axial {
        Axial::new(self.q + rhs.q, self.r + rhs.r)
    }
}

/// Axial-to-Cartesian mapping for pointy-top hexes
#[inline]
pub fn axial_to_world(q: f32, r: f32, size: f32) -> Vec2 {
    Vec2::new(size * SQRT_3 * (q + r / 2.0), size * 1.5 * r)
}
