//! Decorative star layers behind the play area

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Reference radius of the star ring
const RING_RADIUS: f32 = 260.0;
const RING_INNER: f32 = 0.68;
const RING_OUTER: f32 = 1.2;
/// Layers sit behind the orbit plane
pub const STAR_DEPTH: f32 = -20.0;

/// One layer of identical points spinning as a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarLayer {
    pub size: f32,
    /// 0xRRGGBB
    pub color: u32,
    /// Spin gained per frame around z (radians)
    pub spin_rate: f32,
    pub angle: f32,
    pub points: Vec<Vec3>,
}

impl StarLayer {
    fn generate<R: Rng>(rng: &mut R, count: usize, size: f32, color: u32, spin_rate: f32) -> Self {
        let points = (0..count)
            .map(|_| {
                let r = rng.random_range(RING_INNER * RING_RADIUS..RING_OUTER * RING_RADIUS);
                let phi = rng.random_range(0.0..TAU);
                Vec3::new(r * phi.cos(), r * phi.sin(), 0.0)
            })
            .collect();
        Self {
            size,
            color,
            spin_rate,
            angle: 0.0,
            points,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Starfield {
    layers: Vec<StarLayer>,
}

impl Starfield {
    /// Small, medium and large layers
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        Self {
            layers: vec![
                StarLayer::generate(rng, 4000, 0.2, 0xFFFFFF, 0.0005),
                StarLayer::generate(rng, 1200, 0.5, 0xCBBCE3, 0.0006),
                StarLayer::generate(rng, 800, 0.7, 0xA5D8EC, 0.0008),
            ],
        }
    }

    pub fn spin(&mut self) {
        for layer in &mut self.layers {
            layer.angle = (layer.angle + layer.spin_rate).rem_euclid(TAU);
        }
    }

    pub fn layers(&self) -> &[StarLayer] {
        &self.layers
    }
}
