//! Endless hex terrain streaming
//!
//! A fixed window of [`TILE_WINDOW`] slots slides along +x. Every advance
//! builds one tile at the leading edge and evicts the slot at the trailing
//! edge, so memory stays constant no matter how long a run lasts.
//!
//! Heights are sampled at *world* lattice coordinates. Neighboring tiles share
//! their edge column and read the same noise there, so they meet without
//! seams and without any stitching pass.

use std::collections::VecDeque;
use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::events::SceneEvent;
use super::hex::Axial;
use super::noise_field::NoiseField;
use super::scheduler::{Scheduler, TaskId, TaskKind};
use super::table::BandTable;
use crate::consts::{TILE_ANGLE_STEPS, TILE_WINDOW};
use crate::error::ConfigError;
use crate::settings::TerrainSettings;

/// Height classification of a hex cell, highest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Snow,
    LightSnow,
    Rock,
    Forest,
    Grass,
    Sand,
    ShallowWater,
    Water,
    DeepWater,
}

impl Biome {
    /// Suggested surface colour (0xRRGGBB) for the renderer
    pub fn color(self) -> u32 {
        match self {
            Biome::Snow => 0xE5E5E5,
            Biome::LightSnow => 0xF0F0F0,
            Biome::Rock => 0xC8BA90,
            Biome::Forest => 0xBCAE8D,
            Biome::Grass => 0x8A846D,
            Biome::Sand => 0x627C7C,
            Biome::ShallowWater => 0x3EA9BF,
            Biome::Water => 0x00738B,
            Biome::DeepWater => 0x015373,
        }
    }
}

/// Lattice position of a tile in the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Next tile in the scroll direction
    pub fn next(self) -> Self {
        Self::new(self.x + 1, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileState {
    Building,
    Active,
    Evicting,
}

/// One hex of a tile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexCell {
    /// Coordinate relative to the tile center
    pub local: Axial,
    /// Coordinate on the shared world lattice
    pub world: Axial,
    /// Sampled height, used for classification
    pub raw_height: f32,
    /// Height the renderer should show (raised to the sand floor)
    pub display_height: f32,
    pub biome: Biome,
}

impl HexCell {
    /// Top-center of the hex column: ground plane is x/z, height is y
    pub fn position(&self, cell_size: f32) -> Vec3 {
        let p = self.world.to_world(cell_size);
        Vec3::new(p.x, self.display_height, p.y)
    }
}

/// A fixed grid of hex cells at one lattice coordinate
#[derive(Debug, Clone)]
pub struct Tile {
    coord: TileCoord,
    cells: Vec<HexCell>,
    half_width: i32,
    half_height: i32,
    rotation_step: u8,
    state: TileState,
}

impl Tile {
    pub fn coord(&self) -> TileCoord {
        self.coord
    }

    pub fn cells(&self) -> &[HexCell] {
        &self.cells
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    /// Discrete rotation in `0..TILE_ANGLE_STEPS`
    pub fn rotation_step(&self) -> u8 {
        self.rotation_step
    }

    pub fn rotation_radians(&self) -> f32 {
        self.rotation_step as f32 * std::f32::consts::TAU / TILE_ANGLE_STEPS as f32
    }

    /// Cell at a tile-local coordinate
    pub fn cell(&self, local: Axial) -> Option<&HexCell> {
        if local.q.abs() > self.half_width || local.r.abs() > self.half_height {
            return None;
        }
        let rows = (2 * self.half_height + 1) as usize;
        let index = (local.q + self.half_width) as usize * rows + (local.r + self.half_height) as usize;
        self.cells.get(index)
    }
}

/// Tile dimensions plus the height pipeline: sample, normalize, clamp, classify
#[derive(Debug, Clone)]
pub struct TerrainLayout {
    pub half_width: i32,
    pub half_height: i32,
    pub cell_size: f32,
    frequency: f64,
    offset: f64,
    gain: f64,
    exponent: f64,
    max_height: f32,
    sand_floor: f32,
    bands: BandTable<Biome>,
}

impl TerrainLayout {
    pub fn from_settings(t: &TerrainSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            half_width: t.half_width,
            half_height: t.half_height,
            cell_size: t.cell_size,
            frequency: t.noise_frequency,
            offset: t.noise_offset,
            gain: t.noise_gain,
            exponent: t.height_exponent,
            max_height: t.max_height,
            sand_floor: t.sand_floor * t.max_height,
            bands: t.band_table()?,
        })
    }

    pub fn cells_per_tile(&self) -> usize {
        ((2 * self.half_width + 1) * (2 * self.half_height + 1)) as usize
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn sand_floor(&self) -> f32 {
        self.sand_floor
    }

    pub fn bands(&self) -> &BandTable<Biome> {
        &self.bands
    }

    /// World lattice coordinate of a tile-local cell. Tiles advance by their
    /// width minus one column, so edge columns coincide.
    pub fn world_axial(&self, coord: TileCoord, local: Axial) -> Axial {
        Axial::new(
            coord.x * 2 * self.half_width + local.q,
            coord.y * 2 * self.half_height + local.r,
        )
    }

    /// Raw height at a world lattice coordinate, in `[0, max_height]`
    pub fn raw_height(&self, noise: &NoiseField, world: Axial) -> f32 {
        let n = noise.sample_2d(world.q as f64 * self.frequency, world.r as f64 * self.frequency);
        let normalized = ((n + self.offset) * self.gain).clamp(0.0, 1.0);
        normalized.powf(self.exponent) as f32 * self.max_height
    }

    /// Low cells are drawn at the sand floor; their raw height is kept
    pub fn display_height(&self, raw: f32) -> f32 {
        raw.max(self.sand_floor)
    }

    pub fn classify(&self, raw: f32) -> Biome {
        self.bands.classify(raw)
    }

    fn build_cell(&self, noise: &NoiseField, coord: TileCoord, local: Axial) -> HexCell {
        let world = self.world_axial(coord, local);
        let raw_height = self.raw_height(noise, world);
        HexCell {
            local,
            world,
            raw_height,
            display_height: self.display_height(raw_height),
            biome: self.classify(raw_height),
        }
    }
}

#[derive(Debug)]
enum Slot {
    Empty,
    Filled(Tile),
}

/// Sliding window of terrain tiles
#[derive(Debug)]
pub struct TerrainStreamer {
    layout: TerrainLayout,
    noise: NoiseField,
    slots: VecDeque<Slot>,
    head: TileCoord,
    rotation_step: u8,
    scroll_angle: f32,
    scroll_speed: f32,
    advance_interval: Duration,
    task: Option<TaskId>,
}

impl TerrainStreamer {
    pub fn new(
        layout: TerrainLayout,
        noise: NoiseField,
        origin: TileCoord,
        scroll_speed: f32,
        advance_interval: Duration,
    ) -> Self {
        Self {
            layout,
            noise,
            slots: (0..TILE_WINDOW).map(|_| Slot::Empty).collect(),
            head: origin,
            rotation_step: 0,
            scroll_angle: 0.0,
            scroll_speed,
            advance_interval,
            task: None,
        }
    }

    pub fn from_settings(t: &TerrainSettings, run_seed: u64) -> Result<Self, ConfigError> {
        let layout = TerrainLayout::from_settings(t)?;
        let noise = NoiseField::new(t.resolve_seed(run_seed)?);
        Ok(Self::new(
            layout,
            noise,
            TileCoord::ORIGIN,
            t.scroll_speed,
            t.advance_interval(),
        ))
    }

    pub fn layout(&self) -> &TerrainLayout {
        &self.layout
    }

    pub fn noise(&self) -> &NoiseField {
        &self.noise
    }

    /// Coordinate of the most recently built tile
    pub fn head(&self) -> TileCoord {
        self.head
    }

    /// Window slots, empty or not (always [`TILE_WINDOW`])
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Active tiles, oldest first
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Filled(tile) => Some(tile),
            Slot::Empty => None,
        })
    }

    pub fn active_count(&self) -> usize {
        self.tiles().count()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.tiles().find(|t| t.coord == coord)
    }

    /// Current rotation of the whole terrain group (radians)
    pub fn scroll_angle(&self) -> f32 {
        self.scroll_angle
    }

    /// Run the initial fill so the window is full before the first frame
    pub fn fill(&mut self, events: &mut Vec<SceneEvent>) {
        for _ in 0..TILE_WINDOW {
            self.advance_window(events);
        }
    }

    /// Build the next tile at the leading edge and evict the trailing slot
    pub fn advance_window(&mut self, events: &mut Vec<SceneEvent>) -> TileCoord {
        let coord = self.head.next();
        self.head = coord;
        self.rotation_step = if self.rotation_step > 0 {
            self.rotation_step - 1
        } else {
            TILE_ANGLE_STEPS - 1
        };

        let tile = self.build_tile(coord, self.rotation_step);

        if let Some(trailing) = self.slots.pop_front() {
            evict(trailing, events);
        }
        self.slots.push_back(Slot::Filled(tile));
        events.push(SceneEvent::TileAdded { coord });

        log::debug!("Terrain advanced to tile {:?} (step {})", coord, self.rotation_step);
        coord
    }

    /// Sample every cell of the tile at `coord`
    pub fn build_tile(&self, coord: TileCoord, rotation_step: u8) -> Tile {
        let l = &self.layout;
        let mut tile = Tile {
            coord,
            cells: Vec::with_capacity(l.cells_per_tile()),
            half_width: l.half_width,
            half_height: l.half_height,
            rotation_step,
            state: TileState::Building,
        };
        for q in -l.half_width..=l.half_width {
            for r in -l.half_height..=l.half_height {
                tile.cells.push(l.build_cell(&self.noise, coord, Axial::new(q, r)));
            }
        }
        tile.state = TileState::Active;
        tile
    }

    /// Advance the group's scroll angle by one frame
    pub fn scroll(&mut self) {
        self.scroll_angle = (self.scroll_angle + self.scroll_speed).rem_euclid(std::f32::consts::TAU);
    }

    /// Arm the advance timer, replacing any pending one
    pub fn arm(&mut self, scheduler: &mut Scheduler) {
        if let Some(id) = self.task.take() {
            scheduler.cancel(id);
        }
        self.task = Some(scheduler.schedule(TaskKind::AdvanceTerrain, self.advance_interval));
    }

    /// Timer callback: advance once, then re-arm
    pub fn on_timer(&mut self, id: TaskId, scheduler: &mut Scheduler, events: &mut Vec<SceneEvent>) {
        if self.task != Some(id) {
            log::trace!("Ignoring stale terrain task {:?}", id);
            return;
        }
        self.task = None;
        self.advance_window(events);
        self.arm(scheduler);
    }

    pub fn pending_task(&self) -> Option<TaskId> {
        self.task
    }
}

fn evict(slot: Slot, events: &mut Vec<SceneEvent>) {
    match slot {
        Slot::Filled(mut tile) => {
            tile.state = TileState::Evicting;
            events.push(SceneEvent::TileRemoved { coord: tile.coord });
        }
        Slot::Empty => log::trace!("Trailing slot empty, nothing to evict"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_STEP;
    use proptest::prelude::*;

    fn small_settings() -> TerrainSettings {
        TerrainSettings {
            noise_seed: Some(1234),
            half_width: 3,
            half_height: 4,
            ..TerrainSettings::default()
        }
    }

    fn streamer() -> TerrainStreamer {
        TerrainStreamer::from_settings(&small_settings(), 0).unwrap()
    }

    fn coords(s: &TerrainStreamer) -> Vec<i32> {
        s.tiles().map(|t| t.coord().x).collect()
    }

    #[test]
    fn test_window_fills_from_first_advance() {
        let mut s = streamer();
        let mut events = Vec::new();
        assert_eq!(s.active_count(), 0);
        assert_eq!(s.slot_count(), TILE_WINDOW);

        for _ in 0..6 {
            s.advance_window(&mut events);
        }

        assert_eq!(coords(&s), vec![1, 2, 3, 4, 5, 6]);
        assert!(s.tile(TileCoord::ORIGIN).is_none());
        assert!(events.iter().all(|e| matches!(e, SceneEvent::TileAdded { .. })));
        assert!(!events.contains(&SceneEvent::TileAdded { coord: TileCoord::ORIGIN }));
    }

    #[test]
    fn test_window_stays_full() {
        let mut s = streamer();
        let mut events = Vec::new();
        s.fill(&mut events);

        for step in 0..30 {
            events.clear();
            let before = s.active_count();
            s.advance_window(&mut events);
            assert_eq!(before, TILE_WINDOW);
            assert_eq!(s.active_count(), TILE_WINDOW);
            assert_eq!(s.slot_count(), TILE_WINDOW);

            let evicted = TileCoord::new(step + 1, 0);
            let added = TileCoord::new(step + 7, 0);
            assert_eq!(
                events,
                vec![
                    SceneEvent::TileRemoved { coord: evicted },
                    SceneEvent::TileAdded { coord: added },
                ]
            );
        }
        assert_eq!(coords(&s), (31..=36).collect::<Vec<_>>());
        assert!(s.tiles().all(|t| t.state() == TileState::Active));
    }

    #[test]
    fn test_rotation_cycles_24_steps() {
        let mut s = streamer();
        let mut events = Vec::new();
        let steps: Vec<u8> = (0..26)
            .map(|_| {
                let coord = s.advance_window(&mut events);
                s.tile(coord).unwrap().rotation_step()
            })
            .collect();

        assert_eq!(steps[0], 23);
        assert_eq!(steps[23], 0);
        assert_eq!(steps[24], 23);
        assert_eq!(steps[25], 22);
        assert!(steps.iter().all(|&st| st < TILE_ANGLE_STEPS));
    }

    #[test]
    fn test_adjacent_tiles_share_edge() {
        let mut s = streamer();
        let mut events = Vec::new();
        s.fill(&mut events);
        let l = s.layout().clone();

        let left = s.tile(TileCoord::new(2, 0)).unwrap();
        let right = s.tile(TileCoord::new(3, 0)).unwrap();
        for r in -l.half_height..=l.half_height {
            let a = left.cell(Axial::new(l.half_width, r)).unwrap();
            let b = right.cell(Axial::new(-l.half_width, r)).unwrap();
            assert_eq!(a.world, b.world);
            assert_eq!(a.raw_height.to_bits(), b.raw_height.to_bits());
            assert_eq!(a.biome, b.biome);
        }
    }

    #[test]
    fn test_clamp_and_classify_are_decoupled() {
        let layout = TerrainLayout::from_settings(&TerrainSettings::default()).unwrap();
        assert_eq!(layout.sand_floor(), 4.5);
        assert_eq!(layout.display_height(3.0), 4.5);
        assert_eq!(layout.classify(3.0), Biome::Water);
        assert_eq!(layout.classify(4.5), Biome::ShallowWater);
        assert_eq!(layout.display_height(12.0), 12.0);
        assert_eq!(layout.classify(25.0), Biome::Snow);
        assert_eq!(layout.classify(0.0), Biome::DeepWater);
    }

    #[test]
    fn test_built_cells_follow_pipeline() {
        let s = streamer();
        let tile = s.build_tile(TileCoord::new(4, 0), 5);
        let l = s.layout();
        assert_eq!(tile.cells().len(), l.cells_per_tile());
        assert_eq!(tile.state(), TileState::Active);
        for cell in tile.cells() {
            assert!((0.0..=l.max_height()).contains(&cell.raw_height));
            assert!(cell.display_height >= l.sand_floor());
            assert_eq!(cell.biome, l.classify(cell.raw_height));
            assert_eq!(tile.cell(cell.local), Some(cell));
        }
        assert!(tile.cell(Axial::new(l.half_width + 1, 0)).is_none());
    }

    #[test]
    fn test_same_seed_same_terrain() {
        let a = streamer().build_tile(TileCoord::new(9, 0), 0);
        let b = streamer().build_tile(TileCoord::new(9, 0), 0);
        assert_eq!(a.cells(), b.cells());
    }

    #[test]
    fn test_timer_advances_and_rearms() {
        let mut s = streamer();
        let mut scheduler = Scheduler::new();
        let mut events = Vec::new();
        s.fill(&mut events);
        s.arm(&mut scheduler);
        let first = s.pending_task().unwrap();

        let mut fired = 0;
        for _ in 0..200 {
            scheduler.advance(SIM_STEP);
            while let Some(task) = scheduler.pop_due() {
                assert_eq!(task.kind, TaskKind::AdvanceTerrain);
                s.on_timer(task.id, &mut scheduler, &mut events);
                fired += 1;
            }
        }
        // 200 frames at 60 Hz is 3.33 s, one advance every 670 ms
        assert_eq!(fired, 4);
        assert_eq!(scheduler.pending_len(), 1);
        assert_ne!(s.pending_task(), Some(first));
        assert_eq!(s.head(), TileCoord::new(10, 0));
        assert_eq!(s.active_count(), TILE_WINDOW);
    }

    #[test]
    fn test_scroll_wraps() {
        let mut s = streamer();
        for _ in 0..2000 {
            s.scroll();
        }
        assert!((0.0..std::f32::consts::TAU).contains(&s.scroll_angle()));
    }

    proptest! {
        #[test]
        fn prop_bands_partition_height_range(h in 0.0f32..=30.0) {
            let layout = TerrainLayout::from_settings(&TerrainSettings::default()).unwrap();
            let thresholds: Vec<f32> = layout.bands().thresholds().collect();

            // Band i covers (t[i], t[i-1]]; the floor covers everything below
            let mut matches = 0;
            let mut upper = f32::INFINITY;
            for &t in &thresholds {
                if h > t && h <= upper {
                    matches += 1;
                }
                upper = t;
            }
            if h <= upper {
                matches += 1;
            }
            prop_assert_eq!(matches, 1);
            prop_assert_eq!(layout.bands().band_count(), 9);
        }
    }
}
