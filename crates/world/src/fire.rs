//! Fire patches: grids of flame tufts that water can put out.
//!
//! A patch is populated once (each cell lights with probability `density`)
//! and afterwards only changes through [`FirePatch::extinguish_with_water`].

use engine_core::{Mat4, TransformRaw, Vec3, WorldRect};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// World size of one grid step.
pub const FIRE_CELL_SIZE: f32 = 5.0;
/// Cumulative extinguished percentage at which the whole patch goes out.
pub const EXTINGUISHED_THRESHOLD: f32 = 85.0;
/// Bounds margin as a fraction of the larger extent.
const BOUNDS_MARGIN: f32 = 0.05;

const FLAME_HEIGHTS: [f32; 2] = [0.8, 1.2];
const FLAME_WIDTHS: [f32; 1] = [0.35];
const ROTATION_STEPS: u8 = 6;
/// Max positional jitter in grid units.
const CELL_JITTER: f32 = 0.02;
const MAX_DEPTH_OFFSET: f32 = 0.05;

/// Patch placement from the scene config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirePatchConfig {
    pub position: [f32; 3],
    pub rows: usize,
    pub cols: usize,
    /// Chance (0–1) that a cell holds a flame.
    pub density: f32,
}

impl FirePatchConfig {
    /// The three patches of the default scene, one per forest.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                position: [-180.0, 0.0, 50.0],
                rows: 30,
                cols: 30,
                density: 0.05,
            },
            Self {
                position: [100.0, 0.0, 80.0],
                rows: 20,
                cols: 20,
                density: 0.05,
            },
            Self {
                position: [120.0, 0.0, -80.0],
                rows: 15,
                cols: 15,
                density: 0.05,
            },
        ]
    }
}

/// Discrete flame shape; flames sharing a key share one mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BatchKey {
    pub height_step: u8,
    pub width_step: u8,
    pub rotation_step: u8,
}

impl BatchKey {
    pub fn height(&self) -> f32 {
        FLAME_HEIGHTS[self.height_step as usize % FLAME_HEIGHTS.len()]
    }

    pub fn width(&self) -> f32 {
        FLAME_WIDTHS[self.width_step as usize % FLAME_WIDTHS.len()]
    }

    pub fn rotation(&self) -> f32 {
        self.rotation_step as f32 * std::f32::consts::TAU / ROTATION_STEPS as f32
    }
}

/// One grid position holding a flame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlameCell {
    /// Grid-space position (row index plus jitter).
    pub row: f32,
    /// Grid-space position (column index plus jitter).
    pub col: f32,
    pub key: BatchKey,
    pub depth: f32,
    pub active: bool,
}

impl FlameCell {
    pub fn height(&self) -> f32 {
        self.key.height()
    }

    pub fn width(&self) -> f32 {
        self.key.width()
    }

    pub fn rotation(&self) -> f32 {
        self.key.rotation()
    }
}

/// Flames that share a shape, in patch-local grid coordinates.
#[derive(Debug, Clone)]
pub struct FlameBatch {
    pub key: BatchKey,
    pub positions: Vec<Vec3>,
}

/// Result of one water application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extinguish {
    /// Flames put out by this call.
    pub flames: usize,
    /// This call pushed the patch past the threshold.
    pub fire_out: bool,
}

#[derive(Debug, Clone)]
pub struct FirePatch {
    rows: usize,
    cols: usize,
    position: Vec3,
    cell_size: f32,
    cells: Vec<Option<FlameCell>>,
    active: bool,
    extinguish_percentage: f32,
    batches: HashMap<BatchKey, FlameBatch>,
    batches_dirty: bool,
}

impl FirePatch {
    /// Populate a patch with the thread RNG.
    pub fn new(config: &FirePatchConfig) -> Self {
        Self::generate(config, &mut rand::thread_rng())
    }

    /// Populate a patch: each cell lights independently with `density`.
    pub fn generate<R: Rng>(config: &FirePatchConfig, rng: &mut R) -> Self {
        let rows = config.rows;
        let cols = config.cols;
        let density = config.density.clamp(0.0, 1.0);
        let mut cells = vec![None; rows * cols];

        for row in 0..rows {
            for col in 0..cols {
                if rng.gen::<f32>() < density {
                    cells[row * cols + col] = Some(FlameCell {
                        row: row as f32 - rng.gen_range(-CELL_JITTER..CELL_JITTER),
                        col: col as f32 - rng.gen_range(-CELL_JITTER..CELL_JITTER),
                        key: BatchKey {
                            height_step: rng.gen_range(0..FLAME_HEIGHTS.len()) as u8,
                            width_step: rng.gen_range(0..FLAME_WIDTHS.len()) as u8,
                            rotation_step: rng.gen_range(0..ROTATION_STEPS),
                        },
                        depth: rng.gen_range(0.0..MAX_DEPTH_OFFSET),
                        active: true,
                    });
                }
            }
        }

        let [x, y, z] = config.position;
        Self {
            rows,
            cols,
            position: Vec3::new(x, y, z),
            cell_size: FIRE_CELL_SIZE,
            cells,
            active: true,
            extinguish_percentage: 0.0,
            batches: HashMap::new(),
            batches_dirty: true,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// False once the patch has been put out. Never reignites.
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn extinguish_percentage(&self) -> f32 {
        self.extinguish_percentage
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&FlameCell> {
        if row < self.rows && col < self.cols {
            self.cells[row * self.cols + col].as_ref()
        } else {
            None
        }
    }

    pub fn active_flames(&self) -> impl Iterator<Item = &FlameCell> {
        self.cells.iter().flatten().filter(|c| c.active)
    }

    pub fn active_flame_count(&self) -> usize {
        self.active_flames().count()
    }

    /// World X/Z of a flame centre.
    fn flame_world_xz(&self, flame: &FlameCell) -> (f32, f32) {
        (
            self.position.x + flame.row * self.cell_size,
            self.position.z + flame.col * self.cell_size,
        )
    }

    /// Ground rectangle around the burning flames plus a 5% margin of the
    /// larger extent. `None` when the patch is out or nothing burns.
    pub fn bounds(&self) -> Option<WorldRect> {
        if !self.active {
            return None;
        }
        let mut rect: Option<WorldRect> = None;
        for flame in self.active_flames() {
            let (cx, cz) = self.flame_world_xz(flame);
            let half = 0.5 * flame.width() * self.cell_size;
            let r = rect.get_or_insert(WorldRect::new(cx, cx, cz, cz));
            r.min_x = r.min_x.min(cx - half);
            r.max_x = r.max_x.max(cx + half);
            r.min_z = r.min_z.min(cz - half);
            r.max_z = r.max_z.max(cz + half);
        }
        rect.map(|r| r.expanded(r.width().max(r.depth()) * BOUNDS_MARGIN))
    }

    /// Put out every burning flame within `radius` of world point (`x`, `z`).
    ///
    /// The share of flames put out (relative to those burning before the call)
    /// accumulates; at 85% the whole patch goes out.
    pub fn extinguish_with_water(&mut self, x: f32, z: f32, radius: f32) -> Extinguish {
        if !self.active {
            return Extinguish::default();
        }
        let local_x = (x - self.position.x) / self.cell_size;
        let local_z = (z - self.position.z) / self.cell_size;
        let local_radius = radius / self.cell_size;

        let burning_before = self.active_flame_count();
        let mut flames = 0;
        for cell in self.cells.iter_mut().flatten().filter(|c| c.active) {
            let dist = ((cell.row - local_x).powi(2) + (cell.col - local_z).powi(2)).sqrt();
            if dist <= local_radius {
                cell.active = false;
                flames += 1;
            }
        }

        if flames > 0 {
            self.batches_dirty = true;
        }

        let mut fire_out = false;
        if burning_before > 0 {
            self.extinguish_percentage += flames as f32 / burning_before as f32 * 100.0;
            if self.extinguish_percentage >= EXTINGUISHED_THRESHOLD {
                self.active = false;
                fire_out = true;
                log::info!(
                    "Fire at ({:.0}, {:.0}) extinguished ({:.0}%)",
                    self.position.x,
                    self.position.z,
                    self.extinguish_percentage
                );
            }
        }

        Extinguish { flames, fire_out }
    }

    /// Whether the next render pass has to regroup flames.
    pub fn needs_batch_update(&self) -> bool {
        self.batches_dirty
    }

    fn rebuild_batches(&mut self) {
        self.batches.clear();
        for cell in self.cells.iter().flatten().filter(|c| c.active) {
            self.batches
                .entry(cell.key)
                .or_insert_with(|| FlameBatch {
                    key: cell.key,
                    positions: Vec::new(),
                })
                .positions
                .push(Vec3::new(cell.row, 0.0, cell.col));
        }
        self.batches_dirty = false;
    }

    /// Flame groups for drawing, regrouped lazily after any change.
    pub fn batches(&mut self) -> impl Iterator<Item = &FlameBatch> {
        if self.batches_dirty {
            self.rebuild_batches();
        }
        self.batches.values()
    }

    pub fn batch_count(&mut self) -> usize {
        self.batches().count()
    }

    /// Per-batch instance matrices, each batch sorted back to front from `eye`.
    /// Empty once the patch is out.
    pub fn flame_instances(&mut self, eye: Vec3) -> Vec<(BatchKey, Vec<TransformRaw>)> {
        if !self.active {
            return Vec::new();
        }
        let patch =
            Mat4::from_translation(self.position) * Mat4::from_scale(Vec3::splat(self.cell_size));
        let origin = self.position;
        let cell_size = self.cell_size;

        let mut out: Vec<(BatchKey, Vec<TransformRaw>)> = self
            .batches()
            .map(|batch| {
                let mut positions = batch.positions.clone();
                let dist = |p: &Vec3| (origin + *p * cell_size).distance_squared(eye);
                positions.sort_by(|a, b| dist(b).total_cmp(&dist(a)));

                let size = Vec3::new(batch.key.width() * 2.0, batch.key.height() * 2.0, 1.0);
                let shape = Mat4::from_rotation_y(batch.key.rotation()) * Mat4::from_scale(size);
                let instances = positions
                    .iter()
                    .map(|p| TransformRaw::from(patch * Mat4::from_translation(*p) * shape))
                    .collect();
                (batch.key, instances)
            })
            .collect();
        out.sort_by_key(|(key, _)| *key);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn full_patch(rows: usize, cols: usize) -> FirePatch {
        let config = FirePatchConfig {
            position: [100.0, 0.0, -40.0],
            rows,
            cols,
            density: 1.0,
        };
        FirePatch::generate(&config, &mut StdRng::seed_from_u64(7))
    }

    #[test]
    fn density_one_fills_every_cell() {
        let patch = full_patch(6, 4);
        assert_eq!(patch.active_flame_count(), 24);
        assert!(patch.cell(5, 3).is_some());
        assert!(patch.cell(6, 0).is_none());
    }

    #[test]
    fn density_zero_is_empty_and_has_no_bounds() {
        let config = FirePatchConfig {
            position: [0.0; 3],
            rows: 10,
            cols: 10,
            density: 0.0,
        };
        let patch = FirePatch::generate(&config, &mut StdRng::seed_from_u64(1));
        assert_eq!(patch.active_flame_count(), 0);
        assert!(patch.is_active());
        assert!(patch.bounds().is_none());
    }

    #[test]
    fn same_seed_same_layout() {
        let config = FirePatchConfig {
            position: [0.0; 3],
            rows: 12,
            cols: 12,
            density: 0.3,
        };
        let a = FirePatch::generate(&config, &mut StdRng::seed_from_u64(42));
        let b = FirePatch::generate(&config, &mut StdRng::seed_from_u64(42));
        let cells_a: Vec<_> = a.active_flames().copied().collect();
        let cells_b: Vec<_> = b.active_flames().copied().collect();
        assert_eq!(cells_a, cells_b);
    }

    #[test]
    fn flame_jitter_stays_small() {
        let patch = full_patch(5, 5);
        for row in 0..5 {
            for col in 0..5 {
                let cell = patch.cell(row, col).unwrap();
                assert!((cell.row - row as f32).abs() <= CELL_JITTER);
                assert!((cell.col - col as f32).abs() <= CELL_JITTER);
            }
        }
    }

    #[test]
    fn bounds_margin_is_five_percent_of_larger_side() {
        let patch = full_patch(6, 3);
        let bounds = patch.bounds().unwrap();

        let mut raw: Option<WorldRect> = None;
        for flame in patch.active_flames() {
            let (cx, cz) = patch.flame_world_xz(flame);
            let half = 0.5 * flame.width() * FIRE_CELL_SIZE;
            let r = raw.get_or_insert(WorldRect::new(cx, cx, cz, cz));
            r.min_x = r.min_x.min(cx - half);
            r.max_x = r.max_x.max(cx + half);
            r.min_z = r.min_z.min(cz - half);
            r.max_z = r.max_z.max(cz + half);
        }
        let raw = raw.unwrap();
        let margin = raw.width().max(raw.depth()) * 0.05;
        assert!((raw.min_x - bounds.min_x - margin).abs() < 1e-3);
        assert!((bounds.max_z - raw.max_z - margin).abs() < 1e-3);
        // Rows run along X, so the 6-row side dominates
        assert!(raw.width() > raw.depth());
    }

    #[test]
    fn direct_hit_covering_all_flames_puts_fire_out() {
        let mut patch = full_patch(10, 10);
        let bounds = patch.bounds().unwrap();
        let cx = (bounds.min_x + bounds.max_x) / 2.0;
        let cz = (bounds.min_z + bounds.max_z) / 2.0;
        let result = patch.extinguish_with_water(cx, cz, 1000.0);
        assert_eq!(result.flames, 100);
        assert!(result.fire_out);
        assert!(patch.extinguish_percentage() >= EXTINGUISHED_THRESHOLD);
        assert!(!patch.is_active());
        assert!(patch.bounds().is_none());
    }

    #[test]
    fn inactive_patch_ignores_water() {
        let mut patch = full_patch(4, 4);
        patch.extinguish_with_water(100.0, -40.0, 1000.0);
        let again = patch.extinguish_with_water(100.0, -40.0, 1000.0);
        assert_eq!(again, Extinguish::default());
    }

    #[test]
    fn partial_hits_accumulate_until_threshold() {
        // 1 row x 10 columns: flames at local col 0..9, world z = -40 + col*5
        let mut patch = full_patch(1, 10);
        // Radius 12 around col 0 catches cols 0, 1, 2 (within 2.4 grid units)
        let first = patch.extinguish_with_water(100.0, -40.0, 12.0);
        assert_eq!(first.flames, 3);
        assert!(!first.fire_out);
        assert!((patch.extinguish_percentage() - 30.0).abs() < 1e-3);

        // Knock out the remaining 7: 100% of what was burning
        let second = patch.extinguish_with_water(100.0, -40.0 + 6.0 * 5.0, 20.0);
        assert_eq!(second.flames, 7);
        assert!(second.fire_out);
        assert!(!patch.is_active());
    }

    #[test]
    fn miss_leaves_percentage_unchanged() {
        let mut patch = full_patch(3, 3);
        let result = patch.extinguish_with_water(-500.0, 500.0, 5.0);
        assert_eq!(result.flames, 0);
        assert_eq!(patch.extinguish_percentage(), 0.0);
        assert!(!patch.needs_batch_update() || patch.batch_count() > 0);
    }

    #[test]
    fn batches_regroup_after_water() {
        let mut patch = full_patch(8, 8);
        let total: usize = patch.batches().map(|b| b.positions.len()).sum();
        assert_eq!(total, 64);
        let shapes = FLAME_HEIGHTS.len() * FLAME_WIDTHS.len() * ROTATION_STEPS as usize;
        assert!(patch.batch_count() <= shapes);
        assert!(!patch.needs_batch_update());

        let hit = patch.extinguish_with_water(100.0, -40.0, 6.0);
        assert!(hit.flames > 0);
        assert!(patch.needs_batch_update());
        let remaining: usize = patch.batches().map(|b| b.positions.len()).sum();
        assert_eq!(remaining, 64 - hit.flames);
        assert!(!patch.needs_batch_update());
    }

    #[test]
    fn batch_key_matches_cell_shape() {
        let mut patch = full_patch(4, 4);
        let keys: Vec<BatchKey> = patch.batches().map(|b| b.key).collect();
        for flame in patch.active_flames() {
            assert!(keys.contains(&flame.key));
            assert!(FLAME_HEIGHTS.contains(&flame.height()));
            assert_eq!(flame.width(), 0.35);
        }
    }

    #[test]
    fn instances_sorted_back_to_front() {
        let mut patch = full_patch(6, 6);
        let eye = Vec3::new(100.0, 10.0, -40.0);
        let instances = patch.flame_instances(eye);
        let count: usize = instances.iter().map(|(_, v)| v.len()).sum();
        assert_eq!(count, 36);
        for (_, batch) in &instances {
            let dists: Vec<f32> = batch
                .iter()
                .map(|raw| Vec3::from_slice(&raw.model[3][..3]).distance(eye))
                .collect();
            assert!(dists.windows(2).all(|w| w[0] >= w[1] - 1e-3));
        }
    }
}
