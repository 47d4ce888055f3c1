//! The lake: a water plane clipped to the dark region of a raster mask.
//!
//! The raster is decoded on a worker thread at startup. Until it arrives every
//! query answers "not water" and the render tile list is empty.

use crate::mask::{LuminanceField, SpatialMask};
use engine_core::{Vec3, WorldRect};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LakeError {
    #[error("failed to decode lake mask: {0}")]
    Decode(#[from] image::ImageError),
    #[error("lake mask worker exited without a result")]
    WorkerGone,
}

/// Lake placement and mask sampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LakeConfig {
    /// Raster whose black pixels mark water.
    pub mask_path: PathBuf,
    /// The mask covers `[-half_extent, half_extent]` on X and Z.
    pub half_extent: f32,
    /// World Y of the water plane.
    pub water_height: f32,
    pub mask_resolution: usize,
    /// Coarse render grid (tiles per side).
    pub tiles_per_side: usize,
}

impl Default for LakeConfig {
    fn default() -> Self {
        Self {
            mask_path: PathBuf::from("textures/lake.png"),
            half_extent: 300.0,
            water_height: -5.0,
            mask_resolution: 100,
            tiles_per_side: 10,
        }
    }
}

/// One square of water to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LakeTile {
    pub center: Vec3,
    pub size: f32,
}

pub struct LakeSurface {
    bounds: WorldRect,
    water_height: f32,
    resolution: usize,
    tiles_per_side: usize,
    mask: Option<SpatialMask>,
    pending: Option<Receiver<Result<SpatialMask, LakeError>>>,
}

impl LakeSurface {
    pub fn new(config: &LakeConfig) -> Self {
        Self {
            bounds: WorldRect::centered(config.half_extent.abs().max(1.0)),
            water_height: config.water_height,
            resolution: config.mask_resolution.max(1),
            tiles_per_side: config.tiles_per_side.max(1),
            mask: None,
            pending: None,
        }
    }

    /// Start decoding `path` in the background. Fire-and-forget: call
    /// [`poll`](Self::poll) each tick to pick the mask up.
    pub fn load_async(&mut self, path: &Path) {
        let (tx, rx) = mpsc::channel();
        let path = path.to_path_buf();
        let bounds = self.bounds;
        let resolution = self.resolution;
        let spawned = std::thread::Builder::new()
            .name("lake-mask".into())
            .spawn(move || {
                let _ = tx.send(decode_mask(&path, bounds, resolution));
            });
        match spawned {
            Ok(_) => self.pending = Some(rx),
            Err(e) => log::warn!("Could not start lake mask loader: {}", e),
        }
    }

    /// Non-blocking check for a finished background load. Returns true on the
    /// call that installs the mask.
    pub fn poll(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };
        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(LakeError::WorkerGone),
        };
        self.pending = None;
        match result {
            Ok(mask) => {
                log::info!(
                    "Lake mask ready: {} water cells of {}",
                    mask.member_count(),
                    mask.resolution() * mask.resolution()
                );
                self.mask = Some(mask);
                true
            }
            Err(e) => {
                log::warn!("{}; lake disabled", e);
                false
            }
        }
    }

    /// Install a mask synchronously from an in-memory raster.
    pub fn set_mask_from_field(&mut self, field: &LuminanceField) {
        self.mask = Some(SpatialMask::from_field(field, self.bounds, self.resolution));
        self.pending = None;
    }

    pub fn is_ready(&self) -> bool {
        self.mask.is_some()
    }

    pub fn bounds(&self) -> WorldRect {
        self.bounds
    }

    pub fn mask(&self) -> Option<&SpatialMask> {
        self.mask.as_ref()
    }

    /// Whether a ground point lies over water. False until the mask is loaded.
    pub fn is_in_lake(&self, x: f32, z: f32) -> bool {
        self.mask.as_ref().is_some_and(|m| m.contains(x, z))
    }

    /// World Y of the water plane.
    pub fn height(&self) -> f32 {
        self.water_height
    }

    pub fn is_lake_tile(&self, i: usize, j: usize) -> bool {
        self.mask
            .as_ref()
            .is_some_and(|m| m.tile_overlaps(i, j, self.tiles_per_side))
    }

    /// Render tiles that touch water.
    pub fn lake_tiles(&self) -> Vec<LakeTile> {
        let n = self.tiles_per_side;
        let size = self.bounds.width() / n as f32;
        let mut tiles = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if !self.is_lake_tile(i, j) {
                    continue;
                }
                tiles.push(LakeTile {
                    center: Vec3::new(
                        self.bounds.min_x + size / 2.0 + i as f32 * size,
                        self.water_height,
                        self.bounds.min_z + size / 2.0 + j as f32 * size,
                    ),
                    size,
                });
            }
        }
        tiles
    }
}

/// Decode an image file into a mask over `bounds`.
pub fn decode_mask(
    path: &Path,
    bounds: WorldRect,
    resolution: usize,
) -> Result<SpatialMask, LakeError> {
    let image = image::open(path)?.to_rgb8();
    let field = LuminanceField::from_rgb(image.width(), image.height(), image.as_raw());
    Ok(SpatialMask::from_field(&field, bounds, resolution))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> LakeConfig {
        LakeConfig {
            half_extent: 50.0,
            mask_resolution: 10,
            tiles_per_side: 5,
            ..Default::default()
        }
    }

    /// 10x10 raster, single black pixel at (u=3, v=6).
    fn single_pixel_field() -> LuminanceField {
        let mut samples = vec![180u8; 100];
        samples[6 * 10 + 3] = 0;
        LuminanceField::new(10, 10, samples)
    }

    #[test]
    fn unloaded_lake_answers_false() {
        let lake = LakeSurface::new(&test_config());
        assert!(!lake.is_ready());
        assert!(!lake.is_in_lake(0.0, 0.0));
        assert!(lake.lake_tiles().is_empty());
        assert_eq!(lake.height(), -5.0);
    }

    #[test]
    fn water_cell_and_neighbour() {
        let mut lake = LakeSurface::new(&test_config());
        lake.set_mask_from_field(&single_pixel_field());
        // cell (3,6) spans x in [-20,-10), z in [10,20)
        assert!(lake.is_in_lake(-15.0, 15.0));
        assert!(!lake.is_in_lake(-5.0, 15.0));
        assert!(!lake.is_in_lake(-15.0, 25.0));
    }

    #[test]
    fn outside_rectangle_is_dry() {
        let mut lake = LakeSurface::new(&test_config());
        lake.set_mask_from_field(&LuminanceField::new(1, 1, vec![0]));
        assert!(lake.is_in_lake(49.0, -49.0));
        assert!(!lake.is_in_lake(51.0, 0.0));
    }

    #[test]
    fn tiles_cover_water_cell() {
        let mut lake = LakeSurface::new(&test_config());
        lake.set_mask_from_field(&single_pixel_field());
        let tiles = lake.lake_tiles();
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.size == 20.0 && t.center.y == -5.0));
        // tile (1,3) holds cell (3,6) on its probes
        assert!(tiles.iter().any(|t| t.center.x == -20.0 && t.center.z == 20.0));
    }

    #[test]
    fn missing_file_reports_error_through_poll() {
        let mut lake = LakeSurface::new(&test_config());
        lake.load_async(Path::new("definitely/not/here.png"));
        let mut installed = false;
        for _ in 0..200 {
            installed |= lake.poll();
            if lake.pending.is_none() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!installed);
        assert!(!lake.is_ready());
        assert!(!lake.is_in_lake(0.0, 0.0));
    }
}
