//! Occupancy grids sampled from a luminance raster.

use engine_core::WorldRect;

/// Cell value that marks membership (dark pixels are water).
pub const REGION_SENTINEL: u8 = 0;

/// Greyscale raster, row-major, `width * height` samples.
#[derive(Debug, Clone)]
pub struct LuminanceField {
    pub width: u32,
    pub height: u32,
    pub samples: Vec<u8>,
}

impl LuminanceField {
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Self {
        debug_assert_eq!(samples.len(), (width * height) as usize);
        Self { width, height, samples }
    }

    /// Collapse RGB triples to one luminance byte. The average is rounded up so
    /// only a pure black pixel maps to the sentinel.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Self {
        let samples = rgb
            .chunks_exact(3)
            .map(|p| {
                let sum = p[0] as u16 + p[1] as u16 + p[2] as u16;
                sum.div_ceil(3) as u8
            })
            .collect();
        Self::new(width, height, samples)
    }

    /// Sample at pixel coordinates; out of range reads as fully bright.
    pub fn get(&self, u: u32, v: u32) -> u8 {
        if u < self.width && v < self.height {
            self.samples[(v * self.width + u) as usize]
        } else {
            u8::MAX
        }
    }
}

/// `resolution × resolution` grid over a world rectangle. Cell `(i, j)` covers
/// the i-th slice along X and the j-th slice along Z.
#[derive(Debug, Clone)]
pub struct SpatialMask {
    resolution: usize,
    bounds: WorldRect,
    cells: Vec<u8>,
}

impl SpatialMask {
    /// Sample `field` at each cell centre. The raster is stretched over `bounds`.
    pub fn from_field(field: &LuminanceField, bounds: WorldRect, resolution: usize) -> Self {
        let resolution = resolution.max(1);
        let mut cells = vec![u8::MAX; resolution * resolution];
        let cell_w = bounds.width() / resolution as f32;
        let cell_d = bounds.depth() / resolution as f32;

        for i in 0..resolution {
            for j in 0..resolution {
                let x = bounds.min_x + (i as f32 + 0.5) * cell_w;
                let z = bounds.min_z + (j as f32 + 0.5) * cell_d;
                let u = ((x - bounds.min_x) / bounds.width() * field.width as f32).floor() as u32;
                let v = ((z - bounds.min_z) / bounds.depth() * field.height as f32).floor() as u32;
                cells[i * resolution + j] = field.get(u, v);
            }
        }

        Self { resolution, bounds, cells }
    }

    /// Build directly from cell values (`cells[i * resolution + j]`).
    pub fn from_cells(bounds: WorldRect, resolution: usize, cells: Vec<u8>) -> Self {
        let resolution = resolution.max(1);
        let mut cells = cells;
        cells.resize(resolution * resolution, u8::MAX);
        Self { resolution, bounds, cells }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn bounds(&self) -> WorldRect {
        self.bounds
    }

    /// Raw cell value, `None` outside the grid.
    pub fn value(&self, i: usize, j: usize) -> Option<u8> {
        if i < self.resolution && j < self.resolution {
            Some(self.cells[i * self.resolution + j])
        } else {
            None
        }
    }

    pub fn is_member(&self, i: usize, j: usize) -> bool {
        self.value(i, j) == Some(REGION_SENTINEL)
    }

    /// Nearest cell containing a world point.
    pub fn cell_at(&self, x: f32, z: f32) -> Option<(usize, usize)> {
        let (u, v) = self.bounds.normalized(x, z)?;
        let i = (u * self.resolution as f32).floor() as usize;
        let j = (v * self.resolution as f32).floor() as usize;
        // The far edge maps to `resolution`; it stays out of the grid.
        (i < self.resolution && j < self.resolution).then_some((i, j))
    }

    /// Point-in-region query.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        self.cell_at(x, z).is_some_and(|(i, j)| self.is_member(i, j))
    }

    /// Conservative overlap test for the `tile`-th square of a coarse
    /// `tiles_per_side` grid laid over the same bounds. Nine points (corners,
    /// edge midpoints, centre) are probed; any member cell counts.
    pub fn tile_overlaps(&self, tile_i: usize, tile_j: usize, tiles_per_side: usize) -> bool {
        let tiles = tiles_per_side.max(1) as f32;
        let (ti, tj) = (tile_i as f32, tile_j as f32);
        let probes = [
            (ti, tj),
            (ti + 0.5, tj),
            (ti + 1.0, tj),
            (ti, tj + 1.0),
            (ti, tj + 0.5),
            (ti + 0.5, tj + 1.0),
            (ti + 1.0, tj + 0.5),
            (ti + 0.5, tj + 0.5),
            (ti + 1.0, tj + 1.0),
        ];
        probes.iter().any(|&(pi, pj)| {
            let i = (pi * self.resolution as f32 / tiles).floor() as usize;
            let j = (pj * self.resolution as f32 / tiles).floor() as usize;
            self.is_member(i, j)
        })
    }

    pub fn member_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == REGION_SENTINEL).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_square_field() -> LuminanceField {
        // 10x10 raster, dark 4x4 block at u,v in 2..6
        let mut samples = vec![200u8; 100];
        for v in 2..6 {
            for u in 2..6 {
                samples[v * 10 + u] = 0;
            }
        }
        LuminanceField::new(10, 10, samples)
    }

    #[test]
    fn rgb_average_only_zero_for_black() {
        let field = LuminanceField::from_rgb(2, 1, &[0, 0, 0, 1, 0, 0]);
        assert_eq!(field.samples, vec![0, 1]);
    }

    #[test]
    fn samples_cell_centres() {
        let mask = SpatialMask::from_field(&dark_square_field(), WorldRect::centered(50.0), 10);
        assert!(mask.is_member(2, 2));
        assert!(mask.is_member(5, 5));
        assert!(!mask.is_member(6, 5));
        assert_eq!(mask.member_count(), 16);
    }

    #[test]
    fn point_query_respects_axes() {
        // cell (i=2, j=7): x slice 2, z slice 7
        let mut cells = vec![255u8; 100];
        cells[2 * 10 + 7] = 0;
        let mask = SpatialMask::from_cells(WorldRect::centered(50.0), 10, cells);
        assert!(mask.contains(-25.0, 25.0));
        assert!(!mask.contains(25.0, -25.0));
    }

    #[test]
    fn outside_bounds_is_not_member() {
        let mask = SpatialMask::from_cells(WorldRect::centered(10.0), 4, vec![0; 16]);
        assert!(mask.contains(0.0, 0.0));
        assert!(!mask.contains(10.5, 0.0));
        assert!(!mask.contains(10.0, 10.0));
    }

    #[test]
    fn tile_overlap_only_near_water() {
        let mut cells = vec![255u8; 100];
        cells[5 * 10 + 5] = 0;
        let mask = SpatialMask::from_cells(WorldRect::centered(50.0), 10, cells);
        assert!(mask.tile_overlaps(2, 2, 5));
        assert!(!mask.tile_overlaps(1, 1, 5));
        assert!(!mask.tile_overlaps(2, 3, 5));
    }

    #[test]
    fn tile_overlap_is_inclusive_at_shared_corner() {
        // Cell (4,4) sits on the corner shared by tiles (1,1) and (2,2).
        let mut cells = vec![255u8; 100];
        cells[4 * 10 + 4] = 0;
        let mask = SpatialMask::from_cells(WorldRect::centered(50.0), 10, cells);
        assert!(mask.tile_overlaps(1, 1, 5));
        assert!(mask.tile_overlaps(2, 2, 5));
    }
}
