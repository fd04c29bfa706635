//! Geospatial patch samplers
//!
//! Samplers turn a dataset's coverage into a stream of query bounding boxes
//! ("patches") for a training or evaluation loop. Patch and stride sizes are
//! given in pixels and converted to CRS units through the dataset
//! resolution. Every emitted box spans the full time range of the region it
//! was cut from.

use geotrain_core::BoundingBox;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Deterministic row-major grid of patches over a region.
///
/// Used for validation and test stages, where every part of the region
/// should be visited exactly once. A region smaller than one patch yields
/// the whole region as a single patch.
#[derive(Debug, Clone)]
pub struct GridSampler {
    patches: Vec<BoundingBox>,
    cursor: usize,
}

impl GridSampler {
    /// Lay a grid over `region` at resolution `res`, with `patch_size` and
    /// `stride` in pixels as (rows, cols).
    pub fn new(
        region: BoundingBox,
        res: f64,
        patch_size: (usize, usize),
        stride: (usize, usize),
    ) -> Self {
        let patch_h = patch_size.0 as f64 * res;
        let patch_w = patch_size.1 as f64 * res;
        let stride_h = stride.0 as f64 * res;
        let stride_w = stride.1 as f64 * res;

        let rows = grid_steps(region.height(), patch_h, stride_h);
        let cols = grid_steps(region.width(), patch_w, stride_w);

        let mut patches = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                let minx = region.minx + c as f64 * stride_w;
                let maxy = region.maxy - r as f64 * stride_h;
                patches.push(BoundingBox::new(
                    minx,
                    (minx + patch_w).min(region.maxx),
                    (maxy - patch_h).max(region.miny),
                    maxy,
                    region.mint,
                    region.maxt,
                ));
            }
        }

        Self { patches, cursor: 0 }
    }

    /// Total number of patches
    pub fn len(&self) -> usize {
        self.patches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }
}

impl Iterator for GridSampler {
    type Item = BoundingBox;

    fn next(&mut self) -> Option<BoundingBox> {
        let patch = self.patches.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(patch)
    }
}

/// Number of grid positions along one axis.
fn grid_steps(extent: f64, patch: f64, stride: f64) -> usize {
    if extent < patch {
        // Degenerate region: emit it once rather than never.
        return 1;
    }
    ((extent - patch) / stride).floor() as usize + 1
}

/// Uniformly-placed random patches, delivered in batches.
///
/// Drives the training stage: `length` patches per epoch, grouped into
/// `length / batch_size` batches. Seeded so an epoch is reproducible.
#[derive(Debug, Clone)]
pub struct RandomBatchSampler {
    region: BoundingBox,
    patch_w: f64,
    patch_h: f64,
    batch_size: usize,
    remaining: usize,
    rng: StdRng,
}

impl RandomBatchSampler {
    /// Sample `length` patches of `patch_size` pixels (rows, cols) from
    /// `region`, in batches of `batch_size`.
    pub fn new(
        region: BoundingBox,
        res: f64,
        patch_size: (usize, usize),
        batch_size: usize,
        length: usize,
        seed: u64,
    ) -> Self {
        Self {
            region,
            patch_h: patch_size.0 as f64 * res,
            patch_w: patch_size.1 as f64 * res,
            batch_size: batch_size.max(1),
            remaining: length / batch_size.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Number of batches left
    pub fn len(&self) -> usize {
        self.remaining
    }

    pub fn is_empty(&self) -> bool {
        self.remaining == 0
    }

    fn sample_patch(&mut self) -> BoundingBox {
        let max_x0 = (self.region.maxx - self.patch_w).max(self.region.minx);
        let max_y0 = (self.region.maxy - self.patch_h).max(self.region.miny);

        let minx = if max_x0 > self.region.minx {
            self.rng.gen_range(self.region.minx..max_x0)
        } else {
            self.region.minx
        };
        let miny = if max_y0 > self.region.miny {
            self.rng.gen_range(self.region.miny..max_y0)
        } else {
            self.region.miny
        };

        BoundingBox::new(
            minx,
            (minx + self.patch_w).min(self.region.maxx),
            miny,
            (miny + self.patch_h).min(self.region.maxy),
            self.region.mint,
            self.region.maxt,
        )
    }
}

impl Iterator for RandomBatchSampler {
    type Item = Vec<BoundingBox>;

    fn next(&mut self) -> Option<Vec<BoundingBox>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some((0..self.batch_size).map(|_| self.sample_patch()).collect())
    }
}
