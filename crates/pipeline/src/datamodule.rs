//! Stage-driven dataset and sampler wiring
//!
//! The [`LandCoverDataModule`] assembles everything a training loop needs
//! for the aerial-imagery + regional-land-cover task: it builds the imagery
//! layer, unions the seven regional label layers, intersects the two, and
//! installs the samplers appropriate for the requested stage over disjoint
//! quadrants of the shared extent.

use crate::samplers::{GridSampler, RandomBatchSampler};
use geotrain_core::BoundingBox;
use geotrain_datasets::catalog::{self, Region};
use geotrain_datasets::{
    Figure, GeoDataset, IntersectionDataset, LayerConfig, PlotOptions, RasterLayer, Result, Sample,
    UnionDataset,
};
use tracing::debug;

/// Pipeline stage being set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fit,
    Validate,
    Test,
}

/// Configuration for [`LandCoverDataModule`].
///
/// Each sub-dataset gets its own explicit [`LayerConfig`]; there is no
/// shared keyword bag, so options cannot silently go nowhere.
#[derive(Debug, Clone)]
pub struct DataModuleConfig {
    /// Mini-batch size for the training sampler
    pub batch_size: usize,
    /// Square patch edge in pixels
    pub patch_size: usize,
    /// Patches per training epoch
    pub length: usize,
    /// Worker count handed to the downstream data loader; unused here
    pub num_workers: usize,
    /// Seed for the training sampler
    pub seed: u64,
    /// Configuration for the imagery layer
    pub imagery: LayerConfig,
    /// Configuration shared by the seven regional label layers
    pub labels: LayerConfig,
}

impl DataModuleConfig {
    pub fn new(imagery: LayerConfig, labels: LayerConfig) -> Self {
        Self {
            batch_size: 64,
            patch_size: 256,
            length: 1024,
            num_workers: 0,
            seed: 0,
            imagery,
            labels,
        }
    }
}

/// Train/val/test wiring for imagery + land-cover labels.
pub struct LandCoverDataModule {
    config: DataModuleConfig,
    imagery: Option<RasterLayer>,
    dataset: Option<IntersectionDataset>,
    train_batch_sampler: Option<RandomBatchSampler>,
    val_sampler: Option<GridSampler>,
    test_sampler: Option<GridSampler>,
}

impl LandCoverDataModule {
    pub fn new(config: DataModuleConfig) -> Self {
        Self {
            config,
            imagery: None,
            dataset: None,
            train_batch_sampler: None,
            val_sampler: None,
            test_sampler: None,
        }
    }

    /// Build datasets and the samplers for `stage`.
    ///
    /// The combined extent is bisected at the x/y midpoints; training draws
    /// random batches from the lower-left quadrant, validation walks a grid
    /// over the upper-left quadrant, and testing walks the upper-right
    /// quadrant. The lower-right quadrant is held out entirely.
    pub fn setup(&mut self, stage: Stage) -> Result<()> {
        let imagery = RasterLayer::new(catalog::aerial_imagery(), self.config.imagery.clone())?;

        let mut parts: Vec<Box<dyn GeoDataset>> = Vec::with_capacity(Region::ALL.len());
        for region in Region::ALL {
            let layer =
                RasterLayer::new(catalog::regional_land_cover(region), self.config.labels.clone())?;
            parts.push(Box::new(layer));
        }
        let labels = UnionDataset::from_parts(parts)?;

        let dataset = (imagery.clone() & labels)?;
        let bounds = dataset.bounds();
        let res = dataset.res();
        let midx = bounds.minx + bounds.width() / 2.0;
        let midy = bounds.miny + bounds.height() / 2.0;
        debug!(%bounds, midx, midy, ?stage, "combined dataset extent");

        let patch = (self.config.patch_size, self.config.patch_size);

        if stage == Stage::Fit {
            let train_region = BoundingBox::new(
                bounds.minx, midx, bounds.miny, midy, bounds.mint, bounds.maxt,
            );
            self.train_batch_sampler = Some(RandomBatchSampler::new(
                train_region,
                res,
                patch,
                self.config.batch_size,
                self.config.length,
                self.config.seed,
            ));
        }
        if stage == Stage::Fit || stage == Stage::Validate {
            let val_region = BoundingBox::new(
                bounds.minx, midx, midy, bounds.maxy, bounds.mint, bounds.maxt,
            );
            self.val_sampler = Some(GridSampler::new(val_region, res, patch, patch));
        }
        if stage == Stage::Test {
            let test_region = BoundingBox::new(
                midx, bounds.maxx, midy, bounds.maxy, bounds.mint, bounds.maxt,
            );
            self.test_sampler = Some(GridSampler::new(test_region, res, patch, patch));
        }

        self.imagery = Some(imagery);
        self.dataset = Some(dataset);
        Ok(())
    }

    /// The combined imagery ∩ labels dataset, once set up
    pub fn dataset(&self) -> Option<&IntersectionDataset> {
        self.dataset.as_ref()
    }

    /// Borrow the training batch sampler installed by `setup(Fit)`
    pub fn train_batch_sampler(&self) -> Option<&RandomBatchSampler> {
        self.train_batch_sampler.as_ref()
    }

    /// Borrow the validation sampler installed by `setup(Fit|Validate)`
    pub fn val_sampler(&self) -> Option<&GridSampler> {
        self.val_sampler.as_ref()
    }

    /// Borrow the test sampler installed by `setup(Test)`
    pub fn test_sampler(&self) -> Option<&GridSampler> {
        self.test_sampler.as_ref()
    }

    /// Take the training batch sampler for iteration
    pub fn take_train_batch_sampler(&mut self) -> Option<RandomBatchSampler> {
        self.train_batch_sampler.take()
    }

    /// Take the validation sampler for iteration
    pub fn take_val_sampler(&mut self) -> Option<GridSampler> {
        self.val_sampler.take()
    }

    /// Take the test sampler for iteration
    pub fn take_test_sampler(&mut self) -> Option<GridSampler> {
        self.test_sampler.take()
    }

    /// Render a sample through the imagery layer's plot method.
    ///
    /// `None` before `setup` has run.
    pub fn plot(&self, sample: &Sample, options: &PlotOptions) -> Option<Figure> {
        self.imagery
            .as_ref()
            .map(|imagery| imagery.plot(sample, options))
    }
}
