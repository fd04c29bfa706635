//! # GeoTrain Pipeline
//!
//! Samplers and stage-driven data modules gluing the dataset crate to a
//! training loop: grid and random-batch patch samplers over dataset
//! coverage, plus the [`LandCoverDataModule`] wiring imagery and regional
//! label layers into per-stage samplers.

pub mod datamodule;
pub mod samplers;

pub use datamodule::{DataModuleConfig, LandCoverDataModule, Stage};
pub use samplers::{GridSampler, RandomBatchSampler};
