//! Intersection and union of datasets
//!
//! The two ways of combining coverage are separate concrete types rather
//! than a shared dynamic wrapper: an [`IntersectionDataset`] is only valid
//! over the shared extent of its members, while a [`UnionDataset`] covers
//! everything any member covers. Both box their members, so layers and
//! combinators nest freely.

use crate::error::{DatasetError, Result};
use crate::geo::{GeoDataset, Sample};
use geotrain_core::{BoundingBox, Crs};
use std::fmt;

fn check_crs(left: &dyn GeoDataset, right: &dyn GeoDataset) -> Result<()> {
    if !left.crs().is_equivalent(right.crs()) {
        return Err(DatasetError::CrsMismatch {
            left: left.crs().identifier(),
            right: right.crs().identifier(),
        });
    }
    Ok(())
}

/// The overlap of two datasets: valid only over their shared extent.
///
/// Typically imagery ∩ labels, so a query yields both an `image` and a
/// `mask` in one sample.
pub struct IntersectionDataset {
    lhs: Box<dyn GeoDataset>,
    rhs: Box<dyn GeoDataset>,
    crs: Crs,
    res: f64,
    bounds: BoundingBox,
}

impl IntersectionDataset {
    /// Combine two datasets over their shared extent.
    ///
    /// Fails when the CRS differ or the extents are disjoint.
    pub fn new(lhs: Box<dyn GeoDataset>, rhs: Box<dyn GeoDataset>) -> Result<Self> {
        check_crs(lhs.as_ref(), rhs.as_ref())?;

        let bounds = lhs
            .bounds()
            .intersection(&rhs.bounds())
            .ok_or_else(|| DatasetError::NoIntersection {
                left: lhs.bounds().to_string(),
                right: rhs.bounds().to_string(),
            })?;

        let crs = lhs.crs().clone();
        // Finer member wins, matching the merge resampling.
        let res = lhs.res().min(rhs.res());
        Ok(Self {
            lhs,
            rhs,
            crs,
            res,
            bounds,
        })
    }
}

impl fmt::Debug for IntersectionDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntersectionDataset")
            .field("crs", &self.crs)
            .field("res", &self.res)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl GeoDataset for IntersectionDataset {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn res(&self) -> f64 {
        self.res
    }

    fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn len(&self) -> usize {
        self.lhs.len().min(self.rhs.len())
    }

    fn get(&self, query: &BoundingBox) -> Result<Sample> {
        if !self.bounds.intersects(query) {
            return Err(DatasetError::QueryOutOfBounds {
                query: *query,
                bounds: self.bounds,
            });
        }

        let mut sample = self.lhs.get(query)?;
        sample.merge(self.rhs.get(query)?);
        Ok(sample)
    }
}

/// The combined coverage of several datasets, e.g. regional label layers
/// merged into one logical map.
pub struct UnionDataset {
    parts: Vec<Box<dyn GeoDataset>>,
    crs: Crs,
    res: f64,
    bounds: BoundingBox,
}

impl UnionDataset {
    /// Combine two datasets.
    pub fn new(lhs: Box<dyn GeoDataset>, rhs: Box<dyn GeoDataset>) -> Result<Self> {
        Self::from_parts(vec![lhs, rhs])
    }

    /// Combine any number of datasets; all must share a CRS.
    pub fn from_parts(parts: Vec<Box<dyn GeoDataset>>) -> Result<Self> {
        let mut it = parts.iter();
        let first = it.next().ok_or(DatasetError::EmptyUnion)?;

        let mut bounds = first.bounds();
        for part in it {
            check_crs(first.as_ref(), part.as_ref())?;
            bounds = bounds.union(&part.bounds());
        }

        let crs = first.crs().clone();
        let res = parts.iter().map(|p| p.res()).fold(f64::INFINITY, f64::min);
        Ok(Self {
            parts,
            crs,
            res,
            bounds,
        })
    }

    /// Absorb another dataset into this union.
    pub fn push(mut self, part: Box<dyn GeoDataset>) -> Result<Self> {
        check_crs(self.parts[0].as_ref(), part.as_ref())?;
        self.bounds = self.bounds.union(&part.bounds());
        self.res = self.res.min(part.res());
        self.parts.push(part);
        Ok(self)
    }
}

impl fmt::Debug for UnionDataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnionDataset")
            .field("parts", &self.parts.len())
            .field("crs", &self.crs)
            .field("res", &self.res)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}

impl GeoDataset for UnionDataset {
    fn crs(&self) -> &Crs {
        &self.crs
    }

    fn res(&self) -> f64 {
        self.res
    }

    fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    fn len(&self) -> usize {
        self.parts.iter().map(|p| p.len()).sum()
    }

    fn get(&self, query: &BoundingBox) -> Result<Sample> {
        // Every member covering the query contributes; earlier members win
        // where coverage overlaps.
        let mut merged: Option<Sample> = None;
        for part in &self.parts {
            if !part.bounds().intersects(query) {
                continue;
            }
            let sample = part.get(query)?;
            match merged.as_mut() {
                Some(acc) => fill_cells(acc, sample),
                None => merged = Some(sample),
            }
        }

        merged.ok_or(DatasetError::QueryOutOfBounds {
            query: *query,
            bounds: self.bounds,
        })
    }
}

/// Fold a later member's sample into the accumulator. Layers emit the fill
/// value (0) for cells they do not cover, so only fill cells take the later
/// member's value.
fn fill_cells(acc: &mut Sample, other: Sample) {
    match (acc.mask.as_mut(), other.mask) {
        (Some(a), Some(b)) if a.dim() == b.dim() => {
            for (av, bv) in a.iter_mut().zip(b.iter()) {
                if *av == 0 {
                    *av = *bv;
                }
            }
        }
        (None, Some(b)) => acc.mask = Some(b),
        _ => {}
    }
    match (acc.image.as_mut(), other.image) {
        (Some(a), Some(b)) if a.dim() == b.dim() => {
            for (av, bv) in a.iter_mut().zip(b.iter()) {
                if *av == 0.0 {
                    *av = *bv;
                }
            }
        }
        (None, Some(b)) => acc.image = Some(b),
        _ => {}
    }
}

// `a & b` / `a | b` sugar over the fallible constructors. Combining can
// fail (CRS mismatch, disjoint extents), so the operators yield `Result`
// and call sites decide how to handle it.
mod ops {
    use super::{IntersectionDataset, UnionDataset};
    use crate::error::Result;
    use crate::geo::GeoDataset;
    use crate::raster::RasterLayer;
    use std::ops::{BitAnd, BitOr};

    macro_rules! impl_combine_ops {
        ($t:ty) => {
            impl<D: GeoDataset + 'static> BitAnd<D> for $t {
                type Output = Result<IntersectionDataset>;

                fn bitand(self, rhs: D) -> Self::Output {
                    IntersectionDataset::new(Box::new(self), Box::new(rhs))
                }
            }

            impl<D: GeoDataset + 'static> BitOr<D> for $t {
                type Output = Result<UnionDataset>;

                fn bitor(self, rhs: D) -> Self::Output {
                    UnionDataset::new(Box::new(self), Box::new(rhs))
                }
            }
        };
    }

    impl_combine_ops!(RasterLayer);
    impl_combine_ops!(IntersectionDataset);

    impl<D: GeoDataset + 'static> BitAnd<D> for UnionDataset {
        type Output = Result<IntersectionDataset>;

        fn bitand(self, rhs: D) -> Self::Output {
            IntersectionDataset::new(Box::new(self), Box::new(rhs))
        }
    }

    impl<D: GeoDataset + 'static> BitOr<D> for UnionDataset {
        type Output = Result<UnionDataset>;

        /// Flattens instead of nesting: the union absorbs the new member.
        fn bitor(self, rhs: D) -> Self::Output {
            self.push(Box::new(rhs))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Minimal in-memory dataset for combinator tests.
    struct Patch {
        bounds: BoundingBox,
        crs: Crs,
        value: u8,
    }

    impl Patch {
        fn new(minx: f64, maxx: f64, value: u8) -> Self {
            Self {
                bounds: BoundingBox::new(minx, maxx, 0.0, 1.0, 0, 100),
                crs: Crs::wgs84(),
                value,
            }
        }
    }

    impl GeoDataset for Patch {
        fn crs(&self) -> &Crs {
            &self.crs
        }

        fn res(&self) -> f64 {
            1.0
        }

        fn bounds(&self) -> BoundingBox {
            self.bounds
        }

        fn len(&self) -> usize {
            1
        }

        fn get(&self, query: &BoundingBox) -> Result<Sample> {
            if !self.bounds.intersects(query) {
                return Err(DatasetError::QueryOutOfBounds {
                    query: *query,
                    bounds: self.bounds,
                });
            }
            // One row at unit resolution; cells outside the coverage stay 0.
            let cols = (query.width().round() as usize).max(1);
            let mut mask = Array2::zeros((1, cols));
            for c in 0..cols {
                let x = query.minx + c as f64 + 0.5;
                if x > self.bounds.minx && x < self.bounds.maxx {
                    mask[(0, c)] = self.value;
                }
            }

            let mut sample = Sample::new(self.crs.clone(), *query);
            sample.mask = Some(mask);
            Ok(sample)
        }
    }

    #[test]
    fn test_intersection_bounds() {
        let ds = IntersectionDataset::new(
            Box::new(Patch::new(0.0, 2.0, 1)),
            Box::new(Patch::new(1.0, 3.0, 2)),
        )
        .unwrap();

        assert_eq!(ds.bounds(), BoundingBox::new(1.0, 2.0, 0.0, 1.0, 0, 100));
        assert_eq!(ds.len(), 1);
    }

    #[test]
    fn test_intersection_disjoint_fails() {
        let err = IntersectionDataset::new(
            Box::new(Patch::new(0.0, 1.0, 1)),
            Box::new(Patch::new(5.0, 6.0, 2)),
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::NoIntersection { .. }));

        // The message names both extents, not the (equal) CRS.
        let msg = err.to_string();
        assert!(msg.contains("minx=0"));
        assert!(msg.contains("minx=5"));
    }

    #[test]
    fn test_intersection_query_outside_shared_extent() {
        let ds = IntersectionDataset::new(
            Box::new(Patch::new(0.0, 2.0, 1)),
            Box::new(Patch::new(1.0, 3.0, 2)),
        )
        .unwrap();

        // Covered by the left member alone, not by the overlap.
        let q = BoundingBox::new(0.1, 0.9, 0.1, 0.9, 0, 100);
        let err = ds.get(&q).unwrap_err();
        assert!(err.to_string().contains("not found in index with bounds:"));
    }

    #[test]
    fn test_union_covers_both() {
        let ds = UnionDataset::new(
            Box::new(Patch::new(0.0, 1.0, 1)),
            Box::new(Patch::new(5.0, 6.0, 2)),
        )
        .unwrap();

        assert_eq!(ds.bounds(), BoundingBox::new(0.0, 6.0, 0.0, 1.0, 0, 100));
        assert_eq!(ds.len(), 2);

        let left = ds
            .get(&BoundingBox::new(0.1, 0.9, 0.1, 0.9, 0, 100))
            .unwrap();
        assert_eq!(left.mask.unwrap()[(0, 0)], 1);

        let right = ds
            .get(&BoundingBox::new(5.1, 5.9, 0.1, 0.9, 0, 100))
            .unwrap();
        assert_eq!(right.mask.unwrap()[(0, 0)], 2);
    }

    #[test]
    fn test_union_merges_across_members() {
        let ds = UnionDataset::new(
            Box::new(Patch::new(0.0, 2.0, 1)),
            Box::new(Patch::new(2.0, 4.0, 2)),
        )
        .unwrap();

        // A query straddling the seam gets both members' coverage.
        let sample = ds
            .get(&BoundingBox::new(0.0, 4.0, 0.0, 1.0, 0, 100))
            .unwrap();
        let mask = sample.mask.unwrap();
        assert_eq!(mask.dim(), (1, 4));
        assert_eq!(mask[(0, 0)], 1);
        assert_eq!(mask[(0, 1)], 1);
        assert_eq!(mask[(0, 2)], 2);
        assert_eq!(mask[(0, 3)], 2);
    }

    #[test]
    fn test_union_of_nothing_fails() {
        let err = UnionDataset::from_parts(Vec::new()).unwrap_err();
        assert!(matches!(err, DatasetError::EmptyUnion));
    }

    #[test]
    fn test_combinators_are_debuggable() {
        let union = UnionDataset::new(
            Box::new(Patch::new(0.0, 1.0, 1)),
            Box::new(Patch::new(5.0, 6.0, 2)),
        )
        .unwrap();
        assert!(format!("{:?}", union).contains("UnionDataset"));

        let intersection = IntersectionDataset::new(
            Box::new(Patch::new(0.0, 2.0, 1)),
            Box::new(Patch::new(1.0, 3.0, 2)),
        )
        .unwrap();
        assert!(format!("{:?}", intersection).contains("IntersectionDataset"));
    }

    #[test]
    fn test_union_gap_is_out_of_bounds() {
        let ds = UnionDataset::new(
            Box::new(Patch::new(0.0, 1.0, 1)),
            Box::new(Patch::new(5.0, 6.0, 2)),
        )
        .unwrap();

        let q = BoundingBox::new(2.0, 3.0, 0.1, 0.9, 0, 100);
        assert!(ds.get(&q).is_err());
    }

    #[test]
    fn test_crs_mismatch() {
        let mut other = Patch::new(0.0, 1.0, 1);
        other.crs = Crs::from_epsg(3857);

        let err =
            UnionDataset::new(Box::new(Patch::new(0.0, 1.0, 1)), Box::new(other)).unwrap_err();
        assert!(matches!(err, DatasetError::CrsMismatch { .. }));
    }
}
