//! Cell value trait for generic raster grids

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
pub trait CellValue:
    Copy + Clone + Debug + PartialEq + PartialOrd + NumCast + Zero + Send + Sync + 'static
{
    /// Fill value used for cells no source tile covers
    const FILL: Self;

    /// Whether this value is the fill value
    fn is_fill(self) -> bool;

    /// Convert to f64, if representable
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Convert from f64, if representable
    fn from_f64(v: f64) -> Option<Self> {
        NumCast::from(v)
    }
}

macro_rules! impl_cell_int {
    ($t:ty) => {
        impl CellValue for $t {
            const FILL: Self = 0;

            fn is_fill(self) -> bool {
                self == Self::FILL
            }
        }
    };
}

macro_rules! impl_cell_float {
    ($t:ty) => {
        impl CellValue for $t {
            const FILL: Self = <$t>::NAN;

            fn is_fill(self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_cell_int!(u8);
impl_cell_int!(u16);
impl_cell_int!(u32);
impl_cell_int!(i16);
impl_cell_int!(i32);
impl_cell_float!(f32);
impl_cell_float!(f64);
