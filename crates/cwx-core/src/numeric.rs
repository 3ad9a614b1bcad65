//! Integer traits parameterizing coordinate and label widths.
//!
//! The reference implementation this toolkit is modeled on hard-codes the
//! integer width used for cell coordinates and cell labels as a C++ template
//! parameter. Rust has no equivalent compile-time-only mechanism that stays
//! object-safe, so `CoordInt` and `LabelInt` play the same role as ordinary
//! generic bounds: callers pick `u32` for compact grids or `u64`/`usize` for
//! volumes that exceed `u32::MAX` cells per axis.

use std::fmt::Debug;
use std::hash::Hash;

/// An integer type usable as a cell-grid axis coordinate.
///
/// Coordinates are always non-negative in this crate; widening types such as
/// `u32`, `u64`, and `usize` are the intended instantiations.
pub trait CoordInt:
    Copy + Clone + Default + Eq + Ord + Hash + Debug + Send + Sync + 'static
{
    /// Construct a coordinate from a `usize`, saturating at the type's max.
    fn from_usize(v: usize) -> Self;

    /// Widen this coordinate to a `usize` for arithmetic.
    fn to_usize(self) -> usize;

    /// Whether this coordinate is even (on the un-doubled voxel lattice).
    fn is_even(self) -> bool {
        self.to_usize() % 2 == 0
    }

    /// `self + 1`, saturating (used for `below`/`above` neighbor offsets).
    fn succ(self) -> Self {
        Self::from_usize(self.to_usize() + 1)
    }

    /// `self - 1`, returning `None` if `self` is zero.
    fn pred(self) -> Option<Self> {
        self.to_usize().checked_sub(1).map(Self::from_usize)
    }
}

/// An integer type usable as a dense per-order cell label.
///
/// Label `0` is reserved as the sentinel "no cell" value throughout the
/// workspace (§3 of the design notes); [`LabelInt::ZERO`] must map to it.
pub trait LabelInt:
    Copy + Clone + Default + Eq + Ord + Hash + Debug + Send + Sync + 'static
{
    /// The reserved sentinel label.
    const ZERO: Self;

    /// Construct a label from a `usize`.
    fn from_usize(v: usize) -> Self;

    /// Widen this label to a `usize` for indexing.
    fn to_usize(self) -> usize;

    /// `self + 1`, used when allocating the next label in a sequence.
    fn succ(self) -> Self {
        Self::from_usize(self.to_usize() + 1)
    }

    /// Whether this label is the sentinel.
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! impl_coord_int {
    ($($t:ty),*) => {
        $(
            impl CoordInt for $t {
                fn from_usize(v: usize) -> Self {
                    <$t>::try_from(v).unwrap_or(<$t>::MAX)
                }
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

macro_rules! impl_label_int {
    ($($t:ty),*) => {
        $(
            impl LabelInt for $t {
                const ZERO: Self = 0;
                fn from_usize(v: usize) -> Self {
                    <$t>::try_from(v).unwrap_or(<$t>::MAX)
                }
                fn to_usize(self) -> usize {
                    self as usize
                }
            }
        )*
    };
}

impl_coord_int!(u32, u64, usize);
impl_label_int!(u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_roundtrip() {
        assert_eq!(CoordInt::to_usize(<u32 as CoordInt>::from_usize(7)), 7);
        assert_eq!(CoordInt::to_usize(<u64 as CoordInt>::from_usize(7)), 7);
    }

    #[test]
    fn coord_parity() {
        assert!(<u32 as CoordInt>::from_usize(4).is_even());
        assert!(!<u32 as CoordInt>::from_usize(5).is_even());
    }

    #[test]
    fn coord_pred_succ() {
        assert_eq!(CoordInt::succ(<u32 as CoordInt>::from_usize(3)), 4);
        assert_eq!(<u32 as CoordInt>::from_usize(3).pred(), Some(2));
        assert_eq!(<u32 as CoordInt>::from_usize(0).pred(), None);
    }

    #[test]
    fn label_zero_is_sentinel() {
        assert!(u32::ZERO.is_zero());
        assert!(!<u32 as LabelInt>::from_usize(1).is_zero());
    }

    #[test]
    fn label_succ() {
        assert_eq!(LabelInt::succ(<u32 as LabelInt>::from_usize(5)), 6);
    }
}
