//! The [`Cell`] type: an integer triple on the doubled-resolution cell grid.

use crate::numeric::CoordInt;
use std::cmp::Ordering;
use std::fmt;

/// The order of a cell: 0 (vertex), 1 (edge), 2 (face), or 3 (volume element).
pub type Order = u8;

/// One of the three grid axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// The first axis.
    X0,
    /// The second axis.
    X1,
    /// The third axis.
    X2,
}

impl Axis {
    /// All three axes in index order.
    pub const ALL: [Axis; 3] = [Axis::X0, Axis::X1, Axis::X2];

    /// The axis's index into a `[T; 3]` coordinate array.
    pub fn index(self) -> usize {
        match self {
            Axis::X0 => 0,
            Axis::X1 => 1,
            Axis::X2 => 2,
        }
    }
}

/// A cell on the doubled-resolution cell grid.
///
/// `Cell` is an ordered triple of non-negative coordinates on the lattice
/// where every voxel of the original volume occupies the `2x2x2` block of
/// grid positions `[2x, 2x+1] x [2y, 2y+1] x [2z, 2z+1]`. A cell's
/// [`order`](Cell::order) is the number of odd coordinates subtracted from
/// 3, i.e. the number of axes on which the cell sits at a voxel-aligned
/// ("even") position.
///
/// Equality and ordering are lexicographic by `(c2, c1, c0)` — axis 2 is
/// the most significant, axis 0 the least. This tie-break is load-bearing:
/// [`CWComplex`](https://docs.rs/cwx-complex)'s incidence lists are sorted
/// by label, and labels are assigned in `Cell` discovery order during a
/// grid traversal that walks axis 0 fastest, so the two orders must agree
/// everywhere a deterministic output is promised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell<C: CoordInt = u32> {
    coords: [C; 3],
}

impl<C: CoordInt> Cell<C> {
    /// Build a cell from its three grid coordinates.
    pub fn new(c0: C, c1: C, c2: C) -> Self {
        Self {
            coords: [c0, c1, c2],
        }
    }

    /// The coordinate on the given axis.
    pub fn coord(&self, axis: Axis) -> C {
        self.coords[axis.index()]
    }

    /// The three coordinates as an array, axis 0 first.
    pub fn coords(&self) -> [C; 3] {
        self.coords
    }

    /// The cell's order: `3 - (odd axis count)`, in `0..=3`.
    pub fn order(&self) -> Order {
        let odd_axes = self
            .coords
            .iter()
            .filter(|c| !c.is_even())
            .count();
        3 - odd_axes as Order
    }

    /// Whether `self` and `other` differ by exactly `delta` on `axis` and
    /// agree on the other two axes.
    pub(crate) fn differs_only_on(&self, axis: Axis, other: &Self) -> bool {
        Axis::ALL
            .iter()
            .all(|&a| a == axis || self.coord(a) == other.coord(a))
    }

    /// Returns a copy of `self` with the coordinate on `axis` replaced by `value`.
    pub fn with_coord(&self, axis: Axis, value: C) -> Self {
        let mut coords = self.coords;
        coords[axis.index()] = value;
        Self { coords }
    }
}

impl<C: CoordInt> PartialOrd for Cell<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: CoordInt> Ord for Cell<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.coords[2]
            .cmp(&other.coords[2])
            .then_with(|| self.coords[1].cmp(&other.coords[1]))
            .then_with(|| self.coords[0].cmp(&other.coords[0]))
    }
}

impl<C: CoordInt> fmt::Display for Cell<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:?}, {:?}, {:?})@o{}",
            self.coords[0],
            self.coords[1],
            self.coords[2],
            self.order()
        )
    }
}
