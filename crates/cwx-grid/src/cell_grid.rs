//! [`CellGrid`]: geometry over the doubled-resolution cell lattice.

use cwx_core::{Axis, Cell, CoordInt, CwxError, LabelInt, Order, Shape};
use smallvec::SmallVec;
use std::marker::PhantomData;

/// Geometric queries over the cell lattice implied by a voxel [`Shape`].
///
/// `CellGrid` holds no per-cell state of its own; it is a pure function of
/// the shape, computing neighbor relationships and the per-order
/// `label <-> cell` bijection on demand. `C` is the coordinate width and `L`
/// the label width; they are independent so a caller can, for instance, use
/// `u32` coordinates with `u64` labels for an unusually dense grid.
#[derive(Clone, Copy, Debug)]
pub struct CellGrid<C: CoordInt = u32, L: LabelInt = u32> {
    shape: Shape<C>,
    _label: PhantomData<L>,
}

impl<C: CoordInt, L: LabelInt> CellGrid<C, L> {
    /// Build a grid over the given voxel shape.
    pub fn new(shape: Shape<C>) -> Self {
        Self {
            shape,
            _label: PhantomData,
        }
    }

    /// The voxel shape this grid is built over.
    pub fn shape(&self) -> Shape<C> {
        self.shape
    }

    fn dim(&self, axis: usize) -> usize {
        self.shape.axis(axis).to_usize()
    }

    /// The number of cells of the given `order`.
    ///
    /// Returns [`CwxError::InvalidOrder`] if `order` is not in `0..=3`.
    pub fn number_of_cells(&self, order: Order) -> Result<usize, CwxError> {
        let [n0, n1, n2] = [self.dim(0), self.dim(1), self.dim(2)];
        match order {
            3 => Ok(n0 * n1 * n2),
            0 => Ok((n0 - 1) * (n1 - 1) * (n2 - 1)),
            1 => Ok(self.order1_group_sizes().iter().sum()),
            2 => Ok(self.order2_group_sizes().iter().sum()),
            _ => Err(CwxError::InvalidOrder { order }),
        }
    }

    /// Cells whose order is `cell.order() + 1` and that differ from `cell`
    /// by one step on a single axis. Ordered by axis (0 before 1 before 2),
    /// then negative direction before positive.
    ///
    /// Always has exactly `6, 4, 2, 0` entries for orders `0, 1, 2, 3`; an
    /// `above` step never needs boundary clipping because the axis it moves
    /// on is always interior to the voxel range.
    pub fn above(&self, cell: Cell<C>) -> SmallVec<[Cell<C>; 6]> {
        let mut out = SmallVec::new();
        for axis in Axis::ALL {
            let coord = cell.coord(axis);
            if coord.is_even() {
                continue;
            }
            if let Some(minus) = coord.pred() {
                out.push(cell.with_coord(axis, minus));
            }
            out.push(cell.with_coord(axis, coord.succ()));
        }
        out
    }

    /// Cells whose order is `cell.order() - 1` and that differ from `cell`
    /// by one step on a single axis, clipped at the grid boundary.
    ///
    /// Has up to `0, 2, 4, 6` entries for orders `0, 1, 2, 3`.
    pub fn below(&self, cell: Cell<C>) -> SmallVec<[Cell<C>; 6]> {
        let mut out = SmallVec::new();
        for axis in Axis::ALL {
            let coord = cell.coord(axis);
            if !coord.is_even() {
                continue;
            }
            if let Some(minus) = coord.pred() {
                out.push(cell.with_coord(axis, minus));
            }
            let plus = coord.succ();
            if plus.to_usize() <= self.shape.cell_axis(axis.index()) - 1 {
                out.push(cell.with_coord(axis, plus));
            }
        }
        out
    }

    /// The dense label (`1..=number_of_cells(order)`) assigned to `cell`.
    ///
    /// Returns [`CwxError::InvalidOrder`] if `cell.order()` is not in
    /// `0..=3`.
    pub fn label(&self, cell: Cell<C>) -> Result<L, CwxError> {
        let order = cell.order();
        let rank = match order {
            3 => self.rank_order3(cell),
            0 => self.rank_order0(cell),
            1 => self.rank_grouped(cell, true),
            2 => self.rank_grouped(cell, false),
            _ => return Err(CwxError::InvalidOrder { order }),
        };
        Ok(L::from_usize(rank + 1))
    }

    /// The inverse of [`label`](Self::label): the cell assigned `label` at
    /// the given `order`.
    ///
    /// Returns [`CwxError::LabelOutOfRange`] if `label` is `0` or exceeds
    /// `number_of_cells(order)`, and [`CwxError::InvalidOrder`] if `order`
    /// is not in `0..=3`.
    pub fn cell(&self, order: Order, label: L) -> Result<Cell<C>, CwxError> {
        let count = self.number_of_cells(order)?;
        let label_usize = label.to_usize();
        if label_usize == 0 || label_usize > count {
            return Err(CwxError::LabelOutOfRange {
                order,
                label: label_usize as u64,
                count: count as u64,
            });
        }
        let rank = label_usize - 1;
        Ok(match order {
            3 => self.unrank_order3(rank),
            0 => self.unrank_order0(rank),
            1 => self.unrank_grouped(rank, true),
            2 => self.unrank_grouped(rank, false),
            _ => unreachable!("checked above"),
        })
    }

    /// The lexicographically first cell of the given `order`, or `None` if
    /// the grid has no cells of that order.
    pub fn first_cell(&self, order: Order) -> Result<Option<Cell<C>>, CwxError> {
        if self.number_of_cells(order)? == 0 {
            return Ok(None);
        }
        self.scan_from(order, None)
    }

    /// The cell immediately following `cell` in `Cell`'s ordering among
    /// cells of the same order, or `None` if `cell` is the last one.
    pub fn next(&self, cell: Cell<C>) -> Result<Option<Cell<C>>, CwxError> {
        self.scan_from(cell.order(), Some(cell))
    }

    fn scan_from(&self, order: Order, after: Option<Cell<C>>) -> Result<Option<Cell<C>>, CwxError> {
        if order > 3 {
            return Err(CwxError::InvalidOrder { order });
        }
        let extents = [
            self.shape.cell_axis(0),
            self.shape.cell_axis(1),
            self.shape.cell_axis(2),
        ];
        let mut raw = after.map(|c| c.coords()).unwrap_or([C::from_usize(0); 3]);
        let mut started = after.is_none();
        loop {
            if started {
                if !Self::advance(&mut raw, extents) {
                    return Ok(None);
                }
            }
            started = true;
            let candidate = Cell::new(raw[0], raw[1], raw[2]);
            if candidate.order() == order {
                return Ok(Some(candidate));
            }
        }
    }

    /// Increment a raw coordinate triple by one step in axis-0-fastest
    /// lexicographic order. Returns `false` once the triple has exhausted
    /// the grid.
    fn advance(raw: &mut [C; 3], extents: [usize; 3]) -> bool {
        for axis in 0..3 {
            let next = raw[axis].to_usize() + 1;
            if next < extents[axis] {
                raw[axis] = C::from_usize(next);
                return true;
            }
            raw[axis] = C::from_usize(0);
        }
        false
    }

    fn rank_order3(&self, cell: Cell<C>) -> usize {
        let [n0, n1, _] = [self.dim(0), self.dim(1), self.dim(2)];
        let i0 = cell.coord(Axis::X0).to_usize() / 2;
        let i1 = cell.coord(Axis::X1).to_usize() / 2;
        let i2 = cell.coord(Axis::X2).to_usize() / 2;
        i0 + n0 * i1 + n0 * n1 * i2
    }

    fn unrank_order3(&self, rank: usize) -> Cell<C> {
        let [n0, n1, _] = [self.dim(0), self.dim(1), self.dim(2)];
        let i0 = rank % n0;
        let i1 = (rank / n0) % n1;
        let i2 = rank / (n0 * n1);
        Cell::new(
            C::from_usize(2 * i0),
            C::from_usize(2 * i1),
            C::from_usize(2 * i2),
        )
    }

    fn rank_order0(&self, cell: Cell<C>) -> usize {
        let [t0, t1, _] = [self.dim(0) - 1, self.dim(1) - 1, self.dim(2) - 1];
        let i0 = (cell.coord(Axis::X0).to_usize() - 1) / 2;
        let i1 = (cell.coord(Axis::X1).to_usize() - 1) / 2;
        let i2 = (cell.coord(Axis::X2).to_usize() - 1) / 2;
        i0 + t0 * i1 + t0 * t1 * i2
    }

    fn unrank_order0(&self, rank: usize) -> Cell<C> {
        let [t0, t1, _] = [self.dim(0) - 1, self.dim(1) - 1, self.dim(2) - 1];
        let i0 = rank % t0;
        let i1 = (rank / t0) % t1;
        let i2 = rank / (t0 * t1);
        Cell::new(
            C::from_usize(2 * i0 + 1),
            C::from_usize(2 * i1 + 1),
            C::from_usize(2 * i2 + 1),
        )
    }

    /// Per-axis group sizes for order-1 cells: for distinguished (even) axis
    /// `d`, `n_d * prod_{e != d} (n_e - 1)`.
    fn order1_group_sizes(&self) -> [usize; 3] {
        self.grouped_sizes(true)
    }

    /// Per-axis group sizes for order-2 cells: for distinguished (odd) axis
    /// `d`, `(n_d - 1) * prod_{e != d} n_e`.
    fn order2_group_sizes(&self) -> [usize; 3] {
        self.grouped_sizes(false)
    }

    fn grouped_sizes(&self, distinguished_is_even: bool) -> [usize; 3] {
        let n = [self.dim(0), self.dim(1), self.dim(2)];
        std::array::from_fn(|d| {
            let distinguished = if distinguished_is_even { n[d] } else { n[d] - 1 };
            let others: usize = (0..3)
                .filter(|&e| e != d)
                .map(|e| if distinguished_is_even { n[e] - 1 } else { n[e] })
                .product();
            distinguished * others
        })
    }

    /// Axis indices of the two non-distinguished axes, lower index first.
    fn other_axes(d: usize) -> (usize, usize) {
        let others: Vec<usize> = (0..3).filter(|&e| e != d).collect();
        (others[0], others[1])
    }

    fn rank_grouped(&self, cell: Cell<C>, distinguished_is_even: bool) -> usize {
        let coords = cell.coords();
        let d = (0..3)
            .find(|&a| coords[a].is_even() == distinguished_is_even)
            .expect("exactly one axis has the distinguished parity");
        let sizes = self.grouped_sizes(distinguished_is_even);
        let offset: usize = sizes[..d].iter().sum();

        let n = [self.dim(0), self.dim(1), self.dim(2)];
        let (lo, hi) = Self::other_axes(d);
        let distinguished_index = if distinguished_is_even {
            coords[d].to_usize() / 2
        } else {
            (coords[d].to_usize() - 1) / 2
        };
        let axis_index = |a: usize| -> usize {
            if distinguished_is_even {
                (coords[a].to_usize() - 1) / 2
            } else {
                coords[a].to_usize() / 2
            }
        };
        let lo_index = axis_index(lo);
        let hi_index = axis_index(hi);
        let hi_size = if distinguished_is_even { n[hi] - 1 } else { n[hi] };
        let lo_size = if distinguished_is_even { n[lo] - 1 } else { n[lo] };
        let local = distinguished_index * (lo_size * hi_size) + hi_index * lo_size + lo_index;
        offset + local
    }

    fn unrank_grouped(&self, rank: usize, distinguished_is_even: bool) -> Cell<C> {
        let sizes = self.grouped_sizes(distinguished_is_even);
        let mut d = 0;
        let mut remaining = rank;
        for (axis, &size) in sizes.iter().enumerate() {
            if remaining < size {
                d = axis;
                break;
            }
            remaining -= size;
        }
        let n = [self.dim(0), self.dim(1), self.dim(2)];
        let (lo, hi) = Self::other_axes(d);
        let lo_size = if distinguished_is_even { n[lo] - 1 } else { n[lo] };
        let hi_size = if distinguished_is_even { n[hi] - 1 } else { n[hi] };
        let distinguished_index = remaining / (lo_size * hi_size);
        let local = remaining % (lo_size * hi_size);
        let hi_index = local / lo_size;
        let lo_index = local % lo_size;

        let mut coords = [C::from_usize(0); 3];
        coords[d] = if distinguished_is_even {
            C::from_usize(2 * distinguished_index)
        } else {
            C::from_usize(2 * distinguished_index + 1)
        };
        let set_other = |coords: &mut [C; 3], axis: usize, index: usize| {
            coords[axis] = if distinguished_is_even {
                C::from_usize(2 * index + 1)
            } else {
                C::from_usize(2 * index)
            };
        };
        set_other(&mut coords, lo, lo_index);
        set_other(&mut coords, hi, hi_index);
        Cell::new(coords[0], coords[1], coords[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn grid(n0: u32, n1: u32, n2: u32) -> CellGrid<u32, u32> {
        CellGrid::new(Shape::new(n0, n1, n2).unwrap())
    }

    #[test]
    fn number_of_cells_matches_known_identity() {
        let g = grid(3, 4, 5);
        assert_eq!(g.number_of_cells(3).unwrap(), 3 * 4 * 5);
        assert_eq!(g.number_of_cells(0).unwrap(), 2 * 3 * 4);
        let total: usize = (0..=3).map(|o| g.number_of_cells(o).unwrap()).sum();
        assert!(total > 0);
    }

    #[test]
    fn invalid_order_rejected() {
        let g = grid(3, 3, 3);
        assert!(matches!(
            g.number_of_cells(4),
            Err(CwxError::InvalidOrder { order: 4 })
        ));
    }

    #[test]
    fn order3_bijection_roundtrips() {
        let g = grid(3, 4, 2);
        for rank in 0..g.number_of_cells(3).unwrap() {
            let label = LabelInt::from_usize(rank + 1);
            let cell = g.cell(3, label).unwrap();
            assert_eq!(cell.order(), 3);
            assert_eq!(g.label(cell).unwrap(), label);
        }
    }

    #[test]
    fn order0_bijection_roundtrips() {
        let g = grid(3, 4, 2);
        for rank in 0..g.number_of_cells(0).unwrap() {
            let label = LabelInt::from_usize(rank + 1);
            let cell = g.cell(0, label).unwrap();
            assert_eq!(cell.order(), 0);
            assert_eq!(g.label(cell).unwrap(), label);
        }
    }

    #[test]
    fn order1_and_order2_bijections_roundtrip() {
        let g = grid(3, 4, 2);
        for order in [1u8, 2u8] {
            for rank in 0..g.number_of_cells(order).unwrap() {
                let label = LabelInt::from_usize(rank + 1);
                let cell = g.cell(order, label).unwrap();
                assert_eq!(cell.order(), order);
                assert_eq!(g.label(cell).unwrap(), label);
            }
        }
    }

    /// Hand-transcribed from `Cellgrid<T,C>::label`'s order-1/order-2 branches
    /// in the reference implementation: within a group of fixed
    /// distinguished axis, the lower-indexed of the two remaining axes is
    /// the fastest-varying digit.
    fn reference_grouped_label(shape: (u32, u32, u32), cell: Cell<u32>, order: u8) -> usize {
        let c = cell.coords();
        let s = [shape.0 as usize, shape.1 as usize, shape.2 as usize];
        // order 1: the distinguished axis is the even one, the other two are odd.
        // order 2: the distinguished axis is the odd one, the other two are even.
        let distinguished_is_even = order == 1;
        let mut d = 0;
        let mut others = [0usize; 2];
        let mut n_other = 0;
        for axis in 0..3 {
            if (c[axis] % 2 == 0) == distinguished_is_even {
                d = axis;
            } else {
                others[n_other] = axis;
                n_other += 1;
            }
        }
        let lo = others[0];
        let hi = others[1];
        // bucket size of a non-distinguished axis: full extent if it carries
        // the distinguished parity, reduced by one otherwise.
        let bucket = |axis: usize| if distinguished_is_even { s[axis] - 1 } else { s[axis] };
        let group_size = |axis: usize| {
            let reduced = if distinguished_is_even { s[axis] } else { s[axis] - 1 };
            reduced * bucket(others_of(axis)[0]) * bucket(others_of(axis)[1])
        };
        let mut offset = 0;
        for axis in 0..d {
            offset += group_size(axis);
        }
        let index = |axis: usize| {
            if c[axis] % 2 == 0 {
                c[axis] as usize / 2
            } else {
                (c[axis] as usize - 1) / 2
            }
        };
        let lo_size = bucket(lo);
        offset + index(d) * (bucket(lo) * bucket(hi)) + index(hi) * lo_size + index(lo)
    }

    fn others_of(axis: usize) -> [usize; 2] {
        match axis {
            0 => [1, 2],
            1 => [0, 2],
            _ => [0, 1],
        }
    }

    #[test]
    fn order1_and_order2_numbering_matches_reference_on_an_asymmetric_shape() {
        let g = grid(2, 4, 3);
        for order in [1u8, 2u8] {
            for rank in 0..g.number_of_cells(order).unwrap() {
                let cell = g.cell(order, LabelInt::from_usize(rank + 1)).unwrap();
                let expected = reference_grouped_label((2, 4, 3), cell, order);
                assert_eq!(
                    rank, expected,
                    "order {order} cell {cell:?} numbered {rank}, reference numbers it {expected}"
                );
            }
        }
    }

    #[test]
    fn above_below_are_geometrically_reciprocal() {
        let g = grid(3, 4, 2);
        for order in 0u8..=2 {
            for rank in 0..g.number_of_cells(order).unwrap() {
                let cell = g.cell(order, LabelInt::from_usize(rank + 1)).unwrap();
                for up in g.above(cell) {
                    assert_eq!(up.order(), order + 1);
                    assert!(g.below(up).contains(&cell));
                }
            }
        }
    }

    #[test]
    fn above_sizes_match_spec_bounds() {
        let g = grid(4, 4, 4);
        for (order, expected) in [(0u8, 6usize), (1, 4), (2, 2), (3, 0)] {
            let cell = g.cell(order, 1).unwrap();
            assert_eq!(g.above(cell).len(), expected);
        }
    }

    #[test]
    fn enumeration_visits_every_cell_exactly_once() {
        let g = grid(2, 3, 2);
        for order in 0u8..=3 {
            let mut seen = std::collections::HashSet::new();
            let mut cur = g.first_cell(order).unwrap();
            while let Some(cell) = cur {
                assert!(seen.insert(cell), "cell visited twice: {cell}");
                cur = g.next(cell).unwrap();
            }
            assert_eq!(seen.len(), g.number_of_cells(order).unwrap());
        }
    }

    proptest! {
        #[test]
        fn label_cell_roundtrip_property(
            n0 in 2u32..6, n1 in 2u32..6, n2 in 2u32..6,
            order_idx in 0usize..4,
        ) {
            let g = grid(n0, n1, n2);
            let order = order_idx as u8;
            let count = g.number_of_cells(order).unwrap();
            prop_assume!(count > 0);
            let rank = count - 1;
            let label = LabelInt::from_usize(rank + 1);
            let cell = g.cell(order, label).unwrap();
            prop_assert_eq!(cell.order(), order);
            prop_assert_eq!(g.label(cell).unwrap(), label);
        }
    }
}
