//! [`ComplexView`]: read-only BFS queries over a built complex.

use crate::observer::TraversalObserver;
use cwx_anchor::Anchorage;
use cwx_complex::CWComplex;
use cwx_core::{Axis, Cell, CoordInt, CwxError, LabelInt, Order, Shape};
use cwx_grid::{CellGrid, MarkedGrid};
use std::collections::{HashSet, VecDeque};

/// A borrowed view over the three structures a `build` produces, answering
/// membership queries and driving traversals without mutating any of them.
///
/// `ComplexView` holds no state of its own beyond its borrows: every BFS
/// here allocates its own `visited` set local to the call, so two views
/// over the same complex can be queried concurrently from different
/// threads.
#[derive(Clone, Copy, Debug)]
pub struct ComplexView<'a, C: CoordInt = u32, L: LabelInt = u32> {
    shape: Shape<C>,
    marks: &'a MarkedGrid<C>,
    complex: &'a CWComplex<L>,
    anchors: &'a Anchorage<C, L>,
}

impl<'a, C: CoordInt, L: LabelInt> ComplexView<'a, C, L> {
    /// Borrow a view over an already-built complex.
    pub fn new(shape: Shape<C>, marks: &'a MarkedGrid<C>, complex: &'a CWComplex<L>, anchors: &'a Anchorage<C, L>) -> Self {
        Self {
            shape,
            marks,
            complex,
            anchors,
        }
    }

    /// The incidence store this view queries `above`/`below`/`size_*`
    /// through.
    pub fn complex(&self) -> &'a CWComplex<L> {
        self.complex
    }

    /// Whether `cell` is on the k-skeleton (marked); always `true` for
    /// order-3 cells.
    pub fn is_marked(&self, cell: Cell<C>) -> bool {
        self.marks.is_marked(cell)
    }

    fn grid(&self) -> CellGrid<C, L> {
        CellGrid::new(self.shape)
    }

    /// The label of the 3-cell (voxel) at `(x, y, z)`: equivalent to
    /// `at_cell` on the cell-grid coordinate `(2x, 2y, 2z)`.
    pub fn at_voxel(&self, x: C, y: C, z: C) -> Result<L, CwxError> {
        let double = |c: C| C::from_usize(c.to_usize() * 2);
        self.at_cell(Cell::new(double(x), double(y), double(z)))
    }

    /// The component label of `cell`.
    ///
    /// - Order 0: `cell` must already be an anchor; its label is looked up
    ///   directly.
    /// - Order 3, or a marked order 1/2 cell: BFS to the nearest anchor
    ///   reachable by crossing only unmarked `order - 1` neighbors. Fails
    ///   with [`CwxError::AnchorSearchExhausted`] if the component has no
    ///   anchor, which indicates an Anchorage/MarkedGrid inconsistency
    ///   rather than a normal "absent" result.
    /// - An unmarked order 1/2 cell: returns the sentinel label `0`,
    ///   meaning "not on the k-skeleton".
    pub fn at_cell(&self, cell: Cell<C>) -> Result<L, CwxError> {
        match cell.order() {
            0 => self
                .anchors
                .lookup_label(0, cell)
                .ok_or(CwxError::AnchorSearchExhausted { order: 0 }),
            3 => self.bfs_nearest_anchor(3, cell),
            o @ 1..=2 if self.marks.is_marked(cell) => self.bfs_nearest_anchor(o, cell),
            1..=2 => Ok(L::ZERO),
            order => Err(CwxError::InvalidOrder { order }),
        }
    }

    fn bfs_nearest_anchor(&self, order: Order, seed: Cell<C>) -> Result<L, CwxError> {
        let grid = self.grid();
        let mut visited: HashSet<Cell<C>> = HashSet::new();
        visited.insert(seed);
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        while let Some(cell) = queue.pop_front() {
            if let Some(label) = self.anchors.lookup_label(order, cell) {
                return Ok(label);
            }
            for down in grid.below(cell) {
                if self.marks.is_marked(down) {
                    continue;
                }
                for up in grid.above(down) {
                    if order != 3 && !self.marks.is_marked(up) {
                        continue;
                    }
                    if visited.insert(up) {
                        queue.push_back(up);
                    }
                }
            }
        }
        Err(CwxError::AnchorSearchExhausted { order })
    }

    /// Visit every cell of the component `(order, label)`, starting from
    /// its primary anchor, in BFS discovery order.
    pub fn process_component<O: TraversalObserver<C>>(&self, order: Order, label: L, observer: &mut O) -> Result<(), CwxError> {
        let seed = self.anchors.lookup_cell(order, label).ok_or(CwxError::LabelOutOfRange {
            order,
            label: label.to_usize() as u64,
            count: self.complex.count(order) as u64,
        })?;
        let mut visited = HashSet::new();
        self.flood(order, seed, |_| true, observer, &mut visited);
        Ok(())
    }

    /// Visit every component of `order`, in label order.
    pub fn process_all<O: TraversalObserver<C>>(&self, order: Order, observer: &mut O) -> Result<(), CwxError> {
        for label in 1..=self.complex.count(order) {
            self.process_component(order, L::from_usize(label), observer)?;
        }
        Ok(())
    }

    /// Visit every component restricted to the axis-aligned slice
    /// `cell.coord(axis) == v`, discovering seeds by scanning the slice
    /// rather than relying on a pre-existing anchor inside it.
    ///
    /// A single visited set is shared across the whole call so a
    /// slice-component touched by more than one scanned seed is only
    /// flooded once.
    pub fn process_slice<O: TraversalObserver<C>>(&self, order: Order, axis: Axis, v: C, observer: &mut O) -> Result<(), CwxError> {
        let grid = self.grid();
        let count = grid.number_of_cells(order)?;
        let mut visited: HashSet<Cell<C>> = HashSet::new();
        for rank in 0..count {
            let seed = grid.cell(order, L::from_usize(rank + 1))?;
            if seed.coord(axis) != v || visited.contains(&seed) {
                continue;
            }
            if order != 3 && !self.marks.is_marked(seed) {
                continue;
            }
            self.flood(order, seed, |cell| cell.coord(axis) == v, observer, &mut visited);
        }
        Ok(())
    }

    /// The shared BFS state machine: from `seed`, cross unmarked
    /// `order - 1` neighbors to reach adjacent `order`-cells (always
    /// crossable at `order == 3`, otherwise only marked ones), restricted
    /// to cells passing `guard`. Calls `observer` per visited cell,
    /// stopping the flood entirely the first time it returns `false`.
    fn flood<O, G>(&self, order: Order, seed: Cell<C>, guard: G, observer: &mut O, visited: &mut HashSet<Cell<C>>)
    where
        O: TraversalObserver<C>,
        G: Fn(Cell<C>) -> bool,
    {
        if !observer.on_component_start(seed) {
            return;
        }
        let grid = self.grid();
        visited.insert(seed);
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        while let Some(cell) = queue.pop_front() {
            if !observer.on_cell(cell) {
                break;
            }
            for down in grid.below(cell) {
                if !guard(down) || self.marks.is_marked(down) {
                    continue;
                }
                for up in grid.above(down) {
                    if !guard(up) {
                        continue;
                    }
                    if order != 3 && !self.marks.is_marked(up) {
                        continue;
                    }
                    if visited.insert(up) {
                        queue.push_back(up);
                    }
                }
            }
        }
        observer.on_component_end();
    }
}
