//! [`Builder`]: the six-pass boundary-detection and anchoring pipeline.

use crate::volume::VoxelVolume;
use cwx_anchor::Anchorage;
use cwx_complex::CWComplex;
use cwx_core::{Axis, Cell, CoordInt, CwxError, LabelInt, Order, Shape};
use cwx_grid::{CellGrid, MarkedGrid};
use std::collections::{HashSet, VecDeque};

/// Everything produced by [`Builder::build`]: the marked grid, the CW
/// complex's incidence structure, and its anchors, all keyed to the same
/// voxel [`Shape`].
#[derive(Clone, Debug)]
pub struct BuiltComplex<C: CoordInt = u32, L: LabelInt = u32> {
    /// The voxel shape the complex was built over.
    pub shape: Shape<C>,
    /// Which sub-cells were marked as boundary, and which voxels carry an
    /// anchor.
    pub marks: MarkedGrid<C>,
    /// The incidence structure: which cells of adjacent orders touch.
    pub complex: CWComplex<L>,
    /// The anchor cell for every discovered component.
    pub anchors: Anchorage<C, L>,
}

/// Builds a [`BuiltComplex`] from a labeled voxel volume.
///
/// `Builder` is stateless; [`Builder::build`] runs the whole pipeline in one
/// call. It is a unit struct only so the pipeline has a name to hang
/// documentation on, matching the rest of the workspace's one-call-does-it
/// entry points.
#[derive(Clone, Copy, Debug, Default)]
pub struct Builder;

impl Builder {
    /// Run the boundary-detection and anchoring pipeline over `volume`.
    ///
    /// Six passes, in order:
    ///
    /// 1. Mark every 2-cell whose two adjacent voxels carry different
    ///    labels.
    /// 2. Mark every 1-cell with more than two of its four above 2-cells
    ///    marked.
    /// 3. Mark and anchor every 0-cell with at least three, or exactly one,
    ///    of its six above 1-cells marked.
    /// 4. Label connected components at orders 3, 2, and 1 (in that
    ///    descending order) by flooding across unmarked lower-order
    ///    neighbors, anchoring the first cell discovered in each component
    ///    and connecting it upward to every already-labeled component one
    ///    order above that it touches.
    /// 5. If `redundant_anchors` is set, walk every axis-aligned slice at
    ///    orders 2 and 3 and add an extra anchor to any slice-local
    ///    component that does not already contain one, so a caller confined
    ///    to a single slice never has to search outside it for an anchor.
    /// 6. Connect every order-0 anchor upward to the component labels of its
    ///    marked above 1-cells.
    ///
    /// Fails only if `volume`'s extents include a zero, or if an internal
    /// consistency assumption about the cell-grid geometry is violated.
    pub fn build<C, L, T>(volume: &VoxelVolume<T>, redundant_anchors: bool) -> Result<BuiltComplex<C, L>, CwxError>
    where
        C: CoordInt,
        L: LabelInt,
        T: Copy + Eq,
    {
        let (n0, n1, n2) = volume.dims();
        for (axis, &n) in [n0, n1, n2].iter().enumerate() {
            if n == 0 {
                return Err(CwxError::EmptyVolume { axis });
            }
        }
        let shape = Shape::new(C::from_usize(n0), C::from_usize(n1), C::from_usize(n2))
            .expect("zero extents rejected above");
        let grid: CellGrid<C, L> = CellGrid::new(shape);
        let mut marks: MarkedGrid<C> = MarkedGrid::new(shape);
        let mut complex: CWComplex<L> = CWComplex::new();
        let mut anchors: Anchorage<C, L> = Anchorage::new();
        let mut label_of: [Vec<L>; 4] = [
            vec![L::ZERO; grid.number_of_cells(0)?],
            vec![L::ZERO; grid.number_of_cells(1)?],
            vec![L::ZERO; grid.number_of_cells(2)?],
            vec![L::ZERO; grid.number_of_cells(3)?],
        ];

        mark_faces(&grid, volume, &mut marks)?;
        mark_edges(&grid, &mut marks)?;
        mark_and_anchor_vertices(&grid, &mut marks, &mut complex, &mut anchors, &mut label_of)?;
        debug_assert!(anchors.check_invariants().is_ok(), "anchor bookkeeping broke after vertex marking");

        label_components(&grid, &mut marks, &mut complex, &mut anchors, &mut label_of)?;
        debug_assert!(complex.check_invariants().is_ok(), "incidence structure broke after component labeling");
        debug_assert!(anchors.check_invariants().is_ok(), "anchor bookkeeping broke after component labeling");

        if redundant_anchors {
            add_redundant_slice_anchors(&grid, &mut marks, &mut anchors, &label_of)?;
            debug_assert!(anchors.check_invariants().is_ok(), "anchor bookkeeping broke after redundant-slice anchoring");
        }
        connect_vertices_upward(&grid, &label_of, &mut complex, &marks)?;
        debug_assert!(complex.check_invariants().is_ok(), "incidence structure broke after upward vertex connection");

        Ok(BuiltComplex {
            shape,
            marks,
            complex,
            anchors,
        })
    }
}

fn voxels_of_order3<C: CoordInt>(cell: Cell<C>) -> (usize, usize, usize) {
    let c = cell.coords();
    (c[0].to_usize() / 2, c[1].to_usize() / 2, c[2].to_usize() / 2)
}

/// Pass 1: a 2-cell is marked when the two voxels it separates differ.
fn mark_faces<C, L, T>(grid: &CellGrid<C, L>, volume: &VoxelVolume<T>, marks: &mut MarkedGrid<C>) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
    T: Copy + Eq,
{
    for rank in 0..grid.number_of_cells(2)? {
        let cell = grid.cell(2, L::from_usize(rank + 1))?;
        let above = grid.above(cell);
        debug_assert_eq!(above.len(), 2, "every 2-cell separates exactly two voxels");
        let (x0, y0, z0) = voxels_of_order3(above[0]);
        let (x1, y1, z1) = voxels_of_order3(above[1]);
        if volume.get(x0, y0, z0) != volume.get(x1, y1, z1) {
            marks.mark(cell);
        }
    }
    Ok(())
}

/// Pass 2: a 1-cell is marked when more than two of its four above 2-cells
/// are marked.
fn mark_edges<C, L>(grid: &CellGrid<C, L>, marks: &mut MarkedGrid<C>) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    for rank in 0..grid.number_of_cells(1)? {
        let cell = grid.cell(1, L::from_usize(rank + 1))?;
        let marked = grid.above(cell).iter().filter(|&&f| marks.is_marked(f)).count();
        if marked > 2 {
            marks.mark(cell);
        }
    }
    Ok(())
}

/// Pass 3: a 0-cell is marked and anchored when at least three, or exactly
/// one, of its six above 1-cells are marked.
///
/// The `== 1` branch is not an obvious topological closure rule and is
/// preserved bit-exactly as originally specified rather than "fixed" to
/// something more symmetric; it has not been checked against topological
/// axioms and changing it would change which vertices get anchored.
fn mark_and_anchor_vertices<C, L>(
    grid: &CellGrid<C, L>,
    marks: &mut MarkedGrid<C>,
    complex: &mut CWComplex<L>,
    anchors: &mut Anchorage<C, L>,
    label_of: &mut [Vec<L>; 4],
) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    for rank in 0..grid.number_of_cells(0)? {
        let cell = grid.cell(0, L::from_usize(rank + 1))?;
        let marked = grid.above(cell).iter().filter(|&&e| marks.is_marked(e)).count();
        if marked >= 3 || marked == 1 {
            marks.mark(cell);
            let complex_label = complex.push_back(0)?;
            let anchor_label = anchors.push_back(0, cell)?;
            debug_assert_eq!(
                complex_label, anchor_label,
                "CWComplex and Anchorage label sequences diverged"
            );
            marks.set_anchor_bit(cell);
            label_of[0][rank] = complex_label;
        }
    }
    Ok(())
}

/// Pass 4: connected components at orders 3, 2, 1, descending, flooding
/// across shared unmarked lower-order neighbors.
fn label_components<C, L>(
    grid: &CellGrid<C, L>,
    marks: &mut MarkedGrid<C>,
    complex: &mut CWComplex<L>,
    anchors: &mut Anchorage<C, L>,
    label_of: &mut [Vec<L>; 4],
) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    for order in [3u8, 2, 1] {
        let count = grid.number_of_cells(order)?;
        for rank in 0..count {
            if label_of[order as usize][rank] != L::ZERO {
                continue;
            }
            let seed = grid.cell(order, L::from_usize(rank + 1))?;
            if order != 3 && !marks.is_marked(seed) {
                continue;
            }

            let complex_label = complex.push_back(order)?;
            let anchor_label = anchors.push_back(order, seed)?;
            debug_assert_eq!(
                complex_label, anchor_label,
                "CWComplex and Anchorage label sequences diverged"
            );
            marks.set_anchor_bit(seed);
            label_of[order as usize][rank] = complex_label;

            let mut touched_above: HashSet<L> = HashSet::new();
            let mut queue = VecDeque::new();
            queue.push_back(seed);
            while let Some(cell) = queue.pop_front() {
                if order < 3 {
                    for up in grid.above(cell) {
                        let up_rank = grid.label(up)?.to_usize() - 1;
                        let up_label = label_of[(order + 1) as usize][up_rank];
                        if up_label != L::ZERO {
                            touched_above.insert(up_label);
                        }
                    }
                }
                for down in grid.below(cell) {
                    if marks.is_marked(down) {
                        continue;
                    }
                    for neighbor in grid.above(down) {
                        if order != 3 && !marks.is_marked(neighbor) {
                            continue;
                        }
                        let n_rank = grid.label(neighbor)?.to_usize() - 1;
                        if label_of[order as usize][n_rank] != L::ZERO {
                            continue;
                        }
                        label_of[order as usize][n_rank] = complex_label;
                        queue.push_back(neighbor);
                    }
                }
            }

            for high_label in touched_above {
                complex.connect(order, complex_label, high_label)?;
            }
        }
    }
    Ok(())
}

/// Pass 5: ensure every axis-aligned slice component at orders 2 and 3 has
/// at least one anchor, even when the component's primary anchor lies in a
/// different slice.
fn add_redundant_slice_anchors<C, L>(
    grid: &CellGrid<C, L>,
    marks: &mut MarkedGrid<C>,
    anchors: &mut Anchorage<C, L>,
    label_of: &[Vec<L>; 4],
) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    for axis_idx in 0..3usize {
        let axis = Axis::ALL[axis_idx];
        let extent = grid.shape().cell_axis(axis_idx);
        for v_raw in 0..extent {
            let v = C::from_usize(v_raw);
            for order in [2u8, 3] {
                slice_component_anchors(grid, marks, anchors, label_of, axis, v, order)?;
            }
        }
    }
    Ok(())
}

fn slice_component_anchors<C, L>(
    grid: &CellGrid<C, L>,
    marks: &mut MarkedGrid<C>,
    anchors: &mut Anchorage<C, L>,
    label_of: &[Vec<L>; 4],
    axis: Axis,
    v: C,
    order: Order,
) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    let count = grid.number_of_cells(order)?;
    let mut visited: HashSet<Cell<C>> = HashSet::new();
    for rank in 0..count {
        let seed = grid.cell(order, L::from_usize(rank + 1))?;
        if seed.coord(axis) != v {
            continue;
        }
        if order != 3 && !marks.is_marked(seed) {
            continue;
        }
        if !visited.insert(seed) {
            continue;
        }

        let mut members = vec![seed];
        let mut queue = VecDeque::new();
        queue.push_back(seed);
        while let Some(cell) = queue.pop_front() {
            for down in grid.below(cell) {
                if down.coord(axis) != v || marks.is_marked(down) {
                    continue;
                }
                for neighbor in grid.above(down) {
                    if neighbor.coord(axis) != v {
                        continue;
                    }
                    if order != 3 && !marks.is_marked(neighbor) {
                        continue;
                    }
                    if !visited.insert(neighbor) {
                        continue;
                    }
                    members.push(neighbor);
                    queue.push_back(neighbor);
                }
            }
        }

        let seed_rank = grid.label(seed)?.to_usize() - 1;
        let component_label = label_of[order as usize][seed_rank];
        if component_label == L::ZERO {
            continue;
        }
        let has_anchor = members.iter().any(|&m| anchors.lookup_label(order, m).is_some());
        if !has_anchor {
            let promoted = members[0];
            anchors.assign_additional(order, component_label, promoted)?;
            marks.set_anchor_bit(promoted);
        }
    }
    Ok(())
}

/// Pass 6: connect every order-0 anchor upward to the component labels of
/// its marked above 1-cells.
fn connect_vertices_upward<C, L>(
    grid: &CellGrid<C, L>,
    label_of: &[Vec<L>; 4],
    complex: &mut CWComplex<L>,
    marks: &MarkedGrid<C>,
) -> Result<(), CwxError>
where
    C: CoordInt,
    L: LabelInt,
{
    for rank in 0..grid.number_of_cells(0)? {
        let component_label = label_of[0][rank];
        if component_label == L::ZERO {
            continue;
        }
        let cell = grid.cell(0, L::from_usize(rank + 1))?;
        let mut targets: HashSet<L> = HashSet::new();
        for edge in grid.above(cell) {
            if !marks.is_marked(edge) {
                continue;
            }
            let edge_rank = grid.label(edge)?.to_usize() - 1;
            let edge_label = label_of[1][edge_rank];
            if edge_label != L::ZERO {
                targets.insert(edge_label);
            }
        }
        for target in targets {
            complex.connect(0, component_label, target)?;
        }
    }
    Ok(())
}
