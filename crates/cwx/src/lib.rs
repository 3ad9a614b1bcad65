//! cwx: CW-complex topology extraction from labeled 3-D voxel volumes.
//!
//! This is the top-level facade crate: it re-exports the public API of
//! every cwx sub-crate and ties `cwx-build`'s output to `cwx-query`'s read
//! API behind a single [`CwComplex`] type, so most callers only need this
//! one dependency.
//!
//! # Quick start
//!
//! ```rust
//! use cwx::prelude::*;
//!
//! // A 2x2x2 block split in half along axis 0: one marked interface face
//! // separates the four x=0 voxels (label 1) from the four x=1 voxels
//! // (label 2).
//! let volume = VoxelVolume::<u32>::new(2, 2, 2, vec![1, 2, 1, 2, 1, 2, 1, 2]);
//! let complex: CwComplex32 = cwx::build(&volume, false).unwrap();
//!
//! assert_eq!(complex.number_of_cells(3).unwrap(), 2);
//! let left = complex.at_voxel(0, 0, 0).unwrap();
//! let right = complex.at_voxel(1, 0, 0).unwrap();
//! assert_ne!(left, right);
//!
//! let mut visited = 0u32;
//! complex
//!     .process_component(3, left, &mut |_cell: Cell32| {
//!         visited += 1;
//!         true
//!     })
//!     .unwrap();
//! assert_eq!(visited, 4);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! [`prelude`]:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `cwx-core` | `Cell`, `Axis`, `Shape`, `CwxError`, numeric traits |
//! | [`grid`] | `cwx-grid` | `CellGrid`, `MarkedGrid` |
//! | [`complex`] | `cwx-complex` | `CWComplex` |
//! | [`anchor`] | `cwx-anchor` | `Anchorage` |
//! | [`pipeline`] | `cwx-build` | `Builder`, `BuiltComplex`, `VoxelVolume` |
//! | [`query`] | `cwx-query` | `ComplexView`, `TraversalObserver` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, numeric traits, and the shared error type (`cwx-core`).
pub use cwx_core as types;

/// Cell-grid geometry and bit-packed voxel marking (`cwx-grid`).
pub use cwx_grid as grid;

/// The CW complex's incidence store (`cwx-complex`).
pub use cwx_complex as complex;

/// Anchor bookkeeping (`cwx-anchor`).
pub use cwx_anchor as anchor;

/// The boundary-detection and anchoring pipeline (`cwx-build`).
pub use cwx_build as pipeline;

/// Read-only queries and traversal over a built complex (`cwx-query`).
pub use cwx_query as query;

use cwx_build::{BuiltComplex, Builder, VoxelVolume};
use cwx_core::{Axis, Cell, CoordInt, CwxError, LabelInt, Order, Shape};
use cwx_grid::CellGrid;
use cwx_query::{ComplexView, TraversalObserver};
use smallvec::SmallVec;

/// A `u32`-coordinate cell, the common case for grids under four billion
/// cells per axis.
pub type Cell32 = Cell<u32>;

/// A [`CwComplex`] with both coordinates and labels widened no further than
/// `u32`.
pub type CwComplex32 = CwComplex<u32, u32>;

/// A fully built, queryable CW complex.
///
/// `CwComplex` owns the [`BuiltComplex`] that [`Builder::build`] produces —
/// the marked grid, the incidence structure, and the anchors — and answers
/// every read-only query by borrowing them into a [`ComplexView`] on
/// demand. Constructing one is the only way this crate performs the
/// six-pass extraction; every other method here is read-only.
#[derive(Clone, Debug)]
pub struct CwComplex<C: CoordInt = u32, L: LabelInt = u32> {
    built: BuiltComplex<C, L>,
}

impl<C: CoordInt, L: LabelInt> CwComplex<C, L> {
    /// Run the extraction pipeline over `volume`.
    ///
    /// Equivalent to the free function [`build`]; prefer that function at
    /// a call site that does not already need the type name.
    pub fn build<T: Copy + Eq>(volume: &VoxelVolume<T>, redundant_anchors: bool) -> Result<Self, CwxError> {
        Ok(Self {
            built: Builder::build(volume, redundant_anchors)?,
        })
    }

    /// The voxel shape the complex was built over.
    pub fn shape(&self) -> Shape<C> {
        self.built.shape
    }

    /// Direct access to everything the build pipeline produced: the marked
    /// grid, the incidence structure, and the anchors.
    pub fn built(&self) -> &BuiltComplex<C, L> {
        &self.built
    }

    fn grid(&self) -> CellGrid<C, L> {
        CellGrid::new(self.built.shape)
    }

    fn view(&self) -> ComplexView<'_, C, L> {
        ComplexView::new(self.built.shape, &self.built.marks, &self.built.complex, &self.built.anchors)
    }

    /// The number of topological cells (connected components) allocated at
    /// the given `order` — not the number of raw cell-grid lattice
    /// positions, which is typically far larger.
    pub fn number_of_cells(&self, order: Order) -> Result<usize, CwxError> {
        if order > 3 {
            return Err(CwxError::InvalidOrder { order });
        }
        Ok(self.built.complex.count(order))
    }

    /// The sorted labels of cells one order above `label` at `order`.
    pub fn above(&self, order: Order, label: L) -> &[L] {
        self.built.complex.above(order, label)
    }

    /// The sorted labels of cells one order below `label` at `order`.
    pub fn below(&self, order: Order, label: L) -> &[L] {
        self.built.complex.below(order, label)
    }

    /// The number of cells above `label` at `order`.
    pub fn size_above(&self, order: Order, label: L) -> usize {
        self.built.complex.size_above(order, label)
    }

    /// The number of cells below `label` at `order`.
    pub fn size_below(&self, order: Order, label: L) -> usize {
        self.built.complex.size_below(order, label)
    }

    /// The cells one order above `cell` on the cell grid, geometrically.
    pub fn above_cells(&self, cell: Cell<C>) -> SmallVec<[Cell<C>; 6]> {
        self.grid().above(cell)
    }

    /// The cells one order below `cell` on the cell grid, geometrically.
    pub fn below_cells(&self, cell: Cell<C>) -> SmallVec<[Cell<C>; 6]> {
        self.grid().below(cell)
    }

    /// Whether `cell` is on the k-skeleton.
    pub fn is_marked(&self, cell: Cell<C>) -> bool {
        self.built.marks.is_marked(cell)
    }

    /// The component label of the voxel at `(x, y, z)`.
    pub fn at_voxel(&self, x: C, y: C, z: C) -> Result<L, CwxError> {
        self.view().at_voxel(x, y, z)
    }

    /// The component label of `cell`.
    pub fn at_cell(&self, cell: Cell<C>) -> Result<L, CwxError> {
        self.view().at_cell(cell)
    }

    /// Visit every cell of the component `(order, label)`.
    pub fn process_component<O: TraversalObserver<C>>(&self, order: Order, label: L, observer: &mut O) -> Result<(), CwxError> {
        self.view().process_component(order, label, observer)
    }

    /// Visit every component of `order`, in label order.
    pub fn process_all<O: TraversalObserver<C>>(&self, order: Order, observer: &mut O) -> Result<(), CwxError> {
        self.view().process_all(order, observer)
    }

    /// Visit every component restricted to the axis-aligned slice
    /// `cell.coord(axis) == v`.
    pub fn process_slice<O: TraversalObserver<C>>(&self, order: Order, axis: Axis, v: C, observer: &mut O) -> Result<(), CwxError> {
        self.view().process_slice(order, axis, v, observer)
    }

    /// Fill `out`, a flat buffer laid out axis-0-fastest with extents
    /// `dims`, with the component label of every cell on the
    /// doubled-resolution cell grid that belongs to a discovered component.
    ///
    /// Driven by flooding outward from each component's anchor with
    /// [`process_component`](Self::process_component), not by calling
    /// [`at_cell`](Self::at_cell) per raw lattice position: most order-0
    /// lattice positions are never anchored (only vertices Pass 3 marks
    /// are), so `at_cell` would fail its anchored-cell precondition on
    /// them. Positions that belong to no component — including every
    /// non-anchored order-0 position — are left untouched, so callers
    /// should zero-initialize `out` first.
    ///
    /// `dims` must equal `(2*n0-1, 2*n1-1, 2*n2-1)` for this complex's
    /// voxel shape `(n0, n1, n2)`; each axis is checked independently
    /// against the matching extent, not all three against `dims[0]`.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != dims[0] * dims[1] * dims[2]`.
    pub fn labeled_cell_grid(&self, dims: [usize; 3], out: &mut [L]) -> Result<(), CwxError> {
        for axis in 0..3 {
            let expected = self.built.shape.cell_axis(axis);
            if dims[axis] != expected {
                return Err(CwxError::ShapeMismatch {
                    axis,
                    expected,
                    actual: dims[axis],
                });
            }
        }
        assert_eq!(out.len(), dims[0] * dims[1] * dims[2], "output buffer does not match dims");

        for order in 0u8..=3 {
            for rank in 1..=self.built.complex.count(order) {
                let label = L::from_usize(rank);
                self.process_component(order, label, &mut |cell: Cell<C>| {
                    let [c0, c1, c2] = cell.coords();
                    let idx = c0.to_usize() + dims[0] * c1.to_usize() + dims[0] * dims[1] * c2.to_usize();
                    out[idx] = label;
                    true
                })?;
            }
        }
        Ok(())
    }

    /// Fill `out`, a flat buffer laid out axis-0-fastest with extents
    /// `dims`, with `at_voxel` of every voxel.
    ///
    /// `dims` must equal this complex's voxel shape; each axis is checked
    /// independently against the matching extent.
    ///
    /// # Panics
    ///
    /// Panics if `out.len() != dims[0] * dims[1] * dims[2]`.
    pub fn labeled_voxel_grid(&self, dims: [usize; 3], out: &mut [L]) -> Result<(), CwxError> {
        let extents = self.built.shape.extents();
        for axis in 0..3 {
            let expected = extents[axis].to_usize();
            if dims[axis] != expected {
                return Err(CwxError::ShapeMismatch {
                    axis,
                    expected,
                    actual: dims[axis],
                });
            }
        }
        assert_eq!(out.len(), dims[0] * dims[1] * dims[2], "output buffer does not match dims");

        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let idx = x + dims[0] * y + dims[0] * dims[1] * z;
                    out[idx] = self.at_voxel(C::from_usize(x), C::from_usize(y), C::from_usize(z))?;
                }
            }
        }
        Ok(())
    }
}

/// Run the extraction pipeline over `volume`, producing a queryable
/// [`CwComplex`].
///
/// `redundant_anchors` controls whether every axis-aligned slice at orders
/// 2 and 3 gets its own anchor (pass 5 of the pipeline); set it when
/// callers will run `process_slice` queries and should never need to
/// search outside the slice for an anchor.
pub fn build<C, L, T>(volume: &VoxelVolume<T>, redundant_anchors: bool) -> Result<CwComplex<C, L>, CwxError>
where
    C: CoordInt,
    L: LabelInt,
    T: Copy + Eq,
{
    CwComplex::build(volume, redundant_anchors)
}

/// Common imports for typical cwx usage.
///
/// ```rust
/// use cwx::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{build, Cell32, CwComplex, CwComplex32};
    pub use cwx_build::VoxelVolume;
    pub use cwx_core::{Axis, Cell, CwxError, Order};
    pub use cwx_query::TraversalObserver;
}
