//! Cell-grid geometry and bit-packed voxel marking.
//!
//! `CellGrid` answers purely geometric questions about the doubled-resolution
//! cell lattice derived from a voxel [`Shape`](cwx_core::Shape): how many
//! cells of a given order exist, which cells neighbor a cell one order up or
//! down, and the dense `label <-> cell` bijection each order uses for array
//! indexing. `MarkedGrid` is the per-voxel bitset the builder paints onto
//! during discovery, one byte per voxel holding the seven mark bits (one per
//! non-order-3 sub-cell position) plus the anchored bit.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell_grid;
pub mod marked_grid;

pub use cell_grid::CellGrid;
pub use marked_grid::MarkedGrid;
