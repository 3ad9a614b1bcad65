//! The boundary-detection and anchoring pipeline: turns a labeled voxel
//! volume into a fully linked, anchored CW complex.
//!
//! [`Builder::build`] runs the six passes described on [`Builder`] and hands
//! back a [`BuiltComplex`] bundling the [`MarkedGrid`](cwx_grid::MarkedGrid),
//! [`CWComplex`](cwx_complex::CWComplex), and
//! [`Anchorage`](cwx_anchor::Anchorage) it produced.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod builder;
mod volume;

pub use builder::{Builder, BuiltComplex};
pub use volume::VoxelVolume;
