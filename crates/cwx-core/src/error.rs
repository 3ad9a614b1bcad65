//! The error type shared across the cwx workspace.
//!
//! Maps the two fatal error classes of the design notes — argument-domain
//! errors and structural invariant violations — onto a single enum so every
//! crate in the workspace can return `Result<T, CwxError>` without a
//! wrapper per layer.

use std::error::Error;
use std::fmt;

/// Errors produced by the cwx CW-complex toolkit.
///
/// Every variant here is fatal: callers are not expected to recover and
/// retry. "Normal absent" results — an unmarked k-cell's query returning
/// label 0, `above`/`below` past the end returning 0 — are not errors and
/// are never represented by this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CwxError {
    /// An order argument was outside `0..=3`.
    InvalidOrder {
        /// The offending order value.
        order: u8,
    },
    /// A voxel labeling did not have exactly three dimensions.
    NotThreeDimensional {
        /// The number of dimensions actually supplied.
        ndim: usize,
    },
    /// A voxel volume had a zero extent on one of its three axes.
    EmptyVolume {
        /// The axis (0, 1, or 2) that was zero.
        axis: usize,
    },
    /// An output buffer passed to an export helper did not match the
    /// complex's extent on one axis.
    ShapeMismatch {
        /// The axis (0, 1, or 2) that mismatched.
        axis: usize,
        /// The extent the complex actually has on that axis.
        expected: usize,
        /// The extent the caller supplied.
        actual: usize,
    },
    /// A label argument exceeded the number of labels allocated for its order.
    LabelOutOfRange {
        /// The order the label was checked against.
        order: u8,
        /// The offending label, widened to `u64` for display.
        label: u64,
        /// The number of labels currently allocated for `order`.
        count: u64,
    },
    /// `connect` was asked to insert into a bounded sorted list that is
    /// already full and does not already contain the value.
    IncidenceListFull {
        /// The order of the list that overflowed.
        order: u8,
        /// Its fixed capacity.
        capacity: usize,
    },
    /// `Anchorage::push_back` was asked to register a cell that is already
    /// an anchor.
    DuplicateAnchor,
    /// `atCell`'s BFS exhausted the reachable component without finding an
    /// anchored cell — an Anchorage/MarkedGrid consistency violation.
    AnchorSearchExhausted {
        /// The order of the cell the search started from.
        order: u8,
    },
    /// A debug-only consistency check (`check_invariants`) found a violated
    /// invariant in the CW complex.
    InvariantViolated {
        /// Human-readable description of which invariant failed and where.
        reason: String,
    },
}

impl fmt::Display for CwxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOrder { order } => {
                write!(f, "invalid cell order {order}, expected 0..=3")
            }
            Self::NotThreeDimensional { ndim } => {
                write!(f, "expected a 3-dimensional volume, got {ndim} dimensions")
            }
            Self::EmptyVolume { axis } => write!(f, "voxel volume has zero extent on axis {axis}"),
            Self::ShapeMismatch {
                axis,
                expected,
                actual,
            } => write!(
                f,
                "output buffer has extent {actual} on axis {axis}, expected {expected}"
            ),
            Self::LabelOutOfRange {
                order,
                label,
                count,
            } => write!(
                f,
                "label {label} out of range for order {order} (only {count} labels allocated)"
            ),
            Self::IncidenceListFull { order, capacity } => write!(
                f,
                "incidence list for order {order} is full (capacity {capacity})"
            ),
            Self::DuplicateAnchor => write!(f, "cell is already registered as an anchor"),
            Self::AnchorSearchExhausted { order } => write!(
                f,
                "atCell BFS at order {order} exhausted its component without finding an anchor"
            ),
            Self::InvariantViolated { reason } => write!(f, "invariant violated: {reason}"),
        }
    }
}

impl Error for CwxError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let e = CwxError::InvalidOrder { order: 7 };
        assert!(e.to_string().contains('7'));
    }
}
