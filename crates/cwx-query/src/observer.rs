//! The [`TraversalObserver`] capability, replacing a visitor functor.

use cwx_core::{Cell, CoordInt};

/// Callbacks driven by a component traversal.
///
/// Returning `false` from [`on_cell`](Self::on_cell) stops the BFS early,
/// without visiting the rest of the component; returning `false` from
/// [`on_component_start`](Self::on_component_start) skips the component
/// entirely. Both default to visiting everything, so a caller that only
/// cares about individual cells can implement `on_cell` alone, or simply
/// pass a closure (`impl FnMut(Cell<C>) -> bool` implements this trait
/// directly).
pub trait TraversalObserver<C: CoordInt> {
    /// Called once before a component's BFS starts, with its seed cell.
    fn on_component_start(&mut self, seed: Cell<C>) -> bool {
        let _ = seed;
        true
    }

    /// Called once per visited cell, in BFS discovery order.
    fn on_cell(&mut self, cell: Cell<C>) -> bool;

    /// Called once after a component's BFS completes or is stopped early.
    fn on_component_end(&mut self) -> bool {
        true
    }
}

impl<C, F> TraversalObserver<C> for F
where
    C: CoordInt,
    F: FnMut(Cell<C>) -> bool,
{
    fn on_cell(&mut self, cell: Cell<C>) -> bool {
        self(cell)
    }
}
