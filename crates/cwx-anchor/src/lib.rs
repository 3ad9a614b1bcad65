//! Anchor bookkeeping: a sparse `Cell -> Label` map paired with a dense
//! per-order `Label -> Cell` sequence.
//!
//! Every connected component discovered at orders 1-3, and every order-0
//! vertex, gets one *primary* anchor: the first cell the builder visits in
//! that component. [`Anchorage::push_back`] registers a primary anchor and
//! allocates its label; [`Anchorage::assign_additional`] later registers
//! extra cells that resolve to the same label, which the builder uses so a
//! query starting anywhere in a component finds an anchor nearby instead of
//! walking all the way back to the single primary cell.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use cwx_core::{Cell, CoordInt, CwxError, LabelInt, Order};
use indexmap::IndexMap;

/// Sparse-to-dense anchor bookkeeping for one CW complex.
///
/// `cell_of[order]` is indexed directly by label and carries a sentinel at
/// index `0` (label `0` is reserved as "no cell" throughout the workspace),
/// so `cell_of[order][label]` is valid for every allocated label without an
/// off-by-one. `anchor_of` is the sparse inverse: every cell that has ever
/// been registered as an anchor, primary or additional, maps to the label
/// of the component it anchors.
#[derive(Clone, Debug)]
pub struct Anchorage<C: CoordInt = u32, L: LabelInt = u32> {
    anchor_of: IndexMap<Cell<C>, L>,
    cell_of: [Vec<Cell<C>>; 4],
}

impl<C: CoordInt, L: LabelInt> Default for Anchorage<C, L> {
    fn default() -> Self {
        Self {
            anchor_of: IndexMap::new(),
            cell_of: [
                vec![Cell::default()],
                vec![Cell::default()],
                vec![Cell::default()],
                vec![Cell::default()],
            ],
        }
    }
}

impl<C: CoordInt, L: LabelInt> Anchorage<C, L> {
    /// An anchorage with no registered anchors at any order.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of primary anchors registered at `order`.
    pub fn count(&self, order: Order) -> usize {
        self.cell_of_order(order).map_or(0, |v| v.len() - 1)
    }

    fn cell_of_order(&self, order: Order) -> Option<&Vec<Cell<C>>> {
        self.cell_of.get(order as usize)
    }

    /// Register `cell` as the primary anchor of a new component at `order`,
    /// returning the dense label it is assigned.
    ///
    /// Fails with [`CwxError::DuplicateAnchor`] if `cell` is already
    /// registered as an anchor for any order, and with
    /// [`CwxError::InvalidOrder`] if `order` does not match `cell.order()`
    /// or is outside `0..=3`.
    pub fn push_back(&mut self, order: Order, cell: Cell<C>) -> Result<L, CwxError> {
        self.check_order(order, cell)?;
        if self.anchor_of.contains_key(&cell) {
            return Err(CwxError::DuplicateAnchor);
        }
        let slots = &mut self.cell_of[order as usize];
        slots.push(cell);
        let label = L::from_usize(slots.len() - 1);
        self.anchor_of.insert(cell, label);
        Ok(label)
    }

    /// Register `cell` as an additional anchor resolving to the
    /// already-allocated `label` at `order`.
    ///
    /// Idempotent if `cell` is already registered for the same label. Fails
    /// with [`CwxError::DuplicateAnchor`] if `cell` is already registered
    /// for a *different* label, and with [`CwxError::LabelOutOfRange`] if
    /// `label` has not been allocated at `order`.
    pub fn assign_additional(&mut self, order: Order, label: L, cell: Cell<C>) -> Result<(), CwxError> {
        self.check_order(order, cell)?;
        let count = self.count(order);
        if label.to_usize() == 0 || label.to_usize() > count {
            return Err(CwxError::LabelOutOfRange {
                order,
                label: label.to_usize() as u64,
                count: count as u64,
            });
        }
        match self.anchor_of.get(&cell) {
            Some(&existing) if existing == label => Ok(()),
            Some(_) => Err(CwxError::DuplicateAnchor),
            None => {
                self.anchor_of.insert(cell, label);
                Ok(())
            }
        }
    }

    /// The label `cell` resolves to, if it has been registered as an
    /// anchor (primary or additional) at `order`.
    pub fn lookup_label(&self, order: Order, cell: Cell<C>) -> Option<L> {
        if cell.order() != order {
            return None;
        }
        self.anchor_of.get(&cell).copied()
    }

    /// The primary anchor cell for `label` at `order`.
    pub fn lookup_cell(&self, order: Order, label: L) -> Option<Cell<C>> {
        let slots = self.cell_of_order(order)?;
        let idx = label.to_usize();
        if idx == 0 || idx >= slots.len() {
            return None;
        }
        Some(slots[idx])
    }

    fn check_order(&self, order: Order, cell: Cell<C>) -> Result<(), CwxError> {
        if order > 3 || cell.order() != order {
            return Err(CwxError::InvalidOrder { order });
        }
        Ok(())
    }

    /// Debug-only consistency check: every registered anchor resolves to a
    /// label allocated at its own order, and every primary cell's
    /// `anchor_of` entry points back to its own label.
    pub fn check_invariants(&self) -> Result<(), CwxError> {
        for (&cell, &label) in self.anchor_of.iter() {
            let order = cell.order();
            let count = self.count(order);
            if label.to_usize() == 0 || label.to_usize() > count {
                return Err(CwxError::InvariantViolated {
                    reason: format!("anchor {cell} resolves to out-of-range label at order {order}"),
                });
            }
        }
        for order in 0u8..=3 {
            for (idx, &cell) in self.cell_of[order as usize].iter().enumerate().skip(1) {
                let label = L::from_usize(idx);
                if self.anchor_of.get(&cell) != Some(&label) {
                    return Err(CwxError::InvariantViolated {
                        reason: format!("primary anchor {cell} at order {order} does not resolve to its own label"),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(c0: u32, c1: u32, c2: u32) -> Cell<u32> {
        Cell::new(c0, c1, c2)
    }

    #[test]
    fn push_back_assigns_sequential_labels() {
        let mut a = Anchorage::<u32, u32>::new();
        let v0 = c(1, 1, 1);
        let v1 = c(3, 1, 1);
        assert_eq!(a.push_back(0, v0).unwrap(), 1);
        assert_eq!(a.push_back(0, v1).unwrap(), 2);
        assert_eq!(a.count(0), 2);
    }

    #[test]
    fn duplicate_primary_anchor_rejected() {
        let mut a = Anchorage::<u32, u32>::new();
        let v = c(1, 1, 1);
        a.push_back(0, v).unwrap();
        assert!(matches!(a.push_back(0, v), Err(CwxError::DuplicateAnchor)));
    }

    #[test]
    fn lookup_round_trips_primary_anchor() {
        let mut a = Anchorage::<u32, u32>::new();
        let v = c(1, 1, 1);
        let label = a.push_back(0, v).unwrap();
        assert_eq!(a.lookup_label(0, v), Some(label));
        assert_eq!(a.lookup_cell(0, label), Some(v));
    }

    #[test]
    fn additional_anchor_resolves_to_existing_label() {
        let mut a = Anchorage::<u32, u32>::new();
        let primary = c(0, 0, 0);
        let other = c(2, 0, 0);
        let label = a.push_back(3, primary).unwrap();
        a.assign_additional(3, label, other).unwrap();
        assert_eq!(a.lookup_label(3, other), Some(label));
        assert_eq!(a.lookup_cell(3, label), Some(primary));
    }

    #[test]
    fn additional_anchor_conflicting_with_existing_label_rejected() {
        let mut a = Anchorage::<u32, u32>::new();
        let p1 = c(0, 0, 0);
        let p2 = c(2, 0, 0);
        let l1 = a.push_back(3, p1).unwrap();
        let l2 = a.push_back(3, p2).unwrap();
        assert!(matches!(
            a.assign_additional(3, l1, p2),
            Err(CwxError::DuplicateAnchor)
        ));
        let _ = l2;
    }

    #[test]
    fn mismatched_order_rejected() {
        let mut a = Anchorage::<u32, u32>::new();
        let edge = c(1, 0, 0); // order 2
        assert!(matches!(
            a.push_back(0, edge),
            Err(CwxError::InvalidOrder { order: 0 })
        ));
    }

    #[test]
    fn invariants_hold_after_mixed_registrations() {
        let mut a = Anchorage::<u32, u32>::new();
        let p = c(0, 0, 0);
        let label = a.push_back(3, p).unwrap();
        a.assign_additional(3, label, c(2, 0, 0)).unwrap();
        a.push_back(0, c(1, 1, 1)).unwrap();
        assert!(a.check_invariants().is_ok());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn distinct_order0_anchors_round_trip(xs in prop::collection::vec(0u32..20, 1..15)) {
            let mut a = Anchorage::<u32, u32>::new();
            let mut seen = std::collections::HashSet::new();
            for x in xs {
                let cell = c(2 * x + 1, 1, 1);
                if !seen.insert(cell) {
                    continue;
                }
                let label = a.push_back(0, cell).unwrap();
                prop_assert_eq!(a.lookup_cell(0, label), Some(cell));
                prop_assert_eq!(a.lookup_label(0, cell), Some(label));
            }
            prop_assert!(a.check_invariants().is_ok());
        }
    }
}
