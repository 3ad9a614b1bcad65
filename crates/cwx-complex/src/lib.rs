//! The incidence store: sorted, bounded and growable label lists recording
//! which cells touch which.
//!
//! Each order's cells are allocated dense labels `1..=count` by
//! [`CWComplex::push_back`]; [`CWComplex::connect`] then links a cell to a
//! cell exactly one order above it, recording the relationship on both
//! sides so `above` and `below` queries are O(1) lookups into a sorted
//! slice.
//!
//! The bound on each incidence list follows directly from the cell-grid
//! geometry in `cwx-grid`: an order-0 cell has at most 6 cells above it, an
//! order-1 cell at most 4 above and 2 below, an order-2 cell at most 2
//! above and up to 6 below, and an order-3 cell up to 6 below. Lists that
//! are geometrically bounded reject an insert past capacity as
//! [`CwxError::IncidenceListFull`]; lists with no small fixed bound (below
//! an order-2 or order-3 cell) grow freely.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use cwx_core::{CwxError, LabelInt, Order};
use smallvec::{Array, SmallVec};

const ABOVE0_CAP: usize = 6;
const ABOVE1_CAP: usize = 4;
const ABOVE2_CAP: usize = 2;
const BELOW1_CAP: usize = 2;

/// The incidence structure of a CW complex: sorted label lists linking
/// adjacent orders.
///
/// `L` is the label width; see [`cwx_core::LabelInt`]. Label `0` is never
/// stored here — it is reserved by the query layer as the "no such cell"
/// sentinel — so every row holds only labels `>= 1`.
#[derive(Clone, Debug, Default)]
pub struct CWComplex<L: LabelInt = u32> {
    above0: Vec<SmallVec<[L; ABOVE0_CAP]>>,
    above1: Vec<SmallVec<[L; ABOVE1_CAP]>>,
    above2: Vec<SmallVec<[L; ABOVE2_CAP]>>,
    below1: Vec<SmallVec<[L; BELOW1_CAP]>>,
    below2: Vec<SmallVec<[L; 4]>>,
    below3: Vec<SmallVec<[L; 6]>>,
}

impl<L: LabelInt> CWComplex<L> {
    /// An empty complex with no cells allocated at any order.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of cells currently allocated at `order`.
    pub fn count(&self, order: Order) -> usize {
        match order {
            0 => self.above0.len(),
            1 => self.above1.len(),
            2 => self.above2.len(),
            3 => self.below3.len(),
            _ => 0,
        }
    }

    /// Allocate a new cell at `order`, returning its dense label.
    ///
    /// Labels are assigned in allocation order starting at `1`.
    pub fn push_back(&mut self, order: Order) -> Result<L, CwxError> {
        let next_len = match order {
            0 => {
                self.above0.push(SmallVec::new());
                self.above0.len()
            }
            1 => {
                self.above1.push(SmallVec::new());
                self.below1.push(SmallVec::new());
                self.above1.len()
            }
            2 => {
                self.above2.push(SmallVec::new());
                self.below2.push(SmallVec::new());
                self.above2.len()
            }
            3 => {
                self.below3.push(SmallVec::new());
                self.below3.len()
            }
            _ => return Err(CwxError::InvalidOrder { order }),
        };
        Ok(L::from_usize(next_len))
    }

    /// Link `low_label` at `low_order` to `high_label` at `low_order + 1`,
    /// recording the relation in both `above(low_order, low_label)` and
    /// `below(low_order + 1, high_label)`.
    ///
    /// Idempotent: connecting the same pair twice is not an error. Fails
    /// with [`CwxError::IncidenceListFull`] if a bounded list is already at
    /// capacity and does not already contain the other endpoint, or with
    /// [`CwxError::InvalidOrder`] if `low_order > 2`.
    pub fn connect(&mut self, low_order: Order, low_label: L, high_label: L) -> Result<(), CwxError> {
        match low_order {
            0 => {
                insert_bounded(&mut self.above0, low_label, high_label, 0, ABOVE0_CAP)?;
                insert_bounded(&mut self.below1, high_label, low_label, 1, BELOW1_CAP)?;
            }
            1 => {
                insert_bounded(&mut self.above1, low_label, high_label, 1, ABOVE1_CAP)?;
                insert_unbounded(&mut self.below2, high_label, low_label);
            }
            2 => {
                insert_bounded(&mut self.above2, low_label, high_label, 2, ABOVE2_CAP)?;
                insert_unbounded(&mut self.below3, high_label, low_label);
            }
            _ => return Err(CwxError::InvalidOrder { order: low_order }),
        }
        Ok(())
    }

    /// The sorted labels of cells one order above `label` at `order`.
    ///
    /// Empty for `order == 3` or an unallocated label.
    pub fn above(&self, order: Order, label: L) -> &[L] {
        match order {
            0 => row(&self.above0, label),
            1 => row(&self.above1, label),
            2 => row(&self.above2, label),
            _ => &[],
        }
    }

    /// The sorted labels of cells one order below `label` at `order`.
    ///
    /// Empty for `order == 0` or an unallocated label.
    pub fn below(&self, order: Order, label: L) -> &[L] {
        match order {
            1 => row(&self.below1, label),
            2 => row(&self.below2, label),
            3 => row(&self.below3, label),
            _ => &[],
        }
    }

    /// The number of cells above `label` at `order`.
    pub fn size_above(&self, order: Order, label: L) -> usize {
        self.above(order, label).len()
    }

    /// The number of cells below `label` at `order`.
    pub fn size_below(&self, order: Order, label: L) -> usize {
        self.below(order, label).len()
    }

    /// Debug-only consistency check: every `above` link has a matching
    /// `below` link and vice versa, and every row is sorted ascending with
    /// no duplicates.
    ///
    /// Panics via [`CwxError::InvariantViolated`] wrapped in a `Result`, so
    /// callers can invoke this from a `debug_assert!` or fold it into a
    /// fallible builder pass.
    pub fn check_invariants(&self) -> Result<(), CwxError> {
        self.check_sorted(&self.above0, 0, "above0")?;
        self.check_sorted(&self.above1, 1, "above1")?;
        self.check_sorted(&self.above2, 2, "above2")?;
        self.check_sorted(&self.below1, 1, "below1")?;
        self.check_sorted(&self.below2, 2, "below2")?;
        self.check_sorted(&self.below3, 3, "below3")?;

        for low_order in 0u8..=2 {
            let above_count = self.count(low_order);
            for idx in 0..above_count {
                let low_label = L::from_usize(idx + 1);
                for &high_label in self.above(low_order, low_label) {
                    if !self.below(low_order + 1, high_label).contains(&low_label) {
                        return Err(CwxError::InvariantViolated {
                            reason: format!(
                                "above({low_order}, {idx}) -> {high:?} has no reciprocal below link",
                                idx = idx + 1,
                                high = high_label
                            ),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn check_sorted<const N: usize>(
        &self,
        rows: &[SmallVec<[L; N]>],
        order: Order,
        name: &str,
    ) -> Result<(), CwxError>
    where
        [L; N]: Array<Item = L>,
    {
        for (idx, row) in rows.iter().enumerate() {
            if !row.windows(2).all(|w| w[0] < w[1]) {
                return Err(CwxError::InvariantViolated {
                    reason: format!("{name} row for label {} at order {order} is not strictly sorted", idx + 1),
                });
            }
        }
        Ok(())
    }
}

fn row<L: LabelInt, const N: usize>(rows: &[SmallVec<[L; N]>], label: L) -> &[L]
where
    [L; N]: Array<Item = L>,
{
    let idx = label.to_usize();
    if idx == 0 {
        return &[];
    }
    rows.get(idx - 1).map(|r| r.as_slice()).unwrap_or(&[])
}

fn insert_unbounded<L: LabelInt, const N: usize>(rows: &mut [SmallVec<[L; N]>], label: L, value: L)
where
    [L; N]: Array<Item = L>,
{
    let idx = label.to_usize() - 1;
    let row = &mut rows[idx];
    if let Err(pos) = row.binary_search(&value) {
        row.insert(pos, value);
    }
}

fn insert_bounded<L: LabelInt, const N: usize>(
    rows: &mut [SmallVec<[L; N]>],
    label: L,
    value: L,
    order: Order,
    cap: usize,
) -> Result<(), CwxError>
where
    [L; N]: Array<Item = L>,
{
    let idx = label.to_usize() - 1;
    let row = &mut rows[idx];
    match row.binary_search(&value) {
        Ok(_) => Ok(()),
        Err(pos) => {
            if row.len() >= cap {
                return Err(CwxError::IncidenceListFull { order, capacity: cap });
            }
            row.insert(pos, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_back_assigns_dense_increasing_labels() {
        let mut c = CWComplex::<u32>::new();
        assert_eq!(c.push_back(0).unwrap(), 1);
        assert_eq!(c.push_back(0).unwrap(), 2);
        assert_eq!(c.count(0), 2);
    }

    #[test]
    fn connect_links_both_directions() {
        let mut c = CWComplex::<u32>::new();
        let v = c.push_back(0).unwrap();
        let e = c.push_back(1).unwrap();
        c.connect(0, v, e).unwrap();
        assert_eq!(c.above(0, v), &[e]);
        assert_eq!(c.below(1, e), &[v]);
    }

    #[test]
    fn connect_is_idempotent() {
        let mut c = CWComplex::<u32>::new();
        let v = c.push_back(0).unwrap();
        let e = c.push_back(1).unwrap();
        c.connect(0, v, e).unwrap();
        c.connect(0, v, e).unwrap();
        assert_eq!(c.above(0, v).len(), 1);
    }

    #[test]
    fn connect_keeps_rows_sorted() {
        let mut c = CWComplex::<u32>::new();
        let v = c.push_back(0).unwrap();
        let e1 = c.push_back(1).unwrap();
        let e2 = c.push_back(1).unwrap();
        c.connect(0, v, e2).unwrap();
        c.connect(0, v, e1).unwrap();
        assert_eq!(c.above(0, v), &[e1, e2]);
    }

    #[test]
    fn bounded_row_rejects_past_capacity() {
        let mut c = CWComplex::<u32>::new();
        let v = c.push_back(0).unwrap();
        for _ in 0..ABOVE0_CAP {
            let e = c.push_back(1).unwrap();
            c.connect(0, v, e).unwrap();
        }
        let overflow = c.push_back(1).unwrap();
        assert!(matches!(
            c.connect(0, v, overflow),
            Err(CwxError::IncidenceListFull { order: 0, capacity: 6 })
        ));
    }

    #[test]
    fn below2_grows_past_small_inline_capacity() {
        let mut c = CWComplex::<u32>::new();
        let f = c.push_back(2).unwrap();
        for _ in 0..10 {
            let e = c.push_back(1).unwrap();
            c.connect(1, e, f).unwrap();
        }
        assert_eq!(c.below(2, f).len(), 10);
    }

    #[test]
    fn check_invariants_passes_on_a_consistent_complex() {
        let mut c = CWComplex::<u32>::new();
        let v = c.push_back(0).unwrap();
        let e = c.push_back(1).unwrap();
        c.connect(0, v, e).unwrap();
        assert!(c.check_invariants().is_ok());
    }

    #[test]
    fn unallocated_label_returns_empty_rows() {
        let c = CWComplex::<u32>::new();
        assert!(c.above(0, 1).is_empty());
        assert!(c.below(1, 1).is_empty());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn random_complexes_satisfy_invariants(
            n0 in 1usize..8, n1 in 1usize..8, n2 in 1usize..8,
            links01 in prop::collection::vec((0usize..7, 0usize..7), 0..20),
            links12 in prop::collection::vec((0usize..7, 0usize..7), 0..20),
        ) {
            let mut c = CWComplex::<u32>::new();
            let v: Vec<u32> = (0..n0).map(|_| c.push_back(0).unwrap()).collect();
            let e: Vec<u32> = (0..n1).map(|_| c.push_back(1).unwrap()).collect();
            let f: Vec<u32> = (0..n2).map(|_| c.push_back(2).unwrap()).collect();

            for (i, j) in links01 {
                if i < v.len() && j < e.len() {
                    let _ = c.connect(0, v[i], e[j]);
                }
            }
            for (i, j) in links12 {
                if i < e.len() && j < f.len() {
                    let _ = c.connect(1, e[i], f[j]);
                }
            }

            prop_assert!(c.check_invariants().is_ok());
        }
    }
}
