//! Read-only queries and traversal over a built CW complex.
//!
//! [`ComplexView`] borrows the [`MarkedGrid`](cwx_grid::MarkedGrid),
//! [`CWComplex`](cwx_complex::CWComplex), and
//! [`Anchorage`](cwx_anchor::Anchorage) that `cwx-build` produces and
//! answers `at_voxel`/`at_cell` membership queries plus `process*`
//! traversals, all via the same BFS-to-nearest-anchor state machine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod observer;
mod view;

pub use observer::TraversalObserver;
pub use view::ComplexView;

#[cfg(test)]
mod tests {
    use super::*;
    use cwx_anchor::Anchorage;
    use cwx_complex::CWComplex;
    use cwx_core::{Cell, CwxError, Shape};
    use cwx_grid::MarkedGrid;

    /// A 2x2x2 uniform volume: every voxel is the same label, so no cell is
    /// ever marked and the whole grid is one order-3 component.
    fn uniform_fixture() -> (Shape<u32>, MarkedGrid<u32>, CWComplex<u32>, Anchorage<u32, u32>) {
        let shape = Shape::new(2u32, 2, 2).unwrap();
        let marks = MarkedGrid::new(shape);
        let mut complex = CWComplex::new();
        let mut anchors = Anchorage::new();
        let label = complex.push_back(3).unwrap();
        let anchor_label = anchors.push_back(3, Cell::new(0u32, 0, 0)).unwrap();
        assert_eq!(label, anchor_label);
        (shape, marks, complex, anchors)
    }

    #[test]
    fn at_voxel_agrees_across_the_whole_uniform_volume() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        for x in 0..2u32 {
            for y in 0..2u32 {
                for z in 0..2u32 {
                    assert_eq!(view.at_voxel(x, y, z).unwrap(), 1);
                }
            }
        }
    }

    #[test]
    fn process_component_visits_every_voxel_exactly_once() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let mut seen = Vec::new();
        view.process_component(3, 1u32, &mut |cell: Cell<u32>| {
            seen.push(cell);
            true
        })
        .unwrap();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn process_and_at_cell_agree_on_component_membership() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let probe = Cell::new(2u32, 2, 2);
        let label = view.at_cell(probe).unwrap();
        let mut seen = std::collections::HashSet::new();
        view.process_component(3, label, &mut |c: Cell<u32>| {
            seen.insert(c);
            true
        })
        .unwrap();
        assert!(seen.contains(&probe));
        for cell in &seen {
            assert_eq!(view.at_cell(*cell).unwrap(), label);
        }
    }

    #[test]
    fn early_termination_stops_the_flood() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let mut count = 0;
        view.process_component(3, 1u32, &mut |_: Cell<u32>| {
            count += 1;
            count < 3
        })
        .unwrap();
        assert!(count <= 3);
    }

    #[test]
    fn at_cell_on_order0_requires_a_registered_anchor() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let vertex = Cell::new(1u32, 1, 1);
        assert!(matches!(
            view.at_cell(vertex),
            Err(CwxError::AnchorSearchExhausted { order: 0 })
        ));
    }

    #[test]
    fn unmarked_edge_resolves_to_the_sentinel_label() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let edge = Cell::new(1u32, 1, 0);
        assert_eq!(edge.order(), 1);
        assert_eq!(view.at_cell(edge).unwrap(), 0);
    }

    #[test]
    fn process_all_visits_every_allocated_label() {
        let (shape, marks, complex, anchors) = uniform_fixture();
        let view = ComplexView::new(shape, &marks, &complex, &anchors);
        let mut visited_labels = std::collections::HashSet::new();
        let mut cell = None;
        view.process_all(3, &mut |c: Cell<u32>| {
            cell = Some(c);
            visited_labels.insert(view.at_cell(c).unwrap());
            true
        })
        .unwrap();
        assert_eq!(visited_labels.len(), 1);
        assert!(cell.is_some());
    }
}
