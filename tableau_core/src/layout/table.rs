// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grid layout with spanning cells.

use kurbo::{Rect, Size};

use super::{LayoutBehavior, LayoutCx, distribute};
use crate::node::{GridCell, NodeId};

/// Lays children out on a grid of columns and rows.
///
/// Each child is placed by its [`GridCell`] (see
/// [`LayoutProps::cell`](crate::node::LayoutProps::cell)); children without
/// a cell are left alone. A track's minimum is the largest minimum of its
/// single-span cells; cells spanning several tracks spread any shortfall
/// over them, narrowest spans first.
///
/// Leftover space goes to the tracks where every spanning cell expands. If
/// no track qualifies, the last track takes it all.
///
/// The grid has as many tracks as the furthest cell reaches. A track no cell
/// spans is kept at zero size but still takes its gaps, so skipped indices
/// leave a visible gap of `column_spacing` or `row_spacing`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TableLayout {
    /// Gap between columns.
    pub column_spacing: f64,
    /// Gap between rows.
    pub row_spacing: f64,
}

impl TableLayout {
    /// Creates a table with the given gaps.
    #[must_use]
    pub const fn new(column_spacing: f64, row_spacing: f64) -> Self {
        Self {
            column_spacing,
            row_spacing,
        }
    }

    fn cells(cx: &mut LayoutCx<'_>, node: NodeId) -> Vec<Cell> {
        let mut cells = Vec::new();
        for child in cx.children(node) {
            let props = cx.props(child);
            let Some(cell) = props.cell else {
                continue;
            };
            let cell = cell.span(cell.col_span, cell.row_span);
            cells.push(Cell {
                child,
                cell,
                min: cx.min_size(child),
                expand: props.expand,
                fill: props.fill,
            });
        }
        cells
    }
}

#[derive(Debug)]
struct Cell {
    child: NodeId,
    cell: GridCell,
    min: Size,
    expand: bool,
    fill: bool,
}

/// One cell projected onto one axis.
#[derive(Clone, Copy, Debug)]
struct Span {
    start: usize,
    len: usize,
    min: f64,
    expand: bool,
}

impl Span {
    fn tracks(&self) -> core::ops::Range<usize> {
        self.start..self.start + self.len
    }
}

/// Per-axis track solver.
#[derive(Debug)]
struct Axis {
    spans: Vec<Span>,
    count: usize,
    spacing: f64,
}

impl Axis {
    fn columns(cells: &[Cell], spacing: f64) -> Self {
        Self::new(
            cells.iter().map(|c| Span {
                start: c.cell.col,
                len: c.cell.col_span,
                min: c.min.width,
                expand: c.expand,
            }),
            spacing,
        )
    }

    fn rows(cells: &[Cell], spacing: f64) -> Self {
        Self::new(
            cells.iter().map(|c| Span {
                start: c.cell.row,
                len: c.cell.row_span,
                min: c.min.height,
                expand: c.expand,
            }),
            spacing,
        )
    }

    fn new(spans: impl Iterator<Item = Span>, spacing: f64) -> Self {
        let spans: Vec<Span> = spans.collect();
        let count = spans.iter().map(|s| s.start + s.len).max().unwrap_or(0);
        Self {
            spans,
            count,
            spacing,
        }
    }

    fn total_spacing(&self) -> f64 {
        self.spacing * self.count.saturating_sub(1) as f64
    }

    fn minimums(&self) -> Vec<f64> {
        let mut mins = vec![0.0; self.count];
        for span in self.spans.iter().filter(|s| s.len == 1) {
            mins[span.start] = f64::max(mins[span.start], span.min);
        }
        let mut multi: Vec<&Span> = self.spans.iter().filter(|s| s.len > 1).collect();
        multi.sort_by_key(|s| s.len);
        for span in multi {
            let inner_spacing = self.spacing * (span.len - 1) as f64;
            let current: f64 = mins[span.tracks()].iter().sum::<f64>() + inner_spacing;
            let shortfall = span.min - current;
            if shortfall > 0.0 {
                for (m, share) in mins[span.tracks()]
                    .iter_mut()
                    .zip(distribute(shortfall, span.len))
                {
                    *m += share;
                }
            }
        }
        mins
    }

    /// A track expands when it is spanned and every spanning cell expands.
    fn expanding(&self) -> Vec<bool> {
        let mut spanned = vec![false; self.count];
        let mut unanimous = vec![true; self.count];
        for span in &self.spans {
            for t in span.tracks() {
                spanned[t] = true;
                unanimous[t] &= span.expand;
            }
        }
        spanned.iter().zip(unanimous).map(|(&s, u)| s && u).collect()
    }

    /// Returns the size of every track for `available` space.
    fn sizes(&self, available: f64) -> Vec<f64> {
        let mut sizes = self.minimums();
        let extra = available - sizes.iter().sum::<f64>() - self.total_spacing();
        if extra <= 0.0 || self.count == 0 {
            return sizes;
        }
        let mut targets: Vec<usize> = self
            .expanding()
            .iter()
            .enumerate()
            .filter_map(|(t, &e)| e.then_some(t))
            .collect();
        if targets.is_empty() {
            targets.push(self.count - 1);
        }
        for (t, share) in targets.iter().zip(distribute(extra, targets.len())) {
            sizes[*t] += share;
        }
        sizes
    }

    /// Returns the offset of every track from the start of the content box.
    fn offsets(&self, sizes: &[f64]) -> Vec<f64> {
        let mut offsets = Vec::with_capacity(sizes.len());
        let mut cursor = 0.0;
        for size in sizes {
            offsets.push(cursor);
            cursor += size + self.spacing;
        }
        offsets
    }
}

impl LayoutBehavior for TableLayout {
    fn measure(&self, cx: &mut LayoutCx<'_>, node: NodeId) -> Size {
        let cells = Self::cells(cx, node);
        let cols = Axis::columns(&cells, self.column_spacing);
        let rows = Axis::rows(&cells, self.row_spacing);
        Size::new(
            cols.minimums().iter().sum::<f64>() + cols.total_spacing(),
            rows.minimums().iter().sum::<f64>() + rows.total_spacing(),
        )
    }

    fn arrange(&self, cx: &mut LayoutCx<'_>, node: NodeId, content: Rect) {
        let cells = Self::cells(cx, node);
        let cols = Axis::columns(&cells, self.column_spacing);
        let rows = Axis::rows(&cells, self.row_spacing);
        let widths = cols.sizes(content.width());
        let heights = rows.sizes(content.height());
        let xs = cols.offsets(&widths);
        let ys = rows.offsets(&heights);

        for cell in &cells {
            let GridCell {
                col,
                row,
                col_span,
                row_span,
            } = cell.cell;
            let last_col = col + col_span - 1;
            let last_row = row + row_span - 1;
            let area = Rect::new(
                content.x0 + xs[col],
                content.y0 + ys[row],
                content.x0 + xs[last_col] + widths[last_col],
                content.y0 + ys[last_row] + heights[last_row],
            );
            cx.place(cell.child, area, cell.fill, cell.fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Point;

    use super::*;
    use crate::node::NodeStore;

    fn table(store: &mut NodeStore, spacing: f64, size: Size) -> NodeId {
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(TableLayout::new(spacing, spacing))))
            .unwrap();
        store.set_requested_size(root, Some(size)).unwrap();
        root
    }

    fn cell(
        store: &mut NodeStore,
        parent: NodeId,
        at: GridCell,
        min: Size,
        expand: bool,
    ) -> NodeId {
        let n = store.create_node();
        store
            .update_layout_props(n, |p| {
                p.cell = Some(at);
                p.min_width = min.width;
                p.min_height = min.height;
                p.expand = expand;
            })
            .unwrap();
        store.add_child(parent, n).unwrap();
        n
    }

    #[test]
    fn unanimous_expand_gets_the_extra() {
        let mut store = NodeStore::new();
        let root = table(&mut store, 0.0, Size::new(200.0, 20.0));
        let a = cell(&mut store, root, GridCell::at(0, 0), Size::new(10.0, 10.0), true);
        let b = cell(&mut store, root, GridCell::at(1, 0), Size::new(20.0, 10.0), false);
        let c = cell(
            &mut store,
            root,
            GridCell::at(0, 1).span(2, 1),
            Size::new(30.0, 10.0),
            true,
        );

        assert_eq!(store.allocation(a), Some(Size::new(180.0, 10.0)));
        assert_eq!(store.allocation(b), Some(Size::new(20.0, 10.0)));
        assert_eq!(store.position(b), Some(Point::new(180.0, 0.0)));
        assert_eq!(store.allocation(c), Some(Size::new(200.0, 10.0)));
        assert_eq!(store.position(c), Some(Point::new(0.0, 10.0)));
    }

    #[test]
    fn disagreement_falls_to_last_track() {
        let mut store = NodeStore::new();
        let root = table(&mut store, 0.0, Size::new(200.0, 10.0));
        let a = cell(&mut store, root, GridCell::at(0, 0), Size::new(10.0, 10.0), true);
        let b = cell(&mut store, root, GridCell::at(1, 0), Size::new(20.0, 10.0), false);
        // Column 0 has one expanding and one non-expanding cell.
        cell(
            &mut store,
            root,
            GridCell::at(0, 0).span(2, 1),
            Size::ZERO,
            false,
        );

        assert_eq!(store.allocation(a), Some(Size::new(10.0, 10.0)));
        assert_eq!(store.allocation(b), Some(Size::new(190.0, 10.0)));
    }

    #[test]
    fn spanning_cell_spreads_its_minimum() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(TableLayout::new(4.0, 0.0))))
            .unwrap();
        cell(
            &mut store,
            root,
            GridCell::at(0, 0).span(2, 1),
            Size::new(54.0, 10.0),
            false,
        );
        let narrow = cell(&mut store, root, GridCell::at(0, 1), Size::new(5.0, 5.0), false);
        // Columns start at [5, 0]; the 45px shortfall is split 22 / 23.
        assert_eq!(store.min_size(root), Some(Size::new(54.0, 15.0)));
        store.update_layout();
        assert_eq!(store.allocation(narrow), Some(Size::new(27.0, 5.0)));
    }

    #[test]
    fn unspanned_tracks_keep_their_gaps() {
        let mut store = NodeStore::new();
        let root = store.create_node();
        store
            .set_layout(root, Some(Box::new(TableLayout::new(5.0, 0.0))))
            .unwrap();
        cell(&mut store, root, GridCell::at(0, 0), Size::new(10.0, 10.0), false);
        let far = cell(&mut store, root, GridCell::at(2, 0), Size::new(10.0, 10.0), false);
        // Columns [10, 0, 10] with two gaps.
        assert_eq!(store.min_size(root), Some(Size::new(30.0, 10.0)));
        assert_eq!(store.position(far), Some(Point::ORIGIN), "not laid out yet");
        store.update_layout();
        assert_eq!(store.position(far), Some(Point::new(20.0, 0.0)));
    }

    #[test]
    fn children_without_cells_are_ignored() {
        let mut store = NodeStore::new();
        let root = table(&mut store, 0.0, Size::new(50.0, 50.0));
        let loose = store.create_node();
        store.set_min_size(loose, Size::new(500.0, 500.0)).unwrap();
        store.add_child(root, loose).unwrap();
        assert_eq!(store.min_size(root), Some(Size::ZERO));
        assert_eq!(store.allocation(loose), None);
    }
}
