//! Ruling-line grid detection.
//!
//! The vendor's score tables are drawn with full cell borders on some
//! report revisions. This engine recovers the grid from the page's
//! drawing shapes: thin horizontal bars become row boundaries, thin
//! vertical bars become column boundaries, and large rectangles
//! contribute both pairs of edges. Words are then assigned to the cell
//! whose boundary interval contains their center.

use super::{Grid, GridStrategy};
use crate::geometry::safe_float_cmp;
use crate::records::StrategyKind;
use crate::reader::PageContent;

const THIN: f32 = 3.0;
const MIN_LINE_LEN: f32 = 40.0;
const BOUNDARY_TOLERANCE: f32 = 2.0;

/// Grid-line-based table extraction.
#[derive(Debug, Clone, Default)]
pub struct LatticeStrategy;

impl LatticeStrategy {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl GridStrategy for LatticeStrategy {
    fn name(&self) -> &'static str {
        "lattice"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::LatticeTable
    }

    fn attempt(&self, page: &PageContent) -> Vec<Grid> {
        if page.words.is_empty() || page.shapes.is_empty() {
            return vec![];
        }

        let mut row_bounds: Vec<f32> = Vec::new();
        let mut col_bounds: Vec<f32> = Vec::new();

        for shape in &page.shapes {
            let b = &shape.bbox;
            let horizontal_bar = b.height() <= THIN && b.width() >= MIN_LINE_LEN;
            let vertical_bar = b.width() <= THIN && b.height() >= MIN_LINE_LEN / 2.0;
            let rectangle = b.width() >= MIN_LINE_LEN && b.height() >= 10.0;

            if horizontal_bar {
                row_bounds.push(b.y_center());
            }
            if vertical_bar {
                col_bounds.push(b.x_center());
            }
            if rectangle {
                row_bounds.push(b.y0);
                row_bounds.push(b.y1);
                col_bounds.push(b.x0);
                col_bounds.push(b.x1);
            }
        }

        dedup_bounds(&mut row_bounds);
        dedup_bounds(&mut col_bounds);

        if row_bounds.len() < 3 || col_bounds.len() < 3 {
            // Fewer than a 2x2 cell structure; not a ruled table.
            return vec![];
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for row_pair in row_bounds.windows(2) {
            let (top, bottom) = (row_pair[0], row_pair[1]);
            let mut row: Vec<String> = Vec::new();
            for col_pair in col_bounds.windows(2) {
                let (left, right) = (col_pair[0], col_pair[1]);
                let mut cell_words: Vec<&crate::reader::Word> = page
                    .words
                    .iter()
                    .filter(|w| {
                        let c = w.bbox.center();
                        c.x >= left && c.x < right && c.y >= top && c.y < bottom
                    })
                    .collect();
                cell_words.sort_by(|a, b| safe_float_cmp(a.bbox.x0, b.bbox.x0));
                row.push(
                    cell_words
                        .iter()
                        .map(|w| w.text.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                );
            }
            if row.iter().any(|c| !c.is_empty()) {
                rows.push(row);
            }
        }

        if rows.is_empty() {
            return vec![];
        }
        vec![Grid { rows }]
    }
}

fn dedup_bounds(bounds: &mut Vec<f32>) {
    bounds.sort_by(|a, b| safe_float_cmp(*a, *b));
    bounds.dedup_by(|a, b| (*a - *b).abs() < BOUNDARY_TOLERANCE);
}
