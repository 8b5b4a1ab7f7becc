//! Whitespace-based grid detection.
//!
//! Recovers a grid from word positions alone: words are grouped into
//! rows by rounded vertical position, and column boundaries come from
//! the distinct left-edge positions that recur across rows. Rounding to
//! integer positions before deduplication keeps the ordering stable and
//! transitive.

use super::{Grid, GridStrategy};
use crate::records::StrategyKind;
use crate::reader::{PageContent, Word};

const ROW_MERGE: i32 = 2;
const COL_MERGE: i32 = 3;
/// Column starts seen on fewer rows than this are stray words, not
/// table columns.
const MIN_COLUMN_SUPPORT: usize = 2;

/// Whitespace-column-based table extraction.
#[derive(Debug, Clone, Default)]
pub struct StreamStrategy;

impl StreamStrategy {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }
}

impl GridStrategy for StreamStrategy {
    fn name(&self) -> &'static str {
        "stream"
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::StreamTable
    }

    fn attempt(&self, page: &PageContent) -> Vec<Grid> {
        if page.words.len() < 4 {
            return vec![];
        }

        // Row positions, top to bottom.
        let mut y_positions: Vec<i32> = page
            .words
            .iter()
            .map(|w| w.bbox.y_center().round() as i32)
            .collect();
        y_positions.sort_unstable();
        y_positions.dedup_by(|a, b| (*a - *b).abs() < ROW_MERGE);

        // Column starts supported by multiple rows.
        let mut x_counts: Vec<(i32, usize)> = Vec::new();
        for word in &page.words {
            let x = word.bbox.x0.round() as i32;
            match x_counts
                .iter_mut()
                .find(|(pos, _)| (*pos - x).abs() < COL_MERGE)
            {
                Some((_, count)) => *count += 1,
                None => x_counts.push((x, 1)),
            }
        }
        let mut x_positions: Vec<i32> = x_counts
            .into_iter()
            .filter(|(_, count)| *count >= MIN_COLUMN_SUPPORT)
            .map(|(pos, _)| pos)
            .collect();
        x_positions.sort_unstable();

        if y_positions.len() < 2 || x_positions.len() < 2 {
            return vec![];
        }

        let mut rows: Vec<Vec<String>> = Vec::new();
        for &y in &y_positions {
            let mut row_words: Vec<&Word> = page
                .words
                .iter()
                .filter(|w| (w.bbox.y_center().round() as i32 - y).abs() < ROW_MERGE)
                .collect();
            if row_words.is_empty() {
                continue;
            }
            row_words.sort_by(|a, b| crate::geometry::safe_float_cmp(a.bbox.x0, b.bbox.x0));

            let mut row: Vec<String> = vec![String::new(); x_positions.len()];
            for word in row_words {
                let x = word.bbox.x0.round() as i32;
                let col = column_for(&x_positions, x);
                if !row[col].is_empty() {
                    row[col].push(' ');
                }
                row[col].push_str(&word.text);
            }
            if row.iter().any(|c| !c.is_empty()) {
                rows.push(row);
            }
        }

        if rows.len() < 2 {
            return vec![];
        }
        vec![Grid { rows }]
    }
}

/// The column whose start is nearest at-or-left of `x`.
fn column_for(x_positions: &[i32], x: i32) -> usize {
    let mut col = 0usize;
    for (idx, &pos) in x_positions.iter().enumerate() {
        if x + COL_MERGE > pos {
            col = idx;
        } else {
            break;
        }
    }
    col
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn word(text: &str, x0: f32, y0: f32) -> Word {
        Word {
            text: text.to_string(),
            bbox: Rect::new(x0, y0, x0 + 8.0 * text.len() as f32, y0 + 10.0),
        }
    }

    fn page(words: Vec<Word>) -> PageContent {
        PageContent {
            index: 0,
            width: 612.0,
            height: 792.0,
            text: String::new(),
            words,
            shapes: vec![],
        }
    }

    #[test]
    fn test_recovers_grid_from_word_columns() {
        let p = page(vec![
            word("Correct", 20.0, 20.0),
            word("Responses", 80.0, 20.0),
            word("42", 220.0, 20.0),
            word("100", 300.0, 20.0),
            word("Errors", 20.0, 40.0),
            word("2", 220.0, 40.0),
            word("98", 300.0, 40.0),
        ]);
        let grids = StreamStrategy::new().attempt(&p);
        assert_eq!(grids.len(), 1);
        let grid = &grids[0];
        assert_eq!(grid.rows.len(), 2);
        // "Responses" starts at an unsupported column position and folds
        // into the label column.
        assert_eq!(grid.rows[0][0], "Correct Responses");
        assert_eq!(grid.rows[0][1], "42");
        assert_eq!(grid.rows[0][2], "100");
        assert_eq!(grid.rows[1][0], "Errors");
        assert_eq!(grid.rows[1][1], "2");
    }

    #[test]
    fn test_too_few_words_no_grid() {
        let p = page(vec![word("only", 10.0, 10.0), word("three", 50.0, 10.0)]);
        assert!(StreamStrategy::new().attempt(&p).is_empty());
    }

    #[test]
    fn test_single_row_no_grid() {
        let p = page(vec![
            word("a", 10.0, 10.0),
            word("b", 100.0, 10.0),
            word("c", 200.0, 10.0),
            word("d", 300.0, 10.0),
        ]);
        assert!(StreamStrategy::new().attempt(&p).is_empty());
    }
}
