//! Table-extraction fallback.
//!
//! Used when the line parser produced no candidates for a page that the
//! page map says should contain tabular tests. Each page is offered to
//! an ordered list of pluggable grid strategies (ruling-line based, then
//! whitespace based); detected grids are matched against the known-test
//! vocabulary and walked row by row into candidate fields.
//!
//! First-successful-strategy wins at the grid level: once any grid has
//! yielded a candidate for a (test, metric, sub-part) key, later grids
//! and engines do not overwrite it. Final arbitration across strategies
//! remains completeness-based in reconciliation.

pub mod identify;
pub mod lattice;
pub mod stream;

pub use identify::{identify_test, Identification};
pub use lattice::LatticeStrategy;
pub use stream::StreamStrategy;

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::records::{CandidateField, ExtractionWarning, ScoreValue, StrategyKind};
use crate::reader::PageContent;

/// A detected grid of cell strings, rows top-to-bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    /// Cell text per row
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    /// Number of columns in the widest row.
    pub fn num_cols(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// The first cell of each row.
    pub fn first_column(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(|r| r.first().map(|c| c.as_str()))
    }
}

/// A pluggable grid-detection engine.
pub trait GridStrategy {
    /// Engine name for logs.
    fn name(&self) -> &'static str;

    /// Which strategy kind the engine's candidates carry.
    fn kind(&self) -> StrategyKind;

    /// Detect zero or more grids on a page.
    fn attempt(&self, page: &PageContent) -> Vec<Grid>;
}

/// The default engine order: ruling lines first, whitespace second.
pub fn default_strategies() -> Vec<Box<dyn GridStrategy>> {
    vec![Box::new(LatticeStrategy::new()), Box::new(StreamStrategy::new())]
}

lazy_static! {
    static ref SUB_PART_CELL: Regex = Regex::new(r"^Part\s+(\d+)$").unwrap();
    static ref NUMERIC_CELL: Regex = Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap();
}

/// Extract candidate fields from one page via the fallback engines.
///
/// `expected_tests` is the page's entry in the page map, already
/// filtered to tests still missing. Ambiguous identifications and other
/// degraded handling are appended to `warnings`.
pub fn extract_page_tables(
    config: &ExtractionConfig,
    page: &PageContent,
    expected_tests: &[String],
    strategies: &[Box<dyn GridStrategy>],
    warnings: &mut Vec<ExtractionWarning>,
) -> Vec<CandidateField> {
    let mut fields: Vec<CandidateField> = Vec::new();
    let mut seen: HashSet<(String, String, Option<String>)> = HashSet::new();

    for strategy in strategies {
        let grids = strategy.attempt(page);
        log::debug!(
            "{}: {} grids on page {}",
            strategy.name(),
            grids.len(),
            page.index + 1
        );
        for grid in grids {
            if grid.rows.is_empty() || grid.num_cols() < 2 {
                continue;
            }
            if first_column_looks_numeric(&grid) {
                log::debug!(
                    "{}: discarding misaligned grid on page {} (numeric first column)",
                    strategy.name(),
                    page.index + 1
                );
                continue;
            }
            let identification = match identify_test(config, &grid, expected_tests) {
                Some(id) => id,
                None => continue,
            };
            if let Some(runner_up) = &identification.runner_up {
                log::warn!(
                    "Page {}: table also plausible for {} (chose {})",
                    page.index + 1,
                    runner_up,
                    identification.test
                );
                warnings.push(ExtractionWarning::AmbiguousTable {
                    page: page.index,
                    chosen: identification.test.clone(),
                    runner_up: runner_up.clone(),
                });
            }
            collect_grid_fields(
                config,
                &grid,
                &identification.test,
                strategy.kind(),
                page.index,
                &mut seen,
                &mut fields,
            );
        }
    }

    fields
}

/// A grid whose first column is mostly numeric is a misaligned
/// extraction (the label column was lost) and must be discarded.
fn first_column_looks_numeric(grid: &Grid) -> bool {
    let mut non_empty = 0usize;
    let mut numeric = 0usize;
    for cell in grid.first_column() {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        non_empty += 1;
        if NUMERIC_CELL.is_match(cell) {
            numeric += 1;
        }
    }
    non_empty > 0 && numeric * 2 >= non_empty
}

/// Column positions for (raw, standard, percentile) within a grid row.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ValueColumns {
    raw: usize,
    standard: usize,
    percentile: usize,
}

impl Default for ValueColumns {
    fn default() -> Self {
        // Fixed vendor layout: metric, score, standard, percentile.
        Self {
            raw: 1,
            standard: 2,
            percentile: 3,
        }
    }
}

/// Sniff header keywords in the first rows to relocate value columns.
fn sniff_value_columns(grid: &Grid) -> ValueColumns {
    let mut columns = ValueColumns::default();
    for row in grid.rows.iter().take(3) {
        let mut found = false;
        for (idx, cell) in row.iter().enumerate() {
            match cell.trim().to_ascii_lowercase().as_str() {
                "score" | "patient score" => {
                    columns.raw = idx;
                    found = true;
                }
                "standard" | "standard score" => {
                    columns.standard = idx;
                    found = true;
                }
                "percentile" | "percentile rank" => {
                    columns.percentile = idx;
                    found = true;
                }
                _ => {}
            }
        }
        if found {
            break;
        }
    }
    columns
}

fn collect_grid_fields(
    config: &ExtractionConfig,
    grid: &Grid,
    test: &str,
    kind: StrategyKind,
    page: usize,
    seen: &mut HashSet<(String, String, Option<String>)>,
    fields: &mut Vec<CandidateField>,
) {
    let columns = sniff_value_columns(grid);
    let mut sub_part: Option<String> = None;
    let multi_part = test == config.multi_part_test;

    for row in &grid.rows {
        let first = match row.first() {
            Some(cell) => cell.trim(),
            None => continue,
        };

        if multi_part {
            if let Some(caps) = row
                .iter()
                .find_map(|cell| SUB_PART_CELL.captures(cell.trim()))
            {
                sub_part = Some(format!("Part {}", &caps[1]));
                continue;
            }
        }

        let metric = match config.match_metric(test, first) {
            Some(metric) => metric.to_string(),
            None => continue,
        };

        let key = (test.to_string(), metric.clone(), sub_part.clone());
        if seen.contains(&key) {
            continue;
        }

        let value_at = |idx: usize| {
            row.get(idx)
                .map(|c| ScoreValue::parse(c))
                .unwrap_or(ScoreValue::NotApplicable)
        };
        let field = CandidateField {
            test_name: test.to_string(),
            metric_name: metric,
            sub_part: sub_part.clone(),
            raw_score: value_at(columns.raw),
            standard_score: value_at(columns.standard),
            percentile: value_at(columns.percentile),
            strategy: kind,
            page,
        };
        if field.completeness() == 0 {
            continue;
        }
        seen.insert(key);
        fields.push(field);
    }
}
