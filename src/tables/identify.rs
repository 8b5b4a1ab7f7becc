//! Test identification for detected grids.
//!
//! A grid rarely carries the test name in a dedicated cell, so
//! identification is a two-step heuristic: a direct name mention
//! anywhere in the grid wins outright; otherwise the expected tests are
//! scored by how many of their known metric names appear in the grid's
//! first column (exact matches score double), highest count winning with
//! ties broken by declaration order. The runner-up is reported so
//! ambiguous grids can be audited.

use lazy_static::lazy_static;
use regex::Regex;

use super::Grid;
use crate::config::ExtractionConfig;

lazy_static! {
    static ref PART_LABEL: Regex = Regex::new(r"^Part\s+\d+$").unwrap();
}

/// The outcome of identifying a grid's test.
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    /// The winning test
    pub test: String,
    /// The next-best test with any evidence, when one exists
    pub runner_up: Option<String>,
}

/// Identify which expected test a grid belongs to.
///
/// Returns `None` when no expected test has any evidence in the grid.
pub fn identify_test(
    config: &ExtractionConfig,
    grid: &Grid,
    expected_tests: &[String],
) -> Option<Identification> {
    // Direct test-name mention anywhere in the grid wins outright.
    for test in expected_tests {
        for row in &grid.rows {
            for cell in row {
                let cell = cell.trim();
                if cell == test.as_str() || cell.contains(test.as_str()) {
                    return Some(Identification {
                        test: test.clone(),
                        runner_up: None,
                    });
                }
            }
        }
    }

    // A `Part N` label is sufficient evidence for the one test with
    // numbered sub-parts.
    if expected_tests.contains(&config.multi_part_test)
        && grid
            .rows
            .iter()
            .flatten()
            .any(|cell| PART_LABEL.is_match(cell.trim()))
    {
        return Some(Identification {
            test: config.multi_part_test.clone(),
            runner_up: None,
        });
    }

    // Score by metric-name evidence in the first column.
    let mut scores: Vec<(String, u32)> = Vec::new();
    for test in expected_tests {
        let mut score = 0u32;
        for metric in config.expected_metrics(test) {
            for cell in grid.first_column() {
                let cell = cell.trim();
                if cell == metric.as_str() {
                    score += 2;
                    break;
                } else if cell.contains(metric.as_str()) {
                    score += 1;
                    break;
                }
            }
        }
        scores.push((test.clone(), score));
    }

    // Highest score wins; the ordering of `expected_tests` (declaration
    // order) breaks ties because only strictly greater scores replace
    // the current best.
    let mut best: Option<(String, u32)> = None;
    let mut runner_up: Option<(String, u32)> = None;
    for (test, score) in scores {
        if score == 0 {
            continue;
        }
        match &best {
            Some((_, best_score)) if score <= *best_score => {
                if runner_up.as_ref().map_or(true, |(_, r)| score > *r) {
                    runner_up = Some((test, score));
                }
            }
            _ => {
                runner_up = best.take();
                best = Some((test, score));
            }
        }
    }

    best.map(|(test, _)| Identification {
        test,
        runner_up: runner_up.map(|(t, _)| t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn expected() -> Vec<String> {
        vec![
            "Symbol Digit Coding (SDC)".to_string(),
            "Stroop Test (ST)".to_string(),
            "Shifting Attention Test (SAT)".to_string(),
        ]
    }

    #[test]
    fn test_direct_name_mention_wins() {
        let config = ExtractionConfig::default();
        let g = grid(&[
            &["Stroop Test (ST)", ""],
            &["Simple Reaction Time", "251"],
        ]);
        let id = identify_test(&config, &g, &expected()).unwrap();
        assert_eq!(id.test, "Stroop Test (ST)");
        assert_eq!(id.runner_up, None);
    }

    #[test]
    fn test_metric_evidence_scoring() {
        let config = ExtractionConfig::default();
        let g = grid(&[
            &["Simple Reaction Time", "251", "97", "42"],
            &["Stroop Reaction Time Correct", "612", "99", "48"],
        ]);
        let id = identify_test(&config, &g, &expected()).unwrap();
        assert_eq!(id.test, "Stroop Test (ST)");
    }

    #[test]
    fn test_tie_broken_by_declaration_order() {
        let config = ExtractionConfig::default();
        // "Correct Responses" and "Errors" are metrics of both SDC and
        // SAT; SDC is declared first in the expected list.
        let g = grid(&[
            &["Correct Responses", "42", "100", "55"],
            &["Errors", "2", "98", "45"],
        ]);
        let id = identify_test(&config, &g, &expected()).unwrap();
        assert_eq!(id.test, "Symbol Digit Coding (SDC)");
        assert_eq!(id.runner_up.as_deref(), Some("Shifting Attention Test (SAT)"));
    }

    #[test]
    fn test_part_label_identifies_multi_part_test() {
        let config = ExtractionConfig::default();
        let g = grid(&[&["Part 2", ""], &["something", "1"]]);
        let tests = vec![config.multi_part_test.clone()];
        let id = identify_test(&config, &g, &tests).unwrap();
        assert_eq!(id.test, config.multi_part_test);
    }

    #[test]
    fn test_no_evidence_returns_none() {
        let config = ExtractionConfig::default();
        let g = grid(&[&["nothing relevant", "here"]]);
        assert!(identify_test(&config, &g, &expected()).is_none());
    }
}
