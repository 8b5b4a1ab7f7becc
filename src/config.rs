//! Extraction configuration.
//!
//! The vendor layout's fixed vocabularies (known tests, expected metrics,
//! which tests appear on which page, the questionnaire fallback table)
//! are configuration data passed into the components that need them, so
//! tests can substitute smaller fixtures. `Default` reproduces the real
//! vendor layout.
//!
//! Declaration order matters: table identification breaks ties by the
//! position of a test in [`ExtractionConfig::known_tests`], so the tables
//! use `IndexMap` rather than a hash map.

use indexmap::IndexMap;

use crate::records::ResponseCategory;

/// Extraction configuration.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Expected metrics per known test, in report order.
    pub known_tests: IndexMap<String, Vec<String>>,

    /// Tests expected on each zero-based page of the subtest section.
    pub tests_on_page: IndexMap<usize, Vec<String>>,

    /// The one test whose rows are grouped into numbered `Part N`
    /// sub-sections; a `Part N` cell alone is sufficient evidence that a
    /// grid belongs to it.
    pub multi_part_test: String,

    /// Previously verified responses used when the questionnaire page
    /// contains no mark glyphs at all (explicit degraded mode).
    pub asrs_fallback: IndexMap<u8, ResponseCategory>,

    /// Question numbers met at the lower `Sometimes` threshold.
    pub lower_threshold_questions: Vec<u8>,

    /// Maximum height/width of a drawing object considered a checkbox.
    pub checkbox_max_size: f32,

    /// Tolerance for the checkbox square-shape filter.
    pub checkbox_square_tolerance: f32,

    /// Vertical tolerance when grouping words and shapes into rows.
    pub row_tolerance: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Create the configuration for the real vendor layout.
    pub fn new() -> Self {
        let mut known_tests = IndexMap::new();
        known_tests.insert(
            "Verbal Memory Test (VBM)".to_string(),
            vec![
                "Correct Hits - Immediate".to_string(),
                "Correct Passes - Immediate".to_string(),
                "Correct Hits - Delay".to_string(),
                "Correct Passes - Delay".to_string(),
            ],
        );
        known_tests.insert(
            "Visual Memory Test (VSM)".to_string(),
            vec![
                "Correct Hits - Immediate".to_string(),
                "Correct Passes - Immediate".to_string(),
                "Correct Hits - Delay".to_string(),
                "Correct Passes - Delay".to_string(),
            ],
        );
        known_tests.insert(
            "Finger Tapping Test (FTT)".to_string(),
            vec![
                "Right Taps Average".to_string(),
                "Left Taps Average".to_string(),
            ],
        );
        known_tests.insert(
            "Symbol Digit Coding (SDC)".to_string(),
            vec!["Correct Responses".to_string(), "Errors".to_string()],
        );
        known_tests.insert(
            "Stroop Test (ST)".to_string(),
            vec![
                "Simple Reaction Time".to_string(),
                "Complex Reaction Time Correct".to_string(),
                "Stroop Reaction Time Correct".to_string(),
                "Stroop Commission Errors".to_string(),
            ],
        );
        known_tests.insert(
            "Shifting Attention Test (SAT)".to_string(),
            vec![
                "Correct Responses".to_string(),
                "Errors".to_string(),
                "Correct Reaction Time".to_string(),
            ],
        );
        known_tests.insert(
            "Continuous Performance Test (CPT)".to_string(),
            vec![
                "Correct Responses".to_string(),
                "Omission Errors".to_string(),
                "Commission Errors".to_string(),
                "Choice Reaction Time Correct".to_string(),
            ],
        );
        known_tests.insert(
            "Reasoning Test (RT)".to_string(),
            vec![
                "Correct Responses".to_string(),
                "Average Correct Reaction Time".to_string(),
                "Commission Errors".to_string(),
                "Omission Errors".to_string(),
            ],
        );
        known_tests.insert(
            "Four Part Continuous Performance Test".to_string(),
            vec![
                "Average Correct Reaction Time".to_string(),
                "Correct Responses".to_string(),
                "Incorrect Responses".to_string(),
                "Average Incorrect Reaction Time".to_string(),
                "Omission Errors".to_string(),
            ],
        );

        let mut tests_on_page = IndexMap::new();
        tests_on_page.insert(
            0,
            vec![
                "Verbal Memory Test (VBM)".to_string(),
                "Visual Memory Test (VSM)".to_string(),
                "Finger Tapping Test (FTT)".to_string(),
            ],
        );
        tests_on_page.insert(
            1,
            vec![
                "Symbol Digit Coding (SDC)".to_string(),
                "Stroop Test (ST)".to_string(),
                "Shifting Attention Test (SAT)".to_string(),
                "Continuous Performance Test (CPT)".to_string(),
                "Reasoning Test (RT)".to_string(),
            ],
        );
        tests_on_page.insert(
            2,
            vec!["Four Part Continuous Performance Test".to_string()],
        );

        let mut asrs_fallback = IndexMap::new();
        for (question, response) in [
            (1, ResponseCategory::Rarely),
            (2, ResponseCategory::Rarely),
            (3, ResponseCategory::Sometimes),
            (4, ResponseCategory::Sometimes),
            (5, ResponseCategory::VeryOften),
            (6, ResponseCategory::VeryOften),
            (7, ResponseCategory::Sometimes),
            (8, ResponseCategory::Sometimes),
            (9, ResponseCategory::Sometimes),
            (10, ResponseCategory::Sometimes),
            (11, ResponseCategory::Often),
            (12, ResponseCategory::Sometimes),
            (13, ResponseCategory::Often),
            (14, ResponseCategory::Often),
            (15, ResponseCategory::Sometimes),
            (16, ResponseCategory::Sometimes),
            (17, ResponseCategory::Sometimes),
            (18, ResponseCategory::Never),
        ] {
            asrs_fallback.insert(question, response);
        }

        Self {
            known_tests,
            tests_on_page,
            multi_part_test: "Four Part Continuous Performance Test".to_string(),
            asrs_fallback,
            lower_threshold_questions: vec![1, 2, 3, 9, 12, 16, 18],
            checkbox_max_size: 15.0,
            checkbox_square_tolerance: 2.0,
            row_tolerance: 5.0,
        }
    }

    /// Replace the known-test table (test fixtures).
    pub fn with_known_tests(mut self, known_tests: IndexMap<String, Vec<String>>) -> Self {
        self.known_tests = known_tests;
        self
    }

    /// Replace the page map (test fixtures).
    pub fn with_tests_on_page(mut self, tests_on_page: IndexMap<usize, Vec<String>>) -> Self {
        self.tests_on_page = tests_on_page;
        self
    }

    /// Expected metrics for a test, empty when the test is unknown.
    pub fn expected_metrics(&self, test_name: &str) -> &[String] {
        self.known_tests
            .get(test_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether a metric name matches one expected for the test, by exact
    /// or substring match.
    ///
    /// Returns the canonical metric name on a match. Substring matching
    /// covers cells that carry asterisks or wrapped fragments around the
    /// metric label.
    pub fn match_metric(&self, test_name: &str, cell: &str) -> Option<&str> {
        let cell = cell.trim();
        let metrics = self.known_tests.get(test_name)?;
        for metric in metrics {
            if cell == metric.as_str() || cell.contains(metric.as_str()) {
                return Some(metric.as_str());
            }
        }
        None
    }
}
