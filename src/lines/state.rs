//! The row-parsing state machine.
//!
//! Walks classified lines of a scores section and emits one
//! [`CandidateField`] per data row, tracking the current test and the
//! current `Part N` sub-part. The state is an explicit tagged enum and
//! each transition is a pure function of (state, line class), so
//! transitions are unit-testable without file I/O.
//!
//! Transitions:
//!
//! ```text
//! SeekingTest --TestHeader--> ParsingRows
//! ParsingRows --DataRow-----> ParsingRows   (emits a field)
//! ParsingRows --SubPart-----> ParsingRows   (updates the sub-part)
//! ParsingRows --MixedRow----> SeekingTest   (emits the final field)
//! ParsingRows --Prose-------> SeekingTest
//! ParsingRows --TestHeader--> ParsingRows   (new test, sub-part reset)
//! ```
//!
//! Once a test's row set is left there is no transition back into it.

use super::classify::LineClass;
use crate::config::ExtractionConfig;
use crate::records::{CandidateField, ScoreValue, StrategyKind};

/// Parser state.
#[derive(Debug, Clone, PartialEq)]
pub enum RowState {
    /// No current test; data rows are ignored.
    SeekingTest,
    /// Inside a test's tabular region.
    ParsingRows {
        /// The current test, canonicalized against the known-test table
        test: String,
        /// The current `Part N` label, for multi-part tests
        sub_part: Option<String>,
    },
}

/// Streaming row parser for one page of a scores section.
pub struct RowParser<'a> {
    config: &'a ExtractionConfig,
    state: RowState,
    page: usize,
    invalid_tests: Vec<String>,
}

impl<'a> RowParser<'a> {
    /// Create a parser for one page.
    pub fn new(config: &'a ExtractionConfig, page: usize) -> Self {
        Self {
            config,
            state: RowState::SeekingTest,
            page,
            invalid_tests: Vec::new(),
        }
    }

    /// Current state, for transition tests.
    pub fn state(&self) -> &RowState {
        &self.state
    }

    /// Tests whose headers carried an `Invalid` / `Possibly Invalid`
    /// note, in encounter order.
    pub fn invalid_tests(&self) -> &[String] {
        &self.invalid_tests
    }

    /// Feed one classified line; returns the emitted field, if any.
    pub fn step(&mut self, class: LineClass) -> Option<CandidateField> {
        match (&self.state, class) {
            (_, LineClass::TestHeader { name, invalid }) => {
                let test = canonical_test_name(self.config, &name);
                log::debug!("Entering test region: {test}");
                if invalid && !self.invalid_tests.contains(&test) {
                    log::warn!("Test flagged invalid in header: {test}");
                    self.invalid_tests.push(test.clone());
                }
                self.state = RowState::ParsingRows {
                    test,
                    sub_part: None,
                };
                None
            }
            (RowState::ParsingRows { test, sub_part }, LineClass::DataRow { label, values }) => {
                Some(self.field(test.clone(), sub_part.clone(), label, values))
            }
            (RowState::ParsingRows { test, sub_part }, LineClass::MixedRow { label, values }) => {
                // Trailing prose marks the end of this test's rows.
                let field = self.field(test.clone(), sub_part.clone(), label, values);
                self.state = RowState::SeekingTest;
                Some(field)
            }
            (RowState::ParsingRows { test, .. }, LineClass::SubPart(part)) => {
                let test = test.clone();
                log::debug!("Entering {part} of {test}");
                self.state = RowState::ParsingRows {
                    test,
                    sub_part: Some(part),
                };
                None
            }
            (RowState::ParsingRows { .. }, LineClass::Prose) => {
                self.state = RowState::SeekingTest;
                None
            }
            _ => None,
        }
    }

    fn field(
        &self,
        test: String,
        sub_part: Option<String>,
        label: String,
        values: [ScoreValue; 3],
    ) -> CandidateField {
        let [raw_score, standard_score, percentile] = values;
        CandidateField {
            test_name: test,
            metric_name: label,
            sub_part,
            raw_score,
            standard_score,
            percentile,
            strategy: StrategyKind::LineParser,
            page: self.page,
        }
    }
}

/// Canonicalize a printed test header against the known-test table.
///
/// Vendor headers vary slightly between report revisions (`Symbol Digit
/// Coding Test (SDC)` vs `Symbol Digit Coding (SDC)`); a header that
/// contains a known test's name resolves to that table key so that all
/// strategies produce the same grouping keys. Unknown headers are kept
/// as printed.
pub fn canonical_test_name(config: &ExtractionConfig, header: &str) -> String {
    if config.known_tests.contains_key(header) {
        return header.to_string();
    }
    // Longest matching base wins: "Continuous Performance Test" is a
    // substring of the four-part test's header and must not capture it.
    let mut best: Option<(&String, usize)> = None;
    for known in config.known_tests.keys() {
        let base = known.split(" (").next().unwrap_or(known);
        if header.contains(base) && best.map_or(true, |(_, len)| base.len() > len) {
            best = Some((known, base.len()));
        }
    }
    match best {
        Some((known, _)) => known.clone(),
        None => header.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ExtractionConfig {
        ExtractionConfig::default()
    }

    fn data_row(label: &str, a: f64, b: f64, c: f64) -> LineClass {
        LineClass::DataRow {
            label: label.to_string(),
            values: [
                ScoreValue::Number(a),
                ScoreValue::Number(b),
                ScoreValue::Number(c),
            ],
        }
    }

    fn header(name: &str) -> LineClass {
        LineClass::TestHeader {
            name: name.to_string(),
            invalid: false,
        }
    }

    #[test]
    fn test_starts_seeking() {
        let cfg = config();
        let parser = RowParser::new(&cfg, 0);
        assert_eq!(*parser.state(), RowState::SeekingTest);
    }

    #[test]
    fn test_data_row_without_test_is_ignored() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 0);
        assert!(parser.step(data_row("Correct Responses", 1.0, 2.0, 3.0)).is_none());
        assert_eq!(*parser.state(), RowState::SeekingTest);
    }

    #[test]
    fn test_header_then_row_emits_field() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 1);
        parser.step(header("Symbol Digit Coding (SDC)"));
        let field = parser
            .step(data_row("Correct Responses", 42.0, 100.0, 55.0))
            .unwrap();
        assert_eq!(field.test_name, "Symbol Digit Coding (SDC)");
        assert_eq!(field.metric_name, "Correct Responses");
        assert_eq!(field.raw_score, ScoreValue::Number(42.0));
        assert_eq!(field.standard_score, ScoreValue::Number(100.0));
        assert_eq!(field.percentile, ScoreValue::Number(55.0));
        assert_eq!(field.page, 1);
        assert_eq!(field.strategy, StrategyKind::LineParser);
    }

    #[test]
    fn test_mixed_row_emits_then_leaves_region() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 0);
        parser.step(header("Finger Tapping Test (FTT)"));
        let field = parser
            .step(LineClass::MixedRow {
                label: "Left Taps Average".to_string(),
                values: [
                    ScoreValue::Number(58.0),
                    ScoreValue::Number(102.0),
                    ScoreValue::Number(55.0),
                ],
            })
            .unwrap();
        assert_eq!(field.metric_name, "Left Taps Average");
        assert_eq!(*parser.state(), RowState::SeekingTest);
    }

    #[test]
    fn test_prose_leaves_region_without_emitting() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 0);
        parser.step(header("Stroop Test (ST)"));
        assert!(parser.step(LineClass::Prose).is_none());
        assert_eq!(*parser.state(), RowState::SeekingTest);
    }

    #[test]
    fn test_sub_part_tracked_and_reset_on_new_test() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 2);
        parser.step(header("Four Part Continuous Performance Test (FPCPT)"));
        parser.step(LineClass::SubPart("Part 2".into()));
        let field = parser
            .step(data_row("Incorrect Responses", 0.0, 95.0, 40.0))
            .unwrap();
        assert_eq!(field.sub_part.as_deref(), Some("Part 2"));

        parser.step(header("Stroop Test (ST)"));
        let field = parser
            .step(data_row("Simple Reaction Time", 250.0, 98.0, 45.0))
            .unwrap();
        assert_eq!(field.sub_part, None);
    }

    #[test]
    fn test_invalid_header_recorded() {
        let cfg = config();
        let mut parser = RowParser::new(&cfg, 0);
        parser.step(LineClass::TestHeader {
            name: "Shifting Attention Test (SAT)".to_string(),
            invalid: true,
        });
        assert_eq!(parser.invalid_tests(), ["Shifting Attention Test (SAT)"]);
        // A second invalid header for the same test is not duplicated.
        parser.step(LineClass::TestHeader {
            name: "Shifting Attention Test (SAT)".to_string(),
            invalid: true,
        });
        assert_eq!(parser.invalid_tests().len(), 1);
    }

    #[test]
    fn test_canonical_test_name() {
        let cfg = config();
        assert_eq!(
            canonical_test_name(&cfg, "Symbol Digit Coding Test (SDC)"),
            "Symbol Digit Coding (SDC)"
        );
        assert_eq!(
            canonical_test_name(&cfg, "Verbal Memory Test (VBM)"),
            "Verbal Memory Test (VBM)"
        );
        assert_eq!(
            canonical_test_name(&cfg, "Four Part Continuous Performance Test (FPCPT)"),
            "Four Part Continuous Performance Test"
        );
        assert_eq!(canonical_test_name(&cfg, "Unlisted Test (UT)"), "Unlisted Test (UT)");
    }
}
