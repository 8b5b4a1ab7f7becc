//! Line-oriented field parsing.
//!
//! The primary extraction strategy for the scores sections: a streaming
//! state machine over section lines. Lines are classified
//! ([`classify::classify_line`]) and fed through the explicit
//! [`state::RowParser`] machine; data rows become [`CandidateField`]s
//! for the current test and sub-part.
//!
//! The domain-scores table uses a separate single-regex parser: its rows
//! carry a validity column and never nest under sub-parts.

pub mod classify;
pub mod state;

pub use classify::{classify_line, LineClass};
pub use state::{canonical_test_name, RowParser, RowState};

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::records::{CandidateField, DomainScore, ScoreValue};

/// The line parser's output for one page.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPage {
    /// Candidate fields emitted by the state machine
    pub fields: Vec<CandidateField>,
    /// Tests whose headers carried an invalidity note
    pub invalid_tests: Vec<String>,
}

/// Parse one page of the subtest section.
pub fn parse_subtest_page(config: &ExtractionConfig, page: usize, text: &str) -> ParsedPage {
    let mut parser = RowParser::new(config, page);
    let mut fields = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(field) = parser.step(classify_line(line)) {
            log::debug!(
                "Line parser: {} / {} on page {}",
                field.test_name,
                field.metric_name,
                page + 1
            );
            fields.push(field);
        }
    }
    let invalid_tests = parser.invalid_tests().to_vec();
    ParsedPage {
        fields,
        invalid_tests,
    }
}

lazy_static! {
    // Domain row: label, optional stray NA, patient score, standard
    // score, percentile, validity flag, optional trailing X marker.
    static ref DOMAIN_ROW: Regex = Regex::new(
        r"(?m)^(.*?)\s+(?:NA\s+)?(\d+|NA)\s+(\d+)\s+(\d+)\s+(Yes|No)\s*X?$"
    )
    .unwrap();
}

/// Parse the cognitive domain scores table from section text.
pub fn parse_domain_scores(text: &str) -> Vec<DomainScore> {
    let mut scores = Vec::new();
    for caps in DOMAIN_ROW.captures_iter(text) {
        let domain = caps[1].trim().to_string();
        if domain.is_empty() {
            continue;
        }
        scores.push(DomainScore {
            domain,
            patient_score: ScoreValue::parse(&caps[2]),
            standard_score: ScoreValue::parse(&caps[3]),
            percentile: ScoreValue::parse(&caps[4]),
            validity: Some(&caps[5] == "Yes"),
        });
    }
    scores
}
