//! Line classification for the subtest section.
//!
//! Each line of a scores section falls into one of a small number of
//! classes; the state machine in [`super::state`] only sees the class,
//! never the raw regex captures, so every transition can be tested in
//! isolation.

use lazy_static::lazy_static;
use regex::Regex;

use crate::records::ScoreValue;

lazy_static! {
    /// A test header: free text ending in `Test (XX)` or `Index (XX)`,
    /// optionally followed by column headers and/or a validity note.
    static ref TEST_HEADER: Regex = Regex::new(
        r"^(.*?(?:Test|Index)\s+\([A-Z]{2,5}\))(?:\s*(?:Score\s+Standard\s+Percentile))?(?:\s*\(?(Invalid|Possibly Invalid)\)?)?$"
    )
    .unwrap();

    /// A strict data row: non-numeric label then exactly three
    /// numeric-or-placeholder tokens.
    static ref DATA_ROW: Regex = Regex::new(
        r"^([^0-9\n]{3,}?)\s+(-?\d+(?:\.\d+)?|-|NA)\s+(-?\d+(?:\.\d+)?|-|NA)\s+(-?\d+(?:\.\d+)?|-|NA)\s*$"
    )
    .unwrap();

    /// A data row with trailing prose: the prose signals the end of the
    /// tabular region for the current test.
    static ref MIXED_ROW: Regex = Regex::new(
        r"^([^0-9\n]{3,}?)\s+(-?\d+(?:\.\d+)?|-|NA)\s+(-?\d+(?:\.\d+)?|-|NA)\s+(-?\d+(?:\.\d+)?|-|NA)\s+([A-Za-z].*)$"
    )
    .unwrap();

    /// A numbered sub-part marker within a multi-part test.
    static ref SUB_PART: Regex = Regex::new(r"^Part\s+(\d+)$").unwrap();

    /// Descriptive prose that follows a test's rows.
    static ref PROSE: Regex = Regex::new(
        r"^(?:The\s+)?[A-Za-z]+\s+(?:test|memory|measures|is a)"
    )
    .unwrap();
}

/// The classification of one section line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineClass {
    /// A test header; carries the test name as printed and whether the
    /// header flagged the test invalid.
    TestHeader {
        /// Test name as printed
        name: String,
        /// Header carried an `Invalid` / `Possibly Invalid` note
        invalid: bool,
    },
    /// A `Part N` sub-part marker.
    SubPart(String),
    /// A label plus raw/standard/percentile values.
    DataRow {
        /// Metric label
        label: String,
        /// The three value columns
        values: [ScoreValue; 3],
    },
    /// A data row with trailing prose text.
    MixedRow {
        /// Metric label
        label: String,
        /// The three value columns
        values: [ScoreValue; 3],
    },
    /// Descriptive prose.
    Prose,
    /// Anything else; ignored by the state machine.
    Other,
}

/// Classify one trimmed line.
pub fn classify_line(line: &str) -> LineClass {
    if line.is_empty() {
        return LineClass::Other;
    }

    if let Some(caps) = SUB_PART.captures(line) {
        return LineClass::SubPart(format!("Part {}", &caps[1]));
    }

    // The SDC header sometimes lacks the strict `Test (XX)` shape; the
    // abbreviation in parentheses is enough.
    if line.contains("Symbol Digit Coding") && line.contains("(SDC)") {
        return LineClass::TestHeader {
            name: trim_header(line),
            invalid: line.contains("Invalid"),
        };
    }

    if let Some(caps) = TEST_HEADER.captures(line) {
        return LineClass::TestHeader {
            name: caps[1].trim().to_string(),
            invalid: caps.get(2).is_some(),
        };
    }

    // Mixed rows are checked before strict rows: a strict-row match on a
    // mixed line would swallow the prose tail.
    if let Some(caps) = MIXED_ROW.captures(line) {
        if let Some(label) = row_label(&caps[1]) {
            return LineClass::MixedRow {
                label,
                values: [
                    ScoreValue::parse(&caps[2]),
                    ScoreValue::parse(&caps[3]),
                    ScoreValue::parse(&caps[4]),
                ],
            };
        }
    }

    if let Some(caps) = DATA_ROW.captures(line) {
        if let Some(label) = row_label(&caps[1]) {
            return LineClass::DataRow {
                label,
                values: [
                    ScoreValue::parse(&caps[2]),
                    ScoreValue::parse(&caps[3]),
                    ScoreValue::parse(&caps[4]),
                ],
            };
        }
    }

    if PROSE.is_match(line) {
        return LineClass::Prose;
    }

    LineClass::Other
}

/// Validate and clean a captured row label.
///
/// Column-header words are not metric labels, and a label shorter than
/// three characters is noise from a misaligned extraction.
fn row_label(captured: &str) -> Option<String> {
    let label = captured.trim().trim_end_matches('*').trim().to_string();
    if label.len() < 3 {
        return None;
    }
    if matches!(
        label.to_ascii_lowercase().as_str(),
        "score" | "standard" | "percentile"
    ) {
        return None;
    }
    Some(label)
}

fn trim_header(line: &str) -> String {
    match line.find("(SDC)") {
        Some(idx) => line[..idx + "(SDC)".len()].trim().to_string(),
        None => line.trim().to_string(),
    }
}
