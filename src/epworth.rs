//! Epworth Sleepiness Scale extraction.
//!
//! The Epworth section is plain text: one line per situation with a
//! question number, the situation text, and a `score - descriptor`
//! pair. The calculated total is cross-checked against the total the
//! report prints; a mismatch is logged and the calculated value wins
//! when all eight questions were found.

use lazy_static::lazy_static;
use regex::Regex;

use crate::records::{EpworthResponse, EpworthSummary};

lazy_static! {
    static ref RESPONSE_LINE: Regex =
        Regex::new(r"(?m)^\s*([1-8])\s+(.+?)\s+(\d)\s*-\s*(.+)$").unwrap();
    static ref REPORTED_TOTAL: Regex = Regex::new(r"Epworth Score\s*=\s*(\d+)").unwrap();
}

const QUESTION_COUNT: usize = 8;

/// Parse the Epworth section text. Returns `None` when the section
/// carries no recognizable responses or total.
pub fn extract_epworth(text: &str) -> Option<EpworthSummary> {
    // Latest line per question wins; the summary table repeats rows.
    let mut by_question: [Option<EpworthResponse>; QUESTION_COUNT] = Default::default();
    for caps in RESPONSE_LINE.captures_iter(text) {
        let question: u8 = caps[1].parse().ok()?;
        let score: u8 = caps[3].parse().ok()?;
        by_question[question as usize - 1] = Some(EpworthResponse {
            question,
            situation: caps[2].trim().to_string(),
            score,
            descriptor: caps[4].trim().to_string(),
        });
    }
    let responses: Vec<EpworthResponse> = by_question.into_iter().flatten().collect();

    let reported: Option<u32> = REPORTED_TOTAL
        .captures(text)
        .and_then(|caps| caps[1].parse().ok());

    if responses.is_empty() && reported.is_none() {
        return None;
    }

    let calculated: u32 = responses.iter().map(|r| u32::from(r.score)).sum();
    let total = if responses.len() == QUESTION_COUNT {
        if let Some(reported) = reported {
            if reported != calculated {
                log::warn!(
                    "Calculated Epworth total ({calculated}) does not match reported total ({reported})"
                );
            }
        }
        Some(calculated)
    } else {
        reported
    };

    Some(EpworthSummary {
        total,
        interpretation: interpret(total),
        responses,
    })
}

fn interpret(total: Option<u32>) -> String {
    let total = match total {
        Some(t) => t,
        None => return String::new(),
    };
    let band = match total {
        0..=5 => "Lower Normal Daytime Sleepiness",
        6..=10 => "Higher Normal Daytime Sleepiness",
        11..=15 => "Mild Excessive Daytime Sleepiness",
        16..=17 => "Moderate Excessive Daytime Sleepiness",
        _ => "Severe Excessive Daytime Sleepiness",
    };
    band.to_string()
}
