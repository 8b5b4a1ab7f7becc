//! NPQ questionnaire extraction.
//!
//! The NPQ section groups questions under per-domain headers. The
//! vendor's layout splits a question across lines: a bare question
//! number, then one or more text lines, then a `score - severity` line
//! that closes the question. A small state machine walks the section's
//! lines, switching domains on header lines and accumulating question
//! text between the number and the severity line.

use lazy_static::lazy_static;
use regex::Regex;

use crate::records::{NpqDomainScore, NpqItem};

/// Domain question headers mapped to stored domain names. Headers must
/// match the report text exactly.
const DOMAIN_HEADERS: [(&str, &str); 28] = [
    ("Attention Questions", "Attention"),
    ("Impulsive Questions", "Impulsive"),
    ("Learning Questions", "Learning"),
    ("Memory Questions", "Memory"),
    ("Anxiety Questions", "Anxiety"),
    ("Panic Questions", "Panic"),
    ("Agoraphobia Questions", "Agoraphobia"),
    ("Obsessions & Compulsions Questions", "Obsessions & Compulsions"),
    ("Social Anxiety Questions", "Social Anxiety"),
    ("Depression Questions", "Depression"),
    ("Mood Stability Questions", "Mood Stability"),
    ("Mania Questions", "Mania"),
    ("Aggression Questions", "Aggression"),
    ("Psychotic Questions", "Psychotic"),
    ("Somatic Questions", "Somatic"),
    ("Fatigue Questions", "Fatigue"),
    ("Sleep Questions", "Sleep"),
    ("Suicide Questions", "Suicide"),
    ("Pain Questions", "Pain"),
    ("Substance Abuse Questions", "Substance Abuse"),
    ("PTSD Questions", "PTSD"),
    ("Bipolar Questions", "Bipolar"),
    ("Autism Questions", "Autism"),
    ("Asperger's Questions", "Asperger's"),
    ("ADHD Questions", "ADHD"),
    ("MCI Questions", "MCI"),
    ("Concussion Questions", "Concussion"),
    ("Anxiety/Depression Questions", "Anxiety/Depression"),
];

lazy_static! {
    static ref QUESTION_NUMBER: Regex = Regex::new(r"^(\d{1,2})$").unwrap();
    static ref SEVERITY_LINE: Regex = Regex::new(r"^\s*(\d)\s*-\s*(.*)$").unwrap();
    // Summary table row under the "Domain Score Severity" header.
    static ref DOMAIN_SUMMARY_ROW: Regex = Regex::new(
        r"^(.+?)\s+(\d{1,3})\s+(Not a problem|A mild problem|A moderate problem|A severe problem|Mild|Moderate|Severe)$"
    )
    .unwrap();
}

#[derive(Debug, Default)]
struct OpenQuestion {
    number: u32,
    text: String,
}

/// Extract NPQ question records from the section's pages.
pub fn extract_npq(pages: &[crate::reader::PageContent]) -> Vec<NpqItem> {
    let mut items = Vec::new();
    let mut current_domain: Option<&'static str> = None;
    let mut open: Option<OpenQuestion> = None;

    for page in pages {
        for line in page.text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(&(_, domain)) = DOMAIN_HEADERS.iter().find(|(header, _)| line == *header) {
                log::debug!("NPQ domain: {domain}");
                current_domain = Some(domain);
                open = None;
                continue;
            }

            let domain = match current_domain {
                Some(d) => d,
                None => continue,
            };

            if let Some(caps) = QUESTION_NUMBER.captures(line) {
                open = caps[1].parse().ok().map(|number| OpenQuestion {
                    number,
                    text: String::new(),
                });
                continue;
            }

            if let Some(caps) = SEVERITY_LINE.captures(line) {
                if let Some(question) = open.take() {
                    let score: u8 = caps[1].parse().unwrap_or(0);
                    items.push(NpqItem {
                        domain: domain.to_string(),
                        question: question.number,
                        text: question.text.trim().to_string(),
                        score,
                        severity: caps[2].trim().to_string(),
                    });
                }
                continue;
            }

            if let Some(question) = open.as_mut() {
                if !question.text.is_empty() {
                    question.text.push(' ');
                }
                question.text.push_str(line);
            }
        }
    }

    log::info!("Extracted {} NPQ questions", items.len());
    items
}

/// Extract the per-domain summary rows (`Domain Score Severity` table).
///
/// Only rows whose label is a known NPQ domain are accepted; the score
/// column sits between the label and the printed severity band.
pub fn extract_npq_domain_scores(pages: &[crate::reader::PageContent]) -> Vec<NpqDomainScore> {
    let mut scores = Vec::new();
    for page in pages {
        for line in page.text.lines() {
            let caps = match DOMAIN_SUMMARY_ROW.captures(line.trim()) {
                Some(caps) => caps,
                None => continue,
            };
            let domain = caps[1].trim();
            if !DOMAIN_HEADERS.iter().any(|(_, name)| *name == domain) {
                continue;
            }
            let score: u32 = match caps[2].parse() {
                Ok(score) => score,
                Err(_) => continue,
            };
            scores.push(NpqDomainScore {
                domain: domain.to_string(),
                score,
                severity: caps[3].to_string(),
            });
        }
    }
    log::info!("Extracted {} NPQ domain scores", scores.len());
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::PageContent;

    #[test]
    fn test_extracts_questions_under_domains() {
        let text = "\
Attention Questions
1
I have trouble paying
attention to things
2 - Moderate
2
I am easily distracted
3 - Severe
Memory Questions
14
I forget appointments
1 - Mild
";
        let pages = vec![PageContent::from_text(5, text)];
        let items = extract_npq(&pages);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].domain, "Attention");
        assert_eq!(items[0].question, 1);
        assert_eq!(items[0].text, "I have trouble paying attention to things");
        assert_eq!(items[0].score, 2);
        assert_eq!(items[0].severity, "Moderate");
        assert_eq!(items[2].domain, "Memory");
        assert_eq!(items[2].question, 14);
    }

    #[test]
    fn test_lines_before_first_header_ignored() {
        let text = "\
5
stray line
2 - Moderate
";
        let pages = vec![PageContent::from_text(0, text)];
        assert!(extract_npq(&pages).is_empty());
    }

    #[test]
    fn test_domain_switch_abandons_open_question() {
        let text = "\
Attention Questions
3
unfinished question text
Memory Questions
4
I forget names
0 - None
";
        let pages = vec![PageContent::from_text(0, text)];
        let items = extract_npq(&pages);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].question, 4);
        assert_eq!(items[0].domain, "Memory");
    }

    #[test]
    fn test_severity_without_open_question_ignored() {
        let text = "\
Attention Questions
2 - Moderate
";
        let pages = vec![PageContent::from_text(0, text)];
        assert!(extract_npq(&pages).is_empty());
    }

    #[test]
    fn test_domain_summary_rows_extracted() {
        let text = "\
NeuroPsych Questionnaire
Domain Score Severity
Attention 52 A moderate problem
Memory 18 Mild
Sleep 70 A severe problem
";
        let pages = vec![PageContent::from_text(0, text)];
        let scores = extract_npq_domain_scores(&pages);
        assert_eq!(scores.len(), 3);
        assert_eq!(scores[0].domain, "Attention");
        assert_eq!(scores[0].score, 52);
        assert_eq!(scores[0].severity, "A moderate problem");
        assert_eq!(scores[1].severity, "Mild");
    }

    #[test]
    fn test_unknown_domain_rows_rejected() {
        let text = "Totally Unknown Domain 52 A moderate problem\n";
        let pages = vec![PageContent::from_text(0, text)];
        assert!(extract_npq_domain_scores(&pages).is_empty());
    }
}
