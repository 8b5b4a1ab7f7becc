//! Geometry-based questionnaire response location.
//!
//! The ASRS page is a checkbox grid with no extractable table structure:
//! the marked response for each question has to be recovered from word
//! and shape positions. Column centroids come from the response-category
//! header words when they are readable, from a clustered row of five
//! checkbox shapes otherwise, and from evenly spaced estimates as a last
//! resort. Each question row (a standalone 1-18 integer word) is then
//! matched against the `X` mark glyphs vertically aligned with it; the
//! mean mark position picks the nearest column.
//!
//! A question with no aligned mark becomes `Unknown` rather than failing
//! the run. A page with no mark glyphs at all falls back to the static
//! recorded-response table, an explicit, logged degraded mode.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::ExtractionConfig;
use crate::records::{
    AsrsPart, AsrsQuestion, ExtractionWarning, QuestionnaireResponse, ResponseCategory,
};
use crate::reader::{PageContent, Word};

lazy_static! {
    static ref STANDALONE_INT: Regex = Regex::new(r"^\d+$").unwrap();
    static ref QUESTION_TEXT: Regex = Regex::new(r"^(\d+)\s+(How often.+)$").unwrap();
}

/// How close a `Very` word must be to an `Often` word to form the
/// two-word `Very Often` header.
const VERY_OFTEN_GAP: f32 = 30.0;

/// Extract all questionnaire responses from the ASRS page.
pub fn extract_asrs(
    config: &ExtractionConfig,
    page: &PageContent,
    warnings: &mut Vec<ExtractionWarning>,
) -> Vec<QuestionnaireResponse> {
    let marks: Vec<&Word> = page.words.iter().filter(|w| w.text == "X").collect();

    if marks.is_empty() {
        log::warn!(
            "Page {}: no mark glyphs found; using recorded-response fallback table",
            page.index + 1
        );
        warnings.push(ExtractionWarning::AsrsStaticFallback);
        return config
            .asrs_fallback
            .iter()
            .map(|(&question, &response)| QuestionnaireResponse {
                question,
                part: AsrsPart::for_question(question),
                response,
            })
            .collect();
    }

    let columns = column_centroids(config, page, warnings);
    let questions = question_rows(page);

    let mut responses = Vec::with_capacity(questions.len());
    for question in &questions {
        let aligned: Vec<&&Word> = marks
            .iter()
            .filter(|mark| question.bbox.spans_y(mark.bbox.y_center()))
            .collect();

        let response = if aligned.is_empty() {
            log::debug!("Question {}: no aligned mark", question.number);
            warnings.push(ExtractionWarning::UnknownResponse {
                question: question.number,
            });
            ResponseCategory::Unknown
        } else {
            let mean_x = aligned
                .iter()
                .map(|mark| mark.bbox.x_center())
                .sum::<f32>()
                / aligned.len() as f32;
            nearest_column(&columns, mean_x)
        };

        responses.push(QuestionnaireResponse {
            question: question.number,
            part: AsrsPart::for_question(question.number),
            response,
        });
    }

    log::info!(
        "ASRS: located {} responses on page {}",
        responses.len(),
        page.index + 1
    );
    responses
}

/// Extract the printed question texts from the ASRS page.
///
/// Questions are numbered lines beginning `How often ...` under the
/// `Part A (questions 1-6)` / `Part B (questions 7-18)` markers. Lines
/// outside a part marker are ignored.
pub fn extract_asrs_questions(page: &PageContent) -> Vec<AsrsQuestion> {
    let mut questions = Vec::new();
    let mut current_part: Option<AsrsPart> = None;

    for line in page.text.lines() {
        let line = line.trim();
        if line.contains("Part A (questions 1-6)") {
            current_part = Some(AsrsPart::A);
            continue;
        }
        if line.contains("Part B (questions 7-18)") {
            current_part = Some(AsrsPart::B);
            continue;
        }
        let part = match current_part {
            Some(part) => part,
            None => continue,
        };
        if let Some(caps) = QUESTION_TEXT.captures(line) {
            if let Ok(question) = caps[1].parse::<u8>() {
                if (1..=18).contains(&question) {
                    questions.push(AsrsQuestion {
                        question,
                        part,
                        text: caps[2].trim().to_string(),
                    });
                }
            }
        }
    }

    questions
}

struct QuestionRow {
    number: u8,
    bbox: crate::geometry::Rect,
}

/// Standalone integer words in range, topmost occurrence per number,
/// sorted top to bottom.
fn question_rows(page: &PageContent) -> Vec<QuestionRow> {
    let mut rows: Vec<QuestionRow> = Vec::new();
    for word in &page.words {
        if !STANDALONE_INT.is_match(&word.text) {
            continue;
        }
        let number: u8 = match word.text.parse() {
            Ok(n) if (1..=18).contains(&n) => n,
            _ => continue,
        };
        match rows.iter_mut().find(|r| r.number == number) {
            Some(existing) => {
                if word.bbox.y0 < existing.bbox.y0 {
                    existing.bbox = word.bbox;
                }
            }
            None => rows.push(QuestionRow {
                number,
                bbox: word.bbox,
            }),
        }
    }
    rows.sort_by(|a, b| crate::geometry::safe_float_cmp(a.bbox.y0, b.bbox.y0));
    rows
}

/// Build the ordered response-column centroids.
fn column_centroids(
    config: &ExtractionConfig,
    page: &PageContent,
    warnings: &mut Vec<ExtractionWarning>,
) -> Vec<(ResponseCategory, f32)> {
    if let Some(columns) = columns_from_headers(page) {
        return columns;
    }
    if let Some(columns) = columns_from_checkboxes(config, page) {
        log::debug!(
            "Page {}: header words unreadable; columns from checkbox row",
            page.index + 1
        );
        return columns;
    }

    log::warn!(
        "Page {}: estimating evenly spaced response columns",
        page.index + 1
    );
    warnings.push(ExtractionWarning::EstimatedColumns);
    let column_width = page.width / 7.0;
    ResponseCategory::columns()
        .iter()
        .enumerate()
        .map(|(i, &category)| (category, column_width * (i + 1) as f32))
        .collect()
}

/// Column centroids from the category header words, when all five
/// categories are present. `Very Often` is printed as two words; the
/// pair merges into one centroid spanning both.
fn columns_from_headers(page: &PageContent) -> Option<Vec<(ResponseCategory, f32)>> {
    let mut columns: Vec<(ResponseCategory, f32)> = Vec::new();

    let very_words: Vec<&Word> = page.words.iter().filter(|w| w.text == "Very").collect();

    for word in &page.words {
        let category = match word.text.as_str() {
            "Never" => ResponseCategory::Never,
            "Rarely" => ResponseCategory::Rarely,
            "Sometimes" => ResponseCategory::Sometimes,
            "Often" => {
                // An Often immediately right of a Very is the second
                // half of "Very Often".
                let paired_very = very_words.iter().find(|v| {
                    v.bbox.spans_y(word.bbox.y_center())
                        && (word.bbox.x0 - v.bbox.x1).abs() < VERY_OFTEN_GAP
                        && v.bbox.x0 < word.bbox.x0
                });
                match paired_very {
                    Some(very) => {
                        columns.push((
                            ResponseCategory::VeryOften,
                            (very.bbox.x0 + word.bbox.x1) / 2.0,
                        ));
                        continue;
                    }
                    None => ResponseCategory::Often,
                }
            }
            _ => continue,
        };
        columns.push((category, word.bbox.x_center()));
    }

    // All five categories must be present, once each.
    for category in ResponseCategory::columns() {
        if columns.iter().filter(|(c, _)| *c == category).count() != 1 {
            return None;
        }
    }
    columns.sort_by(|a, b| crate::geometry::safe_float_cmp(a.1, b.1));
    Some(columns)
}

/// Column centroids from the first clustered row of exactly five
/// checkbox shapes.
fn columns_from_checkboxes(
    config: &ExtractionConfig,
    page: &PageContent,
) -> Option<Vec<(ResponseCategory, f32)>> {
    let mut boxes: Vec<&crate::reader::Shape> = page
        .shapes
        .iter()
        .filter(|s| {
            s.bbox.height() < config.checkbox_max_size
                && s.bbox.is_roughly_square(config.checkbox_square_tolerance)
        })
        .collect();
    if boxes.is_empty() {
        return None;
    }
    boxes.sort_by(|a, b| crate::geometry::safe_float_cmp(a.bbox.y0, b.bbox.y0));

    let mut row: Vec<&crate::reader::Shape> = vec![boxes[0]];
    for &shape in boxes.iter().skip(1) {
        if (shape.bbox.y0 - row[0].bbox.y0).abs() < config.row_tolerance {
            row.push(shape);
        } else {
            if row.len() == 5 {
                break;
            }
            row = vec![shape];
        }
    }
    if row.len() != 5 {
        return None;
    }
    row.sort_by(|a, b| crate::geometry::safe_float_cmp(a.bbox.x0, b.bbox.x0));
    Some(
        ResponseCategory::columns()
            .iter()
            .zip(&row)
            .map(|(&category, shape)| (category, shape.bbox.x_center()))
            .collect(),
    )
}

fn nearest_column(columns: &[(ResponseCategory, f32)], x: f32) -> ResponseCategory {
    columns
        .iter()
        .min_by(|a, b| crate::geometry::safe_float_cmp((a.1 - x).abs(), (b.1 - x).abs()))
        .map(|(category, _)| *category)
        .unwrap_or(ResponseCategory::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::reader::Shape;

    fn word(text: &str, x0: f32, y0: f32) -> Word {
        Word {
            text: text.to_string(),
            bbox: Rect::new(x0, y0, x0 + 7.0 * text.len() as f32, y0 + 10.0),
        }
    }

    fn asrs_page(words: Vec<Word>, shapes: Vec<Shape>) -> PageContent {
        PageContent {
            index: 3,
            width: 612.0,
            height: 792.0,
            text: "Adult ADHD Self-Report Scale (ASRS-v1.1)".to_string(),
            words,
            shapes,
        }
    }

    fn header_words() -> Vec<Word> {
        vec![
            word("Never", 300.0, 20.0),
            word("Rarely", 360.0, 20.0),
            word("Sometimes", 420.0, 20.0),
            word("Often", 490.0, 20.0),
            word("Very", 540.0, 20.0),
            word("Often", 570.0, 20.0),
        ]
    }

    #[test]
    fn test_columns_from_headers_merges_very_often() {
        let page = asrs_page(header_words(), vec![]);
        let columns = columns_from_headers(&page).unwrap();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].0, ResponseCategory::Never);
        assert_eq!(columns[4].0, ResponseCategory::VeryOften);
        // Centroid spans from "Very" through the trailing "Often".
        assert!(columns[4].1 > 540.0);
    }

    #[test]
    fn test_marked_question_gets_nearest_column() {
        let mut words = header_words();
        words.push(word("1", 20.0, 50.0));
        words.push(word("X", 418.0, 50.0)); // near the Sometimes column
        words.push(word("2", 20.0, 80.0));
        words.push(word("X", 302.0, 80.0)); // near the Never column
        let page = asrs_page(words, vec![]);
        let mut warnings = Vec::new();
        let responses = extract_asrs(&ExtractionConfig::default(), &page, &mut warnings);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].question, 1);
        assert_eq!(responses[0].response, ResponseCategory::Sometimes);
        assert_eq!(responses[1].question, 2);
        assert_eq!(responses[1].response, ResponseCategory::Never);
        assert_eq!(responses[0].part, AsrsPart::A);
    }

    #[test]
    fn test_unmarked_question_is_unknown() {
        let mut words = header_words();
        words.push(word("1", 20.0, 50.0));
        words.push(word("X", 418.0, 50.0));
        words.push(word("2", 20.0, 80.0)); // no mark on this row
        let page = asrs_page(words, vec![]);
        let mut warnings = Vec::new();
        let responses = extract_asrs(&ExtractionConfig::default(), &page, &mut warnings);
        assert_eq!(responses[1].response, ResponseCategory::Unknown);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ExtractionWarning::UnknownResponse { question: 2 })));
    }

    #[test]
    fn test_no_marks_anywhere_uses_static_fallback() {
        let mut words = header_words();
        words.push(word("1", 20.0, 50.0));
        let page = asrs_page(words, vec![]);
        let config = ExtractionConfig::default();
        let mut warnings = Vec::new();
        let responses = extract_asrs(&config, &page, &mut warnings);
        assert_eq!(responses.len(), 18);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ExtractionWarning::AsrsStaticFallback)));
        let q5 = responses.iter().find(|r| r.question == 5).unwrap();
        assert_eq!(q5.response, ResponseCategory::VeryOften);
    }

    #[test]
    fn test_columns_from_checkbox_row() {
        let config = ExtractionConfig::default();
        let shapes: Vec<Shape> = (0..5)
            .map(|i| Shape {
                bbox: Rect::new(300.0 + i as f32 * 60.0, 50.0, 310.0 + i as f32 * 60.0, 60.0),
            })
            .collect();
        let page = asrs_page(vec![], shapes);
        let columns = columns_from_checkboxes(&config, &page).unwrap();
        assert_eq!(columns.len(), 5);
        assert_eq!(columns[0].0, ResponseCategory::Never);
        assert_eq!(columns[0].1, 305.0);
        assert_eq!(columns[4].1, 545.0);
    }

    #[test]
    fn test_question_texts_extracted_per_part() {
        let mut page = asrs_page(vec![], vec![]);
        page.text = "\
Adult ADHD Self-Report Scale (ASRS-v1.1)
Part A (questions 1-6)
1 How often do you have trouble wrapping up the final details of a project?
2 How often do you have difficulty getting things in order?
Part B (questions 7-18)
7 How often do you make careless mistakes on a boring project?
"
        .to_string();
        let questions = extract_asrs_questions(&page);
        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, 1);
        assert_eq!(questions[0].part, AsrsPart::A);
        assert!(questions[0].text.starts_with("How often do you have trouble"));
        assert_eq!(questions[2].question, 7);
        assert_eq!(questions[2].part, AsrsPart::B);
    }

    #[test]
    fn test_question_texts_outside_part_markers_ignored() {
        let mut page = asrs_page(vec![], vec![]);
        page.text = "1 How often does this line appear before any part marker?".to_string();
        assert!(extract_asrs_questions(&page).is_empty());
    }

    #[test]
    fn test_estimated_columns_when_no_headers_or_boxes() {
        let words = vec![word("1", 20.0, 50.0), word("X", 200.0, 50.0)];
        let page = asrs_page(words, vec![]);
        let mut warnings = Vec::new();
        let responses = extract_asrs(&ExtractionConfig::default(), &page, &mut warnings);
        assert_eq!(responses.len(), 1);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ExtractionWarning::EstimatedColumns)));
    }
}
