//! Diagnostic criteria mapping.
//!
//! Derives boolean DSM-5 criterion states from ASRS responses through a
//! static ordered mapping table. Most criteria require a response at or
//! above `Often`; the hand-curated lower-threshold question set is met
//! at `Sometimes`. The question list is a named, data-driven exception
//! carried on [`ExtractionConfig`], not an inferred rule. An unanswered
//! question (`Unknown`) never meets a criterion.

use crate::config::ExtractionConfig;
use crate::records::{
    AdhdClassification, Criterion, CriterionCategory, QuestionnaireResponse, ResponseCategory,
};

/// Criteria met at `Often` or above, unless the question is in the
/// lower-threshold set.
const DEFAULT_THRESHOLD: u8 = 3;
const LOWER_THRESHOLD: u8 = 2;

/// Criteria needed per group for that group's diagnosis.
const GROUP_THRESHOLD: u32 = 5;

/// The DSM-5 criterion table: identifier, description, mapped ASRS
/// question. Criteria A1-A9 are inattention, B1-B9 hyperactivity /
/// impulsivity. Order is the table's presentation order.
const DSM5_MAPPING: [(&str, &str, u8); 18] = [
    (
        "A1",
        "Often fails to give close attention to details or makes careless mistakes",
        7,
    ),
    (
        "A2",
        "Often has difficulty sustaining attention in tasks or play activities",
        8,
    ),
    ("A3", "Often does not seem to listen when spoken to directly", 9),
    (
        "A4",
        "Often does not follow through on instructions and fails to finish duties",
        1,
    ),
    ("A5", "Often has difficulty organizing tasks and activities", 2),
    (
        "A6",
        "Often avoids or is reluctant to engage in tasks requiring sustained mental effort",
        4,
    ),
    ("A7", "Often loses things necessary for tasks or activities", 10),
    ("A8", "Is often easily distracted by extraneous stimuli", 11),
    ("A9", "Is often forgetful in daily activities", 3),
    ("B1", "Often fidgets or squirms in seat", 5),
    (
        "B2",
        "Often leaves seat in situations when remaining seated is expected",
        12,
    ),
    (
        "B3",
        "Often runs about or climbs in situations where it is inappropriate",
        13,
    ),
    (
        "B4",
        "Often unable to play or engage in leisure activities quietly",
        14,
    ),
    ("B5", "Is often 'on the go', acting as if 'driven by a motor'", 6),
    ("B6", "Often talks excessively", 15),
    (
        "B7",
        "Often blurts out an answer before a question has been completed",
        16,
    ),
    ("B8", "Often has difficulty waiting his or her turn", 17),
    ("B9", "Often interrupts or intrudes on others", 18),
];

/// The complete derived outcome: per-criterion states, group counts, and
/// the overall classification.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaOutcome {
    /// All 18 criteria, in table order
    pub criteria: Vec<Criterion>,
    /// Inattention criteria met (0-9)
    pub inattentive_met: u32,
    /// Hyperactivity criteria met (0-9)
    pub hyperactive_met: u32,
    /// Overall classification
    pub classification: AdhdClassification,
}

/// Whether one response meets its question's criterion threshold.
pub fn is_met(config: &ExtractionConfig, response: ResponseCategory, question: u8) -> bool {
    let threshold = if config.lower_threshold_questions.contains(&question) {
        LOWER_THRESHOLD
    } else {
        DEFAULT_THRESHOLD
    };
    match response.severity() {
        Some(severity) => severity >= threshold,
        None => false,
    }
}

/// Map questionnaire responses onto the criterion table.
pub fn map_criteria(
    config: &ExtractionConfig,
    responses: &[QuestionnaireResponse],
) -> CriteriaOutcome {
    let response_for = |question: u8| {
        responses
            .iter()
            .find(|r| r.question == question)
            .map(|r| r.response)
            .unwrap_or(ResponseCategory::Unknown)
    };

    let mut criteria = Vec::with_capacity(DSM5_MAPPING.len());
    let mut inattentive_met = 0u32;
    let mut hyperactive_met = 0u32;

    for (id, label, question) in DSM5_MAPPING {
        let category = if id.starts_with('A') {
            CriterionCategory::Inattention
        } else {
            CriterionCategory::Hyperactivity
        };
        let met = is_met(config, response_for(question), question);
        if met {
            match category {
                CriterionCategory::Inattention => inattentive_met += 1,
                CriterionCategory::Hyperactivity => hyperactive_met += 1,
            }
        }
        criteria.push(Criterion {
            id: id.to_string(),
            label: label.to_string(),
            category,
            question,
            met,
        });
    }

    let classification = match (
        inattentive_met >= GROUP_THRESHOLD,
        hyperactive_met >= GROUP_THRESHOLD,
    ) {
        (true, true) => AdhdClassification::Combined,
        (true, false) => AdhdClassification::PredominantlyInattentive,
        (false, true) => AdhdClassification::PredominantlyHyperactive,
        (false, false) => AdhdClassification::None,
    };

    log::info!(
        "Criteria: {inattentive_met}/9 inattention, {hyperactive_met}/9 hyperactivity -> {}",
        classification.description()
    );

    CriteriaOutcome {
        criteria,
        inattentive_met,
        hyperactive_met,
        classification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::AsrsPart;

    fn response(question: u8, response: ResponseCategory) -> QuestionnaireResponse {
        QuestionnaireResponse {
            question,
            part: AsrsPart::for_question(question),
            response,
        }
    }

    fn all_responses(category: ResponseCategory) -> Vec<QuestionnaireResponse> {
        (1..=18).map(|q| response(q, category)).collect()
    }

    #[test]
    fn test_often_meets_default_threshold() {
        let config = ExtractionConfig::default();
        assert!(is_met(&config, ResponseCategory::Often, 7));
        assert!(is_met(&config, ResponseCategory::VeryOften, 7));
        assert!(!is_met(&config, ResponseCategory::Sometimes, 7));
    }

    #[test]
    fn test_lower_threshold_questions_met_at_sometimes() {
        let config = ExtractionConfig::default();
        assert!(is_met(&config, ResponseCategory::Sometimes, 1));
        assert!(is_met(&config, ResponseCategory::Sometimes, 16));
        assert!(!is_met(&config, ResponseCategory::Rarely, 1));
    }

    #[test]
    fn test_unknown_never_meets() {
        let config = ExtractionConfig::default();
        for question in 1..=18 {
            assert!(!is_met(&config, ResponseCategory::Unknown, question));
        }
    }

    #[test]
    fn test_all_very_often_is_combined() {
        let config = ExtractionConfig::default();
        let outcome = map_criteria(&config, &all_responses(ResponseCategory::VeryOften));
        assert_eq!(outcome.inattentive_met, 9);
        assert_eq!(outcome.hyperactive_met, 9);
        assert_eq!(outcome.classification, AdhdClassification::Combined);
    }

    #[test]
    fn test_all_never_is_no_diagnosis() {
        let config = ExtractionConfig::default();
        let outcome = map_criteria(&config, &all_responses(ResponseCategory::Never));
        assert_eq!(outcome.inattentive_met, 0);
        assert_eq!(outcome.hyperactive_met, 0);
        assert_eq!(outcome.classification, AdhdClassification::None);
    }

    #[test]
    fn test_five_of_nine_inattention_meets_group() {
        let config = ExtractionConfig::default();
        // Inattention criteria map to questions 7,8,9,1,2,4,10,11,3.
        // Five at Often, the rest below threshold (Never). Questions in
        // the lower-threshold set must also stay below Sometimes.
        let mut responses = Vec::new();
        for q in [7, 8, 10, 11, 4] {
            responses.push(response(q, ResponseCategory::Often));
        }
        for q in [9, 1, 2, 3] {
            responses.push(response(q, ResponseCategory::Rarely));
        }
        let outcome = map_criteria(&config, &responses);
        assert_eq!(outcome.inattentive_met, 5);
        assert_eq!(
            outcome.classification,
            AdhdClassification::PredominantlyInattentive
        );
    }

    #[test]
    fn test_four_of_nine_does_not_meet_group() {
        let config = ExtractionConfig::default();
        let mut responses = Vec::new();
        for q in [7, 8, 10, 11] {
            responses.push(response(q, ResponseCategory::Often));
        }
        let outcome = map_criteria(&config, &responses);
        assert_eq!(outcome.inattentive_met, 4);
        assert_eq!(outcome.classification, AdhdClassification::None);
    }

    #[test]
    fn test_missing_questions_treated_as_unknown() {
        let config = ExtractionConfig::default();
        let outcome = map_criteria(&config, &[]);
        assert_eq!(outcome.criteria.len(), 18);
        assert!(outcome.criteria.iter().all(|c| !c.met));
    }

    #[test]
    fn test_criterion_ids_unique_and_ordered() {
        let config = ExtractionConfig::default();
        let outcome = map_criteria(&config, &[]);
        let ids: Vec<_> = outcome.criteria.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids[0], "A1");
        assert_eq!(ids[9], "B1");
        let mut dedup = ids.clone();
        dedup.dedup();
        assert_eq!(dedup.len(), 18);
    }
}
