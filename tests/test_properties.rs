//! Property tests for reconciliation and criteria mapping.

use proptest::prelude::*;

use cogreport::config::ExtractionConfig;
use cogreport::criteria::map_criteria;
use cogreport::reconcile::reconcile;
use cogreport::records::{
    AsrsPart, CandidateField, QuestionnaireResponse, ResponseCategory, ScoreValue, StrategyKind,
};
use indexmap::IndexMap;

fn single_metric_config() -> ExtractionConfig {
    let mut known = IndexMap::new();
    known.insert("Test".to_string(), vec!["Metric".to_string()]);
    ExtractionConfig::default().with_known_tests(known)
}

fn candidate(values: [ScoreValue; 3], strategy: StrategyKind) -> CandidateField {
    let [raw_score, standard_score, percentile] = values;
    CandidateField {
        test_name: "Test".to_string(),
        metric_name: "Metric".to_string(),
        sub_part: None,
        raw_score,
        standard_score,
        percentile,
        strategy,
        page: 0,
    }
}

fn score_value() -> impl Strategy<Value = ScoreValue> {
    prop_oneof![
        Just(ScoreValue::NotApplicable),
        (0.0f64..500.0).prop_map(ScoreValue::Number),
    ]
}

fn category() -> impl Strategy<Value = ResponseCategory> {
    prop_oneof![
        Just(ResponseCategory::Never),
        Just(ResponseCategory::Rarely),
        Just(ResponseCategory::Sometimes),
        Just(ResponseCategory::Often),
        Just(ResponseCategory::VeryOften),
    ]
}

proptest! {
    /// A candidate with strictly more non-null fields wins regardless
    /// of discovery order.
    #[test]
    fn reconcile_monotonic_in_completeness(
        a in [score_value(), score_value(), score_value()],
        b in [score_value(), score_value(), score_value()],
    ) {
        let config = single_metric_config();
        let first = candidate(a.clone(), StrategyKind::LineParser);
        let second = candidate(b.clone(), StrategyKind::StreamTable);
        prop_assume!(first.completeness() > second.completeness());

        for order in [
            vec![first.clone(), second.clone()],
            vec![second.clone(), first.clone()],
        ] {
            let mut warnings = Vec::new();
            let resolved = reconcile(&config, &order, &mut warnings);
            let winner = resolved.iter().find(|m| m.metric_name == "Metric").unwrap();
            prop_assert_eq!(&winner.raw_score, &a[0]);
            prop_assert_eq!(&winner.standard_score, &a[1]);
            prop_assert_eq!(&winner.percentile, &a[2]);
        }
    }

    /// Reconciliation is idempotent: the same candidate set always
    /// resolves to the same metrics.
    #[test]
    fn reconcile_idempotent(
        values in proptest::collection::vec(
            [score_value(), score_value(), score_value()],
            0..6,
        ),
    ) {
        let config = single_metric_config();
        let candidates: Vec<CandidateField> = values
            .into_iter()
            .map(|v| candidate(v, StrategyKind::LatticeTable))
            .collect();
        let mut w1 = Vec::new();
        let mut w2 = Vec::new();
        let once = reconcile(&config, &candidates, &mut w1);
        let twice = reconcile(&config, &candidates, &mut w2);
        prop_assert_eq!(once, twice);
    }

    /// Raising any response in the severity ordering never decreases
    /// the per-group met counts.
    #[test]
    fn criteria_met_count_monotonic(
        responses in proptest::collection::vec(category(), 18),
        raised_index in 0usize..18,
        raised_to in category(),
    ) {
        let config = ExtractionConfig::default();
        let base: Vec<QuestionnaireResponse> = responses
            .iter()
            .enumerate()
            .map(|(i, &response)| QuestionnaireResponse {
                question: (i + 1) as u8,
                part: AsrsPart::for_question((i + 1) as u8),
                response,
            })
            .collect();
        prop_assume!(
            raised_to.severity().unwrap() >= responses[raised_index].severity().unwrap()
        );
        let mut raised = base.clone();
        raised[raised_index].response = raised_to;

        let before = map_criteria(&config, &base);
        let after = map_criteria(&config, &raised);
        prop_assert!(after.inattentive_met >= before.inattentive_met);
        prop_assert!(after.hyperactive_met >= before.hyperactive_met);
    }
}
