//! Reconciliation and deduplication of candidate fields.
//!
//! Candidates arrive from independently unreliable strategies; no
//! averaging is done because the engines are not comparable in
//! precision. Per (test, metric, sub-part) key the most complete
//! candidate wins, ties preferring a present raw score, then standard,
//! then percentile, then discovery order. The result is deterministic in
//! the candidate multiset: running reconciliation twice yields the same
//! metrics.
//!
//! After arbitration, every metric the expected-metrics table lists for
//! a known test appears exactly once in the output: metrics no strategy
//! found are synthesized as explicit placeholders rather than silently
//! dropped.

use indexmap::IndexMap;

use crate::config::ExtractionConfig;
use crate::records::{
    CandidateField, ExtractionWarning, ResolvedMetric, ScoreValue,
};

/// The vendor format suppresses this metric when its denominator is
/// zero, so a zero trigger value implies a zero companion value rather
/// than a missing one.
const ZERO_INCORRECT_TRIGGER: &str = "Incorrect Responses";
const ZERO_INCORRECT_COMPANION: &str = "Average Incorrect Reaction Time";

/// Reconcile all candidates for one document into resolved metrics.
pub fn reconcile(
    config: &ExtractionConfig,
    candidates: &[CandidateField],
    warnings: &mut Vec<ExtractionWarning>,
) -> Vec<ResolvedMetric> {
    // Arbitrate per key, keeping first-seen order of keys.
    let mut best: IndexMap<(String, String, Option<String>), &CandidateField> = IndexMap::new();
    for candidate in candidates {
        let key = candidate.key();
        match best.get(&key) {
            Some(current) if rank(candidate) <= rank(current) => {}
            _ => {
                best.insert(key, candidate);
            }
        }
    }

    let mut resolved: Vec<ResolvedMetric> = best
        .into_iter()
        .map(|(_, c)| ResolvedMetric {
            test_name: c.test_name.clone(),
            metric_name: c.metric_name.clone(),
            sub_part: c.sub_part.clone(),
            raw_score: c.raw_score.clone(),
            standard_score: c.standard_score.clone(),
            percentile: c.percentile.clone(),
            placeholder: false,
        })
        .collect();

    apply_zero_incorrect_rule(&mut resolved);
    synthesize_placeholders(config, &mut resolved, warnings);
    resolved
}

/// Arbitration rank: completeness first, then the per-field
/// tie-breakers in order.
fn rank(c: &CandidateField) -> (usize, bool, bool, bool) {
    (
        c.completeness(),
        c.raw_score.is_present(),
        c.standard_score.is_present(),
        c.percentile.is_present(),
    )
}

/// Synthesize placeholder metrics for every expected metric no strategy
/// found, so downstream consumers always see a complete row set per
/// known test.
fn synthesize_placeholders(
    config: &ExtractionConfig,
    resolved: &mut Vec<ResolvedMetric>,
    warnings: &mut Vec<ExtractionWarning>,
) {
    for (test, metrics) in &config.known_tests {
        for metric in metrics {
            let found = resolved
                .iter()
                .any(|r| &r.test_name == test && &r.metric_name == metric);
            if found {
                continue;
            }
            log::info!("Synthesizing placeholder for {test} / {metric}");
            warnings.push(ExtractionWarning::PlaceholderSynthesized {
                test: test.clone(),
                metric: metric.clone(),
            });
            resolved.push(ResolvedMetric {
                test_name: test.clone(),
                metric_name: metric.clone(),
                sub_part: None,
                raw_score: ScoreValue::NotApplicable,
                standard_score: ScoreValue::NotApplicable,
                percentile: ScoreValue::NotApplicable,
                placeholder: true,
            });
        }
    }
}

/// Named exception: an `Incorrect Responses` of 0 within a sub-part
/// implies a companion `Average Incorrect Reaction Time` of 0. The
/// companion is filled in when a valueless entry exists and synthesized
/// outright when the vendor suppressed the row entirely.
fn apply_zero_incorrect_rule(resolved: &mut Vec<ResolvedMetric>) {
    let triggers: Vec<(String, Option<String>)> = resolved
        .iter()
        .filter(|r| {
            r.metric_name == ZERO_INCORRECT_TRIGGER && r.raw_score.as_f64() == Some(0.0)
        })
        .map(|r| (r.test_name.clone(), r.sub_part.clone()))
        .collect();

    for (test, sub_part) in triggers {
        log::debug!(
            "Zero incorrect responses in {test} {sub_part:?}: implying zero {ZERO_INCORRECT_COMPANION}"
        );
        let position = resolved.iter().position(|r| {
            r.test_name == test
                && r.sub_part == sub_part
                && r.metric_name == ZERO_INCORRECT_COMPANION
        });
        match position {
            Some(position) => {
                let companion = &mut resolved[position];
                if !companion.raw_score.is_present() {
                    companion.raw_score = ScoreValue::Number(0.0);
                    companion.placeholder = false;
                }
            }
            None => resolved.push(ResolvedMetric {
                test_name: test,
                metric_name: ZERO_INCORRECT_COMPANION.to_string(),
                sub_part,
                raw_score: ScoreValue::Number(0.0),
                standard_score: ScoreValue::NotApplicable,
                percentile: ScoreValue::NotApplicable,
                placeholder: false,
            }),
        }
    }
}
