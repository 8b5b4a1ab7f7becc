//! Typed records produced by the extraction engine.
//!
//! Everything the engine hands to the storage collaborator lives here:
//! patient demographics, per-domain scores, reconciled subtest metrics,
//! questionnaire responses, derived diagnostic criteria, and the audit
//! trail of degraded handling. Candidate fields are the unreconciled
//! evidence produced by the individual extraction strategies; they are
//! append-only and consumed by reconciliation.

use serde::{Deserialize, Serialize};

/// Patient demographics extracted once per document.
///
/// Required for every other record to be considered valid: a bundle is
/// only produced when a patient identifier was found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    /// Vendor-assigned patient identifier
    pub patient_id: u32,
    /// Test date exactly as printed in the report, when found
    pub test_date: Option<String>,
    /// Parsed form of the test date, when the printed string was parseable
    pub test_date_parsed: Option<chrono::NaiveDateTime>,
    /// Patient age in years, when found
    pub age: Option<u32>,
    /// Report language, when found
    pub language: Option<String>,
}

/// One extracted score cell.
///
/// Placeholder tokens (`-`, `NA`) are preserved as explicit
/// not-applicable values rather than coerced to zero, and tokens that
/// fail numeric conversion keep their original text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreValue {
    /// A successfully parsed numeric value
    Number(f64),
    /// An explicit placeholder token (`-` or `NA`) in the source
    NotApplicable,
    /// A token that could not be converted; the original text is kept
    Raw(String),
}

impl ScoreValue {
    /// Parse a score token.
    ///
    /// Asterisk markers and stray newlines are stripped before
    /// conversion, following the vendor's cell formatting. Conversion
    /// failure never raises; the cleaned token is preserved as
    /// [`ScoreValue::Raw`].
    pub fn parse(token: &str) -> Self {
        let cleaned = token.replace('*', "").replace('\n', " ").trim().to_string();
        if cleaned.is_empty() || cleaned == "-" || cleaned.eq_ignore_ascii_case("na") {
            return ScoreValue::NotApplicable;
        }
        match cleaned.parse::<f64>() {
            Ok(n) => ScoreValue::Number(n),
            Err(_) => ScoreValue::Raw(cleaned),
        }
    }

    /// Whether this value carries real data (numeric or raw text), as
    /// opposed to a placeholder.
    pub fn is_present(&self) -> bool {
        !matches!(self, ScoreValue::NotApplicable)
    }

    /// The numeric value, if any.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ScoreValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Which extraction strategy produced a candidate field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyKind {
    /// Line-oriented state machine over section text
    LineParser,
    /// Ruling-line table extraction
    LatticeTable,
    /// Whitespace-column table extraction
    StreamTable,
    /// Word/shape bounding-box geometry
    Geometry,
}

/// One raw extraction attempt for a single metric.
///
/// Multiple candidates may exist for the same (test, metric, sub-part)
/// key, produced by different strategies or re-parsed pages; they are
/// never mutated, only consumed by reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateField {
    /// Test the metric belongs to
    pub test_name: String,
    /// Metric label as printed
    pub metric_name: String,
    /// Sub-part label (e.g. `Part 2`) for multi-part tests
    pub sub_part: Option<String>,
    /// Raw score column
    pub raw_score: ScoreValue,
    /// Standard score column
    pub standard_score: ScoreValue,
    /// Percentile column
    pub percentile: ScoreValue,
    /// Strategy that produced this candidate
    pub strategy: StrategyKind,
    /// Zero-based page the candidate came from
    pub page: usize,
}

impl CandidateField {
    /// Grouping key for reconciliation.
    pub fn key(&self) -> (String, String, Option<String>) {
        (
            self.test_name.clone(),
            self.metric_name.clone(),
            self.sub_part.clone(),
        )
    }

    /// Count of non-placeholder values among raw/standard/percentile.
    pub fn completeness(&self) -> usize {
        [&self.raw_score, &self.standard_score, &self.percentile]
            .iter()
            .filter(|v| v.is_present())
            .count()
    }
}

/// The reconciled, deduplicated record for one (test, metric, sub-part).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedMetric {
    /// Test the metric belongs to
    pub test_name: String,
    /// Metric label
    pub metric_name: String,
    /// Sub-part label for multi-part tests
    pub sub_part: Option<String>,
    /// Raw score
    pub raw_score: ScoreValue,
    /// Standard score
    pub standard_score: ScoreValue,
    /// Percentile
    pub percentile: ScoreValue,
    /// True when no strategy found the metric and the record was
    /// synthesized from the expected-metrics table
    pub placeholder: bool,
}

/// One row of the cognitive domain scores table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainScore {
    /// Domain label (e.g. `Composite Memory`)
    pub domain: String,
    /// Patient score column
    pub patient_score: ScoreValue,
    /// Standard score column
    pub standard_score: ScoreValue,
    /// Percentile column
    pub percentile: ScoreValue,
    /// The domain's validity indicator column (`Yes`/`No`), when present
    pub validity: Option<bool>,
}

/// Ordered questionnaire response categories.
///
/// The ordering (`Never < Rarely < Sometimes < Often < Very Often`) is
/// significant: criterion thresholds compare against it. `Unknown` is a
/// sentinel for questions with no detected mark; it has no position in
/// the ordering and never meets a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseCategory {
    /// Never
    Never,
    /// Rarely
    Rarely,
    /// Sometimes
    Sometimes,
    /// Often
    Often,
    /// Very Often
    VeryOften,
    /// No mark could be located for the question
    Unknown,
}

impl ResponseCategory {
    /// Severity position in the response ordering, `None` for `Unknown`.
    pub fn severity(&self) -> Option<u8> {
        match self {
            ResponseCategory::Never => Some(0),
            ResponseCategory::Rarely => Some(1),
            ResponseCategory::Sometimes => Some(2),
            ResponseCategory::Often => Some(3),
            ResponseCategory::VeryOften => Some(4),
            ResponseCategory::Unknown => None,
        }
    }

    /// Parse a column header / response label.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Never" => ResponseCategory::Never,
            "Rarely" => ResponseCategory::Rarely,
            "Sometimes" => ResponseCategory::Sometimes,
            "Often" => ResponseCategory::Often,
            "Very Often" => ResponseCategory::VeryOften,
            _ => ResponseCategory::Unknown,
        }
    }

    /// Printable label matching the vendor's column headers.
    pub fn label(&self) -> &'static str {
        match self {
            ResponseCategory::Never => "Never",
            ResponseCategory::Rarely => "Rarely",
            ResponseCategory::Sometimes => "Sometimes",
            ResponseCategory::Often => "Often",
            ResponseCategory::VeryOften => "Very Often",
            ResponseCategory::Unknown => "Unknown",
        }
    }

    /// All real categories, in column order.
    pub fn columns() -> [ResponseCategory; 5] {
        [
            ResponseCategory::Never,
            ResponseCategory::Rarely,
            ResponseCategory::Sometimes,
            ResponseCategory::Often,
            ResponseCategory::VeryOften,
        ]
    }
}

/// Which half of the ASRS instrument a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsrsPart {
    /// Questions 1-6
    A,
    /// Questions 7-18
    B,
}

impl AsrsPart {
    /// Part assignment for a question number.
    pub fn for_question(question: u8) -> Self {
        if question <= 6 {
            AsrsPart::A
        } else {
            AsrsPart::B
        }
    }
}

/// One questionnaire response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireResponse {
    /// Question number (1-18)
    pub question: u8,
    /// Instrument part
    pub part: AsrsPart,
    /// Detected response category
    pub response: ResponseCategory,
}

/// The printed text of one ASRS question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsrsQuestion {
    /// Question number (1-18)
    pub question: u8,
    /// Instrument part
    pub part: AsrsPart,
    /// Question text as printed
    pub text: String,
}

/// Diagnostic criterion group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CriterionCategory {
    /// Criterion A: inattention
    Inattention,
    /// Criterion B: hyperactivity / impulsivity
    Hyperactivity,
}

/// A boolean diagnostic criterion derived from questionnaire responses.
///
/// Never created independently of responses: `met` is a deterministic
/// function of the mapped question's response and its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    /// Criterion identifier (`A1`..`A9`, `B1`..`B9`)
    pub id: String,
    /// Criterion description
    pub label: String,
    /// Criterion group
    pub category: CriterionCategory,
    /// The ASRS question the criterion maps to
    pub question: u8,
    /// Whether the response met the criterion threshold
    pub met: bool,
}

/// Overall classification derived from the two criterion groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdhdClassification {
    /// Both groups met
    Combined,
    /// Only the inattention group met
    PredominantlyInattentive,
    /// Only the hyperactivity group met
    PredominantlyHyperactive,
    /// Neither group met
    None,
}

impl AdhdClassification {
    /// Report wording for the classification.
    pub fn description(&self) -> &'static str {
        match self {
            AdhdClassification::Combined => "Combined Presentation",
            AdhdClassification::PredominantlyInattentive => {
                "Predominantly Inattentive Presentation"
            }
            AdhdClassification::PredominantlyHyperactive => {
                "Predominantly Hyperactive-Impulsive Presentation"
            }
            AdhdClassification::None => "No Diagnosis Made",
        }
    }
}

/// One NPQ per-domain summary row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpqDomainScore {
    /// Domain name (e.g. `Attention`)
    pub domain: String,
    /// Domain score
    pub score: u32,
    /// Severity label as printed (e.g. `A moderate problem`)
    pub severity: String,
}

/// One NPQ question record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpqItem {
    /// Domain the question belongs to (e.g. `Attention`)
    pub domain: String,
    /// Question number within the instrument
    pub question: u32,
    /// Question text
    pub text: String,
    /// Numeric severity score (0-3)
    pub score: u8,
    /// Severity description as printed
    pub severity: String,
}

/// One Epworth Sleepiness Scale response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpworthResponse {
    /// Question number (1-8)
    pub question: u8,
    /// Dozing situation text
    pub situation: String,
    /// Chance-of-dozing score (0-3)
    pub score: u8,
    /// Score descriptor as printed
    pub descriptor: String,
}

/// Epworth Sleepiness Scale summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpworthSummary {
    /// Total score: the sum of question scores when all eight questions
    /// were found, otherwise the total printed in the report
    pub total: Option<u32>,
    /// Interpretation band for the total
    pub interpretation: String,
    /// Individual responses
    pub responses: Vec<EpworthResponse>,
}

/// Audit record of degraded handling during extraction.
///
/// A degraded-but-successful document carries these on the bundle so a
/// reviewer can audit confidence per section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExtractionWarning {
    /// An expected section's start marker was not found on any page
    SectionMissing {
        /// The missing section kind, as a display string
        section: String,
    },
    /// An expected metric produced no candidates and was synthesized
    PlaceholderSynthesized {
        /// Test name
        test: String,
        /// Metric name
        metric: String,
    },
    /// Table identification had more than one plausible test
    AmbiguousTable {
        /// Page the grid came from
        page: usize,
        /// The winning test
        chosen: String,
        /// The runner-up, kept for audit
        runner_up: String,
    },
    /// Response columns were estimated because headers were unreadable
    EstimatedColumns,
    /// No mark glyphs existed on the questionnaire page; the static
    /// recorded-response table was used
    AsrsStaticFallback,
    /// A question had no aligned mark and was recorded as `Unknown`
    UnknownResponse {
        /// Question number
        question: u8,
    },
}

/// The structured result bundle for one document.
///
/// The storage collaborator accepts the bundle keyed by
/// `patient.patient_id`, upserts idempotently, and rejects bundles with
/// no identifier (which this engine never produces: an absent identifier
/// fails the whole extraction instead).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportBundle {
    /// Patient demographics
    pub patient: PatientInfo,
    /// Cognitive domain score rows
    pub domain_scores: Vec<DomainScore>,
    /// Reconciled subtest metrics
    pub metrics: Vec<ResolvedMetric>,
    /// Tests whose report headers flagged them `Invalid` or `Possibly
    /// Invalid`
    pub invalid_tests: Vec<String>,
    /// ASRS questionnaire responses
    pub asrs: Vec<QuestionnaireResponse>,
    /// ASRS question texts, as printed on the questionnaire page
    pub asrs_questions: Vec<AsrsQuestion>,
    /// Derived diagnostic criteria
    pub criteria: Vec<Criterion>,
    /// Count of inattention criteria met (0-9)
    pub inattentive_met: u32,
    /// Count of hyperactivity criteria met (0-9)
    pub hyperactive_met: u32,
    /// Overall classification
    pub classification: AdhdClassification,
    /// NPQ question records
    pub npq: Vec<NpqItem>,
    /// NPQ per-domain summary scores
    pub npq_domains: Vec<NpqDomainScore>,
    /// Epworth summary, when the section was present
    pub epworth: Option<EpworthSummary>,
    /// Audit trail of degraded handling
    pub warnings: Vec<ExtractionWarning>,
}
