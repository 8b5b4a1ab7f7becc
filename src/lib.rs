// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::match_like_matches_macro)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # cogreport
//!
//! Extraction engine for fixed-layout clinical cognitive test reports.
//!
//! The vendor's PDF reports have no machine-readable schema: structure
//! has to be inferred from text layout, recurring label vocabularies,
//! and numeric-column heuristics. This crate turns one report document
//! into normalized typed records:
//!
//! - patient demographics ([`records::PatientInfo`])
//! - per-domain cognitive scores ([`records::DomainScore`])
//! - per-subtest metrics, reconciled across competing extraction
//!   strategies ([`records::ResolvedMetric`])
//! - ASRS questionnaire responses located by bounding-box geometry
//!   ([`records::QuestionnaireResponse`]) and the DSM-5 criteria derived
//!   from them ([`records::Criterion`])
//! - NPQ questionnaire records and an Epworth Sleepiness Scale summary
//!
//! ## Strategy fallback
//!
//! The same logical field is often extractable through several
//! independently unreliable paths. Strategies are attempted in a fixed
//! priority order per section kind — line/regex parsing first, generic
//! table extraction (ruling-line then whitespace flavors) as fallback,
//! word-geometry for the checkbox instrument — and the most complete
//! candidate per (test, metric, sub-part) key wins in reconciliation.
//! Expected metrics that no strategy found are synthesized as explicit
//! placeholders, never silently dropped.
//!
//! ## Failure semantics
//!
//! Missing sections, unreadable pages, and failed numeric conversions
//! degrade the output and are recorded on the bundle's warning list;
//! the single fatal condition is a document with no patient identifier.
//!
//! ## Quick start
//!
//! ```ignore
//! use cogreport::ReportExtractor;
//!
//! # fn main() -> cogreport::Result<()> {
//! let bundle = ReportExtractor::new().extract_file("report.pdf")?;
//! println!("patient {}", bundle.patient.patient_id);
//! for metric in &bundle.metrics {
//!     println!("{} / {}: {:?}", metric.test_name, metric.metric_name, metric.raw_score);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration tables
pub mod config;

// Layout primitives
pub mod geometry;

// Typed output records
pub mod records;

// Page text/geometry reading
pub mod reader;

// Section location
pub mod sections;

// Extraction strategies
pub mod asrs;
pub mod lines;
pub mod tables;

// Secondary instruments
pub mod epworth;
pub mod npq;

// Demographics
pub mod patient;

// Candidate arbitration
pub mod reconcile;

// Derived diagnostics
pub mod criteria;

// Orchestration
pub mod extractor;

// Storage collaborator boundary
pub mod storage;

// Re-exports
pub use config::ExtractionConfig;
pub use error::{Error, Result};
pub use extractor::ReportExtractor;
pub use reader::{InMemoryReader, PageContent, PageReader, PdfiumReader};
pub use records::{ReportBundle, ResolvedMetric, ScoreValue};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
