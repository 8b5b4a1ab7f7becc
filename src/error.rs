//! Error types for the report extraction library.
//!
//! Only conditions that make a whole document unusable are modeled as
//! errors. Everything else (missing sections, unreadable tables, failed
//! numeric conversions) is recoverable: it degrades the output and is
//! recorded as an [`crate::records::ExtractionWarning`] on the bundle.

/// Result type alias for report extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during report extraction.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No patient identifier could be found anywhere in the document.
    ///
    /// This is the single fatal extraction condition: without an
    /// identifier no record can be attributed to a patient, so no
    /// partial bundle is produced.
    #[error("No patient identifier found in document")]
    PatientIdMissing,

    /// The PDF could not be opened or rendered.
    #[error("PDF error: {0}")]
    Pdf(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
