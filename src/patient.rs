//! Patient demographics extraction.
//!
//! The identifier is the one fatal field: a document with no
//! recognizable `Patient ID:` pattern anywhere cannot be attributed to a
//! patient and the whole extraction fails. The remaining fields degrade
//! to `None` when their patterns are absent.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, Result};
use crate::records::PatientInfo;

lazy_static! {
    static ref PATIENT_ID: Regex = Regex::new(r"Patient ID:\s*(\d+)").unwrap();
    // The full date line carries a trailing HH:MM:SS time.
    static ref TEST_DATE_FULL: Regex =
        Regex::new(r"Test Date:\s*([\w\s,:/\-]+\d{2}:\d{2}:\d{2})").unwrap();
    static ref TEST_DATE_SHORT: Regex = Regex::new(r"Test Date:\s*([\w:/\-]+)").unwrap();
    static ref AGE: Regex = Regex::new(r"Age:\s*(\d+)").unwrap();
    static ref LANGUAGE: Regex = Regex::new(r"Language:\s*(.+)").unwrap();
}

/// Date formats the vendor has used across report revisions.
const DATE_FORMATS: [&str; 3] = [
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M:%S",
];

/// Extract patient demographics from the document's full text.
pub fn parse_patient_info(text: &str) -> Result<PatientInfo> {
    let patient_id: u32 = PATIENT_ID
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or(Error::PatientIdMissing)?;

    let test_date = TEST_DATE_FULL
        .captures(text)
        .or_else(|| TEST_DATE_SHORT.captures(text))
        .map(|caps| caps[1].trim().to_string());
    if test_date.is_none() {
        log::warn!("Patient {patient_id}: no test date found");
    }
    let test_date_parsed = test_date.as_deref().and_then(parse_date);

    let age = AGE.captures(text).and_then(|caps| caps[1].parse().ok());
    let language = LANGUAGE
        .captures(text)
        .map(|caps| caps[1].trim().to_string());

    Ok(PatientInfo {
        patient_id,
        test_date,
        test_date_parsed,
        age,
        language,
    })
}

fn parse_date(printed: &str) -> Option<chrono::NaiveDateTime> {
    DATE_FORMATS
        .iter()
        .find_map(|format| chrono::NaiveDateTime::parse_from_str(printed, format).ok())
}
