//! Extract report PDFs and print result bundles as JSON.
//!
//! Accepts either one PDF or a directory of PDFs. A failed document is
//! reported by path and reason and does not stop a directory run.
//!
//! Usage:
//!   cargo run --release --bin extract_report -- report.pdf
//!   cargo run --release --bin extract_report -- report.pdf --pretty
//!   cargo run --release --bin extract_report -- reports/

use cogreport::ReportExtractor;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

struct Args {
    path: Option<PathBuf>,
    pretty: bool,
}

impl Args {
    fn from_env() -> Self {
        let mut path = None;
        let mut pretty = false;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--pretty" => pretty = true,
                _ => path = Some(PathBuf::from(arg)),
            }
        }
        Self { path, pretty }
    }
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::from_env();
    let path = match args.path {
        Some(path) => path,
        None => {
            eprintln!("Usage: extract_report <report.pdf | reports-dir> [--pretty]");
            return ExitCode::FAILURE;
        }
    };

    let extractor = ReportExtractor::new();
    let ok = if path.is_dir() {
        process_directory(&extractor, &path, args.pretty)
    } else {
        process_file(&extractor, &path, args.pretty)
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn process_file(extractor: &ReportExtractor, path: &Path, pretty: bool) -> bool {
    let bundle = match extractor.extract_file(path) {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("Extraction failed for {}: {e}", path.display());
            return false;
        }
    };

    if !bundle.warnings.is_empty() {
        eprintln!(
            "Patient {}: {} degraded sections (see bundle warnings)",
            bundle.patient.patient_id,
            bundle.warnings.len()
        );
    }

    let json = if pretty {
        serde_json::to_string_pretty(&bundle)
    } else {
        serde_json::to_string(&bundle)
    };
    match json {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            eprintln!("Failed to serialize bundle: {e}");
            false
        }
    }
}

fn process_directory(extractor: &ReportExtractor, dir: &Path, pretty: bool) -> bool {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("Cannot read directory {}: {e}", dir.display());
            return false;
        }
    };

    let mut pdfs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                .unwrap_or(false)
        })
        .collect();
    pdfs.sort();

    let mut processed = 0usize;
    let mut failed = 0usize;
    for pdf in &pdfs {
        if process_file(extractor, pdf, pretty) {
            processed += 1;
        } else {
            failed += 1;
        }
    }

    eprintln!(
        "Processed {processed} of {} reports ({failed} failed)",
        pdfs.len()
    );
    failed == 0 || processed > 0
}
