//! Section location.
//!
//! The vendor layout has no machine-readable structure; logical sections
//! are found by scanning page text for a fixed vocabulary of marker
//! phrases. A section begins at the first page containing one of its
//! start markers and extends to the page containing its end marker, when
//! one is configured, otherwise to just before the next different-kind
//! section start, otherwise to the end of the document.
//!
//! A missing section is not fatal: the locator simply returns no span of
//! that kind, the caller logs it, and extraction for that kind is
//! skipped.

use serde::{Deserialize, Serialize};

use crate::reader::PageContent;

/// The logical section kinds of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Cognitive domain scores table
    DomainScores,
    /// Per-test subtest metric tables
    Subtests,
    /// ASRS checkbox questionnaire
    Asrs,
    /// NPQ multi-domain questionnaire
    Npq,
    /// Epworth Sleepiness Scale
    Epworth,
}

impl SectionKind {
    /// All kinds, in report order.
    pub fn all() -> [SectionKind; 5] {
        [
            SectionKind::DomainScores,
            SectionKind::Subtests,
            SectionKind::Asrs,
            SectionKind::Npq,
            SectionKind::Epworth,
        ]
    }

    /// Display name used in logs and warnings.
    pub fn name(&self) -> &'static str {
        match self {
            SectionKind::DomainScores => "domain scores",
            SectionKind::Subtests => "subtests",
            SectionKind::Asrs => "ASRS",
            SectionKind::Npq => "NPQ",
            SectionKind::Epworth => "Epworth",
        }
    }

    fn start_markers(&self) -> &'static [&'static str] {
        match self {
            SectionKind::DomainScores => &["Domain Scores"],
            SectionKind::Subtests => &[
                "Verbal Memory Test",
                "Visual Memory Test",
                "Finger Tapping Test",
                "Symbol Digit Coding",
            ],
            SectionKind::Asrs => &["Adult ADHD Self-Report Scale (ASRS-v1.1)"],
            SectionKind::Npq => &["NeuroPsych Questionnaire", "Domain Score Severity"],
            SectionKind::Epworth => &["Epworth Sleepiness Scale"],
        }
    }

    fn end_marker(&self) -> Option<&'static str> {
        match self {
            SectionKind::DomainScores => Some("VI** - Validity Indicator"),
            _ => None,
        }
    }
}

/// A located section: a kind and an inclusive page range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section kind
    pub kind: SectionKind,
    /// First page of the section (zero-based, inclusive)
    pub start_page: usize,
    /// Last page of the section (zero-based, inclusive)
    pub end_page: usize,
}

impl Section {
    /// The pages this section spans, in order.
    pub fn pages<'a>(&self, pages: &'a [PageContent]) -> &'a [PageContent] {
        let end = (self.end_page + 1).min(pages.len());
        if self.start_page >= end {
            return &[];
        }
        &pages[self.start_page..end]
    }

    /// Concatenated text of the section's pages.
    pub fn text(&self, pages: &[PageContent]) -> String {
        self.pages(pages)
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Locate every recognizable section in the document.
///
/// Returns sections ordered by start page. Kinds with no start marker on
/// any page are absent from the result.
pub fn locate_sections(pages: &[PageContent]) -> Vec<Section> {
    // First pass: the start page of each kind.
    let mut starts: Vec<(SectionKind, usize)> = Vec::new();
    for kind in SectionKind::all() {
        let start = pages.iter().find(|page| {
            kind.start_markers()
                .iter()
                .any(|marker| page.text.contains(marker))
        });
        match start {
            Some(page) => starts.push((kind, page.index)),
            None => log::debug!("No start marker found for {} section", kind.name()),
        }
    }

    // Second pass: resolve end pages.
    let mut sections: Vec<Section> = Vec::new();
    for &(kind, start_page) in &starts {
        let end_page = match kind.end_marker() {
            Some(marker) => pages
                .iter()
                .skip(start_page)
                .find(|page| page.text.contains(marker))
                .map(|page| page.index),
            None => None,
        };
        let end_page = end_page.unwrap_or_else(|| {
            // Next different-kind start after this one, else document end.
            starts
                .iter()
                .filter(|&&(other, other_start)| other != kind && other_start > start_page)
                .map(|&(_, other_start)| other_start - 1)
                .min()
                .unwrap_or_else(|| pages.len().saturating_sub(1))
        });
        sections.push(Section {
            kind,
            start_page,
            end_page: end_page.max(start_page),
        });
    }

    sections.sort_by_key(|s| s.start_page);
    sections
}

/// Find a located section of one kind.
pub fn find_section(sections: &[Section], kind: SectionKind) -> Option<&Section> {
    sections.iter().find(|s| s.kind == kind)
}
