//! Page text and geometry reading.
//!
//! The engine consumes pages as plain data: per page, the full text, the
//! positioned words, and the positioned drawing shapes. The
//! [`PageReader`] trait is the seam between the PDF-rendering dependency
//! and the extraction logic; every downstream component operates on
//! [`PageContent`] values, so tests can run the whole engine against
//! synthetic pages with no file I/O.

mod pdfium;

pub use pdfium::PdfiumReader;

use crate::error::Result;
use crate::geometry::Rect;

/// A positioned word on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    /// The word text, whitespace-trimmed
    pub text: String,
    /// Bounding box in top-left-origin page coordinates
    pub bbox: Rect,
}

/// A positioned drawing shape (path/rectangle outline) on a page.
///
/// Small square shapes are checkbox candidates on the questionnaire
/// page; long thin shapes are ruling lines for lattice table extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Bounding box in top-left-origin page coordinates
    pub bbox: Rect,
}

/// Everything the engine reads from one page. Immutable once read.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// Zero-based page index
    pub index: usize,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Full page text
    pub text: String,
    /// Positioned words, in reading order
    pub words: Vec<Word>,
    /// Positioned drawing shapes
    pub shapes: Vec<Shape>,
}

impl PageContent {
    /// A page carrying only text, for callers without geometry.
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            width: 612.0,
            height: 792.0,
            text: text.into(),
            words: Vec::new(),
            shapes: Vec::new(),
        }
    }
}

/// Source of page content for one document.
pub trait PageReader {
    /// Read every page of the document, in order.
    ///
    /// Unreadable individual pages degrade to empty [`PageContent`]
    /// entries so page indices stay aligned with the document; only a
    /// document that cannot be opened at all is an error.
    fn read_pages(&self) -> Result<Vec<PageContent>>;
}

/// A reader over pages already in memory.
///
/// Used by tests and by callers that obtained page content elsewhere.
#[derive(Debug, Clone, Default)]
pub struct InMemoryReader {
    pages: Vec<PageContent>,
}

impl InMemoryReader {
    /// Wrap pre-built pages.
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self { pages }
    }
}

impl PageReader for InMemoryReader {
    fn read_pages(&self) -> Result<Vec<PageContent>> {
        Ok(self.pages.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_reader_round_trip() {
        let pages = vec![
            PageContent::from_text(0, "first page"),
            PageContent::from_text(1, "second page"),
        ];
        let reader = InMemoryReader::new(pages.clone());
        assert_eq!(reader.read_pages().unwrap(), pages);
    }

    #[test]
    fn test_from_text_has_letter_size_defaults() {
        let page = PageContent::from_text(3, "x");
        assert_eq!(page.index, 3);
        assert_eq!(page.width, 612.0);
        assert_eq!(page.height, 792.0);
        assert!(page.words.is_empty());
    }
}
