//! Pdfium-backed page reader.
//!
//! Opens the document for the duration of one [`read_pages`] call and
//! releases the handle on every exit path, including errors: the
//! document value is scoped to the call and dropped before returning.
//!
//! Coordinates are converted from pdfium's bottom-left origin to the
//! top-left origin used by the layout heuristics.
//!
//! [`read_pages`]: PageReader::read_pages

use std::path::{Path, PathBuf};

use pdfium_render::prelude::*;

use super::{PageContent, PageReader, Shape, Word};
use crate::error::{Error, Result};
use crate::geometry::Rect;

/// Reads page text and geometry through the pdfium library.
#[derive(Debug, Clone)]
pub struct PdfiumReader {
    path: PathBuf,
}

impl PdfiumReader {
    /// Create a reader for a document path. The file is not opened until
    /// pages are read.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn bind() -> Result<Pdfium> {
        let bindings = Pdfium::bind_to_system_library()
            .or_else(|_| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            })
            .map_err(|e| Error::Pdf(format!("failed to bind pdfium library: {e}")))?;
        Ok(Pdfium::new(bindings))
    }
}

impl PageReader for PdfiumReader {
    fn read_pages(&self) -> Result<Vec<PageContent>> {
        let pdfium = Self::bind()?;
        let document = pdfium
            .load_pdf_from_file(&self.path, None)
            .map_err(|e| Error::Pdf(format!("failed to open {}: {e}", self.path.display())))?;

        let mut pages = Vec::new();
        for (index, page) in document.pages().iter().enumerate() {
            pages.push(read_page(index, &page));
        }
        log::debug!(
            "Read {} pages from {}",
            pages.len(),
            self.path.display()
        );
        Ok(pages)
    }
}

fn read_page(index: usize, page: &PdfPage) -> PageContent {
    let width = page.width().value;
    let height = page.height().value;

    let (text, words) = match page.text() {
        Ok(page_text) => {
            let text = page_text.all();
            let words = collect_words(&page_text, height);
            (text, words)
        }
        Err(e) => {
            log::warn!("Page {}: text unreadable ({e}); continuing with empty page", index + 1);
            (String::new(), Vec::new())
        }
    };

    let shapes = collect_shapes(page, height);

    PageContent {
        index,
        width,
        height,
        text,
        words,
        shapes,
    }
}

/// Build positioned words from the page's text segments.
///
/// A segment is a run of text with one bounding box. Single-word
/// segments keep the segment box; multi-word segments apportion the
/// horizontal extent linearly by character count, which is accurate
/// enough for the column-distance heuristics downstream.
fn collect_words(page_text: &PdfPageText, page_height: f32) -> Vec<Word> {
    let mut words = Vec::new();
    for segment in page_text.segments().iter() {
        let seg_text = segment.text();
        if seg_text.trim().is_empty() {
            continue;
        }
        let bounds = segment.bounds();
        let x0 = bounds.left().value;
        let x1 = bounds.right().value;
        let top = page_height - bounds.top().value;
        let bottom = page_height - bounds.bottom().value;
        let (y0, y1) = (top.min(bottom), top.max(bottom));
        split_into_words(&seg_text, x0, x1, y0, y1, &mut words);
    }
    words
}

fn split_into_words(text: &str, x0: f32, x1: f32, y0: f32, y1: f32, out: &mut Vec<Word>) {
    let total_chars = text.chars().count();
    if total_chars == 0 {
        return;
    }
    let char_width = (x1 - x0) / total_chars as f32;

    let mut offset = 0usize;
    for piece in text.split_whitespace() {
        let piece_chars = piece.chars().count();
        // Locate this piece's character offset within the segment text.
        let found = text
            .char_indices()
            .enumerate()
            .skip(offset)
            .find(|(_, (byte_idx, _))| text[*byte_idx..].starts_with(piece));
        let start_chars = match found {
            Some((char_idx, _)) => char_idx,
            None => offset,
        };
        offset = start_chars + piece_chars;

        let wx0 = x0 + char_width * start_chars as f32;
        let wx1 = wx0 + char_width * piece_chars as f32;
        out.push(Word {
            text: piece.to_string(),
            bbox: Rect::new(wx0, y0, wx1, y1),
        });
    }
}

fn collect_shapes(page: &PdfPage, page_height: f32) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for object in page.objects().iter() {
        if object.object_type() != PdfPageObjectType::Path {
            continue;
        }
        if let Ok(bounds) = object.bounds() {
            let x0 = bounds.left().value;
            let x1 = bounds.right().value;
            let top = page_height - bounds.top().value;
            let bottom = page_height - bounds.bottom().value;
            let (y0, y1) = (top.min(bottom), top.max(bottom));
            shapes.push(Shape {
                bbox: Rect::new(x0, y0, x1, y1),
            });
        }
    }
    shapes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_into_words_apportions_by_char_count() {
        let mut words = Vec::new();
        // 11 chars over 110 units: 10 units per char.
        split_into_words("Never Often", 0.0, 110.0, 0.0, 10.0, &mut words);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, "Never");
        assert_eq!(words[0].bbox.x0, 0.0);
        assert_eq!(words[0].bbox.x1, 50.0);
        assert_eq!(words[1].text, "Often");
        assert_eq!(words[1].bbox.x0, 60.0);
        assert_eq!(words[1].bbox.x1, 110.0);
    }

    #[test]
    fn test_split_into_words_single_word_keeps_bounds() {
        let mut words = Vec::new();
        split_into_words("X", 5.0, 15.0, 20.0, 30.0, &mut words);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].bbox, Rect::new(5.0, 20.0, 15.0, 30.0));
    }

    #[test]
    fn test_split_into_words_empty() {
        let mut words = Vec::new();
        split_into_words("", 0.0, 10.0, 0.0, 10.0, &mut words);
        assert!(words.is_empty());
    }
}
