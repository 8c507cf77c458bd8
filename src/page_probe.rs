//! Page count reporting for opened documents
//!
//! The viewer does not rasterize pages. It only needs the page count a
//! renderer would report once a document has loaded.

use log::warn;
use lopdf::Document;

/// Reports the number of pages in a document's bytes
pub trait PageCountProbe {
    fn page_count(&self, bytes: &[u8]) -> Option<usize>;
}

/// Parses the document and walks its page tree. Object streams, cross-reference
/// streams and incremental updates are resolved by the parser, so the count is
/// that of the latest revision. Unparseable or page-less documents report `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfCountProbe;

impl PageCountProbe for PdfCountProbe {
    fn page_count(&self, bytes: &[u8]) -> Option<usize> {
        match Document::load_mem(bytes) {
            Ok(doc) => Some(doc.get_pages().len()).filter(|&pages| pages > 0),
            Err(e) => {
                warn!("Could not read page tree: {e}");
                None
            }
        }
    }
}

/// Fixed answer, for documents whose count is known up front or never arrives
#[derive(Debug, Clone, Copy)]
pub struct FixedPageCount(pub Option<usize>);

impl PageCountProbe for FixedPageCount {
    fn page_count(&self, _bytes: &[u8]) -> Option<usize> {
        self.0
    }
}
