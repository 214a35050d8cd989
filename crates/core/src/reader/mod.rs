//! Document reading: page text, positioned words and ruled tables.
//!
//! [`DocumentReader`] is the seam the extractor and the admin-field locator
//! work against; [`PdfDocument`] implements it on top of `lopdf` and the
//! in-crate interpreter. Page indices are zero-based everywhere.

mod cmap;
mod font;
pub(crate) mod interp;
pub(crate) mod objects;
pub mod table;
pub mod text;
pub mod types;

use std::path::Path;

use lopdf::{Document, ObjectId};
use once_cell::unsync::OnceCell;
use tracing::debug;

use crate::error::{FormError, Result};
pub use interp::PageContent;
use interp::PageInterpreter;
use objects::{inherited, rect, resolve_dict};
pub use table::GridTable;
pub use types::{BBox, Cell, CharObj, EdgeObj, Orientation, Row, Table, TableSettings, TextSettings, Word};

/// US letter, used when a page has no usable media box.
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// Read access to a paginated document.
pub trait DocumentReader {
    fn page_count(&self) -> usize;

    /// Page height in points; converts top-left `bottom` values to PDF y.
    fn page_height(&self, index: usize) -> Result<f64>;

    /// Plain text of a page, one visual line per line.
    fn page_text(&self, index: usize) -> Result<String>;

    /// Words in reading order, in top-left page space.
    fn page_words(&self, index: usize) -> Result<Vec<Word>>;

    /// Ruled tables, top to bottom; each a grid of optional cell strings.
    fn page_tables(&self, index: usize) -> Result<Vec<Table>>;
}

/// A PDF opened with `lopdf`. Pages are interpreted lazily, once.
pub struct PdfDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    content: Vec<OnceCell<PageContent>>,
    settings: TableSettings,
}

impl PdfDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let doc = Document::load(path.as_ref())?;
        Ok(Self::from_document(doc))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(data)?;
        Ok(Self::from_document(doc))
    }

    pub fn from_document(doc: Document) -> Self {
        let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
        let content = pages.iter().map(|_| OnceCell::new()).collect();
        Self {
            doc,
            pages,
            content,
            settings: TableSettings::default(),
        }
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    fn page_id(&self, index: usize) -> Result<ObjectId> {
        self.pages.get(index).copied().ok_or(FormError::PageOutOfRange {
            index,
            count: self.pages.len(),
        })
    }

    /// Media box `[x0, y0, x1, y1]`, inherited through the page tree.
    pub fn media_box(&self, index: usize) -> Result<[f64; 4]> {
        let page = self.doc.get_dictionary(self.page_id(index)?)?;
        Ok(inherited(&self.doc, page, b"MediaBox")
            .and_then(|o| rect(&self.doc, o))
            .unwrap_or(DEFAULT_MEDIA_BOX))
    }

    /// Glyphs and ruling edges of a page.
    pub fn page_content(&self, index: usize) -> Result<&PageContent> {
        let page_id = self.page_id(index)?;
        self.content[index].get_or_try_init(|| {
            let media = self.media_box(index)?;
            let page = self.doc.get_dictionary(page_id)?;
            let resources = inherited(&self.doc, page, b"Resources").and_then(|o| resolve_dict(&self.doc, o));
            let data = self.doc.get_page_content(page_id)?;
            let content = PageInterpreter::new(&self.doc, media).run(&data, resources)?;
            debug!(
                page = index,
                chars = content.chars.len(),
                edges = content.edges.len(),
                "interpreted page"
            );
            Ok(content)
        })
    }

    /// Ruled tables with their cell geometry.
    pub fn page_grid_tables(&self, index: usize) -> Result<Vec<GridTable>> {
        let content = self.page_content(index)?;
        Ok(table::find_grid_tables(&content.edges, &self.settings))
    }
}

impl DocumentReader for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_height(&self, index: usize) -> Result<f64> {
        let [_, y0, _, y1] = self.media_box(index)?;
        Ok(y1 - y0)
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let content = self.page_content(index)?;
        let refs: Vec<&CharObj> = content.chars.iter().collect();
        Ok(text::chars_to_text(&refs, &self.settings.text_settings))
    }

    fn page_words(&self, index: usize) -> Result<Vec<Word>> {
        let content = self.page_content(index)?;
        Ok(text::extract_words(&content.chars, &self.settings.text_settings))
    }

    fn page_tables(&self, index: usize) -> Result<Vec<Table>> {
        let content = self.page_content(index)?;
        Ok(table::find_tables(&content.chars, &content.edges, &self.settings))
    }
}
