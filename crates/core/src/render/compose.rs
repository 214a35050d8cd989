//! Merging overlays onto template pages.

use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::overlay::{OVERLAY_FONT, render_overlay};
use crate::error::{FormError, Result};
use crate::layout::PagePlan;
use crate::reader::objects::{inherited, resolve, resolve_dict};

/// Page keys that would tie a copy to the template page it came from.
const SOURCE_BOUND: [&[u8]; 3] = [b"Parent", b"Annots", b"StructParents"];

/// Page attributes a page may inherit from the page tree.
const INHERITABLE: [&[u8]; 3] = [b"MediaBox", b"CropBox", b"Rotate"];

/// Which template page each output page is drawn on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundPolicy {
    /// Every output page uses template page 1.
    #[default]
    ReuseFirst,
    /// Output page k uses template page k.
    Sequential,
}

impl BackgroundPolicy {
    pub fn background_index(self, page_index: usize) -> usize {
        match self {
            BackgroundPolicy::ReuseFirst => 0,
            BackgroundPolicy::Sequential => page_index,
        }
    }
}

/// Renders page plans and stacks them on background pages.
pub trait Compositor {
    /// Content-stream bytes for one page.
    fn render_page(&self, plan: &PagePlan) -> Result<Vec<u8>> {
        render_overlay(plan)
    }

    /// Append an output page: template page `background_index` with
    /// `overlay` drawn on top. An empty overlay copies the page as is.
    fn merge(&mut self, background_index: usize, overlay: Vec<u8>) -> Result<()>;

    /// Output pages so far.
    fn page_count(&self) -> usize;

    /// Write the finished document.
    fn finish(self, path: &Path) -> Result<()>
    where
        Self: Sized;
}

/// [`Compositor`] over a `lopdf` copy of the template.
pub struct LopdfCompositor {
    doc: Document,
    template_pages: Vec<ObjectId>,
    output_pages: Vec<ObjectId>,
    pages_id: ObjectId,
    font_id: Option<ObjectId>,
}

impl LopdfCompositor {
    pub fn new(template: Document) -> Result<Self> {
        let template_pages: Vec<ObjectId> = template.get_pages().into_values().collect();
        if template_pages.is_empty() {
            return Err(FormError::EmptyTemplate);
        }
        let mut doc = template;
        let pages_id = doc.new_object_id();
        Ok(Self {
            doc,
            template_pages,
            output_pages: Vec::new(),
            pages_id,
            font_id: None,
        })
    }

    pub fn open(path: &Path) -> Result<Self> {
        Self::new(Document::load(path)?)
    }

    fn overlay_font(&mut self) -> ObjectId {
        if let Some(id) = self.font_id {
            return id;
        }
        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        self.font_id = Some(id);
        id
    }

    /// Resources of the background page with the overlay font registered.
    fn page_resources(&mut self, page: &Dictionary) -> Dictionary {
        let doc = &self.doc;
        let mut resources = inherited(doc, page, b"Resources")
            .and_then(|o| resolve_dict(doc, o))
            .cloned()
            .unwrap_or_default();
        let mut fonts = resources
            .get(b"Font")
            .ok()
            .and_then(|o| resolve_dict(doc, o))
            .cloned()
            .unwrap_or_default();
        let font_id = self.overlay_font();
        fonts.set(OVERLAY_FONT, Object::Reference(font_id));
        resources.set("Font", Object::Dictionary(fonts));
        resources
    }

    /// Content streams of the background page, isolated in `q ... Q`.
    fn page_contents(&mut self, page: &Dictionary) -> Vec<Object> {
        let doc = &self.doc;
        let existing: Vec<Object> = match page.get(b"Contents").ok() {
            Some(Object::Array(items)) => items.clone(),
            Some(Object::Reference(id)) => match doc.get_object(*id) {
                Ok(Object::Array(items)) => items.clone(),
                _ => vec![Object::Reference(*id)],
            },
            _ => Vec::new(),
        };
        if existing.is_empty() {
            return existing;
        }
        let push = self.doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let pop = self.doc.add_object(Stream::new(dictionary! {}, b"\nQ\n".to_vec()));
        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(push));
        contents.extend(existing);
        contents.push(Object::Reference(pop));
        contents
    }

    fn write_page_tree(&mut self) -> Result<()> {
        let kids: Vec<Object> = self.output_pages.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let root_id = self.doc.trailer.get(b"Root")?.as_reference()?;
        self.doc
            .get_object_mut(root_id)?
            .as_dict_mut()?
            .set("Pages", Object::Reference(self.pages_id));
        self.doc.prune_objects();
        Ok(())
    }
}

impl Compositor for LopdfCompositor {
    fn merge(&mut self, background_index: usize, overlay: Vec<u8>) -> Result<()> {
        let Some(&source_id) = self.template_pages.get(background_index) else {
            return Err(FormError::MissingBackgroundPage {
                index: background_index,
                available: self.template_pages.len(),
            });
        };
        let source = self.doc.get_dictionary(source_id)?.clone();

        // Form widgets stay with the template page; copies are flat.
        let mut page = source.clone();
        for key in SOURCE_BOUND {
            page.remove(key);
        }
        for key in INHERITABLE {
            if !page.has(key)
                && let Some(value) = inherited(&self.doc, &source, key)
            {
                let value = resolve(&self.doc, value).clone();
                page.set(key.to_vec(), value);
            }
        }
        let resources = self.page_resources(&source);
        page.set("Resources", Object::Dictionary(resources));

        let mut contents = self.page_contents(&source);
        if !overlay.is_empty() {
            let overlay_id = self.doc.add_object(Stream::new(dictionary! {}, overlay));
            contents.push(Object::Reference(overlay_id));
        }
        page.set("Contents", Object::Array(contents));
        page.set("Parent", Object::Reference(self.pages_id));

        let page_id = self.doc.add_object(Object::Dictionary(page));
        self.output_pages.push(page_id);
        debug!(
            output_page = self.output_pages.len(),
            background = background_index + 1,
            "merged page"
        );
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.output_pages.len()
    }

    fn finish(mut self, path: &Path) -> Result<()> {
        self.write_page_tree()?;
        self.doc.save(path)?;
        Ok(())
    }
}
