//! End-to-end generation: BOM + template in, filled form out.
//!
//! This is the one place that decides between degrading and failing. An
//! unreadable BOM degrades to zero items and a copy of the blank template;
//! an unreadable template, a missing background page or a rendering error
//! fails the request.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::GenerateConfig;
use crate::error::Result;
use crate::extract::extract_items;
use crate::layout::paginate;
use crate::locate::{AdminPositions, detect_admin_positions};
use crate::model::{AdminValues, BomItem};
use crate::reader::PdfDocument;
use crate::render::{Compositor, LopdfCompositor};
use crate::workspace::RequestWorkspace;

/// Result of a file-based run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generated {
    pub output_path: PathBuf,
    /// Zero means no qualifying rows were found.
    pub item_count: usize,
}

/// Result of an in-memory run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedForm {
    pub bytes: Vec<u8>,
    pub item_count: usize,
    /// Suggested download name.
    pub filename: String,
}

/// `DD1750_<requisition or "filled">_<count>_items.pdf`.
pub fn suggested_filename(admin: &AdminValues, item_count: usize) -> String {
    let req: String = admin
        .requisition_no
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let req = if req.is_empty() { "filled".to_string() } else { req };
    format!("DD1750_{req}_{item_count}_items.pdf")
}

fn admin_positions(template: &PdfDocument, config: &GenerateConfig) -> AdminPositions {
    let defaults = AdminPositions::dd1750_defaults();
    if !config.detect_admin_positions {
        return defaults;
    }
    match detect_admin_positions(template) {
        Ok(found) => {
            info!(detected = found.len(), "admin labels located on template");
            defaults.merged_with(&found)
        }
        Err(e) => {
            warn!(error = %e, "admin label detection failed, using built-in positions");
            defaults
        }
    }
}

fn read_items(source: &Path, start_page: usize, config: &GenerateConfig) -> Vec<BomItem> {
    match PdfDocument::open(source) {
        Ok(reader) => extract_items(&reader, start_page, &config.extract),
        Err(e) => {
            warn!(path = %source.display(), error = %e, "cannot open BOM, no items extracted");
            Vec::new()
        }
    }
}

/// Generate with the default configuration.
pub fn generate(
    source: &Path,
    template: &Path,
    output: &Path,
    start_page: usize,
    admin: &AdminValues,
) -> Result<Generated> {
    generate_with_config(source, template, output, start_page, admin, &GenerateConfig::default())
}

/// Extract items from `source` (pages `start_page..`, zero-based) and write
/// the filled form to `output`.
pub fn generate_with_config(
    source: &Path,
    template: &Path,
    output: &Path,
    start_page: usize,
    admin: &AdminValues,
    config: &GenerateConfig,
) -> Result<Generated> {
    let admin = admin.clone().normalized();
    let template_doc = PdfDocument::open(template)?;
    let positions = admin_positions(&template_doc, config);
    let items = read_items(source, start_page, config);

    let mut compositor = LopdfCompositor::new(template_doc.into_document())?;
    if items.is_empty() {
        warn!("no items found, writing the blank template page");
        compositor.merge(0, Vec::new())?;
    } else {
        let plans = paginate(&items, &config.geometry, &positions, &admin, config.admin_pages);
        for plan in &plans {
            let overlay = compositor.render_page(plan)?;
            compositor.merge(config.background.background_index(plan.page_index), overlay)?;
        }
    }
    let pages = compositor.page_count();
    compositor.finish(output)?;

    info!(items = items.len(), pages, output = %output.display(), "form written");
    Ok(Generated {
        output_path: output.to_path_buf(),
        item_count: items.len(),
    })
}

/// In-memory variant: inputs and output are staged in a request workspace
/// that is removed before returning.
pub fn generate_from_bytes(
    source: &[u8],
    template: &[u8],
    start_page: usize,
    admin: &AdminValues,
    config: &GenerateConfig,
) -> Result<GeneratedForm> {
    let workspace = RequestWorkspace::new()?;
    let source_path = workspace.stage("bom.pdf", source)?;
    let template_path = workspace.stage("template.pdf", template)?;
    let output_path = workspace.file("dd1750.pdf");

    let generated = generate_with_config(&source_path, &template_path, &output_path, start_page, admin, config)?;
    let bytes = std::fs::read(&generated.output_path)?;
    Ok(GeneratedForm {
        bytes,
        item_count: generated.item_count,
        filename: suggested_filename(admin, generated.item_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_uses_requisition_when_present() {
        let mut admin = AdminValues::default();
        assert_eq!(suggested_filename(&admin, 0), "DD1750_filled_0_items.pdf");
        admin.requisition_no = "W81XWH 26/001".to_string();
        assert_eq!(suggested_filename(&admin, 12), "DD1750_W81XWH_26_001_12_items.pdf");
    }
}
