//! End-to-end generation against synthetic BOM and template PDFs.

mod common;

use std::path::Path;

use common::{bom_pdf, cells, numbered_rows};
use dd1750_core::layout::AdminPages;
use dd1750_core::{
    AdminValues, BackgroundPolicy, DocumentReader, FormError, GenerateConfig, PdfDocument, generate,
    generate_from_bytes, generate_with_config,
};
use insta::assert_snapshot;

// ============================================================================
// Helper functions
// ============================================================================

fn admin() -> AdminValues {
    AdminValues {
        unit: "HHC 1-9".to_string(),
        requisition_no: "W81XWH".to_string(),
        date: "2026-01-04".to_string(),
        packed_by: "SGT SMITH".to_string(),
        ..AdminValues::default()
    }
}

fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn output_texts(path: &Path) -> Vec<String> {
    let doc = PdfDocument::open(path).unwrap();
    (0..doc.page_count()).map(|i| doc.page_text(i).unwrap()).collect()
}

// ============================================================================
// File-based generation
// ============================================================================

#[test]
fn test_generate_paginates_onto_template() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", &bom_pdf(&numbered_rows(40, 20)));
    let template = write(dir.path(), "template.pdf", &common::template_pdf());
    let output = dir.path().join("out.pdf");

    let generated = generate(&source, &template, &output, 0, &admin()).unwrap();
    assert_eq!(generated.item_count, 40);
    assert_eq!(generated.output_path, output);

    let pages = output_texts(&output);
    assert_eq!(pages.len(), 3);
    for (i, text) in pages.iter().enumerate() {
        // Template content survives under the overlay.
        assert!(text.contains("REQUISITION"), "page {i}: {text}");
        assert!(text.contains("04JAN2026"), "page {i}: {text}");
        assert!(text.contains(&format!("{}/3", i + 1)), "page {i}: {text}");
    }
    assert!(pages[0].contains("ITEM 18"));
    assert!(!pages[0].contains("ITEM 19"));
    assert!(pages[1].contains("ITEM 19"));
    assert!(pages[2].contains("ITEM 40"));
    assert!(pages[0].contains("NSN: 582000000"));
}

#[test]
fn test_zero_items_copies_blank_template() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(
        dir.path(),
        "bom.pdf",
        &bom_pdf(&[vec![cells(&["A", "SHELTER", "", "1"]), cells(&["C", "BOLT", "", "2"])]]),
    );
    let template = write(dir.path(), "template.pdf", &common::template_pdf());
    let output = dir.path().join("out.pdf");

    let generated = generate(&source, &template, &output, 0, &admin()).unwrap();
    assert_eq!(generated.item_count, 0);

    let pages = output_texts(&output);
    assert_eq!(pages.len(), 1);
    assert!(pages[0].contains("UNIT"));
    assert!(!pages[0].contains("04JAN2026"));
}

#[test]
fn test_unreadable_bom_degrades_to_zero_items() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", b"this is not a pdf");
    let template = write(dir.path(), "template.pdf", &common::template_pdf());
    let output = dir.path().join("out.pdf");

    let generated = generate(&source, &template, &output, 0, &admin()).unwrap();
    assert_eq!(generated.item_count, 0);
    assert!(output.exists());
}

#[test]
fn test_unreadable_template_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", &bom_pdf(&numbered_rows(2, 2)));
    let template = write(dir.path(), "template.pdf", b"not a pdf at all");
    let output = dir.path().join("out.pdf");

    assert!(generate(&source, &template, &output, 0, &admin()).is_err());
    assert!(!output.exists());
}

#[test]
fn test_template_without_pages_fails() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", &bom_pdf(&numbered_rows(2, 2)));
    let template = write(dir.path(), "template.pdf", &common::build_pdf(vec![]));
    let output = dir.path().join("out.pdf");

    let err = generate(&source, &template, &output, 0, &admin()).unwrap_err();
    assert!(matches!(err, FormError::EmptyTemplate), "{err}");
}

#[test]
fn test_sequential_background_needs_enough_pages() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", &bom_pdf(&numbered_rows(19, 19)));
    let template = write(dir.path(), "template.pdf", &common::template_pdf());
    let output = dir.path().join("out.pdf");
    let config = GenerateConfig {
        background: BackgroundPolicy::Sequential,
        ..GenerateConfig::default()
    };

    let err = generate_with_config(&source, &template, &output, 0, &admin(), &config).unwrap_err();
    assert!(
        matches!(err, FormError::MissingBackgroundPage { index: 1, available: 1 }),
        "{err}"
    );
}

#[test]
fn test_sequential_background_uses_each_template_page() {
    let dir = tempfile::tempdir().unwrap();
    let source = write(dir.path(), "bom.pdf", &bom_pdf(&numbered_rows(19, 19)));
    let mut second = common::text(44.0, 760.0, 8.0, "CONTINUATION");
    second.extend(common::template_page());
    let template = write(
        dir.path(),
        "template.pdf",
        &common::build_pdf(vec![common::template_page(), second]),
    );
    let output = dir.path().join("out.pdf");
    let config = GenerateConfig {
        background: BackgroundPolicy::Sequential,
        admin_pages: AdminPages::First,
        ..GenerateConfig::default()
    };

    generate_with_config(&source, &template, &output, 0, &admin(), &config).unwrap();
    let pages = output_texts(&output);
    assert_eq!(pages.len(), 2);
    assert!(!pages[0].contains("CONTINUATION"));
    assert!(pages[1].contains("CONTINUATION"));
    assert!(pages[0].contains("04JAN2026"));
    assert!(!pages[1].contains("04JAN2026"));
    assert!(pages[1].contains("2/2"));
}

// ============================================================================
// In-memory generation
// ============================================================================

#[test]
fn test_generate_from_bytes() {
    let form = generate_from_bytes(
        &bom_pdf(&numbered_rows(3, 3)),
        &common::template_pdf(),
        0,
        &admin(),
        &GenerateConfig::default(),
    )
    .unwrap();
    assert_eq!(form.item_count, 3);
    assert_snapshot!(form.filename, @"DD1750_W81XWH_3_items.pdf");
    assert!(form.bytes.starts_with(b"%PDF"));

    let doc = PdfDocument::from_bytes(&form.bytes).unwrap();
    assert_eq!(doc.page_count(), 1);
    assert!(doc.page_text(0).unwrap().contains("ITEM 3"));
}

#[test]
fn test_generate_from_bytes_without_items() {
    let form = generate_from_bytes(
        b"garbage",
        &common::template_pdf(),
        0,
        &AdminValues::default(),
        &GenerateConfig::default(),
    )
    .unwrap();
    assert_eq!(form.item_count, 0);
    assert_snapshot!(form.filename, @"DD1750_filled_0_items.pdf");
}
