//! Synthetic PDF fixtures built with lopdf.
//!
//! Everything is drawn in Helvetica without a `/Widths` array, so glyph
//! positions follow the built-in AFM metrics.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub const PAGE_W: f64 = 612.0;
pub const PAGE_H: f64 = 792.0;

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

/// `s` set at (x, y) baseline in PDF space.
pub fn text(x: f64, y: f64, size: f64, s: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), real(size)]),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new("Tj", vec![Object::string_literal(s)]),
        Operation::new("ET", vec![]),
    ]
}

pub fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Operation> {
    vec![
        Operation::new("m", vec![real(x0), real(y0)]),
        Operation::new("l", vec![real(x1), real(y1)]),
        Operation::new("S", vec![]),
    ]
}

/// A ruled grid with one text line per `\n`-separated part of each cell.
///
/// `top` is the PDF y of the top border; rows are `row_h` tall.
pub fn ruled_table(xs: &[f64], top: f64, row_h: f64, rows: &[Vec<String>]) -> Vec<Operation> {
    let mut ops = Vec::new();
    let bottom = top - row_h * rows.len() as f64;
    let (left, right) = (xs[0], xs[xs.len() - 1]);
    for r in 0..=rows.len() {
        let y = top - row_h * r as f64;
        ops.extend(line(left, y, right, y));
    }
    for &x in xs {
        ops.extend(line(x, top, x, bottom));
    }
    for (r, row) in rows.iter().enumerate() {
        let row_top = top - row_h * r as f64;
        for (c, cell) in row.iter().enumerate() {
            for (l, part) in cell.split('\n').enumerate() {
                if !part.is_empty() {
                    ops.extend(text(xs[c] + 3.0, row_top - 9.0 - 9.0 * l as f64, 7.0, part));
                }
            }
        }
    }
    ops
}

pub fn cells(row: &[&str]) -> Vec<String> {
    row.iter().map(|s| s.to_string()).collect()
}

/// Column borders of the fixture BOM: LV, DESCRIPTION, MATERIAL, AUTH QTY.
pub const BOM_COLUMNS: [f64; 5] = [40.0, 80.0, 300.0, 440.0, 520.0];
pub const BOM_HEADER: [&str; 4] = ["LV", "DESCRIPTION", "MATERIAL", "AUTH QTY"];

/// One ruled BOM table per page, header repeated on each page.
pub fn bom_pages(pages: &[Vec<Vec<String>>]) -> Vec<Vec<Operation>> {
    pages
        .iter()
        .map(|rows| {
            let mut all = vec![cells(&BOM_HEADER)];
            all.extend(rows.iter().cloned());
            ruled_table(&BOM_COLUMNS, 740.0, 24.0, &all)
        })
        .collect()
}

/// `n` packable rows `ITEM 1..n`, `per_page` to a page.
pub fn numbered_rows(n: usize, per_page: usize) -> Vec<Vec<Vec<String>>> {
    let rows: Vec<Vec<String>> = (1..=n)
        .map(|i| {
            vec![
                "B".to_string(),
                format!("PART {i}\nITEM {i}"),
                format!("5820{:09}", i),
                (i % 5 + 1).to_string(),
            ]
        })
        .collect();
    rows.chunks(per_page).map(<[_]>::to_vec).collect()
}

/// Labels of a blank packing list, one word each.
pub fn template_page() -> Vec<Operation> {
    let mut ops = Vec::new();
    for (x, y, label) in [
        (44.0, 720.0, "UNIT"),
        (300.0, 720.0, "REQUISITION"),
        (480.0, 740.0, "PAGE"),
        (480.0, 720.0, "BOXES"),
        (300.0, 700.0, "ORDER-NO"),
        (480.0, 700.0, "DATE"),
        (44.0, 680.0, "END-ITEM"),
        (300.0, 680.0, "MODEL"),
        (44.0, 60.0, "PACKED-BY"),
        (320.0, 60.0, "RECEIVED-BY"),
    ] {
        ops.extend(text(x, y, 8.0, label));
    }
    ops.extend(line(44.0, 616.0, 566.0, 616.0));
    ops
}

/// Assemble a document: shared Helvetica `/F1`, letter media box on the
/// page tree root.
pub fn build_document(pages: Vec<Vec<Operation>>) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids = Vec::new();
    for ops in pages {
        let data = Content { operations: ops }.encode().unwrap();
        let content_id = doc.add_object(Stream::new(dictionary! {}, data));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_W as i64),
                Object::Integer(PAGE_H as i64),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

pub fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
    let mut doc = build_document(pages);
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

pub fn template_pdf() -> Vec<u8> {
    build_pdf(vec![template_page()])
}

pub fn bom_pdf(pages: &[Vec<Vec<String>>]) -> Vec<u8> {
    build_pdf(bom_pages(pages))
}
