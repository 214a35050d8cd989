//! bomdump - Show what the extractor sees in a BOM PDF
//!
//! Prints, per page, the positioned words and the ruled tables found by the
//! reader, followed by the line items the extraction rules produce. Useful
//! for tuning header keywords and tolerances against a new BOM layout.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use dd1750_core::reader::types::{Table, Word};
use dd1750_core::{BomItem, DocumentReader, GenerateConfig, PdfDocument, extract_items};
use serde::Serialize;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

/// Output format for the dump.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    /// Human-readable listing (default)
    #[default]
    Text,
    /// One JSON document
    Json,
}

/// Dump words, tables and extracted line items of a BOM PDF.
#[derive(Parser, Debug)]
#[command(name = "bomdump")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the BOM PDF
    file: PathBuf,

    /// First page to dump and extract from (0-indexed)
    #[arg(long = "start-page", default_value = "0")]
    start_page: usize,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Omit per-word positions
    #[arg(long = "no-words", action = ArgAction::SetTrue)]
    no_words: bool,

    /// TOML configuration file (only the [extract] section is used)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,
}

#[derive(Serialize)]
struct PageDump {
    page: usize,
    height: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    words: Vec<Word>,
    tables: Vec<Table>,
}

#[derive(Serialize)]
struct Dump {
    pages: Vec<PageDump>,
    items: Vec<BomItem>,
}

fn collect(doc: &PdfDocument, args: &Args, config: &GenerateConfig) -> Dump {
    let mut pages = Vec::new();
    for page in args.start_page..doc.page_count() {
        let words = if args.no_words {
            Vec::new()
        } else {
            doc.page_words(page).unwrap_or_else(|e| {
                warn!(page, error = %e, "cannot read words");
                Vec::new()
            })
        };
        let tables = doc.page_tables(page).unwrap_or_else(|e| {
            warn!(page, error = %e, "cannot read tables");
            Vec::new()
        });
        pages.push(PageDump {
            page,
            height: doc.page_height(page).unwrap_or_default(),
            words,
            tables,
        });
    }
    let items = extract_items(doc, args.start_page, &config.extract);
    Dump { pages, items }
}

fn cell_text(cell: &Option<String>) -> String {
    cell.as_deref().unwrap_or("").replace('\n', "\\n")
}

fn write_text<W: Write>(out: &mut W, dump: &Dump) -> io::Result<()> {
    for page in &dump.pages {
        writeln!(out, "=== page {} (height {:.1}) ===", page.page, page.height)?;
        for w in &page.words {
            writeln!(
                out,
                "  {:>7.2} {:>7.2} {:>7.2} {:>7.2}  {}",
                w.x0, w.top, w.x1, w.bottom, w.text
            )?;
        }
        for (t, table) in page.tables.iter().enumerate() {
            writeln!(out, "  table {t}: {} rows", table.len())?;
            for row in table {
                let cells: Vec<String> = row.iter().map(cell_text).collect();
                writeln!(out, "    | {} |", cells.join(" | "))?;
            }
        }
    }
    writeln!(out, "=== {} items ===", dump.items.len())?;
    for item in &dump.items {
        writeln!(
            out,
            "{:>4}  {:<50}  {:<9}  {}",
            item.line_no, item.description, item.nsn, item.qty
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => GenerateConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GenerateConfig::default(),
    };
    let doc = PdfDocument::open(&args.file).with_context(|| format!("failed to open {}", args.file.display()))?;
    let dump = collect(&doc, &args, &config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match args.format {
        Format::Text => write_text(&mut out, &dump)?,
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, &dump)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
