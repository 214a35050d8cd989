//! dd1750 - Fill a DD Form 1750 packing list from a BOM PDF
//!
//! Reads line items from the bill of materials, paginates them onto the
//! 18-row grid and stamps every page onto a copy of the blank template.
//! Exits with status 2 when the BOM yields no items.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use dd1750_core::{AdminValues, GenerateConfig, generate_with_config, suggested_filename};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

/// Fill a DD Form 1750 from a bill-of-materials PDF.
#[derive(Parser, Debug)]
#[command(name = "dd1750")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Bill-of-materials PDF
    bom: PathBuf,

    /// Blank DD Form 1750 template PDF
    template: PathBuf,

    /// Output path (default: DD1750_<requisition>_<count>_items.pdf)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// First BOM page to read (0-indexed)
    #[arg(long = "start-page", default_value = "0")]
    start_page: usize,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Administrative block ===
    #[arg(long, default_value = "")]
    unit: String,

    #[arg(long = "packed-by", default_value = "")]
    packed_by: String,

    #[arg(long = "num-boxes", default_value = "")]
    num_boxes: String,

    #[arg(long = "requisition-no", default_value = "")]
    requisition_no: String,

    #[arg(long = "order-no", default_value = "")]
    order_no: String,

    /// Packing date; any common format, printed as DDMONYYYY (default: today)
    #[arg(long)]
    date: Option<String>,

    #[arg(long = "end-item", default_value = "")]
    end_item: String,

    #[arg(long, default_value = "")]
    model: String,
}

impl Args {
    fn admin_values(&self) -> AdminValues {
        let date = self
            .date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        AdminValues {
            unit: self.unit.trim().to_string(),
            packed_by: self.packed_by.trim().to_string(),
            num_boxes: self.num_boxes.trim().to_string(),
            requisition_no: self.requisition_no.trim().to_string(),
            order_no: self.order_no.trim().to_string(),
            date: date.trim().to_string(),
            end_item: self.end_item.trim().to_string(),
            model: self.model.trim().to_string(),
        }
        .normalized()
    }
}

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<usize> {
    let config = match &args.config {
        Some(path) => GenerateConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GenerateConfig::default(),
    };
    let admin = args.admin_values();

    // The final name depends on the item count, so write to a staging name
    // first when no output path was given.
    let staging = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(suggested_filename(&admin, 0)));
    let generated = generate_with_config(&args.bom, &args.template, &staging, args.start_page, &admin, &config)
        .with_context(|| format!("failed to generate form from {}", args.bom.display()))?;

    let output = match &args.output {
        Some(path) => path.clone(),
        None => {
            let named = PathBuf::from(suggested_filename(&admin, generated.item_count));
            if named != staging {
                std::fs::rename(&staging, &named)
                    .with_context(|| format!("failed to rename output to {}", named.display()))?;
            }
            named
        }
    };
    info!(output = %output.display(), items = generated.item_count, "done");
    println!("{}", output.display());
    Ok(generated.item_count)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(0) => {
            eprintln!("No items found; wrote the blank template page.");
            ExitCode::from(2)
        }
        Ok(count) => {
            eprintln!("{count} items written.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
