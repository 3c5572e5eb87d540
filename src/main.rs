use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use receipt_points::{example_receipts, score, score_breakdown, validate, Receipt};

#[derive(Parser)]
#[command(name = "receipt-points", version, about = "Validate receipts and compute loyalty points")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a receipt JSON file against the field rules
    Validate { file: PathBuf },

    /// Validate a receipt JSON file and print its points
    Points {
        file: PathBuf,

        /// Show what each rule contributed
        #[arg(long)]
        breakdown: bool,
    },

    /// Print the points of the built-in sample receipts
    Examples,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file } => run_validate(&file),
        Command::Points { file, breakdown } => run_points(&file, breakdown),
        Command::Examples => run_examples(),
    }
}

fn run_validate(file: &Path) -> Result<()> {
    let receipt = read_receipt(file)?;

    match validate(&receipt) {
        Ok(()) => {
            println!("valid");
            Ok(())
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run_points(file: &Path, breakdown: bool) -> Result<()> {
    let receipt = read_receipt(file)?;
    if let Err(e) = validate(&receipt) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let points = score_breakdown(&receipt)
        .with_context(|| format!("Failed to score receipt {:?}", file))?;
    let total = points
        .total()
        .with_context(|| format!("Points for receipt {:?} do not fit in 64 bits", file))?;

    if breakdown {
        println!("retailer name      {:>5}", points.retailer_name);
        println!("round dollar       {:>5}", points.round_dollar);
        println!("multiple of 0.25   {:>5}", points.quarter_multiple);
        println!("item pairs         {:>5}", points.item_pairs);
        println!("item descriptions  {:>5}", points.item_descriptions);
        println!("odd day            {:>5}", points.odd_day);
        println!("2pm - 4pm          {:>5}", points.afternoon);
        println!("total              {:>5}", total);
    } else {
        println!("{}", total);
    }

    Ok(())
}

fn run_examples() -> Result<()> {
    for receipt in example_receipts() {
        let points = score(&receipt).context("Failed to score example receipt")?;
        println!(
            "{}  {:<20} {:>4}",
            receipt.id().unwrap_or("-"),
            receipt.retailer(),
            points
        );
    }
    Ok(())
}

fn read_receipt(file: &Path) -> Result<Receipt> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read receipt file: {:?}", file))?;

    serde_json::from_str(&content).context("Failed to parse receipt JSON")
}
