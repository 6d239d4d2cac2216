//! Command-line interface for the harvester.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::harvester::crawl;
use crate::http::create_client;
use crate::types::JsonLinesSink;

/// FARA harvester - crawl active foreign principal disclosures.
#[derive(Parser)]
#[command(name = "fara-harvester")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crawl the active foreign principals report and emit JSON lines.
    Crawl {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rows per page request (default: the entire result set in one page)
        #[arg(short, long)]
        page_size: Option<u32>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl { output, page_size } => crawl_command(output.as_deref(), page_size),
    }
}

/// Execute the crawl command.
fn crawl_command(output: Option<&std::path::Path>, page_size: Option<u32>) -> Result<()> {
    let client = create_client()?;

    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    let mut sink = JsonLinesSink::new(writer);

    println!(
        "{} active foreign principals",
        style("Crawling").bold().cyan()
    );

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Fetching...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let stats = match crawl(&client, page_size, &mut sink) {
        Ok(stats) => stats,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    sink.into_inner().flush()?;
    pb.finish_and_clear();

    println!("  Total listed: {}", stats.total_records);
    println!("  Pages: {}", stats.pages_fetched);
    println!("  Emitted: {}", style(stats.records_emitted).green());
    if stats.records_skipped > 0 {
        println!(
            "  Skipped: {}",
            style(stats.records_skipped).yellow().bold()
        );
    }
    if let Some(path) = output {
        println!();
        println!(
            "{} {}",
            style("Saved to:").green().bold(),
            path.display()
        );
    }

    Ok(())
}
