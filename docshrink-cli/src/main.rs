use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docshrink::storage::DEFAULT_OUTPUT_DIR;
use docshrink::{DocumentFormat, OptimizationReport, Optimizer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "docshrink",
    about = "Shrink PDF, DOCX and text documents",
    version
)]
struct Cli {
    /// Log each optimization step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize documents into an output directory
    Optimize {
        /// Input files (.pdf, .docx, .txt)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Directory for optimized copies, created if absent
        #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },

    /// List supported formats
    Formats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "docshrink=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Optimize { files, output_dir } => {
            fs::create_dir_all(&output_dir).with_context(|| {
                format!("Failed to create output directory {}", output_dir.display())
            })?;
            let optimizer = Optimizer::new(&output_dir);

            let mut failures = 0;
            for input in &files {
                match optimize_one(&optimizer, input) {
                    Ok(report) => print_report(&report),
                    Err(e) => {
                        eprintln!("Error: {}: {:#}", input.display(), e);
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                bail!("{failures} of {} file(s) failed", files.len());
            }
        }

        Commands::Formats => {
            for format in DocumentFormat::ALL {
                let pass = match format {
                    DocumentFormat::Pdf => "recompress streams",
                    DocumentFormat::Docx => "re-serialize package",
                    DocumentFormat::Txt => "trim surrounding whitespace",
                };
                println!("{:<6} {:<5} {}", format.extension(), format, pass);
            }
        }
    }

    Ok(())
}

fn optimize_one(optimizer: &Optimizer, input: &Path) -> Result<OptimizationReport> {
    let target = optimizer
        .output_dir()
        .join(input.file_name().unwrap_or_default());
    if same_file(input, &target) {
        bail!("output would overwrite the input; choose another --output-dir");
    }

    debug!(input = %input.display(), "Optimizing");
    Ok(optimizer.optimize(input)?)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn print_report(report: &OptimizationReport) {
    println!(
        "✓ {}: {} -> {} bytes ({:.1}% of original)",
        report.output_path.display(),
        report.original_size,
        report.optimized_size,
        report.ratio() * 100.0
    );
}
