use anyhow::{Context, Result};
use cachesweep::{
    builtin_categories, install_interrupt_handler, sweep_with, SweepOptions, EXIT_FAILED,
    EXIT_INTERRUPTED,
};
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Delete regenerable caches (bytecode, test-runner, coverage, linter) under a project tree",
    long_about = None
)]
struct Args {
    /// Directory to sweep (defaults to current directory)
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Show what would be removed, but don't delete anything
    #[arg(long)]
    dry_run: bool,

    /// Log every removed entry
    #[arg(long, short)]
    verbose: bool,

    /// Directory names to never descend into (can be specified multiple times)
    #[arg(long, short = 'x', value_name = "DIR")]
    exclude: Vec<String>,

    /// List the built-in categories and exit
    #[arg(long)]
    list: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let categories = builtin_categories().context("Failed to load built-in categories")?;

    if args.list {
        for category in &categories {
            println!(
                "{:<20} {:<16} {}",
                category.kind.to_string(),
                category.pattern,
                category.label
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let options = SweepOptions {
        dry_run: args.dry_run,
        progress: true,
        exclude: args.exclude,
        abort: install_interrupt_handler(),
    };

    println!("[CLEAN] Cleaning up local caches and temporary files...");

    let report = sweep_with(&args.root, &categories, &options)
        .with_context(|| format!("Cannot sweep {}", args.root.display()))?;

    println!("{}", report.summary(args.dry_run));
    if args.dry_run {
        println!("Dry run mode: No files were deleted.");
    }

    let code = report.exit_code();
    let final_line = report.final_line();
    match code {
        EXIT_INTERRUPTED => println!("{}", final_line.yellow().bold()),
        EXIT_FAILED => println!("{}", final_line.red().bold()),
        _ => println!("{}", final_line.green()),
    }

    Ok(ExitCode::from(code))
}
