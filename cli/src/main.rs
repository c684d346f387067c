//! pdfhighlight CLI - highlight regex matches in a PDF

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfhighlight::{compile_literal, compile_pattern, DocumentProcessor, HighlightOptions, Rgb};

/// Shortest search term accepted.
const MIN_TERM_LEN: usize = 2;

#[derive(Parser)]
#[command(name = "pdfhighlight")]
#[command(version)]
#[command(about = "Highlight lines of a PDF that match a regular expression")]
#[command(
    long_about = "Highlight lines of a PDF that match a regular expression.\n\n\
                  Every page of <INPUTFILE> is copied to <OUTPUTFILE> with a rounded \
                  rectangle painted behind each text run that contains a match. \
                  <OUTPUTFILE> is overwritten if it exists."
)]
struct Cli {
    /// Regular expression to search for (at least 2 characters)
    #[arg(value_name = "SEARCHTERM")]
    searchterm: String,

    /// Input PDF file
    #[arg(value_name = "INPUTFILE")]
    inputfile: PathBuf,

    /// Output PDF file
    #[arg(value_name = "OUTPUTFILE")]
    outputfile: PathBuf,

    /// Highlight color as #RRGGBB
    #[arg(long, default_value = "#ffff00", env = "PDFHIGHLIGHT_COLOR")]
    color: String,

    /// Outline color as #RRGGBB (rectangles are not outlined by default)
    #[arg(long)]
    outline: Option<String>,

    /// Match case-insensitively
    #[arg(short, long)]
    ignore_case: bool,

    /// Treat SEARCHTERM as plain text instead of a regular expression
    #[arg(short = 'F', long)]
    literal: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Why the arguments were rejected before any work started.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    MissingInput,
    ShortTerm,
}

impl Rejection {
    fn message(&self) -> String {
        match self {
            Rejection::MissingInput => "inputfile does not exist".to_string(),
            Rejection::ShortTerm => {
                format!("searchterm is not at least {} characters", MIN_TERM_LEN)
            }
        }
    }
}

/// Check user input in the order the tool reports it.
fn check_args(searchterm: &str, inputfile: &Path) -> Result<(), Rejection> {
    if !inputfile.exists() {
        return Err(Rejection::MissingInput);
    }
    if searchterm.chars().count() < MIN_TERM_LEN {
        return Err(Rejection::ShortTerm);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(rejection) = check_args(&cli.searchterm, &cli.inputfile) {
        println!("{}", rejection.message().yellow());
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    let env = env_logger::Env::default().default_filter_or(default_filter);
    let mut builder = env_logger::Builder::from_env(env);
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pattern = if cli.literal {
        compile_literal(&cli.searchterm, cli.ignore_case)?
    } else {
        compile_pattern(&cli.searchterm, cli.ignore_case)?
    };
    let mut options = HighlightOptions::new().with_color(Rgb::from_hex(&cli.color)?);
    if let Some(outline) = &cli.outline {
        options = options.with_outline(Rgb::from_hex(outline)?);
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    pb.set_message("Highlighting...");

    let summary = DocumentProcessor::with_options(options)
        .on_page(|event| {
            pb.set_length(u64::from(event.total));
            pb.set_position(u64::from(event.page));
        })
        .process(&pattern, &cli.inputfile, &cli.outputfile)?;

    pb.finish_and_clear();
    log::info!("{}", summary);

    println!(
        "{} {} matching lines on {} of {} pages",
        "Highlighted".green(),
        summary.highlights,
        summary.pages_with_matches,
        summary.pages
    );
    println!("{} {}", "Saved to".green(), cli.outputfile.display());
    Ok(())
}
