//! pdfoutline CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::{self, BatchEvent};
use pdfoutline::config::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, INPUT_DIR_ENV, OUTPUT_DIR_ENV};
use pdfoutline::outline::{self, OutlineOptions, OutlineStrategy};
use pdfoutline::persona::{self, HashedNgramEmbedder, PersonaRequest};
use pdfoutline::{
    parse_file_with_options, BatchConfig, BatchReport, JsonFormat, PageSelection, ParseOptions,
};

type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(version)]
#[command(about = "Extract PDF heading outlines to JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a JSON outline for every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(short, long, value_name = "DIR", env = INPUT_DIR_ENV, default_value = DEFAULT_INPUT_DIR)]
        input: PathBuf,

        /// Directory receiving JSON outlines
        #[arg(short, long, value_name = "DIR", env = OUTPUT_DIR_ENV, default_value = DEFAULT_OUTPUT_DIR)]
        output: PathBuf,

        /// Process one file at a time
        #[arg(long)]
        sequential: bool,

        /// Heading source
        #[arg(long, value_enum, default_value = "heuristic")]
        strategy: StrategyArg,

        /// Exit with status 1 if any file fails
        #[arg(long)]
        strict: bool,
    },

    /// Extract the outline of a single PDF
    Outline {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Heading source
        #[arg(long, value_enum, default_value = "heuristic")]
        strategy: StrategyArg,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Rank document sections for a persona and task
    Analyze {
        /// Request JSON with persona, job_to_be_done and documents
        #[arg(long = "input-json", alias = "input_json", value_name = "FILE")]
        input_json: PathBuf,

        /// Directory holding the listed documents
        #[arg(long = "docs-dir", alias = "docs_dir", value_name = "DIR")]
        docs_dir: PathBuf,

        /// Where to write the report
        #[arg(long = "output-file", alias = "output_file", value_name = "FILE")]
        output_file: PathBuf,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    /// Infer headings from font styles
    Heuristic,
    /// Use the PDF bookmark tree
    Bookmarks,
    /// Bookmarks when present, font styles otherwise
    Auto,
}

impl From<StrategyArg> for OutlineStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Heuristic => OutlineStrategy::Heuristic,
            StrategyArg::Bookmarks => OutlineStrategy::Bookmarks,
            StrategyArg::Auto => OutlineStrategy::Auto,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Batch {
            input,
            output,
            sequential,
            strategy,
            strict,
        }) => {
            let config = BatchConfig::new(input, output)
                .with_strategy(strategy.into())
                .with_parallel(!sequential);
            cmd_batch(&config, strict)
        }
        Some(Commands::Outline {
            input,
            output,
            compact,
            strategy,
            pages,
        }) => cmd_outline(&input, output.as_deref(), compact, strategy, pages.as_deref()),
        Some(Commands::Analyze {
            input_json,
            docs_dir,
            output_file,
        }) => cmd_analyze(&input_json, &docs_dir, &output_file),
        Some(Commands::Info { input, json }) => cmd_info(&input, json),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        // Container entrypoint: directories come from the environment
        None => cmd_default_run(&BatchConfig::from_env()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Run a batch while `on_event` consumes progress on the calling thread.
fn run_batch_with<F>(config: &BatchConfig, mut on_event: F) -> CliResult<BatchReport>
where
    F: FnMut(BatchEvent),
{
    let (tx, rx) = crossbeam_channel::unbounded();
    let report = thread::scope(|s| {
        let worker = s.spawn(move || batch::process_directory_with_events(config, Some(tx)));
        for event in rx.iter() {
            on_event(event);
        }
        worker.join()
    })
    .map_err(|_| "batch worker panicked")??;
    Ok(report)
}

fn cmd_default_run(config: &BatchConfig) -> CliResult {
    println!(
        "Processing PDFs from '{}' into '{}'",
        config.input_dir.display(),
        config.output_dir.display()
    );

    let report = run_batch_with(config, |event| match event {
        BatchEvent::Started { input } => println!("Processing: {}", input.display()),
        BatchEvent::Finished { output, .. } => {
            println!("Successfully created: {}", output.display())
        }
        BatchEvent::Failed { input, error } => eprintln!(
            "An error occurred while processing {}: {}",
            input.display(),
            error
        ),
    })?;

    println!(
        "Done: {} written, {} failed",
        report.processed.len(),
        report.failed.len()
    );
    Ok(())
}

fn cmd_batch(config: &BatchConfig, strict: bool) -> CliResult {
    let total = batch::discover_pdfs(&config.input_dir)?.len();

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = run_batch_with(config, |event| match event {
        BatchEvent::Started { input } => {
            pb.set_message(file_label(&input));
        }
        BatchEvent::Finished { .. } => pb.inc(1),
        BatchEvent::Failed { input, error } => {
            pb.println(format!(
                "{} {}: {}",
                "Failed".red(),
                file_label(&input),
                error
            ));
            pb.inc(1);
        }
    })?;
    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    let count = report.processed.len();
    for (i, done) in report.processed.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        println!(
            "  {} {} ({} headings)",
            branch.dimmed(),
            file_label(&done.output),
            done.headings
        );
    }

    if !report.failed.is_empty() {
        println!(
            "\n{} {} of {} files failed",
            "Warning:".yellow().bold(),
            report.failed.len(),
            report.total()
        );
        if strict {
            return Err(format!("{} files failed", report.failed.len()).into());
        }
    }

    Ok(())
}

fn cmd_outline(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    strategy: StrategyArg,
    pages: Option<&str>,
) -> CliResult {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let options = OutlineOptions::new()
        .with_strategy(strategy.into())
        .with_parse_options(ParseOptions::new().with_pages(page_selection));
    let outline = outline::extract_outline_from_file(input, &options)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = pdfoutline::render::to_json(&outline, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_analyze(input_json: &Path, docs_dir: &Path, output_file: &Path) -> CliResult {
    let request = PersonaRequest::from_path(input_json)?;
    println!(
        "Processing {} documents from '{}'...",
        request.documents.len(),
        docs_dir.display()
    );

    let spinner = ProgressBar::new_spinner();
    spinner.set_message("Ranking sections...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let report = persona::analyze(&request, docs_dir, &HashedNgramEmbedder::default());
    spinner.finish_and_clear();

    let report = report?;
    report.write(output_file)?;

    println!("\n{}", "Top sections:".green().bold());
    for section in &report.extracted_sections {
        println!(
            "  {}. {} {}",
            section.importance_rank,
            section.section_title,
            format!("({}, p. {})", section.document, section.page_number).dimmed()
        );
    }
    println!("\n{} {}", "Output saved to".green(), output_file.display());

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> CliResult {
    // Lenient so metadata still shows when some pages fail
    let options = ParseOptions::new().lenient().with_bookmarks(true);
    let doc = parse_file_with_options(input, options)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&doc.metadata)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), doc.metadata.pdf_version);
    println!("{}: {}", "Pages".bold(), doc.metadata.page_count);
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if doc.metadata.encrypted { "Yes" } else { "No" }
    );

    if let Some(ref title) = doc.metadata.title {
        println!("{}: {}", "Title".bold(), title);
    }
    if let Some(ref author) = doc.metadata.author {
        println!("{}: {}", "Author".bold(), author);
    }
    if let Some(ref subject) = doc.metadata.subject {
        println!("{}: {}", "Subject".bold(), subject);
    }
    if let Some(ref producer) = doc.metadata.producer {
        println!("{}: {}", "Producer".bold(), producer);
    }
    if let Some(ref created) = doc.metadata.created {
        println!("{}: {}", "Created".bold(), created);
    }

    let analysis = outline::analyze(&doc);

    println!();
    println!("{}", "Outline Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Lines".bold(), analysis.line_count);
    if let Some(style) = analysis.body_style {
        println!(
            "{}: {}pt{} #{:06x}",
            "Body style".bold(),
            style.size,
            if style.bold { " bold" } else { "" },
            style.color
        );
    }
    println!("{}: {}", "Title".bold(), analysis.outline.title);
    for (style, level) in &analysis.level_styles {
        println!(
            "{}: {}pt{} ({} headings)",
            level.to_string().bold(),
            style.size,
            if style.bold { " bold" } else { "" },
            analysis.outline.count(*level)
        );
    }
    println!("{}: {}", "Bookmarks".bold(), doc.flat_bookmarks().len());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyze_accepts_underscore_flags() {
        let cli = Cli::try_parse_from([
            "pdfoutline",
            "analyze",
            "--input_json",
            "in.json",
            "--docs_dir",
            "docs",
            "--output_file",
            "out.json",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Analyze { .. })));
    }

    #[test]
    fn test_no_arguments_is_default_run() {
        let cli = Cli::try_parse_from(["pdfoutline"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_default_run_on_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input");
        fs::create_dir(&input).unwrap();
        let config = BatchConfig::new(&input, dir.path().join("output"));

        let report = run_batch_with(&config, |_| {}).unwrap();
        assert_eq!(report.total(), 0);
        assert!(dir.path().join("output").is_dir());
    }
}
