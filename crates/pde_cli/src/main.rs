//! pde CLI: preprocess, check, or inspect Processing sketches.
//!
//! Logging: `RUST_LOG=pde_preproc=debug` (or `-v`) shows the preprocessor's
//! decisions on stderr.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pde_issue::{MessageSimplifier, MessageTable};
use pde_preproc::{Preprocessor, PreprocessorOptions, PreprocessorResult, SketchSource};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pde", about = "pde: Processing sketches to Java")]
struct Cli {
    /// Log preprocessor decisions at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,
    /// JSON file with preprocessor options.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// JSON file overriding diagnostic message templates.
    #[arg(long, global = true)]
    messages: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SketchArgs {
    /// Tab files, main tab first.
    #[arg(required = true)]
    tabs: Vec<PathBuf>,
    /// Class name (defaults to the main tab's name).
    #[arg(long)]
    name: Option<String>,
    /// Package for the generated class.
    #[arg(long)]
    package: Option<String>,
    #[arg(long)]
    tab_size: Option<usize>,
    /// Omit the timestamp banner.
    #[arg(long)]
    testing: bool,
    /// Package from the sketch's code folder; repeatable.
    #[arg(long = "code-folder")]
    code_folder: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Preprocess a sketch and emit Java.
    Preprocess {
        #[command(flatten)]
        sketch: SketchArgs,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Preprocess and report diagnostics only.
    Check {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Print the result (mode, imports, edits, issues) as JSON.
    Edits {
        #[command(flatten)]
        sketch: SketchArgs,
    },
    /// Parse one tab and dump the syntax tree.
    Parse { input: PathBuf },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "pde=debug" } else { "pde=info" }));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Preprocess { sketch, output } => {
            let (source, result) =
                run(&sketch, cli.config.as_deref(), cli.messages.as_deref())?;
            match &result {
                PreprocessorResult::Success(pre) => {
                    match &output {
                        Some(path) => std::fs::write(path, pre.java_source())
                            .with_context(|| format!("failed to write {}", path.display()))?,
                        None => print!("{}", pre.java_source()),
                    }
                    eprintln!("OK: {} ({} mode)", pre.class_name(), pre.mode());
                }
                PreprocessorResult::Failure { .. } => {
                    report(&source, &result);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Check { sketch } => {
            let (source, result) =
                run(&sketch, cli.config.as_deref(), cli.messages.as_deref())?;
            if !result.is_success() {
                report(&source, &result);
                return Ok(ExitCode::FAILURE);
            }
            let names: Vec<&str> = source.tabs().iter().map(|t| t.name.as_str()).collect();
            eprintln!("OK: {}", names.join(", "));
        }
        Commands::Edits { sketch } => {
            let (_, result) = run(&sketch, cli.config.as_deref(), cli.messages.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Parse { input } => {
            let source = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            match pde_parser::parse_sketch(&source) {
                Ok(sketch) => println!("{sketch:#?}"),
                Err(err) => {
                    eprintln!("{}:{}:{}: {}", input.display(), err.line, err.col, err.message);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn run(
    args: &SketchArgs,
    config: Option<&Path>,
    messages: Option<&Path>,
) -> Result<(SketchSource, PreprocessorResult)> {
    let source = SketchSource::from_files(&args.tabs).context("failed to read sketch tabs")?;

    let mut options = match config {
        Some(path) => PreprocessorOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => PreprocessorOptions::default(),
    };
    match (&args.name, config) {
        (Some(name), _) => options.sketch_name = name.clone(),
        (None, None) => {
            if let Some(main) = source.tabs().first() {
                options.sketch_name = main.name.clone();
            }
        }
        (None, Some(_)) => {}
    }
    if args.package.is_some() {
        options.destination_package = args.package.clone();
    }
    if let Some(tab_size) = args.tab_size {
        options.tab_size = tab_size;
    }
    options.testing |= args.testing;
    options.code_folder_packages.extend(args.code_folder.iter().cloned());

    let table = match messages {
        Some(path) => MessageTable::load(path)
            .with_context(|| format!("failed to load messages from {}", path.display()))?,
        None => MessageTable::default(),
    };
    debug!(
        sketch = %options.sketch_name,
        tabs = source.tabs().len(),
        "preprocessing"
    );
    let preprocessor = Preprocessor::with_simplifier(options, MessageSimplifier::new(table)?);
    let result = preprocessor.preprocess(&source)?;
    Ok((source, result))
}

/// Print each issue against the tab it falls in.
fn report(source: &SketchSource, result: &PreprocessorResult) {
    for issue in result.issues() {
        let at = source.locate_line(issue.line);
        let tab = source
            .tabs()
            .get(at.tab_index)
            .map_or("?", |t| t.name.as_str());
        eprintln!("{tab}:{}:{}: {}", at.line, issue.char_offset, issue.message);
    }
}
