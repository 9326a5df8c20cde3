#![deny(missing_docs)]

//! # OASDoc CLI
//!
//! Command Line Interface around the document generator core.
//!
//! Responsibilities kept out of the core: argument parsing, reading input
//! files, selecting the input format by extension, and printing diagnostics.
//! Each input file is handled inside a continue-on-error loop; the run only
//! fails when zero files could be read and parsed.

use clap::Parser;
use oasdoc_core::{AppError, AppResult, Generator, GeneratorOptions, LayoutOptions, TextRenderer};
use std::fs;
use std::path::{Path, PathBuf};

const ACCEPTED_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Parser, Debug)]
#[clap(author, version, about = "Render OpenAPI specs into a paginated reference document")]
struct Cli {
    /// Input spec files (.json, .yaml, .yml).
    #[clap(required = true)]
    inputs: Vec<PathBuf>,

    /// Output artifact path.
    #[clap(long, default_value = "api-reference.txt")]
    output: PathBuf,

    /// Title page title (defaults to the first spec's info.title).
    #[clap(long)]
    title: Option<String>,

    /// Title page subtitle.
    #[clap(long)]
    subtitle: Option<String>,

    /// Merge all files' schemas into one shared namespace.
    #[clap(long)]
    merge_schemas: bool,

    /// Page height used by the layout engine, in lines.
    #[clap(long, default_value_t = 48)]
    lines_per_page: usize,
}

fn main() -> AppResult<()> {
    execute(&Cli::parse())
}

fn execute(cli: &Cli) -> AppResult<()> {
    let options = GeneratorOptions {
        title: cli.title.clone(),
        subtitle: cli.subtitle.clone(),
        merge_schemas: cli.merge_schemas,
        layout: LayoutOptions {
            lines_per_page: cli.lines_per_page,
        },
    };
    let mut generator = Generator::new(options, TextRenderer::new());

    for input in &cli.inputs {
        if !has_accepted_extension(input) {
            eprintln!(
                "warning: skipping '{}': unsupported extension (expected .json, .yaml or .yml)",
                input.display()
            );
            continue;
        }
        match fs::read_to_string(input) {
            Ok(text) => generator.parse(&text, &source_label(input)),
            Err(err) => {
                eprintln!("warning: skipping '{}': {}", input.display(), err);
            }
        }
    }

    let summary = generator.done()?;

    for diagnostic in &summary.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    fs::write(&cli.output, &summary.artifact)
        .map_err(|e| AppError::General(format!("Failed to write output: {}", e)))?;

    println!(
        "Wrote {} ({} pages, {} warnings)",
        cli.output.display(),
        summary.pages,
        summary.diagnostics.len()
    );

    Ok(())
}

fn has_accepted_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
