//! Prism CLI - command-line model converter.
//!
//! Converts `.pmd`/`.pmg` model pairs from a base directory into the
//! `.pim`/`.pit`/`.pis` text containers under an export directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::{MatchOptions, Pattern};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use walkdir::WalkDir;

use prism::prelude::*;

/// Prism - model container converter
#[derive(Parser)]
#[command(name = "prismconv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert models into text containers
    Convert {
        /// Base directory holding the game files
        #[arg(short, long, env = "PRISM_BASE")]
        base: PathBuf,

        /// Export directory
        #[arg(short, long, env = "PRISM_EXPORT")]
        export: PathBuf,

        /// Virtual model paths, with or without the `.pmd` extension
        models: Vec<String>,

        /// Convert every model found under the base directory
        #[arg(short, long, conflicts_with = "models")]
        all: bool,

        /// Filter pattern for discovered models (glob-style)
        #[arg(short, long, requires = "all")]
        filter: Option<String>,
    },

    /// Print a summary of a model
    Info {
        /// Base directory holding the game files
        #[arg(short, long, env = "PRISM_BASE")]
        base: PathBuf,

        /// Virtual model path, with or without the `.pmd` extension
        model: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            base,
            export,
            models,
            all,
            filter,
        } => {
            let models = if all {
                let filter = filter.as_deref().map(model_filter).transpose()?;
                discover_models(&base, filter.as_ref())
            } else {
                models.iter().map(|model| model_path(model)).collect()
            };
            cmd_convert(&base, &export, &models)?;
        }
        Commands::Info { base, model, json } => {
            cmd_info(&base, &model_path(&model), json)?;
        }
    }

    Ok(())
}

fn cmd_convert(base: &Path, export: &Path, models: &[String]) -> Result<()> {
    if models.is_empty() {
        anyhow::bail!("No models to convert");
    }

    println!("Converting {} models from {}", models.len(), base.display());

    let source = DirectorySource::new(base);
    let ctx = LoadContext::new(&source, &MatFileLoader);

    let pb = ProgressBar::new(models.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let converted = AtomicUsize::new(0);
    let errors = AtomicUsize::new(0);

    models.par_iter().for_each(|path| {
        let mut model = Model::new();
        match model.load(&ctx, path) {
            Ok(()) => {
                let report = model.export(export);
                if report.geometry && report.traits {
                    converted.fetch_add(1, Ordering::Relaxed);
                } else {
                    errors.fetch_add(1, Ordering::Relaxed);
                }
            }
            Err(e) => {
                pb.suspend(|| eprintln!("Error loading {path}: {e}"));
                errors.fetch_add(1, Ordering::Relaxed);
            }
        }
        pb.inc(1);
    });

    pb.finish_with_message("Done");
    println!(
        "Converted {} models in {:?} ({} errors)",
        converted.load(Ordering::Relaxed),
        start.elapsed(),
        errors.load(Ordering::Relaxed)
    );

    Ok(())
}

/// Counts printed by `info`.
#[derive(Serialize)]
struct ModelInfo<'a> {
    path: &'a str,
    vertices: usize,
    triangles: usize,
    skin_vertices: usize,
    materials: u32,
    pieces: usize,
    parts: usize,
    bones: usize,
    locators: usize,
    looks: Vec<&'a str>,
    variants: Vec<&'a str>,
    warnings: Vec<String>,
}

impl<'a> ModelInfo<'a> {
    fn new(model: &'a Model) -> Self {
        Self {
            path: model.file_path(),
            vertices: model.vertex_count(),
            triangles: model.triangle_count(),
            skin_vertices: model.skin_vertex_count(),
            materials: model.material_count(),
            pieces: model.pieces().len(),
            parts: model.parts().len(),
            bones: model.bones().len(),
            locators: model.locators().len(),
            looks: model.looks().iter().map(|look| look.name.as_str()).collect(),
            variants: model.variants().iter().map(|variant| variant.name.as_str()).collect(),
            warnings: model.warnings().iter().map(ToString::to_string).collect(),
        }
    }
}

fn cmd_info(base: &Path, path: &str, json: bool) -> Result<()> {
    let source = DirectorySource::new(base);
    let mut model = Model::new();
    model
        .load(&LoadContext::new(&source, &MatFileLoader), path)
        .with_context(|| format!("Failed to load model {path}"))?;

    let info = ModelInfo::new(&model);
    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Model: {}", info.path);
    println!(
        "  {} vertices, {} triangles ({} skinned vertices)",
        info.vertices, info.triangles, info.skin_vertices
    );
    println!(
        "  {} pieces, {} parts, {} bones, {} locators, {} materials",
        info.pieces, info.parts, info.bones, info.locators, info.materials
    );
    println!("  Looks: {}", info.looks.join(", "));
    println!("  Variants: {}", info.variants.join(", "));
    for warning in &info.warnings {
        println!("  Warning: {warning}");
    }

    Ok(())
}

/// Normalize a model argument to a virtual path without extension.
fn model_path(arg: &str) -> String {
    let path = arg.replace('\\', "/");
    let path = path.strip_suffix(".pmd").unwrap_or(&path);
    format!("/{}", path.trim_start_matches('/'))
}

/// Find every descriptor under `base` and return the virtual model paths.
fn discover_models(base: &Path, filter: Option<&Pattern>) -> Vec<String> {
    let mut models: Vec<String> = WalkDir::new(base)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().and_then(|ext| ext.to_str()) == Some("pmd"))
        .filter_map(|e| {
            let relative = e.path().strip_prefix(base).ok()?;
            Some(model_path(&relative.to_string_lossy()))
        })
        .filter(|path| filter.map_or(true, |pattern| pattern.matches_with(path, MATCH_OPTIONS)))
        .collect();
    models.sort();
    models
}

/// Case-insensitive matching; `*` also crosses directory separators.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Compile a `--filter` value. A pattern without wildcards matches anywhere in the path.
fn model_filter(pattern: &str) -> Result<Pattern> {
    let glob = if pattern.contains(|c: char| matches!(c, '*' | '?' | '[')) {
        pattern.to_string()
    } else {
        format!("*{}*", Pattern::escape(pattern))
    };
    Pattern::new(&glob).with_context(|| format!("Invalid filter pattern {pattern:?}"))
}
