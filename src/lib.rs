//! yoloedit: a bounding-box annotation engine for YOLO datasets.
//!
//! yoloedit keeps rectangular boxes over a directory of images in integer
//! pixel space, edits them through draw, move and resize gestures driven by
//! view-space pointer events, and persists them as YOLO text labels (one
//! normalized `class x_center y_center width height` record per line).
//!
//! # Modules
//!
//! - [`geometry`]: Coordinate spaces, boxes and the view transform
//! - [`classes`]: The class registry and class colors
//! - [`store`]: Per-image box lists, hit testing and gestures
//! - [`yolo`]: YOLO record encoding and decoding
//! - [`layout`]: Label directory and file naming
//! - [`scan`]: Image discovery and dimension probing
//! - [`session`]: The editing session that ties everything together
//! - [`report`]: Batch reports and session summaries
//! - [`error`]: Error types for yoloedit operations

pub mod classes;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod report;
pub mod scan;
pub mod session;
pub mod store;
pub mod yolo;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

pub use error::YoloEditError;

use geometry::{fit_transform, ViewTransform};
use report::{BatchKind, BatchReport};
use session::{OpenOptions, OpenSummary, SaveOutcome, Session};

/// The yoloedit CLI application.
#[derive(Parser)]
#[command(name = "yoloedit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Summarize the classes and annotations of an image directory.
    Inspect(InspectArgs),
    /// Rewrite every label file in canonical form.
    Normalize(RootArgs),
    /// Remove a class and renumber the remaining annotations.
    RemoveClass(RemoveClassArgs),
    /// Show how an image fits into a viewport.
    Fit(FitArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Image directory.
    root: PathBuf,

    /// Output format for the summary.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Arguments naming an image directory.
#[derive(clap::Args)]
struct RootArgs {
    /// Image directory.
    root: PathBuf,
}

/// Arguments for the remove-class subcommand.
#[derive(clap::Args)]
struct RemoveClassArgs {
    /// Image directory.
    root: PathBuf,

    /// Name of the class to remove.
    name: String,
}

/// Arguments for the fit subcommand.
#[derive(clap::Args)]
struct FitArgs {
    image_width: u32,
    image_height: u32,
    viewport_width: u32,
    viewport_height: u32,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    output: OutputFormat,
}

/// Run the yoloedit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), YoloEditError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::Normalize(args)) => run_normalize(args),
        Some(Commands::RemoveClass(args)) => run_remove_class(args),
        Some(Commands::Fit(args)) => run_fit(args),
        None => {
            println!("yoloedit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Bounding-box annotation engine and YOLO label editor.");
            println!();
            println!("Run 'yoloedit --help' for usage information.");
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A logger may already be installed when embedded in tests.
    let _ = builder.try_init();
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), YoloEditError> {
    let mut session = Session::new();
    let opened = session.open(&args.root, OpenOptions::default())?;
    let summary = session.summary(opened.load)?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => print!("{}", summary),
    }
    Ok(())
}

/// Execute the normalize subcommand.
fn run_normalize(args: RootArgs) -> Result<(), YoloEditError> {
    let mut session = Session::new();
    let opened = session.open(&args.root, OpenOptions::default())?;
    refuse_without_classes(&opened)?;
    let Some(load) = opened.load else {
        log::warn!("no classes defined; label files left untouched");
        return Ok(());
    };

    let saved = save_loaded(&mut session, &load);
    print!("{}", load);
    print!("{}", saved);
    Ok(())
}

/// Execute the remove-class subcommand.
fn run_remove_class(args: RemoveClassArgs) -> Result<(), YoloEditError> {
    let mut session = Session::new();
    let opened = session.open(&args.root, OpenOptions::default())?;
    refuse_without_classes(&opened)?;
    let cascade = session.remove_class(&args.name)?;

    let saved = match &opened.load {
        Some(load) => save_loaded(&mut session, load),
        None => BatchReport::new(BatchKind::Save),
    };
    let classes_file = session.save_classes()?;

    println!(
        "Removed class '{}': {} box(es) deleted, {} renumbered across {} image(s)",
        args.name,
        cascade.removed,
        cascade.renumbered,
        cascade.images.len()
    );
    match classes_file {
        Some(path) => println!("Wrote {}", path.display()),
        None => println!("No classes left; class list left untouched"),
    }
    print!("{}", saved);
    Ok(())
}

/// Fails when `classes.txt` exists but could not be read.
fn refuse_without_classes(opened: &OpenSummary) -> Result<(), YoloEditError> {
    match &opened.classes_failure {
        Some(failure) => Err(YoloEditError::ClassesUnavailable(failure.path.clone())),
        None => Ok(()),
    }
}

/// Saves every image whose label file loaded cleanly.
///
/// Images that failed to load are skipped so their label files are never
/// overwritten with an empty annotation set.
fn save_loaded(session: &mut Session, load: &BatchReport) -> BatchReport {
    let failed: BTreeSet<&Path> = load.failures.iter().map(|f| f.path.as_path()).collect();
    let images: Vec<PathBuf> = session.images().map(Path::to_path_buf).collect();
    let mut report = BatchReport::new(BatchKind::Save);

    for image in images {
        if failed.contains(image.as_path()) {
            report.fail(&image, "skipped: label file could not be loaded");
            continue;
        }
        report.total += 1;
        match session.save_image(&image) {
            Ok(SaveOutcome::Written { records }) => {
                report.annotated += 1;
                report.records += records;
            }
            Ok(_) => {}
            Err(err) => {
                log::warn!("{err}");
                report.fail(&image, err.to_string());
            }
        }
    }

    report
}

#[derive(Serialize)]
struct FitReport {
    #[serde(flatten)]
    transform: ViewTransform,
    handle_radius: i32,
}

/// Execute the fit subcommand.
fn run_fit(args: FitArgs) -> Result<(), YoloEditError> {
    let transform = fit_transform(
        args.image_width,
        args.image_height,
        args.viewport_width,
        args.viewport_height,
    );
    let report = FitReport {
        transform,
        handle_radius: transform.handle_radius(),
    };

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("scale: {}", report.transform.scale);
            println!(
                "offset: ({}, {})",
                report.transform.offset_x, report.transform.offset_y
            );
            println!("handle radius: {}", report.handle_radius);
        }
    }
    Ok(())
}
