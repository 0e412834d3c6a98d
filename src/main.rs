//! # Batch Image Compressor - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della richiesta di conversione e avvio del batch
//! - Modalità schedulata: esecuzione ricorrente da un file di task JSON
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (source, target, pattern, mode, quality, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Con `--tasks`: carica il file di schedule e gira fino a Ctrl-C
//! 4. Altrimenti: valida la richiesta, esegue un singolo batch, stampa il report
//!
//! ## Esempio di utilizzo:
//! ```bash
//! image-compressor /data/images /data/out -p "*.bmp" -m brotli --parallel 8
//! image-compressor --tasks /etc/image-compressor/tasks.json
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use batch_image_compressor::{
    report, scheduler, BatchRunner, ConversionRequest, OutputMode, ScheduleFile,
};

#[derive(Parser)]
#[command(name = "image-compressor")]
#[command(about = "Batch-convert image files between formats")]
struct Args {
    /// Path to search. Defaults to the current directory
    source_path: Option<PathBuf>,

    /// Path to store converted files. Defaults to the source path
    target_path: Option<PathBuf>,

    /// Search pattern to discover files
    #[arg(short = 'p', long, default_value = "*.bmp")]
    pattern: String,

    /// Include subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Output format: jpeg, png, webp, webp-lossless, brotli, brotli-decompress
    #[arg(short, long, default_value = "jpeg", value_parser = OutputMode::parse)]
    mode: OutputMode,

    /// Quality used for output (default: 98 for jpeg, 75 for webp, 4 for brotli)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Ratio of files to process. Use 0.025 to convert 2.5% of all files
    #[arg(long)]
    sample: Option<f64>,

    /// Only process files created at least this many days ago
    #[arg(long)]
    min_age_days: Option<f64>,

    /// Only process files created at most this many days ago
    #[arg(long)]
    max_age_days: Option<f64>,

    /// Overwrite output files that already exist
    #[arg(long)]
    overwrite: bool,

    /// Delete original file after conversion
    #[arg(short, long)]
    delete: bool,

    /// Number of concurrent conversions
    #[arg(long, default_value = "4")]
    parallel: usize,

    /// Run the named tasks from a JSON schedule file instead of a one-shot batch
    #[arg(long)]
    tasks: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Scheduled mode: arm the tasks and run until interrupted
    if let Some(ref tasks_path) = args.tasks {
        let schedule = ScheduleFile::from_file(tasks_path).await?;
        return scheduler::run_schedule(schedule.tasks).await;
    }

    let request = ConversionRequest {
        source_path: args.source_path.unwrap_or_else(|| PathBuf::from(".")),
        target_path: args.target_path,
        search_pattern: args.pattern,
        recursive: args.recursive,
        mode: args.mode,
        quality: args.quality,
        sample_ratio: args.sample,
        min_age_days: args.min_age_days,
        max_age_days: args.max_age_days,
        overwrite_existing: args.overwrite,
        delete_original: args.delete,
        parallel: args.parallel,
    };

    info!(
        "Compressing {} files to {:?}",
        request.search_pattern, request.mode
    );
    if let Some(ratio) = request.sample_ratio {
        if ratio < 1.0 {
            info!("Sampling {} % of matching files", ratio * 100.0);
        }
    }
    info!("  from {}", request.source_root().display());
    info!("  to   {}", request.target_root().display());

    let result = BatchRunner::run(&request).await?;
    report::render(&request, &result);

    Ok(())
}
