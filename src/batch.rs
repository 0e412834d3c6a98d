//! # Batch Orchestrator Module
//!
//! Questo è il modulo che orchestra l'intero processo di conversione batch.
//!
//! ## Responsabilità:
//! - Validazione della richiesta prima di toccare qualsiasi file
//! - Materializzazione della lista dei file dalla discovery
//! - Distribuzione del lavoro su un worker pool limitato da semaforo
//! - Raccolta di tutti gli outcome in un unico `BatchResult`
//!
//! ## Flusso di esecuzione:
//! 1. **Validazione**: sample ratio, parallelismo, pattern
//! 2. **Discovery**: lista completa dei file nota prima del processing
//! 3. **Parallel processing**: un task tokio per file, permessi dal semaforo
//! 4. **Progress tracking**: barra aggiornata a ogni file completato
//! 5. **Collection**: outcome raccolti senza garanzie di ordine
//!
//! ## Gestione concorrenza:
//! - `Semaphore` limita i worker concorrenti a `request.parallel`
//! - La chiamata sincrona al codec gira dentro `spawn_blocking`
//! - Nessuno stato condiviso tra worker oltre al filesystem: ogni input
//!   mappa su esattamente un output, quindi nessun lock è necessario
//!
//! ## Error handling:
//! - Gli errori per singolo file non bloccano mai il batch (sono dati)
//! - Solo errori request-level (validazione, source root illeggibile)
//!   abortiscono il run, e sempre prima che un file venga processato

use crate::config::ConversionRequest;
use crate::converter::{self, ConversionOutcome, Outcome};
use crate::file_manager::{FileManager, FileDescriptor};
use crate::progress::ProgressManager;
use anyhow::Result;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::info;

/// All outcomes of one batch run, plus elapsed wall time
#[derive(Debug)]
pub struct BatchResult {
    /// One record per processed file, in completion order
    pub outcomes: Vec<ConversionOutcome>,
    pub elapsed: Duration,
}

/// Single-shot batch runner
pub struct BatchRunner;

impl BatchRunner {
    /// Run one batch to completion and collect every outcome.
    ///
    /// Fails only for request-level problems (invalid configuration or an
    /// unreadable source root); per-file failures are reported as data.
    pub async fn run(request: &ConversionRequest) -> Result<BatchResult> {
        request.validate()?;

        let files = FileManager::discover(request)?;
        info!(
            "Found {} files matching {} under {}",
            files.len(),
            request.search_pattern,
            request.source_root().display()
        );

        let started = Instant::now();
        if files.is_empty() {
            return Ok(BatchResult {
                outcomes: Vec::new(),
                elapsed: started.elapsed(),
            });
        }

        let progress = ProgressManager::new(files.len() as u64);
        let semaphore = Arc::new(Semaphore::new(request.parallel));
        let mut tasks = Vec::with_capacity(files.len());

        for descriptor in files {
            let permit = semaphore.clone().acquire_owned().await?;
            let request = request.clone();
            let progress = progress.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let outcome = Self::convert_on_blocking_pool(descriptor, request).await;
                progress.update(&Self::status_message(&outcome));
                outcome
            }));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        for task in tasks {
            outcomes.push(task.await?);
        }

        let result = BatchResult {
            outcomes,
            elapsed: started.elapsed(),
        };
        progress.finish(&result.summary().format_line());

        Ok(result)
    }

    /// The codec call is synchronous and CPU-bound, keep it off the runtime
    async fn convert_on_blocking_pool(
        descriptor: FileDescriptor,
        request: ConversionRequest,
    ) -> ConversionOutcome {
        let file = descriptor
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| descriptor.path.display().to_string());

        match tokio::task::spawn_blocking(move || converter::convert_file(&descriptor, &request))
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => ConversionOutcome {
                file,
                outcome: Outcome::Failed {
                    original_size: 0,
                    message: format!("Worker task failed: {e}"),
                },
            },
        }
    }

    fn status_message(record: &ConversionOutcome) -> String {
        match &record.outcome {
            Outcome::Success {
                original_size,
                compressed_size,
            } => format!(
                "✅ {}: {:.1}% saved",
                record.file,
                FileManager::calculate_reduction(*original_size, *compressed_size)
            ),
            Outcome::Skipped { .. } => format!("⏩ {}: already exists", record.file),
            Outcome::Failed { .. } => format!("❌ {}: error", record.file),
        }
    }
}
