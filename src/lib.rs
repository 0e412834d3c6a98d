//! # Batch Image Compressor Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per host esterni
//!
//! ## Architettura dei moduli:
//! - `config`: Richiesta di conversione, validazione, load/save JSON
//! - `error`: Tipi di errore custom
//! - `codec`: Registry dei codec (JPEG/PNG/WebP/Brotli) e policy estensioni
//! - `path_resolver`: Derivazione pura dei path di output
//! - `file_manager`: Discovery file con pattern glob, filtri età e sampling
//! - `converter`: Worker per singolo file, outcome come dati
//! - `batch`: Orchestratore con worker pool limitato
//! - `report`: Aggregati e rendering del report finale
//! - `progress`: Progress bar per feedback real-time
//! - `scheduler`: Host ricorrente per task schedulati
//!
//! ## Utilizzo:
//! ```rust,no_run
//! use batch_image_compressor::{BatchRunner, ConversionRequest};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let request = ConversionRequest::default();
//! let result = BatchRunner::run(&request).await?;
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod codec;
pub mod config;
pub mod converter;
pub mod error;
pub mod file_manager;
pub mod path_resolver;
pub mod progress;
pub mod report;
pub mod scheduler;

pub use batch::{BatchResult, BatchRunner};
pub use codec::{Codec, ExtensionHandling, OutputMode};
pub use config::ConversionRequest;
pub use converter::{ConversionOutcome, Outcome};
pub use error::CompressError;
pub use file_manager::{FileDescriptor, FileManager};
pub use report::BatchSummary;
pub use scheduler::{ScheduleFile, ScheduledTask};
