//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore custom dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce `CompressError` enum per categorizzare gli errori possibili
//! - Integra con `thiserror` per automatic error conversion
//! - Supporta error chaining per mantenere il contesto degli errori
//!
//! ## Categorie di errori:
//! - `Io`: Errori di I/O (file non trovati, permessi, etc.)
//! - `Image`: Errori di decodifica/encoding immagini (formati corrotti, etc.)
//! - `WebpEncode`: Errori specifici dell'encoder WebP
//! - `UnsupportedMode`: Modalità di output non riconosciuta
//! - `Validation`: Errori di validazione della richiesta
//!
//! ## Propagazione:
//! - Gli errori request-level (validazione, modalità) abortiscono il run
//! - Gli errori per-file vengono catturati dal worker e convertiti in dati
//!   (outcome `Failed`), mai propagati oltre

/// Custom error types for batch image compression
#[derive(thiserror::Error, Debug)]
pub enum CompressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("WebP encoding error: {0}")]
    WebpEncode(String),

    #[error("Output mode '{0}' is not supported")]
    UnsupportedMode(String),

    #[error("Validation error: {0}")]
    Validation(String),
}
