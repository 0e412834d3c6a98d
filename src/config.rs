//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione di una singola richiesta di
//! conversione batch.
//!
//! ## Responsabilità:
//! - Definisce la struct `ConversionRequest` con tutti i parametri del batch
//! - Fornisce validazione robusta prima che qualsiasi file venga toccato
//! - Supporta caricamento/salvataggio da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri:
//! - `source_path`: Directory da cui leggere (default: directory corrente)
//! - `target_path`: Directory di destinazione (default: None = source_path)
//! - `search_pattern`: Pattern glob per i nomi file (default: "*.bmp")
//! - `recursive`: Discesa nelle sottodirectory (default: false)
//! - `mode`: Modalità di output (default: Jpeg)
//! - `quality`: Qualità codec-specifica (default: None = default del codec)
//! - `sample_ratio`: Frazione di file da processare, in [0, 1]
//! - `min_age_days` / `max_age_days`: Finestra di età dei file
//! - `overwrite_existing`: Sovrascrive output già presenti (default: false)
//! - `delete_original`: Elimina il sorgente dopo la conversione
//! - `parallel`: Numero di worker concorrenti (default: 4)
//!
//! ## Validazione:
//! - `sample_ratio` deve stare in [0, 1]
//! - `parallel` deve essere > 0
//! - I limiti di età non possono essere negativi
//! - La qualità deve rispettare il range del codec scelto
//! - Il pattern glob deve essere sintatticamente valido

use crate::codec::OutputMode;
use crate::error::CompressError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Immutable configuration for one batch conversion run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionRequest {
    /// Directory to search for input files
    pub source_path: PathBuf,
    /// Directory to store converted files (None = source_path)
    pub target_path: Option<PathBuf>,
    /// Shell-glob pattern matched against file names
    pub search_pattern: String,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Output codec selector
    pub mode: OutputMode,
    /// Codec-specific quality (None = codec default)
    pub quality: Option<u8>,
    /// Keep each file with this probability, in [0, 1]
    pub sample_ratio: Option<f64>,
    /// Only process files created at least this many days ago
    pub min_age_days: Option<f64>,
    /// Only process files created at most this many days ago
    pub max_age_days: Option<f64>,
    /// Overwrite output files that already exist
    pub overwrite_existing: bool,
    /// Delete the source file after a successful conversion
    pub delete_original: bool,
    /// Number of concurrent conversions
    pub parallel: usize,
}

impl Default for ConversionRequest {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("."),
            target_path: None,
            search_pattern: "*.bmp".to_string(),
            recursive: false,
            mode: OutputMode::Jpeg,
            quality: None,
            sample_ratio: None,
            min_age_days: None,
            max_age_days: None,
            overwrite_existing: false,
            delete_original: false,
            parallel: 4,
        }
    }
}

impl ConversionRequest {
    /// Root of the source tree
    pub fn source_root(&self) -> &Path {
        &self.source_path
    }

    /// Root of the target tree, falling back to the source root
    pub fn target_root(&self) -> &Path {
        self.target_path.as_deref().unwrap_or(&self.source_path)
    }

    /// Validate the request before any file is touched
    pub fn validate(&self) -> Result<(), CompressError> {
        if let Some(ratio) = self.sample_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(CompressError::Validation(
                    "Sample ratio must be in the range [0, 1]".to_string(),
                ));
            }
        }

        if self.parallel == 0 {
            return Err(CompressError::Validation(
                "Number of parallel workers must be greater than 0".to_string(),
            ));
        }

        if self.min_age_days.is_some_and(|d| d < 0.0)
            || self.max_age_days.is_some_and(|d| d < 0.0)
        {
            return Err(CompressError::Validation(
                "Age bounds must not be negative".to_string(),
            ));
        }

        if let Some(quality) = self.quality {
            match self.mode {
                OutputMode::Jpeg | OutputMode::Webp | OutputMode::WebpLossless => {
                    if quality == 0 || quality > 100 {
                        return Err(CompressError::Validation(
                            "Quality must be between 1 and 100".to_string(),
                        ));
                    }
                }
                OutputMode::Brotli => {
                    if quality > 11 {
                        return Err(CompressError::Validation(
                            "Brotli level must be between 0 and 11".to_string(),
                        ));
                    }
                }
                // Png and BrotliDecompress ignore quality entirely
                OutputMode::Png | OutputMode::BrotliDecompress => {}
            }
        }

        if let Err(e) = glob::Pattern::new(&self.search_pattern) {
            return Err(CompressError::Validation(format!(
                "Invalid search pattern '{}': {}",
                self.search_pattern, e
            )));
        }

        Ok(())
    }

    /// Load a request from a JSON file, validating it on load
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let request: ConversionRequest = serde_json::from_str(&content)?;
        request.validate()?;
        Ok(request)
    }

    /// Save a request to a JSON file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
