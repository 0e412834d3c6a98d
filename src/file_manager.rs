//! # File Discovery Module
//!
//! Questo modulo gestisce la discovery dei file sorgente e i filtri applicati
//! prima del processing.
//!
//! ## Responsabilità:
//! - Enumerazione dei file sotto la source root (ricorsiva o top-level)
//! - Match del nome file contro il pattern glob della richiesta
//! - Filtri di età (min/max giorni dalla creazione del file)
//! - Campionamento casuale con probabilità `sample_ratio`
//! - Utilità di formattazione dimensioni
//!
//! ## Ordine dei filtri:
//! 1. Pattern glob sul nome file
//! 2. Età minima (file creati almeno N giorni fa)
//! 3. Età massima (file creati al più N giorni fa)
//! 4. Campionamento casuale, indipendente per file
//!
//! ## Snapshot:
//! Ogni `FileDescriptor` è uno snapshot read-only preso una volta sola alla
//! discovery; la lista è materializzata per intero prima del processing.
//!
//! ## Riproducibilità:
//! Il campionamento usa di default un generatore non seedato (run diversi
//! producono campioni diversi); `discover_with_rng` accetta una sorgente
//! random iniettabile per test deterministici.

use crate::config::ConversionRequest;
use anyhow::Result;
use glob::Pattern;
use rand::Rng;
use std::path::PathBuf;
use std::time::SystemTime;
use walkdir::WalkDir;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Read-only snapshot of a discovered source file
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Absolute (or root-relative) path of the file
    pub path: PathBuf,
    /// Size in bytes at discovery time
    pub size: u64,
    /// Creation timestamp, falling back to mtime where birth time is unavailable
    pub created: SystemTime,
}

/// Manages file discovery and filtering
pub struct FileManager;

impl FileManager {
    /// Discover all files eligible for conversion under the request's source root
    pub fn discover(request: &ConversionRequest) -> Result<Vec<FileDescriptor>> {
        Self::discover_with_rng(request, &mut rand::rng())
    }

    /// Discovery with an injectable random source for the sampling filter
    pub fn discover_with_rng<R: Rng>(
        request: &ConversionRequest,
        rng: &mut R,
    ) -> Result<Vec<FileDescriptor>> {
        let root = request.source_root();
        if !root.is_dir() {
            return Err(anyhow::anyhow!(
                "Source directory does not exist: {}",
                root.display()
            ));
        }

        let pattern = Pattern::new(&request.search_pattern)?;
        let now = SystemTime::now();

        let mut walker = WalkDir::new(root);
        if !request.recursive {
            walker = walker.max_depth(1);
        }

        let mut files = Vec::new();
        for entry in walker
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            if !pattern.matches(&entry.file_name().to_string_lossy()) {
                continue;
            }

            // Files that vanish mid-walk are simply not part of this run
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(now);

            let age_days = Self::age_in_days(now, created);
            if request.min_age_days.is_some_and(|min| age_days < min) {
                continue;
            }
            if request.max_age_days.is_some_and(|max| age_days > max) {
                continue;
            }

            if let Some(ratio) = request.sample_ratio {
                if ratio < 1.0 && rng.random::<f64>() >= ratio {
                    continue;
                }
            }

            files.push(FileDescriptor {
                path: entry.into_path(),
                size: metadata.len(),
                created,
            });
        }

        Ok(files)
    }

    fn age_in_days(now: SystemTime, created: SystemTime) -> f64 {
        now.duration_since(created)
            .map(|d| d.as_secs_f64() / SECONDS_PER_DAY)
            .unwrap_or(0.0)
    }

    /// Get human-readable file size
    pub fn format_size(size: u64) -> String {
        const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
        let mut size = size as f64;
        let mut unit_index = 0;

        while size >= 1024.0 && unit_index < UNITS.len() - 1 {
            size /= 1024.0;
            unit_index += 1;
        }

        if unit_index == 0 {
            format!("{} {}", size as u64, UNITS[unit_index])
        } else {
            format!("{:.2} {}", size, UNITS[unit_index])
        }
    }

    /// Calculate percentage reduction between original and converted sizes
    pub fn calculate_reduction(original_size: u64, new_size: u64) -> f64 {
        if original_size == 0 {
            0.0
        } else {
            ((original_size as f64 - new_size as f64) / original_size as f64) * 100.0
        }
    }
}
