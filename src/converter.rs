//! # Conversion Worker Module
//!
//! Questo modulo converte un singolo file e classifica l'esito.
//!
//! ## Pipeline per file:
//! 1. Risolve il codec dalla richiesta (modalità + qualità)
//! 2. Risolve il path di output tramite `PathResolver`
//! 3. Se l'output esiste già e `overwrite_existing` è false: `Skipped`
//! 4. Crea le directory parent e invoca il codec
//! 5. Se `delete_original` è attivo, elimina il file sorgente
//! 6. Legge la dimensione dell'output scritto: `Success`
//!
//! ## Error handling:
//! `convert_file` è una funzione totale dal punto di vista
//! dell'orchestratore: qualsiasi errore (path, directory, codec, delete,
//! stat) viene catturato e convertito in un outcome `Failed` con il
//! messaggio dell'errore. Nessuna eccezione si propaga mai oltre il worker.
//!
//! Nota: se la delete del sorgente fallisce dopo una scrittura riuscita,
//! l'intero file viene riportato come `Failed` anche se l'output è già su
//! disco. Comportamento storico, coperto dai test.

use crate::codec::Codec;
use crate::config::ConversionRequest;
use crate::file_manager::FileDescriptor;
use crate::path_resolver::PathResolver;
use anyhow::Result;
use std::fs;
use tracing::debug;

/// Classification of a single file's conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success {
        original_size: u64,
        compressed_size: u64,
    },
    Skipped {
        original_size: u64,
        existing_size: u64,
    },
    Failed {
        original_size: u64,
        message: String,
    },
}

/// One outcome record per input file, tagged with the file's name for reporting
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub file: String,
    pub outcome: Outcome,
}

/// Convert one file according to the request. Total over its inputs:
/// every error becomes a `Failed` outcome, never a propagated error.
pub fn convert_file(descriptor: &FileDescriptor, request: &ConversionRequest) -> ConversionOutcome {
    let file = descriptor
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| descriptor.path.display().to_string());

    match try_convert(descriptor, request) {
        Ok(outcome) => ConversionOutcome { file, outcome },
        Err(e) => {
            // Original size is re-read: with delete_original the source may
            // already be gone, in which case it is reported as 0
            let original_size = fs::metadata(&descriptor.path)
                .map(|m| m.len())
                .unwrap_or(0);
            ConversionOutcome {
                file,
                outcome: Outcome::Failed {
                    original_size,
                    message: e.to_string(),
                },
            }
        }
    }
}

fn try_convert(descriptor: &FileDescriptor, request: &ConversionRequest) -> Result<Outcome> {
    let codec = Codec::resolve(request.mode, request.quality);

    let out_path = PathResolver::resolve(
        request.source_root(),
        request.target_root(),
        &descriptor.path,
        codec.extension_handling(),
        codec.file_extension(),
    )?;

    if out_path.exists() && !request.overwrite_existing {
        let existing_size = fs::metadata(&out_path)?.len();
        debug!(
            "Skipping {}: output already exists at {}",
            descriptor.path.display(),
            out_path.display()
        );
        return Ok(Outcome::Skipped {
            original_size: descriptor.size,
            existing_size,
        });
    }

    PathResolver::ensure_parent_dirs(&out_path)?;

    debug!(
        "Converting {} -> {}",
        descriptor.path.display(),
        out_path.display()
    );
    codec.compress(&descriptor.path, &out_path)?;

    if request.delete_original {
        fs::remove_file(&descriptor.path)?;
    }

    let compressed_size = fs::metadata(&out_path)?.len();
    Ok(Outcome::Success {
        original_size: descriptor.size,
        compressed_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OutputMode;
    use crate::file_manager::FileManager;
    use std::path::Path;
    use tempfile::TempDir;

    fn request(source: &Path, target: &Path, mode: OutputMode) -> ConversionRequest {
        ConversionRequest {
            source_path: source.to_path_buf(),
            target_path: Some(target.to_path_buf()),
            mode,
            ..Default::default()
        }
    }

    fn descriptor_for(request: &ConversionRequest, name: &str) -> FileDescriptor {
        FileManager::discover(request)
            .unwrap()
            .into_iter()
            .find(|f| f.path.ends_with(name))
            .unwrap()
    }

    #[test]
    fn test_brotli_success_outcome() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::write(source.path().join("a.bmp"), vec![7u8; 1000]).unwrap();

        let request = request(source.path(), target.path(), OutputMode::Brotli);
        let result = convert_file(&descriptor_for(&request, "a.bmp"), &request);

        let out_path = target.path().join("a.bmp.br");
        assert!(out_path.exists());
        match result.outcome {
            Outcome::Success {
                original_size,
                compressed_size,
            } => {
                assert_eq!(original_size, 1000);
                assert_eq!(
                    compressed_size,
                    std::fs::metadata(&out_path).unwrap().len()
                );
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn test_existing_output_is_skipped() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::write(source.path().join("a.bmp"), vec![7u8; 1000]).unwrap();
        std::fs::write(target.path().join("a.bmp.br"), vec![1u8; 64]).unwrap();

        let request = request(source.path(), target.path(), OutputMode::Brotli);
        let result = convert_file(&descriptor_for(&request, "a.bmp"), &request);

        assert_eq!(
            result.outcome,
            Outcome::Skipped {
                original_size: 1000,
                existing_size: 64,
            }
        );
        // The pre-existing output was not rewritten
        assert_eq!(
            std::fs::read(target.path().join("a.bmp.br")).unwrap(),
            vec![1u8; 64]
        );
    }

    #[test]
    fn test_overwrite_existing_rewrites_output() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::write(source.path().join("a.bmp"), vec![7u8; 1000]).unwrap();
        std::fs::write(target.path().join("a.bmp.br"), vec![1u8; 64]).unwrap();

        let mut request = request(source.path(), target.path(), OutputMode::Brotli);
        request.overwrite_existing = true;

        let result = convert_file(&descriptor_for(&request, "a.bmp"), &request);
        assert!(matches!(result.outcome, Outcome::Success { .. }));
        assert_ne!(
            std::fs::read(target.path().join("a.bmp.br")).unwrap(),
            vec![1u8; 64]
        );
    }

    #[test]
    fn test_delete_original_removes_source() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let input = source.path().join("photo.bmp");
        image::RgbImage::from_pixel(8, 8, image::Rgb([10, 20, 30]))
            .save(&input)
            .unwrap();

        let mut request = request(source.path(), target.path(), OutputMode::Jpeg);
        request.delete_original = true;

        let result = convert_file(&descriptor_for(&request, "photo.bmp"), &request);
        assert!(matches!(result.outcome, Outcome::Success { .. }));
        assert!(!input.exists());
        assert!(target.path().join("photo.jpg").exists());
    }

    #[test]
    fn test_corrupt_input_yields_failed_outcome() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::write(source.path().join("broken.bmp"), b"not a bitmap").unwrap();

        let request = request(source.path(), target.path(), OutputMode::Jpeg);
        let result = convert_file(&descriptor_for(&request, "broken.bmp"), &request);

        match result.outcome {
            Outcome::Failed {
                original_size,
                message,
            } => {
                assert_eq!(original_size, 12);
                assert!(!message.is_empty());
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert_eq!(result.file, "broken.bmp");
    }

    #[test]
    #[cfg(unix)]
    fn test_failed_delete_reports_whole_file_as_failed() {
        use std::os::unix::fs::PermissionsExt;

        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::write(source.path().join("a.bmp"), vec![7u8; 1000]).unwrap();

        let mut request = request(source.path(), target.path(), OutputMode::Brotli);
        request.delete_original = true;
        let descriptor = descriptor_for(&request, "a.bmp");

        // Read-only source directory: the write to target succeeds but the
        // source delete cannot
        let mut perms = std::fs::metadata(source.path()).unwrap().permissions();
        perms.set_mode(0o555);
        std::fs::set_permissions(source.path(), perms.clone()).unwrap();

        let result = convert_file(&descriptor, &request);

        perms.set_mode(0o755);
        std::fs::set_permissions(source.path(), perms).unwrap();

        // The converted output exists on disk, yet the outcome is Failed
        assert!(target.path().join("a.bmp.br").exists());
        match result.outcome {
            Outcome::Failed { original_size, .. } => assert_eq!(original_size, 1000),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_output_lands_in_nested_target_directory() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std::fs::create_dir_all(source.path().join("deep/nested")).unwrap();
        std::fs::write(source.path().join("deep/nested/a.bmp"), vec![3u8; 500]).unwrap();

        let mut request = request(source.path(), target.path(), OutputMode::Brotli);
        request.recursive = true;

        let result = convert_file(&descriptor_for(&request, "a.bmp"), &request);
        assert!(matches!(result.outcome, Outcome::Success { .. }));
        assert!(target.path().join("deep/nested/a.bmp.br").exists());
    }
}
