//! # Path Resolution Module
//!
//! Centralizza tutta la logica di calcolo dei path di output.
//! La derivazione è una funzione pura e deterministica: nessun I/O,
//! stessi input producono sempre lo stesso output.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::codec::ExtensionHandling;

/// Utility per calcolare i path di output in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Map a source file onto its destination path under the target root.
    ///
    /// The file must be a descendant of `source_root`; the enumerator only
    /// ever yields such paths, so a violation is an internal error.
    pub fn resolve(
        source_root: &Path,
        target_root: &Path,
        file_path: &Path,
        handling: ExtensionHandling,
        extension: &str,
    ) -> Result<PathBuf> {
        let relative = file_path.strip_prefix(source_root).map_err(|_| {
            anyhow::anyhow!(
                "File {} is not under source root {}",
                file_path.display(),
                source_root.display()
            )
        })?;

        Ok(target_root.join(Self::apply_extension(relative, handling, extension)))
    }

    /// Apply the extension-handling policy to a relative path
    fn apply_extension(relative: &Path, handling: ExtensionHandling, extension: &str) -> PathBuf {
        match handling {
            ExtensionHandling::Append => {
                let mut appended = relative.as_os_str().to_os_string();
                appended.push(".");
                appended.push(extension);
                PathBuf::from(appended)
            }
            ExtensionHandling::Replace => relative.with_extension(extension),
            ExtensionHandling::Remove => relative.with_extension(""),
        }
    }

    /// Crea le directory parent se necessario (idempotente, tollera race
    /// tra worker concorrenti)
    pub fn ensure_parent_dirs(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create parent directories for {}: {}",
                    path.display(),
                    e
                )
            })?;
        }
        Ok(())
    }
}
