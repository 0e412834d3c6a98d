//! # Report Module
//!
//! Questo modulo aggrega gli outcome di un batch e li rende leggibili.
//!
//! ## Responsabilità:
//! - Deriva `BatchSummary` dalla collezione di outcome (conteggi per
//!   categoria, byte originali/compressi sommati sui successi)
//! - Limita il dettaglio dei fallimenti ai primi 50 per non produrre output
//!   illimitato; il conteggio resta comunque esatto
//! - Rende il report finale tramite `tracing`
//!
//! ## Righe del report:
//! ```text
//! Converted 1,234 *.bmp files in 12.3s
//! Reduced size from 512 to 128 MiB: 25.0 %
//! 12 files already existed and were skipped
//! Error: 3 files could not be compressed: ...
//! ```

use crate::batch::BatchResult;
use crate::config::ConversionRequest;
use crate::file_manager::FileManager;
use tracing::{error, info};

/// Display cap for per-failure detail lines; counts are always exact
pub const MAX_FAILURE_DETAILS: usize = 50;

/// Aggregates derived from one batch run
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub converted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// Summed source bytes over successful conversions
    pub original_bytes: u64,
    /// Summed output bytes over successful conversions
    pub compressed_bytes: u64,
    /// First [`MAX_FAILURE_DETAILS`] failures as (file, message) pairs
    pub failure_details: Vec<(String, String)>,
}

impl BatchSummary {
    /// Compressed size as a percentage of the original size
    pub fn size_percent(&self) -> f64 {
        // +0.1 avoids division by zero on an all-failed batch
        self.compressed_bytes as f64 * 100.0 / (self.original_bytes as f64 + 0.1)
    }

    pub fn format_line(&self) -> String {
        format!(
            "Converted: {} | Skipped: {} | Failed: {} | {} -> {}",
            self.converted,
            self.skipped,
            self.failed,
            FileManager::format_size(self.original_bytes),
            FileManager::format_size(self.compressed_bytes),
        )
    }
}

impl BatchResult {
    /// Compute aggregates from the full outcome collection
    pub fn summary(&self) -> BatchSummary {
        use crate::converter::Outcome;

        let mut summary = BatchSummary::default();
        for record in &self.outcomes {
            match &record.outcome {
                Outcome::Success {
                    original_size,
                    compressed_size,
                } => {
                    summary.converted += 1;
                    summary.original_bytes += original_size;
                    summary.compressed_bytes += compressed_size;
                }
                Outcome::Skipped { .. } => {
                    summary.skipped += 1;
                }
                Outcome::Failed { message, .. } => {
                    summary.failed += 1;
                    if summary.failure_details.len() < MAX_FAILURE_DETAILS {
                        summary
                            .failure_details
                            .push((record.file.clone(), message.clone()));
                    }
                }
            }
        }
        summary
    }
}

/// Render the final report for one batch run
pub fn render(request: &ConversionRequest, result: &BatchResult) {
    let summary = result.summary();

    info!(
        "Converted {} {} files in {:.2?}",
        summary.converted, request.search_pattern, result.elapsed
    );
    info!(
        "Reduced size from {} to {} MiB: {:.1} %",
        summary.original_bytes >> 20,
        summary.compressed_bytes >> 20,
        summary.size_percent()
    );

    if summary.skipped > 0 {
        info!("{} files already existed and were skipped", summary.skipped);
    }

    if summary.failed > 0 {
        error!("Error: {} files could not be compressed:", summary.failed);
        for (file, message) in &summary.failure_details {
            info!("{}: {}", file, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{ConversionOutcome, Outcome};
    use std::time::Duration;

    fn result_with(outcomes: Vec<ConversionOutcome>) -> BatchResult {
        BatchResult {
            outcomes,
            elapsed: Duration::from_secs(1),
        }
    }

    fn success(original: u64, compressed: u64) -> ConversionOutcome {
        ConversionOutcome {
            file: "f".to_string(),
            outcome: Outcome::Success {
                original_size: original,
                compressed_size: compressed,
            },
        }
    }

    #[test]
    fn test_summary_aggregates() {
        let result = result_with(vec![
            success(1000, 300),
            success(2000, 700),
            ConversionOutcome {
                file: "s".to_string(),
                outcome: Outcome::Skipped {
                    original_size: 500,
                    existing_size: 100,
                },
            },
            ConversionOutcome {
                file: "x".to_string(),
                outcome: Outcome::Failed {
                    original_size: 10,
                    message: "boom".to_string(),
                },
            },
        ]);

        let summary = result.summary();
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        // Skipped and failed files do not contribute to the byte totals
        assert_eq!(summary.original_bytes, 3000);
        assert_eq!(summary.compressed_bytes, 1000);
        assert_eq!(
            summary.failure_details,
            vec![("x".to_string(), "boom".to_string())]
        );
    }

    #[test]
    fn test_failure_details_capped_at_50() {
        let outcomes = (0..75)
            .map(|i| ConversionOutcome {
                file: format!("f{i}"),
                outcome: Outcome::Failed {
                    original_size: 1,
                    message: "bad".to_string(),
                },
            })
            .collect();

        let summary = result_with(outcomes).summary();
        assert_eq!(summary.failed, 75);
        assert_eq!(summary.failure_details.len(), MAX_FAILURE_DETAILS);
        assert_eq!(summary.failure_details[0].0, "f0");
    }

    #[test]
    fn test_size_percent_survives_empty_batch() {
        let summary = result_with(Vec::new()).summary();
        assert_eq!(summary.size_percent(), 0.0);
    }
}
