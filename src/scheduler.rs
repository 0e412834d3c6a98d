//! # Scheduler Module
//!
//! Host ricorrente: esegue richieste di conversione nominate su timer
//! indipendenti, per deployment come servizio sempre attivo.
//!
//! ## Responsabilità:
//! - Carica una lista di task schedulati da un file JSON
//! - Valida ogni richiesta prima di armare il relativo timer: un task non
//!   valido viene loggato e mai schedulato, gli altri procedono
//! - Esegue ogni task con delay iniziale e periodo propri
//! - Retry-on-error: un ciclo fallito viene loggato e non uccide lo schedule
//!
//! ## Formato del file:
//! ```json
//! {
//!   "tasks": [
//!     {
//!       "name": "nightly-brotli",
//!       "initial_delay_secs": 1,
//!       "period_secs": 300,
//!       "request": { "source_path": "/data/images", "mode": "Brotli" }
//!     }
//!   ]
//! }
//! ```

use crate::batch::BatchRunner;
use crate::config::ConversionRequest;
use crate::report;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info};

fn default_initial_delay_secs() -> u64 {
    1
}

fn default_period_secs() -> u64 {
    300
}

/// One named recurring conversion task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTask {
    pub name: String,
    /// Seconds to wait before the first run
    #[serde(default = "default_initial_delay_secs")]
    pub initial_delay_secs: u64,
    /// Seconds between the start of consecutive runs
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    pub request: ConversionRequest,
}

/// A named collection of scheduled tasks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleFile {
    pub tasks: Vec<ScheduledTask>,
}

impl ScheduleFile {
    /// Load the task list from a JSON file
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Validate each task's request, keeping only the ones that can be armed.
/// Invalid tasks are logged and dropped; valid ones proceed independently.
pub fn armable_tasks(tasks: Vec<ScheduledTask>) -> Vec<ScheduledTask> {
    tasks
        .into_iter()
        .filter(|task| {
            info!("Setting up task {}...", task.name);
            match task.request.validate() {
                Ok(()) => true,
                Err(e) => {
                    error!("Task {} failed validation and will not be scheduled: {}", task.name, e);
                    false
                }
            }
        })
        .collect()
}

/// Arm every valid task on its own timer and run until Ctrl-C
pub async fn run_schedule(tasks: Vec<ScheduledTask>) -> Result<()> {
    let tasks = armable_tasks(tasks);
    if tasks.is_empty() {
        return Err(anyhow::anyhow!("No valid tasks to schedule"));
    }

    let mut handles = Vec::with_capacity(tasks.len());
    for task in tasks {
        handles.push(tokio::spawn(run_task(task)));
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down scheduler");
    for handle in &handles {
        handle.abort();
    }

    Ok(())
}

async fn run_task(task: ScheduledTask) {
    tokio::time::sleep(Duration::from_secs(task.initial_delay_secs)).await;
    let period = Duration::from_secs(task.period_secs);

    loop {
        info!("Executing task {}", task.name);
        match BatchRunner::run(&task.request).await {
            Ok(result) => report::render(&task.request, &result),
            Err(e) => error!("Error while executing task {}: {}", task.name, e),
        }
        tokio::time::sleep(period).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::OutputMode;
    use tempfile::TempDir;

    #[test]
    fn test_schedule_file_parsing_applies_defaults() {
        let json = r#"{
            "tasks": [
                {
                    "name": "thumbs",
                    "request": { "source_path": "/data", "mode": "Webp" }
                },
                {
                    "name": "archive",
                    "period_secs": 3600,
                    "request": { "source_path": "/archive", "mode": "Brotli" }
                }
            ]
        }"#;

        let schedule: ScheduleFile = serde_json::from_str(json).unwrap();
        assert_eq!(schedule.tasks.len(), 2);

        let thumbs = &schedule.tasks[0];
        assert_eq!(thumbs.initial_delay_secs, 1);
        assert_eq!(thumbs.period_secs, 300);
        assert_eq!(thumbs.request.mode, OutputMode::Webp);

        let archive = &schedule.tasks[1];
        assert_eq!(archive.period_secs, 3600);
        assert_eq!(archive.request.mode, OutputMode::Brotli);
    }

    #[test]
    fn test_invalid_task_is_not_armed() {
        let valid = ScheduledTask {
            name: "ok".to_string(),
            initial_delay_secs: 1,
            period_secs: 60,
            request: ConversionRequest::default(),
        };
        let invalid = ScheduledTask {
            name: "broken".to_string(),
            initial_delay_secs: 1,
            period_secs: 60,
            request: ConversionRequest {
                sample_ratio: Some(2.0),
                ..Default::default()
            },
        };

        let armed = armable_tasks(vec![valid, invalid]);
        assert_eq!(armed.len(), 1);
        assert_eq!(armed[0].name, "ok");
    }

    #[tokio::test]
    async fn test_schedule_round_trip_through_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.json");

        let schedule = ScheduleFile {
            tasks: vec![ScheduledTask {
                name: "nightly".to_string(),
                initial_delay_secs: 5,
                period_secs: 86_400,
                request: ConversionRequest::default(),
            }],
        };
        tokio::fs::write(&path, serde_json::to_string_pretty(&schedule).unwrap())
            .await
            .unwrap();

        let loaded = ScheduleFile::from_file(&path).await.unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.tasks[0].name, "nightly");
        assert_eq!(loaded.tasks[0].period_secs, 86_400);
    }
}
