//! Processing jobs: a small state machine plus an injected store.
//!
//! A host service (upload endpoint, batch runner) records one [`JobRecord`]
//! per document and moves it through
//!
//! ```text
//! Pending ──▶ Processing ──┬─▶ Completed { artifacts }
//!                          └─▶ Failed { error }
//! ```
//!
//! Any other move is rejected with [`Pdf2ImgError::InvalidJobTransition`].
//! Where records live is the caller's choice via [`JobStore`];
//! [`MemoryJobStore`] keeps them in a mutex-guarded map.

use crate::config::ProcessingConfig;
use crate::error::{ErrorKind, Pdf2ImgError};
use crate::process::process;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

/// Unique identifier for a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    /// File names of the images written, in page order.
    Completed { artifacts: Vec<String> },
    Failed { error: String, kind: ErrorKind },
}

impl JobState {
    pub fn name(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed { .. } | JobState::Failed { .. })
    }

    fn can_become(&self, next: &JobState) -> bool {
        matches!(
            (self, next),
            (JobState::Pending, JobState::Processing)
                | (JobState::Processing, JobState::Completed { .. })
                | (JobState::Processing, JobState::Failed { .. })
        )
    }
}

/// One document's trip through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub document: PathBuf,
    pub output_dir: PathBuf,
    pub state: JobState,
}

impl JobRecord {
    /// A new pending job with a fresh id.
    pub fn new(document: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            id: JobId::new(),
            document: document.into(),
            output_dir: output_dir.into(),
            state: JobState::Pending,
        }
    }

    /// Move to `next`, or fail without changing anything.
    pub fn transition(&mut self, next: JobState) -> Result<(), Pdf2ImgError> {
        if !self.state.can_become(&next) {
            return Err(Pdf2ImgError::InvalidJobTransition {
                job: self.id.to_string(),
                from: self.state.name(),
                to: next.name(),
            });
        }
        self.state = next;
        Ok(())
    }
}

/// Storage for job records, supplied by the host application.
pub trait JobStore: Send + Sync {
    /// Add a new record. Fails if the id is already present.
    fn insert(&self, record: JobRecord) -> Result<(), Pdf2ImgError>;

    fn get(&self, id: JobId) -> Result<Option<JobRecord>, Pdf2ImgError>;

    /// Apply a validated transition and return the updated record.
    fn update(&self, id: JobId, next: JobState) -> Result<JobRecord, Pdf2ImgError>;
}

/// In-process [`JobStore`].
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<JobId, JobRecord>>, Pdf2ImgError> {
        self.jobs
            .lock()
            .map_err(|_| Pdf2ImgError::Internal("job store lock poisoned".to_string()))
    }
}

impl JobStore for MemoryJobStore {
    fn insert(&self, record: JobRecord) -> Result<(), Pdf2ImgError> {
        let mut jobs = self.lock()?;
        if jobs.contains_key(&record.id) {
            return Err(Pdf2ImgError::Internal(format!(
                "job {} already exists",
                record.id
            )));
        }
        jobs.insert(record.id, record);
        Ok(())
    }

    fn get(&self, id: JobId) -> Result<Option<JobRecord>, Pdf2ImgError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn update(&self, id: JobId, next: JobState) -> Result<JobRecord, Pdf2ImgError> {
        let mut jobs = self.lock()?;
        let record = jobs
            .get_mut(&id)
            .ok_or_else(|| Pdf2ImgError::Internal(format!("unknown job {id}")))?;
        record.transition(next)?;
        Ok(record.clone())
    }
}

/// Create a pending job for `document` and store it.
pub fn submit_job(
    store: &dyn JobStore,
    document: impl Into<PathBuf>,
    output_dir: impl Into<PathBuf>,
) -> Result<JobId, Pdf2ImgError> {
    let record = JobRecord::new(document, output_dir);
    let id = record.id;
    store.insert(record)?;
    info!("Job {} submitted", id);
    Ok(id)
}

/// Drive job `id` from `Pending` to `Completed` or `Failed`.
///
/// A processing failure is recorded in the job and is not an `Err`; `Err`
/// means the job could not be run at all (unknown id, wrong state).
pub fn run_job(
    store: &dyn JobStore,
    id: JobId,
    config: &ProcessingConfig,
) -> Result<JobRecord, Pdf2ImgError> {
    let record = store.update(id, JobState::Processing)?;
    info!("Job {} processing {}", id, record.document.display());

    let next = match process(&record.document, &record.output_dir, config) {
        Ok(output) => {
            info!(
                "Job {} completed: {} images",
                id,
                output.artifacts.len()
            );
            JobState::Completed {
                artifacts: output.file_names(),
            }
        }
        Err(e) => {
            warn!("Job {} failed: {}", id, e);
            JobState::Failed {
                error: e.to_string(),
                kind: e.kind(),
            }
        }
    };
    store.update(id, next)
}

/// [`run_job`] on tokio's blocking pool.
pub fn spawn_job(
    store: Arc<dyn JobStore>,
    id: JobId,
    config: ProcessingConfig,
) -> tokio::task::JoinHandle<Result<JobRecord, Pdf2ImgError>> {
    tokio::task::spawn_blocking(move || run_job(store.as_ref(), id, &config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failed() -> JobState {
        JobState::Failed {
            error: "boom".into(),
            kind: ErrorKind::Io,
        }
    }

    #[test]
    fn happy_path_transitions() {
        let mut job = JobRecord::new("a.pdf", "out");
        job.transition(JobState::Processing).unwrap();
        job.transition(JobState::Completed {
            artifacts: vec!["a_page0001.png".into()],
        })
        .unwrap();
        assert!(job.state.is_terminal());
    }

    #[test]
    fn pending_cannot_skip_processing() {
        let mut job = JobRecord::new("a.pdf", "out");
        let err = job.transition(failed()).unwrap_err();
        assert!(matches!(
            err,
            Pdf2ImgError::InvalidJobTransition {
                from: "pending",
                to: "failed",
                ..
            }
        ));
        assert_eq!(job.state, JobState::Pending);
    }

    #[test]
    fn terminal_states_are_final() {
        let mut job = JobRecord::new("a.pdf", "out");
        job.transition(JobState::Processing).unwrap();
        job.transition(failed()).unwrap();
        assert!(job.transition(JobState::Processing).is_err());
        assert!(job
            .transition(JobState::Completed { artifacts: vec![] })
            .is_err());
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryJobStore::new();
        let id = submit_job(&store, "a.pdf", "out").unwrap();

        let got = store.get(id).unwrap().unwrap();
        assert_eq!(got.state, JobState::Pending);

        let updated = store.update(id, JobState::Processing).unwrap();
        assert_eq!(updated.state, JobState::Processing);
        assert_eq!(store.get(id).unwrap().unwrap().state, JobState::Processing);

        assert!(store.get(JobId::new()).unwrap().is_none());
    }

    #[test]
    fn duplicate_insert_fails() {
        let store = MemoryJobStore::new();
        let record = JobRecord::new("a.pdf", "out");
        store.insert(record.clone()).unwrap();
        assert!(store.insert(record).is_err());
    }

    #[test]
    fn update_unknown_job_fails() {
        let store = MemoryJobStore::new();
        let err = store.update(JobId::new(), JobState::Processing).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn missing_document_ends_failed() {
        let store = MemoryJobStore::new();
        let out = tempfile::tempdir().unwrap();
        let id = submit_job(&store, "/no/such/input.pdf", out.path()).unwrap();

        let record = run_job(&store, id, &ProcessingConfig::default()).unwrap();
        match record.state {
            JobState::Failed { kind, ref error } => {
                assert_eq!(kind, ErrorKind::Document);
                assert!(error.contains("not found"), "got: {error}");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        // A finished job cannot be run again.
        assert!(run_job(&store, id, &ProcessingConfig::default()).is_err());
    }

    #[tokio::test]
    async fn spawned_job_runs_on_blocking_pool() {
        let store: Arc<dyn JobStore> = Arc::new(MemoryJobStore::new());
        let out = tempfile::tempdir().unwrap();
        let id = submit_job(store.as_ref(), "/no/such/input.pdf", out.path()).unwrap();

        let record = spawn_job(Arc::clone(&store), id, ProcessingConfig::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.state.name(), "failed");
        assert_eq!(store.get(id).unwrap().unwrap().state.name(), "failed");
    }

    #[test]
    fn state_serialises_with_status_tag() {
        let json = serde_json::to_string(&JobState::Completed {
            artifacts: vec!["d_page0001.png".into()],
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"completed","artifacts":["d_page0001.png"]}"#);
    }
}
