//! Background pipeline jobs
//!
//! Runs a whole pipeline on one worker thread. Progress arrives over an
//! `mpsc` channel and the run can be cancelled from the calling thread.

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{Pipeline, PipelineEvent, PipelineOutcome, PipelineRequest};
use inkbot_core::CancelToken;
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;
use uuid::Uuid;

/// Handle to a running background job
pub struct JobHandle {
    id: Uuid,
    events: Receiver<PipelineEvent>,
    cancel: CancelToken,
    worker: JoinHandle<PipelineResult<PipelineOutcome>>,
}

impl JobHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Progress events; the channel closes when the job ends
    pub fn events(&self) -> &Receiver<PipelineEvent> {
        &self.events
    }

    /// Request cancellation; the job stops at its next check
    pub fn cancel(&self) {
        tracing::info!("Cancelling job {}", self.id);
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the job to end
    pub fn join(self) -> PipelineResult<PipelineOutcome> {
        match self.worker.join() {
            Ok(result) => result,
            Err(_) => Err(PipelineError::Configuration(format!(
                "job {} panicked",
                self.id
            ))),
        }
    }
}

/// Start a pipeline run on a background thread
pub fn spawn_job(pipeline: Pipeline, request: PipelineRequest) -> PipelineResult<JobHandle> {
    let id = Uuid::new_v4();
    let cancel = CancelToken::new();
    let (tx, rx) = mpsc::channel();

    let worker_cancel = cancel.clone();
    let worker = std::thread::Builder::new()
        .name(format!("inkbot-job-{}", id))
        .spawn(move || {
            tracing::info!("Job {} started for {}", id, request.image.display());
            let result = pipeline.run(&request, &worker_cancel, |event| {
                // The receiver may already be gone; the run continues regardless.
                let _ = tx.send(event);
            });
            match &result {
                Ok(outcome) => tracing::info!("Job {} finished: {}", id, outcome.status),
                Err(e) => tracing::warn!("Job {} failed: {}", id, e),
            }
            result
        })?;

    Ok(JobHandle {
        id,
        events: rx,
        cancel,
        worker,
    })
}
