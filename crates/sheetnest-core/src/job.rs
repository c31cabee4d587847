//! Background dispatch harness: runs a nesting job on its own thread and
//! reports through a channel. The boundary is pure message passing — the
//! only shared state is the atomic cancel flag.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::config::NestConfig;
use crate::error::NestError;
use crate::model::{Design, NestingResult, SheetPreset};
use crate::pipeline::{nest, CancelToken, JobControl, ProgressEvent};

/// Outcome stream of a background nesting job.
#[derive(Debug)]
pub enum JobEvent {
    Progress(ProgressEvent),
    Complete(Vec<NestingResult>),
    Error(String),
    Cancelled,
}

pub struct JobHandle {
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl JobHandle {
    /// Requests cooperative cancellation; the job acknowledges at its next
    /// suspension point with a `JobEvent::Cancelled`.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Waits for the worker thread to finish.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Starts a nesting job in the background. Events arrive on the returned
/// receiver; the final event is always one of `Complete`, `Error` or
/// `Cancelled`.
pub fn spawn_nest_job(
    design: Design,
    sheets: Vec<SheetPreset>,
    cfg: NestConfig,
) -> (JobHandle, Receiver<JobEvent>) {
    let (tx, rx) = channel();
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();
    let thread = thread::spawn(move || {
        run_job(design, sheets, cfg, worker_cancel, tx);
    });
    (
        JobHandle {
            cancel,
            thread: Some(thread),
        },
        rx,
    )
}

fn run_job(
    design: Design,
    sheets: Vec<SheetPreset>,
    cfg: NestConfig,
    cancel: CancelToken,
    tx: Sender<JobEvent>,
) {
    let progress_tx = tx.clone();
    let mut ctl = JobControl::with_cancel(cancel).on_progress(move |event| {
        // The receiver may be gone already; progress is advisory.
        let _ = progress_tx.send(JobEvent::Progress(event));
    });
    let event = match nest(&design, &sheets, &cfg, &mut ctl) {
        Ok(results) => JobEvent::Complete(results),
        Err(NestError::Cancelled) => JobEvent::Cancelled,
        Err(err) => JobEvent::Error(err.to_string()),
    };
    let _ = tx.send(event);
}
