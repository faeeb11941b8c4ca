use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::assets::store::RenderAssets;
use crate::encode::sink::FrameSink;
use crate::export::destination::SaveDestination;
use crate::export::observer::{ExportObserver, ExportOutcome, ExportState};
use crate::export::pipeline::{CancelToken, export_video};
use crate::foundation::error::{CtaError, CtaResult};
use crate::scene::config::CtaConfig;

/// Forwards callbacks and mirrors lifecycle state into a shared cell.
struct Tracking<O> {
    inner: O,
    state: Arc<Mutex<ExportState>>,
}

impl<O> Tracking<O> {
    fn set(&self, state: ExportState) {
        match self.state.lock() {
            Ok(mut s) => *s = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }
}

impl<O: ExportObserver> ExportObserver for Tracking<O> {
    fn on_state(&mut self, state: ExportState) {
        self.set(state);
        self.inner.on_state(state);
    }

    fn on_progress(&mut self, done: u64, total: u64) {
        if done < total {
            self.set(ExportState::Rendering { frame: done, total });
        }
        self.inner.on_progress(done, total);
    }

    fn on_complete(&mut self, outcome: &ExportOutcome) {
        self.inner.on_complete(outcome);
    }

    fn on_error(&mut self, error: &CtaError) {
        self.inner.on_error(error);
    }
}

/// Entry point for running an export on its own worker thread.
pub struct ExportJob;

impl ExportJob {
    /// Start [`export_video`] on a dedicated thread and return immediately.
    pub fn spawn<D, O>(
        config: CtaConfig,
        assets: RenderAssets,
        mut destination: D,
        mut sink: Box<dyn FrameSink>,
        observer: O,
    ) -> CtaResult<ExportHandle>
    where
        D: SaveDestination + Send + 'static,
        O: ExportObserver + Send + 'static,
    {
        let cancel = CancelToken::new();
        let state = Arc::new(Mutex::new(ExportState::Idle));

        let worker_cancel = cancel.clone();
        let mut tracking = Tracking {
            inner: observer,
            state: Arc::clone(&state),
        };
        let join = std::thread::Builder::new()
            .name("ctaforge-export".into())
            .spawn(move || {
                export_video(
                    &config,
                    &assets,
                    &mut destination,
                    sink.as_mut(),
                    &mut tracking,
                    &worker_cancel,
                )
            })
            .map_err(|e| CtaError::Other(anyhow::anyhow!("failed to spawn export thread: {e}")))?;

        Ok(ExportHandle {
            cancel,
            state,
            join: Some(join),
        })
    }
}

/// Handle to a running [`ExportJob`].
pub struct ExportHandle {
    cancel: CancelToken,
    state: Arc<Mutex<ExportState>>,
    join: Option<JoinHandle<CtaResult<ExportOutcome>>>,
}

impl ExportHandle {
    /// Ask the export to stop at its next yield point.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Token shared with the worker.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Latest lifecycle state.
    pub fn state(&self) -> ExportState {
        match self.state.lock() {
            Ok(s) => *s,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.join.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Wait for the worker and return its result.
    pub fn join(mut self) -> CtaResult<ExportOutcome> {
        let handle = self
            .join
            .take()
            .ok_or_else(|| CtaError::encode("export already joined"))?;
        handle
            .join()
            .map_err(|_| CtaError::Other(anyhow::anyhow!("export thread panicked")))?
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/job.rs"]
mod tests;
