use std::path::PathBuf;
use std::sync::mpsc;

use crate::foundation::error::CtaError;

/// Export lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExportState {
    /// Nothing started yet.
    #[default]
    Idle,
    /// Validating, choosing the destination, opening the sink.
    Initializing,
    /// Rendering `frame` of `total` (0-based).
    Rendering {
        /// Frame being rendered.
        frame: u64,
        /// Frames in the export.
        total: u64,
    },
    /// Flushing the encoder and finalizing the container.
    Finalizing,
    /// Finished successfully, or the save was cancelled.
    Complete,
    /// Aborted with an error.
    Failed,
}

impl ExportState {
    /// `Complete` or `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// Non-error result of an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome {
    /// Every frame was encoded and the file is in place.
    Completed {
        /// Frames rendered and encoded.
        frames: u64,
        /// Written file.
        path: PathBuf,
    },
    /// The save interaction was dismissed before rendering.
    SaveCancelled,
}

impl ExportOutcome {
    /// Frames rendered; zero for a cancelled save.
    pub fn frames(&self) -> u64 {
        match self {
            Self::Completed { frames, .. } => *frames,
            Self::SaveCancelled => 0,
        }
    }
}

/// Callbacks fired by the export pipeline on the thread that runs it.
pub trait ExportObserver {
    /// Lifecycle transition.
    fn on_state(&mut self, _state: ExportState) {}
    /// `done` of `total` frames rendered.
    ///
    /// Reported after each frame is queued, so `done` is one-based: it runs from `1` to
    /// `total` and `done / total` reaches `1.0` on the last frame. A zero-based fraction
    /// `i / total` is `(done - 1) / total`.
    fn on_progress(&mut self, _done: u64, _total: u64) {}
    /// Terminal success, including a cancelled save.
    fn on_complete(&mut self, outcome: &ExportOutcome);
    /// Terminal failure.
    fn on_error(&mut self, error: &CtaError);
}

/// Observer that ignores every callback.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl ExportObserver for NoopObserver {
    fn on_complete(&mut self, _outcome: &ExportOutcome) {}
    fn on_error(&mut self, _error: &CtaError) {}
}

/// One observer callback as a message.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportEvent {
    /// See [`ExportObserver::on_state`].
    State(ExportState),
    /// See [`ExportObserver::on_progress`].
    Progress {
        /// Frames rendered so far.
        done: u64,
        /// Frames in the export.
        total: u64,
    },
    /// See [`ExportObserver::on_complete`].
    Complete(ExportOutcome),
    /// See [`ExportObserver::on_error`]; the error rendered as text.
    Error(String),
}

/// Forwards callbacks over an `mpsc` channel so another thread can follow the export.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    tx: mpsc::Sender<ExportEvent>,
}

impl ChannelObserver {
    /// Observer plus the receiving end of its channel.
    pub fn new() -> (Self, mpsc::Receiver<ExportEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    fn send(&self, ev: ExportEvent) {
        // A dropped receiver only means nobody is listening.
        let _ = self.tx.send(ev);
    }
}

impl ExportObserver for ChannelObserver {
    fn on_state(&mut self, state: ExportState) {
        self.send(ExportEvent::State(state));
    }

    fn on_progress(&mut self, done: u64, total: u64) {
        self.send(ExportEvent::Progress { done, total });
    }

    fn on_complete(&mut self, outcome: &ExportOutcome) {
        self.send(ExportEvent::Complete(outcome.clone()));
    }

    fn on_error(&mut self, error: &CtaError) {
        self.send(ExportEvent::Error(error.to_string()));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/observer.rs"]
mod tests;
