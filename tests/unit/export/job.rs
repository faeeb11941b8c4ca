use std::path::PathBuf;
use std::sync::mpsc;

use super::*;
use crate::encode::sink::InMemorySink;
use crate::export::destination::{SaveChoice, SaveRequest};
use crate::export::observer::NoopObserver;
use crate::scene::config::ResolutionTier;

fn small_config() -> CtaConfig {
    let mut cfg = CtaConfig::default();
    cfg.output.resolution = ResolutionTier::P480;
    cfg.animation.duration = 0.1;
    cfg
}

#[test]
fn job_runs_to_completion_on_worker_thread() {
    let dest = |_: &SaveRequest| -> CtaResult<SaveChoice> {
        Ok(SaveChoice::Path(PathBuf::from("job.mov")))
    };
    let handle = ExportJob::spawn(
        small_config(),
        RenderAssets::default(),
        dest,
        Box::new(InMemorySink::new()),
        NoopObserver,
    )
    .unwrap();
    let outcome = handle.join().unwrap();
    assert_eq!(outcome.frames(), 36);
}

#[test]
fn cancelling_a_job_fails_it_with_cancelled() {
    let (go_tx, go_rx) = mpsc::channel::<()>();
    let dest = move |_: &SaveRequest| -> CtaResult<SaveChoice> {
        let _ = go_rx.recv();
        Ok(SaveChoice::Path(PathBuf::from("job-cancel.mov")))
    };
    let handle = ExportJob::spawn(
        small_config(),
        RenderAssets::default(),
        dest,
        Box::new(InMemorySink::new()),
        NoopObserver,
    )
    .unwrap();

    handle.cancel();
    assert!(handle.cancel_token().is_cancelled());
    go_tx.send(()).unwrap();

    while !handle.is_finished() {
        std::thread::yield_now();
    }
    assert_eq!(handle.state(), ExportState::Failed);
    let err = handle.join().unwrap_err();
    assert!(matches!(err, CtaError::Cancelled { frames_rendered: 0 }), "{err}");
}
