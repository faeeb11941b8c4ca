use super::*;
use crate::export::observer::{ChannelObserver, ExportEvent, NoopObserver};
use crate::scene::config::ResolutionTier;

fn small_config() -> CtaConfig {
    let mut cfg = CtaConfig::default();
    cfg.output.resolution = ResolutionTier::P480;
    cfg.animation.duration = 0.1;
    cfg
}

fn to(path: &str) -> impl FnMut(&SaveRequest) -> CtaResult<SaveChoice> {
    let path = PathBuf::from(path);
    move |_: &SaveRequest| Ok(SaveChoice::Path(path.clone()))
}

/// Fails on a chosen frame and records whether it was aborted.
#[derive(Default)]
struct FailingSink {
    fail_at: u64,
    pushed: u64,
    aborted: bool,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _cfg: SinkConfig) -> CtaResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, _frame: &FrameRGBA) -> CtaResult<()> {
        if idx.0 == self.fail_at {
            return Err(CtaError::encode("sink rejected frame"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> CtaResult<()> {
        Ok(())
    }

    fn abort(&mut self) {
        self.aborted = true;
    }
}

#[test]
fn exports_every_frame_in_order() {
    let cfg = small_config();
    let assets = RenderAssets::builtin().unwrap();
    let mut sink = crate::encode::sink::InMemorySink::new();
    let (mut obs, rx) = ChannelObserver::new();

    let outcome = export_video(
        &cfg,
        &assets,
        &mut to("out/x.mov"),
        &mut sink,
        &mut obs,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(
        outcome,
        ExportOutcome::Completed {
            frames: 36,
            path: PathBuf::from("out/x.mov")
        }
    );
    assert!(sink.is_finished());
    let sc = sink.config().unwrap();
    assert_eq!((sc.width, sc.height, sc.total_frames), (854, 480, 36));
    assert_eq!(sink.frames().len(), 36);
    assert!(sink.frames().iter().enumerate().all(|(i, (idx, _))| idx.0 == i as u64));

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.first(), Some(&ExportEvent::State(ExportState::Initializing)));
    assert_eq!(events.last(), Some(&ExportEvent::Complete(outcome.clone())));
    let progress: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ExportEvent::Progress { done, total } => Some((*done, *total)),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 36);
    assert_eq!(progress.first(), Some(&(1, 36)));
    assert_eq!(progress.last(), Some(&(36, 36)));
    assert!(progress.windows(2).all(|w| w[1].0 == w[0].0 + 1));
    assert!(events.contains(&ExportEvent::State(ExportState::Finalizing)));
    assert!(!events.iter().any(|e| matches!(e, ExportEvent::Error(_))));
}

#[test]
fn cancelled_save_completes_without_rendering() {
    let cfg = small_config();
    let mut sink = crate::encode::sink::InMemorySink::new();
    let (mut obs, rx) = ChannelObserver::new();
    let mut dest = |_: &SaveRequest| -> CtaResult<SaveChoice> { Ok(SaveChoice::Cancelled) };

    let outcome = export_video(
        &cfg,
        &RenderAssets::default(),
        &mut dest,
        &mut sink,
        &mut obs,
        &CancelToken::new(),
    )
    .unwrap();

    assert_eq!(outcome, ExportOutcome::SaveCancelled);
    assert!(sink.config().is_none());
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ExportEvent::Complete(ExportOutcome::SaveCancelled)));
    assert!(!events.iter().any(|e| matches!(e, ExportEvent::Error(_))));
    assert!(!events.iter().any(|e| matches!(e, ExportEvent::Progress { .. })));
}

#[test]
fn cancel_token_stops_at_yield_point() {
    let cfg = small_config();
    let mut sink = crate::encode::sink::InMemorySink::new();
    let (mut obs, rx) = ChannelObserver::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let err = export_video(
        &cfg,
        &RenderAssets::default(),
        &mut to("out/y.mov"),
        &mut sink,
        &mut obs,
        &cancel,
    )
    .unwrap_err();

    assert!(matches!(err, CtaError::Cancelled { frames_rendered: 0 }), "{err}");
    assert!(sink.is_aborted());
    assert!(!sink.is_finished());
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&ExportEvent::State(ExportState::Failed)));
    assert!(events.iter().any(|e| matches!(e, ExportEvent::Error(_))));
}

#[test]
fn sink_failure_aborts_the_export() {
    let cfg = small_config();
    let mut sink = FailingSink {
        fail_at: 3,
        ..FailingSink::default()
    };
    let err = export_video(
        &cfg,
        &RenderAssets::default(),
        &mut to("out/z.mov"),
        &mut sink,
        &mut NoopObserver,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CtaError::Encode(_)), "{err}");
    assert_eq!(sink.pushed, 3);
    assert!(sink.aborted);
}

#[test]
fn invalid_configuration_is_reported_before_rendering() {
    let mut cfg = small_config();
    cfg.output.supersampling = 0;
    let mut sink = crate::encode::sink::InMemorySink::new();
    let (mut obs, rx) = ChannelObserver::new();
    let err = export_video(
        &cfg,
        &RenderAssets::default(),
        &mut to("out/w.mov"),
        &mut sink,
        &mut obs,
        &CancelToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, CtaError::Validation(_)));
    assert!(sink.config().is_none());
    assert!(rx.try_iter().any(|e| matches!(e, ExportEvent::Error(_))));
}

#[test]
fn still_frames_replay_the_particle_burst() {
    let mut cfg = small_config();
    cfg.animation.duration = 1.0;
    cfg.cursor.visible = false;
    let assets = RenderAssets::default();
    let fps = Fps::new(60, 1).unwrap();

    let blank = render_still(&cfg, &assets, 0.0, fps).unwrap();
    assert_eq!((blank.width, blank.height), (854, 480));
    assert!(blank.data.iter().all(|&b| b == 0));

    let with = render_still(&cfg, &assets, 2600.0, fps).unwrap();
    cfg.particles.enabled = false;
    let without = render_still(&cfg, &assets, 2600.0, fps).unwrap();
    assert_ne!(with.data, without.data);

    assert!(render_still(&cfg, &assets, f64::NAN, fps).is_err());
}
