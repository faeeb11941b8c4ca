use super::*;

#[test]
fn channel_observer_forwards_every_callback() {
    let (mut obs, rx) = ChannelObserver::new();
    obs.on_state(ExportState::Initializing);
    obs.on_progress(1, 2);
    obs.on_complete(&ExportOutcome::SaveCancelled);
    obs.on_error(&CtaError::encode("boom"));

    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(
        events,
        vec![
            ExportEvent::State(ExportState::Initializing),
            ExportEvent::Progress { done: 1, total: 2 },
            ExportEvent::Complete(ExportOutcome::SaveCancelled),
            ExportEvent::Error("encode error: boom".into()),
        ]
    );
}

#[test]
fn dropped_receiver_is_ignored() {
    let (mut obs, rx) = ChannelObserver::new();
    drop(rx);
    obs.on_progress(1, 1);
}

#[test]
fn outcome_frame_counts_and_terminal_states() {
    assert_eq!(ExportOutcome::SaveCancelled.frames(), 0);
    let done = ExportOutcome::Completed {
        frames: 360,
        path: PathBuf::from("a.mov"),
    };
    assert_eq!(done.frames(), 360);
    assert!(ExportState::Complete.is_terminal());
    assert!(ExportState::Failed.is_terminal());
    assert!(!ExportState::Rendering { frame: 0, total: 1 }.is_terminal());
    assert_eq!(ExportState::default(), ExportState::Idle);
}
