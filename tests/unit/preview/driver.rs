use super::*;

struct CountingPresenter {
    remaining: u32,
    shown: u32,
}

impl PreviewPresenter for CountingPresenter {
    fn present(&mut self, surface: &Surface) -> CtaResult<()> {
        assert_eq!(surface.width(), 96);
        self.shown += 1;
        self.remaining = self.remaining.saturating_sub(1);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.remaining > 0
    }
}

#[test]
fn clock_maps_instants_to_milliseconds() {
    let clock = PreviewClock::new();
    let later = clock.start + Duration::from_millis(1500);
    assert!((clock.time_ms_at(later) - 1500.0).abs() < 1e-6);
    assert_eq!(clock.time_ms_at(clock.start), 0.0);
}

#[test]
fn tick_at_renders_into_owned_surface() {
    let mut driver =
        PreviewDriver::new(CtaConfig::default(), RenderAssets::default(), 96, 54).unwrap();
    let s = driver.tick_at(1500.0).unwrap();
    assert!(s.data().iter().any(|&b| b != 0));
    let s = driver.tick_at(0.0).unwrap();
    assert!(s.data().iter().all(|&b| b == 0));
}

#[test]
fn preview_particles_follow_the_clock_times() {
    let mut driver =
        PreviewDriver::new(CtaConfig::default(), RenderAssets::default(), 96, 54).unwrap();
    driver.tick_at(2510.0).unwrap();
    assert_eq!(driver.particles().len(), 50);
    driver.tick_at(6020.0).unwrap();
    assert!(driver.particles().is_empty());
}

#[test]
fn run_presents_until_closed() {
    let mut driver =
        PreviewDriver::new(CtaConfig::default(), RenderAssets::default(), 96, 54).unwrap();
    let mut presenter = CountingPresenter {
        remaining: 3,
        shown: 0,
    };
    assert_eq!(driver.run(&mut presenter).unwrap(), 3);
    assert_eq!(presenter.shown, 3);
}

#[test]
fn checkerboard_shows_through_transparent_pixels() {
    let surface = Surface::new(2, 1).unwrap();
    let mut out = Vec::new();
    checkerboard_0rgb(&surface, 1, &mut out);
    assert_eq!(out, vec![0x00cc_cccc, 0x0099_9999]);
}
