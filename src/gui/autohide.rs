use std::time::{Duration, Instant};

pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_millis(3000);
pub const FADE_DURATION: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityState {
    Visible,
    Fading { since: Instant },
    Hidden,
}

/// Fades a piece of chrome out after a period without pointer activity.
///
/// Driven by the same per-frame tick as the transport progress, so the fade
/// and the playback state never drift apart.
#[derive(Debug, Clone)]
pub struct AutoHidePresenter {
    state: VisibilityState,
    last_activity: Instant,
    idle_threshold: Duration,
    fade_duration: Duration,
}

impl AutoHidePresenter {
    pub fn new(now: Instant) -> Self {
        Self::with_idle_threshold(now, DEFAULT_IDLE_THRESHOLD)
    }

    pub fn with_idle_threshold(now: Instant, idle_threshold: Duration) -> Self {
        Self {
            state: VisibilityState::Visible,
            last_activity: now,
            idle_threshold,
            fade_duration: FADE_DURATION,
        }
    }

    pub fn state(&self) -> VisibilityState {
        self.state
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    pub fn set_idle_threshold(&mut self, idle_threshold: Duration) {
        self.idle_threshold = idle_threshold;
    }

    /// Pointer activity: restores full visibility, cancelling any fade.
    pub fn on_activity(&mut self, now: Instant) {
        self.last_activity = now;
        if self.state != VisibilityState::Visible {
            self.state = VisibilityState::Visible;
        }
    }

    /// Advances the state machine. Fading only starts while `active` holds.
    pub fn tick(&mut self, now: Instant, active: bool) {
        match self.state {
            VisibilityState::Visible => {
                let idle = now.saturating_duration_since(self.last_activity);
                if active && idle > self.idle_threshold {
                    log::debug!("Chrome idle for {:?}, fading out", idle);
                    self.state = VisibilityState::Fading { since: now };
                }
            }
            VisibilityState::Fading { since } => {
                if now.saturating_duration_since(since) >= self.fade_duration {
                    self.state = VisibilityState::Hidden;
                }
            }
            VisibilityState::Hidden => {}
        }
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        match self.state {
            VisibilityState::Visible => 1.0,
            VisibilityState::Fading { since } => {
                let progress = now.saturating_duration_since(since).as_secs_f32()
                    / self.fade_duration.as_secs_f32();
                (1.0 - progress).clamp(0.0, 1.0)
            }
            VisibilityState::Hidden => 0.0,
        }
    }

    /// Whether the chrome should still be drawn.
    pub fn is_shown(&self) -> bool {
        self.state != VisibilityState::Hidden
    }

    pub fn is_fully_visible(&self) -> bool {
        self.state == VisibilityState::Visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fades_after_idle_threshold_while_active() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);

        presenter.tick(start + ms(3000), true);
        assert_eq!(presenter.state(), VisibilityState::Visible);

        presenter.tick(start + ms(3001), true);
        assert_eq!(presenter.state(), VisibilityState::Fading { since: start + ms(3001) });
    }

    #[test]
    fn test_does_not_fade_while_inactive() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);

        presenter.tick(start + ms(60_000), false);
        assert_eq!(presenter.state(), VisibilityState::Visible);
        assert_eq!(presenter.opacity(start + ms(60_000)), 1.0);
    }

    #[test]
    fn test_fade_completes_to_hidden() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);
        let fade_start = start + ms(3500);
        presenter.tick(fade_start, true);

        presenter.tick(fade_start + ms(500), true);
        assert!(matches!(presenter.state(), VisibilityState::Fading { .. }));
        assert!((presenter.opacity(fade_start + ms(500)) - 0.5).abs() < 1e-3);

        presenter.tick(fade_start + ms(1000), true);
        assert_eq!(presenter.state(), VisibilityState::Hidden);
        assert_eq!(presenter.opacity(fade_start + ms(1000)), 0.0);
        assert!(!presenter.is_shown());
    }

    #[test]
    fn test_fade_keeps_running_if_playback_stops() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);
        presenter.tick(start + ms(4000), true);

        presenter.tick(start + ms(5000), false);
        assert_eq!(presenter.state(), VisibilityState::Hidden);
    }

    #[test]
    fn test_activity_during_fade_restores_visibility() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);
        presenter.tick(start + ms(3500), true);

        presenter.on_activity(start + ms(3800));
        assert_eq!(presenter.state(), VisibilityState::Visible);
        assert_eq!(presenter.opacity(start + ms(3800)), 1.0);

        // The cancelled fade never completes
        presenter.tick(start + ms(4600), true);
        assert_eq!(presenter.state(), VisibilityState::Visible);
    }

    #[test]
    fn test_activity_when_hidden_restores_visibility() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);
        presenter.tick(start + ms(3500), true);
        presenter.tick(start + ms(4500), true);
        assert_eq!(presenter.state(), VisibilityState::Hidden);

        presenter.on_activity(start + ms(5000));
        assert!(presenter.is_fully_visible());
    }

    #[test]
    fn test_no_redundant_fade() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::new(start);
        let fade_start = start + ms(3500);
        presenter.tick(fade_start, true);

        presenter.tick(fade_start + ms(100), true);
        presenter.tick(fade_start + ms(200), true);
        assert_eq!(presenter.state(), VisibilityState::Fading { since: fade_start });
    }

    #[test]
    fn test_custom_idle_threshold() {
        let start = Instant::now();
        let mut presenter = AutoHidePresenter::with_idle_threshold(start, Duration::from_secs(1));

        presenter.tick(start + ms(1001), true);
        assert!(matches!(presenter.state(), VisibilityState::Fading { .. }));

        presenter.set_idle_threshold(Duration::from_secs(10));
        assert_eq!(presenter.idle_threshold(), Duration::from_secs(10));
    }
}
