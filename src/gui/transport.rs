use crate::core::{format_progress, is_valid_duration};
use crate::video::{MediaSession, PlaybackStatus};

pub const PLAY_ICON: &str = "▶";
pub const PAUSE_ICON: &str = "⏸";
pub const EMPTY_PROGRESS: &str = "00:00/00:00";

/// A [0, 1] control value such as the seek or volume bar.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderHandle {
    value: f64,
}

impl SliderHandle {
    pub fn new(value: f64) -> Self {
        Self { value: value.clamp(0.0, 1.0) }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelHandle {
    text: String,
}

impl LabelHandle {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// The play/pause button: an icon and whether it accepts clicks.
#[derive(Debug, Clone, PartialEq)]
pub struct ToggleHandle {
    icon: &'static str,
    enabled: bool,
}

impl ToggleHandle {
    pub fn icon(&self) -> &'static str {
        self.icon
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Everything the control bar renders. Written only by [`TransportController`].
#[derive(Debug, Clone, PartialEq)]
pub struct TransportView {
    pub play_pause: ToggleHandle,
    pub seek_bar: SliderHandle,
    pub volume_bar: SliderHandle,
    pub time_label: LabelHandle,
}

impl Default for TransportView {
    fn default() -> Self {
        Self {
            play_pause: ToggleHandle { icon: PLAY_ICON, enabled: false },
            seek_bar: SliderHandle::new(0.0),
            volume_bar: SliderHandle::new(0.5),
            time_label: LabelHandle::new(EMPTY_PROGRESS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekState {
    Idle,
    /// The pointer holds the seek bar; `status_before` decides whether to resume.
    Dragging { status_before: PlaybackStatus },
}

/// Reconciles the transport controls with the attached media session.
///
/// The view never writes back: pointer and button events come in through the
/// `on_*` methods and the controller pushes the resulting state into
/// [`TransportView`].
pub struct TransportController {
    session: Option<Box<dyn MediaSession>>,
    seek_state: SeekState,
    ticking: bool,
    view: TransportView,
}

impl TransportController {
    pub fn new() -> Self {
        Self {
            session: None,
            seek_state: SeekState::Idle,
            ticking: false,
            view: TransportView::default(),
        }
    }

    pub fn view(&self) -> &TransportView {
        &self.view
    }

    pub fn seek_state(&self) -> SeekState {
        self.seek_state
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the per-frame progress update is scheduled.
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn session_mut(&mut self) -> Option<&mut (dyn MediaSession + 'static)> {
        self.session.as_deref_mut()
    }

    pub fn status(&self) -> Option<PlaybackStatus> {
        self.session.as_ref().map(|session| session.status())
    }

    pub fn is_playing(&self) -> bool {
        self.status() == Some(PlaybackStatus::Playing)
    }

    /// Binds to `session`, disposing whatever was attached before.
    pub fn attach(&mut self, session: Option<Box<dyn MediaSession>>) {
        self.detach();

        match session {
            Some(session) => {
                self.view.volume_bar.set_value(session.volume());
                self.view.play_pause.enabled = true;
                self.view.play_pause.icon = icon_for(session.status());
                self.session = Some(session);
                self.ticking = true;
            }
            None => {
                self.view.play_pause.enabled = false;
                self.view.play_pause.icon = PLAY_ICON;
                self.view.seek_bar.set_value(0.0);
                self.view.time_label.set_text(EMPTY_PROGRESS);
            }
        }
    }

    fn detach(&mut self) {
        self.ticking = false;
        self.seek_state = SeekState::Idle;
        if let Some(mut session) = self.session.take() {
            session.dispose();
        }
    }

    /// Stops the progress updates and releases the session.
    pub fn dispose(&mut self) {
        self.detach();
    }

    pub fn on_pointer_down(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let status_before = session.status();
        session.pause();
        self.seek_state = SeekState::Dragging { status_before };
    }

    /// Previews the drag position; the session is left alone until release.
    pub fn on_pointer_drag(&mut self, fraction: f64) {
        if !matches!(self.seek_state, SeekState::Dragging { .. }) {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };

        self.view.seek_bar.set_value(fraction);
        if let Some(total) = valid_total(&**session) {
            let preview = target_position(self.view.seek_bar.value(), total);
            self.view.time_label.set_text(format_progress(preview, total));
        }
    }

    pub fn on_pointer_up(&mut self, fraction: f64) {
        let SeekState::Dragging { status_before } = self.seek_state else {
            return;
        };
        self.seek_state = SeekState::Idle;
        let Some(session) = self.session.as_mut() else {
            return;
        };

        self.view.seek_bar.set_value(fraction);
        if let Some(total) = valid_total(&**session) {
            let target = target_position(self.view.seek_bar.value(), total);
            session.seek(target);
            self.view.time_label.set_text(format_progress(target, total));
        }

        if status_before == PlaybackStatus::Playing {
            session.play();
        }
        self.view.play_pause.icon = icon_for(session.status());
    }

    /// Per-frame refresh of the seek bar and time label from the session.
    pub fn periodic_update(&mut self) {
        if !self.ticking {
            return;
        }
        // The pointer owns the seek bar while dragging
        if matches!(self.seek_state, SeekState::Dragging { .. }) {
            return;
        }
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if session.status() != PlaybackStatus::Playing {
            return;
        }

        self.refresh_progress();
    }

    fn refresh_progress(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let Some(total) = valid_total(&**session) else {
            return;
        };
        let current = session.current_time().unwrap_or(0);

        self.view.seek_bar.set_value(current as f64 / total as f64);
        self.view.time_label.set_text(format_progress(current.min(total), total));
    }

    pub fn toggle_play_pause(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.status() == PlaybackStatus::Playing {
            session.pause();
            self.view.play_pause.icon = PLAY_ICON;
        } else {
            session.play();
            self.view.play_pause.icon = PAUSE_ICON;
        }
    }

    pub fn play(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.status() != PlaybackStatus::Playing {
            session.play();
        }
        self.view.play_pause.icon = PAUSE_ICON;
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.view.volume_bar.set_value(volume);
        if let Some(session) = self.session.as_mut() {
            session.set_volume(self.view.volume_bar.value());
        }
    }

    /// Rewinds to the start and pauses, as done when playback runs out.
    pub fn restart_from_beginning(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.seek_state = SeekState::Idle;
        session.seek(0);
        session.pause();
        self.view.play_pause.icon = PLAY_ICON;
        self.view.seek_bar.set_value(0.0);
        if let Some(total) = valid_total(&**session) {
            self.view.time_label.set_text(format_progress(0, total));
        }
    }
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TransportController {
    fn drop(&mut self) {
        self.detach();
    }
}

fn icon_for(status: PlaybackStatus) -> &'static str {
    if status == PlaybackStatus::Playing {
        PAUSE_ICON
    } else {
        PLAY_ICON
    }
}

/// Total duration, or `None` while it is unknown or zero.
fn valid_total(session: &dyn MediaSession) -> Option<u64> {
    let total = session.total_duration();
    if is_valid_duration(total) {
        total
    } else {
        None
    }
}

fn target_position(fraction: f64, total_ms: u64) -> u64 {
    (total_ms as f64 * fraction.clamp(0.0, 1.0)).floor() as u64
}
