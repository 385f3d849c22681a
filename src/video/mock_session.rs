use std::cell::RefCell;
use std::rc::Rc;
use crate::video::session::{EndOfMediaCallback, MediaSession, PlaybackStatus};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    Play,
    Pause,
    Seek(u64),
    SetVolume(f64),
    Dispose,
}

/// Shared view of a [`MockSession`], kept by the test after the session
/// itself has been boxed and handed over.
#[derive(Clone, Default)]
pub struct SessionRecorder {
    pub calls: Rc<RefCell<Vec<SessionCall>>>,
    pub status: Rc<RefCell<Option<PlaybackStatus>>>,
    pub current_time: Rc<RefCell<Option<u64>>>,
    end_of_media: Rc<RefCell<Option<EndOfMediaCallback>>>,
}

impl SessionRecorder {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, call: &SessionCall) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status.borrow().unwrap_or(PlaybackStatus::Stopped)
    }

    pub fn set_current_time(&self, ms: u64) {
        *self.current_time.borrow_mut() = Some(ms);
    }

    /// Runs the registered end-of-media callback, as a backend would.
    pub fn finish(&self) {
        if let Some(callback) = self.end_of_media.borrow_mut().as_mut() {
            callback();
        }
    }
}

/// Records every control call; `play`/`pause` move the status the way a real
/// backend would.
pub struct MockSession {
    recorder: SessionRecorder,
    duration: Option<u64>,
    volume: f64,
}

impl MockSession {
    pub fn new(duration: Option<u64>) -> (Self, SessionRecorder) {
        let recorder = SessionRecorder::default();
        *recorder.status.borrow_mut() = Some(PlaybackStatus::Stopped);
        *recorder.current_time.borrow_mut() = Some(0);
        let session = Self {
            recorder: recorder.clone(),
            duration,
            volume: 1.0,
        };
        (session, recorder)
    }

    pub fn with_status(duration: Option<u64>, status: PlaybackStatus) -> (Self, SessionRecorder) {
        let (session, recorder) = Self::new(duration);
        *recorder.status.borrow_mut() = Some(status);
        (session, recorder)
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    fn record(&self, call: SessionCall) {
        self.recorder.calls.borrow_mut().push(call);
    }
}

impl MediaSession for MockSession {
    fn play(&mut self) {
        self.record(SessionCall::Play);
        *self.recorder.status.borrow_mut() = Some(PlaybackStatus::Playing);
    }

    fn pause(&mut self) {
        self.record(SessionCall::Pause);
        *self.recorder.status.borrow_mut() = Some(PlaybackStatus::Paused);
    }

    fn seek(&mut self, position_ms: u64) {
        self.record(SessionCall::Seek(position_ms));
        *self.recorder.current_time.borrow_mut() = Some(position_ms);
    }

    fn set_volume(&mut self, volume: f64) {
        self.record(SessionCall::SetVolume(volume));
        self.volume = volume;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn status(&self) -> PlaybackStatus {
        self.recorder.status()
    }

    fn current_time(&self) -> Option<u64> {
        *self.recorder.current_time.borrow()
    }

    fn total_duration(&self) -> Option<u64> {
        self.duration
    }

    fn on_end_of_media(&mut self, callback: EndOfMediaCallback) {
        *self.recorder.end_of_media.borrow_mut() = Some(callback);
    }

    fn dispose(&mut self) {
        self.record(SessionCall::Dispose);
    }
}
