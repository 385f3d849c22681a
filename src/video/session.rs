/// Playback status reported by a [`MediaSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Stopped,
    Playing,
    Paused,
    Unknown,
}

/// Decoded RGBA picture handed to the UI thread.
#[derive(Debug)]
pub struct VideoFrame {
    pub image_data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Presentation time in milliseconds.
    pub timestamp: u64,
}

pub type EndOfMediaCallback = Box<dyn FnMut()>;

/// A playback engine bound to one loaded file.
///
/// All methods are called from the UI thread. Control calls are
/// fire-and-forget; the implementation serialises them internally.
pub trait MediaSession {
    fn play(&mut self);
    fn pause(&mut self);
    /// Seeks to an absolute position in milliseconds.
    fn seek(&mut self, position_ms: u64);
    /// `volume` in [0, 1].
    fn set_volume(&mut self, volume: f64);
    fn volume(&self) -> f64;
    fn status(&self) -> PlaybackStatus;
    fn current_time(&self) -> Option<u64>;
    /// `None` until the duration is known.
    fn total_duration(&self) -> Option<u64>;
    /// Registers the callback run on the UI thread when playback reaches the end.
    fn on_end_of_media(&mut self, callback: EndOfMediaCallback);
    /// Drains backend events, running the end-of-media callback if due, and
    /// returns the newest decoded frame, if any arrived since the last call.
    fn poll_frame(&mut self) -> Option<VideoFrame> {
        None
    }
    /// Releases the backend. The session must not be used afterwards.
    fn dispose(&mut self);
}
