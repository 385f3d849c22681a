pub mod ffmpeg_session;
pub mod probe;
pub mod session;

pub use ffmpeg_session::FfmpegSession;
pub use probe::*;
pub use session::*;

#[cfg(test)]
pub mod mock_session;
