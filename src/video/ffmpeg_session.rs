// =============================================================================
// FFMPEG MEDIA SESSION
// =============================================================================
//
// One playback thread per loaded file. It owns a single ffmpeg child process
// that writes raw RGB24 video to stdout and f32le stereo audio to stderr.
//
// - video reader thread: stdout -> paced frame queue
// - audio reader thread: stderr -> ring buffer -> rodio sink
// - playback thread: serialises commands, releases frames on time, reports
//   position and end of media
// - FfmpegSession (UI thread): mirrors status/position, drains events
//
// =============================================================================

use std::collections::VecDeque;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use crate::core::MediaError;
use crate::video::probe::{MediaInfo, MediaProbe};
use crate::video::session::{EndOfMediaCallback, MediaSession, PlaybackStatus, VideoFrame};

const DISPLAY_HEIGHT: u32 = 480;
const MAX_FRAME_RATE: f64 = 60.0;
const AUDIO_SAMPLE_RATE: u32 = 48_000;
const AUDIO_CHANNELS: u16 = 2;
/// ~2 seconds at 60 fps
const MAX_QUEUED_FRAMES: usize = 120;

// =============================================================================
// COMMANDS AND EVENTS
// =============================================================================

#[derive(Debug)]
enum PlaybackCommand {
    Play,
    Pause,
    Seek(u64),
    SetVolume(f32),
    Shutdown,
}

#[derive(Debug)]
enum PlaybackEvent {
    Position(u64),
    /// The playback thread has applied a seek; positions sent after it are current.
    SeekDone(u64),
    EndOfMedia,
    Error(String),
}

// =============================================================================
// AUDIO
// =============================================================================

struct AudioBuffer {
    samples: Vec<f32>,
    read_pos: usize,
    write_pos: usize,
    capacity: usize,
}

impl AudioBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
            read_pos: 0,
            write_pos: 0,
            capacity,
        }
    }

    /// Returns how many samples fit; the rest must be retried.
    fn write(&mut self, data: &[f32]) -> usize {
        let mut written = 0;
        for &sample in data {
            let next_write = (self.write_pos + 1) % self.capacity;
            if next_write == self.read_pos {
                break;
            }
            self.samples[self.write_pos] = sample;
            self.write_pos = next_write;
            written += 1;
        }
        written
    }

    fn read(&mut self) -> Option<f32> {
        if self.read_pos == self.write_pos {
            return None;
        }
        let sample = self.samples[self.read_pos];
        self.read_pos = (self.read_pos + 1) % self.capacity;
        Some(sample)
    }

    fn clear(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    #[cfg(test)]
    fn available(&self) -> usize {
        if self.write_pos >= self.read_pos {
            self.write_pos - self.read_pos
        } else {
            self.capacity - self.read_pos + self.write_pos
        }
    }
}

/// rodio source reading from the shared ring buffer; silence on underrun.
struct StreamingAudioSource {
    buffer: Arc<Mutex<AudioBuffer>>,
    stop_flag: Arc<AtomicBool>,
}

impl Iterator for StreamingAudioSource {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop_flag.load(Ordering::Relaxed) {
            return None;
        }
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.read().or(Some(0.0)),
            Err(_) => Some(0.0),
        }
    }
}

impl Source for StreamingAudioSource {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        AUDIO_CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        AUDIO_SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Output device plus the sink of the running stream. Lives on the playback
/// thread because `OutputStream` cannot leave the thread that opened it.
struct AudioOutput {
    _stream: Option<OutputStream>,
    handle: Option<OutputStreamHandle>,
    sink: Option<Sink>,
    volume: f32,
}

impl AudioOutput {
    fn open(volume: f32) -> Self {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Self {
                _stream: Some(stream),
                handle: Some(handle),
                sink: None,
                volume,
            },
            Err(e) => {
                log::warn!("Failed to open audio output: {}. Video will play without audio.", e);
                Self { _stream: None, handle: None, sink: None, volume }
            }
        }
    }

    fn start(&mut self, buffer: Arc<Mutex<AudioBuffer>>, stop_flag: Arc<AtomicBool>) {
        let Some(handle) = &self.handle else {
            return;
        };
        match Sink::try_new(handle) {
            Ok(sink) => {
                sink.set_volume(self.volume);
                sink.append(StreamingAudioSource { buffer, stop_flag });
                sink.play();
                self.sink = Some(sink);
            }
            Err(e) => log::warn!("Failed to create audio sink: {}", e),
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            sink.set_volume(volume);
        }
    }
}

// =============================================================================
// FFMPEG PROCESS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct StreamGeometry {
    width: u32,
    height: u32,
    frame_rate: f64,
}

impl StreamGeometry {
    /// Scales to a fixed display height, keeping the aspect ratio. ffmpeg
    /// needs even dimensions for most pixel formats.
    fn for_media(info: &MediaInfo) -> Self {
        let height = info.height.clamp(2, DISPLAY_HEIGHT) & !1;
        let aspect = if info.height > 0 && info.width > 0 {
            info.width as f64 / info.height as f64
        } else {
            16.0 / 9.0
        };
        let width = ((height as f64 * aspect).round() as u32).max(2) & !1;

        Self {
            width,
            height,
            frame_rate: info.frame_rate.min(MAX_FRAME_RATE),
        }
    }

    fn frame_bytes(&self) -> usize {
        (self.width * self.height * 3) as usize
    }
}

fn seconds_arg(position_ms: u64) -> String {
    format!("{:.3}", position_ms as f64 / 1000.0)
}

fn start_ffmpeg_process(
    path: &Path,
    geometry: &StreamGeometry,
    with_audio: bool,
    start_ms: u64,
) -> std::io::Result<Child> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-loglevel").arg("quiet");
    cmd.arg("-nostdin");

    cmd.arg("-ss").arg(seconds_arg(start_ms));
    cmd.arg("-i").arg(path);

    cmd.arg("-map").arg("0:v:0");
    cmd.arg("-f").arg("rawvideo");
    cmd.arg("-pix_fmt").arg("rgb24");
    cmd.arg("-s").arg(format!("{}x{}", geometry.width, geometry.height));
    cmd.arg("-r").arg(format!("{:.3}", geometry.frame_rate));
    cmd.arg("pipe:1");

    // stderr carries audio, so ffmpeg logging stays quiet
    if with_audio {
        cmd.arg("-map").arg("0:a:0");
        cmd.arg("-f").arg("f32le");
        cmd.arg("-ac").arg(AUDIO_CHANNELS.to_string());
        cmd.arg("-ar").arg(AUDIO_SAMPLE_RATE.to_string());
        cmd.arg("pipe:2");
    }

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(if with_audio { Stdio::piped() } else { Stdio::null() });

    cmd.spawn()
}

fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for chunk in rgb.chunks_exact(3) {
        rgba.extend_from_slice(chunk);
        rgba.push(255);
    }
    rgba
}

/// Decodes the single frame at `position_ms`, used while paused.
fn extract_single_frame(path: &Path, geometry: &StreamGeometry, position_ms: u64) -> anyhow::Result<VideoFrame> {
    let output = Command::new("ffmpeg")
        .arg("-loglevel").arg("quiet")
        .arg("-nostdin")
        .arg("-ss").arg(seconds_arg(position_ms))
        .arg("-i").arg(path)
        .arg("-vframes").arg("1")
        .arg("-f").arg("rawvideo")
        .arg("-pix_fmt").arg("rgb24")
        .arg("-s").arg(format!("{}x{}", geometry.width, geometry.height))
        .arg("-")
        .output()?;

    if !output.status.success() {
        return Err(anyhow::anyhow!("ffmpeg failed to extract frame at {}ms", position_ms));
    }
    if output.stdout.len() != geometry.frame_bytes() {
        return Err(anyhow::anyhow!(
            "Unexpected frame size: {} (expected {})",
            output.stdout.len(),
            geometry.frame_bytes()
        ));
    }

    Ok(VideoFrame {
        image_data: rgb_to_rgba(&output.stdout),
        width: geometry.width,
        height: geometry.height,
        timestamp: position_ms,
    })
}

// =============================================================================
// READER THREADS
// =============================================================================

fn video_reader_thread(
    mut stdout: ChildStdout,
    queue: Arc<Mutex<VecDeque<VideoFrame>>>,
    stop_flag: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    geometry: StreamGeometry,
    start_ms: u64,
) {
    let frame_duration_ms = 1000.0 / geometry.frame_rate;
    let mut buffer = vec![0u8; geometry.frame_bytes()];
    let mut frame_index = 0u64;

    log::debug!("Video reader started at {}ms ({:.2} fps)", start_ms, geometry.frame_rate);

    'frames: while !stop_flag.load(Ordering::Relaxed) {
        if let Err(e) = stdout.read_exact(&mut buffer) {
            if e.kind() != std::io::ErrorKind::UnexpectedEof {
                log::debug!("Video reader error: {}", e);
            }
            break;
        }

        let frame = VideoFrame {
            image_data: rgb_to_rgba(&buffer),
            width: geometry.width,
            height: geometry.height,
            timestamp: start_ms + (frame_index as f64 * frame_duration_ms) as u64,
        };
        frame_index += 1;

        // Backpressure instead of dropping frames
        loop {
            if stop_flag.load(Ordering::Relaxed) {
                break 'frames;
            }
            match queue.lock() {
                Ok(mut queue) if queue.len() < MAX_QUEUED_FRAMES => {
                    queue.push_back(frame);
                    break;
                }
                Ok(_) => {}
                Err(_) => break 'frames,
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    finished.store(true, Ordering::SeqCst);
    log::debug!("Video reader stopped (read {} frames)", frame_index);
}

/// Reassembles f32le samples across reads that split a sample.
#[derive(Debug, Default)]
struct SampleDecoder {
    partial: Vec<u8>,
}

impl SampleDecoder {
    fn decode(&mut self, bytes: &[u8]) -> Vec<f32> {
        self.partial.extend_from_slice(bytes);
        let whole = self.partial.len() / 4 * 4;
        let samples = self.partial[..whole]
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        self.partial.drain(..whole);
        samples
    }
}

fn audio_reader_thread(
    mut stderr: ChildStderr,
    audio_buffer: Arc<Mutex<AudioBuffer>>,
    stop_flag: Arc<AtomicBool>,
) {
    let mut byte_buffer = vec![0u8; 4096];
    let mut decoder = SampleDecoder::default();
    let mut total_samples = 0u64;

    log::debug!("Audio reader started");

    while !stop_flag.load(Ordering::Relaxed) {
        let bytes_read = match stderr.read(&mut byte_buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                log::debug!("Audio reader error: {}", e);
                break;
            }
        };

        let samples = decoder.decode(&byte_buffer[..bytes_read]);

        let mut pending = &samples[..];
        while !pending.is_empty() && !stop_flag.load(Ordering::Relaxed) {
            let written = match audio_buffer.lock() {
                Ok(mut buffer) => buffer.write(pending),
                Err(_) => return,
            };
            pending = &pending[written..];
            if !pending.is_empty() {
                thread::sleep(Duration::from_millis(5));
            }
        }

        total_samples += samples.len() as u64;
    }

    log::debug!("Audio reader stopped (read {} samples)", total_samples);
}

// =============================================================================
// PLAYBACK THREAD
// =============================================================================

struct PlaybackState {
    path: PathBuf,
    info: MediaInfo,
    geometry: StreamGeometry,
    position_ms: u64,
    is_playing: bool,
    playback_start: Option<Instant>,
    playback_start_position: u64,

    ffmpeg_process: Option<Child>,
    frame_queue: Arc<Mutex<VecDeque<VideoFrame>>>,
    audio_buffer: Arc<Mutex<AudioBuffer>>,
    reader_stop: Arc<AtomicBool>,
    stream_finished: Arc<AtomicBool>,
    readers: Vec<JoinHandle<()>>,
}

impl PlaybackState {
    fn new(path: PathBuf, info: MediaInfo) -> Self {
        let geometry = StreamGeometry::for_media(&info);
        Self {
            path,
            info,
            geometry,
            position_ms: 0,
            is_playing: false,
            playback_start: None,
            playback_start_position: 0,
            ffmpeg_process: None,
            frame_queue: Arc::new(Mutex::new(VecDeque::new())),
            // 2 seconds of stereo audio
            audio_buffer: Arc::new(Mutex::new(AudioBuffer::new(
                AUDIO_SAMPLE_RATE as usize * AUDIO_CHANNELS as usize * 2,
            ))),
            reader_stop: Arc::new(AtomicBool::new(false)),
            stream_finished: Arc::new(AtomicBool::new(false)),
            readers: Vec::new(),
        }
    }

    fn current_position(&self) -> u64 {
        match (self.is_playing, self.playback_start) {
            (true, Some(start)) => {
                let position = self.playback_start_position + start.elapsed().as_millis() as u64;
                match self.info.duration_ms {
                    Some(duration) => position.min(duration),
                    None => position,
                }
            }
            _ => self.position_ms,
        }
    }

    fn clamp_position(&self, position_ms: u64) -> u64 {
        match self.info.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        }
    }

    fn start_stream(&mut self, audio: &mut AudioOutput) -> Result<(), MediaError> {
        self.stop_stream(audio);

        let mut process = start_ffmpeg_process(&self.path, &self.geometry, self.info.has_audio, self.position_ms)?;
        log::debug!("Started ffmpeg stream at {}ms", self.position_ms);

        self.reader_stop = Arc::new(AtomicBool::new(false));
        self.stream_finished = Arc::new(AtomicBool::new(false));

        if let Some(stdout) = process.stdout.take() {
            let queue = self.frame_queue.clone();
            let stop_flag = self.reader_stop.clone();
            let finished = self.stream_finished.clone();
            let geometry = self.geometry;
            let start_ms = self.position_ms;
            self.readers.push(thread::spawn(move || {
                video_reader_thread(stdout, queue, stop_flag, finished, geometry, start_ms);
            }));
        }

        if let Some(stderr) = process.stderr.take() {
            let buffer = self.audio_buffer.clone();
            let stop_flag = self.reader_stop.clone();
            self.readers.push(thread::spawn(move || {
                audio_reader_thread(stderr, buffer, stop_flag);
            }));
            audio.start(self.audio_buffer.clone(), self.reader_stop.clone());
        }

        self.ffmpeg_process = Some(process);
        self.is_playing = true;
        self.playback_start = Some(Instant::now());
        self.playback_start_position = self.position_ms;
        Ok(())
    }

    fn stop_stream(&mut self, audio: &mut AudioOutput) {
        self.reader_stop.store(true, Ordering::SeqCst);
        audio.stop();

        // Kill first so readers blocked on a pipe see EOF
        if let Some(mut process) = self.ffmpeg_process.take() {
            log::debug!("Killing ffmpeg process");
            let _ = process.kill();
            let _ = process.wait();
        }
        for handle in self.readers.drain(..) {
            let _ = handle.join();
        }

        if let Ok(mut queue) = self.frame_queue.lock() {
            queue.clear();
        }
        if let Ok(mut buffer) = self.audio_buffer.lock() {
            buffer.clear();
        }

        self.is_playing = false;
        self.playback_start = None;
    }

    fn reached_end(&self, position_ms: u64) -> bool {
        match self.info.duration_ms {
            Some(duration) => position_ms >= duration,
            None => {
                self.stream_finished.load(Ordering::SeqCst)
                    && self.frame_queue.lock().map(|q| q.is_empty()).unwrap_or(true)
            }
        }
    }

    fn release_due_frames(&self, position_ms: u64, frame_tx: &mpsc::Sender<VideoFrame>) {
        if let Ok(mut queue) = self.frame_queue.lock() {
            while queue.front().map_or(false, |frame| frame.timestamp <= position_ms) {
                if let Some(frame) = queue.pop_front() {
                    let _ = frame_tx.send(frame);
                }
            }
        }
    }

    fn send_still_frame(&self, frame_tx: &mpsc::Sender<VideoFrame>) {
        match extract_single_frame(&self.path, &self.geometry, self.position_ms) {
            Ok(frame) => {
                let _ = frame_tx.send(frame);
            }
            Err(e) => log::debug!("No still frame at {}ms: {}", self.position_ms, e),
        }
    }
}

fn playback_thread(
    path: PathBuf,
    info: MediaInfo,
    cmd_rx: mpsc::Receiver<PlaybackCommand>,
    event_tx: mpsc::Sender<PlaybackEvent>,
    frame_tx: mpsc::Sender<VideoFrame>,
) {
    let mut audio = AudioOutput::open(1.0);
    let mut state = PlaybackState::new(path, info);

    state.send_still_frame(&frame_tx);

    loop {
        let timeout = if state.is_playing {
            Duration::from_millis(8)
        } else {
            Duration::from_millis(50)
        };

        match cmd_rx.recv_timeout(timeout) {
            Ok(PlaybackCommand::Play) => {
                if state.is_playing {
                    continue;
                }
                log::debug!("Play from {}ms", state.position_ms);
                if let Err(e) = state.start_stream(&mut audio) {
                    log::error!("Failed to start playback: {}", e);
                    let _ = event_tx.send(PlaybackEvent::Error(e.to_string()));
                }
            }

            Ok(PlaybackCommand::Pause) => {
                if !state.is_playing {
                    continue;
                }
                state.position_ms = state.current_position();
                state.stop_stream(&mut audio);
                log::debug!("Paused at {}ms", state.position_ms);
                let _ = event_tx.send(PlaybackEvent::Position(state.position_ms));
            }

            Ok(PlaybackCommand::Seek(position_ms)) => {
                let was_playing = state.is_playing;
                state.stop_stream(&mut audio);
                state.position_ms = state.clamp_position(position_ms);
                log::debug!("Seek to {}ms", state.position_ms);

                if was_playing {
                    if let Err(e) = state.start_stream(&mut audio) {
                        log::error!("Failed to restart playback after seek: {}", e);
                        let _ = event_tx.send(PlaybackEvent::Error(e.to_string()));
                    }
                } else {
                    state.send_still_frame(&frame_tx);
                }
                let _ = event_tx.send(PlaybackEvent::SeekDone(state.position_ms));
            }

            Ok(PlaybackCommand::SetVolume(volume)) => audio.set_volume(volume),

            Ok(PlaybackCommand::Shutdown) => {
                log::debug!("Playback thread shutting down");
                break;
            }

            Err(mpsc::RecvTimeoutError::Timeout) => {
                if !state.is_playing {
                    continue;
                }
                let position_ms = state.current_position();

                if state.reached_end(position_ms) {
                    state.stop_stream(&mut audio);
                    state.position_ms = state.info.duration_ms.unwrap_or(position_ms);
                    let _ = event_tx.send(PlaybackEvent::Position(state.position_ms));
                    let _ = event_tx.send(PlaybackEvent::EndOfMedia);
                    continue;
                }

                state.release_due_frames(position_ms, &frame_tx);
                let _ = event_tx.send(PlaybackEvent::Position(position_ms));
            }

            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    state.stop_stream(&mut audio);
    log::debug!("Playback thread exited");
}

// =============================================================================
// FFMPEG SESSION - PUBLIC API
// =============================================================================

pub struct FfmpegSession {
    path: PathBuf,
    command_sender: mpsc::Sender<PlaybackCommand>,
    event_receiver: mpsc::Receiver<PlaybackEvent>,
    frame_receiver: mpsc::Receiver<VideoFrame>,
    thread_handle: Option<JoinHandle<()>>,

    // Mirror of the playback thread, updated eagerly on every command
    status: PlaybackStatus,
    position_ms: u64,
    duration_ms: Option<u64>,
    volume: f64,

    /// Seeks sent but not yet acknowledged; stale positions are ignored meanwhile.
    pending_seeks: usize,

    end_of_media: Option<EndOfMediaCallback>,
    disposed: bool,
}

impl FfmpegSession {
    /// Probes `path` and starts a paused session showing the first frame.
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        let info = MediaProbe::probe(path)?;
        log::info!(
            "Opening {} ({}x{}, {:.2} fps, duration {:?}ms)",
            path.display(),
            info.width,
            info.height,
            info.frame_rate,
            info.duration_ms
        );

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let (frame_tx, frame_rx) = mpsc::channel();

        let duration_ms = info.duration_ms;
        let thread_path = path.to_path_buf();
        let thread_handle = thread::Builder::new()
            .name("playback".to_string())
            .spawn(move || playback_thread(thread_path, info, cmd_rx, event_tx, frame_tx))?;

        Ok(Self::from_channels(
            path.to_path_buf(),
            duration_ms,
            cmd_tx,
            event_rx,
            frame_rx,
            Some(thread_handle),
        ))
    }

    /// The UI-side mirror around an already running (or absent) playback thread.
    fn from_channels(
        path: PathBuf,
        duration_ms: Option<u64>,
        command_sender: mpsc::Sender<PlaybackCommand>,
        event_receiver: mpsc::Receiver<PlaybackEvent>,
        frame_receiver: mpsc::Receiver<VideoFrame>,
        thread_handle: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            path,
            command_sender,
            event_receiver,
            frame_receiver,
            thread_handle,
            status: PlaybackStatus::Stopped,
            position_ms: 0,
            duration_ms,
            volume: 1.0,
            pending_seeks: 0,
            end_of_media: None,
            disposed: false,
        }
    }

    fn send(&self, command: PlaybackCommand) -> bool {
        if self.disposed {
            return false;
        }
        if self.command_sender.send(command).is_err() {
            log::debug!("Playback thread is gone; command dropped");
            return false;
        }
        true
    }

    fn handle_event(&mut self, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Position(position_ms) => {
                if self.pending_seeks == 0 {
                    self.position_ms = position_ms;
                }
            }
            PlaybackEvent::SeekDone(position_ms) => {
                self.pending_seeks = self.pending_seeks.saturating_sub(1);
                if self.pending_seeks == 0 {
                    self.position_ms = position_ms;
                }
            }
            PlaybackEvent::EndOfMedia => {
                log::info!("End of media: {}", self.path.display());
                self.status = PlaybackStatus::Stopped;
                if let Some(callback) = self.end_of_media.as_mut() {
                    callback();
                }
            }
            PlaybackEvent::Error(message) => {
                log::error!("Playback failed for {}: {}", self.path.display(), message);
                self.status = PlaybackStatus::Unknown;
            }
        }
    }
}

impl MediaSession for FfmpegSession {
    fn play(&mut self) {
        if self.disposed || self.status == PlaybackStatus::Playing {
            return;
        }
        self.send(PlaybackCommand::Play);
        self.status = PlaybackStatus::Playing;
    }

    fn pause(&mut self) {
        if self.disposed {
            return;
        }
        self.send(PlaybackCommand::Pause);
        self.status = PlaybackStatus::Paused;
    }

    fn seek(&mut self, position_ms: u64) {
        let clamped = match self.duration_ms {
            Some(duration) => position_ms.min(duration),
            None => position_ms,
        };
        if self.send(PlaybackCommand::Seek(clamped)) {
            self.pending_seeks += 1;
        }
        self.position_ms = clamped;
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
        self.send(PlaybackCommand::SetVolume(self.volume as f32));
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn status(&self) -> PlaybackStatus {
        self.status
    }

    fn current_time(&self) -> Option<u64> {
        Some(self.position_ms)
    }

    fn total_duration(&self) -> Option<u64> {
        self.duration_ms
    }

    fn on_end_of_media(&mut self, callback: EndOfMediaCallback) {
        self.end_of_media = Some(callback);
    }

    fn poll_frame(&mut self) -> Option<VideoFrame> {
        if self.disposed {
            return None;
        }
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        // Only the newest frame matters
        let mut latest_frame = None;
        while let Ok(frame) = self.frame_receiver.try_recv() {
            latest_frame = Some(frame);
        }
        latest_frame
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        log::info!("Disposing session for {}", self.path.display());
        let _ = self.command_sender.send(PlaybackCommand::Shutdown);
        self.disposed = true;
        self.status = PlaybackStatus::Stopped;
        self.end_of_media = None;

        if let Some(handle) = self.thread_handle.take() {
            for _ in 0..10 {
                if handle.is_finished() {
                    let _ = handle.join();
                    return;
                }
                thread::sleep(Duration::from_millis(100));
            }
            log::warn!("Playback thread did not shut down cleanly");
        }
    }
}

impl Drop for FfmpegSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
