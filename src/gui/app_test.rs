#[cfg(test)]
mod tests {

    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::rc::Rc;
    use std::time::{Duration, Instant};
    use crate::core::{keys, FileChooser, MediaError, Preferences, Theme, UNSUPPORTED_FORMAT_MESSAGE};
    use crate::gui::app::{PlayerApp, NO_FILE_LABEL};
    use crate::gui::autohide::VisibilityState;
    use crate::gui::control_bar::ControlEvent;
    use crate::video::mock_session::{MockSession, SessionCall, SessionRecorder};
    use crate::video::MediaSession;

    struct FixedChooser(Option<PathBuf>);

    impl FileChooser for FixedChooser {
        fn choose_video(&self) -> Option<PathBuf> {
            self.0.clone()
        }
    }

    type SessionQueue = Rc<RefCell<VecDeque<MockSession>>>;

    // Test helper: an app whose opener hands out queued mock sessions
    fn create_test_app(preferences: Preferences, chosen: Option<PathBuf>, start: Instant) -> (PlayerApp, SessionQueue) {
        let queue: SessionQueue = Rc::new(RefCell::new(VecDeque::new()));
        let sessions = Rc::clone(&queue);
        let app = PlayerApp::with_parts(
            preferences,
            Box::new(move |path| {
                sessions
                    .borrow_mut()
                    .pop_front()
                    .map(|session| Box::new(session) as Box<dyn MediaSession>)
                    .ok_or_else(|| MediaError::NoVideoStream(path.to_path_buf()))
            }),
            Box::new(FixedChooser(chosen)),
            start,
        );
        (app, queue)
    }

    fn queue_session(queue: &SessionQueue, duration: Option<u64>) -> SessionRecorder {
        let (session, recorder) = MockSession::new(duration);
        queue.borrow_mut().push_back(session);
        recorder
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initial_state() {
        let (app, _queue) = create_test_app(Preferences::in_memory(), None, Instant::now());

        assert!(!app.has_video());
        assert_eq!(app.file_name, NO_FILE_LABEL);
        assert!(!app.controller.view().play_pause.is_enabled());
        assert!(app.error_message.is_none());
        assert!(app.settings_panel.is_none());
    }

    #[test]
    fn test_load_video_applies_default_volume_without_auto_play() {
        let start = Instant::now();
        let mut prefs = Preferences::in_memory();
        prefs.put_double(keys::DEFAULT_VOLUME, 0.4);
        let (mut app, queue) = create_test_app(prefs, None, start);
        let recorder = queue_session(&queue, Some(120_000));

        app.load_video(&PathBuf::from("/videos/movie.mp4"), start);

        assert!(app.has_video());
        assert_eq!(app.file_name, "movie.mp4");
        assert_eq!(recorder.calls(), vec![SessionCall::SetVolume(0.4)]);
        assert_eq!(app.controller.view().volume_bar.value(), 0.4);
        assert!(app.controller.view().play_pause.is_enabled());
    }

    #[test]
    fn test_load_video_with_auto_play_starts_playback() {
        let start = Instant::now();
        let mut prefs = Preferences::in_memory();
        prefs.put_bool(keys::AUTO_PLAY, true);
        let (mut app, queue) = create_test_app(prefs, None, start);
        let recorder = queue_session(&queue, Some(120_000));

        app.load_video(&PathBuf::from("clip.mkv"), start);

        assert_eq!(recorder.count(&SessionCall::Play), 1);
        assert!(app.controller.is_playing());
    }

    #[test]
    fn test_loading_a_new_video_disposes_the_previous_session() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        let first = queue_session(&queue, Some(60_000));
        let second = queue_session(&queue, Some(90_000));

        app.load_video(&PathBuf::from("first.mp4"), start);
        app.load_video(&PathBuf::from("second.mp4"), start);

        assert_eq!(first.count(&SessionCall::Dispose), 1);
        assert_eq!(second.count(&SessionCall::Dispose), 0);
        assert_eq!(app.file_name, "second.mp4");
    }

    #[test]
    fn test_open_failure_reports_error_and_clears_state() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        let first = queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("first.mp4"), start);

        // Queue is empty now, so the opener fails
        app.load_video(&PathBuf::from("broken.mp4"), start);

        assert_eq!(first.count(&SessionCall::Dispose), 1);
        assert!(!app.has_video());
        assert_eq!(app.file_name, NO_FILE_LABEL);
        assert!(app.error_message.as_deref().unwrap_or_default().contains("broken.mp4"));
    }

    #[test]
    fn test_unsupported_drop_keeps_current_session() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        let recorder = queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("movie.avi"), start);
        recorder.clear();

        app.open_dropped(&[PathBuf::from("notes.txt")], start);

        assert_eq!(app.error_message.as_deref(), Some(UNSUPPORTED_FORMAT_MESSAGE));
        assert!(recorder.calls().is_empty());
        assert_eq!(app.file_name, "movie.avi");
    }

    #[test]
    fn test_drop_uses_first_file_only() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        queue_session(&queue, Some(60_000));

        app.open_dropped(&[PathBuf::from("a.flv"), PathBuf::from("b.txt")], start);

        assert!(app.has_video());
        assert_eq!(app.file_name, "a.flv");
        assert!(app.error_message.is_none());
    }

    #[test]
    fn test_empty_drop_is_ignored() {
        let (mut app, _queue) = create_test_app(Preferences::in_memory(), None, Instant::now());

        app.open_dropped(&[], Instant::now());

        assert!(app.error_message.is_none());
        assert!(!app.has_video());
    }

    #[test]
    fn test_chooser_paths() {
        let start = Instant::now();

        let (mut app, _queue) = create_test_app(Preferences::in_memory(), None, start);
        app.open_with_chooser(start);
        assert!(app.error_message.is_none());
        assert!(!app.has_video());

        let (mut app, _queue) = create_test_app(Preferences::in_memory(), Some(PathBuf::from("song.mp3")), start);
        app.open_with_chooser(start);
        assert_eq!(app.error_message.as_deref(), Some(UNSUPPORTED_FORMAT_MESSAGE));

        let (mut app, queue) = create_test_app(Preferences::in_memory(), Some(PathBuf::from("film.MP4")), start);
        queue_session(&queue, Some(60_000));
        app.open_with_chooser(start);
        assert!(app.has_video());
        assert_eq!(app.file_name, "film.MP4");
    }

    #[test]
    fn test_end_of_media_rewinds_and_pauses() {
        let start = Instant::now();
        let mut prefs = Preferences::in_memory();
        prefs.put_bool(keys::AUTO_PLAY, true);
        let (mut app, queue) = create_test_app(prefs, None, start);
        let recorder = queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("movie.mp4"), start);
        recorder.clear();

        recorder.finish();
        app.tick(start + ms(16));

        assert_eq!(recorder.calls(), vec![SessionCall::Seek(0), SessionCall::Pause]);
        assert!(!app.controller.is_playing());
        assert_eq!(app.controller.view().seek_bar.value(), 0.0);

        // The flag is consumed
        app.tick(start + ms(32));
        assert_eq!(recorder.count(&SessionCall::Seek(0)), 1);
    }

    #[test]
    fn test_control_bar_fades_only_while_playing() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("movie.mp4"), start);

        app.tick(start + ms(5000));
        assert_eq!(app.control_presenter.state(), VisibilityState::Visible);

        app.handle_control_event(ControlEvent::TogglePlayPause);
        app.tick(start + ms(6000));
        assert!(matches!(app.control_presenter.state(), VisibilityState::Fading { .. }));
    }

    #[test]
    fn test_menu_bar_fades_once_a_video_is_loaded() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);

        app.tick(start + ms(5000));
        assert_eq!(app.menu_presenter.state(), VisibilityState::Visible);

        queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("movie.mp4"), start + ms(5000));
        app.tick(start + ms(8001));
        assert!(matches!(app.menu_presenter.state(), VisibilityState::Fading { .. }));
    }

    #[test]
    fn test_control_events_drive_the_transport() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        let recorder = queue_session(&queue, Some(100_000));
        app.load_video(&PathBuf::from("movie.mp4"), start);
        recorder.clear();

        app.handle_control_event(ControlEvent::SeekPressed);
        app.handle_control_event(ControlEvent::SeekDragged(0.4));
        app.handle_control_event(ControlEvent::SeekReleased(0.5));
        app.handle_control_event(ControlEvent::VolumeChanged(0.9));
        app.handle_control_event(ControlEvent::ToggleFullscreen);

        assert_eq!(
            recorder.calls(),
            vec![SessionCall::Pause, SessionCall::Seek(50_000), SessionCall::SetVolume(0.9)]
        );
    }

    #[test]
    fn test_reload_settings_applies_hide_delay_and_theme() {
        let start = Instant::now();
        let (mut app, _queue) = create_test_app(Preferences::in_memory(), None, start);
        app.open_settings();
        assert!(app.settings_panel.is_some());

        app.preferences.put_int(keys::HIDE_DELAY, 7);
        app.preferences.put_value(keys::THEME, &Theme::EyeCare);
        app.reload_settings();

        assert_eq!(app.control_presenter.idle_threshold(), Duration::from_secs(7));
        assert_eq!(app.menu_presenter.idle_threshold(), Duration::from_secs(7));
        assert_eq!(app.settings.theme, Theme::EyeCare);
        assert!(app.pending_theme);
    }

    #[test]
    fn test_shutdown_disposes_session() {
        let start = Instant::now();
        let (mut app, queue) = create_test_app(Preferences::in_memory(), None, start);
        let recorder = queue_session(&queue, Some(60_000));
        app.load_video(&PathBuf::from("movie.mp4"), start);

        app.shutdown();

        assert_eq!(recorder.count(&SessionCall::Dispose), 1);
        assert!(!app.has_video());
    }
}
