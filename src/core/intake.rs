use std::path::{Path, PathBuf};
use crate::core::IntakeError;

/// Extensions accepted for playback, without the leading dot.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["mp4", "flv", "mkv", "avi"];

pub const UNSUPPORTED_FORMAT_MESSAGE: &str =
    "Only video files are supported (.mp4, .flv, .mkv, .avi).";

/// Case-insensitive suffix match of a file name against the allow-list.
pub fn is_supported(name: &str) -> bool {
    let lower = name.to_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext)))
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn accept(path: &Path) -> Result<PathBuf, IntakeError> {
    let name = file_name_of(path);
    if is_supported(&name) {
        Ok(path.to_path_buf())
    } else {
        log::warn!("Rejected unsupported file: {}", path.display());
        Err(IntakeError::UnsupportedFormat(name))
    }
}

/// Resolves a drag-and-drop payload. Only the first entry is considered.
pub fn resolve_dropped(paths: &[PathBuf]) -> Result<PathBuf, IntakeError> {
    let first = paths.first().ok_or(IntakeError::EmptyDrop)?;
    accept(first)
}

/// Something that can ask the user for a video file.
pub trait FileChooser {
    /// Returns `None` when the user cancels.
    fn choose_video(&self) -> Option<PathBuf>;
}

/// Native file dialog restricted to the supported extensions.
pub struct SystemFileChooser;

impl FileChooser for SystemFileChooser {
    fn choose_video(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .set_title("Choose a video file")
            .add_filter("Video files", &SUPPORTED_EXTENSIONS)
            .pick_file()
    }
}

/// Resolves a file through the chooser. `Ok(None)` means the user cancelled.
pub fn resolve_picked(chooser: &dyn FileChooser) -> Result<Option<PathBuf>, IntakeError> {
    match chooser.choose_video() {
        Some(path) => accept(&path).map(Some),
        None => Ok(None),
    }
}
