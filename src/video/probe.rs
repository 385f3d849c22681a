use std::path::Path;
use std::process::Command;
use crate::core::MediaError;

#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// `None` when the container does not report a duration.
    pub duration_ms: Option<u64>,
    pub frame_rate: f64,
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
}

pub struct MediaProbe;

impl MediaProbe {
    pub fn probe(file_path: &Path) -> Result<MediaInfo, MediaError> {
        let probe_error = |reason: String| MediaError::Probe {
            path: file_path.to_path_buf(),
            reason,
        };

        let output = Command::new("ffprobe")
            .arg("-v").arg("quiet")
            .arg("-print_format").arg("json")
            .arg("-show_format")
            .arg("-show_streams")
            .arg(file_path)
            .output()
            .map_err(|e| probe_error(format!("could not run ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(probe_error("ffprobe failed".to_string()));
        }

        let json_str = String::from_utf8(output.stdout)
            .map_err(|e| probe_error(e.to_string()))?;
        Self::parse(file_path, &json_str)
    }

    /// Parses `ffprobe -print_format json -show_format -show_streams` output.
    pub fn parse(file_path: &Path, json_str: &str) -> Result<MediaInfo, MediaError> {
        let info: serde_json::Value = serde_json::from_str(json_str).map_err(|e| MediaError::Probe {
            path: file_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let duration_ms = info["format"]["duration"]
            .as_str()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| (secs * 1000.0) as u64);

        let empty_vec = vec![];
        let streams = info["streams"].as_array().unwrap_or(&empty_vec);

        let video = streams
            .iter()
            .find(|stream| stream["codec_type"].as_str() == Some("video"))
            .ok_or_else(|| MediaError::NoVideoStream(file_path.to_path_buf()))?;

        let has_audio = streams
            .iter()
            .any(|stream| stream["codec_type"].as_str() == Some("audio"));

        let width = video["width"].as_u64().unwrap_or(854) as u32;
        let height = video["height"].as_u64().unwrap_or(480) as u32;
        let frame_rate = video["r_frame_rate"]
            .as_str()
            .map(parse_frame_rate)
            .unwrap_or(30.0);

        Ok(MediaInfo {
            duration_ms,
            frame_rate,
            width,
            height,
            has_audio,
        })
    }
}

/// Parses `30000/1001` or `25` style rates, falling back to 30 fps.
fn parse_frame_rate(fps_str: &str) -> f64 {
    let fps = if let Some((num, den)) = fps_str.split_once('/') {
        let num: f64 = num.trim().parse().unwrap_or(30.0);
        let den: f64 = den.trim().parse().unwrap_or(1.0);
        if den != 0.0 { num / den } else { 30.0 }
    } else {
        fps_str.trim().parse().unwrap_or(30.0)
    };

    if fps.is_finite() && fps > 0.0 {
        fps.clamp(1.0, 1000.0)
    } else {
        30.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            { "codec_type": "video", "width": 1920, "height": 1080, "r_frame_rate": "30000/1001" },
            { "codec_type": "audio", "sample_rate": "48000" }
        ],
        "format": { "duration": "120.500000" }
    }"#;

    #[test]
    fn test_parse_media_info_output() {
        let info = MediaProbe::parse(Path::new("clip.mp4"), SAMPLE).unwrap();
        assert_eq!(info.duration_ms, Some(120_500));
        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!(info.has_audio);
        assert!((info.frame_rate - 29.97).abs() < 0.01);
    }

    #[test]
    fn test_missing_duration_is_unknown() {
        let json = r#"{ "streams": [ { "codec_type": "video", "width": 640, "height": 360 } ], "format": {} }"#;
        let info = MediaProbe::parse(Path::new("live.flv"), json).unwrap();
        assert_eq!(info.duration_ms, None);
        assert!(!info.has_audio);
        assert_eq!(info.frame_rate, 30.0);
    }

    #[test]
    fn test_audio_only_file_is_rejected() {
        let json = r#"{ "streams": [ { "codec_type": "audio" } ], "format": { "duration": "3.0" } }"#;
        assert!(matches!(
            MediaProbe::parse(Path::new("song.mkv"), json),
            Err(MediaError::NoVideoStream(_))
        ));
    }

    #[test]
    fn test_frame_rate_parsing() {
        assert_eq!(parse_frame_rate("25"), 25.0);
        assert_eq!(parse_frame_rate("60/1"), 60.0);
        assert_eq!(parse_frame_rate("0/0"), 30.0);
        assert_eq!(parse_frame_rate("garbage"), 30.0);
    }
}
