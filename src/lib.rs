pub mod app;
pub mod captions;
pub mod config;
pub mod error;
pub mod gemini;
pub mod output;
pub mod playback;
pub mod timecode;

use serde::{Deserialize, Serialize};

pub use error::{ClipError, ConfigError};

/// Shortest clip duration the model is asked for, in seconds
pub const MIN_CLIP_SECONDS: f64 = 30.0;
/// Longest clip duration the model is asked for, in seconds
pub const MAX_CLIP_SECONDS: f64 = 60.0;

/// A single timed caption line, relative to the start of its clip
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Caption {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
}

/// One AI-proposed short-form excerpt
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub title: String,
    /// "MM:SS"
    pub start_time: String,
    /// "MM:SS"
    pub end_time: String,
    pub summary: String,
    pub virality_score: f64,
    pub captions: Vec<Caption>,
}

impl Clip {
    /// Clip length in seconds, derived from the MM:SS range
    pub fn duration(&self) -> f64 {
        timecode::clip_duration(self)
    }

    /// Soft-invariant violations. These never reject a clip; they are only reported.
    pub fn advisories(&self) -> Vec<String> {
        let mut notes = Vec::new();
        let duration = self.duration();

        if !(MIN_CLIP_SECONDS..=MAX_CLIP_SECONDS).contains(&duration) {
            notes.push(format!(
                "duration {duration:.1}s outside {MIN_CLIP_SECONDS}-{MAX_CLIP_SECONDS}s ({} - {})",
                self.start_time, self.end_time
            ));
        }

        if !(1.0..=10.0).contains(&self.virality_score) {
            notes.push(format!("virality score {} outside 1.0-10.0", self.virality_score));
        }

        for (i, c) in self.captions.iter().enumerate() {
            if c.end_time < c.start_time {
                notes.push(format!("caption {i} ends before it starts"));
            } else if c.start_time < 0.0 || c.end_time > duration {
                notes.push(format!(
                    "caption {i} ({:.1}-{:.1}s) outside clip range 0-{duration:.1}s",
                    c.start_time, c.end_time
                ));
            }
        }

        notes
    }
}

const VIDEO_ID_PATTERNS: &[&str] = &[
    // Bare 11-character video ID
    r"^([a-zA-Z0-9_-]{11})$",
    r"youtube\.com/watch\?.*v=([a-zA-Z0-9_-]{11})",
    r"youtu\.be/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/embed/([a-zA-Z0-9_-]{11})",
    r"youtube\.com/shorts/([a-zA-Z0-9_-]{11})",
];

/// Extract the video ID from the usual YouTube URL forms.
///
/// Only used to warn about suspicious input; submissions are never rejected on it.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    VIDEO_ID_PATTERNS.iter().find_map(|pattern| {
        let re = regex::Regex::new(pattern).ok()?;
        re.captures(input).map(|caps| caps[1].to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_clip() -> Clip {
        Clip {
            title: "The moment it clicked".to_string(),
            start_time: "02:10".to_string(),
            end_time: "02:55".to_string(),
            summary: "The host finally explains the trick.".to_string(),
            virality_score: 8.4,
            captions: vec![
                Caption {
                    start_time: 0.0,
                    end_time: 2.5,
                    text: "Wait for it".to_string(),
                },
                Caption {
                    start_time: 2.5,
                    end_time: 6.0,
                    text: "there it is".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_watch_url_with_extra_params() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=120"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_short_and_shorts_urls() {
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
        assert_eq!(
            extract_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_bare_id_with_whitespace() {
        assert_eq!(extract_video_id("  dQw4w9WgXcQ  "), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_unrecognised_input() {
        assert_eq!(extract_video_id("https://vimeo.com/12345"), None);
        assert_eq!(extract_video_id(""), None);
    }

    #[test]
    fn test_clip_json_uses_camel_case() {
        let json = serde_json::to_value(sample_clip()).unwrap();
        assert_eq!(json["startTime"], "02:10");
        assert_eq!(json["viralityScore"], 8.4);
        assert_eq!(json["captions"][1]["endTime"], 6.0);
    }

    #[test]
    fn test_clip_survives_json_text() {
        let clip = sample_clip();
        let text = serde_json::to_string(&clip).unwrap();
        let back: Clip = serde_json::from_str(&text).unwrap();
        assert_eq!(back, clip);
    }

    #[test]
    fn test_clip_missing_field_rejected() {
        let json = r#"{"title":"t","startTime":"00:00","endTime":"00:30","summary":"s","captions":[]}"#;
        assert!(serde_json::from_str::<Clip>(json).is_err());
    }

    #[test]
    fn test_advisories_clean_clip() {
        assert!(sample_clip().advisories().is_empty());
    }

    #[test]
    fn test_advisories_flag_soft_violations() {
        let mut clip = sample_clip();
        clip.end_time = "02:20".to_string();
        clip.virality_score = 11.0;
        clip.captions.push(Caption {
            start_time: 9.0,
            end_time: 12.0,
            text: "too late".to_string(),
        });

        let notes = clip.advisories();
        assert_eq!(notes.len(), 3);
        assert!(notes[0].starts_with("duration 10.0s"));
        assert!(notes[1].contains("virality score 11"));
        assert!(notes[2].starts_with("caption 2"));
    }
}
