//! "MM:SS" timestamps as used in clip ranges.

use crate::Clip;

/// Convert "MM:SS" to seconds.
///
/// Anything that is not exactly two numeric parts yields `0.0` rather than an
/// error, including "HH:MM:SS" and inputs with no separator.
pub fn parse_to_seconds(text: &str) -> f64 {
    let parts: Vec<&str> = text.split(':').collect();
    match parts.as_slice() {
        [minutes, seconds] => match (minutes.trim().parse::<f64>(), seconds.trim().parse::<f64>()) {
            (Ok(m), Ok(s)) if m.is_finite() && s.is_finite() => m * 60.0 + s,
            _ => 0.0,
        },
        _ => 0.0,
    }
}

/// Seconds between a clip's start and end. Not clamped: malformed ranges give
/// zero or negative durations.
pub fn clip_duration(clip: &Clip) -> f64 {
    parse_to_seconds(&clip.end_time) - parse_to_seconds(&clip.start_time)
}
