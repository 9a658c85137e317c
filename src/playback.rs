//! Simulated playback over a clip's timeline.

use crate::captions::find_active;
use crate::{Caption, Clip};

/// Slowest accepted preview speed multiplier
pub const MIN_SPEED: f64 = 0.1;
/// Fastest accepted preview speed multiplier
pub const MAX_SPEED: f64 = 100.0;
/// Upper bound on frames produced by [`timeline`]
pub const MAX_TIMELINE_FRAMES: usize = 10_000;

/// Whether `speed` is usable as a playback multiplier
pub fn is_valid_speed(speed: f64) -> bool {
    speed.is_finite() && (MIN_SPEED..=MAX_SPEED).contains(&speed)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Playback {
    duration: f64,
    position: f64,
    playing: bool,
}

impl Playback {
    pub fn new(clip: &Clip) -> Self {
        let duration = clip.duration();
        Self {
            duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
            position: 0.0,
            playing: false,
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Play/pause. Returns the new playing state.
    pub fn toggle(&mut self) -> bool {
        self.playing = !self.playing;
        self.playing
    }

    /// Move the playhead forward by `dt` seconds while playing.
    ///
    /// Reaching the end stops playback and rewinds to 0. Returns true when
    /// that happened. A non-finite `dt` is ignored.
    pub fn advance(&mut self, dt: f64) -> bool {
        if !self.playing || !dt.is_finite() {
            return false;
        }

        self.position += dt.max(0.0);
        if self.position >= self.duration {
            self.playing = false;
            self.position = 0.0;
            return true;
        }
        false
    }

    pub fn active_caption<'a>(&self, clip: &'a Clip) -> Option<&'a Caption> {
        find_active(self.position, &clip.captions)
    }
}

/// Frames sampled every `step` seconds from 0 through the clip duration,
/// each with the caption showing at that instant.
///
/// The step is widened when needed so no more than [`MAX_TIMELINE_FRAMES`]
/// frames (plus the one at 0) are produced.
pub fn timeline(clip: &Clip, step: f64) -> Vec<(f64, Option<&Caption>)> {
    let duration = clip.duration();
    if !step.is_finite() || step <= 0.0 || !duration.is_finite() || duration <= 0.0 {
        return Vec::new();
    }

    let step = step.max(duration / MAX_TIMELINE_FRAMES as f64);
    let frames = ((duration / step).floor() as usize).min(MAX_TIMELINE_FRAMES);
    (0..=frames)
        .map(|i| {
            let position = i as f64 * step;
            (position, find_active(position, &clip.captions))
        })
        .collect()
}
