//! Playback clock
//!
//! A pure state machine driven by caller-supplied elapsed time. It never
//! touches pose data; [`AnimationClock::playback_state`] hands the current
//! position to the pose query.

use crate::config::PlaybackConfig;
use crate::pose::{PlaybackState, ResolvedClip};

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClock {
    clip: Option<String>,
    frames_per_second: f32,
    frame_count: usize,
    current_frame: usize,
    /// Seconds accumulated since `current_frame` began
    accumulated: f64,
    fallback_fps: f32,
    interpolate: bool,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

impl AnimationClock {
    /// Idle clock (no clip)
    pub fn new(config: &PlaybackConfig) -> Self {
        Self {
            clip: None,
            frames_per_second: 0.0,
            frame_count: 0,
            current_frame: 0,
            accumulated: 0.0,
            fallback_fps: config.fallback_fps,
            interpolate: config.interpolate,
        }
    }

    /// Start `clip` from frame 0.
    ///
    /// Clips that report no usable rate play at the configured fallback rate.
    pub fn play(&mut self, clip: impl Into<String>, frames_per_second: f32, frame_count: usize) {
        self.clip = Some(clip.into());
        self.frames_per_second = if frames_per_second.is_finite() && frames_per_second > 0.0 {
            frames_per_second
        } else {
            self.fallback_fps
        };
        self.frame_count = frame_count;
        self.current_frame = 0;
        self.accumulated = 0.0;
    }

    pub fn play_clip(&mut self, clip: &ResolvedClip) {
        self.play(clip.name.clone(), clip.frames_per_second, clip.frame_count);
    }

    /// Return to the bind pose
    pub fn stop(&mut self) {
        self.clip = None;
        self.frame_count = 0;
        self.current_frame = 0;
        self.accumulated = 0.0;
    }

    pub fn clip(&self) -> Option<&str> {
        self.clip.as_deref()
    }

    pub fn frames_per_second(&self) -> f32 {
        self.frames_per_second
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    fn frame_duration(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            1.0 / self.frames_per_second as f64
        } else {
            0.0
        }
    }

    /// Fraction of the way from the current frame to the next, 0.0..=1.0
    pub fn blend_factor(&self) -> f32 {
        let duration = self.frame_duration();
        if duration <= 0.0 {
            return 0.0;
        }
        (self.accumulated / duration).clamp(0.0, 1.0) as f32
    }

    /// Accumulate `elapsed_seconds`, rolling the frame forward (and wrapping)
    /// once per full frame duration.
    pub fn advance(&mut self, elapsed_seconds: f32) {
        if self.clip.is_none() || self.frame_count == 0 {
            return;
        }
        if !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            return;
        }
        let duration = self.frame_duration();
        if duration <= 0.0 {
            return;
        }

        self.accumulated += elapsed_seconds as f64;
        if self.accumulated >= duration {
            let whole = (self.accumulated / duration).floor();
            self.accumulated = (self.accumulated - whole * duration).max(0.0);
            let steps = (whole as u64 % self.frame_count as u64) as usize;
            self.current_frame = (self.current_frame + steps) % self.frame_count;
        }
    }

    /// Jump to `frame` (wrapped into the clip) with the given blend
    pub fn set_frame(&mut self, frame: usize, blend_factor: f32) {
        if self.frame_count == 0 {
            return;
        }
        self.current_frame = frame % self.frame_count;
        let blend = if blend_factor.is_finite() {
            blend_factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.accumulated = blend as f64 * self.frame_duration();
    }

    /// `(current_frame + blend) / frame_count`; 0 with no clip
    pub fn percent_complete(&self) -> f32 {
        if self.frame_count == 0 {
            return 0.0;
        }
        (self.current_frame as f32 + self.blend_factor()) / self.frame_count as f32
    }

    /// Position to pass to the pose query
    pub fn playback_state(&self) -> PlaybackState {
        PlaybackState {
            clip: self.clip.clone(),
            frame: self.current_frame,
            blend: if self.interpolate {
                self.blend_factor()
            } else {
                0.0
            },
        }
    }
}
