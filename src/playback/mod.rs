pub mod engine;
pub mod interpolate;
pub mod scheduler;
pub mod timeline;

pub use engine::PlaybackEngine;
pub use scheduler::{FrameScheduler, Scheduler, TickHandle};
pub use timeline::Timeline;

use serde::{Deserialize, Serialize};

/// Default time to travel from one keyframe to the next at 1x speed
pub const DEFAULT_SEGMENT_DURATION_MS: f64 = 1500.0;

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 10.0;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
}

/// How entities in one keyframe are matched with the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Pair by array position
    #[default]
    ByIndex,
    /// Pair by entity id; unmatched entities hold still
    ById,
}

/// Playback configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    pub speed: f64, // 1.0 = base pace, 2.0 = twice as fast
    pub segment_duration_ms: f64,
    pub pairing: PairingMode,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            segment_duration_ms: DEFAULT_SEGMENT_DURATION_MS,
            pairing: PairingMode::ByIndex,
        }
    }
}

impl PlaybackConfig {
    /// Wall-clock length of one segment at the current speed
    pub fn segment_duration(&self) -> f64 {
        self.segment_duration_ms / self.speed
    }
}

/// Where playback currently is, for scrubbers and progress bars
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub segment_index: usize,
    pub segment_count: usize,
    /// Fraction of the current segment covered by the last tick
    pub t: f64,
}
