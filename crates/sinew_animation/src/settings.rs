//! Animation Settings
//!
//! Runtime configuration shared by graphs, clip players and the
//! [`AnimationSystem`](crate::system::AnimationSystem).
//!
//! ```rust,ignore
//! use sinew::animation::AnimationSettings;
//!
//! let settings = AnimationSettings {
//!     default_ticks_per_second: 30.0,
//!     ..Default::default()
//! };
//! ```

use glam::Mat4;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    /// Playback rate used for clips whose asset reports 0 ticks per second.
    pub default_ticks_per_second: f32,
    /// Number of matrices reserved up front in every palette.
    pub palette_capacity: usize,
    /// Parent transform of the skeleton root during finalization.
    pub root_transform: Mat4,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            default_ticks_per_second: 25.0,
            palette_capacity: 100,
            root_transform: Mat4::IDENTITY,
        }
    }
}

impl AnimationSettings {
    /// Effective playback rate of a clip.
    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self, clip_rate: f32) -> f32 {
        if clip_rate > 0.0 {
            clip_rate
        } else {
            self.default_ticks_per_second
        }
    }
}
