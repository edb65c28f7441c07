use std::sync::Arc;

use glam::Mat4;

use crate::clip::AnimationClip;
use crate::pose::{self, SparsePose};
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;

/// Plays a single clip on a skeleton without a graph.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    clip: Option<Arc<AnimationClip>>,

    /// Playback position in clip ticks.
    pub time: f32,
    pub speed: f32,
    pub looping: bool,
    pub paused: bool,

    pose: SparsePose,
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ClipPlayer {
    #[must_use]
    pub fn new(clip: Option<Arc<AnimationClip>>) -> Self {
        Self {
            clip,
            time: 0.0,
            speed: 1.0,
            looping: true,
            paused: false,
            pose: SparsePose::new(),
        }
    }

    #[must_use]
    pub fn clip(&self) -> Option<&Arc<AnimationClip>> {
        self.clip.as_ref()
    }

    /// Switches clips. Playback restarts unless `clip` is the current clip.
    pub fn set_clip(&mut self, clip: Option<Arc<AnimationClip>>) {
        let same = match (&self.clip, &clip) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.time = 0.0;
            self.clip = clip;
        }
    }

    /// Pose sampled by the last update.
    #[must_use]
    pub fn pose(&self) -> &SparsePose {
        &self.pose
    }

    /// Samples the clip at the current time into `out`, then advances by
    /// `timestep` seconds. Without a clip `out` holds the bind pose.
    pub fn update(
        &mut self,
        skeleton: &Skeleton,
        settings: &AnimationSettings,
        timestep: f32,
        out: &mut Vec<Mat4>,
    ) {
        self.pose.clear();

        let Some(clip) = &self.clip else {
            skeleton.finalize_bind_pose(settings.root_transform, out);
            return;
        };

        if !clip.is_valid_time(self.time) {
            self.time = 0.0;
        }

        pose::sample_clip_into(clip, skeleton.root(), self.time, &mut self.pose);
        skeleton.finalize_pose(&self.pose, settings.root_transform, out);

        if !self.paused {
            let delta_ticks = settings.ticks_per_second(clip.ticks_per_second()) * timestep * self.speed;
            self.time = clip.step_time(self.time, delta_ticks, self.looping);
        }
    }
}
