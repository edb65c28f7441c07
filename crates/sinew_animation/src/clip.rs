use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use sinew_core::{Symbol, Transform, interner};

use crate::tracks::KeyframeTrack;
use crate::values::Interpolatable;

/// Keyframe tracks of one bone. The three tracks are sized independently.
#[derive(Debug, Clone, Default)]
pub struct BoneTrack {
    pub translations: KeyframeTrack<Vec3>,
    pub rotations: KeyframeTrack<Quat>,
    pub scales: KeyframeTrack<Vec3>,
}

impl BoneTrack {
    #[must_use]
    pub fn new(
        translations: KeyframeTrack<Vec3>,
        rotations: KeyframeTrack<Quat>,
        scales: KeyframeTrack<Vec3>,
    ) -> Self {
        Self {
            translations,
            rotations,
            scales,
        }
    }

    #[must_use]
    pub fn with_translations(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.translations = track;
        self
    }

    #[must_use]
    pub fn with_rotations(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotations = track;
        self
    }

    #[must_use]
    pub fn with_scales(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scales = track;
        self
    }

    /// Samples all three tracks at `time` (ticks).
    ///
    /// A component whose track has no keys keeps the value from `bind`, the
    /// bone's bind-pose local transform.
    #[must_use]
    pub fn sample(&self, time: f32, bind: &Transform) -> Transform {
        Transform {
            translation: sample_or(&self.translations, time, bind.translation),
            rotation: sample_or(&self.rotations, time, bind.rotation),
            scale: sample_or(&self.scales, time, bind.scale),
        }
    }

    fn end_time(&self) -> f32 {
        self.translations
            .end_time()
            .max(self.rotations.end_time())
            .max(self.scales.end_time())
    }
}

fn sample_or<T: Interpolatable>(track: &KeyframeTrack<T>, time: f32, fallback: T) -> T {
    if track.is_empty() {
        fallback
    } else {
        track.interpolate(time)
    }
}

/// Immutable per-bone keyframe table, shared read-only between graph instances.
///
/// `duration` and all keyframe timestamps are in ticks; `ticks_per_second`
/// converts simulation seconds into ticks.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    duration: f32,
    ticks_per_second: f32,
    bones: FxHashMap<Symbol, BoneTrack>,
}

impl AnimationClip {
    /// Builds a clip. The duration defaults to the latest keyframe of any track.
    #[must_use]
    pub fn new<'a>(
        name: impl Into<String>,
        ticks_per_second: f32,
        bones: impl IntoIterator<Item = (&'a str, BoneTrack)>,
    ) -> Self {
        let bones: FxHashMap<Symbol, BoneTrack> = bones
            .into_iter()
            .map(|(bone, track)| (interner::intern(bone), track))
            .collect();

        let duration = bones
            .values()
            .map(BoneTrack::end_time)
            .fold(0.0_f32, f32::max);

        Self {
            name: name.into(),
            duration,
            ticks_per_second,
            bones,
        }
    }

    /// Overrides the duration reported by the asset.
    #[must_use]
    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    #[inline]
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Ticks per second as stored in the asset; may be 0 when the source
    /// format does not specify it.
    #[inline]
    #[must_use]
    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    #[inline]
    #[must_use]
    pub fn bone(&self, bone: Symbol) -> Option<&BoneTrack> {
        self.bones.get(&bone)
    }

    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> impl Iterator<Item = (Symbol, &BoneTrack)> {
        self.bones.iter().map(|(&name, track)| (name, track))
    }

    #[inline]
    #[must_use]
    pub fn is_valid_time(&self, time: f32) -> bool {
        time <= self.duration
    }

    /// Advances `time` by `delta_ticks`.
    ///
    /// Past the end the time wraps to 0 when looping, otherwise it clamps to
    /// the duration. Reverse playback below 0 wraps to the duration when
    /// looping, otherwise clamps to 0.
    #[must_use]
    pub fn step_time(&self, time: f32, delta_ticks: f32, looping: bool) -> f32 {
        let time = time + delta_ticks;
        if time > self.duration {
            if looping { 0.0 } else { self.duration }
        } else if time < 0.0 {
            if looping { self.duration } else { 0.0 }
        } else {
            time
        }
    }
}
