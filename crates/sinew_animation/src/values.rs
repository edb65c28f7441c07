use glam::{Quat, Vec3};

/// Values that can be stored in a keyframe track.
pub trait Interpolatable: Copy + Sized {
    /// Value used when a track has no keys at all.
    const IDENTITY: Self;

    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self;
}

impl Interpolatable for Vec3 {
    const IDENTITY: Self = Vec3::ZERO;

    #[inline]
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.lerp(end, t)
    }
}

impl Interpolatable for Quat {
    const IDENTITY: Self = Quat::IDENTITY;

    /// Slerp, renormalized: slerp on slightly non-unit keys drifts.
    #[inline]
    fn interpolate_linear(start: Self, end: Self, t: f32) -> Self {
        start.slerp(end, t).normalize()
    }
}
