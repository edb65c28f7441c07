//! Sparse poses and the pose algebra.
//!
//! A [`SparsePose`] only holds the bones an animation or operation actually
//! touched. Every combining operation here walks the full skeleton tree once,
//! so its cost is proportional to the bone count regardless of how sparse the
//! inputs are. A bone missing from an input is treated as identity by the
//! additive operations and simply skipped by blending.

use rustc_hash::FxHashMap;
use sinew_core::{Symbol, Transform};

use crate::clip::AnimationClip;
use crate::skeleton::BoneNode;

/// Mapping from bone name to local transform, for the bones that changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparsePose {
    bones: FxHashMap<Symbol, Transform>,
}

impl SparsePose {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn get(&self, bone: Symbol) -> Option<&Transform> {
        self.bones.get(&bone)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, bone: Symbol) -> bool {
        self.bones.contains_key(&bone)
    }

    #[inline]
    pub fn insert(&mut self, bone: Symbol, transform: Transform) {
        self.bones.insert(bone, transform);
    }

    pub fn remove(&mut self, bone: Symbol) -> Option<Transform> {
        self.bones.remove(&bone)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn clear(&mut self) {
        self.bones.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Transform)> {
        self.bones.iter().map(|(&bone, transform)| (bone, transform))
    }
}

impl FromIterator<(Symbol, Transform)> for SparsePose {
    fn from_iter<I: IntoIterator<Item = (Symbol, Transform)>>(iter: I) -> Self {
        Self {
            bones: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Clip sampling
// ============================================================================

/// Samples `clip` at `time` (ticks) for every bone of the tree the clip animates.
#[must_use]
pub fn sample_clip(clip: &AnimationClip, root: &BoneNode, time: f32) -> SparsePose {
    let mut pose = SparsePose::new();
    sample_clip_into(clip, root, time, &mut pose);
    pose
}

/// Like [`sample_clip`], writing into an existing pose.
///
/// Track components without keys take the bone's bind-pose value.
pub fn sample_clip_into(clip: &AnimationClip, bone: &BoneNode, time: f32, out: &mut SparsePose) {
    if let Some(track) = clip.bone(bone.name) {
        let bind = Transform::from_matrix(&bone.bind_transform);
        out.insert(bone.name, track.sample(time, &bind));
    }

    for child in &bone.children {
        sample_clip_into(clip, child, time, out);
    }
}

// ============================================================================
// Blending
// ============================================================================

/// Blends `a` towards `b` by `alpha`.
///
/// `alpha == 0` returns `a` and `alpha == 1` returns `b` exactly. Otherwise a
/// bone present in both is interpolated, a bone present in one is copied
/// unchanged and a bone present in neither stays absent.
#[must_use]
pub fn blend_poses(a: &SparsePose, b: &SparsePose, root: &BoneNode, alpha: f32) -> SparsePose {
    if alpha == 0.0 {
        return a.clone();
    }
    if alpha == 1.0 {
        return b.clone();
    }

    let mut out = SparsePose::new();
    blend_bone(a, b, root, alpha, &mut out);
    out
}

fn blend_bone(a: &SparsePose, b: &SparsePose, bone: &BoneNode, alpha: f32, out: &mut SparsePose) {
    match (a.get(bone.name), b.get(bone.name)) {
        (Some(ta), Some(tb)) => out.insert(bone.name, ta.lerp(tb, alpha)),
        (Some(t), None) | (None, Some(t)) => out.insert(bone.name, *t),
        (None, None) => {}
    }

    for child in &bone.children {
        blend_bone(a, b, child, alpha, out);
    }
}

// ============================================================================
// Additive
// ============================================================================

/// Additive difference `source - reference` for every bone present in either.
#[must_use]
pub fn calculate_additive(reference: &SparsePose, source: &SparsePose, root: &BoneNode) -> SparsePose {
    let mut out = SparsePose::new();
    additive_difference_bone(reference, source, root, &mut out);
    out
}

fn additive_difference_bone(
    reference: &SparsePose,
    source: &SparsePose,
    bone: &BoneNode,
    out: &mut SparsePose,
) {
    let ref_tr = reference.get(bone.name);
    let src_tr = source.get(bone.name);

    if ref_tr.is_some() || src_tr.is_some() {
        let ref_tr = ref_tr.copied().unwrap_or_default();
        let src_tr = src_tr.copied().unwrap_or_default();
        out.insert(bone.name, src_tr.difference(&ref_tr));
    }

    for child in &bone.children {
        additive_difference_bone(reference, source, child, out);
    }
}

/// Applies `additive` on top of `target` at strength `alpha`.
///
/// For each bone present in either pose, the additive transform is first
/// interpolated from identity by `alpha` and then composed with the target
/// transform (identity when the target lacks the bone). `alpha == 0` returns
/// `target` unchanged.
#[must_use]
pub fn apply_additive(
    target: &SparsePose,
    additive: &SparsePose,
    root: &BoneNode,
    alpha: f32,
) -> SparsePose {
    if alpha == 0.0 {
        return target.clone();
    }

    let mut out = SparsePose::new();
    apply_additive_bone(target, additive, root, alpha, &mut out);
    out
}

fn apply_additive_bone(
    target: &SparsePose,
    additive: &SparsePose,
    bone: &BoneNode,
    alpha: f32,
    out: &mut SparsePose,
) {
    let target_tr = target.get(bone.name);
    let additive_tr = additive.get(bone.name);

    if target_tr.is_some() || additive_tr.is_some() {
        let target_tr = target_tr.copied().unwrap_or_default();
        let additive_tr = additive_tr.copied().unwrap_or_default();
        let lerped = Transform::IDENTITY.lerp(&additive_tr, alpha);
        out.insert(bone.name, lerped.apply_to(&target_tr));
    }

    for child in &bone.children {
        apply_additive_bone(target, additive, child, alpha, out);
    }
}
