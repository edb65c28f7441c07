use glam::Mat4;
use rustc_hash::{FxHashMap, FxHashSet};
use sinew_core::{Result, SinewError, Symbol, interner};

use crate::pose::SparsePose;

/// A joint of the bind-pose hierarchy.
#[derive(Debug, Clone)]
pub struct BoneNode {
    pub name: Symbol,
    /// Parent-relative bind transform.
    pub bind_transform: Mat4,
    pub children: Vec<BoneNode>,
}

impl BoneNode {
    #[must_use]
    pub fn new(name: &str, bind_transform: Mat4) -> Self {
        Self {
            name: interner::intern(name),
            bind_transform,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: BoneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Depth-first, parent-before-child visit of this subtree.
    pub fn visit(&self, f: &mut impl FnMut(&BoneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(BoneNode::node_count).sum::<usize>()
    }
}

/// Skinning data of a bone referenced by mesh vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneInfo {
    /// Slot of the bone in the matrix palette.
    pub index: u32,
    /// Inverse bind matrix: model space to bone space.
    pub offset: Mat4,
}

impl BoneInfo {
    #[must_use]
    pub fn new(index: u32, offset: Mat4) -> Self {
        Self { index, offset }
    }
}

/// Immutable skeleton asset: bind hierarchy plus the bone-offset table.
///
/// Shared read-only (usually behind an `Arc`) by every graph animating a mesh
/// with this skeleton.
#[derive(Debug, Clone)]
pub struct Skeleton {
    root: BoneNode,
    bone_info: FxHashMap<Symbol, BoneInfo>,
    /// Inverse of the model's root transform, applied to every palette entry.
    inverse_transform: Mat4,
}

impl Skeleton {
    /// Builds a skeleton, checking that every bone of the offset table exists
    /// in the hierarchy.
    pub fn new<'a>(
        root: BoneNode,
        bone_info: impl IntoIterator<Item = (&'a str, BoneInfo)>,
        inverse_transform: Mat4,
    ) -> Result<Self> {
        let bone_info: FxHashMap<Symbol, BoneInfo> = bone_info
            .into_iter()
            .map(|(name, info)| (interner::intern(name), info))
            .collect();

        let mut in_tree = FxHashSet::default();
        root.visit(&mut |bone| {
            in_tree.insert(bone.name);
        });

        if let Some(missing) = bone_info.keys().find(|name| !in_tree.contains(*name)) {
            return Err(SinewError::MissingBone(interner::resolve(*missing).to_owned()));
        }

        log::debug!(
            "Skeleton created: {} joints, {} skinned bones",
            in_tree.len(),
            bone_info.len()
        );

        Ok(Self {
            root,
            bone_info,
            inverse_transform,
        })
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &BoneNode {
        &self.root
    }

    #[inline]
    #[must_use]
    pub fn bone_info(&self, bone: Symbol) -> Option<&BoneInfo> {
        self.bone_info.get(&bone)
    }

    #[inline]
    #[must_use]
    pub fn inverse_transform(&self) -> Mat4 {
        self.inverse_transform
    }

    /// Number of bones in the offset table.
    #[must_use]
    pub fn bone_count(&self) -> usize {
        self.bone_info.len()
    }

    /// Palette length needed to hold every skinned bone.
    #[must_use]
    pub fn palette_len(&self) -> usize {
        self.bone_info
            .values()
            .map(|info| info.index as usize + 1)
            .max()
            .unwrap_or(0)
    }

    /// Computes the skinning palette for `pose`.
    ///
    /// Bones present in the sparse pose use its local transform, the others
    /// fall back to their bind transform. Each skinned bone gets
    /// `inverse_transform * global * offset` at its palette index. `out` is
    /// cleared first and grows as needed; palette slots no bone maps to stay
    /// identity.
    pub fn finalize_pose(&self, pose: &SparsePose, root_parent: Mat4, out: &mut Vec<Mat4>) {
        out.clear();
        self.finalize_bone(pose, &self.root, root_parent, out);
    }

    /// Palette for the bind pose.
    pub fn finalize_bind_pose(&self, root_parent: Mat4, out: &mut Vec<Mat4>) {
        self.finalize_pose(&SparsePose::default(), root_parent, out);
    }

    fn finalize_bone(&self, pose: &SparsePose, bone: &BoneNode, parent: Mat4, out: &mut Vec<Mat4>) {
        let local = pose
            .get(bone.name)
            .map_or(bone.bind_transform, |transform| transform.to_mat4());
        let global = parent * local;

        if let Some(info) = self.bone_info.get(&bone.name) {
            let index = info.index as usize;
            if index >= out.len() {
                out.resize(index + 1, Mat4::IDENTITY);
            }
            out[index] = self.inverse_transform * global * info.offset;
        }

        for child in &bone.children {
            self.finalize_bone(pose, child, global, out);
        }
    }
}
