//! Animation System
//!
//! Owns every animated instance and drives them once per frame.
//!
//! Palettes are double-buffered: [`AnimationSystem::update`] evaluates every
//! instance into a private write-side map and then copies the results into
//! the shared read side while holding a single lock. Consumers (typically the
//! renderer on another thread) read through a [`PaletteReader`] and always
//! observe whole frames.

use std::sync::Arc;

use glam::Mat4;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};

use crate::graph::AnimationGraph;
use crate::player::ClipPlayer;
use crate::settings::AnimationSettings;
use crate::skeleton::Skeleton;

new_key_type! {
    pub struct InstanceKey;
}

/// What produces an instance's pose each frame.
#[derive(Debug, Clone)]
pub enum AnimationDriver {
    Graph(Box<AnimationGraph>),
    Clip(ClipPlayer),
    BindPose,
}

#[derive(Debug, Clone)]
pub struct AnimationInstance {
    skeleton: Arc<Skeleton>,
    pub driver: AnimationDriver,
}

impl AnimationInstance {
    /// An instance driven by its own graph, usually a
    /// [`clone_graph`](AnimationGraph::clone_graph) of a shared template.
    #[must_use]
    pub fn from_graph(graph: AnimationGraph) -> Self {
        Self {
            skeleton: Arc::clone(graph.skeleton()),
            driver: AnimationDriver::Graph(Box::new(graph)),
        }
    }

    #[must_use]
    pub fn from_clip(skeleton: Arc<Skeleton>, player: ClipPlayer) -> Self {
        Self {
            skeleton,
            driver: AnimationDriver::Clip(player),
        }
    }

    #[must_use]
    pub fn bind_pose(skeleton: Arc<Skeleton>) -> Self {
        Self {
            skeleton,
            driver: AnimationDriver::BindPose,
        }
    }

    #[inline]
    #[must_use]
    pub fn skeleton(&self) -> &Arc<Skeleton> {
        &self.skeleton
    }

    #[must_use]
    pub fn graph(&self) -> Option<&AnimationGraph> {
        match &self.driver {
            AnimationDriver::Graph(graph) => Some(graph.as_ref()),
            _ => None,
        }
    }

    pub fn graph_mut(&mut self) -> Option<&mut AnimationGraph> {
        match &mut self.driver {
            AnimationDriver::Graph(graph) => Some(graph.as_mut()),
            _ => None,
        }
    }

    pub fn player_mut(&mut self) -> Option<&mut ClipPlayer> {
        match &mut self.driver {
            AnimationDriver::Clip(player) => Some(player),
            _ => None,
        }
    }

    /// Evaluates one frame into `out`. Every driver finalizes against
    /// `settings.root_transform`.
    pub fn update(&mut self, settings: &AnimationSettings, timestep: f32, out: &mut Vec<Mat4>) {
        match &mut self.driver {
            AnimationDriver::Graph(graph) => {
                graph.update_with_root(timestep, settings.root_transform, out);
            }
            AnimationDriver::Clip(player) => player.update(&self.skeleton, settings, timestep, out),
            AnimationDriver::BindPose => {
                self.skeleton.finalize_bind_pose(settings.root_transform, out);
            }
        }
    }
}

type PaletteMap = FxHashMap<InstanceKey, Vec<Mat4>>;

/// Read side of the published palettes. Cheap to clone and shareable across
/// threads.
#[derive(Debug, Clone, Default)]
pub struct PaletteReader {
    published: Arc<Mutex<PaletteMap>>,
}

impl PaletteReader {
    /// Copy of the last published palette of `key`.
    #[must_use]
    pub fn palette(&self, key: InstanceKey) -> Option<Vec<Mat4>> {
        self.published.lock().get(&key).cloned()
    }

    /// Runs `f` on the published palette of `key` without copying it.
    /// The publication lock is held for the duration of `f`.
    pub fn with_palette<R>(&self, key: InstanceKey, f: impl FnOnce(&[Mat4]) -> R) -> Option<R> {
        let guard = self.published.lock();
        guard.get(&key).map(|palette| f(palette))
    }

    /// Copy of every published palette, all from the same frame.
    #[must_use]
    pub fn snapshot(&self) -> PaletteMap {
        self.published.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.published.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.lock().is_empty()
    }
}

pub struct AnimationSystem {
    instances: SlotMap<InstanceKey, AnimationInstance>,
    write: PaletteMap,
    reader: PaletteReader,
    settings: AnimationSettings,
}

impl Default for AnimationSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationSystem {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(AnimationSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: AnimationSettings) -> Self {
        Self {
            instances: SlotMap::with_key(),
            write: FxHashMap::default(),
            reader: PaletteReader::default(),
            settings,
        }
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    /// Handle for consumers of the published palettes.
    #[must_use]
    pub fn reader(&self) -> PaletteReader {
        self.reader.clone()
    }

    pub fn insert(&mut self, instance: AnimationInstance) -> InstanceKey {
        self.instances.insert(instance)
    }

    /// Removes an instance. Its published palette disappears with the next
    /// [`update`](Self::update).
    pub fn remove(&mut self, key: InstanceKey) -> Option<AnimationInstance> {
        let instance = self.instances.remove(key)?;
        self.write.remove(&key);
        log::debug!("Animation instance {key:?} removed");
        Some(instance)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, key: InstanceKey) -> Option<&AnimationInstance> {
        self.instances.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: InstanceKey) -> Option<&mut AnimationInstance> {
        self.instances.get_mut(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Palette computed for `key` by the last update, from the write side.
    #[must_use]
    pub fn palette(&self, key: InstanceKey) -> Option<&[Mat4]> {
        self.write.get(&key).map(Vec::as_slice)
    }

    /// Evaluates every instance, then publishes all palettes at once.
    pub fn update(&mut self, timestep: f32) {
        let capacity = self.settings.palette_capacity;
        for (key, instance) in &mut self.instances {
            let out = self
                .write
                .entry(key)
                .or_insert_with(|| Vec::with_capacity(capacity));
            instance.update(&self.settings, timestep, out);
        }

        self.publish();
    }

    fn publish(&self) {
        let mut published = self.reader.published.lock();
        published.retain(|key, _| self.write.contains_key(key));
        for (key, palette) in &self.write {
            let target = published.entry(*key).or_default();
            target.clear();
            target.extend_from_slice(palette);
        }
        log::trace!("Published {} palettes", published.len());
    }
}
