//! This module contains the [`Scene`], which owns one of every particle group and the single chaos
//! toggle that they all follow.

use crate::{
    groups::{
        Foliage, FoliageConfig, Gifts, GiftsConfig, Ornaments, OrnamentsConfig, Ribbon,
        RibbonConfig, Snow, SnowConfig, Star, StarConfig,
    },
    traits::{Config, ParticleGroup},
    transition::ChaosToggle,
    BuildError, GroupKind,
};
use ct_frame::{FrameClock, InstanceBuffer, SceneFrame};
use glam::Vec3;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, info, instrument, trace};

/// The gentle bob of the whole tree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloatConfig {
    /// How far the tree moves up and down.
    pub amplitude: f32,

    /// The angular frequency of the bob, in radians per second.
    pub speed: f32,
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            amplitude: 0.3,
            speed: 0.4,
        }
    }
}

impl FloatConfig {
    /// The offset of the floating groups at time `elapsed`.
    pub fn offset_at(&self, elapsed: f32) -> Vec3 {
        let y = (elapsed * self.speed).sin() * self.amplitude;
        if y.is_finite() {
            Vec3::new(0., y, 0.)
        } else {
            Vec3::ZERO
        }
    }
}

/// The config for a whole [`Scene`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// See [`FoliageConfig`].
    pub foliage: FoliageConfig,

    /// See [`OrnamentsConfig`].
    pub ornaments: OrnamentsConfig,

    /// See [`GiftsConfig`].
    pub gifts: GiftsConfig,

    /// See [`RibbonConfig`].
    pub ribbon: RibbonConfig,

    /// See [`StarConfig`].
    pub star: StarConfig,

    /// See [`SnowConfig`].
    pub snow: SnowConfig,

    /// See [`FloatConfig`].
    pub float: FloatConfig,
}

impl Config for SceneConfig {
    fn config_name() -> &'static str {
        "Scene"
    }
}

/// The whole animated tree.
///
/// Call [`update`](Self::update) once per frame, then hand [`frame`](Self::frame) to the
/// renderer.
pub struct Scene {
    /// The config the scene was built from.
    config: SceneConfig,

    /// One of each group, in [`GroupKind`] order.
    groups: Vec<Box<dyn ParticleGroup>>,

    /// The chaos switch.
    toggle: ChaosToggle,

    /// The clock as of the last update.
    clock: FrameClock,

    /// The current float offset.
    offset: Vec3,
}

impl Scene {
    /// Build the whole scene, with every group owning a buffer of the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: SceneConfig, rng: &mut R) -> Self {
        let groups: Vec<Box<dyn ParticleGroup>> = vec![
            Box::new(Foliage::new(config.foliage.clone(), rng)),
            Box::new(Ornaments::new(config.ornaments.clone(), rng)),
            Box::new(Gifts::new(config.gifts.clone(), rng)),
            Box::new(Ribbon::new(config.ribbon.clone(), rng)),
            Box::new(Star::new(config.star.clone())),
            Box::new(Snow::new(config.snow.clone(), rng)),
        ];

        Self::from_groups(config, groups)
    }

    /// Build the whole scene with a fresh source of randomness.
    pub fn from_config(config: SceneConfig) -> Self {
        let mut rng = rng!();
        Self::new(config, &mut rng)
    }

    /// Build the whole scene into buffers supplied by the renderer.
    ///
    /// `make_buffer` is called once for each group, in [`GroupKind`] order. If any buffer is
    /// the wrong size or is missing colours that the group needs, the first such error is
    /// returned and nothing is built.
    #[instrument(skip_all)]
    pub fn with_buffers<F, R>(
        config: SceneConfig,
        mut make_buffer: F,
        rng: &mut R,
    ) -> Result<Self, BuildError>
    where
        F: FnMut(GroupKind) -> InstanceBuffer,
        R: Rng + ?Sized,
    {
        let mut groups: Vec<Box<dyn ParticleGroup>> = Vec::with_capacity(6);

        for kind in GroupKind::iter() {
            let buffer = make_buffer(kind);
            let group: Box<dyn ParticleGroup> = match kind {
                GroupKind::Foliage => {
                    Box::new(Foliage::with_buffer(config.foliage.clone(), buffer, rng)?)
                }
                GroupKind::Ornaments => {
                    Box::new(Ornaments::with_buffer(config.ornaments.clone(), buffer, rng)?)
                }
                GroupKind::Gifts => {
                    Box::new(Gifts::with_buffer(config.gifts.clone(), buffer, rng)?)
                }
                GroupKind::Ribbon => {
                    Box::new(Ribbon::with_buffer(config.ribbon.clone(), buffer, rng)?)
                }
                GroupKind::Star => Box::new(Star::with_buffer(config.star.clone(), buffer)?),
                GroupKind::Snow => {
                    Box::new(Snow::with_buffer(config.snow.clone(), buffer, rng)?)
                }
            };
            groups.push(group);
        }

        Ok(Self::from_groups(config, groups))
    }

    fn from_groups(config: SceneConfig, groups: Vec<Box<dyn ParticleGroup>>) -> Self {
        let scene = Self {
            config,
            groups,
            toggle: ChaosToggle::default(),
            clock: FrameClock::default(),
            offset: Vec3::ZERO,
        };

        debug!(
            instances = scene.groups.iter().map(|group| group.len()).sum::<usize>(),
            "Built scene"
        );
        scene
    }

    /// Flip between the tree and chaos, returning the new state.
    pub fn toggle_chaos(&mut self) -> bool {
        let chaos = self.toggle.toggle();
        info!(chaos, "Toggled chaos");
        chaos
    }

    /// Request chaos or the formed tree.
    pub fn set_chaos(&mut self, chaos: bool) {
        self.toggle.set(chaos);
    }

    /// Is chaos currently requested?
    pub fn is_chaos(&self) -> bool {
        self.toggle.is_chaos()
    }

    /// Advance every group to the given clock and rewrite all the buffers.
    pub fn update(&mut self, clock: FrameClock) {
        self.clock = clock;
        self.offset = self.config.float.offset_at(clock.elapsed);

        for group in &mut self.groups {
            group.update(clock, &self.toggle);
        }

        trace!(elapsed = clock.elapsed, delta = clock.delta, "Updated scene");
    }

    /// Advance the clock by `delta` seconds and update.
    pub fn advance(&mut self, delta: f32) {
        self.update(self.clock.advance(delta));
    }

    /// Borrow everything the renderer needs for this frame.
    pub fn frame(&self) -> SceneFrame<'_> {
        SceneFrame {
            clock: self.clock,
            offset: self.offset,
            groups: self.groups.iter().map(|group| group.frame()).collect(),
            glow: self.groups.iter().find_map(|group| group.glow()),
        }
    }

    /// Clear the update flags on every buffer, once the renderer has uploaded them.
    pub fn clear_update_flags(&mut self) {
        for group in &mut self.groups {
            group.buffer_mut().take_needs_update();
        }
    }

    /// Get the group of the given kind.
    pub fn group(&self, kind: GroupKind) -> Option<&dyn ParticleGroup> {
        self.groups
            .iter()
            .find(|group| group.kind() == kind)
            .map(|group| group.as_ref())
    }

    /// Get the group of the given kind mutably, for the renderer to clear its update flags.
    pub fn group_mut(&mut self, kind: GroupKind) -> Option<&mut (dyn ParticleGroup + 'static)> {
        self.groups
            .iter_mut()
            .find(|group| group.kind() == kind)
            .map(|group| group.as_mut())
    }

    /// All the groups, in [`GroupKind`] order.
    pub fn groups(&self) -> impl Iterator<Item = &dyn ParticleGroup> {
        self.groups.iter().map(|group| group.as_ref())
    }

    /// Build fresh datasets for every group. Transitions, buffers, and the clock are kept.
    #[instrument(skip_all)]
    pub fn rebuild(&mut self, rng: &mut dyn RngCore) {
        for group in &mut self.groups {
            group.rebuild(rng);
        }
    }

    /// The clock as of the last update.
    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    /// The config the scene was built from.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }
}
