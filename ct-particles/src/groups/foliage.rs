//! This module contains the [`Foliage`] group, the thousands of little leaves that make up the
//! body of the tree.

use super::prelude::*;
use crate::dataset::build_foliage;

/// The config for the [`Foliage`] group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoliageConfig {
    /// The number of leaves.
    pub count: usize,

    /// The range of heights that leaves are placed at, before the vertical offset.
    pub height: Range<f32>,

    /// The shape of the tree.
    pub silhouette: Silhouette,

    /// How far the whole tree is shifted down.
    pub vertical_offset: f32,

    /// The sphere that leaves scatter into.
    pub dispersal: Dispersal,

    /// The colour of the leaves at the bottom of the height range.
    pub colour_bottom: RGBArray,

    /// The colour of the leaves at the top of the height range.
    pub colour_top: RGBArray,

    /// The range of leaf sizes.
    pub scale: Range<f32>,

    /// The range of individual leaf speeds.
    pub speed: Range<f32>,

    /// The largest horizontal drift of a leaf away from its base position. Vertical drift is 60%
    /// of this.
    pub drift: f32,

    /// How much each leaf spins per second, per unit of its speed.
    pub spin: f32,

    /// How much extra every leaf spins per second in full chaos.
    pub chaos_spin: f32,

    /// The rate of the transition between the tree and chaos.
    pub transition_rate: f32,
}

impl Default for FoliageConfig {
    fn default() -> Self {
        Self {
            count: 4500,
            height: -8.0..10.0,
            silhouette: Silhouette::default(),
            vertical_offset: 1.2,
            dispersal: Dispersal::with_radius(15.),
            colour_bottom: [255, 20, 147],
            colour_top: [255, 183, 197],
            scale: 0.05..0.17,
            speed: 0.04..0.12,
            drift: 0.05,
            spin: 0.2,
            chaos_spin: 0.5,
            transition_rate: 3.,
        }
    }
}

/// Work out where a leaf is at time `elapsed` with the blend factor `factor`.
pub fn pose_at(
    instance: &ParticleInstance,
    elapsed: f32,
    factor: f32,
    config: &FoliageConfig,
) -> Pose {
    let t = elapsed * instance.speed;
    let drift = Vec3::new(
        (t + instance.phase).sin() * config.drift,
        (t * 0.5 + instance.phase).cos() * config.drift * 0.6,
        (t + instance.phase).cos() * config.drift,
    );

    let spin = t * config.spin + factor * elapsed * config.chaos_spin;

    Pose {
        position: instance.blended_position(factor) + drift,
        rotation: instance.rotation + Vec3::new(spin, spin, 0.),
        scale: instance.scale,
    }
}

/// The leaves of the tree, shading from deep pink at the bottom to pale pink at the top.
#[derive(Clone, Debug)]
pub struct Foliage {
    /// The config this group was built from.
    config: FoliageConfig,

    /// The leaves themselves.
    instances: Vec<ParticleInstance>,

    /// The blend between the tree and chaos.
    transition: Transition,

    /// The buffer the leaves are written into.
    buffer: InstanceBuffer,
}

impl Sealed for Foliage {}

impl Foliage {
    /// Build the foliage with a buffer of exactly the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: FoliageConfig, rng: &mut R) -> Self {
        let instances = build_foliage(&config, rng);
        let buffer = InstanceBuffer::with_colours(instances.len());
        Self::from_parts(config, instances, buffer)
    }

    /// Build the foliage into a buffer supplied by the renderer.
    ///
    /// The buffer must have one slot and one colour per leaf.
    #[instrument(skip_all)]
    pub fn with_buffer<R: Rng + ?Sized>(
        config: FoliageConfig,
        buffer: InstanceBuffer,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let instances = build_foliage(&config, rng);
        check_buffer(GroupKind::Foliage.name(), instances.len(), &buffer, true)?;
        Ok(Self::from_parts(config, instances, buffer))
    }

    /// Put the group together and write the static colours.
    fn from_parts(
        config: FoliageConfig,
        instances: Vec<ParticleInstance>,
        buffer: InstanceBuffer,
    ) -> Self {
        let mut foliage = Self {
            transition: Transition::new(config.transition_rate),
            config,
            instances,
            buffer,
        };
        foliage.write_colours();
        foliage
    }

    /// Write every leaf's colour into the buffer.
    fn write_colours(&mut self) {
        for (index, instance) in self.instances.iter().enumerate() {
            self.buffer.set_colour_at(index, instance.colour);
        }
    }

    /// The leaves.
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }

    /// The config this group was built from.
    pub fn config(&self) -> &FoliageConfig {
        &self.config
    }
}

impl ParticleGroup for Foliage {
    fn kind(&self) -> GroupKind {
        GroupKind::Foliage
    }

    fn update(&mut self, clock: FrameClock, toggle: &ChaosToggle) {
        let factor = self.transition.step(toggle, clock.delta);
        trace!(factor, elapsed = clock.elapsed, "Updating foliage");

        for (index, instance) in self.instances.iter().enumerate() {
            let pose = pose_at(instance, clock.elapsed, factor, &self.config);
            self.buffer.set_pose_at(index, &pose);
        }
    }

    fn rebuild(&mut self, rng: &mut dyn RngCore) {
        self.instances = build_foliage(&self.config, rng);
        self.write_colours();
    }

    fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut InstanceBuffer {
        &mut self.buffer
    }

    fn transition(&self) -> Option<&Transition> {
        Some(&self.transition)
    }
}
