//! This module contains the [`Ornaments`] group.

use super::prelude::*;
use crate::dataset::build_ornaments;

/// The config for the [`Ornaments`] group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrnamentsConfig {
    /// The number of ornaments.
    pub count: usize,

    /// The range of heights that ornaments hang at, before the vertical offset.
    pub height: Range<f32>,

    /// The surface the ornaments hang on.
    pub silhouette: Silhouette,

    /// How far the whole tree is shifted down.
    pub vertical_offset: f32,

    /// The sphere that ornaments scatter into.
    pub dispersal: Dispersal,

    /// The colours to pick from. Each ornament gets one at random.
    pub palette: Vec<RGBArray>,

    /// The range of ornament sizes.
    pub scale: Range<f32>,

    /// The gentle throb of each ornament.
    pub pulse: Pulse,

    /// The rate of the transition between the tree and chaos.
    pub transition_rate: f32,
}

impl Default for OrnamentsConfig {
    fn default() -> Self {
        Self {
            count: 350,
            height: -7.0..9.0,
            silhouette: Silhouette::decoration(4.1, 4.5, 0.3),
            vertical_offset: 1.2,
            dispersal: Dispersal::with_radius(15.),
            palette: vec![[255, 255, 255], [160, 32, 240], [230, 230, 250]],
            scale: 0.1..0.2,
            pulse: Pulse::new(2., 0.1),
            transition_rate: 3.,
        }
    }
}

/// Work out where an ornament is at time `elapsed` with the blend factor `factor`.
///
/// Ornaments don't drift or turn. They just move between the tree and chaos and throb.
pub fn pose_at(instance: &ParticleInstance, elapsed: f32, factor: f32, pulse: &Pulse) -> Pose {
    Pose {
        position: instance.blended_position(factor),
        rotation: Vec3::ZERO,
        scale: instance.scale * pulse.factor(elapsed, instance.phase),
    }
}

/// Shiny baubles hanging on the outside of the foliage.
#[derive(Clone, Debug)]
pub struct Ornaments {
    /// The config this group was built from.
    config: OrnamentsConfig,

    /// The ornaments themselves.
    instances: Vec<ParticleInstance>,

    /// The blend between the tree and chaos.
    transition: Transition,

    /// The buffer the ornaments are written into.
    buffer: InstanceBuffer,
}

impl Sealed for Ornaments {}

impl Ornaments {
    /// Build the ornaments with a buffer of exactly the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: OrnamentsConfig, rng: &mut R) -> Self {
        let instances = build_ornaments(&config, rng);
        let buffer = InstanceBuffer::with_colours(instances.len());
        Self::from_parts(config, instances, buffer)
    }

    /// Build the ornaments into a buffer supplied by the renderer, which must have one slot and
    /// one colour per ornament.
    #[instrument(skip_all)]
    pub fn with_buffer<R: Rng + ?Sized>(
        config: OrnamentsConfig,
        buffer: InstanceBuffer,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let instances = build_ornaments(&config, rng);
        check_buffer(GroupKind::Ornaments.name(), instances.len(), &buffer, true)?;
        Ok(Self::from_parts(config, instances, buffer))
    }

    fn from_parts(
        config: OrnamentsConfig,
        instances: Vec<ParticleInstance>,
        buffer: InstanceBuffer,
    ) -> Self {
        let mut ornaments = Self {
            transition: Transition::new(config.transition_rate),
            config,
            instances,
            buffer,
        };
        ornaments.write_colours();
        ornaments
    }

    fn write_colours(&mut self) {
        for (index, instance) in self.instances.iter().enumerate() {
            self.buffer.set_colour_at(index, instance.colour);
        }
    }

    /// The ornaments.
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }
}

impl ParticleGroup for Ornaments {
    fn kind(&self) -> GroupKind {
        GroupKind::Ornaments
    }

    fn update(&mut self, clock: FrameClock, toggle: &ChaosToggle) {
        let factor = self.transition.step(toggle, clock.delta);

        for (index, instance) in self.instances.iter().enumerate() {
            let pose = pose_at(instance, clock.elapsed, factor, &self.config.pulse);
            self.buffer.set_pose_at(index, &pose);
        }
    }

    fn rebuild(&mut self, rng: &mut dyn RngCore) {
        self.instances = build_ornaments(&self.config, rng);
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn ornament_pose_test() {
        let config = OrnamentsConfig {
            count: 10,
            ..OrnamentsConfig::default()
        };
        let ornaments = Ornaments::new(config.clone(), &mut StdRng::seed_from_u64(1));

        for instance in ornaments.instances() {
            for elapsed in [0., 1., 7.5] {
                let formed = pose_at(instance, elapsed, 0., &config.pulse);
                assert_eq!(formed.position, instance.formed);

                let chaos = pose_at(instance, elapsed, 1., &config.pulse);
                assert!(chaos.position.abs_diff_eq(instance.dispersed, 1e-5));

                // The pulse doesn't care about the blend factor
                assert_eq!(formed.scale, chaos.scale);
                assert!(formed.scale >= instance.scale * 0.9 - 1e-6);
                assert!(formed.scale <= instance.scale * 1.1 + 1e-6);
            }
        }
    }

    #[test]
    fn halfway_test() {
        let mut ornaments = Ornaments::new(
            OrnamentsConfig {
                count: 4,
                ..OrnamentsConfig::default()
            },
            &mut StdRng::seed_from_u64(2),
        );
        let toggle = ChaosToggle::new(true);

        // Step the transition until it's about halfway, then check the buffer agrees
        let mut clock = FrameClock::default();
        while ornaments.transition().map_or(1., Transition::factor) < 0.5 {
            clock = clock.advance(1. / 60.);
            ornaments.update(clock, &toggle);
        }

        let factor = ornaments.transition().map_or(0., Transition::factor);
        for (index, instance) in ornaments.instances().iter().enumerate() {
            let expected = instance.formed.lerp(instance.dispersed, factor);
            let actual = ornaments
                .buffer()
                .position_at(index)
                .expect("Every ornament should have a slot");
            assert!(actual.abs_diff_eq(expected, 1e-4));
        }
    }
}
