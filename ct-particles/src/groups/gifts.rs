//! This module contains the [`Gifts`] group.

use super::prelude::*;
use crate::dataset::build_gifts;

/// The config for the [`Gifts`] group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GiftsConfig {
    /// The number of gifts.
    pub count: usize,

    /// The range of heights that gifts sit at, before the vertical offset.
    pub height: Range<f32>,

    /// The surface the gifts sit on.
    pub silhouette: Silhouette,

    /// How far the whole tree is shifted down.
    pub vertical_offset: f32,

    /// The sphere that gifts scatter into.
    pub dispersal: Dispersal,

    /// The range of gift sizes.
    pub scale: Range<f32>,

    /// How fast gifts turn about each axis, in radians per second.
    pub spin: Vec3,

    /// How much extra every gift spins per second in full chaos.
    pub chaos_spin: f32,

    /// The gentle throb of each gift.
    pub pulse: Pulse,

    /// The rate of the transition between the tree and chaos.
    pub transition_rate: f32,
}

impl Default for GiftsConfig {
    fn default() -> Self {
        Self {
            count: 200,
            height: -6.0..9.0,
            silhouette: Silhouette::decoration(4., 4.4, 0.4),
            vertical_offset: 1.2,
            dispersal: Dispersal::with_radius(15.),
            scale: 0.12..0.3,
            spin: Vec3::new(0.1, 0.2, 0.),
            chaos_spin: 0.,
            pulse: Pulse {
                base: 0.95,
                rate: 1.,
                amplitude: 0.05,
            },
            transition_rate: 3.,
        }
    }
}

/// Work out where a gift is at time `elapsed` with the blend factor `factor`.
pub fn pose_at(
    instance: &ParticleInstance,
    elapsed: f32,
    factor: f32,
    config: &GiftsConfig,
) -> Pose {
    let chaos_spin = factor * elapsed * config.chaos_spin;
    let spin = config.spin * elapsed + Vec3::new(chaos_spin, chaos_spin, 0.);

    Pose {
        position: instance.blended_position(factor),
        rotation: instance.rotation + spin,
        scale: instance.scale * config.pulse.factor(elapsed, instance.phase),
    }
}

/// Small golden boxes tucked into the tree.
#[derive(Clone, Debug)]
pub struct Gifts {
    /// The config this group was built from.
    config: GiftsConfig,

    /// The gifts themselves.
    instances: Vec<ParticleInstance>,

    /// The blend between the tree and chaos.
    transition: Transition,

    /// The buffer the gifts are written into.
    buffer: InstanceBuffer,
}

impl Sealed for Gifts {}

impl Gifts {
    /// Build the gifts with a buffer of exactly the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: GiftsConfig, rng: &mut R) -> Self {
        let instances = build_gifts(&config, rng);
        Self {
            buffer: InstanceBuffer::new(instances.len()),
            transition: Transition::new(config.transition_rate),
            config,
            instances,
        }
    }

    /// Build the gifts into a buffer supplied by the renderer, which must have one slot per
    /// gift. Gifts are all the same colour, so the buffer doesn't need colours.
    #[instrument(skip_all)]
    pub fn with_buffer<R: Rng + ?Sized>(
        config: GiftsConfig,
        buffer: InstanceBuffer,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let instances = build_gifts(&config, rng);
        check_buffer(GroupKind::Gifts.name(), instances.len(), &buffer, false)?;

        Ok(Self {
            transition: Transition::new(config.transition_rate),
            config,
            instances,
            buffer,
        })
    }

    /// The gifts.
    pub fn instances(&self) -> &[ParticleInstance] {
        &self.instances
    }
}

impl ParticleGroup for Gifts {
    fn kind(&self) -> GroupKind {
        GroupKind::Gifts
    }

    fn update(&mut self, clock: FrameClock, toggle: &ChaosToggle) {
        let factor = self.transition.step(toggle, clock.delta);

        for (index, instance) in self.instances.iter().enumerate() {
            let pose = pose_at(instance, clock.elapsed, factor, &self.config);
            self.buffer.set_pose_at(index, &pose);
        }
    }

    fn rebuild(&mut self, rng: &mut dyn RngCore) {
        self.instances = build_gifts(&self.config, rng);
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
    fn gift_pose_test() {
        let config = GiftsConfig::default();
        let gifts = Gifts::new(
            GiftsConfig {
                count: 10,
                ..config.clone()
            },
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(gifts.len(), 10);

        for instance in gifts.instances() {
            let start = pose_at(instance, 0., 0., &config);
            let later = pose_at(instance, 10., 0., &config);

            assert_eq!(start.position, instance.formed);
            assert_eq!(start.rotation, instance.rotation);
            assert!((later.rotation - instance.rotation).abs_diff_eq(Vec3::new(1., 2., 0.), 1e-5));

            for elapsed in [0., 0.3, 4., 17.] {
                let scale = pose_at(instance, elapsed, 0.5, &config).scale;
                assert!(scale >= instance.scale * 0.9 - 1e-6);
                assert!(scale <= instance.scale + 1e-6);
            }
        }
    }

    #[test]
    fn colourless_buffer_test() {
        let mut rng = StdRng::seed_from_u64(2);
        let config = GiftsConfig {
            count: 3,
            ..GiftsConfig::default()
        };

        let gifts = Gifts::with_buffer(config.clone(), InstanceBuffer::new(3), &mut rng);
        assert!(gifts.is_ok());

        let gifts = Gifts::with_buffer(config, InstanceBuffer::new(300), &mut rng);
        assert!(matches!(
            gifts,
            Err(BuildError::BufferSizeMismatch {
                instances: 3,
                slots: 300,
                ..
            })
        ));
    }
}
