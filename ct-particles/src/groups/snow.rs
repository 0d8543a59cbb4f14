//! This module contains the [`Snow`] group, which falls forever around the tree and ignores chaos
//! entirely.

use super::prelude::*;
use crate::dataset::{build_snow, snow_spread};
use rand::{rngs::StdRng, SeedableRng};

/// The config for the [`Snow`] group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnowConfig {
    /// The number of flakes.
    pub count: usize,

    /// The width of the square that flakes fall in, centred on the tree.
    pub spread: f32,

    /// The range of heights that flakes start at.
    pub initial_height: Range<f32>,

    /// The range of falling speeds, in units per second.
    pub speed: Range<f32>,

    /// The range of sideways sway speeds, in units per second.
    pub drift: Range<f32>,

    /// Flakes that fall below this height go back to the top.
    pub floor: f32,

    /// The height that flakes go back to.
    pub ceiling: f32,

    /// The size of every flake.
    pub size: f32,
}

impl SnowConfig {
    /// The height that flakes go back to, which is never below the floor.
    pub fn reset_height(&self) -> f32 {
        self.ceiling.max(self.floor)
    }
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 1200,
            spread: 40.,
            initial_height: 0.0..30.0,
            speed: 1.2..4.2,
            drift: 0.0..1.2,
            floor: -10.,
            ceiling: 25.,
            size: 0.08,
        }
    }
}

/// Move a flake forward by `delta` seconds at time `elapsed`, sending it back to the top if it
/// falls through the floor.
///
/// Returns true if the flake was sent back to the top.
pub fn fall<R: Rng + ?Sized>(
    flake: &mut Snowflake,
    elapsed: f32,
    delta: f32,
    config: &SnowConfig,
    rng: &mut R,
) -> bool {
    let sway = elapsed + flake.phase;
    flake.position += Vec3::new(
        sway.sin() * flake.drift,
        -flake.speed,
        sway.cos() * flake.drift,
    ) * delta;

    if flake.position.y < config.floor {
        let (x, z) = snow_spread(config, rng);
        flake.position = Vec3::new(x, config.reset_height(), z);
        true
    } else {
        false
    }
}

/// The falling snow.
#[derive(Clone, Debug)]
pub struct Snow {
    /// The config this group was built from.
    config: SnowConfig,

    /// The flakes, which move every frame.
    flakes: Vec<Snowflake>,

    /// Where flakes that hit the floor get their new positions from.
    rng: StdRng,

    /// The buffer the flakes are written into.
    buffer: InstanceBuffer,
}

impl Sealed for Snow {}

impl Snow {
    /// Build the snow with a buffer of exactly the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: SnowConfig, rng: &mut R) -> Self {
        let flakes = build_snow(&config, rng);
        Self {
            buffer: InstanceBuffer::new(flakes.len()),
            rng: StdRng::seed_from_u64(rng.gen()),
            config,
            flakes,
        }
    }

    /// Build the snow into a buffer supplied by the renderer, which must have one slot per flake.
    #[instrument(skip_all)]
    pub fn with_buffer<R: Rng + ?Sized>(
        config: SnowConfig,
        buffer: InstanceBuffer,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let flakes = build_snow(&config, rng);
        check_buffer(GroupKind::Snow.name(), flakes.len(), &buffer, false)?;

        Ok(Self {
            rng: StdRng::seed_from_u64(rng.gen()),
            config,
            flakes,
            buffer,
        })
    }

    /// The flakes as they are right now.
    pub fn flakes(&self) -> &[Snowflake] {
        &self.flakes
    }
}

impl ParticleGroup for Snow {
    fn kind(&self) -> GroupKind {
        GroupKind::Snow
    }

    /// Snow doesn't care about chaos, so the toggle is ignored.
    fn update(&mut self, clock: FrameClock, _toggle: &ChaosToggle) {
        let delta = if clock.delta.is_finite() && clock.delta > 0. {
            clock.delta
        } else {
            0.
        };

        let mut resets = 0;
        for (index, flake) in self.flakes.iter_mut().enumerate() {
            if fall(flake, clock.elapsed, delta, &self.config, &mut self.rng) {
                resets += 1;
            }

            let pose = Pose {
                scale: self.config.size,
                ..Pose::at(flake.position)
            };
            self.buffer.set_pose_at(index, &pose);
        }

        trace!(resets, "Updated snow");
    }

    fn rebuild(&mut self, rng: &mut dyn RngCore) {
        self.flakes = build_snow(&self.config, rng);
        self.rng = StdRng::seed_from_u64(rng.next_u64());
    }

    fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut InstanceBuffer {
        &mut self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flake_falls_test() {
        let config = SnowConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut flake = Snowflake {
            position: Vec3::new(1., 10., -2.),
            speed: 2.,
            drift: 0.5,
            phase: 0.,
        };

        assert!(!fall(&mut flake, 0., 0.5, &config, &mut rng));
        assert!(flake.position.abs_diff_eq(Vec3::new(1., 9., -1.75), 1e-6));

        // No time, no movement
        let before = flake;
        assert!(!fall(&mut flake, 3., 0., &config, &mut rng));
        assert_eq!(flake, before);
    }

    #[test]
    fn flake_resets_below_floor_test() {
        let config = SnowConfig::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut flake = Snowflake {
            position: Vec3::new(0., -9.9, 0.),
            speed: 1.,
            drift: 0.,
            phase: 0.,
        };

        assert!(fall(&mut flake, 0., 0.2, &config, &mut rng));
        assert_eq!(flake.position.y, config.ceiling);
        assert!(flake.position.x.abs() <= 20. && flake.position.z.abs() <= 20.);
    }

    #[test]
    fn snow_never_stays_below_floor_test() {
        let config = SnowConfig {
            count: 300,
            ..SnowConfig::default()
        };
        let mut snow = Snow::new(config.clone(), &mut StdRng::seed_from_u64(3));
        assert!(snow.transition().is_none());
        assert!(!snow.frame().floats);

        // Big steps so that lots of flakes hit the floor
        let toggle = ChaosToggle::new(true);
        let mut clock = FrameClock::default();
        for _ in 0..200 {
            clock = clock.advance(0.25);
            snow.update(clock, &toggle);

            for (index, flake) in snow.flakes().iter().enumerate() {
                assert!(flake.position.y >= config.floor);
                assert!(flake.position.y <= config.initial_height.end);

                let position = snow.buffer().position_at(index).expect("Every flake has a slot");
                assert!(position.abs_diff_eq(flake.position, 1e-4));
            }
        }
    }

    #[test]
    fn inverted_ceiling_test() {
        let config = SnowConfig {
            count: 5,
            floor: -10.,
            ceiling: -20.,
            ..SnowConfig::default()
        };
        assert_eq!(config.reset_height(), -10.);

        let mut snow = Snow::new(config.clone(), &mut StdRng::seed_from_u64(5));
        let toggle = ChaosToggle::default();
        let mut clock = FrameClock::default();
        for _ in 0..2000 {
            clock = clock.advance(0.1);
            snow.update(clock, &toggle);
            assert!(snow.flakes().iter().all(|flake| flake.position.y >= config.floor));
        }
    }

    #[test]
    fn bad_delta_test() {
        let mut snow = Snow::new(
            SnowConfig {
                count: 10,
                ..SnowConfig::default()
            },
            &mut StdRng::seed_from_u64(4),
        );
        let before = snow.flakes().to_vec();

        for delta in [0., -1., f32::NAN, f32::INFINITY] {
            snow.update(FrameClock::new(1., delta), &ChaosToggle::default());
        }

        assert_eq!(snow.flakes(), before.as_slice());
    }
}
