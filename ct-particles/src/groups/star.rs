//! This module contains the [`Star`] on top of the tree and the glow it gives off.

use super::prelude::*;

/// The config for the [`Star`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarConfig {
    /// Where the star sits on top of the formed tree.
    pub formed: Vec3,

    /// Where the star hangs in chaos.
    pub dispersed: Vec3,

    /// How fast the star turns about the vertical axis, in radians per second.
    pub spin: f32,

    /// The throb of the star.
    pub pulse: Pulse,

    /// The gentle bob and tilt of the star on top of everything else.
    pub hover: Hover,

    /// The three colours that the glow cycles through.
    pub palette: [RGBArray; 3],

    /// How many full colour cycles happen per second.
    pub cycle_speed: f32,

    /// The intensity of the glow light over time.
    pub glow_intensity: Pulse,

    /// How much the glow dims in full chaos, as a fraction of its intensity.
    pub chaos_dimming: f32,

    /// The intensity of the star's emissive material over time.
    pub emissive_intensity: Pulse,

    /// The rate of the transition between the tree and chaos.
    pub transition_rate: f32,
}

impl Default for StarConfig {
    fn default() -> Self {
        Self {
            formed: Vec3::new(0., 9.5, 0.),
            dispersed: Vec3::new(0., 5., 0.),
            spin: 0.8,
            pulse: Pulse::new(3., 0.05),
            hover: Hover::default(),
            palette: [[255, 215, 0], [255, 165, 0], [255, 250, 205]],
            cycle_speed: 0.2,
            glow_intensity: Pulse {
                base: 4.,
                rate: 2.,
                amplitude: 2.,
            },
            chaos_dimming: 0.5,
            emissive_intensity: Pulse {
                base: 2.,
                rate: 2.,
                amplitude: 1.5,
            },
            transition_rate: 2.,
        }
    }
}

/// A slow bob up and down with a slight wobble, on a cycle of `8π / speed` seconds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hover {
    /// How fast the hover cycles.
    pub speed: f32,

    /// How much the star tilts. A tilt of 1 swings up to 1/8 of a radian.
    pub tilt: f32,

    /// How far the star bobs. A bob of 1 moves up to 0.1 units either way.
    pub bob: f32,
}

impl Default for Hover {
    fn default() -> Self {
        Self {
            speed: 3.,
            tilt: 0.5,
            bob: 0.5,
        }
    }
}

impl Hover {
    /// The position and rotation offsets at time `elapsed`.
    pub fn offsets(&self, elapsed: f32) -> (Vec3, Vec3) {
        let t = elapsed * self.speed / 4.;
        let (sin, cos) = t.sin_cos();

        let position = Vec3::new(0., sin / 10. * self.bob, 0.);
        let rotation = Vec3::new(cos / 8., sin / 8., sin / 20.) * self.tilt;

        if position.is_finite() && rotation.is_finite() {
            (position, rotation)
        } else {
            (Vec3::ZERO, Vec3::ZERO)
        }
    }
}

/// The colour of the glow at time `elapsed`.
///
/// One cycle takes `1 / cycle_speed` seconds and is split into three equal thirds. In each third
/// the colour blends linearly from one palette entry to the next, wrapping back to the first.
pub fn glow_colour(palette: &[Vec3; 3], elapsed: f32, cycle_speed: f32) -> Vec3 {
    let cycle = (elapsed * cycle_speed).rem_euclid(1.);
    if !cycle.is_finite() {
        return palette[0];
    }

    let position = cycle * 3.;
    let third = (position.floor() as usize).min(2);
    let local = (position - third as f32).clamp(0., 1.);

    palette[third].lerp(palette[(third + 1) % 3], local)
}

/// Work out the pose of the star at time `elapsed` with the blend factor `factor`.
pub fn pose_at(elapsed: f32, factor: f32, config: &StarConfig) -> Pose {
    let (bob, tilt) = config.hover.offsets(elapsed);

    Pose {
        position: config.formed.lerp(config.dispersed, factor) + bob,
        rotation: Vec3::new(std::f32::consts::PI, elapsed * config.spin, 0.) + tilt,
        scale: config.pulse.factor(elapsed, 0.),
    }
}

/// Work out the glow of the star at time `elapsed` with the blend factor `factor`.
pub fn glow_at(elapsed: f32, factor: f32, config: &StarConfig) -> Glow {
    let palette = config.palette.map(rgb_to_colour);

    Glow {
        colour: glow_colour(&palette, elapsed, config.cycle_speed),
        intensity: config.glow_intensity.factor(elapsed, 0.)
            * (1. - factor * config.chaos_dimming),
        emissive_intensity: config.emissive_intensity.factor(elapsed, 0.),
    }
}

/// The star on top of the tree. It's a group of one, whose colour follows its glow.
#[derive(Clone, Debug)]
pub struct Star {
    /// The config of the star.
    config: StarConfig,

    /// The blend between the tree and chaos.
    transition: Transition,

    /// The glow as of the last update.
    glow: Glow,

    /// The buffer with the star's single slot.
    buffer: InstanceBuffer,
}

impl Sealed for Star {}

impl Star {
    /// Build the star with its own buffer.
    #[instrument(skip_all)]
    pub fn new(config: StarConfig) -> Self {
        Self::from_parts(config, InstanceBuffer::with_colours(1))
    }

    /// Build the star into a buffer supplied by the renderer, which must have exactly one slot
    /// and one colour.
    #[instrument(skip_all)]
    pub fn with_buffer(config: StarConfig, buffer: InstanceBuffer) -> Result<Self, BuildError> {
        check_buffer(GroupKind::Star.name(), 1, &buffer, true)?;
        Ok(Self::from_parts(config, buffer))
    }

    fn from_parts(config: StarConfig, mut buffer: InstanceBuffer) -> Self {
        let glow = glow_at(0., 0., &config);
        buffer.set_pose_at(0, &pose_at(0., 0., &config));
        buffer.set_colour_at(0, glow.colour);

        Self {
            transition: Transition::new(config.transition_rate),
            config,
            glow,
            buffer,
        }
    }
}

impl ParticleGroup for Star {
    fn kind(&self) -> GroupKind {
        GroupKind::Star
    }

    fn update(&mut self, clock: FrameClock, toggle: &ChaosToggle) {
        let factor = self.transition.step(toggle, clock.delta);

        self.glow = glow_at(clock.elapsed, factor, &self.config);
        self.buffer
            .set_pose_at(0, &pose_at(clock.elapsed, factor, &self.config));
        self.buffer.set_colour_at(0, self.glow.colour);

        trace!(factor, glow = ?self.glow, "Updated star");
    }

    /// The star has nothing random about it, so there's nothing to rebuild.
    fn rebuild(&mut self, _rng: &mut dyn RngCore) {}

    fn buffer(&self) -> &InstanceBuffer {
        &self.buffer
    }

    fn buffer_mut(&mut self) -> &mut InstanceBuffer {
        &mut self.buffer
    }

    fn transition(&self) -> Option<&Transition> {
        Some(&self.transition)
    }

    fn glow(&self) -> Option<Glow> {
        Some(self.glow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use std::f32::consts::PI;

    fn palette() -> [Vec3; 3] {
        StarConfig::default().palette.map(rgb_to_colour)
    }

    #[test]
    fn glow_colour_cycle_test() {
        let palette = palette();

        // Each third starts on its own colour
        assert!(glow_colour(&palette, 0., 0.2).abs_diff_eq(palette[0], 1e-6));
        assert!(glow_colour(&palette, 5. / 3., 0.2).abs_diff_eq(palette[1], 1e-5));
        assert!(glow_colour(&palette, 10. / 3., 0.2).abs_diff_eq(palette[2], 1e-5));

        // A full cycle takes 5 seconds
        assert!(glow_colour(&palette, 5., 0.2).abs_diff_eq(palette[0], 1e-5));
        assert!(glow_colour(&palette, 6.2, 0.2).abs_diff_eq(glow_colour(&palette, 1.2, 0.2), 1e-5));

        // Halfway through the first third
        let halfway = palette[0].lerp(palette[1], 0.5);
        assert!(glow_colour(&palette, 5. / 6., 0.2).abs_diff_eq(halfway, 1e-5));

        // Nonsense doesn't escape the palette
        assert_eq!(glow_colour(&palette, f32::NAN, 0.2), palette[0]);
        assert_eq!(glow_colour(&palette, 1., f32::INFINITY), palette[0]);
        assert!(glow_colour(&palette, -1., 0.2).is_finite());
    }

    #[test]
    fn glow_intensity_test() {
        let config = StarConfig::default();

        let formed = glow_at(PI / 4., 0., &config);
        assert!(approx_eq!(f32, formed.intensity, 6., epsilon = 1e-5));
        assert!(approx_eq!(f32, formed.emissive_intensity, 3.5, epsilon = 1e-5));

        let chaos = glow_at(PI / 4., 1., &config);
        assert!(approx_eq!(f32, chaos.intensity, 3., epsilon = 1e-5));
        assert_eq!(chaos.emissive_intensity, formed.emissive_intensity);
        assert_eq!(chaos.colour, formed.colour);
    }

    fn still_config() -> StarConfig {
        StarConfig {
            hover: Hover {
                tilt: 0.,
                bob: 0.,
                ..Hover::default()
            },
            ..StarConfig::default()
        }
    }

    #[test]
    fn hover_test() {
        let hover = Hover::default();

        let (position, rotation) = hover.offsets(0.);
        assert_eq!(position, Vec3::ZERO);
        assert!(rotation.abs_diff_eq(Vec3::new(0.0625, 0., 0.), 1e-6));

        // A quarter of the way round the cycle, the star is at the top of its bob
        let (position, rotation) = hover.offsets(2. * PI / 3.);
        assert!(approx_eq!(f32, position.y, 0.05, epsilon = 1e-5));
        assert!(rotation.abs_diff_eq(Vec3::new(0., 0.0625, 0.025), 1e-5));

        for elapsed in [0.3, 7., 123.] {
            let (position, rotation) = hover.offsets(elapsed);
            assert!(position.y.abs() <= 0.05 + 1e-6);
            assert!(rotation.x.abs() <= 0.0625 + 1e-6 && rotation.y.abs() <= 0.0625 + 1e-6);
        }

        assert_eq!(hover.offsets(f32::NAN), (Vec3::ZERO, Vec3::ZERO));

        // The whole pose carries the hover
        let config = StarConfig::default();
        let pose = pose_at(2. * PI / 3., 0., &config);
        assert!(approx_eq!(f32, pose.position.y, 9.55, epsilon = 1e-5));
    }

    #[test]
    fn star_pose_test() {
        let config = still_config();

        let formed = pose_at(1., 0., &config);
        assert_eq!(formed.position, Vec3::new(0., 9.5, 0.));
        assert_eq!(formed.rotation, Vec3::new(PI, 0.8, 0.));

        let chaos = pose_at(1., 1., &config);
        assert_eq!(chaos.position, Vec3::new(0., 5., 0.));

        for elapsed in [0., 0.5, 10.] {
            let scale = pose_at(elapsed, 0., &config).scale;
            assert!((0.95 - 1e-6..=1.05 + 1e-6).contains(&scale));
        }
    }

    #[test]
    fn star_group_test() {
        let mut star = Star::new(still_config());
        assert_eq!(star.len(), 1);
        assert!(star.glow().is_some());

        let toggle = ChaosToggle::new(true);
        let mut clock = FrameClock::default();
        for _ in 0..600 {
            clock = clock.advance(1. / 60.);
            star.update(clock, &toggle);
        }

        // After ten seconds at rate 2 the star has all but arrived
        let position = star.buffer().position_at(0).expect("The star has one slot");
        assert!(position.abs_diff_eq(Vec3::new(0., 5., 0.), 1e-3));

        let glow = star.glow().expect("The star always glows");
        assert_eq!(star.buffer().colours().map(|c| c[0]), Some(glow.colour));

        assert!(Star::with_buffer(StarConfig::default(), InstanceBuffer::new(1)).is_err());
        assert!(Star::with_buffer(StarConfig::default(), InstanceBuffer::with_colours(2)).is_err());
        assert!(Star::with_buffer(StarConfig::default(), InstanceBuffer::with_colours(1)).is_ok());
    }
}
