//! This module contains the [`Ribbon`] group, a golden spiral of little tetrahedra that winds
//! around the outside of the tree and slowly turns.

use super::prelude::*;
use crate::dataset::build_ribbon;

/// The config for the [`Ribbon`] group.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RibbonConfig {
    /// The number of segments.
    pub count: usize,

    /// The spiral the segments sit on.
    pub helix: Helix,

    /// The shape of the tree that the spiral winds around.
    pub silhouette: Silhouette,

    /// The sphere that segments scatter into.
    pub dispersal: Dispersal,

    /// The range of segment sizes.
    pub scale: Range<f32>,

    /// The range of individual segment speeds.
    pub speed: Range<f32>,

    /// How far each segment drifts away from the spiral.
    pub drift: f32,

    /// How fast the whole spiral turns, in radians per second.
    pub spin: f32,

    /// How far each segment sways back and forth along the spiral, in radians.
    pub wobble: f32,

    /// How fast the sway goes.
    pub wobble_rate: f32,

    /// The throb of each segment.
    pub pulse: Pulse,

    /// The rate of the transition between the tree and chaos.
    pub transition_rate: f32,
}

impl Default for RibbonConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            helix: Helix::default(),
            silhouette: Silhouette::default(),
            dispersal: Dispersal::with_radius(18.),
            scale: 0.03..0.08,
            speed: 0.5..2.0,
            drift: 0.15,
            spin: 0.2,
            wobble: 0.1,
            wobble_rate: 0.5,
            pulse: Pulse::new(3., 0.3),
            transition_rate: 2.5,
        }
    }
}

/// Work out where the segment with the given index is at time `elapsed` with the blend factor
/// `factor`.
///
/// Unlike the other groups, the drift is added after blending, so segments keep drifting in full
/// chaos.
pub fn pose_at(
    segment: &RibbonSegment,
    index: usize,
    elapsed: f32,
    factor: f32,
    config: &RibbonConfig,
) -> Pose {
    let wobble = (elapsed * config.wobble_rate + segment.phase).sin() * config.wobble;
    let spin = elapsed * config.spin + wobble;
    let spiral = segment.anchor.position(spin);

    let t = elapsed * segment.speed + segment.phase;
    let drift = Vec3::new(t.sin(), t.cos(), t.cos()) * config.drift;

    Pose {
        position: spiral.lerp(segment.dispersed, factor) + drift,
        rotation: Vec3::new(elapsed * 2. + index as f32, elapsed * 1.5, segment.phase),
        scale: segment.scale * config.pulse.factor(elapsed, segment.phase),
    }
}

/// The ribbon spiralling around the tree.
#[derive(Clone, Debug)]
pub struct Ribbon {
    /// The config this group was built from.
    config: RibbonConfig,

    /// The segments of the ribbon, from bottom to top.
    segments: Vec<RibbonSegment>,

    /// The blend between the tree and chaos.
    transition: Transition,

    /// The buffer the segments are written into.
    buffer: InstanceBuffer,
}

impl Sealed for Ribbon {}

impl Ribbon {
    /// Build the ribbon with a buffer of exactly the right size.
    #[instrument(skip_all)]
    pub fn new<R: Rng + ?Sized>(config: RibbonConfig, rng: &mut R) -> Self {
        let segments = build_ribbon(&config, rng);
        Self {
            buffer: InstanceBuffer::new(segments.len()),
            transition: Transition::new(config.transition_rate),
            config,
            segments,
        }
    }

    /// Build the ribbon into a buffer supplied by the renderer, which must have one slot per
    /// segment.
    #[instrument(skip_all)]
    pub fn with_buffer<R: Rng + ?Sized>(
        config: RibbonConfig,
        buffer: InstanceBuffer,
        rng: &mut R,
    ) -> Result<Self, BuildError> {
        let segments = build_ribbon(&config, rng);
        check_buffer(GroupKind::Ribbon.name(), segments.len(), &buffer, false)?;

        Ok(Self {
            transition: Transition::new(config.transition_rate),
            config,
            segments,
            buffer,
        })
    }

    /// The segments of the ribbon.
    pub fn segments(&self) -> &[RibbonSegment] {
        &self.segments
    }
}

impl ParticleGroup for Ribbon {
    fn kind(&self) -> GroupKind {
        GroupKind::Ribbon
    }

    fn update(&mut self, clock: FrameClock, toggle: &ChaosToggle) {
        let factor = self.transition.step(toggle, clock.delta);
        trace!(factor, elapsed = clock.elapsed, "Updating ribbon");

        for (index, segment) in self.segments.iter().enumerate() {
            let pose = pose_at(segment, index, clock.elapsed, factor, &self.config);
            self.buffer.set_pose_at(index, &pose);
        }
    }

    fn rebuild(&mut self, rng: &mut dyn RngCore) {
        self.segments = build_ribbon(&self.config, rng);
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
