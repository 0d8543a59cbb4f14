//! This module handles all implementations of [`ParticleGroup`]s and their configs.
//!
//! Every group follows the same shape: a config with a `Default` that reproduces the standard
//! scene, a pure `pose_at` function that works out where one instance is at a given time and
//! blend factor, and a struct implementing [`ParticleGroup`] that runs `pose_at` over every
//! instance each frame.

#[cfg(doc)]
use crate::traits::ParticleGroup;

use serde::{Deserialize, Serialize};

/// A prelude to be imported by group implementations.
#[allow(unused_imports)]
pub(crate) mod prelude {
    pub(crate) use crate::{
        dataset::{ParticleInstance, RibbonSegment, Snowflake},
        error::{check_buffer, BuildError},
        groups::Pulse,
        sampler::{Dispersal, Helix, Silhouette},
        traits::{private::Sealed, ParticleGroup},
        transition::{ChaosToggle, Transition},
        GroupKind,
    };
    pub use ct_frame::{rgb_to_colour, FrameClock, Glow, InstanceBuffer, Pose, RGBArray};
    pub use glam::Vec3;
    pub use rand::{Rng, RngCore};
    pub use serde::{Deserialize, Serialize};
    pub use std::ops::Range;
    pub use tracing::{debug, instrument, trace};
}

mod foliage;
mod gifts;
mod ornaments;
mod ribbon;
mod snow;
mod star;

pub use self::{
    foliage::{Foliage, FoliageConfig},
    gifts::{Gifts, GiftsConfig},
    ornaments::{Ornaments, OrnamentsConfig},
    ribbon::{Ribbon, RibbonConfig},
    snow::{Snow, SnowConfig},
    star::{glow_colour, Hover, Star, StarConfig},
};

/// A multiplicative scale pulse: `base + sin(elapsed * rate + phase) * amplitude`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// The scale factor the pulse oscillates around.
    pub base: f32,

    /// The angular frequency of the pulse, in radians per second.
    pub rate: f32,

    /// How far the scale factor swings either side of `base`.
    pub amplitude: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self::none()
    }
}

impl Pulse {
    /// A pulse that doesn't pulse.
    pub const fn none() -> Self {
        Self {
            base: 1.,
            rate: 0.,
            amplitude: 0.,
        }
    }

    /// A pulse around 1 with the given rate and amplitude.
    pub const fn new(rate: f32, amplitude: f32) -> Self {
        Self {
            base: 1.,
            rate,
            amplitude,
        }
    }

    /// The scale factor at the given time for an instance with the given phase.
    pub fn factor(&self, elapsed: f32, phase: f32) -> f32 {
        self.base + (elapsed * self.rate + phase).sin() * self.amplitude
    }
}
