//! This crate provides the data that gets handed to a renderer every frame: instance buffers,
//! poses, and the frame that bundles them together.

use glam::Vec3;
use serde::{Deserialize, Serialize};

mod buffer;
mod frame;
mod pose;

pub use self::{
    buffer::InstanceBuffer,
    frame::{GroupFrame, SceneFrame},
    pose::Pose,
};

/// An RGB colour, as written in config files.
pub type RGBArray = [u8; 3];

/// Convert an [`RGBArray`] into a linear colour with each component in [0, 1].
pub fn rgb_to_colour([r, g, b]: RGBArray) -> Vec3 {
    Vec3::new(r as f32, g as f32, b as f32) / 255.
}

/// Convert a colour with components in [0, 1] back to an [`RGBArray`], clamping each component.
pub fn colour_to_rgb(colour: Vec3) -> RGBArray {
    let [r, g, b] = (colour.clamp(Vec3::ZERO, Vec3::ONE) * 255.).round().to_array();
    [r as u8, g as u8, b as u8]
}

/// The timing information for a single frame, as supplied by the renderer's frame clock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    /// Seconds since the scene started.
    pub elapsed: f32,

    /// Seconds since the previous frame.
    pub delta: f32,
}

impl FrameClock {
    /// Create a new clock reading.
    pub fn new(elapsed: f32, delta: f32) -> Self {
        Self { elapsed, delta }
    }

    /// Advance the clock by `delta` seconds and return the new reading.
    pub fn advance(self, delta: f32) -> Self {
        Self {
            elapsed: self.elapsed + delta,
            delta,
        }
    }
}

/// A point light attached to the scene, like the glow around the star.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Glow {
    /// The colour of the light, with components in [0, 1].
    pub colour: Vec3,

    /// The intensity of the light itself.
    pub intensity: f32,

    /// The intensity of the emissive material lit by the glow.
    pub emissive_intensity: f32,
}
