//! This module handles the frame that gets handed to a driver once per rendered frame.

use crate::{FrameClock, Glow, InstanceBuffer};
use glam::Vec3;
use std::fmt;

/// One group's buffer, as seen by the renderer.
#[derive(Clone, Copy)]
pub struct GroupFrame<'a> {
    /// The name of the group, for logging and for drivers to pick a mesh.
    pub name: &'static str,

    /// The freshly written buffer for this group.
    pub buffer: &'a InstanceBuffer,

    /// Whether this group moves with the scene's floating offset.
    pub floats: bool,
}

impl fmt::Debug for GroupFrame<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The buffers hold thousands of matrices, so we only show their sizes
        f.debug_struct("GroupFrame")
            .field("name", &self.name)
            .field("instances", &self.buffer.len())
            .field("has_colours", &self.buffer.has_colours())
            .field("floats", &self.floats)
            .finish()
    }
}

/// Everything the renderer needs to draw one frame.
#[derive(Clone, Debug)]
pub struct SceneFrame<'a> {
    /// The clock reading this frame was computed for.
    pub clock: FrameClock,

    /// The offset applied to every group that [`floats`](GroupFrame::floats).
    pub offset: Vec3,

    /// The groups in draw order.
    pub groups: Vec<GroupFrame<'a>>,

    /// The glow light attached to the scene, if there is one.
    pub glow: Option<Glow>,
}

impl SceneFrame<'_> {
    /// The total number of instances across every group.
    pub fn instance_count(&self) -> usize {
        self.groups.iter().map(|group| group.buffer.len()).sum()
    }

    /// Find a group by name.
    pub fn group(&self, name: &str) -> Option<&GroupFrame<'_>> {
        self.groups.iter().find(|group| group.name == name)
    }
}
