//! This module handles the pre-allocated buffers that instanced meshes are drawn from.

use crate::Pose;
use glam::{Mat4, Vec3};
use tracing::trace;

/// A fixed-size buffer of per-instance transforms, with an optional per-instance colour buffer.
///
/// The buffer never grows or shrinks after it's created. Writing a slot marks the matching half
/// of the buffer as needing an upload, and the renderer clears those flags with
/// [`take_needs_update`](Self::take_needs_update) once it has consumed the data.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceBuffer {
    /// One transform per instance.
    transforms: Box<[Mat4]>,

    /// One colour per instance, if this mesh uses instance colours.
    colours: Option<Box<[Vec3]>>,

    /// Whether the transforms have been written since the renderer last looked.
    transforms_need_update: bool,

    /// Whether the colours have been written since the renderer last looked.
    colours_need_update: bool,
}

impl InstanceBuffer {
    /// Create a buffer of `len` identity transforms and no colours.
    pub fn new(len: usize) -> Self {
        Self {
            transforms: vec![Mat4::IDENTITY; len].into_boxed_slice(),
            colours: None,
            transforms_need_update: false,
            colours_need_update: false,
        }
    }

    /// Create a buffer of `len` identity transforms and `len` white colours.
    pub fn with_colours(len: usize) -> Self {
        Self {
            colours: Some(vec![Vec3::ONE; len].into_boxed_slice()),
            ..Self::new(len)
        }
    }

    /// The number of slots in this buffer.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Is this buffer empty?
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// Does this buffer have a colour slot for every instance?
    pub fn has_colours(&self) -> bool {
        self.colours.is_some()
    }

    /// Write a transform into the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range. Groups check their instance count against the buffer
    /// when they're built, so this can only happen through a programming error.
    pub fn set_transform_at(&mut self, index: usize, transform: Mat4) {
        self.transforms[index] = transform;
        self.transforms_need_update = true;
    }

    /// Compose the pose and write it into the slot at `index`. See
    /// [`set_transform_at`](Self::set_transform_at).
    pub fn set_pose_at(&mut self, index: usize, pose: &Pose) {
        self.set_transform_at(index, pose.to_matrix());
    }

    /// Write a colour into the slot at `index`. Does nothing if this buffer has no colours.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn set_colour_at(&mut self, index: usize, colour: Vec3) {
        if let Some(colours) = self.colours.as_mut() {
            colours[index] = colour;
            self.colours_need_update = true;
        }
    }

    /// All the transforms in slot order.
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// All the colours in slot order, if this buffer has colours.
    pub fn colours(&self) -> Option<&[Vec3]> {
        self.colours.as_deref()
    }

    /// The translation part of the transform at `index`.
    pub fn position_at(&self, index: usize) -> Option<Vec3> {
        self.transforms
            .get(index)
            .map(|transform| transform.w_axis.truncate())
    }

    /// Return whether the transforms and colours have changed since the last call, and reset
    /// both flags.
    pub fn take_needs_update(&mut self) -> (bool, bool) {
        let flags = (self.transforms_need_update, self.colours_need_update);
        trace!(?flags, "Taking instance buffer update flags");
        self.transforms_need_update = false;
        self.colours_need_update = false;
        flags
    }

    /// Peek at the update flags without resetting them.
    pub fn needs_update(&self) -> (bool, bool) {
        (self.transforms_need_update, self.colours_need_update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_and_flags_test() {
        let mut buffer = InstanceBuffer::with_colours(3);
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.needs_update(), (false, false));

        buffer.set_pose_at(1, &Pose::at(Vec3::new(1., -2., 3.)));
        assert_eq!(buffer.position_at(1), Some(Vec3::new(1., -2., 3.)));
        assert_eq!(buffer.position_at(3), None);
        assert_eq!(buffer.needs_update(), (true, false));

        buffer.set_colour_at(2, Vec3::new(0.5, 0., 0.));
        assert_eq!(buffer.colours().map(|c| c[2]), Some(Vec3::new(0.5, 0., 0.)));
        assert_eq!(buffer.take_needs_update(), (true, true));
        assert_eq!(buffer.needs_update(), (false, false));
    }

    #[test]
    fn colourless_buffer_ignores_colours_test() {
        let mut buffer = InstanceBuffer::new(2);
        buffer.set_colour_at(0, Vec3::ONE);

        assert!(!buffer.has_colours());
        assert_eq!(buffer.colours(), None);
        assert_eq!(buffer.needs_update(), (false, false));
    }
}
