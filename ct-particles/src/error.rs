//! This module contains the errors that can stop a scene from being built.

use thiserror::Error;

/// An error when building a particle group.
///
/// These are all configuration mistakes, so they're raised once when the scene is built rather
/// than surfacing halfway through an animation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The renderer's buffer doesn't have exactly one slot per instance.
    #[error("group `{group}` has {instances} instances but its buffer has {slots} slots")]
    BufferSizeMismatch {
        /// The name of the group.
        group: &'static str,

        /// The number of instances in the dataset.
        instances: usize,

        /// The number of slots in the buffer.
        slots: usize,
    },

    /// The group writes instance colours, but the renderer's buffer has nowhere to put them.
    #[error("group `{group}` needs instance colours but its buffer has none")]
    MissingColourBuffer {
        /// The name of the group.
        group: &'static str,
    },
}

/// Check that a buffer fits a dataset, returning the appropriate [`BuildError`] if not.
pub(crate) fn check_buffer(
    group: &'static str,
    instances: usize,
    buffer: &ct_frame::InstanceBuffer,
    needs_colours: bool,
) -> Result<(), BuildError> {
    if buffer.len() != instances {
        return Err(BuildError::BufferSizeMismatch {
            group,
            instances,
            slots: buffer.len(),
        });
    }

    if needs_colours && !buffer.has_colours() {
        return Err(BuildError::MissingColourBuffer { group });
    }

    Ok(())
}
