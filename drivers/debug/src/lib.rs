//! This crate provides a very simple [`DebugDriver`] to test things with.

use ct_driver_trait::Driver;
use ct_frame::SceneFrame;
use glam::Vec3;
use tracing::{debug, info, instrument};

/// A simple debug driver that logs a summary of every frame with tracing.
///
/// The instance buffers hold thousands of matrices, so rather than logging them whole, this
/// driver logs the centroid of each group, which is enough to watch the tree fly apart and come
/// back together.
#[derive(Debug, Default)]
pub struct DebugDriver {
    /// The number of frames this driver has been given.
    pub frames_seen: u64,
}

/// The mean position of every instance in the buffer, or zero if it's empty.
fn centroid(frame: &SceneFrame<'_>, name: &str) -> Vec3 {
    let Some(group) = frame.group(name) else {
        return Vec3::ZERO;
    };

    let buffer = group.buffer;
    if buffer.is_empty() {
        return Vec3::ZERO;
    }

    let sum: Vec3 = (0..buffer.len())
        .filter_map(|index| buffer.position_at(index))
        .sum();
    sum / buffer.len() as f32
}

impl Driver for DebugDriver {
    fn init() -> Self {
        Self::default()
    }

    #[instrument(skip_all, fields(frame = self.frames_seen))]
    fn display_frame(&mut self, frame: &SceneFrame<'_>) {
        self.frames_seen += 1;

        for group in &frame.groups {
            debug!(
                name = group.name,
                instances = group.buffer.len(),
                centroid = ?centroid(frame, group.name),
                "Group"
            );
        }

        if let Some(glow) = frame.glow {
            debug!(?glow);
        }
    }

    fn shutdown(&mut self) {
        info!(frames_seen = self.frames_seen, "Debug driver shutting down");
    }
}
