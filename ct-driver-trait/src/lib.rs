//! This crate provides the [`Driver`] trait and nothing else.
//!
//! It's structured like this to avoid dependency cycles.

use ct_frame::SceneFrame;

/// The trait implemented by all drivers. A driver is whatever actually draws the instance
/// buffers, be that a real renderer or something that just logs them.
pub trait Driver {
    /// Initialise the driver.
    fn init() -> Self
    where
        Self: Sized;

    /// Draw the given frame using this driver.
    ///
    /// This gets called once per frame, after every group has finished writing its buffer, so
    /// the driver is the only reader while it holds the frame.
    fn display_frame(&mut self, frame: &SceneFrame<'_>);

    /// Tear down anything the driver holds. The default implementation does nothing.
    fn shutdown(&mut self) {}
}
