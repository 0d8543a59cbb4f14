//! This module picks the driver implementation. See `Cargo.toml` for the features that enable
//! these drivers and their explanations.

use ct_driver_trait::Driver;
use ct_frame::SceneFrame;
use std::ops::{Deref, DerefMut};
use tracing::{error, info, instrument};

cfg_if::cfg_if! {
    if #[cfg(feature = "driver-debug")] {
        use debug::DebugDriver as DriverImpl;
    } else {
        compile_error!("You must enable exactly one driver feature");
    }
}

/// A transparent wrapper around the `Driver` trait implementation. This wrapper shuts the driver
/// down when dropped.
pub(crate) struct DriverWrapper(DriverImpl);

impl Deref for DriverWrapper {
    type Target = DriverImpl;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DriverWrapper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl Drop for DriverWrapper {
    #[instrument(skip_all)]
    fn drop(&mut self) {
        info!("Dropping DriverWrapper");

        if std::thread::panicking() {
            error!("Thread is panicking. Not shutting down the driver");
        } else {
            self.0.shutdown();
        }
    }
}

impl Driver for DriverWrapper {
    fn init() -> Self {
        Self(DriverImpl::init())
    }

    #[inline]
    fn display_frame(&mut self, frame: &SceneFrame<'_>) {
        self.0.display_frame(frame);
    }
}
