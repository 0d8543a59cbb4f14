//! This module contains the traits needed for particle groups and their associated configs to
//! work.

use crate::{transition::Transition, GroupKind};
use ct_frame::{FrameClock, Glow, GroupFrame, InstanceBuffer};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::{debug, warn};
use tracing_unwrap::ResultExt;

/// The directory where config files are kept. This is taken from the `DATA_DIR` environment
/// variable at compile time, and falls back to `./data`.
pub const DATA_DIR: &str = match option_env!("DATA_DIR") {
    Some(dir) => dir,
    None => "./data",
};

/// Save the given config to the given file as pretty RON.
pub fn save_config_to_file<T>(filename: &str, config: &T)
where
    T: Config,
{
    let text = ron::ser::to_string_pretty(
        config,
        ron::ser::PrettyConfig::default().struct_names(true),
    )
    .expect_or_log("The config should be serializable");

    if let Err(error) = fs::write(filename, text) {
        warn!(?error, filename, "Unable to save config");
    }
}

/// Get the filename for the config with the given name.
pub fn get_config_filename(config_name: &str) -> String {
    use heck::ToSnakeCase;

    format!("{DATA_DIR}/config/{}.ron", config_name.to_snake_case())
}

/// This module contains the [`Sealed`](self::private::Sealed) trait
pub(crate) mod private {
    #[cfg(doc)]
    use super::ParticleGroup;

    /// This trait restricts implementors of [`ParticleGroup`] to only be in this crate, so that
    /// [`GroupKind`](crate::GroupKind) has a variant for every group.
    pub trait Sealed {}
}

/// This trait is needed by all structs that want to act as configuration.
pub trait Config: Clone + Default + PartialEq + Serialize + for<'de> Deserialize<'de> {
    /// The name of the config, used for its filename.
    fn config_name() -> &'static str;

    /// The filename for this config in the data directory.
    fn config_filename() -> String {
        get_config_filename(Self::config_name())
    }

    /// Load the config from the given file, or use the default if the file is unavailable or
    /// can't be parsed. The default is saved to the file for future editing in that case.
    fn from_file(filename: &str) -> Self {
        if let Some(parent) = Path::new(filename).parent() {
            let _ = fs::DirBuilder::new().recursive(true).create(parent);
        }

        let write_and_return_default = || -> Self {
            let default = Self::default();
            save_config_to_file(filename, &default);
            default
        };

        let Ok(text) = fs::read_to_string(filename) else {
            debug!(filename, "No config file, writing default");
            return write_and_return_default();
        };

        ron::from_str(&text).unwrap_or_else(|error| {
            warn!(?error, filename, "Unable to parse config, replacing with default");
            write_and_return_default()
        })
    }

    /// Load the config from its usual file in the data directory.
    fn load() -> Self {
        Self::from_file(&Self::config_filename())
    }

    /// Save the config to the given filename.
    fn save_to_file(&self, filename: &str) {
        save_config_to_file(filename, self);
    }
}

/// The trait implemented by every particle group.
///
/// A group owns its instances, its [`Transition`], and exactly one [`InstanceBuffer`]. The only
/// thing that changes after it's built is the contents of that buffer, which [`update`] rewrites
/// in full every frame.
///
/// [`update`]: ParticleGroup::update
pub trait ParticleGroup: private::Sealed {
    /// Which group this is.
    fn kind(&self) -> GroupKind;

    /// Advance the group's transition and rewrite every slot of its buffer for this frame.
    fn update(&mut self, clock: FrameClock, toggle: &crate::ChaosToggle);

    /// Throw away the instance dataset and build a fresh one of the same size.
    ///
    /// The transition and the buffer are kept, so this can happen mid-animation.
    fn rebuild(&mut self, rng: &mut dyn RngCore);

    /// The buffer this group writes into.
    fn buffer(&self) -> &InstanceBuffer;

    /// Mutable access to the buffer, for the renderer to clear the update flags.
    fn buffer_mut(&mut self) -> &mut InstanceBuffer;

    /// The group's transition, if it has one. Snow doesn't.
    fn transition(&self) -> Option<&Transition> {
        None
    }

    /// The glow light this group gives off, if any.
    fn glow(&self) -> Option<Glow> {
        None
    }

    /// The number of instances in this group.
    fn len(&self) -> usize {
        self.buffer().len()
    }

    /// Does this group have no instances?
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow this group's buffer as a frame for the renderer.
    fn frame(&self) -> GroupFrame<'_> {
        GroupFrame {
            name: self.kind().name(),
            buffer: self.buffer(),
            floats: self.kind().floats(),
        }
    }
}
