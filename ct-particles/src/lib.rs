//! This crate provides the particle groups that make up the Chaos Tree, along with the samplers
//! that place them and the transition that scatters them into chaos and gathers them back up.
//!
//! The usual entry point is [`Scene`], which owns one of each group:
//!
//! ```rust
//! use ct_particles::{Scene, SceneConfig};
//!
//! let mut scene = Scene::from_config(SceneConfig::default());
//! scene.toggle_chaos();
//! scene.advance(1. / 60.);
//!
//! let frame = scene.frame();
//! assert_eq!(frame.groups.len(), 6);
//! ```

/// Create a `rand::rngs::StdRng` from entropy in a normal build, or seeded from 12345 in a test or
/// bench build.
macro_rules! rng {
    () => {{
        use ::rand::{rngs::StdRng, SeedableRng};

        cfg_if::cfg_if! {
            if #[cfg(any(test, feature = "bench"))] {
                StdRng::seed_from_u64(12345)
            } else {
                StdRng::from_entropy()
            }
        }
    }};
}

pub(crate) use rng;

pub mod dataset;
pub mod groups;
pub mod sampler;

pub(crate) mod error;
pub(crate) mod list;
pub(crate) mod scene;
pub(crate) mod traits;
pub(crate) mod transition;

pub use self::{
    error::BuildError,
    list::GroupKind,
    scene::{FloatConfig, Scene, SceneConfig},
    traits::{get_config_filename, save_config_to_file, Config, ParticleGroup, DATA_DIR},
    transition::{ChaosToggle, Transition},
};
