//! This binary crate runs the Chaos Tree headlessly, handing every frame to the driver chosen by
//! the `driver-*` features.
//!
//! Type `toggle`, `chaos`, `form`, `rebuild`, or `quit` into stdin while it's running.

mod config;
mod drivers;
mod logging;
mod run_scene;

use self::config::RunnerConfig;
use color_eyre::Result;
use ct_particles::{Config, SceneConfig};
use tracing::{info, instrument};

#[instrument]
fn main() -> Result<()> {
    color_eyre::install()?;
    let _guard = logging::init_tracing();

    let runner_config = RunnerConfig::load();
    let scene_config = SceneConfig::load();
    info!(?runner_config, "Initialising runner");

    run_scene::run_scene(scene_config, &runner_config)?;

    info!("Runner finished");
    Ok(())
}
