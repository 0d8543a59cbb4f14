//! This module provides the [`run_scene`] function, which paces frames and hands them to the
//! driver until it's told to stop.

use crate::{
    config::{Command, RunnerConfig},
    drivers::DriverWrapper,
};
use color_eyre::Result;
use ct_driver_trait::Driver;
use ct_particles::{Scene, SceneConfig};
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{self, Instant, Interval, MissedTickBehavior},
};
use tracing::{debug, info, instrument, trace, warn};

/// Why the frame loop stopped.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum StopReason {
    /// Someone pressed Ctrl-C.
    Interrupted,

    /// Someone typed `quit`.
    Quit,

    /// The configured run time ran out.
    TimeUp,
}

/// Apply a command to the scene. Returns true if the runner should stop.
fn apply_command(scene: &mut Scene, command: Command) -> bool {
    match command {
        Command::Toggle => {
            scene.toggle_chaos();
        }
        Command::Chaos => scene.set_chaos(true),
        Command::Form => scene.set_chaos(false),
        Command::Rebuild => {
            info!("Rebuilding every group");
            scene.rebuild(&mut StdRng::from_entropy());
        }
        Command::Quit => return true,
    }

    false
}

/// Wait for the next tick of the interval, or forever if there isn't one.
async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// Build the scene and run it with `tokio` until told to stop, updating it on every tick and
/// listening for commands on stdin in between.
#[instrument(skip_all)]
pub fn run_scene(scene_config: SceneConfig, runner_config: &RunnerConfig) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut scene = Scene::from_config(scene_config);
    let mut driver = DriverWrapper::init();

    let frame_length = runner_config.frame_length();
    let toggle_every = runner_config.toggle_every();
    let run_for = runner_config.run_for();

    info!(?frame_length, ?toggle_every, ?run_for, "Beginning tokio frame loop");

    let reason = runtime.block_on(async {
        let mut ticks = time::interval(frame_length);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut toggles =
            toggle_every.map(|period| time::interval_at(Instant::now() + period, period));

        let deadline = async {
            match run_for {
                Some(duration) => time::sleep(duration).await,
                None => std::future::pending().await,
            }
        };
        tokio::pin!(deadline);

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                biased;

                _ = &mut ctrl_c => break StopReason::Interrupted,

                _ = &mut deadline => break StopReason::TimeUp,

                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }

                        match line.parse::<Command>() {
                            Ok(command) => {
                                debug!(?command, "Received command");
                                if apply_command(&mut scene, command) {
                                    break StopReason::Quit;
                                }
                            }
                            Err(_) => warn!(line, "Unknown command"),
                        }
                    }
                    Ok(None) => {
                        debug!("Stdin closed");
                        stdin_open = false;
                    }
                    Err(error) => {
                        warn!(?error, "Unable to read stdin");
                        stdin_open = false;
                    }
                },

                _ = next_tick(&mut toggles) => {
                    scene.toggle_chaos();
                }

                now = ticks.tick() => {
                    let delta = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    scene.advance(delta);
                    driver.display_frame(&scene.frame());
                    scene.clear_update_flags();

                    trace!(delta, elapsed = scene.clock().elapsed, "Frame displayed");
                }
            }
        }
    });

    info!(?reason, "Frame loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_command_test() {
        let mut scene = Scene::from_config(SceneConfig::default());
        assert!(!scene.is_chaos());

        assert!(!apply_command(&mut scene, Command::Toggle));
        assert!(scene.is_chaos());

        assert!(!apply_command(&mut scene, Command::Chaos));
        assert!(scene.is_chaos());

        assert!(!apply_command(&mut scene, Command::Form));
        assert!(!scene.is_chaos());

        assert!(!apply_command(&mut scene, Command::Rebuild));
        assert_eq!(scene.frame().instance_count(), 4500 + 350 + 200 + 1000 + 1 + 1200);

        assert!(apply_command(&mut scene, Command::Quit));
    }
}
