//! This module contains the [`RunnerConfig`] and the [`Command`]s that can be typed into the
//! runner while it's going.

use ct_particles::Config;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::EnumString;

/// The config for the runner itself, as opposed to the scene it runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// The number of frames per second.
    pub fps: f32,

    /// If set, toggle chaos automatically every this many seconds.
    pub toggle_every_secs: Option<f32>,

    /// If set, stop after this many seconds.
    pub run_for_secs: Option<f32>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            fps: 60.,
            toggle_every_secs: Some(8.),
            run_for_secs: None,
        }
    }
}

impl Config for RunnerConfig {
    fn config_name() -> &'static str {
        "Runner"
    }
}

/// Turn a number of seconds into a non-zero [`Duration`], if it makes sense as one.
fn positive_duration(secs: f32) -> Option<Duration> {
    Duration::try_from_secs_f32(secs)
        .ok()
        .filter(|duration| !duration.is_zero())
}

impl RunnerConfig {
    /// The time between frames. Nonsensical frame rates fall back to 60 FPS.
    pub fn frame_length(&self) -> Duration {
        positive_duration(self.fps.recip()).unwrap_or(Duration::from_nanos(16_666_667))
    }

    /// The time between automatic chaos toggles, if there should be any.
    pub fn toggle_every(&self) -> Option<Duration> {
        self.toggle_every_secs.and_then(positive_duration)
    }

    /// How long to run for, if there's a limit.
    pub fn run_for(&self) -> Option<Duration> {
        self.run_for_secs.and_then(positive_duration)
    }
}

/// A command typed into the runner's stdin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Command {
    /// Flip between the tree and chaos.
    #[strum(serialize = "t", serialize = "toggle")]
    Toggle,

    /// Scatter into chaos.
    #[strum(serialize = "c", serialize = "chaos")]
    Chaos,

    /// Gather back into the tree.
    #[strum(serialize = "f", serialize = "form")]
    Form,

    /// Build fresh random datasets for every group.
    #[strum(serialize = "r", serialize = "rebuild")]
    Rebuild,

    /// Stop the runner.
    #[strum(serialize = "q", serialize = "quit")]
    Quit,
}
