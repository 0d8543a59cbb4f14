//! This module contains the smoothed transition between the formed tree and the chaos cloud.

use serde::{Deserialize, Serialize};
use tracing::trace;

/// The chaos switch that every group follows.
///
/// There's only one of these per scene. Each group keeps its own [`Transition`] and chases this
/// target at its own rate, so flipping the switch doesn't move everything in lockstep.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChaosToggle {
    /// Whether the scene should be scattered.
    chaos: bool,
}

impl ChaosToggle {
    /// Create a toggle in the given state.
    pub fn new(chaos: bool) -> Self {
        Self { chaos }
    }

    /// Is chaos requested?
    pub fn is_chaos(&self) -> bool {
        self.chaos
    }

    /// Request chaos or order.
    pub fn set(&mut self, chaos: bool) {
        self.chaos = chaos;
    }

    /// Flip the toggle and return the new state.
    pub fn toggle(&mut self) -> bool {
        self.chaos = !self.chaos;
        self.chaos
    }

    /// The blend factor that transitions should head towards.
    pub fn target(&self) -> f32 {
        if self.chaos {
            1.
        } else {
            0.
        }
    }
}

/// A blend factor in [0, 1] that eases towards its target.
///
/// Each step moves the factor a fraction `1 - e^(-rate * dt)` of the remaining distance, so it
/// never overshoots, it never reaches the target in finite time, and reversing the target halfway
/// through just turns it around from wherever it currently is.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// The current blend factor, where 0 is the formed tree and 1 is full chaos.
    factor: f32,

    /// How quickly the factor chases its target, per second.
    rate: f32,
}

impl Transition {
    /// Create a transition resting at the formed tree with the given rate.
    ///
    /// Negative or non-finite rates are treated as 0, which means the factor never moves.
    pub fn new(rate: f32) -> Self {
        Self {
            factor: 0.,
            rate: if rate.is_finite() { rate.max(0.) } else { 0. },
        }
    }

    /// Create a transition at the given factor, clamped into [0, 1].
    pub fn with_factor(rate: f32, factor: f32) -> Self {
        Self {
            factor: if factor.is_finite() {
                factor.clamp(0., 1.)
            } else {
                0.
            },
            ..Self::new(rate)
        }
    }

    /// The current blend factor.
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// The rate of this transition.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Advance the factor towards the toggle's target by `delta` seconds and return the new
    /// factor.
    ///
    /// A non-positive or non-finite `delta` leaves the factor where it is.
    pub fn step(&mut self, toggle: &ChaosToggle, delta: f32) -> f32 {
        if !(delta.is_finite() && delta > 0.) {
            return self.factor;
        }

        let target = toggle.target();
        let alpha = 1. - (-self.rate * delta).exp();
        self.factor = (self.factor + (target - self.factor) * alpha).clamp(0., 1.);

        trace!(factor = self.factor, target, "Stepped transition");
        self.factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One frame at 60 fps.
    const DELTA: f32 = 1. / 60.;

    #[test]
    fn rises_towards_chaos_test() {
        let toggle = ChaosToggle::new(true);
        let mut transition = Transition::new(3.);

        let mut previous = transition.factor();
        for _ in 0..180 {
            let factor = transition.step(&toggle, DELTA);
            assert!(factor > previous, "{factor} should be above {previous}");
            assert!(factor <= 1.);
            previous = factor;
        }

        // Three seconds at rate 3 is 9 time constants
        assert!(previous > 0.999);
    }

    #[test]
    fn reversal_is_continuous_test() {
        let mut toggle = ChaosToggle::new(true);
        let mut transition = Transition::new(2.5);

        for _ in 0..20 {
            transition.step(&toggle, DELTA);
        }
        let peak = transition.factor();
        assert!(peak > 0.3 && peak < 0.9);

        toggle.toggle();

        // The first step back only moves a small amount, rather than snapping to 0
        let after = transition.step(&toggle, DELTA);
        assert!(after < peak);
        assert!(peak - after < 0.05);

        let mut previous = after;
        for _ in 0..60 {
            let factor = transition.step(&toggle, DELTA);
            assert!(factor < previous);
            assert!(factor >= 0.);
            previous = factor;
        }
    }

    #[test]
    fn huge_and_bad_deltas_test() {
        let toggle = ChaosToggle::new(true);
        let mut transition = Transition::with_factor(2., 0.5);

        assert_eq!(transition.step(&toggle, 0.), 0.5);
        assert_eq!(transition.step(&toggle, -1.), 0.5);
        assert_eq!(transition.step(&toggle, f32::NAN), 0.5);

        // Even a very long frame can't overshoot
        let factor = transition.step(&toggle, 1000.);
        assert!(factor <= 1.);
        assert!(factor > 0.99);

        let mut frozen = Transition::new(f32::NAN);
        assert_eq!(frozen.step(&toggle, DELTA), 0.);
        assert_eq!(Transition::with_factor(1., 7.).factor(), 1.);
    }

    #[test]
    fn different_rates_stagger_test() {
        let toggle = ChaosToggle::new(true);
        let mut tree = Transition::new(3.);
        let mut ribbon = Transition::new(2.5);
        let mut star = Transition::new(2.);

        for _ in 0..30 {
            tree.step(&toggle, DELTA);
            ribbon.step(&toggle, DELTA);
            star.step(&toggle, DELTA);
        }

        assert!(tree.factor() > ribbon.factor());
        assert!(ribbon.factor() > star.factor());
    }
}
