//! This module provides the spatial samplers used to place particles, both on the tree and in the
//! chaos sphere.
//!
//! None of these functions fail. Nonsensical parameters like negative radii or reversed ranges get
//! clamped into something drawable, because a slightly wrong tree is better than a panic halfway
//! through an animation.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{
    f32::consts::{PI, TAU},
    ops::Range,
};

/// Draw a value uniformly from the range.
///
/// A reversed range is sampled as if it were the right way round, and an empty range just gives
/// its start. Non-finite bounds give 0 (or the finite bound, if only one is finite).
pub fn sample_range<R: Rng + ?Sized>(rng: &mut R, range: &Range<f32>) -> f32 {
    let Range { start, end } = *range;

    match (start.is_finite(), end.is_finite()) {
        (true, true) => {}
        (true, false) => return start,
        (false, true) => return end,
        (false, false) => return 0.,
    }

    let (low, high) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    if low < high {
        rng.gen_range(low..high)
    } else {
        low
    }
}

/// How the random scatter is applied to the silhouette radius.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Jitter {
    /// Scatter both inwards and outwards: `(u - 0.5) * scatter`.
    Centred,

    /// Only push particles outwards: `u * scatter`. Used for decorations that should sit on the
    /// surface of the foliage.
    Outward,
}

/// The shape of the tree, as a radius for every height.
///
/// Above `y = 0` the tree narrows linearly to a point at `apex_height`, and the scatter shrinks
/// with it. Below `y = 0` the skirt flares outwards and gets messier the further down it goes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Silhouette {
    /// The height of the tip of the tree.
    pub apex_height: f32,

    /// The radius at `y = 0`, approached from above.
    pub top_radius: f32,

    /// The scatter at `y = 0`, approached from above.
    pub top_scatter: f32,

    /// How quickly the scatter falls off towards the apex. 0 keeps it constant, 2 makes it fall
    /// off quadratically.
    pub top_scatter_exponent: f32,

    /// The depth below `y = 0` where the skirt reaches its full flare.
    pub skirt_depth: f32,

    /// The radius at `y = 0`, approached from below.
    pub skirt_radius: f32,

    /// How much wider the skirt is at `skirt_depth` than at `y = 0`.
    pub skirt_flare: f32,

    /// The scatter at `y = 0`, approached from below.
    pub skirt_scatter: f32,

    /// How much more scatter there is at `skirt_depth` than at `y = 0`.
    pub skirt_scatter_growth: f32,

    /// How the scatter is applied.
    pub jitter: Jitter,
}

impl Default for Silhouette {
    fn default() -> Self {
        Self {
            apex_height: 10.,
            top_radius: 4.5,
            top_scatter: 1.5,
            top_scatter_exponent: 2.,
            skirt_depth: 8.,
            skirt_radius: 4.5,
            skirt_flare: 2.,
            skirt_scatter: 1.5,
            skirt_scatter_growth: 8.,
            jitter: Jitter::Centred,
        }
    }
}

impl Silhouette {
    /// A tight silhouette for decorations that hang on the outside of the foliage: the radius
    /// narrows above the base, stays constant below it, and the scatter only pushes outwards.
    pub fn decoration(top_radius: f32, skirt_radius: f32, scatter: f32) -> Self {
        Self {
            apex_height: 10.,
            top_radius,
            top_scatter: scatter,
            top_scatter_exponent: 0.,
            skirt_depth: 8.,
            skirt_radius,
            skirt_flare: 0.,
            skirt_scatter: scatter,
            skirt_scatter_growth: 0.,
            jitter: Jitter::Outward,
        }
    }

    /// The proportion of the way from the apex down to `y = 0`, for `y > 0`.
    fn top_ratio(&self, y: f32) -> f32 {
        (1. - y / self.apex_height.max(f32::EPSILON)).max(0.)
    }

    /// The proportion of the way from `y = 0` down to `skirt_depth`, for `y <= 0`.
    fn skirt_ratio(&self, y: f32) -> f32 {
        y.abs() / self.skirt_depth.max(f32::EPSILON)
    }

    /// The radius of the tree at height `y`, without any scatter. Never negative.
    pub fn radius_at(&self, y: f32) -> f32 {
        let radius = if y > 0. {
            self.top_ratio(y) * self.top_radius
        } else {
            self.skirt_radius + self.skirt_ratio(y) * self.skirt_flare
        };

        radius.max(0.)
    }

    /// The size of the random scatter at height `y`. Never negative.
    pub fn scatter_at(&self, y: f32) -> f32 {
        let scatter = if y > 0. {
            self.top_scatter * self.top_ratio(y).powf(self.top_scatter_exponent.max(0.))
        } else {
            self.skirt_scatter + self.skirt_ratio(y) * self.skirt_scatter_growth
        };

        scatter.max(0.)
    }

    /// Pick a random point on the silhouette at height `y`.
    pub fn sample<R: Rng + ?Sized>(&self, y: f32, rng: &mut R) -> SilhouettePoint {
        let angle = rng.gen_range(0.0..TAU);
        let u: f32 = rng.gen();

        let offset = match self.jitter {
            Jitter::Centred => (u - 0.5) * self.scatter_at(y),
            Jitter::Outward => u * self.scatter_at(y),
        };

        SilhouettePoint {
            height: y,
            radius: (self.radius_at(y) + offset).max(0.),
            angle,
        }
    }
}

/// A point on the silhouette in cylindrical coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SilhouettePoint {
    /// The height that was asked for.
    pub height: f32,

    /// The distance from the trunk, including scatter.
    pub radius: f32,

    /// The angle around the trunk, in [0, 2π).
    pub angle: f32,
}

impl SilhouettePoint {
    /// Convert to a world-space position, shifting everything down by `vertical_offset`.
    pub fn to_world(self, vertical_offset: f32) -> Vec3 {
        Vec3::new(
            self.angle.cos() * self.radius,
            self.height - vertical_offset,
            self.angle.sin() * self.radius,
        )
    }
}

/// How the distance from the centre of the chaos sphere is distributed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum RadialDistribution {
    /// `r = R * sqrt(u)`. This is denser towards the centre than a uniform fill, which gives the
    /// chaos cloud a brighter core.
    #[default]
    SquareRoot,

    /// `r = R * cbrt(u)`. A genuinely uniform fill of the sphere's volume.
    CubeRoot,
}

/// The sphere that particles scatter into when the scene goes into chaos.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dispersal {
    /// The radius of the sphere. Negative radii are treated as positive.
    pub radius: f32,

    /// How points are spread between the centre and the surface.
    pub distribution: RadialDistribution,
}

impl Default for Dispersal {
    fn default() -> Self {
        Self {
            radius: 15.,
            distribution: RadialDistribution::SquareRoot,
        }
    }
}

impl Dispersal {
    /// Create a sphere of the given radius with the default distribution.
    pub fn with_radius(radius: f32) -> Self {
        Self {
            radius,
            ..Self::default()
        }
    }

    /// Pick a random point in the sphere, centred on the origin.
    ///
    /// The polar angle is drawn as `acos(2u - 1)` rather than uniformly, so that points are
    /// spread evenly over solid angle instead of bunching up at the poles.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        let phi = rng.gen_range(0.0..TAU);
        let theta = (2. * rng.gen::<f32>() - 1.).clamp(-1., 1.).acos();

        let radius = if self.radius.is_finite() {
            self.radius.abs()
        } else {
            0.
        };
        let u: f32 = rng.gen();
        let r = radius
            * match self.distribution {
                RadialDistribution::SquareRoot => u.sqrt(),
                RadialDistribution::CubeRoot => u.cbrt(),
            };

        Vec3::new(
            r * theta.sin() * phi.cos(),
            r * theta.sin() * phi.sin(),
            r * theta.cos(),
        )
    }
}

/// A spiral that winds around the outside of the silhouette from bottom to top.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Helix {
    /// The number of full revolutions from bottom to top.
    pub turns: f32,

    /// The height where the spiral ends.
    pub top: f32,

    /// The height where the spiral starts.
    pub bottom: f32,

    /// How far outside the silhouette the spiral sits.
    pub standoff: f32,

    /// How far the standoff ripples in and out.
    pub ripple_amplitude: f32,

    /// The number of half-waves of ripple along the whole spiral.
    pub ripples: f32,
}

impl Default for Helix {
    fn default() -> Self {
        Self {
            turns: 3.5,
            top: 9.5,
            bottom: -10.,
            standoff: 1.,
            ripple_amplitude: 0.2,
            ripples: 10.,
        }
    }
}

impl Helix {
    /// The point at parameter `t` in [0, 1) along the spiral around the given silhouette.
    pub fn point(&self, silhouette: &Silhouette, t: f32) -> HelixPoint {
        let height = self.bottom + t * (self.top - self.bottom);
        let ripple = self.ripple_amplitude * (t * PI * self.ripples).sin();

        HelixPoint {
            angle: t * TAU * self.turns,
            radius: (silhouette.radius_at(height) + self.standoff + ripple).max(0.),
            height,
        }
    }

    /// `count` points evenly spaced in `t` along the spiral.
    pub fn points<'a>(
        &'a self,
        silhouette: &'a Silhouette,
        count: usize,
    ) -> impl Iterator<Item = HelixPoint> + 'a {
        (0..count).map(move |i| self.point(silhouette, i as f32 / count as f32))
    }
}

/// A point on a [`Helix`] in cylindrical coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HelixPoint {
    /// The angle around the trunk. This is not wrapped, so it keeps growing with `t`.
    pub angle: f32,

    /// The distance from the trunk.
    pub radius: f32,

    /// The height of the point.
    pub height: f32,
}

impl HelixPoint {
    /// The world-space position of this point after spinning the whole spiral by `spin` radians.
    pub fn position(self, spin: f32) -> Vec3 {
        let angle = self.angle + spin;
        Vec3::new(
            angle.cos() * self.radius,
            self.height,
            angle.sin() * self.radius,
        )
    }
}
