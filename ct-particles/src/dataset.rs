//! This module builds the per-instance data for each group. This happens once when a group is
//! built (and again if it's rebuilt), never during a frame.

use crate::{
    groups::{FoliageConfig, GiftsConfig, OrnamentsConfig, RibbonConfig, SnowConfig},
    sampler::{sample_range, HelixPoint},
};
use ct_frame::rgb_to_colour;
use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use tracing::{debug, instrument};

/// One instance in a group that blends between the tree and the chaos sphere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleInstance {
    /// Where the instance sits when the tree is formed.
    pub formed: Vec3,

    /// Where the instance sits in full chaos.
    pub dispersed: Vec3,

    /// The base size of the instance.
    pub scale: f32,

    /// The colour of the instance, with components in [0, 1].
    pub colour: Vec3,

    /// A random phase in [0, 2π) so that instances don't all oscillate together.
    pub phase: f32,

    /// How quickly this instance drifts and spins.
    pub speed: f32,

    /// The base orientation as XYZ Euler angles. Zero for groups that don't rotate.
    pub rotation: Vec3,
}

impl ParticleInstance {
    /// The position blended between formed and dispersed by `factor`.
    pub fn blended_position(&self, factor: f32) -> Vec3 {
        self.formed.lerp(self.dispersed, factor)
    }

    /// Is every field finite?
    pub fn is_finite(&self) -> bool {
        self.formed.is_finite()
            && self.dispersed.is_finite()
            && self.scale.is_finite()
            && self.colour.is_finite()
            && self.phase.is_finite()
            && self.speed.is_finite()
            && self.rotation.is_finite()
    }
}

/// One segment of the ribbon.
///
/// The ribbon's formed position spins around the trunk over time, so rather than a fixed
/// position, each segment remembers where it sits on the helix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RibbonSegment {
    /// The segment's place on the helix.
    pub anchor: HelixPoint,

    /// Where the segment sits in full chaos.
    pub dispersed: Vec3,

    /// The base size of the segment.
    pub scale: f32,

    /// A random phase in [0, 2π).
    pub phase: f32,

    /// How quickly this segment drifts.
    pub speed: f32,
}

/// A single falling snowflake. Unlike everything else, its position changes every frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snowflake {
    /// The current position of the flake.
    pub position: Vec3,

    /// How fast the flake falls, in units per second.
    pub speed: f32,

    /// How far the flake sways sideways, in units per second.
    pub drift: f32,

    /// A random phase in [0, 2π) for the sway.
    pub phase: f32,
}

/// Draw a scale or speed from the range, never letting it go negative.
fn sample_positive<R: Rng + ?Sized>(rng: &mut R, range: &std::ops::Range<f32>) -> f32 {
    sample_range(rng, range).max(0.)
}

/// The position of `value` between the start and end of the range, clamped to [0, 1].
fn normalise(value: f32, range: &std::ops::Range<f32>) -> f32 {
    let span = range.end - range.start;
    if span.abs() > f32::EPSILON {
        ((value - range.start) / span).clamp(0., 1.)
    } else {
        0.
    }
}

/// Build the foliage: leaves packed into the silhouette, coloured from bottom to top.
#[instrument(skip_all, fields(count = config.count))]
pub fn build_foliage<R: Rng + ?Sized>(
    config: &FoliageConfig,
    rng: &mut R,
) -> Vec<ParticleInstance> {
    let bottom = rgb_to_colour(config.colour_bottom);
    let top = rgb_to_colour(config.colour_top);

    let instances: Vec<_> = (0..config.count)
        .map(|_| {
            let y = sample_range(rng, &config.height);
            let formed = config
                .silhouette
                .sample(y, rng)
                .to_world(config.vertical_offset);

            ParticleInstance {
                formed,
                dispersed: config.dispersal.sample(rng),
                scale: sample_positive(rng, &config.scale),
                colour: bottom.lerp(top, normalise(y, &config.height)),
                phase: rng.gen_range(0.0..TAU),
                speed: sample_positive(rng, &config.speed),
                rotation: Vec3::new(
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                    rng.gen_range(0.0..PI),
                ),
            }
        })
        .collect();

    debug!(len = instances.len(), "Built foliage");
    instances
}

/// Build the ornaments: baubles on the surface of the foliage, each a colour from the palette.
#[instrument(skip_all, fields(count = config.count))]
pub fn build_ornaments<R: Rng + ?Sized>(
    config: &OrnamentsConfig,
    rng: &mut R,
) -> Vec<ParticleInstance> {
    let palette: Vec<Vec3> = config.palette.iter().copied().map(rgb_to_colour).collect();

    let instances: Vec<_> = (0..config.count)
        .map(|_| {
            let y = sample_range(rng, &config.height);
            let formed = config
                .silhouette
                .sample(y, rng)
                .to_world(config.vertical_offset);

            let colour = if palette.is_empty() {
                Vec3::ONE
            } else {
                palette[rng.gen_range(0..palette.len())]
            };

            ParticleInstance {
                formed,
                dispersed: config.dispersal.sample(rng),
                scale: sample_positive(rng, &config.scale),
                colour,
                phase: rng.gen_range(0.0..TAU),
                speed: 1.,
                rotation: Vec3::ZERO,
            }
        })
        .collect();

    debug!(len = instances.len(), "Built ornaments");
    instances
}

/// Build the gifts: little boxes on the surface of the foliage at random angles.
#[instrument(skip_all, fields(count = config.count))]
pub fn build_gifts<R: Rng + ?Sized>(config: &GiftsConfig, rng: &mut R) -> Vec<ParticleInstance> {
    let instances: Vec<_> = (0..config.count)
        .map(|_| {
            let y = sample_range(rng, &config.height);
            let formed = config
                .silhouette
                .sample(y, rng)
                .to_world(config.vertical_offset);

            ParticleInstance {
                formed,
                dispersed: config.dispersal.sample(rng),
                scale: sample_positive(rng, &config.scale),
                colour: Vec3::ONE,
                phase: rng.gen_range(0.0..TAU),
                speed: 1.,
                rotation: Vec3::new(rng.gen(), rng.gen(), rng.gen()),
            }
        })
        .collect();

    debug!(len = instances.len(), "Built gifts");
    instances
}

/// Build the ribbon: segments evenly spaced along a helix around the silhouette.
#[instrument(skip_all, fields(count = config.count))]
pub fn build_ribbon<R: Rng + ?Sized>(config: &RibbonConfig, rng: &mut R) -> Vec<RibbonSegment> {
    let segments: Vec<_> = config
        .helix
        .points(&config.silhouette, config.count)
        .map(|anchor| RibbonSegment {
            anchor,
            dispersed: config.dispersal.sample(rng),
            phase: rng.gen_range(0.0..TAU),
            scale: sample_positive(rng, &config.scale),
            speed: sample_positive(rng, &config.speed),
        })
        .collect();

    debug!(len = segments.len(), "Built ribbon");
    segments
}

/// Pick a fresh horizontal position for a snowflake, somewhere within the spread.
pub(crate) fn snow_spread<R: Rng + ?Sized>(config: &SnowConfig, rng: &mut R) -> (f32, f32) {
    let half = config.spread.abs() / 2.;
    let range = -half..half;
    (sample_range(rng, &range), sample_range(rng, &range))
}

/// Build the snow: flakes scattered through a box above and around the tree.
#[instrument(skip_all, fields(count = config.count))]
pub fn build_snow<R: Rng + ?Sized>(config: &SnowConfig, rng: &mut R) -> Vec<Snowflake> {
    let flakes: Vec<_> = (0..config.count)
        .map(|_| {
            let (x, z) = snow_spread(config, rng);
            Snowflake {
                position: Vec3::new(x, sample_range(rng, &config.initial_height), z),
                speed: sample_positive(rng, &config.speed),
                drift: sample_positive(rng, &config.drift),
                phase: rng.gen_range(0.0..TAU),
            }
        })
        .collect();

    debug!(len = flakes.len(), "Built snow");
    flakes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ct_frame::colour_to_rgb;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn rebuild_foliage_test() {
        let config = FoliageConfig::default();
        let first = build_foliage(&config, &mut StdRng::seed_from_u64(1));
        let second = build_foliage(&config, &mut StdRng::seed_from_u64(2));

        assert_eq!(first.len(), config.count);
        assert_eq!(second.len(), config.count);
        assert_ne!(first, second, "Different randomness should give different leaves");

        for leaf in first.iter().chain(&second) {
            assert!(leaf.is_finite());
            assert!(config.scale.contains(&leaf.scale));
            assert!(config.speed.contains(&leaf.speed));
            assert!((0.0..TAU).contains(&leaf.phase));
            assert!(leaf.dispersed.length() <= config.dispersal.radius + 1e-3);

            let height = leaf.formed.y + config.vertical_offset;
            assert!(height >= config.height.start - 1e-4 && height < config.height.end + 1e-4);
        }
    }

    #[test]
    fn foliage_colour_gradient_test() {
        let config = FoliageConfig::default();
        let leaves = build_foliage(&config, &mut StdRng::seed_from_u64(3));

        let lowest = leaves
            .iter()
            .min_by(|a, b| a.formed.y.total_cmp(&b.formed.y))
            .expect("There should be leaves");
        let highest = leaves
            .iter()
            .max_by(|a, b| a.formed.y.total_cmp(&b.formed.y))
            .expect("There should be leaves");

        // The extremes should be almost exactly the end colours
        let close = |a: [u8; 3], b: [u8; 3]| a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 2);
        assert!(close(colour_to_rgb(lowest.colour), config.colour_bottom));
        assert!(close(colour_to_rgb(highest.colour), config.colour_top));
    }

    #[test]
    fn ornament_palette_test() {
        let config = OrnamentsConfig::default();
        let palette: Vec<Vec3> = config.palette.iter().copied().map(rgb_to_colour).collect();
        let ornaments = build_ornaments(&config, &mut StdRng::seed_from_u64(4));

        assert_eq!(ornaments.len(), config.count);
        for ornament in &ornaments {
            assert!(palette.contains(&ornament.colour));
            assert_eq!(ornament.rotation, Vec3::ZERO);
        }

        // Every colour should get picked with 350 ornaments
        for colour in &palette {
            assert!(ornaments.iter().any(|o| o.colour == *colour));
        }

        let empty = OrnamentsConfig {
            palette: vec![],
            count: 5,
            ..OrnamentsConfig::default()
        };
        assert!(build_ornaments(&empty, &mut StdRng::seed_from_u64(5))
            .iter()
            .all(|o| o.colour == Vec3::ONE));
    }

    #[test]
    fn gifts_and_ribbon_test() {
        let mut rng = StdRng::seed_from_u64(6);

        let gifts = build_gifts(&GiftsConfig::default(), &mut rng);
        assert_eq!(gifts.len(), 200);
        for gift in &gifts {
            assert!(gift.is_finite());
            assert!(gift.rotation.cmpge(Vec3::ZERO).all() && gift.rotation.cmplt(Vec3::ONE).all());

            // Gifts sit on or outside the decoration silhouette, which jumps out at y = 0
            let height = gift.formed.y + 1.2;
            if height.abs() < 1e-3 {
                continue;
            }
            let radius = glam::Vec2::new(gift.formed.x, gift.formed.z).length();
            assert!(radius + 1e-3 >= GiftsConfig::default().silhouette.radius_at(height));
        }

        let config = RibbonConfig::default();
        let ribbon = build_ribbon(&config, &mut rng);
        assert_eq!(ribbon.len(), config.count);
        assert_eq!(ribbon[0].anchor, config.helix.point(&config.silhouette, 0.));
        assert!(ribbon
            .iter()
            .all(|segment| segment.dispersed.length() <= config.dispersal.radius + 1e-3));
    }

    #[test]
    fn snow_test() {
        let config = SnowConfig::default();
        let flakes = build_snow(&config, &mut StdRng::seed_from_u64(7));

        assert_eq!(flakes.len(), config.count);
        for flake in &flakes {
            assert!(flake.position.x.abs() <= 20. && flake.position.z.abs() <= 20.);
            assert!(config.initial_height.contains(&flake.position.y));
            assert!(flake.speed > 0.);
            assert!(flake.drift >= 0.);
        }
    }

    #[test]
    fn degenerate_ranges_test() {
        let config = FoliageConfig {
            count: 50,
            height: 3.0..3.0,
            scale: 0.5..-0.5,
            speed: f32::NAN..1.0,
            ..FoliageConfig::default()
        };
        let leaves = build_foliage(&config, &mut StdRng::seed_from_u64(8));

        assert_eq!(leaves.len(), 50);
        for leaf in &leaves {
            assert!(leaf.is_finite());
            assert!(leaf.scale >= 0.);
            assert_eq!(leaf.speed, 1.);
            assert_eq!(leaf.formed.y, 3. - config.vertical_offset);
        }
    }
}
