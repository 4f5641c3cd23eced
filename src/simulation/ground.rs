use std::f64::consts::TAU;

use rand::Rng;
use serde::Serialize;

use super::{Bounds, Position};

pub(crate) mod defaults {
    pub const RESOLUTION: f64 = 0.5;
    pub const FLOOR: f64 = 0.05;
    pub const CEILING: f64 = 0.45;
    pub const BASE_LEVEL: f64 = 0.25;
    /// (cycles across the domain, amplitude as a fraction of height)
    pub const HARMONICS: [(f64, f64); 3] = [(1., 0.08), (3., 0.04), (7., 0.02)];
    pub const NOISE: f64 = 0.01;
    pub const FEATURE_COUNT: (usize, usize) = (2, 4);
    pub const FEATURE_HALF_WIDTH: (f64, f64) = (0.025, 0.1);
    pub const FEATURE_STRENGTH: (f64, f64) = (0.3, 0.8);
    pub const PLATFORM_WIDTH: (f64, f64) = (50., 100.);
    pub const PLATFORM_MARGIN: f64 = 50.;
    pub const PLATFORM_BAND: (f64, f64) = (0.1, 0.4);
    pub const SMOOTHING: bool = true;
    pub const RANDOM_PLATFORM_START: bool = false;
}

/// Terrain generation parameters. Elevation-like values are fractions of the
/// domain height, horizontal sizes of features are fractions of the sample
/// count, platform sizes are meters.
#[derive(Clone, Debug)]
pub struct GroundSettings {
    pub resolution: f64,
    pub floor: f64,
    pub ceiling: f64,
    pub base_level: f64,
    pub harmonics: Vec<(f64, f64)>,
    pub noise: f64,
    pub feature_count: (usize, usize),
    pub feature_half_width: (f64, f64),
    pub feature_strength: (f64, f64),
    pub platform_width: (f64, f64),
    pub platform_margin: f64,
    pub platform_band: (f64, f64),
    pub smoothing: bool,
    /// Start the platform search at a random admissible index instead of
    /// the leftmost one.
    pub random_platform_start: bool,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            resolution: defaults::RESOLUTION,
            floor: defaults::FLOOR,
            ceiling: defaults::CEILING,
            base_level: defaults::BASE_LEVEL,
            harmonics: defaults::HARMONICS.to_vec(),
            noise: defaults::NOISE,
            feature_count: defaults::FEATURE_COUNT,
            feature_half_width: defaults::FEATURE_HALF_WIDTH,
            feature_strength: defaults::FEATURE_STRENGTH,
            platform_width: defaults::PLATFORM_WIDTH,
            platform_margin: defaults::PLATFORM_MARGIN,
            platform_band: defaults::PLATFORM_BAND,
            smoothing: defaults::SMOOTHING,
            random_platform_start: defaults::RANDOM_PLATFORM_START,
        }
    }
}

impl GroundSettings {
    pub fn with_resolution(self, resolution: f64) -> Self {
        assert!(resolution > 0.);
        Self { resolution, ..self }
    }

    pub fn with_limits(self, floor: f64, ceiling: f64) -> Self {
        assert!(floor < ceiling);
        Self {
            floor,
            ceiling,
            ..self
        }
    }

    pub fn with_base_level(self, base_level: f64) -> Self {
        Self { base_level, ..self }
    }

    pub fn with_harmonics(self, harmonics: Vec<(f64, f64)>) -> Self {
        Self { harmonics, ..self }
    }

    pub fn with_noise(self, noise: f64) -> Self {
        Self { noise, ..self }
    }

    pub fn with_feature_count(self, min: usize, max: usize) -> Self {
        assert!(min <= max);
        Self {
            feature_count: (min, max),
            ..self
        }
    }

    pub fn with_platform_width(self, min: f64, max: f64) -> Self {
        assert!(min <= max);
        Self {
            platform_width: (min, max),
            ..self
        }
    }

    pub fn with_platform_margin(self, platform_margin: f64) -> Self {
        Self {
            platform_margin,
            ..self
        }
    }

    pub fn with_platform_band(self, low: f64, high: f64) -> Self {
        assert!(low <= high);
        Self {
            platform_band: (low, high),
            ..self
        }
    }

    pub fn with_smoothing(self, smoothing: bool) -> Self {
        Self { smoothing, ..self }
    }

    pub fn with_random_platform_start(self, random_platform_start: bool) -> Self {
        Self {
            random_platform_start,
            ..self
        }
    }
}

/// The flattened landing zone.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Platform {
    center: f64,
    width: f64,
    height: f64,
}

impl Platform {
    pub fn new(center: f64, width: f64, height: f64) -> Self {
        Self {
            center,
            width,
            height,
        }
    }

    pub fn center(&self) -> f64 {
        self.center
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn left(&self) -> f64 {
        self.center - self.width / 2.
    }

    pub fn right(&self) -> f64 {
        self.center + self.width / 2.
    }

    fn spans(&self, x: f64) -> bool {
        (x - self.center).abs() <= self.width / 2.
    }

    /// Whole footprint inside, partial overlap does not count.
    pub fn contains(&self, center_x: f64, width: f64) -> bool {
        center_x - width / 2. >= self.left() && center_x + width / 2. <= self.right()
    }
}

/// Lunar surface: uniformly spaced elevation samples over `[0, width)` and
/// one flat platform.
#[derive(Clone, Debug)]
pub struct Ground {
    bounds: Bounds,
    samples: Vec<f64>,
    platform: Platform,
    floor: f64,
    ceiling: f64,
    settings: GroundSettings,
}

fn sample_x(index: usize, count: usize, width: f64) -> f64 {
    index as f64 / count as f64 * width
}

impl Ground {
    pub fn generate(bounds: Bounds, settings: GroundSettings, rng: &mut impl Rng) -> Self {
        let count = ((bounds.width() * settings.resolution).round() as usize).max(1);
        let floor = settings.floor * bounds.height();
        let ceiling = settings.ceiling * bounds.height();

        let mut samples = base_profile(count, bounds.height(), floor, ceiling, &settings, rng);
        inject_features(&mut samples, floor, ceiling, &settings, rng);
        let platform = carve_platform(&mut samples, bounds, &settings, rng);
        if settings.smoothing {
            smooth(&mut samples, |i| platform.spans(sample_x(i, count, bounds.width())));
        }

        tracing::debug!(
            samples = count,
            platform_center = platform.center(),
            platform_width = platform.width(),
            platform_height = platform.height(),
            "terrain generated"
        );

        Self {
            bounds,
            samples,
            platform,
            floor,
            ceiling,
            settings,
        }
    }

    /// Ground from explicit samples. Samples under the platform are forced to
    /// its height.
    pub fn from_samples(
        bounds: Bounds,
        settings: GroundSettings,
        mut samples: Vec<f64>,
        platform: Platform,
    ) -> Self {
        assert!(!samples.is_empty(), "ground needs at least one sample");
        let count = samples.len();
        samples
            .iter_mut()
            .enumerate()
            .filter(|(i, _)| platform.spans(sample_x(*i, count, bounds.width())))
            .for_each(|(_, s)| *s = platform.height());
        Self {
            bounds,
            samples,
            platform,
            floor: settings.floor * bounds.height(),
            ceiling: settings.ceiling * bounds.height(),
            settings,
        }
    }

    /// Throws the current surface away and generates a new one.
    pub fn reset(&mut self, bounds: Bounds, rng: &mut impl Rng) {
        *self = Self::generate(bounds, self.settings.clone(), rng);
    }

    pub fn elevation_at(&self, x: f64) -> f64 {
        self.samples[self.index_of(x)]
    }

    /// Height of `position` above the surface directly below it.
    pub fn altitude_of(&self, position: &Position) -> f64 {
        position.y() - self.elevation_at(position.x())
    }

    pub fn on_platform(&self, center_x: f64, width: f64) -> bool {
        self.platform.contains(center_x, width)
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_x(&self, index: usize) -> f64 {
        sample_x(index, self.samples.len(), self.bounds.width())
    }

    pub fn iter_points(&self) -> impl Iterator<Item = Position> + '_ {
        self.samples
            .iter()
            .enumerate()
            .map(|(i, &y)| Position::new(self.sample_x(i), y))
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn ceiling(&self) -> f64 {
        self.ceiling
    }

    fn index_of(&self, x: f64) -> usize {
        let count = self.samples.len();
        let index = (x / self.bounds.width() * count as f64).round();
        index.clamp(0., (count - 1) as f64) as usize
    }
}

fn base_profile(
    count: usize,
    height: f64,
    floor: f64,
    ceiling: f64,
    settings: &GroundSettings,
    rng: &mut impl Rng,
) -> Vec<f64> {
    let harmonics: Vec<_> = settings
        .harmonics
        .iter()
        .map(|&(cycles, amplitude)| (cycles, amplitude * height, rng.gen_range(0. ..TAU)))
        .collect();
    let noise = settings.noise * height;

    (0..count)
        .map(|i| {
            let u = i as f64 / count as f64;
            let macro_shape: f64 = harmonics
                .iter()
                .map(|(cycles, amplitude, phase)| amplitude * (TAU * cycles * u + phase).sin())
                .sum();
            let roughness = if noise > 0. {
                rng.gen_range(-noise..=noise)
            } else {
                0.
            };
            (settings.base_level * height + macro_shape + roughness).clamp(floor, ceiling)
        })
        .collect()
}

/// Peaks pull samples towards the ceiling, valleys towards the floor, with a
/// linear falloff from the feature center.
fn inject_features(
    samples: &mut [f64],
    floor: f64,
    ceiling: f64,
    settings: &GroundSettings,
    rng: &mut impl Rng,
) {
    let count = samples.len();
    let (min_features, max_features) = settings.feature_count;
    let (min_half_width, max_half_width) = settings.feature_half_width;
    let (min_strength, max_strength) = settings.feature_strength;

    for _ in 0..rng.gen_range(min_features..=max_features) {
        let center = rng.gen_range(0..count) as f64;
        let half_width = (rng.gen_range(min_half_width..=max_half_width) * count as f64).max(1.);
        let strength = rng.gen_range(min_strength..=max_strength);
        let peak = rng.gen_bool(0.5);

        let first = (center - half_width).floor().max(0.) as usize;
        let last = ((center + half_width).ceil() as usize).min(count - 1);
        for (i, sample) in samples.iter_mut().enumerate().take(last + 1).skip(first) {
            let weight = 1. - (i as f64 - center).abs() / half_width;
            if weight <= 0. {
                continue;
            }
            let shift = if peak {
                weight * strength * (ceiling - *sample)
            } else {
                -weight * strength * (*sample - floor)
            };
            *sample = (*sample + shift).clamp(floor, ceiling);
        }
    }
}

/// Picks the first admissible sample in the acceptable elevation band, then
/// flattens the platform window to that sample's elevation. The scan runs
/// left to right, or from a random admissible index with wrap-around when
/// `random_platform_start` is set. Falls back to the domain midpoint.
fn carve_platform(
    samples: &mut [f64],
    bounds: Bounds,
    settings: &GroundSettings,
    rng: &mut impl Rng,
) -> Platform {
    let count = samples.len();
    let (min_width, max_width) = settings.platform_width;
    let width = rng.gen_range(min_width..=max_width);
    let (band_low, band_high) = (
        settings.platform_band.0 * bounds.height(),
        settings.platform_band.1 * bounds.height(),
    );

    let to_index = |x: f64| x / bounds.width() * count as f64;
    let lowest = to_index(settings.platform_margin + width / 2.).ceil().max(0.) as usize;
    let highest = to_index(bounds.width() - settings.platform_margin - width / 2.)
        .floor()
        .min((count - 1) as f64);

    let found = if highest >= 0. && lowest as f64 <= highest {
        let highest = highest as usize;
        let start = if settings.random_platform_start {
            rng.gen_range(lowest..=highest)
        } else {
            lowest
        };
        (start..=highest)
            .chain(lowest..start)
            .find(|&i| (band_low..=band_high).contains(&samples[i]))
    } else {
        None
    };
    let index = found.unwrap_or_else(|| {
        tracing::debug!("no platform site in elevation band, using midpoint");
        count / 2
    });

    let platform = Platform::new(
        sample_x(index, count, bounds.width()),
        width,
        samples[index],
    );
    samples
        .iter_mut()
        .enumerate()
        .filter(|(i, _)| platform.spans(sample_x(*i, count, bounds.width())))
        .for_each(|(_, s)| *s = platform.height());
    platform
}

/// Three point moving average. End samples and samples for which `keep`
/// holds are left untouched.
fn smooth(samples: &mut [f64], keep: impl Fn(usize) -> bool) {
    if samples.len() < 3 {
        return;
    }
    let original = samples.to_vec();
    for i in 1..samples.len() - 1 {
        if keep(i) {
            continue;
        }
        samples[i] = (original[i - 1] + original[i] + original[i + 1]) / 3.;
    }
}

#[cfg(test)]
mod ground_tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::simulation::physics::test_utils::*;

    fn bounds() -> Bounds {
        Bounds::new(800., 600.)
    }

    fn ground(seed: u64) -> Ground {
        Ground::generate(
            bounds(),
            GroundSettings::default(),
            &mut StdRng::seed_from_u64(seed),
        )
    }

    fn flat_ground() -> Ground {
        Ground::from_samples(
            Bounds::new(100., 100.),
            GroundSettings::default(),
            (0..10).map(|i| i as f64).collect(),
            Platform::new(50., 20., 30.),
        )
    }

    #[test]
    fn sample_count_follows_resolution() {
        assert_eq!(ground(1).samples().len(), 400);
        let fine = Ground::generate(
            bounds(),
            GroundSettings::default().with_resolution(1.),
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(fine.samples().len(), 800);
    }

    #[test]
    fn samples_within_limits() {
        let domains = [(800., 600.), (1200., 300.), (300., 900.)];
        for (seed, &(w, h)) in (0..40).zip(domains.iter().cycle()) {
            let g = Ground::generate(
                Bounds::new(w, h),
                GroundSettings::default(),
                &mut StdRng::seed_from_u64(seed),
            );
            assert_feq(g.floor(), 0.05 * h);
            assert_feq(g.ceiling(), 0.45 * h);
            for &s in g.samples() {
                assert!(s >= g.floor() && s <= g.ceiling(), "{s} out of limits");
            }
        }
    }

    #[test]
    fn samples_within_limits_without_smoothing() {
        for seed in 0..20 {
            let g = Ground::generate(
                bounds(),
                GroundSettings::default()
                    .with_smoothing(false)
                    .with_noise(0.2)
                    .with_feature_count(4, 4),
                &mut StdRng::seed_from_u64(seed),
            );
            assert!(g.samples().iter().all(|&s| s >= g.floor() && s <= g.ceiling()));
        }
    }

    #[test]
    fn platform_is_flat() {
        for seed in 0..40 {
            let g = ground(seed);
            let platform = *g.platform();
            let under: Vec<_> = g
                .iter_points()
                .filter(|p| p.x() >= platform.left() && p.x() <= platform.right())
                .collect();
            assert!(!under.is_empty());
            for p in under {
                assert_eq!(p.y(), platform.height());
            }
        }
    }

    #[test]
    fn platform_size_and_margin() {
        for seed in 0..40 {
            let platform = *ground(seed).platform();
            assert!((50.0..=100.0).contains(&platform.width()));
            assert!(platform.left() >= 50. - 1e-9);
            assert!(platform.right() <= 750. + 1e-9);
        }
    }

    #[test]
    fn platform_height_in_band() {
        for seed in 0..40 {
            let platform = *ground(seed).platform();
            assert!((60.0..=240.0).contains(&platform.height()));
        }
    }

    fn level_settings() -> GroundSettings {
        GroundSettings::default()
            .with_harmonics(Vec::new())
            .with_noise(0.)
            .with_feature_count(0, 0)
    }

    #[test]
    fn platform_takes_leftmost_site_in_band() {
        for seed in 0..5 {
            let g = Ground::generate(
                bounds(),
                level_settings(),
                &mut StdRng::seed_from_u64(seed),
            );
            let platform = *g.platform();
            assert_feq(platform.height(), 150.);
            // one sample spacing is 2 m
            let left = platform.left();
            assert!(left >= 50. - 1e-9 && left < 52., "{left}");
        }
    }

    #[test]
    fn leftmost_site_skips_out_of_band_samples() {
        let mut samples = vec![300.; 400];
        samples[250..].iter_mut().for_each(|s| *s = 100.);
        let settings = GroundSettings::default().with_platform_width(60., 60.);
        let mut rng = StdRng::seed_from_u64(1);
        let platform = carve_platform(&mut samples, bounds(), &settings, &mut rng);
        assert_feq(platform.center(), 500.);
        assert_feq(platform.height(), 100.);
    }

    #[test]
    fn random_platform_start_is_opt_in() {
        let lefts: Vec<_> = (0..5)
            .map(|seed| {
                let g = Ground::generate(
                    bounds(),
                    level_settings().with_random_platform_start(true),
                    &mut StdRng::seed_from_u64(seed),
                );
                g.platform().left()
            })
            .collect();
        assert!(lefts.iter().all(|&left| left >= 50. - 1e-9));
        assert!(lefts.iter().any(|&left| left >= 52.));
    }

    #[test]
    fn platform_falls_back_to_midpoint() {
        let g = Ground::generate(
            bounds(),
            GroundSettings::default().with_platform_band(0.9, 1.),
            &mut StdRng::seed_from_u64(3),
        );
        assert_feq(g.platform().center(), 400.);
        assert_eq!(g.elevation_at(400.), g.platform().height());
    }

    #[test]
    fn platform_falls_back_when_domain_too_narrow() {
        let g = Ground::generate(
            Bounds::new(120., 600.),
            GroundSettings::default(),
            &mut StdRng::seed_from_u64(3),
        );
        assert_feq(g.platform().center(), 60.);
    }

    #[test]
    fn elevation_lookup_rounds_and_clamps() {
        let g = flat_ground();
        assert_eq!(g.elevation_at(-50.), 0.);
        assert_eq!(g.elevation_at(0.), 0.);
        assert_eq!(g.elevation_at(14.), 1.);
        assert_eq!(g.elevation_at(16.), 2.);
        assert_eq!(g.elevation_at(89.), 9.);
        assert_eq!(g.elevation_at(1000.), 9.);
        assert_eq!(g.elevation_at(50.), 30.);
    }

    #[test]
    fn explicit_samples_are_flattened_under_platform() {
        let g = flat_ground();
        assert_eq!(g.samples(), &[0., 1., 2., 3., 30., 30., 30., 7., 8., 9.]);
    }

    #[test]
    fn altitude_is_height_above_surface() {
        let g = flat_ground();
        assert_feq(g.altitude_of(&Position::new(50., 45.)), 15.);
    }

    #[test]
    fn platform_membership_needs_full_footprint() {
        let g = flat_ground();
        assert!(g.on_platform(50., 20.));
        assert!(g.on_platform(45., 10.));
        assert!(!g.on_platform(45., 20.));
        assert!(!g.on_platform(58., 5.));
        assert!(!g.on_platform(10., 5.));
    }

    #[test]
    fn clone_is_deep() {
        let original = ground(5);
        let mut copy = original.clone();
        let before = original.samples().to_vec();
        copy.samples.iter_mut().for_each(|s| *s += 1.);
        assert_eq!(original.samples(), before.as_slice());
        assert_ne!(copy.samples(), original.samples());
    }

    #[test]
    fn same_seed_same_terrain() {
        assert_eq!(ground(9).samples(), ground(9).samples());
        assert_ne!(ground(9).samples(), ground(10).samples());
    }

    #[test]
    fn reset_replaces_terrain() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut g = Ground::generate(bounds(), GroundSettings::default(), &mut rng);
        let before = g.samples().to_vec();
        g.reset(Bounds::new(400., 300.), &mut rng);
        assert_eq!(g.samples().len(), 200);
        assert_ne!(g.samples(), before.as_slice());
        assert_eq!(g.bounds(), Bounds::new(400., 300.));
    }

    #[test]
    fn smoothing_averages_outside_kept_samples() {
        let mut samples = vec![0., 3., 0., 3., 0., 3.];
        smooth(&mut samples, |i| i == 3);
        assert_eq!(samples, vec![0., 1., 2., 3., 2., 3.]);
    }

    #[test]
    fn smoothing_is_a_toggle() {
        let rough = Ground::generate(
            bounds(),
            GroundSettings::default().with_smoothing(false),
            &mut StdRng::seed_from_u64(4),
        );
        let smooth = ground(4);
        assert_eq!(rough.platform(), smooth.platform());
        assert_ne!(rough.samples(), smooth.samples());
    }
}
