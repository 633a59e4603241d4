//! # Height Noise
//!
//! Smooth, deterministic ground height along the horizontal axis.
//!
//! ## How it works
//!
//! Construction draws seven coefficients from a seeded ChaCha stream:
//! three (factor, frequency) pairs from a table of oscillation factors and one
//! overall sign/scale. Sampling sums three sine waves, one with a plain
//! frequency, one scaled by `e` and one by `π`, so the sum never repeats
//! within any practical distance.
//!
//! ## Determinism Guarantee
//!
//! Given the same `WorldSeed`, amplitude and wavelength, a `HeightNoise`
//! returns bit-identical values for the same `x`, in any instance,
//! at any time.

use std::f64::consts::{E, PI};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Key for a per-column generator: the column's world x plus the seed.
    ///
    /// Every decision taken for a column reseeds from this key, so the
    /// column regenerates identically after eviction.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn column(self, x: i64) -> u64 {
        self.0.wrapping_add(x as u64)
    }

    /// Creates a generator for the column at world `x`.
    #[must_use]
    pub fn column_rng(self, x: i64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.column(x))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(100)
    }
}

/// Anything that can answer "where is the ground at x".
pub trait HeightField {
    /// Ground height (y, growing downward) at world `x`.
    fn height_at(&self, x: f32) -> f32;
}

impl<F> HeightField for F
where
    F: Fn(f32) -> f32,
{
    fn height_at(&self, x: f32) -> f32 {
        self(x)
    }
}

/// Oscillation factors. Each sine term draws a factor and a frequency scale from here.
const OSCILLATION_TABLE: &[f64] = &[
    -1.5, -1.4, -1.3, -1.2, -1.2, -1.1, -1.0, -0.9, -0.8, -0.7, -0.6, //
    1.5, 1.4, 1.3, 1.2, 1.2, 1.1, 1.0, 0.9, 0.8, 0.7, 0.6,
];

/// Overall sign/scale of the summed waves, as a fraction of half the amplitude.
const TOTAL_SCALE_TABLE: &[f64] = &[-0.1, 0.1];

/// Wavelength reference: the raw waves cover roughly this many radians per wavelength.
const RANGE_NOISE: f64 = 10.0;

/// Default baseline, as a multiple of the amplitude.
pub const DEFAULT_BASELINE_FACTOR: f64 = 1.1;

/// One sine term: `factor * sin(frequency * x)`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Wave {
    factor: f64,
    frequency: f64,
}

impl Wave {
    #[inline]
    fn sample(self, x: f64) -> f64 {
        self.factor * (self.frequency * x).sin()
    }
}

/// Smooth 1D height noise.
///
/// # Example
///
/// ```rust,ignore
/// let noise = HeightNoise::new(WorldSeed::new(42), 600.0, 1600.0);
/// let y = noise.sample(120.0);
/// assert_eq!(y, HeightNoise::new(WorldSeed::new(42), 600.0, 1600.0).sample(120.0));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HeightNoise {
    /// Height of the midline the waves oscillate around.
    baseline: f64,
    /// Signed scale applied to the summed waves.
    total: f64,
    /// Plain, e-scaled and π-scaled terms.
    waves: [Wave; 3],
}

impl HeightNoise {
    /// Creates height noise with the default baseline factor.
    ///
    /// # Arguments
    ///
    /// * `seed` - World seed
    /// * `amplitude` - Reference height; the baseline sits at 1.1x this value
    /// * `wavelength` - Horizontal reference length (typically the viewport width)
    #[must_use]
    pub fn new(seed: WorldSeed, amplitude: f64, wavelength: f64) -> Self {
        Self::with_baseline(seed, amplitude, wavelength, DEFAULT_BASELINE_FACTOR)
    }

    /// Creates height noise with an explicit baseline factor.
    #[must_use]
    pub fn with_baseline(seed: WorldSeed, amplitude: f64, wavelength: f64, baseline_factor: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        let to_range = if wavelength.abs() > f64::EPSILON {
            RANGE_NOISE / wavelength
        } else {
            RANGE_NOISE
        };

        let mut draw = |table: &[f64]| table[rng.gen_range(0..table.len())];

        let e_factor = draw(OSCILLATION_TABLE);
        let e_frequency = draw(OSCILLATION_TABLE) * to_range * E;
        let pi_factor = draw(OSCILLATION_TABLE);
        let pi_frequency = draw(OSCILLATION_TABLE) * to_range * PI;
        let plain_factor = draw(OSCILLATION_TABLE);
        let plain_frequency = draw(OSCILLATION_TABLE) * to_range;
        let total = draw(TOTAL_SCALE_TABLE) * amplitude / 2.0;

        Self {
            baseline: baseline_factor * amplitude,
            total,
            waves: [
                Wave { factor: plain_factor, frequency: plain_frequency },
                Wave { factor: e_factor, frequency: e_frequency },
                Wave { factor: pi_factor, frequency: pi_frequency },
            ],
        }
    }

    /// Samples the height at `x`.
    #[must_use]
    pub fn sample(&self, x: f64) -> f64 {
        let sum: f64 = self.waves.iter().map(|wave| wave.sample(x)).sum();
        self.baseline + self.total * sum
    }

    /// Returns the midline height.
    #[must_use]
    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    /// Largest possible distance from the midline.
    #[must_use]
    pub fn max_deviation(&self) -> f64 {
        self.total.abs() * self.waves.iter().map(|wave| wave.factor.abs()).sum::<f64>()
    }
}

impl HeightField for HeightNoise {
    #[allow(clippy::cast_possible_truncation)]
    fn height_at(&self, x: f32) -> f32 {
        self.sample(f64::from(x)) as f32
    }
}
