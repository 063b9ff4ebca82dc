//! Seeded 2D noise fields backed by FastNoiseLite
//!
//! Every field is a pure function of (seed, x, z). Fields carry no state that
//! depends on call order, so a chunk rebuilt at the same coordinates always
//! sees the same values.

use std::fmt;

use fastnoise_lite::{FastNoiseLite, NoiseType};

/// One independently seeded OpenSimplex2 field, sampled in raw units.
///
/// Frequency is fixed at 1.0; callers scale coordinates themselves so the
/// same field can be read at several frequencies.
pub struct NoiseField {
    noise: FastNoiseLite,
    seed: u32,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let mut noise = FastNoiseLite::with_seed(seed as i32);
        noise.set_noise_type(Some(NoiseType::OpenSimplex2));
        noise.set_frequency(Some(1.0));
        NoiseField { noise, seed }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Continuous value in [-1, 1].
    #[inline]
    pub fn sample(&self, x: f32, z: f32) -> f32 {
        self.noise.get_noise_2d(x, z).clamp(-1.0, 1.0)
    }

    /// Sums `octaves` layers, each at `lacunarity` times the previous
    /// frequency and `persistence` times the previous amplitude, normalised
    /// by the total amplitude so the result stays in [-1, 1].
    pub fn fractal(
        &self,
        x: f32,
        z: f32,
        base_scale: f32,
        octaves: u32,
        persistence: f32,
        lacunarity: f32,
    ) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = base_scale;
        let mut max_value = 0.0;

        for _ in 0..octaves {
            total += self.sample(x * frequency, z * frequency) * amplitude;
            max_value += amplitude;
            amplitude *= persistence;
            frequency *= lacunarity;
        }

        if max_value > 0.0 { total / max_value } else { 0.0 }
    }
}

// Rebuilding from the seed yields an identical field
impl Clone for NoiseField {
    fn clone(&self) -> Self {
        NoiseField::new(self.seed)
    }
}

impl fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseField").field("seed", &self.seed).finish()
    }
}

/// The full set of independent fields used by terrain and placement.
///
/// Each field gets its own seed offset so that, for example, tree density is
/// uncorrelated with rock density.
#[derive(Debug, Clone)]
pub struct NoiseBank {
    pub terrain: NoiseField,
    pub tree: NoiseField,
    pub vegetation: NoiseField,
    pub jitter: NoiseField,
    pub dirt: NoiseField,
    pub rock: NoiseField,
    pub stream: NoiseField,
    pub stream_warp: NoiseField,
    pub collectible: NoiseField,
    pub mountain: NoiseField,
    pub mountain_warp: NoiseField,
    pub mountain_detail: NoiseField,
    pub log: NoiseField,
    pub cottage: NoiseField,
    seed: u32,
}

impl NoiseBank {
    pub const FIELD_COUNT: usize = 14;

    pub fn new(seed: u32) -> Self {
        NoiseBank {
            terrain: NoiseField::new(seed),
            tree: NoiseField::new(seed.wrapping_add(1)),
            vegetation: NoiseField::new(seed.wrapping_add(2)),
            jitter: NoiseField::new(seed.wrapping_add(3)),
            dirt: NoiseField::new(seed.wrapping_add(4)),
            rock: NoiseField::new(seed.wrapping_add(5)),
            stream: NoiseField::new(seed.wrapping_add(6)),
            stream_warp: NoiseField::new(seed.wrapping_add(7)),
            collectible: NoiseField::new(seed.wrapping_add(8)),
            mountain: NoiseField::new(seed.wrapping_add(9)),
            mountain_warp: NoiseField::new(seed.wrapping_add(10)),
            mountain_detail: NoiseField::new(seed.wrapping_add(11)),
            log: NoiseField::new(seed.wrapping_add(12)),
            cottage: NoiseField::new(seed.wrapping_add(13)),
            seed,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn fields(&self) -> [&NoiseField; Self::FIELD_COUNT] {
        [
            &self.terrain,
            &self.tree,
            &self.vegetation,
            &self.jitter,
            &self.dirt,
            &self.rock,
            &self.stream,
            &self.stream_warp,
            &self.collectible,
            &self.mountain,
            &self.mountain_warp,
            &self.mountain_detail,
            &self.log,
            &self.cottage,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..200 {
            let x = i as f32 * 3.7 - 250.0;
            let z = i as f32 * -1.3 + 80.0;
            assert_eq!(a.sample(x, z).to_bits(), b.sample(x, z).to_bits());
        }
    }

    #[test]
    fn test_samples_stay_in_range() {
        let field = NoiseField::new(9);
        for i in 0..500 {
            let v = field.sample(i as f32 * 0.37, i as f32 * -0.61);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_fractal_is_normalised() {
        let field = NoiseField::new(3);
        for i in 0..300 {
            let v = field.fractal(i as f32 * 5.1, i as f32 * 2.9, 0.008, 4, 0.45, 2.2);
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_fields_are_independent() {
        let bank = NoiseBank::new(42);
        let x = 123.4;
        let z = -56.7;
        let tree = bank.tree.sample(x * 0.05, z * 0.05);
        let rock = bank.rock.sample(x * 0.05, z * 0.05);
        assert_ne!(tree.to_bits(), rock.to_bits());

        let seeds: Vec<u32> = bank.fields().iter().map(|f| f.seed()).collect();
        let mut unique = seeds.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), NoiseBank::FIELD_COUNT);
    }

    #[test]
    fn test_clone_reproduces_field() {
        let field = NoiseField::new(1234);
        let copy = field.clone();
        assert_eq!(field.sample(17.5, -3.25), copy.sample(17.5, -3.25));
    }
}
