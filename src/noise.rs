// src/noise.rs
//! Gaussian noise over embedding matrices. Independent of the mutation engine.

use crate::error::{AdversaError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

/// Adds `N(0, noise_level^2)` to every element, preserving shape.
///
/// # Errors
/// `InvalidNoiseLevel` if `noise_level` is negative or not finite.
pub fn add_noise<R: Rng + ?Sized>(
    matrix: &[Vec<f64>],
    noise_level: f64,
    rng: &mut R,
) -> Result<Vec<Vec<f64>>> {
    if !noise_level.is_finite() || noise_level < 0.0 {
        return Err(AdversaError::InvalidNoiseLevel(noise_level));
    }
    if noise_level == 0.0 {
        return Ok(matrix.to_vec());
    }
    Ok(matrix
        .iter()
        .map(|row| {
            row.iter()
                .map(|x| x + noise_level * standard_normal(rng))
                .collect()
        })
        .collect())
}

/// [`add_noise`] with a fresh generator seeded from `seed`.
///
/// # Errors
/// `InvalidNoiseLevel` if `noise_level` is negative or not finite.
pub fn add_noise_seeded(matrix: &[Vec<f64>], noise_level: f64, seed: u64) -> Result<Vec<Vec<f64>>> {
    add_noise(matrix, noise_level, &mut StdRng::seed_from_u64(seed))
}

// Box-Muller; u1 is drawn from (0, 1] so ln never sees zero.
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_preserved() {
        let matrix = vec![vec![1.0, 2.0, 3.0], vec![], vec![4.0]];
        let noisy = add_noise_seeded(&matrix, 0.5, 1).expect("noise");
        let shape: Vec<usize> = noisy.iter().map(Vec::len).collect();
        assert_eq!(shape, vec![3, 0, 1]);
    }

    #[test]
    fn test_zero_level_is_identity() {
        let matrix = vec![vec![0.25, -1.5]];
        assert_eq!(add_noise_seeded(&matrix, 0.0, 9).expect("noise"), matrix);
    }

    #[test]
    fn test_invalid_levels_rejected() {
        for level in [-0.1, f64::NAN, f64::INFINITY] {
            let err = add_noise_seeded(&[vec![1.0]], level, 0).expect_err("invalid");
            assert_eq!(err.category(), "invalid_noise_level");
        }
    }

    #[test]
    fn test_moments_roughly_match() {
        let matrix = vec![vec![0.0; 20_000]];
        let noisy = add_noise_seeded(&matrix, 2.0, 42).expect("noise");
        let values = &noisy[0];
        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        assert!(mean.abs() < 0.1, "mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.1, "std {}", var.sqrt());
    }

    #[test]
    fn test_same_seed_same_noise() {
        let matrix = vec![vec![1.0, 2.0]];
        assert_eq!(
            add_noise_seeded(&matrix, 1.0, 5).expect("noise"),
            add_noise_seeded(&matrix, 1.0, 5).expect("noise")
        );
    }
}
