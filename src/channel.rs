//! AWGN channel model
//!
//! Adds complex white Gaussian noise to a transmit waveform. Chirps are
//! unit power, so the SNR convention is relative to a unit-power signal:
//!
//! ```text
//! noise power  = 10^(-snr_db/10)
//! σ per branch = 10^(-snr_db/20) / √2
//! ```
//!
//! with the power split evenly between the I and Q branches.
//!
//! The generator is always supplied by the caller. Reproducible runs seed
//! an [`rand::rngs::StdRng`]; the sweep engine derives one per simulation
//! cell so results are independent of worker scheduling.

use rand::Rng;
use rand_distr::StandardNormal;

use crate::types::{Complex, IQSample};

/// Per-branch noise standard deviation for an SNR relative to unit power
pub fn noise_sigma(snr_db: f64) -> f64 {
    10f64.powf(-snr_db / 20.0) / std::f64::consts::SQRT_2
}

/// Add white Gaussian noise to a waveform, returning the noisy copy
pub fn apply_awgn<R: Rng>(samples: &[IQSample], snr_db: f64, rng: &mut R) -> Vec<IQSample> {
    let sigma = noise_sigma(snr_db);
    samples
        .iter()
        .map(|&s| {
            let re: f64 = rng.sample(StandardNormal);
            let im: f64 = rng.sample(StandardNormal);
            s + Complex::new(re * sigma, im * sigma)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::complex_ops;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_noise_sigma_values() {
        // 0 dB: unit noise power, sigma = 1/sqrt(2) per branch
        assert!((noise_sigma(0.0) - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
        // 20 dB: noise power 0.01
        assert!((noise_sigma(20.0) - 0.1 / std::f64::consts::SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_output_length_and_perturbation() {
        let mut rng = StdRng::seed_from_u64(1);
        let clean = vec![Complex::new(1.0, 0.0); 256];
        let noisy = apply_awgn(&clean, 10.0, &mut rng);
        assert_eq!(noisy.len(), 256);
        assert!(noisy.iter().zip(clean.iter()).any(|(a, b)| a != b));
    }

    #[test]
    fn test_noise_power_matches_snr() {
        let mut rng = StdRng::seed_from_u64(42);
        let clean = vec![Complex::new(0.0, 0.0); 100_000];
        let noisy = apply_awgn(&clean, 0.0, &mut rng);
        // At 0 dB the total noise power should be ~1.0
        let power = complex_ops::average_power(&noisy);
        assert!((power - 1.0).abs() < 0.05, "noise power {power}");
    }

    #[test]
    fn test_same_seed_same_noise() {
        let clean = vec![Complex::new(1.0, -0.5); 64];
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a = apply_awgn(&clean, 5.0, &mut rng1);
        let b = apply_awgn(&clean, 5.0, &mut rng2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seeds_differ() {
        let clean = vec![Complex::new(1.0, 0.0); 64];
        let mut rng1 = StdRng::seed_from_u64(1);
        let mut rng2 = StdRng::seed_from_u64(2);
        assert_ne!(
            apply_awgn(&clean, 5.0, &mut rng1),
            apply_awgn(&clean, 5.0, &mut rng2)
        );
    }
}
