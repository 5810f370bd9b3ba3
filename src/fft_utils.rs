//! FFT utilities for symbol detection
//!
//! Chirp demodulation reduces to peak finding: multiplying a received data
//! chirp by the reference down-chirp collapses it to a pure tone, and an
//! N-point FFT resolves that tone to the bin holding the symbol value.
//!
//! ```text
//! Received Chirp × Downchirp = Tone at symbol frequency
//!
//!     │ Received     │ Reference      │ Result:
//!     │   Chirp      │  Downchirp     │  Single Tone
//! f   │      /       │  \             │     |
//!     │    /         │    \           │     |
//!     │  /           │      \    =    │     |
//!     │/             │        \       │     |
//!     └──────────    └──────────      └─────┴───── f
//!                                          ^
//!                                     symbol freq
//! ```

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use std::fmt;
use std::sync::Arc;

use crate::types::IQSample;

/// FFT processor sized for one symbol
///
/// Wraps a planned rustfft instance plus its scratch buffer so repeated
/// symbol detections reuse the same allocations.
pub struct FftProcessor {
    /// FFT size
    size: usize,
    /// Forward FFT instance
    fft_forward: Arc<dyn Fft<f64>>,
    /// Scratch buffer for FFT operations
    scratch: Vec<Complex64>,
}

impl fmt::Debug for FftProcessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FftProcessor")
            .field("size", &self.size)
            .finish()
    }
}

impl FftProcessor {
    /// Create a new FFT processor for the given size
    pub fn new(size: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft_forward.get_inplace_scratch_len()];

        Self {
            size,
            fft_forward,
            scratch,
        }
    }

    /// Get the FFT size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Compute the forward FFT in-place
    pub fn fft_inplace(&mut self, buffer: &mut [Complex64]) {
        assert_eq!(buffer.len(), self.size);
        self.fft_forward
            .process_with_scratch(buffer, &mut self.scratch);
    }

    /// Compute the forward FFT, returning a new buffer
    pub fn fft(&mut self, input: &[IQSample]) -> Vec<Complex64> {
        let mut buffer: Vec<Complex64> = input.to_vec();
        buffer.resize(self.size, Complex64::new(0.0, 0.0));
        self.fft_inplace(&mut buffer);
        buffer
    }

    /// Find the peak in the FFT magnitude spectrum
    ///
    /// Strict comparison, so ties resolve to the lowest bin.
    /// Returns (bin_index, magnitude).
    pub fn find_peak(spectrum: &[Complex64]) -> (usize, f64) {
        let mut max_idx = 0;
        let mut max_mag = 0.0;

        for (i, &sample) in spectrum.iter().enumerate() {
            let mag = sample.norm();
            if mag > max_mag {
                max_mag = mag;
                max_idx = i;
            }
        }

        (max_idx, max_mag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_fft_single_tone() {
        let n = 128;
        let sample_rate = 128.0;
        let freq = 10.0; // 10 Hz tone

        let signal: Vec<Complex64> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate;
                let phase = 2.0 * PI * freq * t;
                Complex64::new(phase.cos(), phase.sin())
            })
            .collect();

        let mut processor = FftProcessor::new(n);
        let spectrum = processor.fft(&signal);

        let (peak_bin, _) = FftProcessor::find_peak(&spectrum);

        // Peak should be at bin 10 (10 Hz with 1 Hz resolution)
        assert_eq!(peak_bin, 10);
    }

    #[test]
    fn test_find_peak_tie_resolves_low() {
        let spectrum = vec![
            Complex64::new(1.0, 0.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(2.0, 0.0),
            Complex64::new(0.5, 0.0),
        ];
        let (bin, mag) = FftProcessor::find_peak(&spectrum);
        assert_eq!(bin, 1);
        assert!((mag - 2.0).abs() < 1e-12);
    }
}
