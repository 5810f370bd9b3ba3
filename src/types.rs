//! Core types shared across the modem
//!
//! The whole pipeline works on complex baseband I/Q samples:
//!
//! ```text
//!            Q (Imaginary)
//!            ^
//!            |     * (I=0.7, Q=0.7)
//!            |    /
//!            |   / magnitude = 1.0
//!            |  /  phase = 45°
//!            | /
//!   ---------+---------> I (Real)
//!            |
//! ```
//!
//! Complex samples carry both amplitude and phase, which is what lets a
//! chirp encode its symbol in the position of the frequency wrap.

use num_complex::Complex64;

/// Type alias for complex numbers using f64 precision
pub type Complex = Complex64;

/// A single I/Q sample point
pub type IQSample = Complex64;

/// A symbol value in the chirp modulation scheme
///
/// Symbols are integers from 0 to 2^SF - 1, where SF is the spreading factor.
/// Each symbol encodes SF bits of data.
pub type Symbol = u16;

/// Result type for PHY operations
pub type PhyResult<T> = Result<T, PhyError>;

/// Errors that can occur while configuring or running the modem
#[derive(Debug, Clone, thiserror::Error)]
pub enum PhyError {
    #[error("Invalid spreading factor: {0}. Must be between 7 and 12")]
    InvalidSpreadingFactor(u8),

    #[error("Invalid coding rate: {0:?}. Must be 4/5, 4/6, 4/7, or 4/8")]
    InvalidCodingRate(String),

    #[error("Buffer too short: expected {expected}, got {actual}")]
    BufferTooShort { expected: usize, actual: usize },
}

/// Helper functions for working with complex samples
pub mod complex_ops {
    use super::*;

    /// Create a complex number from magnitude and phase
    #[inline]
    pub fn from_polar(magnitude: f64, phase: f64) -> Complex {
        Complex::new(magnitude * phase.cos(), magnitude * phase.sin())
    }

    /// Compute the power (magnitude squared) of a complex number
    #[inline]
    pub fn power(c: Complex) -> f64 {
        c.norm_sqr()
    }

    /// Compute the average power of a signal
    pub fn average_power(samples: &[IQSample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().map(|s| power(*s)).sum::<f64>() / samples.len() as f64
    }
}
