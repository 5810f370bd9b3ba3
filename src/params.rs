//! Radio profiles and modulation parameters
//!
//! A [`Profile`] bundles the knobs that define one modem configuration:
//!
//! ### Spreading Factor (SF)
//!
//! The spreading factor sets the number of chips per symbol (2^SF) and the
//! number of bits each symbol carries (SF bits). Higher SF trades data rate
//! for sensitivity:
//!
//! | SF | Chips/Symbol | Bits/Symbol |
//! |----|--------------|-------------|
//! | 7  | 128          | 7           |
//! | 8  | 256          | 8           |
//! | 9  | 512          | 9           |
//! | 10 | 1024         | 10          |
//! | 11 | 2048         | 11          |
//! | 12 | 4096         | 12          |
//!
//! ### Coding Rate (CR)
//!
//! Forward error correction adds redundancy per 4-bit nibble:
//! - CR 4/5: single parity bit, detect only
//! - CR 4/6: two parity bits, detect only
//! - CR 4/7: Hamming, corrects single bit errors
//! - CR 4/8: Hamming, corrects single bit errors and flags double errors

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::PhyError;

/// Spreading factor for chirp modulation
///
/// Determines the number of chips per symbol (2^SF) and the number of
/// bits encoded per symbol (SF bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpreadingFactor {
    SF7 = 7,
    SF8 = 8,
    SF9 = 9,
    SF10 = 10,
    SF11 = 11,
    SF12 = 12,
}

impl SpreadingFactor {
    /// Create a spreading factor from a raw value
    pub fn from_u8(value: u8) -> Result<Self, PhyError> {
        match value {
            7 => Ok(Self::SF7),
            8 => Ok(Self::SF8),
            9 => Ok(Self::SF9),
            10 => Ok(Self::SF10),
            11 => Ok(Self::SF11),
            12 => Ok(Self::SF12),
            _ => Err(PhyError::InvalidSpreadingFactor(value)),
        }
    }

    /// Get the raw value
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Number of chips (baseband samples) per symbol
    ///
    /// This is 2^SF. For SF7, there are 128 chips per symbol.
    pub fn chips_per_symbol(&self) -> usize {
        1 << self.value()
    }

    /// Number of bits encoded per symbol
    pub fn bits_per_symbol(&self) -> usize {
        self.value() as usize
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.value())
    }
}

impl Default for SpreadingFactor {
    fn default() -> Self {
        Self::SF7
    }
}

/// Coding rate for forward error correction
///
/// The rate 4/(4+CR) gives the ratio of data bits to coded bits. Each 4-bit
/// nibble expands to a 5, 6, 7, or 8 bit codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodingRate {
    /// 4/5 - single parity bit
    Cr4_5 = 1,
    /// 4/6 - two parity bits
    Cr4_6 = 2,
    /// 4/7 - Hamming(7,4)
    Cr4_7 = 3,
    /// 4/8 - Hamming(8,4)
    Cr4_8 = 4,
}

impl CodingRate {
    /// Get the number of redundant bits per nibble
    pub fn value(&self) -> u8 {
        *self as u8
    }

    /// Width of one codeword in bits (4 data bits plus redundancy)
    pub fn codeword_bits(&self) -> usize {
        4 + self.value() as usize
    }

    /// Get the coding rate as a fraction
    pub fn rate(&self) -> f64 {
        4.0 / (4.0 + self.value() as f64)
    }
}

impl FromStr for CodingRate {
    type Err = PhyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4/5" => Ok(Self::Cr4_5),
            "4/6" => Ok(Self::Cr4_6),
            "4/7" => Ok(Self::Cr4_7),
            "4/8" => Ok(Self::Cr4_8),
            _ => Err(PhyError::InvalidCodingRate(s.to_string())),
        }
    }
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "4/{}", 4 + self.value())
    }
}

impl Default for CodingRate {
    fn default() -> Self {
        Self::Cr4_8
    }
}

/// One named modem configuration
///
/// Profiles are validated at construction and immutable afterwards. Sweep
/// configurations typically carry a list of these, one per radio setting
/// under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Human-readable identifier, carried through to sweep results
    pub name: String,
    /// Spreading factor (7-12)
    pub sf: SpreadingFactor,
    /// Channel bandwidth in Hz (informational at 1x oversampling)
    pub bandwidth_hz: u32,
    /// FEC coding rate
    pub cr: CodingRate,
}

impl Profile {
    /// Build a profile from raw values, validating SF and coding rate
    pub fn new(name: impl Into<String>, sf: u8, bandwidth_hz: u32, cr: &str) -> Result<Self, PhyError> {
        Ok(Self {
            name: name.into(),
            sf: SpreadingFactor::from_u8(sf)?,
            bandwidth_hz,
            cr: cr.parse()?,
        })
    }

    /// Number of baseband samples per symbol
    pub fn samples_per_symbol(&self) -> usize {
        self.sf.chips_per_symbol()
    }

    /// Symbol duration in seconds at the configured bandwidth
    pub fn symbol_duration(&self) -> f64 {
        self.sf.chips_per_symbol() as f64 / self.bandwidth_hz as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chips_per_symbol() {
        assert_eq!(SpreadingFactor::SF7.chips_per_symbol(), 128);
        assert_eq!(SpreadingFactor::SF9.chips_per_symbol(), 512);
        assert_eq!(SpreadingFactor::SF12.chips_per_symbol(), 4096);
    }

    #[test]
    fn test_sf_rejects_out_of_range() {
        assert!(SpreadingFactor::from_u8(6).is_err());
        assert!(SpreadingFactor::from_u8(13).is_err());
        assert!(SpreadingFactor::from_u8(0).is_err());
    }

    #[test]
    fn test_coding_rate_parse() {
        assert_eq!("4/5".parse::<CodingRate>().unwrap(), CodingRate::Cr4_5);
        assert_eq!("4/8".parse::<CodingRate>().unwrap(), CodingRate::Cr4_8);
        assert!("4/9".parse::<CodingRate>().is_err());
        assert!("".parse::<CodingRate>().is_err());
    }

    #[test]
    fn test_codeword_bits() {
        assert_eq!(CodingRate::Cr4_5.codeword_bits(), 5);
        assert_eq!(CodingRate::Cr4_6.codeword_bits(), 6);
        assert_eq!(CodingRate::Cr4_7.codeword_bits(), 7);
        assert_eq!(CodingRate::Cr4_8.codeword_bits(), 8);
    }

    #[test]
    fn test_profile_validation() {
        let p = Profile::new("eu_sf7", 7, 125_000, "4/8").unwrap();
        assert_eq!(p.samples_per_symbol(), 128);
        assert_eq!(p.cr, CodingRate::Cr4_8);

        assert!(Profile::new("bad_sf", 5, 125_000, "4/8").is_err());
        assert!(Profile::new("bad_cr", 7, 125_000, "3/4").is_err());
    }

    #[test]
    fn test_symbol_duration() {
        let p = Profile::new("eu_sf7", 7, 125_000, "4/5").unwrap();
        // 128 chips / 125000 Hz = 1.024 ms
        assert!((p.symbol_duration() - 0.001024).abs() < 1e-12);
    }

    #[test]
    fn test_display() {
        assert_eq!(SpreadingFactor::SF10.to_string(), "SF10");
        assert_eq!(CodingRate::Cr4_6.to_string(), "4/6");
    }
}
