//! Transmit chain: payload bytes to chirped waveform
//!
//! ```text
//! Raw Data
//!    │
//!    ▼
//! ┌─────────────┐
//! │   Nibbles   │  Split bytes, high nibble first
//! └─────────────┘
//!    │
//!    ▼
//! ┌─────────────┐
//! │  FEC Encode │  One codeword per nibble (5-8 bits per CR)
//! └─────────────┘
//!    │
//!    ▼
//! ┌─────────────┐
//! │ Symbol Pack │  Bit stream into SF-bit symbols
//! └─────────────┘
//!    │
//!    ▼
//! ┌─────────────┐
//! │  CSS Mod    │  Preamble + sync + one data chirp per symbol
//! └─────────────┘
//!    │
//!    ▼
//! I/Q Samples (Complex Baseband)
//! ```
//!
//! A frame is 10 un-shifted up-chirps (preamble), 2 un-shifted down-chirps
//! (sync), then the data chirps. The output is complex baseband ready for
//! the channel model or an SDR sink.

use std::sync::Arc;

use crate::bits;
use crate::chirp::ChirpPair;
use crate::fec;
use crate::params::Profile;
use crate::types::{IQSample, Symbol};

/// Up-chirps at the start of every frame
pub const PREAMBLE_CHIRPS: usize = 10;
/// Down-chirps between the preamble and the data region
pub const SYNC_CHIRPS: usize = 2;

/// A modulated frame with its intermediate representations
///
/// Useful for tests and analysis tools that want to compare transmitted
/// and received state at each pipeline stage.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Original payload bytes
    pub payload: Vec<u8>,
    /// FEC-encoded bit stream
    pub bits: Vec<u8>,
    /// Packed SF-bit symbols
    pub symbols: Vec<Symbol>,
    /// Complete baseband waveform (preamble + sync + data)
    pub samples: Vec<IQSample>,
}

/// Chirp modulator for one profile
#[derive(Debug, Clone)]
pub struct Modulator {
    profile: Profile,
    chirps: Arc<ChirpPair>,
}

impl Modulator {
    /// Create a modulator for a profile
    pub fn new(profile: Profile) -> Self {
        let chirps = ChirpPair::shared(profile.sf);
        Self { profile, chirps }
    }

    /// Get the profile
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Encode a payload into its FEC bit stream
    ///
    /// Each byte splits into two nibbles (high first); each nibble encodes
    /// to one codeword, appended to the stream LSB-first.
    pub fn encode_bits(&self, payload: &[u8]) -> Vec<u8> {
        let cr = self.profile.cr;
        let codewords: Vec<u8> = bits::bytes_to_nibbles(payload)
            .iter()
            .map(|&n| fec::encode_nibble(cr, n))
            .collect();
        bits::codewords_to_bits(&codewords, cr.codeword_bits())
    }

    /// Get the data symbols for a payload
    pub fn symbols(&self, payload: &[u8]) -> Vec<Symbol> {
        bits::bits_to_symbols(&self.encode_bits(payload), self.profile.sf.bits_per_symbol())
    }

    /// Modulate a payload into a complete baseband frame
    pub fn modulate(&self, payload: &[u8]) -> Vec<IQSample> {
        self.frame(payload).samples
    }

    /// Modulate a payload, keeping the intermediate representations
    pub fn frame(&self, payload: &[u8]) -> Frame {
        let bits = self.encode_bits(payload);
        let symbols = bits::bits_to_symbols(&bits, self.profile.sf.bits_per_symbol());

        let n = self.chirps.samples_per_symbol();
        let mut samples =
            Vec::with_capacity((PREAMBLE_CHIRPS + SYNC_CHIRPS + symbols.len()) * n);

        for _ in 0..PREAMBLE_CHIRPS {
            samples.extend_from_slice(self.chirps.up());
        }
        for _ in 0..SYNC_CHIRPS {
            samples.extend_from_slice(self.chirps.down());
        }
        for &symbol in &symbols {
            samples.extend(self.chirps.data_chirp(symbol));
        }

        Frame {
            payload: payload.to_vec(),
            bits,
            symbols,
            samples,
        }
    }
}
