//! Chirp signal generation
//!
//! Chirp spread spectrum encodes each symbol as a linearly frequency-swept
//! tone. The base up-chirp sweeps across the full bandwidth over one symbol
//! period; a data symbol cyclically shifts the sweep:
//!
//! ```text
//! Frequency
//!     ^
//! fmax|        ___/     Symbol 0:  plain up-chirp
//!     |     __/
//!     |  __/
//! fmin|_/
//!     +----------> Time
//!
//! Frequency
//!     ^
//! fmax|  /              Symbol s:  sweep starts s/N into the
//!     | /    ___/       band and wraps around
//!     |   __/
//! fmin|__/
//!     +----------> Time
//! ```
//!
//! With N = 2^SF samples per symbol, the base up-chirp is
//!
//! ```text
//! up[n] = exp(j·π·n²/N)
//! ```
//!
//! and the down-chirp is its complex conjugate. A data chirp for symbol `s`
//! is the up-chirp rotated by a tone at bin `s`:
//!
//! ```text
//! tx[n] = up[n] · exp(j·2π·s·n/N)
//! ```
//!
//! Multiplying a received data chirp by the down-chirp collapses it to the
//! pure tone `exp(j·2π·s·n/N)`, which an N-point FFT resolves to bin `s`.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{Arc, Mutex, OnceLock};

use crate::params::SpreadingFactor;
use crate::types::{Complex, IQSample, Symbol};

/// Pre-computed base up-chirp and down-chirp for one spreading factor
///
/// The pair is a pure function of SF. [`ChirpPair::shared`] memoizes one
/// read-only copy per SF behind an `Arc` so parallel sweep workers never
/// regenerate the tables.
#[derive(Debug, Clone)]
pub struct ChirpPair {
    sf: SpreadingFactor,
    up: Vec<IQSample>,
    down: Vec<IQSample>,
}

impl ChirpPair {
    /// Generate the chirp pair for a spreading factor
    pub fn new(sf: SpreadingFactor) -> Self {
        let n = sf.chips_per_symbol();
        let mut up = Vec::with_capacity(n);
        for i in 0..n {
            // phase = π·n²/N, the integral of the linear sweep
            let phase = PI * (i * i) as f64 / n as f64;
            up.push(Complex::new(phase.cos(), phase.sin()));
        }
        let down = up.iter().map(|c| c.conj()).collect();

        Self { sf, up, down }
    }

    /// Get a cached, shared chirp pair for a spreading factor
    pub fn shared(sf: SpreadingFactor) -> Arc<Self> {
        static CACHE: OnceLock<Mutex<HashMap<u8, Arc<ChirpPair>>>> = OnceLock::new();
        let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
        let mut table = cache.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            table
                .entry(sf.value())
                .or_insert_with(|| Arc::new(Self::new(sf))),
        )
    }

    /// Spreading factor this pair was generated for
    pub fn sf(&self) -> SpreadingFactor {
        self.sf
    }

    /// Number of samples per symbol (2^SF)
    pub fn samples_per_symbol(&self) -> usize {
        self.up.len()
    }

    /// The base up-chirp
    pub fn up(&self) -> &[IQSample] {
        &self.up
    }

    /// The base down-chirp (conjugate of the up-chirp)
    pub fn down(&self) -> &[IQSample] {
        &self.down
    }

    /// Generate the data chirp for a symbol value
    ///
    /// Multiplies the base up-chirp by a tone at bin `symbol`, which is
    /// equivalent to cyclically shifting the frequency sweep.
    pub fn data_chirp(&self, symbol: Symbol) -> Vec<IQSample> {
        let n = self.up.len();
        let step = 2.0 * PI * symbol as f64 / n as f64;
        self.up
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let phase = step * i as f64;
                c * Complex::new(phase.cos(), phase.sin())
            })
            .collect()
    }
}
