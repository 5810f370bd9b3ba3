//! # chirplab
//!
//! A software chirp-spread-spectrum (CSS) physical layer, LoRa-style, with
//! an AWGN characterization harness. Payload bytes go in one end as complex
//! baseband I/Q samples and come back out the other, and the sweep engine
//! measures how gracefully that loop degrades with noise.
//!
//! ## Signal flow
//!
//! ```text
//!  TX:  payload ──> FEC encode ──> symbol pack ──> chirp modulate ──┐
//!                                                                   │
//!                                                            AWGN channel
//!                                                                   │
//!  RX:  payload <── FEC decode <── symbol unpack <── FFT detect <───┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use chirplab::{Demodulator, Modulator, Profile};
//!
//! let profile = Profile::new("sf7", 7, 125_000, "4/8").unwrap();
//! let samples = Modulator::new(profile.clone()).modulate(b"Hello");
//!
//! let mut demod = Demodulator::new(profile);
//! let payload = demod.demodulate_payload(&samples, 5).unwrap();
//! assert_eq!(payload, b"Hello");
//! ```
//!
//! ## Characterization
//!
//! ```rust
//! use chirplab::sweep::{run_sweep, SweepConfig};
//! use chirplab::Profile;
//!
//! let profiles = vec![Profile::new("sf7", 7, 125_000, "4/8").unwrap()];
//! let config = SweepConfig {
//!     snr_start_db: 0.0,
//!     snr_stop_db: 4.0,
//!     snr_step_db: 2.0,
//!     packets_per_point: 5,
//!     payload_len: 8,
//!     seed: 42,
//! };
//! let results = run_sweep(&profiles, &config);
//! assert_eq!(results.len(), 3);
//! ```

pub mod bits;
pub mod channel;
pub mod chirp;
pub mod demodulation;
pub mod fec;
pub mod fft_utils;
pub mod modulation;
pub mod params;
pub mod sweep;
pub mod types;

pub use chirp::ChirpPair;
pub use demodulation::{BadCodewordPolicy, DemodResult, Demodulator};
pub use modulation::{Frame, Modulator, PREAMBLE_CHIRPS, SYNC_CHIRPS};
pub use params::{CodingRate, Profile, SpreadingFactor};
pub use sweep::{run_sweep, SimulationResult, SweepConfig};
pub use types::{Complex, IQSample, PhyError, PhyResult, Symbol};

/// Commonly used types, for glob imports
pub mod prelude {
    pub use crate::channel::apply_awgn;
    pub use crate::chirp::ChirpPair;
    pub use crate::demodulation::{DemodResult, Demodulator};
    pub use crate::modulation::{Frame, Modulator};
    pub use crate::params::{CodingRate, Profile, SpreadingFactor};
    pub use crate::sweep::{run_sweep, SimulationResult, SweepConfig};
    pub use crate::types::{Complex, IQSample, PhyError, PhyResult, Symbol};
}
