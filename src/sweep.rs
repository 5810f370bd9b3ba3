//! BER/PER characterization sweep
//!
//! Runs the full modem loop (encode → modulate → AWGN → demodulate →
//! compare) over a grid of (profile, SNR) cells and reports bit and packet
//! error rates per cell.
//!
//! Cells are independent, so the grid runs on a rayon worker pool. Each
//! cell derives its own `StdRng` from the sweep seed and the cell's grid
//! coordinates, which keeps results bit-reproducible regardless of how the
//! workers are scheduled.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::apply_awgn;
use crate::demodulation::Demodulator;
use crate::modulation::Modulator;
use crate::params::Profile;

/// Sweep grid and trial configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First SNR point in dB
    pub snr_start_db: f64,
    /// Last SNR point in dB (inclusive)
    pub snr_stop_db: f64,
    /// SNR step in dB
    pub snr_step_db: f64,
    /// Number of packets simulated per (profile, SNR) cell
    pub packets_per_point: usize,
    /// Random payload size in bytes
    pub payload_len: usize,
    /// Master seed; each cell derives its own generator from this
    pub seed: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            snr_start_db: 0.0,
            snr_stop_db: 12.0,
            snr_step_db: 0.5,
            packets_per_point: 100,
            payload_len: 16,
            seed: 0,
        }
    }
}

impl SweepConfig {
    /// The SNR points of the grid, ascending
    pub fn snr_points(&self) -> Vec<f64> {
        if self.snr_step_db <= 0.0 {
            return vec![self.snr_start_db];
        }
        let span = self.snr_stop_db - self.snr_start_db;
        let count = (span / self.snr_step_db + 1e-9).floor() as usize + 1;
        (0..count)
            .map(|i| self.snr_start_db + i as f64 * self.snr_step_db)
            .collect()
    }
}

/// Error statistics for one (profile, SNR) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Profile name
    pub profile: String,
    /// Spreading factor
    pub sf: u8,
    /// Bandwidth in Hz
    pub bandwidth_hz: u32,
    /// Coding rate, e.g. "4/8"
    pub cr: String,
    /// SNR for this cell in dB
    pub snr_db: f64,
    /// Bit error rate
    pub ber: f64,
    /// Packet error rate
    pub per: f64,
    /// Raw bit error count
    pub bit_errors: u64,
    /// Total payload bits compared
    pub bits_total: u64,
    /// Packets with at least one byte wrong
    pub packet_errors: u64,
    /// Packets simulated
    pub packets: u64,
}

/// Bit error counter
///
/// ```rust
/// use chirplab::sweep::BerTester;
///
/// let mut ber = BerTester::new();
/// ber.update_bytes(&[0xFF], &[0xFE]); // 1 flipped bit
/// assert_eq!(ber.error_bits(), 1);
/// assert_eq!(ber.total_bits(), 8);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BerTester {
    total_bits: u64,
    error_bits: u64,
}

impl BerTester {
    /// Create a new BER counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare byte buffers, counting every differing bit
    pub fn update_bytes(&mut self, tx: &[u8], rx: &[u8]) {
        let len = tx.len().min(rx.len());
        for i in 0..len {
            self.error_bits += (tx[i] ^ rx[i]).count_ones() as u64;
            self.total_bits += 8;
        }
    }

    /// Get the overall BER
    pub fn ber(&self) -> f64 {
        if self.total_bits == 0 {
            return 0.0;
        }
        self.error_bits as f64 / self.total_bits as f64
    }

    /// Get total bits compared
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Get total error bits
    pub fn error_bits(&self) -> u64 {
        self.error_bits
    }
}

/// Packet error counter
#[derive(Debug, Clone, Default)]
pub struct PerTester {
    total_packets: u64,
    failed_packets: u64,
}

impl PerTester {
    /// Create a new PER counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare one transmitted and received payload
    pub fn update_packet(&mut self, tx: &[u8], rx: &[u8]) {
        self.total_packets += 1;
        if tx != rx {
            self.failed_packets += 1;
        }
    }

    /// Get the PER
    pub fn per(&self) -> f64 {
        if self.total_packets == 0 {
            return 0.0;
        }
        self.failed_packets as f64 / self.total_packets as f64
    }

    /// Get total packets tested
    pub fn total_packets(&self) -> u64 {
        self.total_packets
    }

    /// Get number of failed packets
    pub fn failed_packets(&self) -> u64 {
        self.failed_packets
    }
}

/// SplitMix64 finalizer, used to spread cell coordinates into seeds
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

/// Derive the private RNG seed for one grid cell
fn cell_seed(seed: u64, profile_idx: usize, snr_idx: usize) -> u64 {
    splitmix64(seed ^ ((profile_idx as u64) << 32) ^ snr_idx as u64)
}

/// Simulate one (profile, SNR) cell
pub fn run_cell(profile: &Profile, snr_db: f64, config: &SweepConfig, seed: u64) -> SimulationResult {
    let mut rng = StdRng::seed_from_u64(seed);
    let modulator = Modulator::new(profile.clone());
    let mut demodulator = Demodulator::new(profile.clone());

    let mut ber = BerTester::new();
    let mut per = PerTester::new();
    let mut payload = vec![0u8; config.payload_len];

    for _ in 0..config.packets_per_point {
        rng.fill(payload.as_mut_slice());

        let clean = modulator.modulate(&payload);
        let noisy = apply_awgn(&clean, snr_db, &mut rng);
        // The transmit waveform always holds at least one symbol, so the
        // receive path cannot fail here.
        let recovered = demodulator
            .demodulate_payload(&noisy, config.payload_len)
            .unwrap_or_else(|_| vec![0; config.payload_len]);

        ber.update_bytes(&payload, &recovered);
        per.update_packet(&payload, &recovered);
    }

    debug!(
        profile = %profile.name,
        snr_db,
        ber = ber.ber(),
        per = per.per(),
        "sweep cell done"
    );

    SimulationResult {
        profile: profile.name.clone(),
        sf: profile.sf.value(),
        bandwidth_hz: profile.bandwidth_hz,
        cr: profile.cr.to_string(),
        snr_db,
        ber: ber.ber(),
        per: per.per(),
        bit_errors: ber.error_bits(),
        bits_total: ber.total_bits(),
        packet_errors: per.failed_packets(),
        packets: per.total_packets(),
    }
}

/// Run the full sweep grid
///
/// Results come back in deterministic profile-major, SNR-ascending order,
/// independent of how the worker pool scheduled the cells.
pub fn run_sweep(profiles: &[Profile], config: &SweepConfig) -> Vec<SimulationResult> {
    let snrs = config.snr_points();
    let cells: Vec<(usize, usize)> = (0..profiles.len())
        .flat_map(|pi| (0..snrs.len()).map(move |si| (pi, si)))
        .collect();

    cells
        .par_iter()
        .map(|&(pi, si)| {
            run_cell(
                &profiles[pi],
                snrs[si],
                config,
                cell_seed(config.seed, pi, si),
            )
        })
        .collect()
}

/// Render sweep results as CSV
pub fn results_to_csv(results: &[SimulationResult]) -> String {
    let mut csv =
        String::from("profile,sf,bandwidth_hz,cr,snr_db,ber,per,bit_errors,bits_total,packet_errors,packets\n");
    for r in results {
        csv.push_str(&format!(
            "{},{},{},{},{:.2},{:.10},{:.10},{},{},{},{}\n",
            r.profile,
            r.sf,
            r.bandwidth_hz,
            r.cr,
            r.snr_db,
            r.ber,
            r.per,
            r.bit_errors,
            r.bits_total,
            r.packet_errors,
            r.packets,
        ));
    }
    csv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sf7_profile() -> Profile {
        Profile::new("sf7_cr48", 7, 125_000, "4/8").unwrap()
    }

    #[test]
    fn test_snr_points() {
        let config = SweepConfig::default();
        let points = config.snr_points();
        assert_eq!(points.len(), 25); // 0.0 to 12.0 in 0.5 steps
        assert_eq!(points[0], 0.0);
        assert!((points[24] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_snr_points_degenerate_step() {
        let config = SweepConfig {
            snr_step_db: 0.0,
            ..Default::default()
        };
        assert_eq!(config.snr_points(), vec![0.0]);
    }

    #[test]
    fn test_cell_seeds_distinct() {
        assert_ne!(cell_seed(0, 0, 1), cell_seed(0, 1, 0));
        assert_ne!(cell_seed(0, 0, 0), cell_seed(1, 0, 0));
        assert_ne!(cell_seed(0, 2, 3), cell_seed(0, 2, 4));
    }

    #[test]
    fn test_high_snr_cell_is_clean() {
        let config = SweepConfig {
            snr_start_db: 30.0,
            snr_stop_db: 30.0,
            snr_step_db: 1.0,
            packets_per_point: 10,
            payload_len: 8,
            seed: 3,
        };
        let result = run_cell(&sf7_profile(), 30.0, &config, 3);
        assert_eq!(result.bit_errors, 0);
        assert_eq!(result.packet_errors, 0);
        assert_eq!(result.packets, 10);
        assert_eq!(result.bits_total, 10 * 8 * 8);
    }

    #[test]
    fn test_ber_degrades_monotonically_with_noise() {
        let config = SweepConfig {
            snr_start_db: -20.0,
            snr_stop_db: 10.0,
            snr_step_db: 10.0,
            packets_per_point: 30,
            payload_len: 4,
            seed: 1,
        };
        let results = run_sweep(&[sf7_profile()], &config);
        assert_eq!(results.len(), 4);

        // Mean BER must fall as SNR rises. The measurement is statistical,
        // so allow a small tolerance band between neighboring points.
        for pair in results.windows(2) {
            assert!(
                pair[1].ber <= pair[0].ber + 0.02,
                "BER rose from {} at {} dB to {} at {} dB",
                pair[0].ber,
                pair[0].snr_db,
                pair[1].ber,
                pair[1].snr_db,
            );
        }

        let (noisy, clean) = (&results[0], &results[3]);
        assert_eq!(noisy.snr_db, -20.0);
        assert!((clean.snr_db - 10.0).abs() < 1e-9);
        assert!(noisy.ber > clean.ber, "{} vs {}", noisy.ber, clean.ber);
        assert!(clean.ber < 0.01);
        assert!(noisy.per > 0.0);
    }

    #[test]
    fn test_sweep_reproducible() {
        let config = SweepConfig {
            snr_start_db: 0.0,
            snr_stop_db: 5.0,
            snr_step_db: 5.0,
            packets_per_point: 5,
            payload_len: 4,
            seed: 77,
        };
        let profiles = vec![sf7_profile()];
        let a = run_sweep(&profiles, &config);
        let b = run_sweep(&profiles, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_order_profile_major() {
        let config = SweepConfig {
            snr_start_db: 0.0,
            snr_stop_db: 2.0,
            snr_step_db: 2.0,
            packets_per_point: 2,
            payload_len: 2,
            seed: 5,
        };
        let profiles = vec![
            sf7_profile(),
            Profile::new("sf8_cr45", 8, 125_000, "4/5").unwrap(),
        ];
        let results = run_sweep(&profiles, &config);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].profile, "sf7_cr48");
        assert_eq!(results[1].profile, "sf7_cr48");
        assert_eq!(results[2].profile, "sf8_cr45");
        assert!(results[0].snr_db < results[1].snr_db);
    }

    #[test]
    fn test_csv_output() {
        let config = SweepConfig {
            snr_start_db: 10.0,
            snr_stop_db: 10.0,
            snr_step_db: 1.0,
            packets_per_point: 2,
            payload_len: 2,
            seed: 9,
        };
        let results = run_sweep(&[sf7_profile()], &config);
        let csv = results_to_csv(&results);
        assert!(csv.starts_with("profile,sf,bandwidth_hz,cr,"));
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("sf7_cr48,7,125000,4/8,10.00"));
    }
}
