//! Forward error correction codecs
//!
//! Four nibble-oriented code families, one per coding rate. All of them
//! keep the 4 data bits in codeword bits 0-3 and append redundancy above:
//!
//! | Rate | Code         | Detects | Corrects |
//! |------|--------------|---------|----------|
//! | 4/5  | Parity(5,4)  | 1 bit   | -        |
//! | 4/6  | Parity(6,4)  | 1 bit   | -        |
//! | 4/7  | Hamming(7,4) | 1 bit   | 1 bit    |
//! | 4/8  | Hamming(8,4) | 2 bits  | 1 bit    |
//!
//! The parity layouts follow the SX127x-style codes: Hamming decode
//! recomputes a syndrome over the received codeword and either corrects a
//! single flipped data bit, recognizes a parity-bit-only flip, or (for 8,4)
//! declares the codeword uncorrectable.

use crate::params::CodingRate;

/// Outcome of decoding one codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedNibble {
    /// The recovered 4-bit data value
    pub nibble: u8,
    /// A parity violation was detected (possibly corrected)
    pub error: bool,
    /// The codeword was uncorrectable; `nibble` is best-effort
    pub bad: bool,
}

/// Encode a nibble with the Parity(5,4) code
///
/// A single overall parity bit computed by folding the nibble down to one
/// bit lands in bit 4.
pub fn encode_parity54(nibble: u8) -> u8 {
    let b = nibble & 0xF;
    let mut x = b ^ (b >> 2);
    x ^= x >> 1;
    b | ((x << 4) & 0x10)
}

/// Check a Parity(5,4) codeword
///
/// Returns the nibble as received and whether any of the 5 bits disagree
/// with a clean re-encode. Single bit errors are detected, never corrected.
pub fn check_parity54(codeword: u8) -> (u8, bool) {
    let nibble = codeword & 0xF;
    let error = encode_parity54(nibble) != (codeword & 0x1F);
    (nibble, error)
}

/// Encode a nibble with the Parity(6,4) code
///
/// One XOR fold of the nibble: bit 4 covers d0^d2, bit 5 covers d1^d3.
pub fn encode_parity64(nibble: u8) -> u8 {
    let b = nibble & 0xF;
    let x = b ^ (b >> 2);
    b | ((x << 4) & 0x30)
}

/// Check a Parity(6,4) codeword
pub fn check_parity64(codeword: u8) -> (u8, bool) {
    let nibble = codeword & 0xF;
    let error = encode_parity64(nibble) != (codeword & 0x3F);
    (nibble, error)
}

/// Encode a nibble with the Hamming(8,4) code
pub fn encode_hamming84(nibble: u8) -> u8 {
    let b = nibble & 0xF;
    let d0 = b & 1;
    let d1 = (b >> 1) & 1;
    let d2 = (b >> 2) & 1;
    let d3 = (b >> 3) & 1;

    let mut code = b;
    code |= (d0 ^ d1 ^ d2) << 4;
    code |= (d1 ^ d2 ^ d3) << 5;
    code |= (d0 ^ d1 ^ d3) << 6;
    code |= (d0 ^ d2 ^ d3) << 7;
    code
}

/// Decode a Hamming(8,4) codeword
///
/// Returns `(nibble, error, bad)`. A single flipped bit anywhere in the
/// codeword is corrected; two flipped bits set `bad` and the data bits are
/// returned as received.
pub fn decode_hamming84(codeword: u8) -> (u8, bool, bool) {
    let mut code = codeword;
    let b0 = code & 1;
    let b1 = (code >> 1) & 1;
    let b2 = (code >> 2) & 1;
    let b3 = (code >> 3) & 1;
    let b4 = (code >> 4) & 1;
    let b5 = (code >> 5) & 1;
    let b6 = (code >> 6) & 1;
    let b7 = (code >> 7) & 1;

    let p0 = b0 ^ b1 ^ b2 ^ b4;
    let p1 = b1 ^ b2 ^ b3 ^ b5;
    let p2 = b0 ^ b1 ^ b3 ^ b6;
    let p3 = b0 ^ b2 ^ b3 ^ b7;

    let syndrome = p0 | (p1 << 1) | (p2 << 2) | (p3 << 3);
    let error = syndrome != 0;
    let mut bad = false;

    match syndrome {
        0xD => code ^= 1,
        0x7 => code ^= 2,
        0xB => code ^= 4,
        0xE => code ^= 8,
        // Zero syndrome or a parity-bit-only flip leaves the data intact
        0x0 | 0x1 | 0x2 | 0x4 | 0x8 => {}
        _ => bad = true,
    }

    (code & 0xF, error, bad)
}

/// Encode a nibble with the Hamming(7,4) code
///
/// Same construction as Hamming(8,4) minus the final overall parity bit.
pub fn encode_hamming74(nibble: u8) -> u8 {
    encode_hamming84(nibble) & 0x7F
}

/// Decode a Hamming(7,4) codeword
///
/// Returns `(nibble, error)`. Every non-zero 3-bit syndrome maps to a
/// single-bit correction or a parity-bit flip, so there is no
/// uncorrectable state.
pub fn decode_hamming74(codeword: u8) -> (u8, bool) {
    let mut code = codeword;
    let b0 = code & 1;
    let b1 = (code >> 1) & 1;
    let b2 = (code >> 2) & 1;
    let b3 = (code >> 3) & 1;
    let b4 = (code >> 4) & 1;
    let b5 = (code >> 5) & 1;
    let b6 = (code >> 6) & 1;

    let p0 = b0 ^ b1 ^ b2 ^ b4;
    let p1 = b1 ^ b2 ^ b3 ^ b5;
    let p2 = b0 ^ b1 ^ b3 ^ b6;

    let syndrome = p0 | (p1 << 1) | (p2 << 2);
    let error = syndrome != 0;

    match syndrome {
        0x5 => code ^= 1,
        0x7 => code ^= 2,
        0x3 => code ^= 4,
        0x6 => code ^= 8,
        // Parity-bit-only flips
        0x0 | 0x1 | 0x2 | 0x4 => {}
        _ => unreachable!("3-bit syndrome"),
    }

    (code & 0xF, error)
}

/// Encode a nibble with the code family selected by the coding rate
pub fn encode_nibble(cr: CodingRate, nibble: u8) -> u8 {
    match cr {
        CodingRate::Cr4_5 => encode_parity54(nibble),
        CodingRate::Cr4_6 => encode_parity64(nibble),
        CodingRate::Cr4_7 => encode_hamming74(nibble),
        CodingRate::Cr4_8 => encode_hamming84(nibble),
    }
}

/// Decode a codeword with the code family selected by the coding rate
pub fn decode_nibble(cr: CodingRate, codeword: u8) -> DecodedNibble {
    match cr {
        CodingRate::Cr4_5 => {
            let (nibble, error) = check_parity54(codeword);
            DecodedNibble { nibble, error, bad: false }
        }
        CodingRate::Cr4_6 => {
            let (nibble, error) = check_parity64(codeword);
            DecodedNibble { nibble, error, bad: false }
        }
        CodingRate::Cr4_7 => {
            let (nibble, error) = decode_hamming74(codeword);
            DecodedNibble { nibble, error, bad: false }
        }
        CodingRate::Cr4_8 => {
            let (nibble, error, bad) = decode_hamming84(codeword);
            DecodedNibble { nibble, error, bad }
        }
    }
}
