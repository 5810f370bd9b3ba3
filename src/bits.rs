//! Bit plumbing: nibble, codeword, and symbol packing
//!
//! The modem moves data through three granularities:
//!
//! ```text
//! bytes ──> nibbles ──> codewords ──> bit stream ──> SF-bit symbols
//!       split          FEC encode   LSB-first      little-endian
//! ```
//!
//! Bytes split high nibble first. Codewords unpack into the bit stream
//! LSB-first. Symbols pack `width` consecutive bits little-endian (bit j of
//! a chunk becomes bit j of the symbol value), with the final partial chunk
//! zero-padded.

use crate::types::Symbol;

/// Split bytes into 4-bit nibbles, high nibble first
pub fn bytes_to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        nibbles.push((byte >> 4) & 0x0F);
        nibbles.push(byte & 0x0F);
    }
    nibbles
}

/// Reassemble bytes from nibbles, high nibble first
///
/// A trailing odd nibble becomes the high half of a final byte.
pub fn nibbles_to_bytes(nibbles: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(nibbles.len().div_ceil(2));
    for chunk in nibbles.chunks(2) {
        if chunk.len() == 2 {
            bytes.push((chunk[0] << 4) | (chunk[1] & 0x0F));
        } else {
            bytes.push(chunk[0] << 4);
        }
    }
    bytes
}

/// Unpack codewords into a bit stream, LSB-first within each codeword
pub fn codewords_to_bits(codewords: &[u8], width: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(codewords.len() * width);
    for &cw in codewords {
        for i in 0..width {
            bits.push((cw >> i) & 1);
        }
    }
    bits
}

/// Repack a bit stream into codewords, LSB-first
///
/// Trailing bits that do not fill a whole codeword are dropped.
pub fn bits_to_codewords(bits: &[u8], width: usize) -> Vec<u8> {
    bits.chunks_exact(width)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |cw, (i, &b)| cw | ((b & 1) << i))
        })
        .collect()
}

/// Pack a bit stream into `width`-bit symbols
///
/// Bit j of each chunk becomes bit j of the symbol value. The final chunk
/// is zero-padded if the stream length is not a multiple of `width`.
pub fn bits_to_symbols(bits: &[u8], width: usize) -> Vec<Symbol> {
    assert!(width >= 1 && width <= 16, "symbol width out of range");
    bits.chunks(width)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u16, |sym, (j, &b)| sym | (((b & 1) as u16) << j))
        })
        .collect()
}

/// Unpack symbols into a bit stream of exactly `total_bits` bits
///
/// The inverse of [`bits_to_symbols`]: each symbol yields `width` bits
/// LSB-first, and the stream is truncated to the requested length so the
/// zero-padding from packing disappears.
pub fn symbols_to_bits(symbols: &[Symbol], width: usize, total_bits: usize) -> Vec<u8> {
    let mut bits = Vec::with_capacity(symbols.len() * width);
    for &sym in symbols {
        for j in 0..width {
            bits.push(((sym >> j) & 1) as u8);
        }
    }
    bits.truncate(total_bits);
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_nibbles_high_first() {
        assert_eq!(bytes_to_nibbles(&[0xAB, 0xCD]), vec![0xA, 0xB, 0xC, 0xD]);
    }

    #[test]
    fn test_nibbles_roundtrip() {
        let bytes = vec![0x00, 0xFF, 0x5A, 0x13];
        assert_eq!(nibbles_to_bytes(&bytes_to_nibbles(&bytes)), bytes);
    }

    #[test]
    fn test_odd_nibble_becomes_high_half() {
        assert_eq!(nibbles_to_bytes(&[0xA, 0xB, 0xC]), vec![0xAB, 0xC0]);
    }

    #[test]
    fn test_codeword_bits_lsb_first() {
        // 0b101 at width 3 -> bits [1, 0, 1]
        assert_eq!(codewords_to_bits(&[0b101], 3), vec![1, 0, 1]);
        assert_eq!(bits_to_codewords(&[1, 0, 1], 3), vec![0b101]);
    }

    #[test]
    fn test_symbol_packing_little_endian() {
        // bits [1,1,0,0,1] at width 5 -> 0b10011 = 19
        assert_eq!(bits_to_symbols(&[1, 1, 0, 0, 1], 5), vec![19]);
    }

    #[test]
    fn test_symbol_packing_pads_final_chunk() {
        // 3 bits at width 2 -> two symbols, second padded with zero
        assert_eq!(bits_to_symbols(&[1, 0, 1], 2), vec![0b01, 0b01]);
    }

    #[test]
    fn test_symbol_roundtrip_assorted_widths() {
        let bits: Vec<u8> = (0..53).map(|i| ((i * 7 + 3) % 5 == 0) as u8).collect();
        for width in [1, 5, 7, 9, 12] {
            let symbols = bits_to_symbols(&bits, width);
            assert_eq!(symbols.len(), bits.len().div_ceil(width));
            let recovered = symbols_to_bits(&symbols, width, bits.len());
            assert_eq!(recovered, bits, "width {width}");
        }
    }

    #[test]
    fn test_symbols_fit_width() {
        let bits = vec![1; 70];
        for sym in bits_to_symbols(&bits, 7) {
            assert!(sym < 128);
        }
    }
}
