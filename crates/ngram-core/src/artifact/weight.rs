//! Half-precision weight storage.
//!
//! Weights are stored as IEEE-754 binary16 bit patterns, rounded to nearest
//! even. The conversion is monotonic, so ordering survives up to new ties.

use half::f16;

pub const WEIGHT_SIZE: usize = 2;

pub fn encode(weight: f32) -> u16 {
    f16::from_f32(weight).to_bits()
}

pub fn decode(bits: u16) -> f32 {
    f16::from_bits(bits).to_f32()
}

pub(crate) fn to_bytes(weights: &[u16]) -> Vec<u8> {
    weights.iter().flat_map(|w| w.to_ne_bytes()).collect()
}

pub(crate) fn from_bytes(data: &[u8]) -> Vec<u16> {
    data.chunks_exact(WEIGHT_SIZE)
        .map(|chunk| u16::from_ne_bytes([chunk[0], chunk[1]]))
        .collect()
}
