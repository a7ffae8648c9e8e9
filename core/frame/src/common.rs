use crate::{MAX_NCOILS, MAX_NREGS, MAX_PAYLOAD_SIZE};

pub fn ncoils_len(nobjs: u16) -> usize {
    if nobjs > 0 {
        ((nobjs - 1) / 8 + 1) as usize
    } else {
        0
    }
}

pub fn nregs_len(nobjs: u16) -> usize {
    nobjs as usize * 2
}

pub fn ncoils_check(nobjs: u16) -> bool {
    nobjs > 0 && nobjs as usize <= MAX_NCOILS
}

pub fn nregs_check(nobjs: u16) -> bool {
    nobjs > 0 && nobjs as usize <= MAX_NREGS
}

pub fn payload_check(len: usize) -> bool {
    len > 0 && len <= MAX_PAYLOAD_SIZE
}

/// Packs bits LSB first, the layout of a read coils response.
pub fn bytes_from_bits(bits: &[bool]) -> Vec<u8> {
    let mut bytes = vec![0u8; ncoils_len(bits.len() as u16)];
    for (idx, bit) in bits.iter().enumerate() {
        if *bit {
            bytes[idx / 8] |= 1 << (idx % 8);
        }
    }
    bytes
}
