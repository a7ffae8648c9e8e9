//! CRC16 as used by Modbus RTU (reflected polynomial 0xA001, seed 0xFFFF).

const POLY: u16 = 0xA001;
const SEED: u16 = 0xFFFF;

static CRC16: [u16; 256] = build_table();

/// Residue of every byte value, computed bit by bit.
pub const fn build_table() -> [u16; 256] {
    let mut table = [0u16; 256];
    let mut idx = 0;
    while idx < 256 {
        let mut value = idx as u16;
        let mut crc = 0u16;
        let mut bit = 0;
        while bit < 8 {
            if (value ^ crc) & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
            value >>= 1;
            bit += 1;
        }
        table[idx] = crc;
        idx += 1;
    }
    table
}

/// Returns the register value of the checksum. Goes on the wire low byte first.
pub fn crc16(bytes: &[u8]) -> u16 {
    update(SEED, bytes)
}

/// Checksum in wire order.
pub fn crc16_bytes(bytes: &[u8]) -> [u8; 2] {
    crc16(bytes).to_le_bytes()
}

fn update(crc: u16, bytes: &[u8]) -> u16 {
    let mut new_crc = crc;
    for byte in bytes {
        let idx = ((new_crc ^ (*byte as u16)) & 0xFF) as usize;
        new_crc = (new_crc >> 8) ^ CRC16[idx];
    }
    new_crc
}
