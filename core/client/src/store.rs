use std::collections::HashMap;

/// First holding register of the 4xxxx reference range.
pub const FIRST_HOLDING_REGISTER: u16 = 40001;
/// Highest start address a read request may use.
pub const LAST_HOLDING_REGISTER: u16 = 49999;
const HOLDING_REGISTER_OFFSET: u32 = 40000;

/// Holding registers keyed by their 4xxxx reference. Unset registers read
/// as zero.
#[derive(Debug, Default, Clone)]
pub struct HoldingRegisters {
    values: HashMap<u32, u16>,
}

impl HoldingRegisters {
    pub fn new() -> HoldingRegisters {
        HoldingRegisters::default()
    }

    /// Addresses below 40001 are treated as zero based offsets into the
    /// 4xxxx range.
    pub fn normalize(address: u16) -> u32 {
        if address < FIRST_HOLDING_REGISTER {
            address as u32 + HOLDING_REGISTER_OFFSET
        } else {
            address as u32
        }
    }

    pub fn set(&mut self, address: u16, value: u16) {
        self.values.insert(HoldingRegisters::normalize(address), value);
    }

    pub fn get(&self, address: u16) -> u16 {
        self.get_normalized(HoldingRegisters::normalize(address))
    }

    /// Reads `count` consecutive registers starting at `start`.
    pub fn read(&self, start: u16, count: u16) -> Vec<u16> {
        let start = HoldingRegisters::normalize(start);
        (0..count as u32)
            .map(|offset| self.get_normalized(start + offset))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get_normalized(&self, address: u32) -> u16 {
        *self.values.get(&address).unwrap_or(&0)
    }
}

/// Coils keyed by their zero based address. Unset coils read as off.
#[derive(Debug, Default, Clone)]
pub struct Coils {
    values: HashMap<u16, bool>,
}

impl Coils {
    pub fn new() -> Coils {
        Coils::default()
    }

    pub fn set(&mut self, address: u16, value: bool) {
        self.values.insert(address, value);
    }

    pub fn get(&self, address: u16) -> bool {
        *self.values.get(&address).unwrap_or(&false)
    }

    pub fn read(&self, start: u16, count: u16) -> Vec<bool> {
        (0..count)
            .map(|offset| match start.checked_add(offset) {
                Some(address) => self.get(address),
                None => false,
            })
            .collect()
    }
}
