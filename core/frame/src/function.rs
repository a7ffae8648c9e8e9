use crate::error::FrameError;
use std::fmt;

/// Function codes this device understands. Adding one means adding a variant
/// here and a handler on the slave side; every match over it is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Function {
    /// 0x1
    ReadCoils = 0x1,

    /// 0x3
    ReadHoldingRegisters = 0x3,
}

impl Function {
    pub const ALL: [Function; 2] = [Function::ReadCoils, Function::ReadHoldingRegisters];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Number of big-endian u16 fields a request carries.
    pub fn fields(self) -> usize {
        match self {
            Function::ReadCoils | Function::ReadHoldingRegisters => 2, // start, count
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::ReadCoils => "Read Coils",
            Function::ReadHoldingRegisters => "Read Holding Registers",
        }
    }
}

impl TryFrom<u8> for Function {
    type Error = FrameError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0x1 => Ok(Function::ReadCoils),
            0x3 => Ok(Function::ReadHoldingRegisters),
            _ => Err(FrameError::UnsupportedFunction(code)),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
