pub mod common;
pub mod crc;
pub mod error;
pub mod frame;
pub mod function;

pub use error::FrameError;
pub use frame::{Frame, FrameData};
pub use function::Function;

pub const MAX_ADDRESS: u8 = 247; // Highest unicast slave address
pub const BROADCAST_ADDRESS: u8 = 0;
pub const MIN_FRAME_SIZE: usize = 6; // address + function + one field + CRC
pub const MAX_PAYLOAD_SIZE: usize = 253; // Max. bytes of response data
pub const MAX_NREGS: usize = 125; // Max. number of registers in one response
pub const MAX_NCOILS: usize = 2000; // Max. number of coils in one response
pub const CRC_SIZE: usize = 2;
