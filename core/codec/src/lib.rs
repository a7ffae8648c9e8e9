pub mod error;
pub mod helpers;
pub mod rtu;

pub use error::CodecError;
pub use rtu::{FrameKind, RtuCodec, MAX_SHIFTS};
