mod codec;

pub use codec::{FrameKind, RtuCodec, MAX_SHIFTS};
