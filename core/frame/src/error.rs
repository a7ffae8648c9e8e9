use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum FrameError {
    #[error("frame too short")]
    FrameTooShort,

    #[error("invalid address: {0}")]
    InvalidAddress(u8),

    #[error("function code not supported: {0}")]
    UnsupportedFunction(u8),

    #[error("invalid data length: {0}")]
    InvalidDataLength(usize),

    #[error("crc mismatch: expected {expected:#06x}, got {actual:#06x}")]
    CrcMismatch { expected: u16, actual: u16 },
}

impl FrameError {
    /// Errors a receiver may recover from by skipping leading bytes.
    pub fn is_shiftable(&self) -> bool {
        !matches!(self, FrameError::FrameTooShort)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shiftable() {
        assert!(!FrameError::FrameTooShort.is_shiftable());
        assert!(FrameError::InvalidAddress(250).is_shiftable());
        assert!(FrameError::UnsupportedFunction(0x2b).is_shiftable());
        assert!(FrameError::InvalidDataLength(0).is_shiftable());
        assert!(FrameError::CrcMismatch {
            expected: 0,
            actual: 1
        }
        .is_shiftable());
    }

    #[test]
    fn display() {
        assert_eq!(
            FrameError::UnsupportedFunction(2).to_string(),
            "function code not supported: 2"
        );
        assert_eq!(
            FrameError::CrcMismatch {
                expected: 0xCDC5,
                actual: 0x0000
            }
            .to_string(),
            "crc mismatch: expected 0xcdc5, got 0x0000"
        );
    }
}
