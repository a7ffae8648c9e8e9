use frame::FrameError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("no frame after {attempts} attempts, last error: {last}")]
    Unrecoverable { attempts: usize, last: FrameError },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    pub fn last_frame_error(&self) -> Option<FrameError> {
        match self {
            CodecError::Unrecoverable { last, .. } => Some(*last),
            CodecError::Io(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn from_io_error() {
        let err = io::Error::new(io::ErrorKind::UnexpectedEof, "");
        assert!(matches!(CodecError::from(err), CodecError::Io(_)));
    }

    #[test]
    fn display() {
        let err = CodecError::Unrecoverable {
            attempts: 11,
            last: FrameError::InvalidAddress(255),
        };
        assert_eq!(
            err.to_string(),
            "no frame after 11 attempts, last error: invalid address: 255"
        );
        assert_eq!(err.last_frame_error(), Some(FrameError::InvalidAddress(255)));
    }
}
