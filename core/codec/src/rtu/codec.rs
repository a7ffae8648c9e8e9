use crate::{error::CodecError, helpers};
use bytes::{Buf, BytesMut};
use frame::{Frame, FrameError};
use log::{debug, warn};
use tokio_util::codec::{Decoder, Encoder};

/// How many times the start of a buffer is moved forward by one byte
/// before giving up on it.
pub const MAX_SHIFTS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Request,
    Response,
}

/// Splits raw line input into frames.
///
/// `decode` returns `Ok(None)` while the buffer does not hold a complete
/// frame (`FrameTooShort`). Any other parse error is treated as line noise
/// in front of a frame: the start is shifted by one byte and parsing is
/// retried, at most `max_shifts` times. When that budget runs out the buffer
/// is cleared and `CodecError::Unrecoverable` is returned.
pub struct RtuCodec {
    kind: FrameKind,
    max_shifts: usize,
    name: String,
}

impl Default for RtuCodec {
    fn default() -> RtuCodec {
        RtuCodec::new("serial")
    }
}

impl RtuCodec {
    /// Decodes requests, the slave side of the line.
    pub fn new(name: &str) -> RtuCodec {
        RtuCodec {
            kind: FrameKind::Request,
            max_shifts: MAX_SHIFTS,
            name: name.to_owned(),
        }
    }

    /// Decodes responses, the master side of the line.
    pub fn new_responses(name: &str) -> RtuCodec {
        RtuCodec {
            kind: FrameKind::Response,
            ..RtuCodec::new(name)
        }
    }

    pub fn with_max_shifts(mut self, max_shifts: usize) -> RtuCodec {
        self.max_shifts = max_shifts;
        self
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn max_shifts(&self) -> usize {
        self.max_shifts
    }

    fn parse<'a>(&self, bytes: &'a [u8]) -> Result<(Frame, &'a [u8]), FrameError> {
        match self.kind {
            FrameKind::Request => Frame::parse(bytes),
            FrameKind::Response => Frame::parse_response(bytes),
        }
    }
}

impl Decoder for RtuCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        helpers::log_data(&self.name, "in", src);

        let mut shift = 0;
        loop {
            let result = self
                .parse(&src[shift..])
                .map(|(frame, remain)| (frame, remain.len()));

            match result {
                Ok((frame, remain)) => {
                    if shift > 0 {
                        warn!("{} skipped {} byte(s) before frame", self.name, shift);
                    }
                    let used = src.len() - remain;
                    src.advance(used);
                    helpers::log_frame(&self.name, &"frame", &frame);
                    return Ok(Some(frame));
                }

                Err(FrameError::FrameTooShort) => {
                    src.advance(shift);
                    return Ok(None);
                }

                Err(err) if shift < self.max_shifts => {
                    debug!("{} attempt {} failed: {}", self.name, shift + 1, err);
                    shift += 1;
                }

                Err(err) => {
                    src.clear();
                    return Err(CodecError::Unrecoverable {
                        attempts: shift + 1,
                        last: err,
                    });
                }
            }
        }
    }
}

impl Encoder<Frame> for RtuCodec {
    type Error = CodecError;

    fn encode(&mut self, msg: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        helpers::log_frame(&self.name, &"encode", &msg);
        let start = dst.len();
        dst.extend_from_slice(&msg.to_bytes());
        helpers::log_data(&self.name, "out", &dst[start..]);
        Ok(())
    }
}
