use codec::CodecError;
use frame::FrameError;
use thiserror::Error;
use transport::TransportError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("register out of range: {0}")]
    InvalidRegister(u16),

    #[error("invalid quantity of objects: {0}")]
    InvalidQuantity(u16),

    #[error("invalid slave address: {0}")]
    InvalidAddress(u8),
}
