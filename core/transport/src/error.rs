use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("serial i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("message queue closed")]
    QueueClosed,
}
