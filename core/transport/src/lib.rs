pub mod device;
pub mod error;
pub(crate) mod event;
pub mod memory;
pub mod rtu;
pub mod settings;
pub mod timing;

use bytes::BytesMut;
use std::fmt;
use tokio::sync::mpsc;
use uuid::Uuid;

pub use device::{DirectionPin, NoPin, SerialDevice};
pub use error::TransportError;
pub use rtu::link::Rs485Link;
pub use timing::LineTiming;

/// Bytes collected by one receive poll.
#[derive(Debug)]
pub struct RawMessage {
    pub uuid: Uuid,
    pub data: BytesMut,
}

impl RawMessage {
    pub fn new(data: BytesMut) -> RawMessage {
        RawMessage {
            uuid: Uuid::new_v4(),
            data,
        }
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "message id:{} len:{}", self.uuid, self.data.len())
    }
}

/// Receiving end of a link's message queue.
pub struct Handler {
    pub message_rx: mpsc::Receiver<RawMessage>,
}

impl Handler {
    /// Next queued message, if any, without waiting.
    pub fn try_recv(&mut self) -> Option<RawMessage> {
        self.message_rx.try_recv().ok()
    }

    pub async fn recv(&mut self) -> Option<RawMessage> {
        self.message_rx.recv().await
    }
}

pub mod prelude {
    pub use super::device::{DirectionPin, NoPin, SerialDevice};
    pub use super::settings::{DirectionControl, PortSettings, Settings};
    pub use super::timing::LineTiming;
    pub use super::{Handler, RawMessage, Rs485Link, TransportError};
}
