//! In-memory serial line. Used by tests and simulations to drive a link
//! without hardware and to inspect what happened on the line.

use crate::device::{DirectionPin, SerialDevice};
use bytes::BytesMut;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    Transmit,
    Receive,
    Read(Vec<u8>),
    Write(Vec<u8>),
    Flush,
}

#[derive(Default)]
struct State {
    events: Vec<LineEvent>,
    input: VecDeque<u8>,
    output: Vec<u8>,
    fail_next: Option<ErrorKind>,
}

/// Shared view of an in-memory line: feeds input, records output and the
/// order of everything the device and the pin were asked to do.
#[derive(Clone, Default)]
pub struct LineTap {
    state: Arc<Mutex<State>>,
}

impl LineTap {
    pub fn new() -> LineTap {
        LineTap::default()
    }

    pub fn device(&self) -> MemoryDevice {
        MemoryDevice {
            tap: self.clone(),
        }
    }

    pub fn pin(&self) -> MemoryPin {
        MemoryPin {
            tap: self.clone(),
        }
    }

    /// Bytes arriving from the bus.
    pub fn inject(&self, data: &[u8]) {
        self.state().input.extend(data.iter().copied());
    }

    /// Everything written to the line so far.
    pub fn written(&self) -> Vec<u8> {
        self.state().output.clone()
    }

    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.state().output)
    }

    pub fn events(&self) -> Vec<LineEvent> {
        self.state().events.clone()
    }

    /// Makes the next read or write fail with `kind`.
    pub fn fail_next_io(&self, kind: ErrorKind) {
        self.state().fail_next = Some(kind);
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }

    fn record(&self, event: LineEvent) {
        self.state().events.push(event);
    }

    fn take_failure(&self) -> Result<(), Error> {
        match self.state().fail_next.take() {
            Some(kind) => Err(Error::new(kind, "injected failure")),
            None => Ok(()),
        }
    }
}

pub struct MemoryDevice {
    tap: LineTap,
}

impl SerialDevice for MemoryDevice {
    fn available(&mut self) -> Result<usize, Error> {
        Ok(self.tap.state().input.len())
    }

    async fn read(&mut self, buf: &mut BytesMut) -> Result<usize, Error> {
        self.tap.take_failure()?;
        let data: Vec<u8> = self.tap.state().input.drain(..).collect();
        buf.extend_from_slice(&data);
        let nbytes = data.len();
        self.tap.record(LineEvent::Read(data));
        Ok(nbytes)
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.tap.take_failure()?;
        self.tap.state().output.extend_from_slice(data);
        self.tap.record(LineEvent::Write(data.to_vec()));
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), Error> {
        // give other tasks a chance to run while "bytes are on the wire"
        tokio::task::yield_now().await;
        self.tap.record(LineEvent::Flush);
        Ok(())
    }
}

pub struct MemoryPin {
    tap: LineTap,
}

impl<D> DirectionPin<D> for MemoryPin {
    fn set_transmit(&mut self, _device: &mut D) -> Result<(), Error> {
        self.tap.record(LineEvent::Transmit);
        Ok(())
    }

    fn set_receive(&mut self, _device: &mut D) -> Result<(), Error> {
        self.tap.record(LineEvent::Receive);
        Ok(())
    }
}
