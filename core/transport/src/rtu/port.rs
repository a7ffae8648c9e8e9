use crate::device::{DirectionPin, SerialDevice};
use crate::settings::PortSettings;
use bytes::BytesMut;
use std::io::Error;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::{SerialPort, SerialPortBuilderExt, SerialStream};

/// Upper bound of bytes collected by one read. Continuous noise on the line
/// is cut into chunks of this size.
pub const MAX_MESSAGE_SIZE: usize = 1024;

pub fn build(parameters: &PortSettings) -> Result<SerialStream, Error> {
    let port = tokio_serial::new(parameters.name.as_str(), parameters.speed)
        .data_bits(parameters.data_bits)
        .parity(parameters.parity)
        .stop_bits(parameters.stop_bits)
        .open_native_async()?;

    port.clear(tokio_serial::ClearBuffer::All)?;
    Ok(port)
}

/// Serial port of the host, read until the line goes idle.
pub struct SerialLine {
    stream: SerialStream,
    idle: Duration,
}

impl SerialLine {
    /// `idle` is the silence that ends a read, normally the inter-frame gap.
    pub fn open(parameters: &PortSettings, idle: Duration) -> Result<SerialLine, Error> {
        let stream = build(parameters)?;
        Ok(SerialLine::from_stream(stream, idle))
    }

    pub fn from_stream(stream: SerialStream, idle: Duration) -> SerialLine {
        SerialLine { stream, idle }
    }
}

impl SerialDevice for SerialLine {
    fn available(&mut self) -> Result<usize, Error> {
        Ok(self.stream.bytes_to_read()? as usize)
    }

    async fn read(&mut self, buf: &mut BytesMut) -> Result<usize, Error> {
        let mut total = 0;
        while total < MAX_MESSAGE_SIZE {
            let read = tokio::time::timeout(self.idle, self.stream.read_buf(buf));
            match read.await {
                // line is idle, frame is over
                Err(_) => break,
                Ok(Ok(0)) => break,
                Ok(Ok(nbytes)) => total += nbytes,
                Ok(Err(err)) => return Err(err),
            }
        }
        Ok(total)
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), Error> {
        self.stream.write_all(data).await
    }

    async fn flush(&mut self) -> Result<(), Error> {
        self.stream.flush().await
    }
}

/// DE wired to the port's RTS line, as on many USB/RS485 adapters. The
/// line is switched through the port's own handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct RtsPin;

impl DirectionPin<SerialLine> for RtsPin {
    fn set_transmit(&mut self, line: &mut SerialLine) -> Result<(), Error> {
        line.stream.write_request_to_send(true)?;
        Ok(())
    }

    fn set_receive(&mut self, line: &mut SerialLine) -> Result<(), Error> {
        line.stream.write_request_to_send(false)?;
        Ok(())
    }
}
