use bytes::BytesMut;
use std::future::Future;
use std::io;

/// Byte oriented serial device under the RS485 transceiver.
pub trait SerialDevice: Send + 'static {
    /// Number of received bytes waiting to be read.
    fn available(&mut self) -> io::Result<usize>;

    /// Appends received bytes to `buf`. Returns once the line has been idle
    /// long enough to mark the end of a frame.
    fn read(&mut self, buf: &mut BytesMut) -> impl Future<Output = io::Result<usize>> + Send;

    fn write(&mut self, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    /// Waits until everything written has physically left the device.
    fn flush(&mut self) -> impl Future<Output = io::Result<()>> + Send;
}

/// Driver enable output of the transceiver. It is handed the device it
/// belongs to, so a pin wired to a modem line of the port can drive it
/// through the port itself.
pub trait DirectionPin<D>: Send + 'static {
    fn set_transmit(&mut self, device: &mut D) -> io::Result<()>;
    fn set_receive(&mut self, device: &mut D) -> io::Result<()>;
}

/// For transceivers with automatic direction control.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl<D> DirectionPin<D> for NoPin {
    fn set_transmit(&mut self, _device: &mut D) -> io::Result<()> {
        Ok(())
    }

    fn set_receive(&mut self, _device: &mut D) -> io::Result<()> {
        Ok(())
    }
}
