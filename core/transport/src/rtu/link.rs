use crate::device::{DirectionPin, SerialDevice};
use crate::event::EventLog;
use crate::{Handler, LineTiming, RawMessage, TransportError};
use bytes::BytesMut;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

struct Line<D, P> {
    device: D,
    pin: P,
}

/// Half-duplex RS485 line shared by a polling task and senders.
///
/// The device and its direction pin sit behind one lock that is held for a
/// whole receive poll or a whole send, so the pin is never switched while the
/// other operation is still using the line.
pub struct Rs485Link<D, P> {
    line: Arc<Mutex<Line<D, P>>>,
    timing: LineTiming,
    message_tx: mpsc::Sender<RawMessage>,
    name: String,
}

impl<D, P> Clone for Rs485Link<D, P> {
    fn clone(&self) -> Self {
        Rs485Link {
            line: self.line.clone(),
            timing: self.timing,
            message_tx: self.message_tx.clone(),
            name: self.name.clone(),
        }
    }
}

impl<D, P> Rs485Link<D, P>
where
    D: SerialDevice,
    P: DirectionPin<D>,
{
    /// `nmsg` bounds the queue of received messages.
    pub fn build(device: D, pin: P, timing: LineTiming, nmsg: usize, name: &str) -> (Self, Handler) {
        let (tx, rx) = mpsc::channel(nmsg.max(1));
        let link = Rs485Link {
            line: Arc::new(Mutex::new(Line { device, pin })),
            timing,
            message_tx: tx,
            name: name.to_owned(),
        };
        (link, Handler { message_rx: rx })
    }

    pub fn timing(&self) -> &LineTiming {
        &self.timing
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads whatever the device has received and queues it as one message.
    /// Returns the number of bytes read.
    pub async fn receive_poll(&self) -> Result<usize, TransportError> {
        let mut guard = self.line.lock().await;
        let line = &mut *guard;

        line.pin.set_receive(&mut line.device)?;
        if line.device.available()? == 0 {
            return Ok(0);
        }

        let mut data = BytesMut::new();
        let nbytes = line.device.read(&mut data).await?;
        if nbytes == 0 {
            return Ok(0);
        }

        let message = RawMessage::new(data);
        EventLog::input(&self.name, &message);
        match self.message_tx.try_send(message) {
            Ok(()) => Ok(nbytes),
            Err(TrySendError::Full(message)) => {
                EventLog::warning(&self.name, &format!("queue is full, drop {}", message));
                Ok(nbytes)
            }
            Err(TrySendError::Closed(_)) => Err(TransportError::QueueClosed),
        }
    }

    /// Transmits `data` and returns once the line may be used again.
    pub async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let mut guard = self.line.lock().await;
        let line = &mut *guard;

        EventLog::output(&self.name, data);
        line.pin.set_transmit(&mut line.device)?;
        let written = transmit(&mut line.device, data).await;

        // keep driving the bus until the last stop bit is out
        tokio::time::sleep(self.timing.driver_enable_delay()).await;
        let released = line.pin.set_receive(&mut line.device);
        written?;
        released?;

        tokio::time::sleep(self.timing.tx_delay()).await;
        Ok(())
    }

    /// Polls the line forever. A zero interval polls as often as the
    /// scheduler allows. Stops when the message queue is gone.
    pub fn spawn_polling(&self, interval: Duration) -> JoinHandle<()> {
        let link = self.clone();
        tokio::spawn(async move {
            loop {
                match link.receive_poll().await {
                    Ok(_) => {}
                    Err(TransportError::QueueClosed) => {
                        EventLog::info(&link.name, &"queue closed, stop polling");
                        break;
                    }
                    Err(err) => EventLog::error(&link.name, &err),
                }

                if interval.is_zero() {
                    tokio::task::yield_now().await;
                } else {
                    tokio::time::sleep(interval).await;
                }
            }
        })
    }
}

async fn transmit<D: SerialDevice>(device: &mut D, data: &[u8]) -> Result<(), std::io::Error> {
    device.write(data).await?;
    device.flush().await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::{LineEvent, LineTap, MemoryDevice, MemoryPin};

    fn timing() -> LineTiming {
        LineTiming::from_parts(9600, 8, false, 1, 1.0)
    }

    fn build(tap: &LineTap, nmsg: usize) -> (Rs485Link<MemoryDevice, MemoryPin>, Handler) {
        Rs485Link::build(tap.device(), tap.pin(), timing(), nmsg, "test")
    }

    #[tokio::test(start_paused = true)]
    async fn poll_without_input() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 4);
        assert_eq!(link.receive_poll().await.unwrap(), 0);
        assert!(handler.try_recv().is_none());
        assert_eq!(tap.events(), vec![LineEvent::Receive]);
    }

    #[tokio::test(start_paused = true)]
    async fn poll_queues_one_message() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 4);
        tap.inject(&[0x01, 0x03]);
        tap.inject(&[0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD]);

        assert_eq!(link.receive_poll().await.unwrap(), 8);
        let message = handler.try_recv().unwrap();
        assert_eq!(&message.data[..], &[0x01, 0x03, 0x00, 0x00, 0x00, 0x0A, 0xC5, 0xCD]);
        assert!(handler.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn messages_keep_arrival_order() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 4);
        for i in 0..3u8 {
            tap.inject(&[i]);
            link.receive_poll().await.unwrap();
        }
        for i in 0..3u8 {
            assert_eq!(&handler.try_recv().unwrap().data[..], &[i]);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn full_queue_drops_new_message() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 1);
        tap.inject(&[1]);
        link.receive_poll().await.unwrap();
        tap.inject(&[2]);
        assert_eq!(link.receive_poll().await.unwrap(), 1);

        assert_eq!(&handler.try_recv().unwrap().data[..], &[1]);
        assert!(handler.try_recv().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn closed_queue() {
        let tap = LineTap::new();
        let (link, handler) = build(&tap, 1);
        drop(handler);
        tap.inject(&[1]);
        assert!(matches!(
            link.receive_poll().await,
            Err(TransportError::QueueClosed)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn send_switches_direction() {
        let tap = LineTap::new();
        let (link, _handler) = build(&tap, 1);
        link.send(&[0x01, 0x02]).await.unwrap();

        assert_eq!(
            tap.events(),
            vec![
                LineEvent::Transmit,
                LineEvent::Write(vec![0x01, 0x02]),
                LineEvent::Flush,
                LineEvent::Receive,
            ]
        );
        assert_eq!(tap.written(), vec![0x01, 0x02]);
    }

    #[tokio::test(start_paused = true)]
    async fn send_holds_the_line() {
        let tap = LineTap::new();
        let (link, _handler) = build(&tap, 1);
        let timing = *link.timing();

        let start = tokio::time::Instant::now();
        link.send(&[0x01]).await.unwrap();
        assert!(start.elapsed() >= timing.driver_enable_delay() + timing.tx_delay());
    }

    #[tokio::test(start_paused = true)]
    async fn write_error_releases_direction() {
        let tap = LineTap::new();
        let (link, _handler) = build(&tap, 1);
        tap.fail_next_io(std::io::ErrorKind::BrokenPipe);

        assert!(matches!(
            link.send(&[0x01]).await,
            Err(TransportError::Io(_))
        ));
        assert_eq!(tap.events(), vec![LineEvent::Transmit, LineEvent::Receive]);
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_is_reported() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 1);
        tap.inject(&[1]);
        tap.fail_next_io(std::io::ErrorKind::Other);

        assert!(link.receive_poll().await.is_err());
        assert!(handler.try_recv().is_none());
        // the next poll gets the data
        assert_eq!(link.receive_poll().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn polling_task_collects_input() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 4);
        let task = link.spawn_polling(Duration::from_millis(10));

        tap.inject(&[0xAA]);
        let message = handler.recv().await.unwrap();
        assert_eq!(&message.data[..], &[0xAA]);
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn polling_task_survives_read_error() {
        let tap = LineTap::new();
        let (link, mut handler) = build(&tap, 4);
        tap.inject(&[0x55]);
        tap.fail_next_io(std::io::ErrorKind::Other);

        let task = link.spawn_polling(Duration::from_millis(10));
        let message = handler.recv().await.unwrap();
        assert_eq!(&message.data[..], &[0x55]);
        assert!(!task.is_finished());
        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn polling_task_stops_without_receiver() {
        let tap = LineTap::new();
        let (link, handler) = build(&tap, 4);
        let task = link.spawn_polling(Duration::ZERO);
        drop(handler);

        tap.inject(&[0xAA]);
        task.await.unwrap();
    }
}
