use crate::status::{LogStatus, StatusSink};
use crate::store::{Coils, HoldingRegisters, LAST_HOLDING_REGISTER};
use crate::{ClientError, Config};
use bytes::{BufMut, BytesMut};
use codec::RtuCodec;
use frame::{common, Frame, FrameError, Function};
use log::{debug, error, info, warn};
use tokio_util::codec::{Decoder, Encoder};
use transport::{DirectionPin, Handler, RawMessage, Rs485Link, SerialDevice};

/// Modbus RTU slave: answers read requests addressed to it from its own
/// register and coil stores.
pub struct Client<D, P> {
    config: Config,
    link: Rs485Link<D, P>,
    handler: Handler,
    codec: RtuCodec,
    registers: HoldingRegisters,
    coils: Coils,
    status: Box<dyn StatusSink>,
}

impl<D, P> Client<D, P>
where
    D: SerialDevice,
    P: DirectionPin<D>,
{
    pub fn new(config: Config, link: Rs485Link<D, P>, handler: Handler) -> Client<D, P> {
        let codec = RtuCodec::new(link.name());
        Client {
            config,
            link,
            handler,
            codec,
            registers: HoldingRegisters::new(),
            coils: Coils::new(),
            status: Box::new(LogStatus),
        }
    }

    pub fn with_status<S: StatusSink + 'static>(mut self, status: S) -> Client<D, P> {
        self.status = Box::new(status);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn holding_registers(&self) -> &HoldingRegisters {
        &self.registers
    }

    pub fn holding_registers_mut(&mut self) -> &mut HoldingRegisters {
        &mut self.registers
    }

    pub fn coils(&self) -> &Coils {
        &self.coils
    }

    pub fn coils_mut(&mut self) -> &mut Coils {
        &mut self.coils
    }

    /// Serves requests until the task is dropped.
    pub async fn run_loop(&mut self) {
        info!(
            "{} slave {} is running",
            self.link.name(),
            self.config.address()
        );
        self.status
            .append(&format!("slave {} ready", self.config.address()));
        loop {
            self.poll_messages().await;
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }

    /// Handles every queued message, oldest first. Returns the number of
    /// messages taken off the queue.
    pub async fn poll_messages(&mut self) -> usize {
        let mut nmsg = 0;
        while let Some(message) = self.handler.try_recv() {
            self.handle_message(message).await;
            nmsg += 1;
        }
        nmsg
    }

    /// Extracts and serves all frames of one message. Returns the number of
    /// frames found.
    pub async fn handle_message(&mut self, message: RawMessage) -> usize {
        debug!("{} {}", self.link.name(), message);
        let mut data = message.data;
        let mut nframes = 0;
        loop {
            match self.try_parse(&mut data) {
                Ok(Some(frame)) => {
                    nframes += 1;
                    if let Err(err) = self.dispatch(frame).await {
                        self.report(&err);
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    self.report(&err);
                    break;
                }
            }
        }
        nframes
    }

    /// Next frame of `data`. Bytes that cannot complete a frame are
    /// dropped, a message never continues in the next one.
    pub fn try_parse(&mut self, data: &mut BytesMut) -> Result<Option<Frame>, ClientError> {
        match self.codec.decode(data)? {
            Some(frame) => Ok(Some(frame)),
            None => {
                if !data.is_empty() {
                    let err = ClientError::Frame(FrameError::FrameTooShort);
                    warn!(
                        "{} {}, drop {:02X?}",
                        self.link.name(),
                        err,
                        &data[..]
                    );
                    self.status
                        .append(&format!("error: {}, {} byte(s) dropped", err, data.len()));
                    data.clear();
                }
                Ok(None)
            }
        }
    }

    pub async fn dispatch(&mut self, frame: Frame) -> Result<(), ClientError> {
        if frame.is_broadcast() {
            info!("{} broadcast {}, no response", self.link.name(), frame);
            return Ok(());
        }

        if frame.address() != self.config.address() {
            debug!("{} ignore {}", self.link.name(), frame);
            return Ok(());
        }

        let response = match frame.function() {
            Function::ReadCoils => self.handle_read_coils(&frame)?,
            Function::ReadHoldingRegisters => self.handle_read_holding_registers(&frame)?,
        };
        self.send_response(response).await
    }

    /// 0x3
    pub fn handle_read_holding_registers(&self, frame: &Frame) -> Result<Frame, ClientError> {
        let (start, count) = request_range(frame)?;
        if start > LAST_HOLDING_REGISTER {
            return Err(ClientError::InvalidRegister(start));
        }
        if !common::nregs_check(count) {
            return Err(ClientError::InvalidQuantity(count));
        }

        let values = self.registers.read(start, count);
        let mut payload = BytesMut::with_capacity(common::nregs_len(count));
        for value in values {
            payload.put_u16(value);
        }

        let response = Frame::response(
            self.config.address(),
            Function::ReadHoldingRegisters,
            &payload,
        )?;
        Ok(response)
    }

    /// 0x1
    pub fn handle_read_coils(&self, frame: &Frame) -> Result<Frame, ClientError> {
        let (start, count) = request_range(frame)?;
        if !common::ncoils_check(count) {
            return Err(ClientError::InvalidQuantity(count));
        }
        let payload = common::bytes_from_bits(&self.coils.read(start, count));
        let response = Frame::response(self.config.address(), Function::ReadCoils, &payload)?;
        Ok(response)
    }

    pub async fn send_response(&mut self, frame: Frame) -> Result<(), ClientError> {
        let mut buffer = BytesMut::new();
        self.codec.encode(frame, &mut buffer)?;
        self.link.send(&buffer).await?;
        Ok(())
    }

    fn report(&mut self, err: &ClientError) {
        error!("{} {}", self.link.name(), err);
        self.status.append(&format!("error: {}", err));
    }
}

fn request_range(frame: &Frame) -> Result<(u16, u16), ClientError> {
    frame
        .range()
        .ok_or(ClientError::Frame(FrameError::InvalidDataLength(
            frame.data().len(),
        )))
}
