use super::function::Function;
use super::{common, crc, error::FrameError, CRC_SIZE, MAX_ADDRESS, MIN_FRAME_SIZE};
use byteorder::{BigEndian, ByteOrder};
use smallvec::SmallVec;
use std::fmt;

const MAX_DATA_SIZE: usize = 256; // inline storage for response payloads

pub type Fields = SmallVec<[u16; 2]>;
pub type Payload = SmallVec<[u8; MAX_DATA_SIZE]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameData {
    /// Big-endian u16 fields following the function code.
    Request(Fields),

    /// Bytes following the byte count.
    Response(Payload),
}

impl FrameData {
    pub fn request(fields: &[u16]) -> FrameData {
        FrameData::Request(Fields::from_slice(fields))
    }

    pub fn response(payload: &[u8]) -> FrameData {
        FrameData::Response(Payload::from_slice(payload))
    }

    pub fn len(&self) -> usize {
        match self {
            FrameData::Request(fields) => fields.len(),
            FrameData::Response(payload) => payload.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One RTU frame: slave address, function and function specific data.
/// Only constructed through validating paths, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    address: u8,
    function: Function,
    data: FrameData,
}

impl Frame {
    pub fn from_fields(address: u8, function: Function, data: FrameData) -> Result<Frame, FrameError> {
        if address > MAX_ADDRESS {
            return Err(FrameError::InvalidAddress(address));
        }

        match &data {
            FrameData::Request(fields) if fields.len() != function.fields() => {
                return Err(FrameError::InvalidDataLength(fields.len()));
            }
            FrameData::Response(payload) if !common::payload_check(payload.len()) => {
                return Err(FrameError::InvalidDataLength(payload.len()));
            }
            _ => {}
        }

        Ok(Frame {
            address,
            function,
            data,
        })
    }

    /// 0x1
    pub fn read_coils(address: u8, start: u16, count: u16) -> Result<Frame, FrameError> {
        Frame::from_fields(address, Function::ReadCoils, FrameData::request(&[start, count]))
    }

    /// 0x3
    pub fn read_holding_registers(address: u8, start: u16, count: u16) -> Result<Frame, FrameError> {
        Frame::from_fields(
            address,
            Function::ReadHoldingRegisters,
            FrameData::request(&[start, count]),
        )
    }

    pub fn response(address: u8, function: Function, payload: &[u8]) -> Result<Frame, FrameError> {
        Frame::from_fields(address, function, FrameData::response(payload))
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    pub fn function(&self) -> Function {
        self.function
    }

    pub fn data(&self) -> &FrameData {
        &self.data
    }

    pub fn is_response(&self) -> bool {
        matches!(self.data, FrameData::Response(_))
    }

    pub fn is_broadcast(&self) -> bool {
        self.address == crate::BROADCAST_ADDRESS
    }

    pub fn fields(&self) -> Option<&[u16]> {
        match &self.data {
            FrameData::Request(fields) => Some(fields.as_slice()),
            FrameData::Response(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match &self.data {
            FrameData::Request(_) => None,
            FrameData::Response(payload) => Some(payload.as_slice()),
        }
    }

    /// (start, count) of a read request.
    pub fn range(&self) -> Option<(u16, u16)> {
        match self.fields()? {
            [start, count] => Some((*start, *count)),
            _ => None,
        }
    }

    /// Length of address + function + data, without CRC.
    pub fn pdu_len(&self) -> usize {
        match &self.data {
            FrameData::Request(fields) => 2 + fields.len() * 2,
            FrameData::Response(payload) => 3 + payload.len(),
        }
    }

    pub fn wire_len(&self) -> usize {
        self.pdu_len() + CRC_SIZE
    }

    /// Wire bytes: PDU followed by CRC, low byte first.
    pub fn to_bytes(&self) -> Vec<u8> {
        let pdu_len = self.pdu_len();
        let mut buffer = vec![0u8; pdu_len + CRC_SIZE];
        buffer[0] = self.address;
        buffer[1] = self.function.code();

        match &self.data {
            FrameData::Request(fields) => {
                BigEndian::write_u16_into(fields, &mut buffer[2..pdu_len]);
            }
            FrameData::Response(payload) => {
                buffer[2] = payload.len() as u8;
                buffer[3..pdu_len].copy_from_slice(payload);
            }
        }

        let crc = crc::crc16_bytes(&buffer[..pdu_len]);
        buffer[pdu_len..].copy_from_slice(&crc);
        buffer
    }

    /// Parses a request frame from the start of `bytes`. On success returns the
    /// frame and whatever follows it.
    pub fn parse(bytes: &[u8]) -> Result<(Frame, &[u8]), FrameError> {
        let (address, function) = parse_header(bytes)?;

        let nfields = function.fields();
        let pdu_len = 2 + nfields * 2;
        if bytes.len() < pdu_len + CRC_SIZE {
            return Err(FrameError::FrameTooShort);
        }

        let mut fields = Fields::from_elem(0, nfields);
        BigEndian::read_u16_into(&bytes[2..pdu_len], &mut fields);
        check_crc(&bytes[..pdu_len], &bytes[pdu_len..pdu_len + CRC_SIZE])?;

        let frame = Frame {
            address,
            function,
            data: FrameData::Request(fields),
        };
        Ok((frame, &bytes[pdu_len + CRC_SIZE..]))
    }

    /// Parses a response frame (address, function, byte count, payload, CRC).
    pub fn parse_response(bytes: &[u8]) -> Result<(Frame, &[u8]), FrameError> {
        let (address, function) = parse_header(bytes)?;

        let count = bytes[2] as usize;
        if !common::payload_check(count) {
            return Err(FrameError::InvalidDataLength(count));
        }

        let pdu_len = 3 + count;
        if bytes.len() < pdu_len + CRC_SIZE {
            return Err(FrameError::FrameTooShort);
        }

        check_crc(&bytes[..pdu_len], &bytes[pdu_len..pdu_len + CRC_SIZE])?;

        let frame = Frame {
            address,
            function,
            data: FrameData::response(&bytes[3..pdu_len]),
        };
        Ok((frame, &bytes[pdu_len + CRC_SIZE..]))
    }
}

fn parse_header(bytes: &[u8]) -> Result<(u8, Function), FrameError> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(FrameError::FrameTooShort);
    }

    let address = bytes[0];
    if address > MAX_ADDRESS {
        return Err(FrameError::InvalidAddress(address));
    }

    let function = Function::try_from(bytes[1])?;
    Ok((address, function))
}

fn check_crc(pdu: &[u8], wire: &[u8]) -> Result<(), FrameError> {
    let expected = crc::crc16(pdu);
    let actual = u16::from_le_bytes([wire[0], wire[1]]);
    if expected == actual {
        Ok(())
    } else {
        Err(FrameError::CrcMismatch { expected, actual })
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.data {
            FrameData::Request(fields) => write!(
                f,
                "address:{} function:{} fields:{:?}",
                self.address, self.function, fields
            ),
            FrameData::Response(payload) => write!(
                f,
                "address:{} function:{} payload:{:02X?}",
                self.address, self.function, payload
            ),
        }
    }
}
