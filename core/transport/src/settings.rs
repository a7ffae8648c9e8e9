use std::str::FromStr;
use tokio_serial::{DataBits, Parity, StopBits};

pub const DEFAULT_NMSG: usize = 64;
pub const DEFAULT_DRIVER_ENABLE_CHARS: f64 = 1.0;

/// Serial line parameters, written as `name:speed-bits-parity-stop`,
/// e.g. `/dev/ttyUSB0:9600-8-N-1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSettings {
    pub name: String,
    pub speed: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
}

impl PortSettings {
    pub fn data_bits_count(&self) -> u32 {
        match self.data_bits {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }

    pub fn stop_bits_count(&self) -> u32 {
        match self.stop_bits {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }

    pub fn has_parity(&self) -> bool {
        self.parity != Parity::None
    }
}

impl Default for PortSettings {
    fn default() -> PortSettings {
        PortSettings {
            name: "/dev/ttyUSB0".to_owned(),
            speed: 9600,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl FromStr for PortSettings {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name: String = s.chars().take_while(|c| *c != ':').collect();
        let params: String = s.chars().skip_while(|c| *c != ':').skip(1).collect();
        let info: Vec<&str> = params.split('-').collect();

        if name.len() < 4 {
            return Err("name is too short");
        }

        if info.len() < 4 {
            return Err("not enough port parameters");
        }

        let speed = u32::from_str(info[0]).map_err(|_| "invalid speed")?;
        if speed == 0 {
            return Err("invalid speed");
        }

        let data_bits = match info[1] {
            "5" => Ok(DataBits::Five),
            "6" => Ok(DataBits::Six),
            "7" => Ok(DataBits::Seven),
            "8" => Ok(DataBits::Eight),
            _ => Err("invalid data bits"),
        }?;

        let parity = match info[2] {
            "N" => Ok(Parity::None),
            "E" => Ok(Parity::Even),
            "O" => Ok(Parity::Odd),
            _ => Err("invalid parity"),
        }?;

        let stop_bits = match info[3] {
            "1" => Ok(StopBits::One),
            "2" => Ok(StopBits::Two),
            _ => Err("invalid stop bits"),
        }?;

        Ok(PortSettings {
            name,
            speed,
            data_bits,
            parity,
            stop_bits,
        })
    }
}

/// How the transceiver's driver enable input is wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionControl {
    /// DE follows the port's RTS line.
    Rts,
    /// The transceiver switches on its own.
    None,
}

impl FromStr for DirectionControl {
    type Err = &'static str;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rts" => Ok(DirectionControl::Rts),
            "none" => Ok(DirectionControl::None),
            _ => Err("invalid direction control"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub port: PortSettings,
    /// Capacity of the received message queue.
    pub nmsg: usize,
    /// Time the driver stays enabled after the last byte, in character times.
    pub driver_enable_chars: f64,
    pub direction: DirectionControl,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            port: PortSettings::default(),
            nmsg: DEFAULT_NMSG,
            driver_enable_chars: DEFAULT_DRIVER_ENABLE_CHARS,
            direction: DirectionControl::Rts,
        }
    }
}
