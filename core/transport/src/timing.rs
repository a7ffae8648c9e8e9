//! Modbus RTU line timing derived from the serial parameters.

use crate::settings::PortSettings;
use std::time::Duration;

/// From this speed on the silent intervals are fixed instead of being
/// derived from the character time.
pub const FAST_BAUD: u32 = 19200;
pub const FAST_INTER_CHAR: Duration = Duration::from_micros(750);
pub const FAST_INTER_FRAME: Duration = Duration::from_micros(1750);

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTiming {
    baud: u32,
    char_time: Duration,
    inter_char: Duration,
    inter_frame: Duration,
    driver_enable_delay: Duration,
    tx_delay: Duration,
}

impl LineTiming {
    pub fn new(port: &PortSettings, driver_enable_chars: f64) -> LineTiming {
        LineTiming::from_parts(
            port.speed,
            port.data_bits_count(),
            port.has_parity(),
            port.stop_bits_count(),
            driver_enable_chars,
        )
    }

    pub fn from_parts(
        baud: u32,
        data_bits: u32,
        parity: bool,
        stop_bits: u32,
        driver_enable_chars: f64,
    ) -> LineTiming {
        let baud = baud.max(1);
        let bits = (data_bits + stop_bits + parity as u32) as u64;
        let char_nanos = NANOS_PER_SEC * bits / baud as u64;
        let char_time = Duration::from_nanos(char_nanos);

        let (inter_char, inter_frame) = if baud >= FAST_BAUD {
            (FAST_INTER_CHAR, FAST_INTER_FRAME)
        } else {
            (
                Duration::from_nanos(char_nanos * 3 / 2),
                Duration::from_nanos(char_nanos * 7 / 2),
            )
        };

        let driver_enable_delay = if driver_enable_chars.is_finite() && driver_enable_chars > 0.0 {
            Duration::from_nanos((char_nanos as f64 * driver_enable_chars).round() as u64)
        } else {
            Duration::ZERO
        };

        LineTiming {
            baud,
            char_time,
            inter_char,
            inter_frame,
            driver_enable_delay,
            tx_delay: inter_frame,
        }
    }

    pub fn baud(&self) -> u32 {
        self.baud
    }

    /// Time to put one character on the line.
    pub fn char_time(&self) -> Duration {
        self.char_time
    }

    /// Longest silence allowed between two bytes of one frame (t1.5).
    pub fn inter_char(&self) -> Duration {
        self.inter_char
    }

    /// Silence that separates two frames (t3.5).
    pub fn inter_frame(&self) -> Duration {
        self.inter_frame
    }

    /// How long the driver stays enabled after the output has been flushed.
    pub fn driver_enable_delay(&self) -> Duration {
        self.driver_enable_delay
    }

    /// Silence kept after a transmission before the line is released.
    pub fn tx_delay(&self) -> Duration {
        self.tx_delay
    }
}
