use crate::error::MarkerError;
use crate::port::MarkerPort;
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::time::Duration;
use tracing::warn;
use vistim_timing::Timer;

/// Byte written to raise the trigger line.
pub const TTL_HIGH: u8 = 0x10;
pub const TTL_LOW: u8 = 0x00;
/// Width of one trigger pulse.
pub const PULSE_WIDTH: Duration = Duration::from_millis(1);
/// Gap per unit of a digit between its two pulses.
pub const DIGIT_STEP: Duration = Duration::from_millis(5);
/// Gap used for digit zero.
pub const ZERO_GAP: Duration = Duration::from_millis(1);
/// Rest after every digit.
pub const DIGIT_REST: Duration = Duration::from_millis(2);

const SEPARATOR_DIGITS: [u32; 4] = [0, 0, 16, 0];
const END_DIGITS: [u32; 4] = [0, 0, 0, 16];

/// A single output line that accepts raw bytes.
pub trait TtlLine: Send {
    fn write_byte(&mut self, byte: u8) -> std::io::Result<()>;
}

/// Device file line, e.g. `/dev/port` at the parallel port base 0x378, or a
/// serial TTL adapter with no offset.
#[derive(Debug)]
pub struct DeviceLine {
    file: File,
    offset: Option<u64>,
}

impl DeviceLine {
    pub fn open(path: &str, offset: Option<u64>) -> Result<Self, MarkerError> {
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| MarkerError::Open {
                path: path.to_string(),
                source,
            })?;
        Ok(Self { file, offset })
    }
}

impl TtlLine for DeviceLine {
    fn write_byte(&mut self, byte: u8) -> std::io::Result<()> {
        if let Some(offset) = self.offset {
            self.file.seek(SeekFrom::Start(offset))?;
        }
        self.file.write_all(&[byte])?;
        self.file.flush()
    }
}

/// Pulse-interval encoder over a TTL line.
///
/// Each integer goes out as four base-16 digits, most significant first. A
/// digit is two pulses separated by `5 ms * d` (1 ms for zero), followed by a
/// 2 ms rest.
#[derive(Debug)]
pub struct TtlPort<L: TtlLine, T: Timer> {
    line: L,
    timer: T,
}

impl<L: TtlLine, T: Timer> TtlPort<L, T> {
    pub fn new(line: L, timer: T) -> Self {
        Self { line, timer }
    }

    pub fn line(&self) -> &L {
        &self.line
    }

    fn pulse(&mut self) -> Result<(), MarkerError> {
        self.line.write_byte(TTL_HIGH)?;
        self.timer.sleep(PULSE_WIDTH);
        self.line.write_byte(TTL_LOW)?;
        Ok(())
    }

    fn digit(&mut self, d: u32) -> Result<(), MarkerError> {
        self.pulse()?;
        self.timer.sleep(if d == 0 { ZERO_GAP } else { DIGIT_STEP * d });
        self.pulse()?;
        self.timer.sleep(DIGIT_REST);
        Ok(())
    }

    fn digits(&mut self, digits: [u32; 4]) -> Result<(), MarkerError> {
        digits.into_iter().try_for_each(|d| self.digit(d))
    }
}

pub(crate) fn to_digits(value: u32) -> [u32; 4] {
    [
        (value >> 12) & 0xF,
        (value >> 8) & 0xF,
        (value >> 4) & 0xF,
        value & 0xF,
    ]
}

impl<L: TtlLine, T: Timer> MarkerPort for TtlPort<L, T> {
    fn encode(&mut self, value: i32) -> Result<(), MarkerError> {
        let clamped = value.clamp(0, 0xFFFF);
        if clamped != value {
            warn!(value, clamped, "marker value outside 16-bit range");
        }
        self.digits(to_digits(clamped as u32))
    }

    fn encode_separator(&mut self) -> Result<(), MarkerError> {
        self.digits(SEPARATOR_DIGITS)
    }

    fn encode_end(&mut self) -> Result<(), MarkerError> {
        self.digits(END_DIGITS)
    }

    fn trigger(&mut self) -> Result<(), MarkerError> {
        self.pulse()
    }
}
