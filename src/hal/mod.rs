//! Board capabilities consumed by the tests
//!
//! The tests never touch registers directly. A board exposes its pin table,
//! hands out output-configured pins by name, takes them back, and reports a
//! millisecond clock. The analog and loopback tests additionally get an ADC
//! and a second serial port. The AVR backends below implement these for the
//! BigAVR2 board; `mock` implements them for host tests.

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;
use ufmt::{uDisplay, uWrite, Formatter};

pub mod pinout;

#[cfg(target_arch = "avr")]
pub mod adc;
#[cfg(all(target_arch = "avr", feature = "atmega128"))]
pub mod board;
#[cfg(target_arch = "avr")]
pub mod gpio;
#[cfg(target_arch = "avr")]
pub mod power;
#[cfg(target_arch = "avr")]
pub mod timer;
#[cfg(target_arch = "avr")]
pub mod uart;

#[cfg(test)]
pub mod mock;

#[cfg(target_arch = "avr")]
pub use adc::Adc;
#[cfg(all(target_arch = "avr", feature = "atmega128"))]
pub use board::BigAvr2;
#[cfg(target_arch = "avr")]
pub use power::Power;
#[cfg(target_arch = "avr")]
pub use timer::SystemClock;
#[cfg(target_arch = "avr")]
pub use uart::{Usart0, Usart1};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardError {
    /// Name is not in the board's pin table
    UnknownPin(&'static str),
    /// Line is already held by another handle
    PinClaimed(&'static str),
    /// More pins requested than a test can hold
    TooManyPins,
    /// Driving a pin failed
    PinWrite(&'static str),
    /// Console transport failed
    Serial,
    /// Pin has no ADC channel behind it
    NotAnalog(&'static str),
    /// Suite runner has no room left for another result
    TooManyTests,
}

pub type Result<T> = core::result::Result<T, BoardError>;

impl uDisplay for BoardError {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        match *self {
            BoardError::UnknownPin(name) => {
                f.write_str("unknown pin ")?;
                f.write_str(name)
            }
            BoardError::PinClaimed(name) => {
                f.write_str("pin already in use ")?;
                f.write_str(name)
            }
            BoardError::TooManyPins => f.write_str("too many pins"),
            BoardError::PinWrite(name) => {
                f.write_str("cannot drive pin ")?;
                f.write_str(name)
            }
            BoardError::Serial => f.write_str("serial error"),
            BoardError::NotAnalog(name) => {
                f.write_str("no ADC channel on ")?;
                f.write_str(name)
            }
            BoardError::TooManyTests => f.write_str("too many tests"),
        }
    }
}

/// Free-running millisecond counter. Wraps after ~49 days.
pub trait Monotonic {
    fn now_ms(&self) -> u32;
}

/// Pin namespace and digital output driver of a board.
///
/// A pin is exclusively owned between `open_output` and `release`; opening a
/// line that is still held fails with `BoardError::PinClaimed`.
pub trait BoardIo: Monotonic {
    type Pin: OutputPin;

    /// Every pin name the board exposes, in board order
    fn pin_names(&self) -> &'static [&'static str];

    /// Claim the named line and configure it as a push-pull output
    fn open_output(&mut self, name: &'static str) -> Result<Self::Pin>;

    /// Return the line to its reset state (input, no pull-up)
    fn release(&mut self, pin: Self::Pin);
}

/// Voltage readings by pin name
pub trait AnalogInput {
    /// Millivolts at the pin, against the ADC reference
    fn read_millivolts(&mut self, name: &'static str) -> Result<u32>;
}

/// Spare serial port for a TX-to-RX loopback. It stays disabled, leaving its
/// lines to the GPIO driver, except between `enable` and `disable`.
pub trait LoopbackPort: serial::Read<u8> + serial::Write<u8> {
    /// Turn the transmitter and receiver on with an empty receive buffer
    fn enable(&mut self);

    fn disable(&mut self);
}

#[inline]
pub fn set_level<P: OutputPin>(pin: &mut P, high: bool, name: &'static str) -> Result<()> {
    let res = if high { pin.set_high() } else { pin.set_low() };
    res.map_err(|_| BoardError::PinWrite(name))
}
