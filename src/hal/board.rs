//! BigAVR2 development board: pin claims over the port registers

use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};

use super::gpio::Pin;
use super::pinout::{self, Port, PIN_NAMES};
use super::timer::SystemClock;
use super::{BoardError, BoardIo, Monotonic, Result};

// MCUCSR in data space
const MCUCSR: *mut u8 = 0x54 as *mut u8;
const JTD: u8 = 1 << 7;

/// Hand PF4..PF7 back to the port. With the JTAGEN fuse programmed (the
/// factory setting) they stay JTAG lines until JTD is set, and the bit only
/// takes when written twice within four cycles.
fn disable_jtag() {
    avr_device::interrupt::free(|_| unsafe {
        let mcucsr = core::ptr::read_volatile(MCUCSR) | JTD;
        core::ptr::write_volatile(MCUCSR, mcucsr);
        core::ptr::write_volatile(MCUCSR, mcucsr);
    });
}

pub struct BigAvr2 {
    clock: SystemClock,
    claimed: [u8; Port::COUNT],
    _ports: (PORTA, PORTB, PORTC, PORTD, PORTE, PORTF),
}

impl BigAvr2 {
    /// Takes the port peripherals so nothing else can drive the lines.
    pub fn new(
        clock: SystemClock,
        ports: (PORTA, PORTB, PORTC, PORTD, PORTE, PORTF),
    ) -> Self {
        disable_jtag();
        Self {
            clock,
            claimed: [0; Port::COUNT],
            _ports: ports,
        }
    }
}

impl Monotonic for BigAvr2 {
    fn now_ms(&self) -> u32 {
        self.clock.now_ms()
    }
}

impl BoardIo for BigAvr2 {
    type Pin = Pin;

    fn pin_names(&self) -> &'static [&'static str] {
        &PIN_NAMES
    }

    fn open_output(&mut self, name: &'static str) -> Result<Pin> {
        let (port, bit) = pinout::locate(name).ok_or(BoardError::UnknownPin(name))?;
        let claimed = &mut self.claimed[port.index()];
        if *claimed & (1 << bit) != 0 {
            return Err(BoardError::PinClaimed(name));
        }
        *claimed |= 1 << bit;
        Ok(Pin::into_output(port, bit))
    }

    fn release(&mut self, pin: Pin) {
        let (port, bit) = pin.into_input();
        self.claimed[port.index()] &= !(1 << bit);
    }
}
