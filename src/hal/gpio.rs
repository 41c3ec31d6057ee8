use avr_device::atmega128a::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};
use core::convert::Infallible;
use embedded_hal::digital::v2::{OutputPin, StatefulOutputPin};

use super::pinout::Port;

/// One output-configured line. Only `BigAvr2` creates these, and only for
/// lines it has marked as claimed.
#[derive(Debug)]
pub struct Pin {
    port: Port,
    bit: u8,
}

macro_rules! port_op {
    ($port:expr, |$regs:ident, $pin:ident, $ddr:ident, $out:ident| $body:expr) => {
        match $port {
            Port::A => { let $regs = unsafe { &*PORTA::ptr() }; let ($pin, $ddr, $out) = (&$regs.pina, &$regs.ddra, &$regs.porta); $body }
            Port::B => { let $regs = unsafe { &*PORTB::ptr() }; let ($pin, $ddr, $out) = (&$regs.pinb, &$regs.ddrb, &$regs.portb); $body }
            Port::C => { let $regs = unsafe { &*PORTC::ptr() }; let ($pin, $ddr, $out) = (&$regs.pinc, &$regs.ddrc, &$regs.portc); $body }
            Port::D => { let $regs = unsafe { &*PORTD::ptr() }; let ($pin, $ddr, $out) = (&$regs.pind, &$regs.ddrd, &$regs.portd); $body }
            Port::E => { let $regs = unsafe { &*PORTE::ptr() }; let ($pin, $ddr, $out) = (&$regs.pine, &$regs.ddre, &$regs.porte); $body }
            Port::F => { let $regs = unsafe { &*PORTF::ptr() }; let ($pin, $ddr, $out) = (&$regs.pinf, &$regs.ddrf, &$regs.portf); $body }
        }
    };
}

impl Pin {
    /// Drive low and set the DDRx bit
    pub(crate) fn into_output(port: Port, bit: u8) -> Self {
        let mask = 1u8 << bit;
        avr_device::interrupt::free(|_| {
            port_op!(port, |_regs, _pin, ddr, out| {
                out.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
                ddr.modify(|r, w| unsafe { w.bits(r.bits() | mask) });
            })
        });
        Self { port, bit }
    }

    /// Clear the DDRx bit and disable the pull-up
    pub(crate) fn into_input(self) -> (Port, u8) {
        let mask = 1u8 << self.bit;
        avr_device::interrupt::free(|_| {
            port_op!(self.port, |_regs, _pin, ddr, out| {
                ddr.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
                out.modify(|r, w| unsafe { w.bits(r.bits() & !mask) });
            })
        });
        (self.port, self.bit)
    }

    #[inline]
    fn mask(&self) -> u8 {
        1 << self.bit
    }
}

impl OutputPin for Pin {
    type Error = Infallible;

    #[inline]
    fn set_high(&mut self) -> Result<(), Self::Error> {
        let mask = self.mask();
        avr_device::interrupt::free(|_| {
            port_op!(self.port, |_regs, _pin, _ddr, out| {
                out.modify(|r, w| unsafe { w.bits(r.bits() | mask) })
            })
        });
        Ok(())
    }

    #[inline]
    fn set_low(&mut self) -> Result<(), Self::Error> {
        let mask = self.mask();
        avr_device::interrupt::free(|_| {
            port_op!(self.port, |_regs, _pin, _ddr, out| {
                out.modify(|r, w| unsafe { w.bits(r.bits() & !mask) })
            })
        });
        Ok(())
    }
}

impl StatefulOutputPin for Pin {
    fn is_set_high(&self) -> Result<bool, Self::Error> {
        let mask = self.mask();
        Ok(port_op!(self.port, |_regs, _pin, _ddr, out| out.read().bits() & mask != 0))
    }

    fn is_set_low(&self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}
