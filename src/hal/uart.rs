use avr_device::atmega128a::{USART0, USART1};
use core::convert::Infallible;
use embedded_hal::serial;

use super::LoopbackPort;
use crate::config::CPU_FREQ_HZ;

// UCSRnA
const RXC: u8 = 1 << 7;
const UDRE: u8 = 1 << 5;
const FE: u8 = 1 << 4;
const DOR: u8 = 1 << 3;
// UCSRnB
const RXEN: u8 = 1 << 4;
const TXEN: u8 = 1 << 3;
// UCSRnC: async, 8 data bits, no parity, 1 stop bit
const UCSZ_8N1: u8 = 0b0000_0110;

/// Baud rate divisor for normal-speed async mode
const fn ubrr(baud: u32) -> u16 {
    (CPU_FREQ_HZ / (16 * baud) - 1) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Framing,
    Overrun,
}

pub trait UartRegisterBlock {
    fn set_baud(&self, divisor: u16);
    fn set_frame(&self, bits: u8);
    fn set_control(&self, bits: u8);
    fn status(&self) -> u8;
    fn read_data(&self) -> u8;
    fn write_data(&self, byte: u8);
}

// Same layout on both ports, only the register names carry the index
macro_rules! impl_uart_registers {
    ($USART:ty, $udr:ident, $ucsra:ident, $ucsrb:ident, $ucsrc:ident, $ubrrl:ident, $ubrrh:ident) => {
        impl UartRegisterBlock for $USART {
            fn set_baud(&self, divisor: u16) {
                unsafe {
                    self.$ubrrh.write(|w| w.bits((divisor >> 8) as u8));
                    self.$ubrrl.write(|w| w.bits(divisor as u8));
                }
            }

            fn set_frame(&self, bits: u8) {
                self.$ucsrc.write(|w| unsafe { w.bits(bits) });
            }

            fn set_control(&self, bits: u8) {
                self.$ucsrb.write(|w| unsafe { w.bits(bits) });
            }

            #[inline]
            fn status(&self) -> u8 {
                self.$ucsra.read().bits()
            }

            #[inline]
            fn read_data(&self) -> u8 {
                self.$udr.read().bits()
            }

            #[inline]
            fn write_data(&self, byte: u8) {
                self.$udr.write(|w| unsafe { w.bits(byte) });
            }
        }
    };
}

impl_uart_registers!(USART0, udr0, ucsr0a, ucsr0b, ucsr0c, ubrr0l, ubrr0h);
impl_uart_registers!(USART1, udr1, ucsr1a, ucsr1b, ucsr1c, ubrr1l, ubrr1h);

/// Polled USART. Nothing is buffered in software, so `read` reports
/// `WouldBlock` until a byte has landed in UDRn.
pub struct Uart<USART> {
    usart: USART,
}

/// Operator console port (PE0/PE1)
pub type Usart0 = Uart<USART0>;
/// Loopback port (PD2/PD3)
pub type Usart1 = Uart<USART1>;

impl<USART: UartRegisterBlock> Uart<USART> {
    /// Configure and enable transmitter and receiver
    pub fn new(usart: USART, baud: u32) -> Self {
        let mut uart = Self::new_disabled(usart, baud);
        uart.enable();
        uart
    }

    /// Configure the frame and baud rate but leave the port off, so its
    /// pins keep behaving as plain I/O
    pub fn new_disabled(usart: USART, baud: u32) -> Self {
        usart.set_control(0);
        usart.set_baud(ubrr(baud));
        usart.set_frame(UCSZ_8N1);
        Self { usart }
    }
}

impl<USART: UartRegisterBlock> LoopbackPort for Uart<USART> {
    fn enable(&mut self) {
        self.usart.set_control(RXEN | TXEN);
        while self.usart.status() & RXC != 0 {
            let _ = self.usart.read_data();
        }
    }

    fn disable(&mut self) {
        self.usart.set_control(0);
    }
}

impl<USART: UartRegisterBlock> serial::Read<u8> for Uart<USART> {
    type Error = Error;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        let status = self.usart.status();
        if status & RXC == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // Error flags are only valid before UDRn is read, and reading clears them
        let byte = self.usart.read_data();
        if status & FE != 0 {
            Err(nb::Error::Other(Error::Framing))
        } else if status & DOR != 0 {
            Err(nb::Error::Other(Error::Overrun))
        } else {
            Ok(byte)
        }
    }
}

impl<USART: UartRegisterBlock> serial::Write<u8> for Uart<USART> {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        if self.usart.status() & UDRE == 0 {
            return Err(nb::Error::WouldBlock);
        }
        self.usart.write_data(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        if self.usart.status() & UDRE == 0 {
            Err(nb::Error::WouldBlock)
        } else {
            Ok(())
        }
    }
}
