use embedded_hal::serial;
use ufmt::uWrite;

use crate::hal::{BoardError, Result};

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7F;

/// Line-oriented operator console over any embedded-hal serial port.
pub struct SerialConsole<S> {
    serial: S,
    // Byte taken off the wire by `input_available` but not yet consumed
    pending: Option<u8>,
    after_cr: bool,
}

impl<S> SerialConsole<S>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    pub fn new(serial: S) -> Self {
        Self {
            serial,
            pending: None,
            after_cr: false,
        }
    }

    pub fn serial(&self) -> &S {
        &self.serial
    }

    pub fn free(self) -> S {
        self.serial
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        nb::block!(self.serial.write(byte)).map_err(|_| BoardError::Serial)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    pub fn write_line(&mut self, s: &str) -> Result<()> {
        self.write_str(s)?;
        self.newline()
    }

    pub fn newline(&mut self) -> Result<()> {
        self.write_str("\r\n")
    }

    /// `label a b c ` followed by a blank line
    pub fn write_words(&mut self, label: &str, words: &[&str]) -> Result<()> {
        self.write_str(label)?;
        self.write_byte(b' ')?;
        for word in words {
            self.write_str(word)?;
            self.write_byte(b' ')?;
        }
        self.newline()?;
        self.newline()
    }

    /// `['A0', 'D2']`
    pub fn write_pin_list(&mut self, pins: &[&str]) -> Result<()> {
        self.write_byte(b'[')?;
        for (i, pin) in pins.iter().enumerate() {
            if i > 0 {
                self.write_str(", ")?;
            }
            self.write_byte(b'\'')?;
            self.write_str(pin)?;
            self.write_byte(b'\'')?;
        }
        self.write_byte(b']')
    }

    /// Non-blocking check for operator input.
    ///
    /// The first byte of a line is taken off the wire and held for the next
    /// `read_line`. A `\n` that completes a `\r\n` pair from the previous line
    /// does not count as input.
    pub fn input_available(&mut self) -> Result<bool> {
        if self.pending.is_some() {
            return Ok(true);
        }
        loop {
            match self.serial.read() {
                Ok(b'\n') if self.after_cr => self.after_cr = false,
                Ok(byte) => {
                    self.after_cr = false;
                    self.pending = Some(byte);
                    return Ok(true);
                }
                Err(nb::Error::WouldBlock) => return Ok(false),
                Err(nb::Error::Other(_)) => return Err(BoardError::Serial),
            }
        }
    }

    /// Block until a full line has been typed and return it without the
    /// terminator. Keystrokes are echoed; backspace and delete edit the line.
    /// Bytes past `buf.len()` are dropped. Like `input_available`, a `\n`
    /// finishing the previous `\r\n` is skipped.
    pub fn read_line<'b>(&mut self, buf: &'b mut [u8]) -> Result<&'b [u8]> {
        let mut len = 0;
        let mut dropped = 0usize;
        loop {
            let byte = match self.pending.take() {
                Some(byte) => byte,
                None => nb::block!(self.serial.read()).map_err(|_| BoardError::Serial)?,
            };
            let after_cr = core::mem::replace(&mut self.after_cr, false);
            match byte {
                // Second half of the previous line's `\r\n`
                b'\n' if after_cr => continue,
                b'\r' | b'\n' => {
                    self.after_cr = byte == b'\r';
                    self.newline()?;
                    return Ok(&buf[..len]);
                }
                BACKSPACE | DELETE => {
                    if dropped > 0 {
                        dropped -= 1;
                    } else if len > 0 {
                        len -= 1;
                    } else {
                        continue;
                    }
                    self.write_bytes(b"\x08 \x08")?;
                }
                _ => {
                    if len < buf.len() && dropped == 0 {
                        buf[len] = byte;
                        len += 1;
                    } else {
                        dropped += 1;
                    }
                    self.write_byte(byte)?;
                }
            }
        }
    }
}

impl<S> uWrite for SerialConsole<S>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    type Error = BoardError;

    fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }
}
