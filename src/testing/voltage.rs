//! Supply voltage monitor test
//!
//! Reads the monitor pin once through the ADC and shows the voltage before
//! the divider. Compare it against a multimeter.

use embedded_hal::serial;
use ufmt::uwrite;

use super::{Bench, PinList, TestCase, TestReport, Verdict};
use crate::config::{LINE_BUFFER_LEN, MONITOR_PIN_NAMES, VOLTAGE_MONITOR_DIVIDER};
use crate::drivers::SerialConsole;
use crate::hal::{AnalogInput, BoardError, BoardIo, Result};
use crate::logger::Event;

/// First board pin wired to a voltage divider
pub fn monitor_pin(pins: &[&'static str]) -> Option<&'static str> {
    pins.iter().copied().find(|name| MONITOR_PIN_NAMES.contains(name))
}

/// `4.98 V`
fn write_volts<S>(console: &mut SerialConsole<S>, millivolts: u32) -> Result<()>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    let hundredths = (millivolts % 1000) / 10;
    uwrite!(console, "{}.", millivolts / 1000)?;
    if hundredths < 10 {
        console.write_byte(b'0')?;
    }
    uwrite!(console, "{} V", hundredths)
}

pub struct VoltageMonitorTest<A> {
    adc: A,
}

impl<A: AnalogInput> VoltageMonitorTest<A> {
    pub fn new(adc: A) -> Self {
        Self { adc }
    }
}

impl<A, B, S> TestCase<B, S> for VoltageMonitorTest<A>
where
    A: AnalogInput,
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    fn name(&self) -> &'static str {
        "Voltage Monitor Test"
    }

    fn heading(&self) -> &'static str {
        "VOLTAGE MONITOR TEST"
    }

    fn run(&mut self, bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport> {
        let pin = match monitor_pin(pins) {
            Some(pin) => pin,
            None => {
                bench.console.write_line("No voltage monitor pin found")?;
                bench.log.log_system(bench.board.now_ms(), Event::NoCandidates("Voltage"));
                return Ok(TestReport::not_applicable());
            }
        };

        bench.console.write_words("Voltage monitor pin found:", &[pin])?;
        let millivolts = self.adc.read_millivolts(pin)? * VOLTAGE_MONITOR_DIVIDER;
        bench.log.log_debug(bench.board.now_ms(), Event::VoltageRead(pin, millivolts));

        bench.console.write_str("Voltage: ")?;
        write_volts(&mut bench.console, millivolts)?;
        bench.console.newline()?;
        bench.console.write_line("Is that the voltage you expected? [y/n]")?;

        let mut buf = [0u8; LINE_BUFFER_LEN];
        let verdict = if bench.console.read_line(&mut buf)? == b"y" {
            Verdict::Pass
        } else {
            Verdict::Fail
        };
        let pins = PinList::from_slice(&[pin]).map_err(|_| BoardError::TooManyPins)?;
        Ok(TestReport::new(verdict, pins))
    }
}
