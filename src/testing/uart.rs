//! UART loopback test
//!
//! Needs a jumper wire from the TX pin to the RX pin of the spare port.

use embedded_hal::serial;
use ufmt::uwrite;

use super::{Bench, PinList, TestCase, TestReport, Verdict};
use crate::config::{LINE_BUFFER_LEN, UART_TEST_BYTES, UART_TIMEOUT_MS};
use crate::hal::{BoardError, BoardIo, LoopbackPort, Monotonic, Result};
use crate::logger::{Event, Logger};

/// Wait for one byte. Receive errors and silence both count as nothing.
fn read_timeout<U, M>(port: &mut U, clock: &M, timeout_ms: u32) -> Option<u8>
where
    U: serial::Read<u8>,
    M: Monotonic + ?Sized,
{
    let start = clock.now_ms();
    loop {
        match port.read() {
            Ok(byte) => return Some(byte),
            Err(nb::Error::Other(_)) => return None,
            Err(nb::Error::WouldBlock) => {
                if clock.now_ms().wrapping_sub(start) > timeout_ms {
                    return None;
                }
            }
        }
    }
}

/// Send `bytes` one at a time and check each comes back unchanged.
/// The first mismatch is logged and ends the run.
pub fn loopback<U, M>(port: &mut U, clock: &M, log: &mut Logger, bytes: &[u8]) -> bool
where
    U: LoopbackPort,
    M: Monotonic + ?Sized,
{
    for &sent in bytes {
        let received = match nb::block!(port.write(sent)) {
            Ok(()) => read_timeout(port, clock, UART_TIMEOUT_MS),
            Err(_) => None,
        };
        if received != Some(sent) {
            log.log_debug(clock.now_ms(), Event::LoopbackMismatch { sent, received });
            return false;
        }
    }
    true
}

pub struct UartTest<U> {
    port: U,
    tx: &'static str,
    rx: &'static str,
}

impl<U: LoopbackPort> UartTest<U> {
    pub fn new(port: U, tx: &'static str, rx: &'static str) -> Self {
        Self { port, tx, rx }
    }
}

impl<U, B, S> TestCase<B, S> for UartTest<U>
where
    U: LoopbackPort,
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    fn name(&self) -> &'static str {
        "UART Test"
    }

    fn heading(&self) -> &'static str {
        "UART TEST"
    }

    fn run(&mut self, bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport> {
        if !(pins.contains(&self.tx) && pins.contains(&self.rx)) {
            bench.console.write_line("No UART pins found")?;
            bench.log.log_system(bench.board.now_ms(), Event::NoCandidates("UART"));
            return Ok(TestReport::not_applicable());
        }

        uwrite!(bench.console, "Connect pin {} to pin {}", self.tx, self.rx)?;
        bench.console.newline()?;
        bench.console.write_line("Press enter to continue")?;
        let mut buf = [0u8; LINE_BUFFER_LEN];
        bench.console.read_line(&mut buf)?;

        bench.log.log_system(bench.board.now_ms(), Event::TestStarted("UART"));
        self.port.enable();
        let passed = loopback(&mut self.port, &bench.board, &mut bench.log, UART_TEST_BYTES);
        self.port.disable();

        let verdict = if passed { Verdict::Pass } else { Verdict::Fail };
        let pins = PinList::from_slice(&[self.tx, self.rx]).map_err(|_| BoardError::TooManyPins)?;
        Ok(TestReport::new(verdict, pins))
    }
}
