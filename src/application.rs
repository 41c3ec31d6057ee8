//! Application layer for the board test firmware
//! These are the flows behind the two binaries; they only see the board and
//! console through `Bench`, so the host tests drive them with the mock board.

use embedded_hal::serial;
use ufmt::uwrite;

use crate::config::{UART_RX_PIN_NAME, UART_TX_PIN_NAME, VERSION};
use crate::hal::{AnalogInput, BoardIo, LoopbackPort, Result};
use crate::logger::Event;
use crate::testing::{
    gpio, Bench, GpioTest, LedTest, TestRunner, UartTest, Verdict, VoltageMonitorTest,
};

/// Standalone GPIO test: list every pin, toggle the GPIO, report.
pub fn gpio_main<B, S>(bench: &mut Bench<B, S>) -> Result<Verdict>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    let pins = bench.board.pin_names();
    bench.console.newline()?;
    bench.console.write_words("All pins found:", pins)?;

    let report = gpio::run_test(bench, pins)?;

    let console = &mut bench.console;
    console.newline()?;
    console.write_line(report.verdict.as_str())?;
    console.write_str("Pins tested: ")?;
    console.write_pin_list(&report.pins)?;
    console.newline()?;

    let now = bench.board.now_ms();
    bench.log.log_system(now, Event::Verdict("GPIO Test", report.verdict));
    Ok(report.verdict)
}

/// LED, GPIO, voltage monitor and UART loopback tests in turn, then the
/// results table. `analog` reads the monitor pin and `loopback` is the spare
/// serial port wired TX to RX.
pub fn suite_main<B, S, A, U>(bench: &mut Bench<B, S>, analog: A, loopback: U) -> Result<TestRunner>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
    A: AnalogInput,
    U: LoopbackPort,
{
    let pins = bench.board.pin_names();
    write_banner(bench)?;
    bench.console.write_words("All pins found:", pins)?;

    let mut runner = TestRunner::new();
    runner.run(bench, &mut LedTest, pins)?;
    runner.run(bench, &mut GpioTest, pins)?;
    runner.run(bench, &mut VoltageMonitorTest::new(analog), pins)?;
    runner.run(
        bench,
        &mut UartTest::new(loopback, UART_TX_PIN_NAME, UART_RX_PIN_NAME),
        pins,
    )?;
    runner.print_summary(&mut bench.console, pins)?;
    Ok(runner)
}

fn write_banner<B, S>(bench: &mut Bench<B, S>) -> Result<()>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    let console = &mut bench.console;
    console.newline()?;
    console.write_line("**********************************************************************")?;
    uwrite!(console, "*  ATmega128 board test suite v{}", VERSION)?;
    console.newline()?;
    console.write_line("*  Follow the directions to run each test.")?;
    console.write_line("**********************************************************************")?;
    console.newline()
}

/// Report how a run ended. A fatal error is printed; with the `debug`
/// feature the session log follows. Console failures here have nowhere
/// left to go and are ignored.
pub fn finish<B, S, T>(bench: &mut Bench<B, S>, outcome: &Result<T>)
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    if let Err(err) = outcome {
        let _ = bench.console.newline();
        let _ = uwrite!(bench.console, "FATAL: {}", err);
        let _ = bench.console.newline();
    }
    if cfg!(feature = "debug") {
        let _ = bench.log.dump(&mut bench.console);
    }
}
