//! Operator-verified board tests and the suite runner

pub mod gpio;
pub mod led;
pub mod toggle;
pub mod uart;
pub mod voltage;

use embedded_hal::serial;
use heapless::Vec;
use ufmt::{uDisplay, uWrite, uwrite, Formatter};

use crate::config::{ToggleConfig, MAX_PINS, MAX_TESTS};
use crate::drivers::SerialConsole;
use crate::hal::{BoardError, BoardIo, Result};
use crate::logger::{Event, Logger};

pub use gpio::GpioTest;
pub use led::LedTest;
pub use uart::UartTest;
pub use voltage::VoltageMonitorTest;

pub type PinList = Vec<&'static str, MAX_PINS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    NotApplicable,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail => "FAIL",
            Verdict::NotApplicable => "N/A",
        }
    }
}

impl uDisplay for Verdict {
    fn fmt<W>(&self, f: &mut Formatter<'_, W>) -> core::result::Result<(), W::Error>
    where
        W: uWrite + ?Sized,
    {
        f.write_str(self.as_str())
    }
}

/// Verdict plus the pins that were exercised, in the order they were driven
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReport {
    pub verdict: Verdict,
    pub pins: PinList,
}

impl TestReport {
    pub fn new(verdict: Verdict, pins: PinList) -> Self {
        Self { verdict, pins }
    }

    pub fn not_applicable() -> Self {
        Self::new(Verdict::NotApplicable, PinList::new())
    }
}

/// Everything a test needs: the board, the operator console, the session
/// log and the toggle timing.
pub struct Bench<B, S> {
    pub board: B,
    pub console: SerialConsole<S>,
    pub log: Logger,
    pub config: ToggleConfig,
}

impl<B, S> Bench<B, S>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    pub fn new(board: B, serial: S) -> Self {
        Self {
            board,
            console: SerialConsole::new(serial),
            log: Logger::new(),
            config: ToggleConfig::default(),
        }
    }
}

pub trait TestCase<B, S> {
    /// Key in the results table, e.g. `GPIO Test`
    fn name(&self) -> &'static str;

    /// Section banner, e.g. `GPIO TEST`
    fn heading(&self) -> &'static str;

    fn run(&mut self, bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport>;
}

/// Runs tests one after another and prints the closing summary.
///
/// Holds up to `MAX_TESTS` results; running another test past that fails
/// with `BoardError::TooManyTests` before the test starts.
pub struct TestRunner {
    results: Vec<(&'static str, TestReport), MAX_TESTS>,
    total_tests: u32,
    passed_tests: u32,
}

impl TestRunner {
    pub fn new() -> Self {
        Self {
            results: Vec::new(),
            total_tests: 0,
            passed_tests: 0,
        }
    }

    pub fn run<B, S>(
        &mut self,
        bench: &mut Bench<B, S>,
        test: &mut dyn TestCase<B, S>,
        pins: &[&'static str],
    ) -> Result<Verdict>
    where
        B: BoardIo,
        S: serial::Read<u8> + serial::Write<u8>,
    {
        if self.results.is_full() {
            return Err(BoardError::TooManyTests);
        }
        write_heading(&mut bench.console, test.heading())?;
        let report = test.run(bench, pins)?;
        let verdict = report.verdict;

        bench.console.newline()?;
        bench.console.write_line(verdict.as_str())?;
        bench.console.newline()?;

        self.total_tests += 1;
        if verdict == Verdict::Pass {
            self.passed_tests += 1;
        }
        let now = bench.board.now_ms();
        bench.log.log_system(now, Event::Verdict(test.name(), verdict));
        self.results
            .push((test.name(), report))
            .map_err(|_| BoardError::TooManyTests)?;
        Ok(verdict)
    }

    pub fn results(&self) -> &[(&'static str, TestReport)] {
        &self.results
    }

    pub fn passed(&self) -> u32 {
        self.passed_tests
    }

    pub fn total(&self) -> u32 {
        self.total_tests
    }

    /// Tested pins, concatenated in test order
    pub fn tested_pins(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.results
            .iter()
            .flat_map(|(_, report)| report.pins.iter().copied())
    }

    pub fn print_summary<S>(
        &self,
        console: &mut SerialConsole<S>,
        all_pins: &[&'static str],
    ) -> Result<()>
    where
        S: serial::Read<u8> + serial::Write<u8>,
    {
        write_heading(console, "TEST RESULTS")?;

        let width = self.results.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, report) in &self.results {
            console.write_str(name)?;
            console.write_str(": ")?;
            for _ in name.len()..width {
                console.write_byte(b' ')?;
            }
            console.write_line(report.verdict.as_str())?;
        }

        if self.total_tests > 0 {
            uwrite!(
                console,
                "Passed: {}/{} ({}%)",
                self.passed_tests,
                self.total_tests,
                (self.passed_tests * 100) / self.total_tests
            )?;
            console.newline()?;
        }
        console.newline()?;

        console.write_str("The following pins were tested:")?;
        for pin in self.tested_pins() {
            console.write_byte(b' ')?;
            console.write_str(pin)?;
        }
        console.write_str(" ")?;
        console.newline()?;
        console.newline()?;

        console.write_str("The following pins were NOT tested:")?;
        for pin in all_pins {
            if !self.tested_pins().any(|tested| tested == *pin) {
                console.write_byte(b' ')?;
                console.write_str(pin)?;
            }
        }
        console.write_str(" ")?;
        console.newline()?;
        console.newline()
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn write_heading<S>(console: &mut SerialConsole<S>, title: &str) -> Result<()>
where
    S: serial::Read<u8> + serial::Write<u8>,
{
    console.write_str("@)}---^-----  ")?;
    console.write_str(title)?;
    console.write_line("  -----^---{(@")?;
    console.newline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{MockBoard, ScriptedSerial};

    static PINS: [&str; 6] = ["A0", "D1", "LED", "TX", "SCK", "D2"];

    struct Fixed(Verdict, &'static [&'static str]);

    impl<B, S> TestCase<B, S> for Fixed {
        fn name(&self) -> &'static str {
            match self.0 {
                Verdict::Pass => "Fixed Pass",
                Verdict::Fail => "Fail",
                Verdict::NotApplicable => "Skipped Test",
            }
        }

        fn heading(&self) -> &'static str {
            "FIXED TEST"
        }

        fn run(&mut self, _: &mut Bench<B, S>, _: &[&'static str]) -> Result<TestReport> {
            Ok(TestReport::new(self.0, PinList::from_slice(self.1).unwrap()))
        }
    }

    struct Broken;

    impl<B, S> TestCase<B, S> for Broken {
        fn name(&self) -> &'static str {
            "Broken"
        }

        fn heading(&self) -> &'static str {
            "BROKEN TEST"
        }

        fn run(&mut self, _: &mut Bench<B, S>, _: &[&'static str]) -> Result<TestReport> {
            Err(BoardError::PinClaimed("D1"))
        }
    }

    fn bench() -> Bench<MockBoard, ScriptedSerial> {
        Bench::new(MockBoard::new(&PINS), ScriptedSerial::new())
    }

    #[test]
    fn verdict_strings() {
        assert_eq!(Verdict::Pass.as_str(), "PASS");
        assert_eq!(Verdict::Fail.as_str(), "FAIL");
        assert_eq!(Verdict::NotApplicable.as_str(), "N/A");
    }

    #[test]
    fn runner_counts_and_prints_verdicts() {
        let mut bench = bench();
        let mut runner = TestRunner::new();

        assert_eq!(
            runner.run(&mut bench, &mut Fixed(Verdict::Pass, &["A0", "D1"]), &PINS),
            Ok(Verdict::Pass)
        );
        assert_eq!(
            runner.run(&mut bench, &mut Fixed(Verdict::Fail, &["LED"]), &PINS),
            Ok(Verdict::Fail)
        );
        assert_eq!(runner.total(), 2);
        assert_eq!(runner.passed(), 1);

        let out = bench.console.serial().output_str();
        assert!(out.starts_with("@)}---^-----  FIXED TEST  -----^---{(@\r\n\r\n\r\nPASS\r\n\r\n"));
        assert!(bench
            .log
            .entries()
            .any(|e| e.event == Event::Verdict("Fail", Verdict::Fail)));
    }

    #[test]
    fn summary_aligns_results_and_splits_pins() {
        let mut bench = bench();
        let mut runner = TestRunner::new();
        runner.run(&mut bench, &mut Fixed(Verdict::Pass, &["A0", "D1"]), &PINS).unwrap();
        runner.run(&mut bench, &mut Fixed(Verdict::NotApplicable, &[]), &PINS).unwrap();
        runner.run(&mut bench, &mut Fixed(Verdict::Fail, &["LED"]), &PINS).unwrap();

        let mut console = SerialConsole::new(ScriptedSerial::new());
        runner.print_summary(&mut console, &PINS).unwrap();

        assert_eq!(
            console.free().output_str(),
            "@)}---^-----  TEST RESULTS  -----^---{(@\r\n\
             \r\n\
             Fixed Pass:   PASS\r\n\
             Skipped Test: N/A\r\n\
             Fail:         FAIL\r\n\
             Passed: 1/3 (33%)\r\n\
             \r\n\
             The following pins were tested: A0 D1 LED \r\n\
             \r\n\
             The following pins were NOT tested: TX SCK D2 \r\n\
             \r\n"
        );
    }

    #[test]
    fn fatal_error_stops_the_runner() {
        let mut bench = bench();
        let mut runner = TestRunner::new();

        assert_eq!(
            runner.run(&mut bench, &mut Broken, &PINS),
            Err(BoardError::PinClaimed("D1"))
        );
        assert_eq!(runner.total(), 0);
        assert!(runner.results().is_empty());
    }

    #[test]
    fn runner_refuses_tests_past_capacity() {
        let mut bench = bench();
        let mut runner = TestRunner::new();
        for _ in 0..MAX_TESTS {
            runner.run(&mut bench, &mut Fixed(Verdict::Pass, &["A0"]), &PINS).unwrap();
        }
        let printed = bench.console.serial().output_str().len();

        assert_eq!(
            runner.run(&mut bench, &mut Fixed(Verdict::Pass, &["A0"]), &PINS),
            Err(BoardError::TooManyTests)
        );
        // Refused before the test ran, so the tallies and table still agree
        assert_eq!(bench.console.serial().output_str().len(), printed);
        assert_eq!(runner.total() as usize, MAX_TESTS);
        assert_eq!(runner.passed() as usize, MAX_TESTS);
        assert_eq!(runner.results().len(), MAX_TESTS);
        assert_eq!(runner.tested_pins().count(), MAX_TESTS);
    }

    #[test]
    fn empty_summary_lists_every_pin_as_untested() {
        let runner = TestRunner::new();
        let mut console = SerialConsole::new(ScriptedSerial::new());
        runner.print_summary(&mut console, &["A0", "D1"]).unwrap();

        let out = console.free();
        let out = out.output_str();
        assert!(!out.contains("Passed:"));
        assert!(out.contains("The following pins were NOT tested: A0 D1 \r\n"));
    }
}
