//! GPIO toggle test
//!
//! Toggles every analog (`A<n>`) and digital (`D<n>`) pin on the board.
//! Verify with an LED, multimeter, scope or another board.

use embedded_hal::serial;

use super::toggle::{exercise, Prompts};
use super::{Bench, TestCase, TestReport};
use crate::hal::{BoardIo, Result};

const PROMPTS: Prompts = Prompts {
    found: "GPIO pins found:",
    question: "Are the pins listed above toggling? [y/n]",
    none: "No GPIO pins found",
};

fn is_number(s: &str) -> bool {
    s.parse::<f32>().is_ok()
}

fn has_numeric_suffix(name: &str, prefix: char) -> bool {
    name.strip_prefix(prefix).map_or(false, is_number)
}

pub fn analog_pins<'p>(pins: &'p [&'static str]) -> impl Iterator<Item = &'static str> + 'p {
    pins.iter().copied().filter(|name| has_numeric_suffix(name, 'A'))
}

pub fn digital_pins<'p>(pins: &'p [&'static str]) -> impl Iterator<Item = &'static str> + 'p {
    pins.iter().copied().filter(|name| has_numeric_suffix(name, 'D'))
}

/// Analog pins, then digital pins, each group in board order
pub fn gpio_candidates<'p>(pins: &'p [&'static str]) -> impl Iterator<Item = &'static str> + 'p {
    analog_pins(pins).chain(digital_pins(pins))
}

/// Toggle all GPIO found in `pins` until the operator answers.
///
/// Returns N/A without touching the hardware when no name qualifies.
/// Failing to claim a pin is returned as an error; pins already claimed are
/// released first.
pub fn run_test<B, S>(bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    exercise(bench, "GPIO", gpio_candidates(pins), &PROMPTS)
}

pub struct GpioTest;

impl<B, S> TestCase<B, S> for GpioTest
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    fn name(&self) -> &'static str {
        "GPIO Test"
    }

    fn heading(&self) -> &'static str {
        "GPIO TEST"
    }

    fn run(&mut self, bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport> {
        run_test(bench, pins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{MockBoard, ScriptedSerial};
    use crate::hal::BoardError;
    use crate::logger::Event;
    use crate::testing::Verdict;
    use std::vec::Vec;

    fn classify(pins: &[&'static str]) -> Vec<&'static str> {
        gpio_candidates(pins).collect()
    }

    #[test]
    fn classifies_analog_then_digital() {
        assert_eq!(classify(&["A0", "A1", "D2", "LED", "D3x"]), ["A0", "A1", "D2"]);
        assert_eq!(
            classify(&["D5", "A3", "SCK", "D1", "A0", "TX"]),
            ["A3", "A0", "D5", "D1"]
        );
    }

    #[test]
    fn rejects_names_without_a_number() {
        assert!(classify(&["A", "D", "AREF", "DAC", "d1", "a0", "LED", "", "D3x", "A1 "]).is_empty());
    }

    #[test]
    fn accepts_any_numeric_suffix() {
        assert_eq!(classify(&["D10", "A1.5", "D007"]), ["A1.5", "D10", "D007"]);
    }

    #[test]
    fn empty_list_is_not_applicable() {
        let mut bench = Bench::new(MockBoard::new(&[]), ScriptedSerial::new());

        let report = run_test(&mut bench, &[]).unwrap();

        assert_eq!(report, TestReport::not_applicable());
        assert!(report.pins.is_empty());
        assert!(bench.board.opened.is_empty());
        assert_eq!(bench.console.serial().output_str(), "No GPIO pins found\r\n");
    }

    #[test]
    fn no_gpio_names_is_not_applicable() {
        static PINS: [&str; 3] = ["LED", "TX", "SCL"];
        let mut bench = Bench::new(MockBoard::new(&PINS), ScriptedSerial::new());

        let report = run_test(&mut bench, &PINS).unwrap();

        assert_eq!(report.verdict, Verdict::NotApplicable);
        assert!(bench.board.opened.is_empty());
        assert!(bench
            .log
            .entries()
            .any(|e| e.event == Event::NoCandidates("GPIO")));
    }

    #[test]
    fn operator_yes_passes() {
        static PINS: [&str; 5] = ["A0", "A1", "D2", "LED", "D3x"];
        let serial = ScriptedSerial::new().idle(20).keys("y\r");
        let mut bench = Bench::new(MockBoard::new(&PINS).tick_ms(20), serial);

        let report = run_test(&mut bench, &PINS).unwrap();

        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.pins.as_slice(), ["A0", "A1", "D2"]);
        assert_eq!(bench.board.opened, ["A0", "A1", "D2"]);
        assert_eq!(bench.board.released, ["A0", "A1", "D2"]);
        assert!(bench.board.held().is_empty());
        // The pins really were toggled while waiting
        let levels = bench.board.levels("D2");
        assert!(levels.contains(&true) && levels.contains(&false));
        assert_eq!(
            bench.console.serial().output_str(),
            "GPIO pins found: A0 A1 D2 \r\n\r\n\
             Are the pins listed above toggling? [y/n]\r\n\
             y\r\n"
        );
    }

    #[test]
    fn any_other_answer_fails() {
        static PINS: [&str; 2] = ["A0", "D1"];
        for keys in ["n\r", "no\r", "Y\r", "\r"] {
            let serial = ScriptedSerial::new().idle(2).keys(keys);
            let mut bench = Bench::new(MockBoard::new(&PINS), serial);

            let report = run_test(&mut bench, &PINS).unwrap();

            assert_eq!(report.verdict, Verdict::Fail, "answer {:?}", keys);
            assert_eq!(report.pins.as_slice(), ["A0", "D1"]);
            assert_eq!(bench.board.released, ["A0", "D1"]);
        }
    }

    #[test]
    fn pins_are_released_exactly_once() {
        static PINS: [&str; 3] = ["A0", "D1", "D2"];
        for keys in ["y\r", "n\r"] {
            let mut bench = Bench::new(MockBoard::new(&PINS), ScriptedSerial::new().keys(keys));
            run_test(&mut bench, &PINS).unwrap();

            for pin in PINS {
                let times = bench.board.released.iter().filter(|&&p| p == pin).count();
                assert_eq!(times, 1, "{} released {} times", pin, times);
            }
        }
    }

    #[test]
    fn claimed_pin_is_fatal_and_releases_the_rest() {
        static PINS: [&str; 3] = ["A0", "D1", "D2"];
        let board = MockBoard::new(&PINS).busy("D1");
        let mut bench = Bench::new(board, ScriptedSerial::new().keys("y\r"));

        let result = run_test(&mut bench, &PINS);

        assert_eq!(result, Err(BoardError::PinClaimed("D1")));
        assert_eq!(bench.board.released, ["A0"]);
        assert!(bench.board.held().is_empty());
        // Never got as far as prompting
        assert_eq!(bench.console.serial().output_str(), "");
    }

    #[test]
    fn serial_failure_still_releases_pins() {
        static PINS: [&str; 2] = ["A0", "D1"];
        let mut bench = Bench::new(MockBoard::new(&PINS), ScriptedSerial::new().idle(5));

        assert_eq!(run_test(&mut bench, &PINS), Err(BoardError::Serial));
        assert_eq!(bench.board.released, ["A0", "D1"]);
    }
}
