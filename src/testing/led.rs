//! Onboard LED blink test

use embedded_hal::serial;

use super::toggle::{exercise, Prompts};
use super::{Bench, TestCase, TestReport};
use crate::config::LED_PIN_NAMES;
use crate::hal::{BoardIo, Result};

const PROMPTS: Prompts = Prompts {
    found: "LEDs found:",
    question: "Are the LEDs listed above toggling? [y/n]",
    none: "No LEDs found",
};

/// Board pins wired to an onboard LED, in board order
pub fn led_candidates<'p>(pins: &'p [&'static str]) -> impl Iterator<Item = &'static str> + 'p {
    pins.iter().copied().filter(|name| LED_PIN_NAMES.contains(name))
}

pub struct LedTest;

impl<B, S> TestCase<B, S> for LedTest
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
{
    fn name(&self) -> &'static str {
        "LED Test"
    }

    fn heading(&self) -> &'static str {
        "LED TEST"
    }

    fn run(&mut self, bench: &mut Bench<B, S>, pins: &[&'static str]) -> Result<TestReport> {
        exercise(bench, "LED", led_candidates(pins), &PROMPTS)
    }
}
