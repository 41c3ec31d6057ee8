//! Host-side board, serial ports, ADC and clock used by the unit tests

use core::cell::Cell;
use core::convert::Infallible;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;

use super::{AnalogInput, BoardError, BoardIo, LoopbackPort, Monotonic, Result};

/// Every level written to any pin, in order
pub type WriteLog = Rc<RefCell<Vec<(&'static str, bool)>>>;

#[derive(Debug)]
pub struct MockPin {
    name: &'static str,
    writes: WriteLog,
}

impl OutputPin for MockPin {
    type Error = Infallible;

    fn set_high(&mut self) -> core::result::Result<(), Self::Error> {
        self.writes.borrow_mut().push((self.name, true));
        Ok(())
    }

    fn set_low(&mut self) -> core::result::Result<(), Self::Error> {
        self.writes.borrow_mut().push((self.name, false));
        Ok(())
    }
}

/// Board with a scripted pin table. The clock advances by `tick_ms` on
/// every read so a toggle loop makes progress without real time passing.
pub struct MockBoard {
    names: &'static [&'static str],
    now: Cell<u32>,
    tick_ms: u32,
    held: Vec<&'static str>,
    busy: Vec<&'static str>,
    pub opened: Vec<&'static str>,
    pub released: Vec<&'static str>,
    pub writes: WriteLog,
}

impl MockBoard {
    pub fn new(names: &'static [&'static str]) -> Self {
        Self {
            names,
            now: Cell::new(0),
            tick_ms: 1,
            held: Vec::new(),
            busy: Vec::new(),
            opened: Vec::new(),
            released: Vec::new(),
            writes: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn tick_ms(mut self, tick_ms: u32) -> Self {
        self.tick_ms = tick_ms;
        self
    }

    /// Mark a line as held by someone else
    pub fn busy(mut self, name: &'static str) -> Self {
        self.busy.push(name);
        self
    }

    pub fn held(&self) -> &[&'static str] {
        &self.held
    }

    /// Levels written to one pin
    pub fn levels(&self, name: &str) -> Vec<bool> {
        self.writes
            .borrow()
            .iter()
            .filter(|(pin, _)| *pin == name)
            .map(|&(_, level)| level)
            .collect()
    }
}

impl Monotonic for MockBoard {
    fn now_ms(&self) -> u32 {
        let now = self.now.get();
        self.now.set(now.wrapping_add(self.tick_ms));
        now
    }
}

impl BoardIo for MockBoard {
    type Pin = MockPin;

    fn pin_names(&self) -> &'static [&'static str] {
        self.names
    }

    fn open_output(&mut self, name: &'static str) -> Result<MockPin> {
        if !self.names.contains(&name) {
            return Err(BoardError::UnknownPin(name));
        }
        if self.busy.contains(&name) || self.held.contains(&name) {
            return Err(BoardError::PinClaimed(name));
        }
        self.held.push(name);
        self.opened.push(name);
        Ok(MockPin {
            name,
            writes: self.writes.clone(),
        })
    }

    fn release(&mut self, pin: MockPin) {
        assert!(
            self.held.contains(&pin.name),
            "released {} which was not held",
            pin.name
        );
        self.held.retain(|&held| held != pin.name);
        self.released.push(pin.name);
    }
}

/// Clock that only moves when told to
pub struct ManualClock(pub Cell<u32>);

impl ManualClock {
    pub fn new(now_ms: u32) -> Self {
        Self(Cell::new(now_ms))
    }

    pub fn set(&self, now_ms: u32) {
        self.0.set(now_ms);
    }
}

impl Monotonic for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptExhausted;

/// Serial port fed from a keystroke script. `None` entries are polls that
/// find nothing waiting; running off the end of the script is an error so
/// a broken test cannot spin forever.
#[derive(Default)]
pub struct ScriptedSerial {
    input: VecDeque<Option<u8>>,
    output: Vec<u8>,
}

impl ScriptedSerial {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn idle(mut self, polls: usize) -> Self {
        self.input.extend(core::iter::repeat(None).take(polls));
        self
    }

    pub fn keys(mut self, keys: &str) -> Self {
        self.input.extend(keys.bytes().map(Some));
        self
    }

    pub fn output_str(&self) -> &str {
        core::str::from_utf8(&self.output).expect("console output is ASCII")
    }
}

impl serial::Read<u8> for ScriptedSerial {
    type Error = ScriptExhausted;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        match self.input.pop_front() {
            Some(Some(byte)) => Ok(byte),
            Some(None) => Err(nb::Error::WouldBlock),
            None => Err(nb::Error::Other(ScriptExhausted)),
        }
    }
}

impl serial::Write<u8> for ScriptedSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        self.output.push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

/// Second serial port. With the jumper fitted every byte written comes
/// straight back; without it nothing ever arrives.
#[derive(Debug, Default)]
pub struct MockLoopback {
    jumpered: bool,
    enabled: bool,
    rx: VecDeque<u8>,
    pub sent: Vec<u8>,
    pub enables: u32,
    pub disables: u32,
}

impl MockLoopback {
    pub fn jumpered() -> Self {
        Self {
            jumpered: true,
            ..Self::default()
        }
    }

    pub fn open() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl LoopbackPort for MockLoopback {
    fn enable(&mut self) {
        self.enabled = true;
        self.enables += 1;
        self.rx.clear();
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.disables += 1;
    }
}

impl serial::Read<u8> for MockLoopback {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Self::Error> {
        self.rx.pop_front().ok_or(nb::Error::WouldBlock)
    }
}

impl serial::Write<u8> for MockLoopback {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Self::Error> {
        assert!(self.enabled, "wrote to a disabled port");
        self.sent.push(word);
        if self.jumpered {
            self.rx.push_back(word);
        }
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Self::Error> {
        Ok(())
    }
}

/// ADC with fixed readings per pin
#[derive(Debug, Default)]
pub struct MockAnalog {
    readings: Vec<(&'static str, u32)>,
    pub reads: Vec<&'static str>,
}

impl MockAnalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, millivolts: u32) -> Self {
        self.readings.push((name, millivolts));
        self
    }
}

impl AnalogInput for MockAnalog {
    fn read_millivolts(&mut self, name: &'static str) -> Result<u32> {
        self.reads.push(name);
        self.readings
            .iter()
            .find(|(pin, _)| *pin == name)
            .map(|&(_, mv)| mv)
            .ok_or(BoardError::NotAnalog(name))
    }
}
