//! Toggle waveform, scoped pin ownership and the operator wait loop

use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial;
use heapless::Vec;

use super::{Bench, PinList, TestReport, Verdict};
use crate::config::{ToggleConfig, LINE_BUFFER_LEN, MAX_PINS};
use crate::drivers::SerialConsole;
use crate::hal::{set_level, BoardError, BoardIo, Monotonic, Result};
use crate::logger::{Event, Logger};

/// Two-state square wave. Starts low; each state is held until strictly
/// more than its dwell time has passed since the last flip.
#[derive(Debug, Clone)]
pub struct Toggler {
    high: bool,
    since_ms: u32,
    config: ToggleConfig,
}

impl Toggler {
    pub fn new(config: ToggleConfig, now_ms: u32) -> Self {
        Self {
            high: false,
            since_ms: now_ms,
            config,
        }
    }

    /// Advance to `now_ms` and return the level to drive. Flips at most once
    /// per call; calling again with the same timestamp changes nothing.
    pub fn step(&mut self, now_ms: u32) -> bool {
        let dwell = if self.high {
            self.config.on_ms
        } else {
            self.config.off_ms
        };
        if now_ms.wrapping_sub(self.since_ms) > dwell {
            self.high = !self.high;
            self.since_ms = now_ms;
        }
        self.high
    }

    pub fn is_high(&self) -> bool {
        self.high
    }
}

/// Output pins claimed from a board for the length of one test.
///
/// Dropping the group hands every pin back to the board, so an early `?`
/// return cannot leave a line claimed.
pub struct PinGroup<'a, B: BoardIo> {
    board: &'a mut B,
    log: &'a mut Logger,
    names: PinList,
    pins: Vec<B::Pin, MAX_PINS>,
}

impl<'a, B: BoardIo> PinGroup<'a, B> {
    /// Open every named pin as an output, in order. On failure the pins
    /// opened so far are released before the error is returned.
    pub fn acquire<I>(board: &'a mut B, log: &'a mut Logger, names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'static str>,
    {
        let mut group = Self {
            board,
            log,
            names: Vec::new(),
            pins: Vec::new(),
        };
        for name in names {
            if let Err(err) = group.open(name) {
                let now = group.board.now_ms();
                group.log.log_error(now, Event::AcquireFailed(err));
                return Err(err);
            }
        }
        Ok(group)
    }

    fn open(&mut self, name: &'static str) -> Result<()> {
        if self.pins.is_full() {
            return Err(BoardError::TooManyPins);
        }
        let pin = self.board.open_output(name)?;
        if let Err(pin) = self.pins.push(pin) {
            self.board.release(pin);
            return Err(BoardError::TooManyPins);
        }
        self.names.push(name).map_err(|_| BoardError::TooManyPins)?;
        let now = self.board.now_ms();
        self.log.log_system(now, Event::PinAcquired(name));
        Ok(())
    }

    pub fn names(&self) -> &PinList {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Pins, their names, and the board clock, borrowed together
    pub fn parts(&mut self) -> (&mut [B::Pin], &[&'static str], &B) {
        (self.pins.as_mut_slice(), self.names.as_slice(), &*self.board)
    }

    fn release_all(&mut self) {
        let pins = core::mem::take(&mut self.pins);
        for (pin, &name) in pins.into_iter().zip(self.names.iter()) {
            self.board.release(pin);
            let now = self.board.now_ms();
            self.log.log_system(now, Event::PinReleased(name));
        }
    }
}

impl<B: BoardIo> Drop for PinGroup<'_, B> {
    fn drop(&mut self) {
        self.release_all();
    }
}

pub fn drive_all<P: OutputPin>(pins: &mut [P], names: &[&'static str], high: bool) -> Result<()> {
    for (pin, &name) in pins.iter_mut().zip(names) {
        set_level(pin, high, name)?;
    }
    Ok(())
}

/// Toggle `pins` until the operator answers `prompt`. Returns true iff the
/// answer line is exactly `y`.
///
/// Every pass drives all pins to the current level, then checks for input
/// without blocking. Once a keystroke is waiting the rest of the line is read
/// with a blocking read. There is no timeout.
pub fn toggle_wait<P, M, S>(
    pins: &mut [P],
    names: &[&'static str],
    clock: &M,
    console: &mut SerialConsole<S>,
    config: ToggleConfig,
    prompt: &str,
) -> Result<bool>
where
    P: OutputPin,
    M: Monotonic + ?Sized,
    S: serial::Read<u8> + serial::Write<u8>,
{
    let mut toggler = Toggler::new(config, clock.now_ms());
    console.write_line(prompt)?;
    loop {
        let level = toggler.step(clock.now_ms());
        drive_all(pins, names, level)?;
        if console.input_available()? {
            let mut buf = [0u8; LINE_BUFFER_LEN];
            let answer = console.read_line(&mut buf)?;
            return Ok(answer == b"y");
        }
    }
}

/// Console text for one kind of toggle test
pub struct Prompts {
    /// Printed before the list of pins being toggled
    pub found: &'static str,
    pub question: &'static str,
    /// Printed when nothing matched
    pub none: &'static str,
}

/// Claim `candidates`, toggle them until the operator answers, release them.
///
/// With no candidates nothing is claimed and the verdict is N/A.
pub fn exercise<B, S, I>(
    bench: &mut Bench<B, S>,
    test: &'static str,
    candidates: I,
    prompts: &Prompts,
) -> Result<TestReport>
where
    B: BoardIo,
    S: serial::Read<u8> + serial::Write<u8>,
    I: IntoIterator<Item = &'static str>,
{
    let Bench {
        board,
        console,
        log,
        config,
    } = bench;

    let mut candidates = candidates.into_iter().peekable();
    if candidates.peek().is_none() {
        console.write_line(prompts.none)?;
        log.log_system(board.now_ms(), Event::NoCandidates(test));
        return Ok(TestReport::not_applicable());
    }

    log.log_system(board.now_ms(), Event::TestStarted(test));
    let mut group = PinGroup::acquire(board, log, candidates)?;
    console.write_words(prompts.found, group.names())?;

    let answer = {
        let (pins, names, clock) = group.parts();
        toggle_wait(pins, names, clock, console, *config, prompts.question)?
    };
    let pins = group.names().clone();
    drop(group);

    let verdict = if answer { Verdict::Pass } else { Verdict::Fail };
    Ok(TestReport::new(verdict, pins))
}
