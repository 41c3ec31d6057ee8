//! Session log kept in RAM
//!
//! Records what a test run did to the hardware (claims, releases, verdicts)
//! so it can be dumped over the console afterwards. The ring holds the most
//! recent `LOG_CAPACITY` entries and counts what it had to drop.

use embedded_hal::serial;
use ufmt::uwrite;

use crate::config::LOG_CAPACITY;
use crate::drivers::SerialConsole;
use crate::hal::{BoardError, Result};
use crate::testing::Verdict;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogType {
    System = 0,
    Error = 1,
    Debug = 2,
}

impl LogType {
    fn tag(self) -> &'static str {
        match self {
            LogType::System => "[SYS]",
            LogType::Error => "[ERR]",
            LogType::Debug => "[DBG]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    TestStarted(&'static str),
    PinAcquired(&'static str),
    PinReleased(&'static str),
    AcquireFailed(BoardError),
    NoCandidates(&'static str),
    Verdict(&'static str, Verdict),
    VoltageRead(&'static str, u32),
    LoopbackMismatch { sent: u8, received: Option<u8> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp_ms: u32,
    pub log_type: LogType,
    pub event: Event,
}

pub struct Logger {
    buffer: [Option<LogEntry>; LOG_CAPACITY],
    head: usize,
    len: usize,
    dropped: u32,
}

impl Logger {
    pub const fn new() -> Self {
        Self {
            buffer: [None; LOG_CAPACITY],
            head: 0,
            len: 0,
            dropped: 0,
        }
    }

    pub fn log_system(&mut self, timestamp_ms: u32, event: Event) {
        self.log_entry(LogType::System, timestamp_ms, event)
    }

    pub fn log_error(&mut self, timestamp_ms: u32, event: Event) {
        self.log_entry(LogType::Error, timestamp_ms, event)
    }

    pub fn log_debug(&mut self, timestamp_ms: u32, event: Event) {
        self.log_entry(LogType::Debug, timestamp_ms, event)
    }

    fn log_entry(&mut self, log_type: LogType, timestamp_ms: u32, event: Event) {
        let slot = (self.head + self.len) % LOG_CAPACITY;
        self.buffer[slot] = Some(LogEntry {
            timestamp_ms,
            log_type,
            event,
        });
        if self.len == LOG_CAPACITY {
            // Overwrote the oldest entry
            self.head = (self.head + 1) % LOG_CAPACITY;
            self.dropped = self.dropped.saturating_add(1);
        } else {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Oldest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> + '_ {
        (0..self.len).filter_map(move |i| self.buffer[(self.head + i) % LOG_CAPACITY].as_ref())
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub fn dump<S>(&self, console: &mut SerialConsole<S>) -> Result<()>
    where
        S: serial::Read<u8> + serial::Write<u8>,
    {
        if self.dropped > 0 {
            uwrite!(console, "({} earlier entries dropped)", self.dropped)?;
            console.newline()?;
        }
        for entry in self.entries() {
            uwrite!(console, "{} {}ms ", entry.log_type.tag(), entry.timestamp_ms)?;
            match entry.event {
                Event::TestStarted(test) => uwrite!(console, "start {}", test)?,
                Event::PinAcquired(pin) => uwrite!(console, "acquired {}", pin)?,
                Event::PinReleased(pin) => uwrite!(console, "released {}", pin)?,
                Event::AcquireFailed(err) => uwrite!(console, "acquire failed: {}", err)?,
                Event::NoCandidates(test) => uwrite!(console, "{}: nothing to test", test)?,
                Event::Verdict(test, verdict) => uwrite!(console, "{}: {}", test, verdict)?,
                Event::VoltageRead(pin, mv) => uwrite!(console, "{} reads {}mV", pin, mv)?,
                Event::LoopbackMismatch { sent, received: Some(got) } => {
                    uwrite!(console, "loopback sent {} got {}", sent, got)?
                }
                Event::LoopbackMismatch { sent, received: None } => {
                    uwrite!(console, "loopback sent {} got nothing", sent)?
                }
            }
            console.newline()?;
        }
        Ok(())
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}
