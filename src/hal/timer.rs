use avr_device::atmega128a::TC0;
use avr_device::interrupt::Mutex;
use core::cell::Cell;

use super::Monotonic;
use crate::config::CPU_FREQ_HZ;

// TCCR0: CTC mode, clk/64 (timer0 has its own prescaler table on this part)
const WGM01: u8 = 1 << 3;
const CS0_DIV64: u8 = 0b100;
const PRESCALER: u32 = 64;
// TIMSK
const OCIE0: u8 = 1 << 1;

const TICKS_PER_MS: u32 = CPU_FREQ_HZ / PRESCALER / 1000;

static MILLIS: Mutex<Cell<u32>> = Mutex::new(Cell::new(0));

/// Millisecond clock driven by the timer0 compare-match interrupt.
/// Interrupts must be enabled globally for it to advance.
pub struct SystemClock {
    _tc0: TC0,
}

impl SystemClock {
    pub fn new(tc0: TC0) -> Self {
        unsafe {
            tc0.tccr0.write(|w| w.bits(0));
            tc0.tcnt0.write(|w| w.bits(0));
            tc0.ocr0.write(|w| w.bits((TICKS_PER_MS - 1) as u8));
            tc0.tccr0.write(|w| w.bits(WGM01 | CS0_DIV64));
            tc0.timsk.modify(|r, w| w.bits(r.bits() | OCIE0));
        }
        avr_device::interrupt::free(|cs| MILLIS.borrow(cs).set(0));
        Self { _tc0: tc0 }
    }
}

impl Monotonic for SystemClock {
    fn now_ms(&self) -> u32 {
        avr_device::interrupt::free(|cs| MILLIS.borrow(cs).get())
    }
}

#[avr_device::interrupt(atmega128a)]
fn TIMER0_COMP() {
    avr_device::interrupt::free(|cs| {
        let millis = MILLIS.borrow(cs);
        millis.set(millis.get().wrapping_add(1));
    });
}
