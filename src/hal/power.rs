use avr_device::atmega128a::CPU;

// MCUCR
const SE: u8 = 1 << 5;
const SM_MASK: u8 = 0b0001_1100;

pub struct Power {
    _cpu: CPU,
}

impl Power {
    pub fn new(cpu: CPU) -> Self {
        Self { _cpu: cpu }
    }

    /// Select idle sleep (SM2:0 = 0) and set SE
    #[inline]
    fn enable_idle_sleep(&mut self) {
        unsafe {
            let p = CPU::ptr();
            (*p).mcucr.modify(|r, w| w.bits((r.bits() & !SM_MASK) | SE));
        }
    }

    /// Park the CPU once a run is over. Idle mode keeps timer0 and the
    /// USART clocked, so the ISR wakes the core every millisecond and it
    /// goes straight back to sleep.
    pub fn idle_forever(mut self) -> ! {
        self.enable_idle_sleep();
        loop {
            avr_device::asm::sleep();
        }
    }
}
