//! Full board test suite: LED, GPIO, voltage monitor and UART loopback
//! tests, then a results table.
//!
//! The operator console is USART0. For the loopback test jumper TX (PD3) to
//! RX (PD2); for the voltage monitor, feed the supply into PF7 through a
//! resistor pair that halves it.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use atmega128_boardtest::application;
    use atmega128_boardtest::config::{UART_BAUD, UART_LOOPBACK_BAUD};
    use atmega128_boardtest::hal::{Adc, BigAvr2, Power, SystemClock, Usart0, Usart1};
    use atmega128_boardtest::testing::Bench;
    use avr_device::atmega128a::Peripherals;

    #[avr_device::entry]
    fn main() -> ! {
        let dp = match Peripherals::take() {
            Some(dp) => dp,
            None => loop {},
        };

        let clock = SystemClock::new(dp.TC0);
        let board = BigAvr2::new(
            clock,
            (dp.PORTA, dp.PORTB, dp.PORTC, dp.PORTD, dp.PORTE, dp.PORTF),
        );
        let serial = Usart0::new(dp.USART0, UART_BAUD);
        // Off until the loopback test, so PD2/PD3 stay GPIO for the pin test
        let loopback = Usart1::new_disabled(dp.USART1, UART_LOOPBACK_BAUD);
        let adc = Adc::new(dp.ADC);
        let power = Power::new(dp.CPU);
        unsafe { avr_device::interrupt::enable() };

        let mut bench = Bench::new(board, serial);
        let outcome = application::suite_main(&mut bench, adc, loopback);
        application::finish(&mut bench, &outcome);

        power.idle_forever()
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("boardtest_suite is ATmega128 firmware; build it for an AVR target");
}
