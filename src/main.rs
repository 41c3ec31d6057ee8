//! Standalone GPIO toggle test for the BigAVR2 board.
//!
//! Connect a terminal to USART0 at 9600 8N1, watch the pins with an LED,
//! meter or scope, and answer the prompt with `y` if they toggle.

#![cfg_attr(target_arch = "avr", no_std)]
#![cfg_attr(target_arch = "avr", no_main)]

#[cfg(target_arch = "avr")]
mod firmware {
    use panic_halt as _;

    use atmega128_boardtest::application;
    use atmega128_boardtest::config::UART_BAUD;
    use atmega128_boardtest::hal::{BigAvr2, Power, SystemClock, Usart0};
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
        let power = Power::new(dp.CPU);

        // Timer0 compare match drives the millisecond clock
        unsafe { avr_device::interrupt::enable() };

        let mut bench = Bench::new(board, serial);
        let outcome = application::gpio_main(&mut bench);
        application::finish(&mut bench, &outcome);

        power.idle_forever()
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {
    eprintln!("boardtest_gpio is ATmega128 firmware; build it for an AVR target");
}
