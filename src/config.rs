//! Configuration constants for the ATmega128 board test firmware

/// CPU frequency in Hz
pub const CPU_FREQ_HZ: u32 = 16_000_000;

/// UART baud rate
pub const UART_BAUD: u32 = 9600;

/// Firmware version, printed in the suite banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long toggled pins are held high, in milliseconds
pub const LED_ON_DELAY_MS: u32 = 200;

/// How long toggled pins are held low, in milliseconds
pub const LED_OFF_DELAY_MS: u32 = 200;

/// Upper bound on pins a single test can hold open at once
pub const MAX_PINS: usize = 64;

/// Operator answer buffer; longer lines are truncated
pub const LINE_BUFFER_LEN: usize = 32;

/// Session log ring size
pub const LOG_CAPACITY: usize = 32;

/// Most tests a suite can record results for
pub const MAX_TESTS: usize = 8;

/// Pin names that identify onboard LEDs
pub const LED_PIN_NAMES: [&str; 5] = ["L", "LED", "RED_LED", "GREEN_LED", "BLUE_LED"];

/// Names of pins wired to a supply voltage divider
pub const MONITOR_PIN_NAMES: [&str; 2] = ["VOLTAGE_MONITOR", "BATTERY"];

/// Ratio of the divider in front of the monitor pin
pub const VOLTAGE_MONITOR_DIVIDER: u32 = 2;

/// ADC reference (AVCC) in millivolts
pub const ADC_REF_MV: u32 = 5000;

/// Loopback test pins and baud rate
pub const UART_TX_PIN_NAME: &str = "TX";
pub const UART_RX_PIN_NAME: &str = "RX";
pub const UART_LOOPBACK_BAUD: u32 = 9600;

/// Sent out TX and expected back on RX
pub const UART_TEST_BYTES: &[u8] = b"Hello, loopback!";

/// How long to wait for each looped-back byte
pub const UART_TIMEOUT_MS: u32 = 100;

/// Dwell times for the toggle waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleConfig {
    pub on_ms: u32,
    pub off_ms: u32,
}

impl Default for ToggleConfig {
    fn default() -> Self {
        Self {
            on_ms: LED_ON_DELAY_MS,
            off_ms: LED_OFF_DELAY_MS,
        }
    }
}
