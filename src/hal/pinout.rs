//! BigAVR2 pin table
//!
//! Plain data, so it is compiled (and checked) on the host as well.
//!
//! PE0/PE1 carry the operator console (USART0 RXD0/TXD0) and are left out:
//! once the USART is enabled it overrides the port and the lines cannot be
//! toggled. `TX`/`RX` name the USART1 lines used by the loopback test.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Port {
    pub const COUNT: usize = 6;

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

pub const PIN_COUNT: usize = 48;

// Aliases (TX, SCK, LED, ...) share a line with a numbered pin. Holding one
// name blocks the other until it is released.
pub const PINS: [(&str, Port, u8); PIN_COUNT] = [
    ("A0", Port::F, 0),
    ("A1", Port::F, 1),
    ("A2", Port::F, 2),
    ("A3", Port::F, 3),
    // PF4..PF7 double as JTAG; usable once the board has set JTD
    ("A4", Port::F, 4),
    ("A5", Port::F, 5),
    ("A6", Port::F, 6),
    ("A7", Port::F, 7),
    ("D2", Port::E, 2),
    ("D3", Port::E, 3),
    ("D4", Port::E, 4),
    ("D5", Port::E, 5),
    ("D6", Port::E, 6),
    ("D7", Port::E, 7),
    ("D8", Port::B, 0),
    ("D9", Port::B, 1),
    ("D10", Port::B, 2),
    ("D11", Port::B, 3),
    ("D12", Port::B, 4),
    ("D13", Port::B, 5),
    ("D14", Port::B, 6),
    ("D15", Port::B, 7),
    ("D16", Port::C, 0),
    ("D17", Port::C, 1),
    ("D18", Port::C, 2),
    ("D19", Port::C, 3),
    ("D20", Port::C, 4),
    ("D21", Port::C, 5),
    ("D22", Port::C, 6),
    ("D23", Port::C, 7),
    ("D24", Port::D, 0),
    ("D25", Port::D, 1),
    ("D26", Port::D, 2),
    ("D27", Port::D, 3),
    ("D28", Port::D, 4),
    ("D29", Port::D, 5),
    ("D30", Port::D, 6),
    ("D31", Port::D, 7),
    ("LED", Port::A, 0),
    ("RED_LED", Port::A, 1),
    ("GREEN_LED", Port::A, 2),
    ("BLUE_LED", Port::A, 3),
    ("RX", Port::D, 2),
    ("TX", Port::D, 3),
    ("SCK", Port::B, 1),
    ("SCL", Port::D, 0),
    ("SDA", Port::D, 1),
    // Supply divider jumpered to ADC7
    ("VOLTAGE_MONITOR", Port::F, 7),
];

const fn pin_names() -> [&'static str; PIN_COUNT] {
    let mut names = [""; PIN_COUNT];
    let mut i = 0;
    while i < PIN_COUNT {
        names[i] = PINS[i].0;
        i += 1;
    }
    names
}

pub static PIN_NAMES: [&str; PIN_COUNT] = pin_names();

pub fn locate(name: &str) -> Option<(Port, u8)> {
    PINS.iter()
        .find(|(pin, _, _)| *pin == name)
        .map(|&(_, port, bit)| (port, bit))
}

/// ADC input behind `name`. Only port F is wired to the ADC mux.
pub fn adc_channel(name: &str) -> Option<u8> {
    match locate(name)? {
        (Port::F, bit) => Some(bit),
        _ => None,
    }
}
