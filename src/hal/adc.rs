use avr_device::atmega128a::ADC;

use super::pinout::adc_channel;
use super::{AnalogInput, BoardError, Result};
use crate::config::ADC_REF_MV;

// ADCSRA
const ADEN: u8 = 1 << 7;
const ADSC: u8 = 1 << 6;
const ADPS_DIV128: u8 = 0b111;
// ADMUX
const REFS_AVCC: u8 = 0b01 << 6;
const MUX_MASK: u8 = 0b0001_1111;

const FULL_SCALE: u32 = 1024;

/// Single-ended 10-bit conversions against AVCC, 125 kHz ADC clock at 16 MHz
pub struct Adc {
    adc: ADC,
}

impl Adc {
    pub fn new(adc: ADC) -> Self {
        unsafe {
            adc.adcsra.write(|w| w.bits(ADEN | ADPS_DIV128));
            adc.admux.write(|w| w.bits(REFS_AVCC));
        }
        Self { adc }
    }

    /// Blocking conversion on one channel
    pub fn read_channel(&mut self, channel: u8) -> u16 {
        unsafe {
            self.adc
                .admux
                .modify(|r, w| w.bits((r.bits() & !MUX_MASK) | (channel & MUX_MASK)));
            self.adc.adcsra.modify(|r, w| w.bits(r.bits() | ADSC));
        }
        while self.adc.adcsra.read().bits() & ADSC != 0 {}
        self.adc.adc.read().bits()
    }
}

impl AnalogInput for Adc {
    fn read_millivolts(&mut self, name: &'static str) -> Result<u32> {
        let channel = adc_channel(name).ok_or(BoardError::NotAnalog(name))?;
        let raw = u32::from(self.read_channel(channel));
        Ok(raw * ADC_REF_MV / FULL_SCALE)
    }
}
