//! Operator-verified board bring-up tests for ATmega128 boards
//!
//! The tests drive pins through the `hal::BoardIo` capability and talk to
//! the operator over any embedded-hal serial port, so everything except the
//! register-level backends also builds and runs on the host.

#![cfg_attr(not(test), no_std)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

pub mod application;
pub mod config;
pub mod drivers;
pub mod hal;
pub mod logger;
pub mod testing;
