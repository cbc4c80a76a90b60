#![cfg_attr(not(test), no_std)]
//! This is a platform agnostic library for the ZD25LD series of SPI NOR flash using [embedded-hal](https://github.com/rust-embedded/embedded-hal).
//!
//! Supported chips:
//! * ZD25LD40B, 4Mb
//!
//! Other parts of the family speaking the same instruction set can be used through
//! [`blocking::ZD25`] with their highest address as `SIZE`.
//!
//! The chip select is owned by the [`embedded_hal::spi::SpiDevice`] passed to the driver,
//! every instruction is a single transaction so the chip is always deselected when a
//! function returns, even on errors.

pub mod address;
pub mod blocking;
mod command;
pub mod config;
pub mod error;
pub mod register;

pub use crate::address::PAGE_SIZE;
use crate::error::Error;

pub(crate) fn check_range<E>(size: u32, offset: u32, length: usize) -> Result<(), Error<E>> {
    let capacity = size as u64 + 1;
    let end = (offset as u64).saturating_add(length as u64);
    if end > capacity || offset > size {
        return Err(Error::OutOfBounds);
    }
    Ok(())
}
