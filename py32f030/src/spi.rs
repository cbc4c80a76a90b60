//! Blocking SPI1 master for the PY32F030.
//!
//! `py32-hal` has no SPI driver for this family, so SPI1 is driven through its
//! registers: PCLK / 8, mode 0, MSB first, 8-bit frames, software slave
//! management. Chip-select is left to the caller, usually an
//! [`ExclusiveDevice`](embedded_hal_bus::spi::ExclusiveDevice) around a GPIO.

use core::convert::Infallible;

use embedded_hal::spi::{ErrorType, SpiBus};
use py32_hal::{
    pac::{
        self,
        common::{Reg, RW},
        gpio::vals::{Moder, Ospeedr},
    },
    peripherals::{PA5, PA6, PA7},
};

const SPI1_BASE: usize = 0x4001_3000;

const CR1: usize = 0x00;
const CR2: usize = 0x04;
const SR: usize = 0x08;
const DR: usize = 0x0C;

const CR1_MSTR: u32 = 1 << 2;
const CR1_BR_DIV8: u32 = 0b010 << 3;
const CR1_SPE: u32 = 1 << 6;
const CR1_SSI: u32 = 1 << 8;
const CR1_SSM: u32 = 1 << 9;

// RXNE as soon as one byte sits in the receive FIFO
const CR2_FRXTH: u32 = 1 << 12;

const SR_RXNE: u32 = 1 << 0;
const SR_TXE: u32 = 1 << 1;
const SR_BSY: u32 = 1 << 7;

// Clocked out while only receiving
const FILL: u8 = 0xFF;

// SCK, MISO and MOSI, all on AF0
const PINS: [usize; 3] = [5, 6, 7];
const AF_SPI1: u8 = 0;

fn reg(offset: usize) -> Reg<u32, RW> {
    unsafe { Reg::from_ptr((SPI1_BASE + offset) as *mut u32) }
}

// Byte wide, a 32-bit access would push two frames
fn data() -> Reg<u8, RW> {
    unsafe { Reg::from_ptr((SPI1_BASE + DR) as *mut u8) }
}

/// SPI1 on SCK PA5, MISO PA6, MOSI PA7.
///
/// Owns the three pins so nothing else can reconfigure them.
pub struct Spi1 {
    _sck: PA5,
    _miso: PA6,
    _mosi: PA7,
}

impl Spi1 {
    /// Clock the peripheral, route the pins and enable SPI1 as master
    pub fn new(sck: PA5, miso: PA6, mosi: PA7) -> Self {
        pac::RCC.iopenr().modify(|w| w.set_gpioaen(true));
        pac::RCC.apbenr2().modify(|w| w.set_spi1en(true));

        for pin in PINS {
            pac::GPIOA.afr(0).modify(|w| w.set_afr(pin, AF_SPI1));
            pac::GPIOA
                .ospeedr()
                .modify(|w| w.set_ospeedr(pin, Ospeedr::VERYHIGHSPEED));
            pac::GPIOA.moder().modify(|w| w.set_moder(pin, Moder::ALTERNATE));
        }

        // CPOL, CPHA and LSBFIRST stay cleared, SPE is set last
        reg(CR1).write_value(0);
        reg(CR2).write_value(CR2_FRXTH);
        reg(CR1).write_value(CR1_MSTR | CR1_BR_DIV8 | CR1_SSI | CR1_SSM);
        reg(CR1).modify(|v| *v |= CR1_SPE);

        defmt::debug!("SPI1 enabled, CR1 {=u32:#x}", reg(CR1).read());

        Self {
            _sck: sck,
            _miso: miso,
            _mosi: mosi,
        }
    }

    fn status(&self) -> u32 {
        reg(SR).read()
    }

    /// Shift one byte out and the byte clocked in at the same time back
    fn exchange(&mut self, byte: u8) -> u8 {
        while self.status() & SR_TXE == 0 {}
        data().write_value(byte);
        while self.status() & SR_RXNE == 0 {}
        data().read()
    }
}

impl ErrorType for Spi1 {
    type Error = Infallible;
}

impl SpiBus for Spi1 {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.exchange(FILL);
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        for &word in words {
            self.exchange(word);
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        for i in 0..read.len().max(write.len()) {
            let byte = self.exchange(write.get(i).copied().unwrap_or(FILL));
            if let Some(slot) = read.get_mut(i) {
                *slot = byte;
            }
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        for word in words {
            *word = self.exchange(*word);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        while self.status() & SR_BSY != 0 {}
        Ok(())
    }
}
