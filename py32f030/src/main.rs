//! Bring-up of a ZD25LD40B on SPI1 of a PY32F030.
//!
//! Wiring: SCK PA5, MISO PA6, MOSI PA7, CS PA4, LED PA0, USART1 TX PA2 / RX PA3 at 115200.
#![no_std]
#![no_main]
#![feature(impl_trait_in_assoc_type)]

use core::fmt::{self, Write as _};

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_time::{Delay, Timer};
use embedded_hal_bus::spi::ExclusiveDevice;
use embedded_io::Write;
use heapless::String;
use py32_hal::{
    gpio::{Level, Output, Speed},
    rcc::{HsiFs, Pll, PllSource, Sysclk},
    usart::{self, Uart},
};
use zd25::{address::Address, blocking::ZD25LD40B};
use zd25_py32f030::spi::Spi1;
use {defmt_rtt as _, panic_halt as _};

const TEST_ADDRESS: Address = Address(0x000100);

const PATTERN: [u8; 16] = [
    0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF,
];

/// Bytes as space separated upper case hex
struct HexBytes<'a>(&'a [u8]);

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02X} ", byte)?;
        }
        Ok(())
    }
}

/// Print a line on the serial port, mirrored on the defmt log by the callers
fn print<W: Write>(out: &mut W, args: fmt::Arguments<'_>) {
    let mut line: String<96> = String::new();
    if line.write_fmt(args).is_err() {
        warn!("serial line truncated");
    }
    if out.write_all(line.as_bytes()).is_err() {
        warn!("serial write failed");
    }
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let mut cfg: py32_hal::Config = Default::default();
    cfg.rcc.hsi = Some(HsiFs::HSI_24MHZ);
    cfg.rcc.pll = Some(Pll {
        src: PllSource::HSI,
    });
    cfg.rcc.sys = Sysclk::PLL;
    let p = py32_hal::init(cfg);

    let mut uart_config = usart::Config::default();
    uart_config.baudrate = 115_200;
    let mut serial = unwrap!(Uart::new_blocking(p.USART1, p.PA3, p.PA2, uart_config));

    // Leave time to attach a terminal
    Timer::after_secs(4).await;

    let cs = Output::new(p.PA4, Level::High, Speed::VeryHigh);

    // Mode 0, MSB first, PCLK / 8
    let spi = Spi1::new(p.PA5, p.PA6, p.PA7);

    let spi_dev = unwrap!(ExclusiveDevice::new(spi, cs, Delay));
    let mut memory = ZD25LD40B::new(spi_dev, Delay);

    match memory.read_jedec_id() {
        Ok(id) => {
            info!("Flash ID {}", id);
            let [manufacturer, memory_type, capacity] = id.to_bytes();
            print(
                &mut serial,
                format_args!(
                    "Flash ID: {:02X} {:02X} {:02X}\r\n",
                    manufacturer, memory_type, capacity
                ),
            );
        }
        Err(e) => {
            warn!("Flash ID read failed: {}", e);
            print(&mut serial, format_args!("Flash ID read failed\r\n"));
        }
    }

    info!("Writing {} bytes at {}", PATTERN.len(), TEST_ADDRESS);
    let written = memory
        .write_page(TEST_ADDRESS, &PATTERN)
        .and_then(|()| memory.wait_ready());
    if let Err(e) = written {
        warn!("Write failed: {}", e);
        print(&mut serial, format_args!("Write failed\r\n"));
    }

    let mut read_data = [0u8; PATTERN.len()];
    match memory.read(TEST_ADDRESS, &mut read_data) {
        Ok(()) => {
            info!("Read Data: {:x}", read_data);
            print(&mut serial, format_args!("Read Data: {}\r\n", HexBytes(&read_data)));
            if read_data != PATTERN {
                warn!("Read back differs from the written pattern, page not erased?");
            }
        }
        Err(e) => {
            warn!("Read failed: {}", e);
            print(&mut serial, format_args!("Read failed\r\n"));
        }
    }

    let mut led = Output::new(p.PA0, Level::Low, Speed::High);
    loop {
        Timer::after_millis(1000).await;
        led.toggle();
        info!("echo");
        print(&mut serial, format_args!("echo\r\n"));
    }
}
