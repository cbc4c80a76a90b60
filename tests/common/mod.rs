//! Simulated ZD25 chip for host tests.
//!
//! The bus and the chip select pin share one [`SimChip`], which decodes the bytes
//! of each chip select window like the real part and records every event on the
//! bus so tests can check the exact framing.
#![allow(dead_code)]

use std::{cell::RefCell, convert::Infallible, rc::Rc};

use embedded_hal::{
    delay::DelayNs,
    digital::{self, OutputPin},
    spi::{self, ErrorKind, SpiBus},
};
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use zd25::{blocking::ZD25LD40B, config::Config};

pub const CAPACITY: usize = 0x080000;
pub const JEDEC_ID: [u8; 3] = [0xBA, 0x60, 0x13];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    CsLow,
    CsHigh,
    Write(Vec<u8>),
    Read(usize),
    Flush,
    Failed,
    Delay(u32),
}

pub struct SimChip {
    pub memory: Vec<u8>,
    pub events: Vec<Event>,
    pub cs_high: bool,
    pub write_enable_latch: bool,
    /// Status reads still reporting WIP
    pub busy_polls: u32,
    /// Busy status reads following each page program
    pub program_busy_polls: u32,
    /// WIP never clears
    pub stuck: bool,
    /// Fail the n-th bus transfer from now on
    pub fail_at: Option<usize>,
    transfers: usize,
    frame: Vec<u8>,
    read_pos: usize,
}

impl SimChip {
    fn new() -> Self {
        Self {
            memory: vec![0xFF; CAPACITY],
            events: Vec::new(),
            cs_high: false,
            write_enable_latch: false,
            busy_polls: 0,
            program_busy_polls: 2,
            stuck: false,
            fail_at: None,
            transfers: 0,
            frame: Vec::new(),
            read_pos: 0,
        }
    }

    pub fn fail_transfer(&mut self, n: usize) {
        self.transfers = 0;
        self.fail_at = Some(n);
    }

    /// Bus traffic grouped by chip select window, without flushes
    pub fn frames(&self) -> Vec<Vec<Event>> {
        let mut frames = Vec::new();
        let mut current: Option<Vec<Event>> = None;
        for event in &self.events {
            match event {
                Event::CsLow => current = Some(Vec::new()),
                Event::CsHigh => {
                    if let Some(frame) = current.take() {
                        frames.push(frame);
                    }
                }
                Event::Flush | Event::Delay(_) => {}
                other => {
                    if let Some(frame) = current.as_mut() {
                        frame.push(other.clone());
                    }
                }
            }
        }
        frames
    }

    /// Number of delays recorded and their duration in nanoseconds
    pub fn delays(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Delay(ns) => Some(*ns),
                _ => None,
            })
            .collect()
    }

    fn transfer_fails(&mut self) -> bool {
        let n = self.transfers;
        self.transfers += 1;
        if self.fail_at == Some(n) {
            self.events.push(Event::Failed);
            return true;
        }
        false
    }

    fn address(&self) -> usize {
        ((self.frame[1] as usize) << 16) | ((self.frame[2] as usize) << 8) | self.frame[3] as usize
    }

    fn next_read_byte(&mut self) -> u8 {
        let pos = self.read_pos;
        self.read_pos += 1;
        match self.frame.first() {
            Some(0x05) => {
                let wip = if self.stuck {
                    true
                } else if self.busy_polls > 0 {
                    self.busy_polls -= 1;
                    true
                } else {
                    false
                };
                (wip as u8) | ((self.write_enable_latch as u8) << 1)
            }
            Some(0x9F) => JEDEC_ID.get(pos).copied().unwrap_or(0xFF),
            Some(0x03) if self.frame.len() >= 4 => {
                self.memory[(self.address() + pos) % CAPACITY]
            }
            Some(0x0B) if self.frame.len() >= 5 => {
                self.memory[(self.address() + pos) % CAPACITY]
            }
            _ => 0xFF,
        }
    }

    fn select(&mut self) {
        self.cs_high = false;
        self.frame.clear();
        self.read_pos = 0;
        self.events.push(Event::CsLow);
    }

    fn deselect(&mut self) {
        self.cs_high = true;
        self.events.push(Event::CsHigh);
        let frame = core::mem::take(&mut self.frame);
        match frame.first() {
            Some(0x06) if frame.len() == 1 => self.write_enable_latch = true,
            Some(0x04) if frame.len() == 1 => self.write_enable_latch = false,
            Some(0x02) if frame.len() >= 4 && self.write_enable_latch => {
                let addr = ((frame[1] as usize) << 16) | ((frame[2] as usize) << 8) | frame[3] as usize;
                let page = addr & !0xFF;
                for (i, byte) in frame[4..].iter().enumerate() {
                    // Wraps within the page, and NOR can only clear bits
                    let target = page | ((addr + i) & 0xFF);
                    self.memory[target] &= byte;
                }
                self.write_enable_latch = false;
                self.busy_polls = self.program_busy_polls;
            }
            _ => {}
        }
    }
}

pub type Sim = Rc<RefCell<SimChip>>;

pub struct SimBus(Sim);

impl spi::ErrorType for SimBus {
    type Error = ErrorKind;
}

impl SpiBus for SimBus {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        chip.events.push(Event::Read(words.len()));
        if chip.transfer_fails() {
            return Err(ErrorKind::Other);
        }
        for word in words.iter_mut() {
            *word = chip.next_read_byte();
        }
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        chip.events.push(Event::Write(words.to_vec()));
        if chip.transfer_fails() {
            return Err(ErrorKind::Other);
        }
        chip.frame.extend_from_slice(words);
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Self::Error> {
        self.write(write)?;
        self.read(read)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Self::Error> {
        let out = words.to_vec();
        self.write(&out)?;
        self.read(words)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().events.push(Event::Flush);
        Ok(())
    }
}

pub struct SimCs(Sim);

impl digital::ErrorType for SimCs {
    type Error = Infallible;
}

impl OutputPin for SimCs {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().select();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().deselect();
        Ok(())
    }
}

pub struct SimDelay(Sim);

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().events.push(Event::Delay(ns));
    }
}

pub type SimDevice = ExclusiveDevice<SimBus, SimCs, NoDelay>;
pub type SimFlash = ZD25LD40B<SimDevice, SimDelay>;

pub fn device() -> (Sim, SimDevice) {
    let sim = Rc::new(RefCell::new(SimChip::new()));
    let device = ExclusiveDevice::new(SimBus(sim.clone()), SimCs(sim.clone()), NoDelay)
        .unwrap_or_else(|e: Infallible| match e {});
    sim.borrow_mut().events.clear();
    (sim, device)
}

pub fn setup_with(config: Config) -> (Sim, SimFlash) {
    let (sim, device) = device();
    let flash = SimFlash::with_config(device, SimDelay(sim.clone()), config);
    (sim, flash)
}

pub fn setup() -> (Sim, SimFlash) {
    setup_with(Config::default())
}
