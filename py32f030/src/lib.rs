//! Board support shared by the bring-up firmware and its on-target tests.
#![no_std]

pub mod spi;
