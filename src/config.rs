/// How the 24 bits address is clocked out after the instruction byte
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressTransfer {
    /// Instruction and address in a single write
    #[default]
    Contiguous,
    /// Instruction, then each address byte as its own one byte write.
    /// Matches the bus timing of firmwares issuing one HAL transfer per byte.
    Split,
}

/// Driver configuration
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of status reads before giving up on the WIP bit.
    /// At least one read is always done.
    pub ready_poll_limit: u32,

    /// Time between two status reads, in microseconds
    pub poll_interval_us: u32,

    /// How the address bytes follow the instruction byte
    pub address_transfer: AddressTransfer,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // A page program is 3ms max, leaves room for slow parts and clocks
            ready_poll_limit: 100_000,
            poll_interval_us: 10,
            address_transfer: AddressTransfer::Contiguous,
        }
    }
}

impl Config {
    pub fn with_ready_poll_limit(mut self, ready_poll_limit: u32) -> Self {
        self.ready_poll_limit = ready_poll_limit;
        self
    }

    pub fn with_poll_interval_us(mut self, poll_interval_us: u32) -> Self {
        self.poll_interval_us = poll_interval_us;
        self
    }

    pub fn with_address_transfer(mut self, address_transfer: AddressTransfer) -> Self {
        self.address_transfer = address_transfer;
        self
    }
}
