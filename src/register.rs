use bit::BitIndex;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusRegister {
    pub status_register_protect: bool,
    pub protected_block: u8,
    pub write_enable_latch: bool,
    pub wip_bit: bool,
}

impl From<u8> for StatusRegister {
    fn from(val: u8) -> StatusRegister {
        StatusRegister {
            status_register_protect: val.bit(7),
            protected_block: val.bit_range(2..6),
            write_enable_latch: val.bit(1),
            wip_bit: val.bit(0),
        }
    }
}

/// The identification returned by the `0x9F` instruction
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    pub manufacturer: u8,
    pub memory_type: u8,
    pub capacity: u8,
}

impl JedecId {
    /// Size of the memory in bytes, decoded from the capacity byte.
    ///
    /// Returns `None` for an unprogrammed or floating bus (`0x00` and `0xFF`)
    /// or a density code that does not fit in 32 bits.
    pub fn capacity_bytes(&self) -> Option<u32> {
        match self.capacity {
            0x00 | 0xFF => None,
            code => 1u32.checked_shl(code as u32),
        }
    }

    /// The three bytes as read from the device
    pub fn to_bytes(&self) -> [u8; 3] {
        [self.manufacturer, self.memory_type, self.capacity]
    }
}

impl From<[u8; 3]> for JedecId {
    fn from(val: [u8; 3]) -> JedecId {
        JedecId {
            manufacturer: val[0],
            memory_type: val[1],
            capacity: val[2],
        }
    }
}
