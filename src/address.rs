pub const PAGE_SIZE: u32 = 0x100;

/// A page id, containing 256 bytes
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Page(pub u16);

/// A 24 bits address on the memory chip
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address(pub u32);

impl Address {
    /// Represents any address in memory.
    pub fn from_addr(page: Page, offset: u8) -> Self {
        Address(page.0 as u32 * PAGE_SIZE + offset as u32)
    }

    /// Represents a specific page in memory.
    pub fn from_page(page: Page) -> Self {
        Self::from_addr(page, 0)
    }

    /// The page this address falls in
    pub fn page(&self) -> Page {
        Page((self.0 / PAGE_SIZE) as u16)
    }

    /// The address as sent on the wire, most significant byte first
    pub fn to_bytes(&self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }
}

impl From<u16> for Page {
    fn from(page_id: u16) -> Page {
        Page(page_id)
    }
}

impl From<u32> for Address {
    fn from(addr: u32) -> Address {
        Address(addr)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> u32 {
        addr.0
    }
}
