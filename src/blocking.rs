use crate::{
    address::{Address, PAGE_SIZE},
    check_range,
    command::Command,
    config::{AddressTransfer, Config},
    error::Error,
    register::{JedecId, StatusRegister},
};
use embedded_hal::{
    delay::DelayNs,
    spi::{Operation, SpiDevice},
};

/// Type alias for the ZD25LD40B
pub type ZD25LD40B<SPI, D> = ZD25<0x07FFFF, SPI, D>;

/// Type alias for the low level ZD25LD40B driver
pub type ZD25LD40BLowLevel<SPI> = ZD25LowLevel<0x07FFFF, SPI>;

/// The generic low level ZD25 driver. `SIZE` is the highest valid address.
///
/// Each function is exactly one instruction in one transaction, nothing is sequenced:
/// write enable and the WIP bit are left to the caller. See [`ZD25`] for that.
pub struct ZD25LowLevel<const SIZE: u32, SPI> {
    spi: SPI,
    address_transfer: AddressTransfer,
}

impl<const SIZE: u32, SPI, E> ZD25LowLevel<SIZE, SPI>
where
    SPI: SpiDevice<Error = E>,
{
    pub fn new(spi: SPI, address_transfer: AddressTransfer) -> Self {
        Self {
            spi,
            address_transfer,
        }
    }

    pub const fn capacity() -> usize {
        SIZE as usize + 1
    }

    /// Give back the spi device
    pub fn release(self) -> SPI {
        self.spi
    }

    pub fn verify_addr(addr: Address) -> Result<u32, Error<E>> {
        let val: u32 = addr.into();
        if val > SIZE {
            return Err(Error::OutOfBounds);
        }
        Ok(val)
    }

    /// Check that a page program of `length` bytes at `addr` is valid, without touching the bus
    pub fn verify_page(addr: Address, length: usize) -> Result<(), Error<E>> {
        if length > PAGE_SIZE as usize {
            return Err(Error::TooLarge);
        }
        check_range(SIZE, addr.0, length)
    }

    fn command_write(&mut self, bytes: &[u8]) -> Result<(), Error<E>> {
        self.spi.write(bytes).map_err(Error::Spi)
    }

    fn command_read(&mut self, cmd: Command, buff: &mut [u8]) -> Result<(), Error<E>> {
        self.spi
            .transaction(&mut [Operation::Write(&[cmd as u8][..]), Operation::Read(buff)])
            .map_err(Error::Spi)
    }

    fn addr_transaction(
        &mut self,
        addr: Address,
        cmd: Command,
        dummy: bool,
        data: Operation<'_, u8>,
    ) -> Result<(), Error<E>> {
        let addr_val = Self::verify_addr(addr)?;
        let [high, mid, low] = Address(addr_val).to_bytes();
        let header: [u8; 5] = [cmd as u8, high, mid, low, Command::Dummy as u8];

        let res = match (self.address_transfer, dummy) {
            (AddressTransfer::Contiguous, false) => self
                .spi
                .transaction(&mut [Operation::Write(&header[..4]), data]),
            (AddressTransfer::Contiguous, true) => self
                .spi
                .transaction(&mut [Operation::Write(&header[..]), data]),
            (AddressTransfer::Split, false) => self.spi.transaction(&mut [
                Operation::Write(&header[0..1]),
                Operation::Write(&header[1..2]),
                Operation::Write(&header[2..3]),
                Operation::Write(&header[3..4]),
                data,
            ]),
            (AddressTransfer::Split, true) => self.spi.transaction(&mut [
                Operation::Write(&header[0..1]),
                Operation::Write(&header[1..2]),
                Operation::Write(&header[2..3]),
                Operation::Write(&header[3..4]),
                Operation::Write(&header[4..5]),
                data,
            ]),
        };
        res.map_err(Error::Spi)
    }

    fn read_base(
        &mut self,
        addr: Address,
        cmd: Command,
        dummy: bool,
        buff: &mut [u8],
    ) -> Result<(), Error<E>> {
        let len = buff.len();
        check_range(SIZE, addr.0, len)?;
        let res = self.addr_transaction(addr, cmd, dummy, Operation::Read(buff));
        #[cfg(feature = "defmt")]
        match &res {
            Ok(()) => defmt::trace!("Read from {=u32}, {=usize} bytes", addr.0, len),
            Err(_) => defmt::error!("Read from {=u32} failed", addr.0),
        }
        res
    }

    /// Read n bytes from an address with the low power read instruction
    pub fn read(&mut self, addr: Address, buff: &mut [u8]) -> Result<(), Error<E>> {
        self.read_base(addr, Command::Read, false, buff)
    }

    /// Read n bytes from an address with the fast read instruction, a dummy byte follows the address
    pub fn read_fast(&mut self, addr: Address, buff: &mut [u8]) -> Result<(), Error<E>> {
        self.read_base(addr, Command::ReadF, true, buff)
    }

    /// Program up to a page. Write must be enabled, see [`Self::write_enable`].
    /// Bytes past the end of the page wrap around to its start on the chip.
    pub fn page_program(&mut self, addr: Address, buff: &[u8]) -> Result<(), Error<E>> {
        Self::verify_page(addr, buff.len())?;
        #[cfg(feature = "defmt")]
        defmt::trace!("Program {=u32}, {=usize} bytes", addr.0, buff.len());
        self.addr_transaction(addr, Command::ProgramPage, false, Operation::Write(buff))
    }

    /// Enable write operation
    pub fn write_enable(&mut self) -> Result<(), Error<E>> {
        self.command_write(&[Command::WriteEnable as u8])
    }

    /// Disable write
    pub fn write_disable(&mut self) -> Result<(), Error<E>> {
        self.command_write(&[Command::WriteDisable as u8])
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<StatusRegister, Error<E>> {
        let mut status = [0u8; 1];
        self.command_read(Command::ReadStatus, &mut status)?;
        Ok(status[0].into())
    }

    /// Read the wip bit once, [`Error::Busy`] while a write is in progress
    pub fn poll_wip(&mut self) -> Result<(), Error<E>> {
        if self.read_status()?.wip_bit {
            return Err(Error::Busy);
        }
        Ok(())
    }

    /// Read the manufacturer, memory type and capacity of the device
    pub fn read_jedec_id(&mut self) -> Result<JedecId, Error<E>> {
        let mut id = [0u8; 3];
        self.command_read(Command::ReadJedecId, &mut id)?;
        Ok(id.into())
    }
}

/// The generic higher level driver for the ZD25. Enables write and waits on the WIP bit where needed,
/// with a bounded number of polls, see [`Config`].
pub struct ZD25<const SIZE: u32, SPI, D> {
    zd25_ll: ZD25LowLevel<SIZE, SPI>,
    delay: D,
    config: Config,
}

impl<const SIZE: u32, SPI, E, D> ZD25<SIZE, SPI, D>
where
    SPI: SpiDevice<Error = E>,
    D: DelayNs,
{
    /// Create a new instance with the default [`Config`]
    pub fn new(spi: SPI, delay: D) -> Self {
        Self::with_config(spi, delay, Config::default())
    }

    pub fn with_config(spi: SPI, delay: D, config: Config) -> Self {
        Self {
            zd25_ll: ZD25LowLevel::new(spi, config.address_transfer),
            delay,
            config,
        }
    }

    pub const fn capacity() -> usize {
        SIZE as usize + 1
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Access to the raw instructions
    pub fn low_level(&mut self) -> &mut ZD25LowLevel<SIZE, SPI> {
        &mut self.zd25_ll
    }

    /// Give back the spi device and the delay
    pub fn release(self) -> (SPI, D) {
        (self.zd25_ll.release(), self.delay)
    }

    /// Read the manufacturer, memory type and capacity of the device
    pub fn read_jedec_id(&mut self) -> Result<JedecId, Error<E>> {
        self.zd25_ll.read_jedec_id()
    }

    /// Read the status register
    pub fn read_status(&mut self) -> Result<StatusRegister, Error<E>> {
        self.zd25_ll.read_status()
    }

    /// Check if the chip has work in progress
    pub fn poll_wip(&mut self) -> Result<(), Error<E>> {
        self.zd25_ll.poll_wip()
    }

    /// Poll the WIP bit until it clears. Gives up with [`Error::NotReady`] after
    /// [`Config::ready_poll_limit`] reads, waiting [`Config::poll_interval_us`] between them.
    pub fn wait_ready(&mut self) -> Result<(), Error<E>> {
        let mut polls: u32 = 0;
        loop {
            match self.zd25_ll.poll_wip() {
                Err(Error::Busy) => {}
                res => return res,
            }
            polls += 1;
            if polls >= self.config.ready_poll_limit {
                #[cfg(feature = "defmt")]
                defmt::warn!("WIP still set after {=u32} polls", polls);
                return Err(Error::NotReady);
            }
            self.delay.delay_us(self.config.poll_interval_us);
        }
    }

    /// Write up to a page. Write is enabled and the chip is waited on before the program instruction.
    /// Does not wait for the program itself to complete, see [`Self::wait_ready`].
    pub fn write_page(&mut self, addr: Address, buff: &[u8]) -> Result<(), Error<E>> {
        ZD25LowLevel::<SIZE, SPI>::verify_page(addr, buff.len())?;
        self.zd25_ll.write_enable()?;
        self.wait_ready()?;
        self.zd25_ll.page_program(addr, buff)
    }

    /// Disable write, cancels a previous write enable
    pub fn write_disable(&mut self) -> Result<(), Error<E>> {
        self.zd25_ll.write_disable()
    }

    /// Read n bytes from an address
    pub fn read(&mut self, addr: Address, buff: &mut [u8]) -> Result<(), Error<E>> {
        self.zd25_ll.read(addr, buff)
    }

    /// Read n bytes quickly from an address
    pub fn read_fast(&mut self, addr: Address, buff: &mut [u8]) -> Result<(), Error<E>> {
        self.zd25_ll.read_fast(addr, buff)
    }
}

/// Implementation of the `ReadNorFlash` trait of the `embedded_storage` crate.
/// `NorFlash` is not provided, the driver does not erase.
mod es {
    use super::*;
    use core::fmt::Debug;
    use embedded_storage::nor_flash::{
        check_read, ErrorType, NorFlashError, NorFlashErrorKind, ReadNorFlash,
    };

    impl<E> From<NorFlashErrorKind> for Error<E> {
        // With a read size of 1, `check_read` only fails on bounds
        fn from(_: NorFlashErrorKind) -> Self {
            Error::OutOfBounds
        }
    }

    impl<SpiError> NorFlashError for Error<SpiError>
    where
        SpiError: Debug,
    {
        fn kind(&self) -> NorFlashErrorKind {
            match self {
                Error::OutOfBounds => NorFlashErrorKind::OutOfBounds,
                Error::TooLarge => NorFlashErrorKind::OutOfBounds,
                Error::Spi(_) | Error::Busy | Error::NotReady => NorFlashErrorKind::Other,
            }
        }
    }

    impl<const SIZE: u32, SPI, D> ErrorType for ZD25<SIZE, SPI, D>
    where
        SPI: SpiDevice,
    {
        type Error = Error<SPI::Error>;
    }

    impl<const SIZE: u32, SPI, D> ReadNorFlash for ZD25<SIZE, SPI, D>
    where
        SPI: SpiDevice,
        D: DelayNs,
    {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            check_read(self, offset, bytes.len())?;
            self.zd25_ll.read(Address(offset), bytes)
        }

        fn capacity(&self) -> usize {
            Self::capacity()
        }
    }
}
