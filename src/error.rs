/// All possible errors emitted by the driver
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<SpiError> {
    /// Internal Spi error, any failed transfer of a transaction
    Spi(SpiError),

    /// Payload larger than a page
    TooLarge,

    /// Address out of bound
    OutOfBounds,

    /// The chip has a write in progress
    Busy,

    /// The write in progress bit never cleared
    NotReady,
}
