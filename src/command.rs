/// Instruction set of the ZD25LD series used by this driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum Command {
    WriteEnable = 0x06,
    WriteDisable = 0x04,
    ReadStatus = 0x05,
    ProgramPage = 0x02,
    Read = 0x03,
    ReadF = 0x0B,
    ReadJedecId = 0x9F,

    Dummy = 0xFF,
}
