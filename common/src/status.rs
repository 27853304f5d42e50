use core::fmt;
use num_derive::{FromPrimitive, ToPrimitive};

/// Status words appended to every response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive, ToPrimitive)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    Ok = 0x9000,
    /// Rejected by user
    Deny = 0x6985,
    /// Incorrect data
    /// Wrong P1P2
    WrongP1P2 = 0x6A86,
    /// Wrong data length
    WrongDataLength = 0x6A87,
    /// Ins not supported
    InsNotSupported = 0x6D00,
    /// Cla not supported
    ClaNotSupported = 0x6E00,
    /// Declared APDU length does not match the received bytes
    BadLen = 0x6E03,
    /// Internal error, response did not fit the I/O buffer
    TechnicalProblem = 0x6F00,
    /// Accumulated transaction exceeds the accumulator capacity
    TxWrongLength = 0xB004,
    /// Transaction payload could not be parsed
    TxParsingFail = 0xB005,
    /// Instruction received in the wrong session state
    BadState = 0xB007,
    /// Signature fail
    SignatureFail = 0xB008,
    /// Version string could not be parsed
    VersionParsingFail = 0xB00A,
    /// Transaction does not match the swap parameters
    SwapFail = 0xC000,
}

impl StatusWord {
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    #[inline]
    pub fn to_be_bytes(self) -> [u8; 2] {
        self.code().to_be_bytes()
    }
}

impl From<StatusWord> for u16 {
    fn from(sw: StatusWord) -> u16 {
        sw as u16
    }
}

impl TryFrom<u16> for StatusWord {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        num_traits::FromPrimitive::from_u16(value).ok_or(value)
    }
}

impl fmt::Display for StatusWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} (0x{:04X})", self, self.code())
    }
}
