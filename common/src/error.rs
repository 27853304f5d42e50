//! Error taxonomy of the signer.
//!
//! Every variant is answered to the host with exactly one status word; none of them terminates
//! the device. [`AppError::ResponseTooLarge`] is the exception in spirit: it means a handler
//! produced more output than it is budgeted for, and is a bug rather than a runtime condition.

use core::fmt;

use crate::status::StatusWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    /// Packet shorter than the header, or declared body length differs from the received bytes.
    MalformedHeader,
    /// Class byte is not the one this application answers to.
    ClaNotSupported,
    /// Selector is not in the instruction table.
    UnknownInstruction,
    /// Selector is known, but not with these parameters.
    WrongP1P2,
    /// Body length differs from the fixed length the instruction expects.
    WrongLength,
    /// Accumulated payload would exceed the accumulator capacity.
    Overflow,
    /// Instruction is not valid in the current session state.
    SequenceError,
    /// User rejected the operation on the device.
    Denied,
    /// Completed transaction payload is malformed.
    TxParsingFail,
    /// Transaction does not match the parameters of the ongoing swap.
    SwapFail,
    /// Signing primitive failed.
    SignatureFail,
    /// Package version is not of the form major.minor.patch.
    VersionParsingFail,
    /// Handler output does not fit the transport buffer.
    ResponseTooLarge,
}

impl AppError {
    /// The status word reported to the host for this error.
    pub fn status_word(self) -> StatusWord {
        match self {
            AppError::MalformedHeader => StatusWord::BadLen,
            AppError::ClaNotSupported => StatusWord::ClaNotSupported,
            AppError::UnknownInstruction => StatusWord::InsNotSupported,
            AppError::WrongP1P2 => StatusWord::WrongP1P2,
            AppError::WrongLength => StatusWord::WrongDataLength,
            AppError::Overflow => StatusWord::TxWrongLength,
            AppError::SequenceError => StatusWord::BadState,
            AppError::Denied => StatusWord::Deny,
            AppError::TxParsingFail => StatusWord::TxParsingFail,
            AppError::SwapFail => StatusWord::SwapFail,
            AppError::SignatureFail => StatusWord::SignatureFail,
            AppError::VersionParsingFail => StatusWord::VersionParsingFail,
            AppError::ResponseTooLarge => StatusWord::TechnicalProblem,
        }
    }

    /// Returns true if this is a user-initiated rejection.
    #[inline]
    pub fn is_user_rejection(self) -> bool {
        matches!(self, AppError::Denied)
    }

    /// Returns true if this error indicates a defect in the application itself.
    #[inline]
    pub fn is_defect(self) -> bool {
        matches!(self, AppError::ResponseTooLarge)
    }
}

impl From<AppError> for StatusWord {
    fn from(e: AppError) -> StatusWord {
        e.status_word()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MalformedHeader => write!(f, "Malformed header"),
            AppError::ClaNotSupported => write!(f, "Class not supported"),
            AppError::UnknownInstruction => write!(f, "Unknown instruction"),
            AppError::WrongP1P2 => write!(f, "Wrong P1/P2"),
            AppError::WrongLength => write!(f, "Wrong length"),
            AppError::Overflow => write!(f, "Payload overflow"),
            AppError::SequenceError => write!(f, "Instruction out of sequence"),
            AppError::Denied => write!(f, "Denied by user"),
            AppError::TxParsingFail => write!(f, "Transaction parsing failed"),
            AppError::SwapFail => write!(f, "Swap parameters mismatch"),
            AppError::SignatureFail => write!(f, "Signature failed"),
            AppError::VersionParsingFail => write!(f, "Version parsing failed"),
            AppError::ResponseTooLarge => write!(f, "Response too large"),
        }
    }
}

impl core::error::Error for AppError {}
