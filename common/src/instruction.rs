use crate::apdu::ApduHeader;
use crate::error::AppError;

pub const INS_GET_VERSION: u8 = 0x01;
pub const INS_GET_APP_NAME: u8 = 0x02;
pub const INS_SIGN_TX: u8 = 0x03;
pub const INS_ECHO_HASH: u8 = 0x04;
pub const INS_GET_MULTIFIELD_REVIEW: u8 = 0x05;
/// Reserved for out-of-range probing by host tooling. Never mapped.
pub const INS_PROBE: u8 = 0xFE;
pub const INS_ABORT: u8 = 0xFF;

/// P1 of a SignTx chunk: last (or only) chunk.
pub const P1_LAST_CHUNK: u8 = 0x00;
/// P1 of a SignTx chunk: more chunks follow.
pub const P1_MORE_CHUNKS: u8 = 0x01;

/// Possible input commands received through APDUs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    GetVersion,
    GetAppName,
    SignTx { more: bool },
    EchoHash,
    GetMultifieldReview,
    /// Explicit cancellation of any transfer in progress.
    Abort,
}

impl Instruction {
    /// The (INS, P1, P2) triple this instruction is decoded from.
    pub fn encode(self) -> (u8, u8, u8) {
        match self {
            Instruction::GetVersion => (INS_GET_VERSION, 0, 0),
            Instruction::GetAppName => (INS_GET_APP_NAME, 0, 0),
            Instruction::SignTx { more: false } => (INS_SIGN_TX, P1_LAST_CHUNK, 0),
            Instruction::SignTx { more: true } => (INS_SIGN_TX, P1_MORE_CHUNKS, 0),
            Instruction::EchoHash => (INS_ECHO_HASH, 0, 0),
            Instruction::GetMultifieldReview => (INS_GET_MULTIFIELD_REVIEW, 0, 0),
            Instruction::Abort => (INS_ABORT, 0, 0),
        }
    }

    /// Diagnostic instructions are only accepted while no transfer is in progress.
    pub fn is_diagnostic(self) -> bool {
        matches!(
            self,
            Instruction::GetVersion
                | Instruction::GetAppName
                | Instruction::EchoHash
                | Instruction::GetMultifieldReview
        )
    }
}

impl TryFrom<ApduHeader> for Instruction {
    type Error = AppError;

    /// APDU parsing logic.
    ///
    /// Parses INS, P1 and P2 bytes to build an [`Instruction`]. The table is closed: any
    /// selector not listed here is rejected with [`AppError::UnknownInstruction`], and a known
    /// selector with unexpected parameters with [`AppError::WrongP1P2`].
    ///
    /// CLA is not checked here; the dispatcher verifies it against its configured class.
    fn try_from(value: ApduHeader) -> Result<Self, Self::Error> {
        match (value.ins, value.p1, value.p2) {
            (INS_GET_VERSION, 0, 0) => Ok(Instruction::GetVersion),
            (INS_GET_APP_NAME, 0, 0) => Ok(Instruction::GetAppName),
            (INS_SIGN_TX, P1_LAST_CHUNK | P1_MORE_CHUNKS, 0) => Ok(Instruction::SignTx {
                more: value.p1 == P1_MORE_CHUNKS,
            }),
            (INS_ECHO_HASH, 0, 0) => Ok(Instruction::EchoHash),
            (INS_GET_MULTIFIELD_REVIEW, 0, 0) => Ok(Instruction::GetMultifieldReview),
            (INS_ABORT, 0, 0) => Ok(Instruction::Abort),
            (INS_GET_VERSION..=INS_GET_MULTIFIELD_REVIEW | INS_ABORT, _, _) => {
                Err(AppError::WrongP1P2)
            }
            (_, _, _) => Err(AppError::UnknownInstruction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(ins: u8, p1: u8, p2: u8) -> ApduHeader {
        ApduHeader {
            cla: 0x80,
            ins,
            p1,
            p2,
        }
    }

    const ALL: [Instruction; 7] = [
        Instruction::GetVersion,
        Instruction::GetAppName,
        Instruction::SignTx { more: false },
        Instruction::SignTx { more: true },
        Instruction::EchoHash,
        Instruction::GetMultifieldReview,
        Instruction::Abort,
    ];

    #[test]
    fn test_decode_table() {
        #[rustfmt::skip]
        let cases = [
            ((0x01, 0, 0), Ok(Instruction::GetVersion)),
            ((0x02, 0, 0), Ok(Instruction::GetAppName)),
            ((0x03, 0, 0), Ok(Instruction::SignTx { more: false })),
            ((0x03, 1, 0), Ok(Instruction::SignTx { more: true })),
            ((0x03, 2, 0), Err(AppError::WrongP1P2)),
            ((0x03, 0, 1), Err(AppError::WrongP1P2)),
            ((0x04, 0, 0), Ok(Instruction::EchoHash)),
            ((0x05, 0, 0), Ok(Instruction::GetMultifieldReview)),
            ((0x05, 0, 8), Err(AppError::WrongP1P2)),
            ((0xFE, 0, 0), Err(AppError::UnknownInstruction)),
            ((0xFF, 0, 0), Ok(Instruction::Abort)),
            ((0xFF, 1, 0), Err(AppError::WrongP1P2)),
            ((0x00, 0, 0), Err(AppError::UnknownInstruction)),
            ((0x06, 0, 0), Err(AppError::UnknownInstruction)),
        ];
        for ((ins, p1, p2), expected) in cases {
            assert_eq!(Instruction::try_from(header(ins, p1, p2)), expected);
        }
    }

    #[test]
    fn test_encode_decode_consistent() {
        for ins in ALL {
            let (i, p1, p2) = ins.encode();
            assert_eq!(Instruction::try_from(header(i, p1, p2)), Ok(ins));
        }
    }

    #[test]
    fn test_table_is_closed_and_unique() {
        // Every decodable triple is the encoding of exactly one variant
        let mut mapped = 0;
        for ins in 0..=255u8 {
            for p1 in 0..=3u8 {
                for p2 in 0..=3u8 {
                    if let Ok(decoded) = Instruction::try_from(header(ins, p1, p2)) {
                        mapped += 1;
                        assert_eq!(decoded.encode(), (ins, p1, p2));
                    }
                }
            }
        }
        assert_eq!(mapped, ALL.len());
    }

    #[test]
    fn test_diagnostic_set() {
        assert!(Instruction::EchoHash.is_diagnostic());
        assert!(Instruction::GetVersion.is_diagnostic());
        assert!(!Instruction::SignTx { more: true }.is_diagnostic());
        assert!(!Instruction::Abort.is_diagnostic());
    }
}
