//! APDU header decoding.
//!
//! A command is `CLA INS P1 P2 Lc` followed by exactly `Lc` body bytes. Decoding is a pure
//! parse of a borrowed slice: the returned [`Apdu`] borrows its body from the input.

use crate::constants::{HEADER_LEN, MAX_BODY_LEN};
use crate::error::AppError;

/// The four addressing bytes of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApduHeader {
    pub cla: u8,
    pub ins: u8,
    pub p1: u8,
    pub p2: u8,
}

/// A decoded command, borrowing its body from the raw packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Apdu<'a> {
    pub header: ApduHeader,
    pub data: &'a [u8],
}

impl<'a> Apdu<'a> {
    /// Decodes a raw packet.
    ///
    /// Fails with [`AppError::MalformedHeader`] if the packet is shorter than the header, or if
    /// the declared body length differs from the number of bytes following the header.
    pub fn parse(raw: &'a [u8]) -> Result<Self, AppError> {
        if raw.len() < HEADER_LEN {
            return Err(AppError::MalformedHeader);
        }
        let lc = raw[4] as usize;
        let data = &raw[HEADER_LEN..];
        if data.len() != lc {
            return Err(AppError::MalformedHeader);
        }
        Ok(Apdu {
            header: ApduHeader {
                cla: raw[0],
                ins: raw[1],
                p1: raw[2],
                p2: raw[3],
            },
            data,
        })
    }
}

/// Encodes a command into `out`, returning the number of bytes written.
///
/// Returns `None` if the body exceeds one packet or `out` is too small.
pub fn encode_into(header: ApduHeader, data: &[u8], out: &mut [u8]) -> Option<usize> {
    if data.len() > MAX_BODY_LEN || out.len() < HEADER_LEN + data.len() {
        return None;
    }
    out[..HEADER_LEN].copy_from_slice(&[
        header.cla,
        header.ins,
        header.p1,
        header.p2,
        data.len() as u8,
    ]);
    out[HEADER_LEN..HEADER_LEN + data.len()].copy_from_slice(data);
    Some(HEADER_LEN + data.len())
}
