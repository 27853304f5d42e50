//! Echo diagnostic: answers its 32-byte body back to the host.
//!
//! The body lives in the transport buffer that the response is composed into, so it is copied
//! to the stack by [`read_echo_hash`] while only read access is held. [`handler_echo_hash`] then
//! writes the copy.

use crate::io::WriteView;
use common::constants::ECHO_HASH_LEN;
use common::AppError;

pub fn read_echo_hash(data: &[u8]) -> Result<[u8; ECHO_HASH_LEN], AppError> {
    data.try_into().map_err(|_| AppError::WrongLength)
}

pub fn handler_echo_hash(
    hash: &[u8; ECHO_HASH_LEN],
    out: &mut WriteView<'_>,
) -> Result<(), AppError> {
    out.append(hash)
}
