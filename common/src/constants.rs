/// Class byte expected on every command unless the dispatcher is configured otherwise.
pub const DEFAULT_CLA: u8 = 0x80;

/// Size of the fixed APDU header: CLA, INS, P1, P2 and the one-byte body length.
pub const HEADER_LEN: usize = 5;

/// Largest body a single packet can carry.
pub const MAX_BODY_LEN: usize = 255;

/// Size of the shared transport buffer. It holds one full command, and is reused to compose
/// the response.
pub const IO_BUFFER_LEN: usize = HEADER_LEN + MAX_BODY_LEN;

/// Length of the status word appended to every response.
pub const STATUS_WORD_LEN: usize = 2;

/// Largest response body that fits in the transport buffer next to the status word.
pub const MAX_RESPONSE_LEN: usize = IO_BUFFER_LEN - STATUS_WORD_LEN;

/// Exact body length accepted by the echo diagnostic.
pub const ECHO_HASH_LEN: usize = 32;

/// Capacity of the transaction accumulator: two full packet bodies.
///
/// A SignTx transfer whose accumulated length would exceed this bound is aborted with
/// [`crate::AppError::Overflow`].
pub const MAX_TRANSACTION_LEN: usize = 2 * MAX_BODY_LEN;

/// Largest signature the signing primitive may return.
pub const MAX_SIGNATURE_LEN: usize = 96;
