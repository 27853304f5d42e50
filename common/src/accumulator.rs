//! Assembly of multi-packet payloads.
//!
//! A [`ChunkAccumulator`] owns a fixed-capacity buffer and appends packet bodies to it until a
//! chunk arrives without the continuation flag. The completed payload is handed out as an owned
//! [`Payload`] copy, so no reference into the accumulator (or into the transport buffer the
//! chunks came from) outlives the call that produced it.
//!
//! Overflowing the capacity aborts the transfer: the accumulator is reset to
//! [`AccumulatorState::Empty`] and [`AppError::Overflow`] is returned.

use core::fmt;
use core::ops::Deref;

use log::debug;
use zeroize::Zeroize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// No transfer in progress.
    Empty,
    /// At least one chunk received, and the last one announced more.
    Accumulating,
    /// The last chunk closed the transfer; the payload is ready to be taken.
    Complete,
}

/// An owned, fixed-capacity copy of an assembled payload. Zeroized on drop.
pub struct Payload<const N: usize> {
    data: [u8; N],
    len: usize,
}

impl<const N: usize> Deref for Payload<N> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data[..self.len]
    }
}

impl<const N: usize> AsRef<[u8]> for Payload<N> {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl<const N: usize> fmt::Debug for Payload<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload").field("len", &self.len).finish()
    }
}

impl<const N: usize> Drop for Payload<N> {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}

pub struct ChunkAccumulator<const N: usize> {
    buffer: [u8; N],
    len: usize,
    state: AccumulatorState,
}

impl<const N: usize> ChunkAccumulator<N> {
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; N],
            len: 0,
            state: AccumulatorState::Empty,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Number of bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discards any transfer in progress.
    pub fn begin(&mut self) {
        self.buffer[..self.len].zeroize();
        self.len = 0;
        self.state = AccumulatorState::Empty;
    }

    /// Appends one chunk.
    ///
    /// Only valid while [`AccumulatorState::Empty`] or [`AccumulatorState::Accumulating`];
    /// otherwise fails with [`AppError::SequenceError`] and leaves the accumulator untouched.
    /// Fails with [`AppError::Overflow`], after resetting, if the chunk does not fit.
    pub fn accept(&mut self, body: &[u8], more: bool) -> Result<AccumulatorState, AppError> {
        if self.state == AccumulatorState::Complete {
            return Err(AppError::SequenceError);
        }

        let end = match self.len.checked_add(body.len()) {
            Some(end) if end <= N => end,
            _ => {
                debug!(
                    "accumulator: overflow ({} + {} > {})",
                    self.len,
                    body.len(),
                    N
                );
                self.begin();
                return Err(AppError::Overflow);
            }
        };

        self.buffer[self.len..end].copy_from_slice(body);
        self.len = end;
        self.state = if more {
            AccumulatorState::Accumulating
        } else {
            AccumulatorState::Complete
        };
        Ok(self.state)
    }

    /// Hands out the completed payload and resets to [`AccumulatorState::Empty`].
    pub fn take(&mut self) -> Result<Payload<N>, AppError> {
        if self.state != AccumulatorState::Complete {
            return Err(AppError::SequenceError);
        }
        let mut payload = Payload {
            data: [0u8; N],
            len: self.len,
        };
        payload.data[..self.len].copy_from_slice(&self.buffer[..self.len]);
        self.begin();
        Ok(payload)
    }
}

impl<const N: usize> Default for ChunkAccumulator<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_chunk() {
        let mut acc = ChunkAccumulator::<32>::new();
        assert_eq!(acc.accept(b"hello", false), Ok(AccumulatorState::Complete));
        let payload = acc.take().unwrap();
        assert_eq!(&*payload, b"hello");
        assert_eq!(acc.state(), AccumulatorState::Empty);
        assert!(acc.is_empty());
    }

    #[test]
    fn test_chunk_boundary_independence() {
        let message: [u8; 32] = core::array::from_fn(|i| i as u8);

        // every way of splitting the message into two or three chunks yields the same payload
        for a in 0..=message.len() {
            for b in a..=message.len() {
                let mut acc = ChunkAccumulator::<32>::new();
                assert_eq!(
                    acc.accept(&message[..a], true),
                    Ok(AccumulatorState::Accumulating)
                );
                assert_eq!(
                    acc.accept(&message[a..b], true),
                    Ok(AccumulatorState::Accumulating)
                );
                assert_eq!(
                    acc.accept(&message[b..], false),
                    Ok(AccumulatorState::Complete)
                );
                assert_eq!(&*acc.take().unwrap(), &message[..]);
            }
        }
    }

    #[test]
    fn test_overflow_resets() {
        let mut acc = ChunkAccumulator::<32>::new();
        acc.accept(&[0xAA; 20], true).unwrap();
        assert_eq!(acc.accept(&[0xBB; 13], false), Err(AppError::Overflow));
        assert_eq!(acc.state(), AccumulatorState::Empty);
        assert_eq!(acc.len(), 0);

        // usable again for a fresh transfer
        acc.accept(&[0xCC; 32], false).unwrap();
        assert_eq!(&*acc.take().unwrap(), &[0xCC; 32]);
    }

    #[test]
    fn test_exact_capacity() {
        let mut acc = ChunkAccumulator::<32>::new();
        acc.accept(&[1; 16], true).unwrap();
        assert_eq!(acc.accept(&[2; 16], false), Ok(AccumulatorState::Complete));
        assert_eq!(acc.take().unwrap().len(), 32);
    }

    #[test]
    fn test_take_requires_complete() {
        let mut acc = ChunkAccumulator::<32>::new();
        assert_eq!(acc.take().unwrap_err(), AppError::SequenceError);
        acc.accept(&[1, 2, 3], true).unwrap();
        assert_eq!(acc.take().unwrap_err(), AppError::SequenceError);
        assert_eq!(acc.state(), AccumulatorState::Accumulating);
        assert_eq!(acc.len(), 3);
    }

    #[test]
    fn test_accept_after_complete() {
        let mut acc = ChunkAccumulator::<32>::new();
        acc.accept(&[1, 2, 3], false).unwrap();
        assert_eq!(acc.accept(&[4], false), Err(AppError::SequenceError));
        assert_eq!(&*acc.take().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn test_begin_discards() {
        let mut acc = ChunkAccumulator::<32>::new();
        acc.accept(&[9; 10], true).unwrap();
        acc.begin();
        assert_eq!(acc.state(), AccumulatorState::Empty);
        assert!(acc.buffer.iter().all(|&b| b == 0));
    }
}
