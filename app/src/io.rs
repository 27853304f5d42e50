//! The shared transport buffer and the response composer.
//!
//! One fixed-size buffer receives each command and is then reused to compose the response. The
//! two uses never overlap: decoding goes through a [`ReadView`], composing through a
//! [`WriteView`], and the borrow checker guarantees a write view cannot be requested while any
//! read view (or anything borrowed from it) is still alive. Handlers that need command bytes in
//! their response copy them out first, then ask for the write view.

use common::constants::{IO_BUFFER_LEN, MAX_RESPONSE_LEN, STATUS_WORD_LEN};
use common::{apdu::Apdu, AppError, StatusWord};
use log::warn;

pub struct TransportBuffer {
    buffer: [u8; IO_BUFFER_LEN],
    rx_length: usize,
    tx_length: usize,
}

impl TransportBuffer {
    pub const fn new() -> Self {
        Self {
            buffer: [0u8; IO_BUFFER_LEN],
            rx_length: 0,
            tx_length: 0,
        }
    }

    /// Copies a received packet into the buffer.
    ///
    /// A packet larger than the buffer is dropped; decoding the (empty) command then fails with
    /// [`AppError::MalformedHeader`].
    pub fn receive(&mut self, raw: &[u8]) {
        self.tx_length = 0;
        if raw.len() > IO_BUFFER_LEN {
            warn!("io: dropping oversized packet ({} bytes)", raw.len());
            self.rx_length = 0;
            return;
        }
        self.buffer[..raw.len()].copy_from_slice(raw);
        self.rx_length = raw.len();
    }

    /// Raw storage for a transport driver writing a packet in place. Must be followed by
    /// [`TransportBuffer::set_rx_length`].
    pub fn rx_buffer_mut(&mut self) -> &mut [u8; IO_BUFFER_LEN] {
        self.tx_length = 0;
        self.rx_length = 0;
        &mut self.buffer
    }

    pub fn set_rx_length(&mut self, len: usize) {
        self.rx_length = len.min(IO_BUFFER_LEN);
    }

    /// Read access to the received command.
    pub fn reader(&self) -> ReadView<'_> {
        ReadView { io: self }
    }

    /// Write access for composing the response. The received command is no longer readable
    /// once this is called.
    pub fn writer(&mut self) -> WriteView<'_> {
        self.rx_length = 0;
        self.tx_length = 0;
        WriteView { io: self }
    }

    /// The last composed response, body followed by status word.
    pub fn tx(&self) -> &[u8] {
        &self.buffer[..self.tx_length]
    }
}

impl Default for TransportBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared view of the received command.
pub struct ReadView<'a> {
    io: &'a TransportBuffer,
}

impl<'a> ReadView<'a> {
    pub fn command(&self) -> &'a [u8] {
        &self.io.buffer[..self.io.rx_length]
    }

    pub fn apdu(&self) -> Result<Apdu<'a>, AppError> {
        Apdu::parse(self.command())
    }
}

/// Exclusive view used to compose the response: body first, then the status word.
pub struct WriteView<'a> {
    io: &'a mut TransportBuffer,
}

impl WriteView<'_> {
    /// Appends bytes to the response body.
    ///
    /// Fails with [`AppError::ResponseTooLarge`], leaving the body unchanged, if the body would
    /// no longer leave room for the status word.
    pub fn append(&mut self, data: &[u8]) -> Result<(), AppError> {
        let end = self.io.tx_length + data.len();
        if end > MAX_RESPONSE_LEN {
            return Err(AppError::ResponseTooLarge);
        }
        self.io.buffer[self.io.tx_length..end].copy_from_slice(data);
        self.io.tx_length = end;
        Ok(())
    }

    /// Length of the body composed so far.
    pub fn len(&self) -> usize {
        self.io.tx_length
    }

    pub fn is_empty(&self) -> bool {
        self.io.tx_length == 0
    }

    pub fn reply_ok(self) -> usize {
        self.reply(StatusWord::Ok)
    }

    /// Terminates the response with `sw`, returning the total response length.
    ///
    /// Error responses never carry a body: anything appended before is discarded.
    pub fn reply<T: Into<StatusWord>>(self, sw: T) -> usize {
        let sw = sw.into();
        if sw != StatusWord::Ok {
            self.io.tx_length = 0;
        }
        let at = self.io.tx_length;
        self.io.buffer[at..at + STATUS_WORD_LEN].copy_from_slice(&sw.to_be_bytes());
        self.io.tx_length += STATUS_WORD_LEN;
        self.io.tx_length
    }
}

/// What the transport reports between exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A command of the given length was written to the start of the receive buffer.
    Command(usize),
    /// The host went away.
    Disconnect,
}

pub trait Transport {
    /// Blocks until the next event. Returns `None` once the transport is closed.
    fn next_event(&mut self, rx: &mut [u8; IO_BUFFER_LEN]) -> Option<Event>;

    fn send(&mut self, response: &[u8]);
}
