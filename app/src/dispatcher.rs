//! Command dispatch and session state.
//!
//! Each exchange runs in two phases over the shared [`TransportBuffer`]:
//!
//! 1. Under a read view, the command is decoded, checked against the session state, and
//!    whatever a handler needs from the body is copied out: into the accumulator for SignTx
//!    chunks, into a stack array for the echo diagnostic.
//! 2. The read view is released, a write view is taken, and exactly one handler composes the
//!    response.
//!
//! A multi-packet SignTx transfer moves the session from [`Session::Idle`] to
//! [`Session::Receiving`] until a chunk arrives without the continuation flag. Diagnostics are
//! refused with [`AppError::SequenceError`] while receiving, leaving the transfer intact. Any
//! other failure, an explicit Abort, or a transport disconnect discards the transfer; the host
//! must restart it from the first chunk.

use log::{debug, error, info, warn};

use crate::handlers::{
    echo_hash::{handler_echo_hash, read_echo_hash},
    get_version::handler_get_version,
    multifield_review::handler_multifield_review,
    sign_tx::handler_sign_tx,
    swap::SwapParams,
};
use crate::io::{Event, TransportBuffer, Transport};
use crate::platform::Platform;
use common::accumulator::{AccumulatorState, ChunkAccumulator, Payload};
use common::constants::{DEFAULT_CLA, ECHO_HASH_LEN, MAX_TRANSACTION_LEN};
use common::instruction::Instruction;
use common::{AppError, StatusWord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No transfer in progress.
    Idle,
    /// A SignTx transfer is being accumulated.
    Receiving,
}

/// Service statistics.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceStats {
    /// Number of SignTx payloads assembled and handed to the signing handler.
    pub payloads_completed: u64,
    /// Number of signatures returned.
    pub signs_completed: u64,
    /// Number of operations rejected by the user.
    pub signs_rejected: u64,
    /// Number of exchanges answered with an error, user rejections excluded.
    pub errors: u64,
}

/// What a handler needs from the command, owned so that the transport buffer can be reused.
enum Request {
    GetVersion,
    GetAppName,
    EchoHash([u8; ECHO_HASH_LEN]),
    GetMultifieldReview,
    SignTx(Payload<MAX_TRANSACTION_LEN>),
    ChunkAccepted,
    Abort,
}

pub struct Dispatcher<P: Platform> {
    platform: P,
    io: TransportBuffer,
    accumulator: ChunkAccumulator<MAX_TRANSACTION_LEN>,
    session: Session,
    expected_cla: u8,
    swap: Option<SwapParams>,
    stats: ServiceStats,
}

impl<P: Platform> Dispatcher<P> {
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            io: TransportBuffer::new(),
            accumulator: ChunkAccumulator::new(),
            session: Session::Idle,
            expected_cla: DEFAULT_CLA,
            swap: None,
            stats: ServiceStats::default(),
        }
    }

    /// Commands with any other class byte are answered with `ClaNotSupported`.
    pub fn set_expected_cla(mut self, cla: u8) -> Self {
        self.expected_cla = cla;
        self
    }

    /// Runs in swap mode: transactions are checked against `params` instead of being reviewed.
    pub fn with_swap(mut self, params: SwapParams) -> Self {
        self.swap = Some(params);
        self
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn accumulator_state(&self) -> AccumulatorState {
        self.accumulator.state()
    }

    /// Bytes of the transfer in progress.
    pub fn accumulated_len(&self) -> usize {
        self.accumulator.len()
    }

    pub fn stats(&self) -> &ServiceStats {
        &self.stats
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Processes one raw command and returns the raw response: body, then status word.
    pub fn handle_packet(&mut self, raw: &[u8]) -> &[u8] {
        self.io.receive(raw);
        self.exchange();
        self.io.tx()
    }

    /// The transport lost the host: any transfer in progress is discarded.
    pub fn on_disconnect(&mut self) {
        info!("dispatcher: transport disconnected");
        self.abort_transfer();
    }

    /// Exchange loop. Returns when the transport closes.
    pub fn serve<T: Transport>(&mut self, transport: &mut T) {
        while let Some(event) = transport.next_event(self.io.rx_buffer_mut()) {
            match event {
                Event::Command(len) => {
                    self.io.set_rx_length(len);
                    self.exchange();
                    transport.send(self.io.tx());
                }
                Event::Disconnect => self.on_disconnect(),
            }
        }
    }

    fn abort_transfer(&mut self) {
        if self.session == Session::Receiving {
            debug!(
                "dispatcher: discarding transfer ({} bytes)",
                self.accumulator.len()
            );
        }
        self.accumulator.begin();
        self.session = Session::Idle;
    }

    fn exchange(&mut self) {
        let request = self.decode();
        let result = self.execute(request);

        match result {
            Ok(()) => {}
            Err(AppError::SequenceError) => {
                warn!("dispatcher: instruction out of sequence, transfer kept");
                self.stats.errors += 1;
            }
            Err(e) => {
                if e.is_user_rejection() {
                    self.stats.signs_rejected += 1;
                } else {
                    self.stats.errors += 1;
                }
                if e.is_defect() {
                    error!("dispatcher: {}", e);
                } else {
                    warn!("dispatcher: {} ({})", e, e.status_word());
                }
                debug_assert!(!e.is_defect(), "handler exceeded its response budget");
                self.abort_transfer();
            }
        }
    }

    /// Phase 1: decoding under read access only.
    fn decode(&mut self) -> Result<Request, AppError> {
        let reader = self.io.reader();
        let apdu = reader.apdu()?;

        if apdu.header.cla != self.expected_cla {
            return Err(AppError::ClaNotSupported);
        }
        let ins = Instruction::try_from(apdu.header)?;

        if self.session == Session::Receiving && ins.is_diagnostic() {
            return Err(AppError::SequenceError);
        }

        match ins {
            Instruction::GetVersion => Ok(Request::GetVersion),
            Instruction::GetAppName => Ok(Request::GetAppName),
            Instruction::EchoHash => Ok(Request::EchoHash(read_echo_hash(apdu.data)?)),
            Instruction::GetMultifieldReview => Ok(Request::GetMultifieldReview),
            Instruction::Abort => {
                self.accumulator.begin();
                self.session = Session::Idle;
                Ok(Request::Abort)
            }
            Instruction::SignTx { more } => {
                if self.session == Session::Idle {
                    self.accumulator.begin();
                }
                match self.accumulator.accept(apdu.data, more)? {
                    AccumulatorState::Complete => {
                        self.session = Session::Idle;
                        self.stats.payloads_completed += 1;
                        debug!(
                            "dispatcher: transfer complete ({} bytes)",
                            self.accumulator.len()
                        );
                        Ok(Request::SignTx(self.accumulator.take()?))
                    }
                    _ => {
                        self.session = Session::Receiving;
                        debug!(
                            "dispatcher: chunk accepted ({} bytes so far)",
                            self.accumulator.len()
                        );
                        Ok(Request::ChunkAccepted)
                    }
                }
            }
        }
    }

    /// Phase 2: exactly one handler composes the response under write access.
    fn execute(&mut self, request: Result<Request, AppError>) -> Result<(), AppError> {
        let mut out = self.io.writer();

        let result = match request {
            Err(e) => Err(e),
            Ok(Request::GetVersion) => handler_get_version(&mut out),
            Ok(Request::GetAppName) => out.append(env!("CARGO_PKG_NAME").as_bytes()),
            Ok(Request::EchoHash(hash)) => handler_echo_hash(&hash, &mut out),
            Ok(Request::GetMultifieldReview) => handler_multifield_review(&mut self.platform),
            Ok(Request::SignTx(payload)) => {
                let result =
                    handler_sign_tx(&mut self.platform, &payload, self.swap.as_ref(), &mut out);
                if result.is_ok() {
                    self.stats.signs_completed += 1;
                }
                result
            }
            Ok(Request::ChunkAccepted) => Ok(()),
            Ok(Request::Abort) => {
                info!("dispatcher: transfer aborted by host");
                Ok(())
            }
        };

        match result {
            Ok(()) => out.reply_ok(),
            Err(e) => out.reply(e),
        };
        result
    }

    /// Status word of the last response, if any.
    pub fn last_status(&self) -> Option<StatusWord> {
        let tx = self.io.tx();
        let sw = u16::from_be_bytes(tx.get(tx.len().checked_sub(2)?..)?.try_into().ok()?);
        StatusWord::try_from(sw).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use hex_literal::hex;

    #[test]
    fn test_initial_state() {
        let dispatcher = Dispatcher::new(MockPlatform::new());
        assert_eq!(dispatcher.session(), Session::Idle);
        assert_eq!(dispatcher.accumulator_state(), AccumulatorState::Empty);
        assert_eq!(dispatcher.last_status(), None);
        assert_eq!(dispatcher.stats(), &ServiceStats::default());
    }

    #[test]
    fn test_session_transitions() {
        let mut dispatcher = Dispatcher::new(MockPlatform::new());

        dispatcher.handle_packet(&hex!("8003010002 7b22"));
        assert_eq!(dispatcher.session(), Session::Receiving);
        assert_eq!(dispatcher.accumulated_len(), 2);

        dispatcher.handle_packet(&hex!("8004000000"));
        assert_eq!(dispatcher.last_status(), Some(StatusWord::BadState));
        assert_eq!(dispatcher.session(), Session::Receiving);

        dispatcher.handle_packet(&hex!("8003000001 7d"));
        assert_eq!(dispatcher.last_status(), Some(StatusWord::TxParsingFail));
        assert_eq!(dispatcher.session(), Session::Idle);
        assert_eq!(dispatcher.accumulator_state(), AccumulatorState::Empty);
        assert_eq!(dispatcher.stats().payloads_completed, 1);
    }

    #[test]
    fn test_abort_resets_transfer() {
        let mut dispatcher = Dispatcher::new(MockPlatform::new());
        dispatcher.handle_packet(&hex!("8003010002 7b22"));
        assert_eq!(dispatcher.session(), Session::Receiving);

        assert_eq!(dispatcher.handle_packet(&hex!("80FF000000")), &hex!("9000"));
        assert_eq!(dispatcher.session(), Session::Idle);
        assert_eq!(dispatcher.accumulator_state(), AccumulatorState::Empty);
        assert_eq!(dispatcher.accumulated_len(), 0);
        assert_eq!(dispatcher.stats().errors, 0);

        assert_eq!(dispatcher.handle_packet(&hex!("8001000000")), &hex!("010203 9000"));
    }

    #[test]
    fn test_error_reply_has_no_body() {
        let mut dispatcher = Dispatcher::new(MockPlatform::new());
        assert_eq!(dispatcher.handle_packet(&hex!("8004000001 00")), &hex!("6a87"));
        assert_eq!(dispatcher.last_status(), Some(StatusWord::WrongDataLength));
    }
}
