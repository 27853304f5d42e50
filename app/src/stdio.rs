//! Line-oriented transport for driving the signer from a terminal or a test harness.
//!
//! Each input line is one command in hex. The line `disconnect` simulates the host going away.
//! Each response is written back as one hex line. Lines that are empty or start with `#` are
//! ignored.

use std::io::{BufRead, Write};

use log::{error, warn};

use crate::io::{Event, Transport};
use common::constants::IO_BUFFER_LEN;

pub struct StdioTransport<R, W> {
    input: R,
    output: W,
    line: String,
}

impl<R: BufRead, W: Write> StdioTransport<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            line: String::new(),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Transport for StdioTransport<R, W> {
    fn next_event(&mut self, rx: &mut [u8; IO_BUFFER_LEN]) -> Option<Event> {
        loop {
            self.line.clear();
            match self.input.read_line(&mut self.line) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => {
                    error!("stdio: read failed: {}", e);
                    return None;
                }
            }

            let line = self.line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if line.eq_ignore_ascii_case("disconnect") {
                return Some(Event::Disconnect);
            }

            let packet = match hex::decode(line) {
                Ok(packet) => packet,
                Err(e) => {
                    warn!("stdio: skipping line that is not hex: {}", e);
                    continue;
                }
            };
            // An oversized packet is reported as an empty command, answered as malformed.
            let len = packet.len();
            if let Some(dst) = rx.get_mut(..len) {
                dst.copy_from_slice(&packet);
                return Some(Event::Command(len));
            }
            warn!("stdio: packet of {} bytes does not fit the buffer", len);
            return Some(Event::Command(0));
        }
    }

    fn send(&mut self, response: &[u8]) {
        if let Err(e) = writeln!(self.output, "{}", hex::encode(response)) {
            error!("stdio: write failed: {}", e);
        }
        if let Err(e) = self.output.flush() {
            error!("stdio: flush failed: {}", e);
        }
    }
}
