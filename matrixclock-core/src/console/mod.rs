//! Console arbitration.
//!
//! Two line-oriented command channels feed the interpreter: the local
//! serial console, which always exists, and at most one telnet client.
//! Each loop cycle polls both without blocking and yields at most one
//! completed line; responses go back to the originating channel only,
//! while log output is broadcast to both.
//!
//! Exclusivity of the remote console is enforced at the transport: the
//! [`NetLink`] implementation never accepts a second client while one is
//! connected. The mux polls for accepts every cycle; an accept that shows
//! up while a session is open can only mean the client turned over between
//! polls, so the session restarts for the new client.

use heapless::String;

use crate::traits::{NetLink, SerialIo};
use matrixclock_protocol::line::{LineBuffer, LineEvent, MAX_LINE_LEN};
use matrixclock_protocol::telnet::{TelnetCodec, TelnetStep, GREETING};

/// Which console a line arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Origin {
    Serial,
    Network,
}

/// Session change noticed during a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    Connected,
    Disconnected,
}

/// The console multiplexer
#[derive(Debug, Default)]
pub struct ConsoleMux {
    serial_line: LineBuffer,
    net_line: LineBuffer,
    telnet: TelnetCodec,
    net_open: bool,
}

impl ConsoleMux {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a telnet client session is open
    pub fn network_open(&self) -> bool {
        self.net_open
    }

    /// Service the network session state: accept a waiting client, notice
    /// a disconnect, or restart the session when the client turned over
    pub fn poll_session<N: NetLink>(&mut self, net: &mut N) -> Option<SessionEvent> {
        if self.net_open && !net.client_connected() {
            self.reset_network();
            return Some(SessionEvent::Disconnected);
        }
        if net.poll_accept() {
            // While a session is open this means the old client dropped
            // and a new one was accepted between polls; start over
            self.net_open = true;
            self.telnet.reset();
            self.net_line.reset();
            net.write_bytes(&GREETING);
            return Some(SessionEvent::Connected);
        }
        None
    }

    /// Drain available input from both consoles, returning at most one
    /// completed line; the serial console is serviced first
    pub fn poll_line<S: SerialIo, N: NetLink>(
        &mut self,
        serial: &mut S,
        net: &mut N,
    ) -> Option<(Origin, String<MAX_LINE_LEN>)> {
        while let Some(byte) = serial.read_byte() {
            match self.serial_line.feed(byte) {
                LineEvent::Echo(b) => serial.write_bytes(&[b]),
                LineEvent::Rubout => serial.write_bytes(b"\x08 \x08"),
                LineEvent::Complete => {
                    serial.write_bytes(b"\r\n");
                    return Some((Origin::Serial, self.serial_line.take()));
                }
                LineEvent::Pending => {}
            }
        }

        if self.net_open {
            while let Some(byte) = net.read_byte() {
                match self.telnet.feed(byte) {
                    TelnetStep::Reply(reply) => net.write_bytes(&reply),
                    TelnetStep::Data(data) => {
                        // The client is in line mode and echoes locally
                        if self.net_line.feed(data) == LineEvent::Complete {
                            return Some((Origin::Network, self.net_line.take()));
                        }
                    }
                    TelnetStep::Pending => {}
                }
            }
        }

        None
    }

    /// Write response text back to one console, normalizing newlines
    pub fn respond<S: SerialIo, N: NetLink>(
        &mut self,
        origin: Origin,
        serial: &mut S,
        net: &mut N,
        text: &str,
    ) {
        match origin {
            Origin::Serial => send_crlf(text, |b| serial.write_bytes(b)),
            Origin::Network => {
                if self.net_open {
                    send_crlf(text, |b| net.write_bytes(b));
                }
            }
        }
    }

    /// Write a line to every open console (log output)
    pub fn broadcast<S: SerialIo, N: NetLink>(&mut self, serial: &mut S, net: &mut N, text: &str) {
        send_crlf(text, |b| serial.write_bytes(b));
        if self.net_open {
            send_crlf(text, |b| net.write_bytes(b));
        }
    }

    /// Drop the telnet session (restart, shutdown)
    pub fn close_network<N: NetLink>(&mut self, net: &mut N) {
        if self.net_open {
            net.close_client();
            self.reset_network();
        }
    }

    fn reset_network(&mut self) {
        self.net_open = false;
        self.telnet.reset();
        self.net_line.reset();
    }
}

/// Emit text with every `\n` expanded to `\r\n`
fn send_crlf<F: FnMut(&[u8])>(text: &str, mut write: F) {
    let mut rest = text;
    while let Some(idx) = rest.find('\n') {
        if idx > 0 {
            write(rest[..idx].as_bytes());
        }
        write(b"\r\n");
        rest = &rest[idx + 1..];
    }
    if !rest.is_empty() {
        write(rest.as_bytes());
    }
}
