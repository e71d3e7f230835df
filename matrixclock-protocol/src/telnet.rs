//! Telnet option negotiation (RFC 854).
//!
//! The clock's telnet console is deliberately dumb: it refuses every option
//! a client proposes and tells the client up front that it will not echo and
//! will not suppress go-ahead, which leaves the client in line mode doing its
//! own local echo. Subnegotiation blocks are consumed and discarded.

/// Interpret As Command escape byte
pub const IAC: u8 = 255;
/// Refuse an offer to enable an option on the peer
pub const DONT: u8 = 254;
/// Ask the peer to enable an option
pub const DO: u8 = 253;
/// Refuse to enable an option locally
pub const WONT: u8 = 252;
/// Offer to enable an option locally
pub const WILL: u8 = 251;
/// Begin subnegotiation
pub const SB: u8 = 250;
/// End subnegotiation
pub const SE: u8 = 240;

/// ECHO option (RFC 857)
pub const OPT_ECHO: u8 = 1;
/// SUPPRESS-GO-AHEAD option (RFC 858)
pub const OPT_SUPPRESS_GA: u8 = 3;

/// Sent to every client immediately after accept: we will not echo and we
/// will not suppress go-ahead, which puts well-behaved clients in line mode.
pub const GREETING: [u8; 6] = [IAC, WONT, OPT_ECHO, IAC, WONT, OPT_SUPPRESS_GA];

/// Result of feeding one byte to the codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelnetStep {
    /// Byte was consumed by negotiation, nothing to do
    Pending,
    /// A plain data byte for the layer above
    Data(u8),
    /// A refusal to send back to the client
    Reply([u8; 3]),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Plain text
    Text,
    /// Got IAC, waiting for the command verb
    Command,
    /// Got DO/DONT/WILL/WONT, waiting for the option byte
    Option(u8),
    /// Inside a subnegotiation block
    Subneg,
    /// Got IAC inside a subnegotiation block
    SubnegCommand,
}

/// State machine stripping telnet negotiation out of an input stream
#[derive(Debug, Clone)]
pub struct TelnetCodec {
    state: DecodeState,
}

impl Default for TelnetCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl TelnetCodec {
    /// Create a codec in the plain-text state
    pub fn new() -> Self {
        Self {
            state: DecodeState::Text,
        }
    }

    /// Reset to the plain-text state
    pub fn reset(&mut self) {
        self.state = DecodeState::Text;
    }

    /// Feed a single byte from the socket
    ///
    /// Returns `Data` for bytes that belong to the application stream,
    /// `Reply` when the client proposed an option we must refuse, and
    /// `Pending` while consuming negotiation bytes.
    pub fn feed(&mut self, byte: u8) -> TelnetStep {
        match self.state {
            DecodeState::Text => {
                if byte == IAC {
                    self.state = DecodeState::Command;
                    TelnetStep::Pending
                } else {
                    TelnetStep::Data(byte)
                }
            }
            DecodeState::Command => match byte {
                // Escaped 0xFF data byte
                IAC => {
                    self.state = DecodeState::Text;
                    TelnetStep::Data(IAC)
                }
                DO | DONT | WILL | WONT => {
                    self.state = DecodeState::Option(byte);
                    TelnetStep::Pending
                }
                SB => {
                    self.state = DecodeState::Subneg;
                    TelnetStep::Pending
                }
                // NOP, AYT, interrupt and friends carry no option byte
                _ => {
                    self.state = DecodeState::Text;
                    TelnetStep::Pending
                }
            },
            DecodeState::Option(verb) => {
                self.state = DecodeState::Text;
                match verb {
                    // Client asks us to enable an option: refuse
                    DO => TelnetStep::Reply([IAC, WONT, byte]),
                    // Client offers to enable an option: refuse
                    WILL => TelnetStep::Reply([IAC, DONT, byte]),
                    // DONT/WONT acknowledge our refusals, no answer needed
                    _ => TelnetStep::Pending,
                }
            }
            DecodeState::Subneg => {
                if byte == IAC {
                    self.state = DecodeState::SubnegCommand;
                }
                TelnetStep::Pending
            }
            DecodeState::SubnegCommand => {
                self.state = if byte == SE {
                    DecodeState::Text
                } else {
                    // Anything else (including escaped IAC) stays inside
                    // the block until IAC SE arrives
                    DecodeState::Subneg
                };
                TelnetStep::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_text_passes_through() {
        let mut codec = TelnetCodec::new();
        for &b in b"24h on\r\n" {
            assert_eq!(codec.feed(b), TelnetStep::Data(b));
        }
    }

    #[test]
    fn test_do_is_refused_with_wont() {
        let mut codec = TelnetCodec::new();
        assert_eq!(codec.feed(IAC), TelnetStep::Pending);
        assert_eq!(codec.feed(DO), TelnetStep::Pending);
        assert_eq!(
            codec.feed(OPT_ECHO),
            TelnetStep::Reply([IAC, WONT, OPT_ECHO])
        );
    }

    #[test]
    fn test_will_is_refused_with_dont() {
        let mut codec = TelnetCodec::new();
        codec.feed(IAC);
        codec.feed(WILL);
        assert_eq!(
            codec.feed(OPT_SUPPRESS_GA),
            TelnetStep::Reply([IAC, DONT, OPT_SUPPRESS_GA])
        );
    }

    #[test]
    fn test_wont_and_dont_need_no_answer() {
        let mut codec = TelnetCodec::new();
        codec.feed(IAC);
        codec.feed(WONT);
        assert_eq!(codec.feed(OPT_ECHO), TelnetStep::Pending);
        codec.feed(IAC);
        codec.feed(DONT);
        assert_eq!(codec.feed(OPT_ECHO), TelnetStep::Pending);
        // Back to text
        assert_eq!(codec.feed(b'x'), TelnetStep::Data(b'x'));
    }

    #[test]
    fn test_escaped_iac_is_data() {
        let mut codec = TelnetCodec::new();
        codec.feed(IAC);
        assert_eq!(codec.feed(IAC), TelnetStep::Data(IAC));
    }

    #[test]
    fn test_subnegotiation_is_swallowed() {
        let mut codec = TelnetCodec::new();
        for &b in &[IAC, SB, 31, 0, 80, 0, 24, IAC, SE] {
            assert_eq!(codec.feed(b), TelnetStep::Pending);
        }
        assert_eq!(codec.feed(b'a'), TelnetStep::Data(b'a'));
    }

    #[test]
    fn test_negotiation_interleaved_with_text() {
        let mut codec = TelnetCodec::new();
        assert_eq!(codec.feed(b'h'), TelnetStep::Data(b'h'));
        codec.feed(IAC);
        codec.feed(DO);
        assert_eq!(
            codec.feed(OPT_SUPPRESS_GA),
            TelnetStep::Reply([IAC, WONT, OPT_SUPPRESS_GA])
        );
        assert_eq!(codec.feed(b'i'), TelnetStep::Data(b'i'));
    }

    proptest! {
        #[test]
        fn prop_non_iac_bytes_are_data(byte in 0u8..=254) {
            let mut codec = TelnetCodec::new();
            prop_assert_eq!(codec.feed(byte), TelnetStep::Data(byte));
        }
    }
}
