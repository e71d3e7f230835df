//! Network collaborator: wifi join plus the single-client telnet transport.

/// Errors from network operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetError {
    /// Could not associate with the access point
    JoinFailed,
    /// Operation needs a joined network
    NotJoined,
}

/// The network link and its one remote console client
///
/// Implementations listen on the telnet port once joined and hold at most
/// one client; while a client is connected, further connection attempts
/// must be refused at the transport (not queued), which is what keeps the
/// remote console exclusive.
pub trait NetLink {
    /// Associate with an access point; blocks for the duration
    fn join(&mut self, ssid: &str, passwd: &str) -> Result<(), NetError>;

    /// True once joined with a working link
    fn link_up(&self) -> bool;

    /// True once per newly accepted client; non-blocking. The transport
    /// holds at most one client, so a true reported while the caller still
    /// has a session open means the client changed between polls.
    fn poll_accept(&mut self) -> bool;

    /// True while a client is connected
    fn client_connected(&self) -> bool;

    /// Next byte from the client, if any; non-blocking
    fn read_byte(&mut self) -> Option<u8>;

    /// Send bytes to the client; best effort, errors drop the client
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Drop the client connection
    fn close_client(&mut self);
}
