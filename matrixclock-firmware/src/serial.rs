//! Serial console transport
//!
//! Received bytes are pumped into a channel by an async task on core 0;
//! the clock loop on core 1 drains the channel without blocking. Writes
//! go straight out through the buffered UART.

use embassy_rp::uart::{BufferedUartRx, BufferedUartTx};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embedded_io::Write as _;
use embedded_io_async::Read as _;

use matrixclock_core::traits::SerialIo;

/// Bytes received from the serial console, waiting for the clock loop
static SERIAL_RX: Channel<CriticalSectionRawMutex, u8, 256> = Channel::new();

/// Pump UART receive data into [`SERIAL_RX`]; overflow drops bytes
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    let mut buf = [0u8; 32];
    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    let _ = SERIAL_RX.try_send(byte);
                }
            }
            Err(_) => {}
        }
    }
}

/// The clock loop's handle on the serial console
pub struct SerialConsole {
    tx: BufferedUartTx,
}

impl SerialConsole {
    pub fn new(tx: BufferedUartTx) -> Self {
        Self { tx }
    }
}

impl SerialIo for SerialConsole {
    fn read_byte(&mut self) -> Option<u8> {
        SERIAL_RX.try_receive().ok()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        let _ = self.tx.write_all(bytes);
    }
}
