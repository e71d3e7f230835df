//! Wifi link and the single-client telnet bridge
//!
//! The cyw43 radio and the network stack run as async tasks on core 0;
//! the clock loop on core 1 talks to them through channels and atomics.
//! One TCP socket serves the telnet console. While a client is connected
//! no listener exists, so a second connection attempt is refused by the
//! stack itself rather than queued.

use defmt::*;
use embassy_futures::block_on;
use embassy_futures::select::{select3, Either3};
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::gpio::Output;
use embassy_rp::peripherals::{DMA_CH0, PIO0};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;
use heapless::String;
use portable_atomic::{AtomicBool, Ordering};

use cyw43::JoinOptions;
use cyw43_pio::PioSpi;

use matrixclock_core::options::TEXT_MAX;
use matrixclock_core::traits::{NetError, NetLink};

pub const TELNET_PORT: u16 = 23;

/// Credentials for a pending join request
pub struct JoinRequest {
    ssid: String<TEXT_MAX>,
    passwd: String<TEXT_MAX>,
}

static JOIN_REQUEST: Channel<CriticalSectionRawMutex, JoinRequest, 1> = Channel::new();
static JOIN_RESULT: Channel<CriticalSectionRawMutex, bool, 1> = Channel::new();

static LINK_UP: AtomicBool = AtomicBool::new(false);
static CLIENT_CONNECTED: AtomicBool = AtomicBool::new(false);
static ACCEPT_PENDING: AtomicBool = AtomicBool::new(false);
static CLOSE_CLIENT: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Bytes from the telnet client to the clock loop
static NET_RX: Channel<CriticalSectionRawMutex, u8, 256> = Channel::new();
/// Bytes from the clock loop to the telnet client
static NET_TX: Channel<CriticalSectionRawMutex, u8, 512> = Channel::new();

#[embassy_executor::task]
pub async fn cyw43_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
pub async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

/// Serve join requests from the clock loop
#[embassy_executor::task]
pub async fn wifi_task(mut control: cyw43::Control<'static>, stack: Stack<'static>) {
    loop {
        let req = JOIN_REQUEST.receive().await;
        let joined = match control
            .join(&req.ssid, JoinOptions::new(req.passwd.as_bytes()))
            .await
        {
            Ok(()) => {
                stack.wait_config_up().await;
                info!("wifi: joined {}", req.ssid.as_str());
                true
            }
            Err(err) => {
                warn!("wifi: join failed, status {}", err.status);
                false
            }
        };
        LINK_UP.store(joined, Ordering::Relaxed);
        JOIN_RESULT.send(joined).await;
    }
}

/// Accept one telnet client at a time and shuttle bytes both ways
#[embassy_executor::task]
pub async fn telnet_task(stack: Stack<'static>) {
    let mut rx_buffer = [0u8; 1024];
    let mut tx_buffer = [0u8; 1024];
    let mut buf = [0u8; 64];

    loop {
        stack.wait_config_up().await;

        let mut socket = TcpSocket::new(stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(600)));

        if socket.accept(TELNET_PORT).await.is_err() {
            continue;
        }
        info!("telnet: client connected");
        CLOSE_CLIENT.reset();
        CLIENT_CONNECTED.store(true, Ordering::Relaxed);
        ACCEPT_PENDING.store(true, Ordering::Relaxed);

        loop {
            match select3(socket.read(&mut buf), NET_TX.receive(), CLOSE_CLIENT.wait()).await {
                Either3::First(Ok(0)) | Either3::First(Err(_)) => break,
                Either3::First(Ok(n)) => {
                    for &byte in &buf[..n] {
                        let _ = NET_RX.try_send(byte);
                    }
                }
                Either3::Second(byte) => {
                    if write_pending(&mut socket, byte).await.is_err() {
                        break;
                    }
                }
                Either3::Third(()) => break,
            }
        }

        info!("telnet: client disconnected");
        CLIENT_CONNECTED.store(false, Ordering::Relaxed);
        // Retire an accept the clock loop never consumed; the next accept
        // in this task sets the flag again, so a replacement client still
        // gets its session even when the turnover lands between two polls
        ACCEPT_PENDING.store(false, Ordering::Relaxed);
        socket.close();
        // Drain anything addressed to the departed client
        while NET_TX.try_receive().is_ok() {}
        while NET_RX.try_receive().is_ok() {}
    }
}

/// Coalesce queued output into one socket write
async fn write_pending(socket: &mut TcpSocket<'_>, first: u8) -> Result<(), ()> {
    let mut out = [0u8; 128];
    out[0] = first;
    let mut len = 1;
    while len < out.len() {
        match NET_TX.try_receive() {
            Ok(byte) => {
                out[len] = byte;
                len += 1;
            }
            Err(_) => break,
        }
    }
    match socket.write(&out[..len]).await {
        Ok(_) => Ok(()),
        Err(_) => Err(()),
    }
}

/// The clock loop's handle on the network
pub struct WifiLink;

impl NetLink for WifiLink {
    fn join(&mut self, ssid: &str, passwd: &str) -> Result<(), NetError> {
        let mut req = JoinRequest {
            ssid: String::new(),
            passwd: String::new(),
        };
        if req.ssid.push_str(ssid).is_err() || req.passwd.push_str(passwd).is_err() {
            return Err(NetError::JoinFailed);
        }
        while JOIN_RESULT.try_receive().is_ok() {}
        if JOIN_REQUEST.try_send(req).is_err() {
            return Err(NetError::JoinFailed);
        }
        // Blocks the clock loop for the duration; the caller resyncs after
        if block_on(JOIN_RESULT.receive()) {
            Ok(())
        } else {
            Err(NetError::JoinFailed)
        }
    }

    fn link_up(&self) -> bool {
        LINK_UP.load(Ordering::Relaxed)
    }

    fn poll_accept(&mut self) -> bool {
        ACCEPT_PENDING.swap(false, Ordering::Relaxed)
    }

    fn client_connected(&self) -> bool {
        CLIENT_CONNECTED.load(Ordering::Relaxed)
    }

    fn read_byte(&mut self) -> Option<u8> {
        NET_RX.try_receive().ok()
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            let _ = NET_TX.try_send(byte);
        }
    }

    fn close_client(&mut self) {
        CLOSE_CLIENT.signal(());
    }
}
