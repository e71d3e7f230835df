//! MatrixClock firmware for the Raspberry Pi Pico W
//!
//! Core 0 runs the async plumbing: wifi, the telnet bridge, serial
//! receive and the HUB75 panel rescan. Core 1 runs the clock loop,
//! which polls its collaborators through channels and atomics and never
//! waits on the radio.
//!
//! Startup is sequential: decide storage writability from the button,
//! probe the RTC chip, find the square-wave pin, bring up the radio,
//! then hand the assembled clock to core 1.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{Executor, Spawner};
use embassy_net::StackResources;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Input, Level, Output, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::multicore::{spawn_core1, Stack as CoreStack};
use embassy_rp::peripherals::{I2C1, PIO0, UART0};
use embassy_rp::pio::Pio;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::{Instant, Timer};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};

use matrixclock_core::clock::{ClockApp, StartupError, StepOutcome};
use matrixclock_display::MatrixFace;
use matrixclock_drivers::{find_square_wave, EdgeLatch, RtcAdapter, RtcChip};
use matrixclock_hal::i2c::EmbeddedHalBus;
use matrixclock_hal::Monotonic;

mod flash;
mod panel;
mod pins;
mod serial;
mod wifi;

use flash::FlashStorage;
use panel::{PanelHandle, PanelPins};
use pins::{FlexInput, HeaderPins};
use serial::SerialConsole;
use wifi::WifiLink;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

/// Radio firmware; fetch the blobs as described in cyw43-firmware/README.md
const CYW43_FW: &[u8] = include_bytes!("../cyw43-firmware/43439A0.bin");
const CYW43_CLM: &[u8] = include_bytes!("../cyw43-firmware/43439A0_clm.bin");

static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static CYW43_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<8>> = StaticCell::new();

static mut CORE1_STACK: CoreStack<16384> = CoreStack::new();
static EXECUTOR1: StaticCell<Executor> = StaticCell::new();

type RtcBus = EmbeddedHalBus<I2c<'static, I2C1, i2c::Blocking>>;

/// Millisecond uptime for the clock loop's bounded waits
struct Uptime;

impl Monotonic for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MatrixClock firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Holding the DOWN button through reset hands the flash drive to USB,
    // leaving the running program read-only. Give the level time to settle.
    let button = Input::new(p.PIN_17, Pull::Up);
    Timer::after_millis(250).await;
    let read_only = button.is_low();
    if read_only {
        info!("Button held - storage is read-only, drive belongs to USB");
    }

    let storage = FlashStorage::new(p.FLASH, p.DMA_CH1, read_only);

    // RTC chip on I2C1; all three supported chips answer at 0x68
    let i2c = I2c::new_blocking(p.I2C1, p.PIN_15, p.PIN_14, i2c::Config::default());
    let chip = match RtcChip::probe(EmbeddedHalBus(i2c)) {
        Ok(chip) => chip,
        Err(_) => halt("No RTC chip answered at address 0x68").await,
    };
    info!("RTC chip identified: {}", chip.kind().name());

    let mut rtc = RtcAdapter::new(chip);
    match rtc.lost_power() {
        Ok(true) => warn!("RTC lost power - stored time is suspect"),
        Ok(false) => {}
        Err(_) => halt("RTC unreadable").await,
    }
    match rtc.start() {
        Ok(true) => warn!("RTC oscillator was stopped - restarted it"),
        Ok(false) => {}
        Err(_) => halt("RTC square wave could not be enabled").await,
    }

    // The SQW wire can land on any header pin, so scan for the toggle
    let mut header = HeaderPins::new([
        FlexInput::new(Flex::new(p.PIN_26)),
        FlexInput::new(Flex::new(p.PIN_27)),
        FlexInput::new(Flex::new(p.PIN_28)),
        FlexInput::new(Flex::new(p.PIN_21)),
        FlexInput::new(Flex::new(p.PIN_22)),
    ]);
    let winner = match find_square_wave(&mut header, &Uptime) {
        Ok(id) => id,
        Err(_) => halt("No square wave found on A0-A4").await,
    };
    info!("Square wave detected on {}", winner.name());
    let edges = EdgeLatch::new(header.into_pin(winner));

    // Serial console on UART0
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let (uart_tx, uart_rx) = uart.into_buffered(Irqs, tx_buf, rx_buf).split();
    spawner.spawn(serial::serial_rx_task(uart_rx)).unwrap();

    // Pico W radio
    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );
    let state = CYW43_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, CYW43_FW).await;
    spawner.spawn(wifi::cyw43_task(runner)).unwrap();
    control.init(CYW43_CLM).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    // Fixed seed; it only randomizes local TCP ports
    let seed = 0x0cf3_97a1_5c81_c047;
    let (net_stack, net_runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(wifi::net_task(net_runner)).unwrap();
    spawner.spawn(wifi::wifi_task(control, net_stack)).unwrap();
    spawner.spawn(wifi::telnet_task(net_stack)).unwrap();

    // HUB75 panel lines
    let panel_pins = PanelPins {
        r1: Output::new(p.PIN_2, Level::Low),
        g1: Output::new(p.PIN_3, Level::Low),
        b1: Output::new(p.PIN_4, Level::Low),
        r2: Output::new(p.PIN_5, Level::Low),
        g2: Output::new(p.PIN_8, Level::Low),
        b2: Output::new(p.PIN_9, Level::Low),
        addr_a: Output::new(p.PIN_10, Level::Low),
        addr_b: Output::new(p.PIN_16, Level::Low),
        addr_c: Output::new(p.PIN_18, Level::Low),
        addr_d: Output::new(p.PIN_20, Level::Low),
        clk: Output::new(p.PIN_11, Level::Low),
        lat: Output::new(p.PIN_12, Level::Low),
        oe: Output::new(p.PIN_13, Level::High),
    };
    spawner.spawn(panel::panel_task(panel_pins)).unwrap();

    let face = MatrixFace::new(PanelHandle::new());
    let serial_console = SerialConsole::new(uart_tx);

    info!("Handing the clock loop to core 1");
    spawn_core1(
        p.CORE1,
        unsafe { &mut *core::ptr::addr_of_mut!(CORE1_STACK) },
        move || {
            let executor1 = EXECUTOR1.init(Executor::new());
            executor1.run(|spawner| {
                spawner
                    .spawn(clock_task(rtc, edges, face, storage, serial_console))
                    .unwrap()
            });
        },
    );

    // Core 0 is all spawned tasks from here on
    loop {
        Timer::after_secs(60).await;
        trace!("core 0 heartbeat");
    }
}

/// The cooperative clock loop, alone on core 1
#[embassy_executor::task]
async fn clock_task(
    rtc: RtcAdapter<RtcBus>,
    edges: EdgeLatch<FlexInput>,
    face: MatrixFace<PanelHandle>,
    storage: FlashStorage<'static>,
    serial: SerialConsole,
) -> ! {
    let mut app = match ClockApp::new(rtc, edges, face, storage, WifiLink, serial, Uptime) {
        Ok(app) => app,
        Err(StartupError::Rtc(_)) => fatal("RTC read failed while seeding the clock"),
        Err(StartupError::Storage(_)) => fatal("Saved options exist but cannot be read"),
    };

    loop {
        if app.step() == StepOutcome::Restart {
            info!("Restart requested");
            cortex_m::peripheral::SCB::sys_reset();
        }
        // Edges arrive twice a second; 5 ms keeps the console responsive
        // without starving the panel rescan of bus bandwidth
        Timer::after_millis(5).await;
    }
}

/// Startup cannot continue; stay alive so the fault is debuggable
async fn halt(msg: &str) -> ! {
    error!("{}", msg);
    loop {
        Timer::after_secs(1).await;
    }
}

fn fatal(msg: &str) -> ! {
    error!("{}", msg);
    cortex_m::peripheral::SCB::sys_reset()
}
