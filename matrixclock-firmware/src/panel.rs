//! HUB75 panel driver
//!
//! The refresh task on core 0 continuously rescans a shared frame; the
//! clock loop on core 1 renders into a private back buffer and publishes
//! it on flush. Brightness comes from binary-coded modulation over bits
//! 6..3 of each channel, which covers the panel palette (max value 90).

use core::cell::RefCell;

use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use matrixclock_display::backend::DisplayError;
use matrixclock_display::color::BLACK;
use matrixclock_display::{MatrixBackend, Rgb, PANEL_HEIGHT, PANEL_WIDTH};

const WIDTH: usize = PANEL_WIDTH as usize;
const HEIGHT: usize = PANEL_HEIGHT as usize;
const ROW_PAIRS: usize = HEIGHT / 2;

/// Most and least significant modulation bits
const BIT_HIGH: u8 = 6;
const BIT_LOW: u8 = 3;

/// OE on-time in CPU cycles for the lowest-weight plane
const BASE_ON_CYCLES: u32 = 120;

type Frame = [[Rgb; WIDTH]; HEIGHT];

/// The published frame the refresh task scans out
static FRAME: Mutex<CriticalSectionRawMutex, RefCell<Frame>> =
    Mutex::new(RefCell::new([[BLACK; WIDTH]; HEIGHT]));

/// The 13 panel control lines
pub struct PanelPins {
    pub r1: Output<'static>,
    pub g1: Output<'static>,
    pub b1: Output<'static>,
    pub r2: Output<'static>,
    pub g2: Output<'static>,
    pub b2: Output<'static>,
    pub addr_a: Output<'static>,
    pub addr_b: Output<'static>,
    pub addr_c: Output<'static>,
    pub addr_d: Output<'static>,
    pub clk: Output<'static>,
    pub lat: Output<'static>,
    pub oe: Output<'static>,
}

/// Continuous panel rescan
#[embassy_executor::task]
pub async fn panel_task(mut pins: PanelPins) -> ! {
    pins.oe.set_high();
    pins.lat.set_low();
    pins.clk.set_low();

    loop {
        for row in 0..ROW_PAIRS {
            let (top, bottom) = copy_row_pair(row);
            for bit in BIT_LOW..=BIT_HIGH {
                shift_plane(&mut pins, &top, &bottom, bit);
                pins.oe.set_high();
                pins.lat.set_high();
                pins.lat.set_low();
                set_row_address(&mut pins, row as u8);
                pins.oe.set_low();
                cortex_m::asm::delay(BASE_ON_CYCLES << (bit - BIT_LOW));
            }
            pins.oe.set_high();
            // Let the network and console tasks breathe between rows
            yield_now().await;
        }
    }
}

fn copy_row_pair(row: usize) -> ([Rgb; WIDTH], [Rgb; WIDTH]) {
    FRAME.lock(|frame| {
        let frame = frame.borrow();
        (frame[row], frame[row + ROW_PAIRS])
    })
}

fn shift_plane(pins: &mut PanelPins, top: &[Rgb; WIDTH], bottom: &[Rgb; WIDTH], bit: u8) {
    for x in 0..WIDTH {
        pins.r1.set_level(((top[x].r >> bit) & 1 == 1).into());
        pins.g1.set_level(((top[x].g >> bit) & 1 == 1).into());
        pins.b1.set_level(((top[x].b >> bit) & 1 == 1).into());
        pins.r2.set_level(((bottom[x].r >> bit) & 1 == 1).into());
        pins.g2.set_level(((bottom[x].g >> bit) & 1 == 1).into());
        pins.b2.set_level(((bottom[x].b >> bit) & 1 == 1).into());
        pins.clk.set_high();
        pins.clk.set_low();
    }
}

fn set_row_address(pins: &mut PanelPins, row: u8) {
    pins.addr_a.set_level((row & 0x01 != 0).into());
    pins.addr_b.set_level((row & 0x02 != 0).into());
    pins.addr_c.set_level((row & 0x04 != 0).into());
    pins.addr_d.set_level((row & 0x08 != 0).into());
}

/// The clock loop's back-buffered handle on the panel
pub struct PanelHandle {
    back: Frame,
}

impl PanelHandle {
    pub fn new() -> Self {
        Self {
            back: [[BLACK; WIDTH]; HEIGHT],
        }
    }
}

impl MatrixBackend for PanelHandle {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.back = [[BLACK; WIDTH]; HEIGHT];
        Ok(())
    }

    fn set_pixel(&mut self, x: u8, y: u8, color: Rgb) -> Result<(), DisplayError> {
        if x >= PANEL_WIDTH || y >= PANEL_HEIGHT {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.back[y as usize][x as usize] = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        FRAME.lock(|frame| {
            *frame.borrow_mut() = self.back;
        });
        Ok(())
    }
}
