//! The clock/display loop.
//!
//! One cooperative cycle services, in order: the network session state,
//! pending console input, the latched square-wave edge, and the display.
//! Nothing blocks; a cycle that did stall (save, restore, wifi join)
//! resynchronizes the second counter from the chip afterwards.

use core::fmt::Write as _;

use heapless::String;
use matrixclock_hal::{DocumentStorage, Monotonic, StorageError};

use crate::command::{self, Query, RtcRequest, SideEffect};
use crate::console::{ConsoleMux, Origin, SessionEvent};
use crate::datetime::DateTime;
use crate::logger::{Logger, LOG_LINE_MAX};
use crate::options::{self, ColorChoice, Registry, Rotation, DOC_MAX};
use crate::traits::{ClockFace, Edge, EdgeSource, NetLink, SerialIo, TimeSource};
use crate::VERSION;

/// A cycle longer than this resyncs the seconds counter from the chip
const STALL_MS: u64 = 300;

/// Render-affecting option values, captured per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderSettings {
    pub h24: bool,
    pub blink: bool,
    pub center: bool,
    pub dim: bool,
    pub ampm: bool,
    pub color: ColorChoice,
    pub night: u8,
    pub day: u8,
    pub rotation: Rotation,
}

impl RenderSettings {
    pub fn from_registry(registry: &Registry) -> Self {
        Self {
            h24: registry.flag("24h"),
            blink: registry.flag("blink"),
            center: registry.flag("center"),
            dim: registry.flag("dim"),
            ampm: registry.flag("ampm"),
            color: registry.color(),
            night: registry.hour("night"),
            day: registry.hour("day"),
            rotation: registry.rotation(),
        }
    }
}

/// Everything the display face needs to paint one frame
///
/// Equality is what drives redraws: a frame identical to the last rendered
/// one is not repainted. Seconds are deliberately absent; the display shows
/// hours and minutes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockFrame {
    /// Hour of day, 0-23; 12-hour conversion happens in the face
    pub hour: u8,
    pub minute: u8,
    pub colon_visible: bool,
    pub settings: RenderSettings,
}

/// Result of one loop cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepOutcome {
    Continue,
    /// `restart` was issued; the caller reinitializes everything
    Restart,
}

/// Fatal startup conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupError<E> {
    /// The RTC could not be read to seed the time
    Rtc(E),
    /// The options document exists but cannot be read
    Storage(StorageError),
}

/// The assembled clock application
pub struct ClockApp<R, E, F, S, N, IO, M> {
    registry: Registry,
    mux: ConsoleMux,
    logger: Logger,
    rtc: R,
    edges: E,
    face: F,
    storage: S,
    net: N,
    serial: IO,
    clock: M,
    local_secs: u32,
    colon_visible: bool,
    last_frame: Option<ClockFrame>,
    start_ms: u64,
}

impl<R, E, F, S, N, IO, M> ClockApp<R, E, F, S, N, IO, M>
where
    R: TimeSource,
    E: EdgeSource,
    F: ClockFace,
    S: DocumentStorage,
    N: NetLink,
    IO: SerialIo,
    M: Monotonic,
{
    /// Bring the clock up: report the version, overlay the saved options,
    /// seed the time from the chip, and auto-join the network if configured
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        rtc: R,
        edges: E,
        face: F,
        storage: S,
        net: N,
        serial: IO,
        clock: M,
    ) -> Result<Self, StartupError<R::Error>> {
        let start_ms = clock.now_ms();
        let mut app = Self {
            registry: Registry::new(),
            mux: ConsoleMux::new(),
            logger: Logger::new(),
            rtc,
            edges,
            face,
            storage,
            net,
            serial,
            clock,
            local_secs: 0,
            colon_visible: true,
            last_frame: None,
            start_ms,
        };

        app.log_untimed_fmt(format_args!("MatrixClock version {}", VERSION));

        match app.load_document(command::DEFAULT_DOCUMENT) {
            Ok(stats) => app.log_fmt(format_args!(
                "Options restored ({} applied, {} skipped)",
                stats.applied, stats.skipped
            )),
            Err(StorageError::NotFound) => app.log("No saved options - using defaults"),
            Err(err) => return Err(StartupError::Storage(err)),
        }

        let dt = app
            .rtc
            .now_at_second_boundary()
            .map_err(StartupError::Rtc)?;
        app.local_secs = dt.to_secs();
        app.log("Clock started");

        if app.registry.flag("autojoin") && !app.registry.text("ssid").is_empty() {
            app.join_stored();
        }

        Ok(app)
    }

    /// The current option values
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one cooperative cycle
    pub fn step(&mut self) -> StepOutcome {
        let t0 = self.clock.now_ms();

        match self.mux.poll_session(&mut self.net) {
            Some(SessionEvent::Connected) => self.log("Telnet client connected"),
            Some(SessionEvent::Disconnected) => self.log("Telnet client disconnected"),
            None => {}
        }

        if let Some((origin, line)) = self.mux.poll_line(&mut self.serial, &mut self.net) {
            if self.handle_line(origin, &line) == StepOutcome::Restart {
                return StepOutcome::Restart;
            }
        }

        match self.edges.take_edge() {
            Some(Edge::Rising) => {
                self.local_secs = self.local_secs.wrapping_add(1);
                self.colon_visible = false;
            }
            Some(Edge::Falling) => {
                self.colon_visible = true;
            }
            None => {}
        }

        self.render_if_changed();

        if self.clock.now_ms().saturating_sub(t0) > STALL_MS {
            if let Ok(dt) = self.rtc.now_at_second_boundary() {
                self.local_secs = dt.to_secs();
                self.log("Long cycle - time resynchronized");
            }
        }

        StepOutcome::Continue
    }

    fn current_frame(&self) -> ClockFrame {
        let settings = RenderSettings::from_registry(&self.registry);
        let now = DateTime::from_secs(self.local_secs);
        ClockFrame {
            hour: now.hour,
            minute: now.minute,
            // With blinking off the colon is solid
            colon_visible: !settings.blink || self.colon_visible,
            settings,
        }
    }

    fn render_if_changed(&mut self) {
        let frame = self.current_frame();
        if self.last_frame == Some(frame) {
            return;
        }
        match self.face.render(&frame) {
            Ok(()) => self.last_frame = Some(frame),
            Err(_) => self.log("Display update failed"),
        }
    }

    fn handle_line(&mut self, origin: Origin, line: &str) -> StepOutcome {
        let local = DateTime::from_secs(self.local_secs);
        let query = Query {
            local,
            chip: self.rtc.now().unwrap_or(local),
            uptime_secs: (self.clock.now_ms().saturating_sub(self.start_ms) / 1000) as u32,
        };

        let mut out: String<1024> = String::new();
        let effect =
            command::run(&mut self.registry, &query, line, &mut out).unwrap_or(None);
        self.mux
            .respond(origin, &mut self.serial, &mut self.net, &out);

        match effect {
            Some(effect) => self.execute(origin, effect),
            None => StepOutcome::Continue,
        }
    }

    fn execute(&mut self, origin: Origin, effect: SideEffect) -> StepOutcome {
        match effect {
            SideEffect::Save(name) => {
                if self.storage.read_only() {
                    self.log("Options not saved - filesystem is read-only");
                } else {
                    let doc = options::to_document(&self.registry);
                    match self.storage.save(&name, doc.as_bytes()) {
                        Ok(()) => {
                            self.log_fmt(format_args!("Options saved to {}", name))
                        }
                        Err(_) => {
                            self.log_fmt(format_args!("Failed to save options to {}", name))
                        }
                    }
                }
            }
            SideEffect::Restore(name) => match self.load_document(&name) {
                Ok(stats) => self.log_fmt(format_args!(
                    "Options restored from {} ({} applied, {} skipped)",
                    name, stats.applied, stats.skipped
                )),
                Err(StorageError::NotFound) => {
                    self.log_fmt(format_args!("No options document {}", name))
                }
                Err(_) => {
                    self.log_fmt(format_args!("Failed to restore options from {}", name))
                }
            },
            SideEffect::Join { ssid, passwd } => {
                self.log_fmt(format_args!("Joining {}", ssid));
                match self.net.join(&ssid, &passwd) {
                    Ok(()) => self.log_fmt(format_args!("Joined {}", ssid)),
                    Err(_) => self.log_fmt(format_args!("Failed to join {}", ssid)),
                }
            }
            SideEffect::Rtc(request) => {
                let result = match request {
                    RtcRequest::Set(dt) => self.rtc.set(&dt).map(|_| dt),
                    RtcRequest::Adjust(delta) => self.rtc.adjust(delta),
                    RtcRequest::Nearest => self.rtc.round_to_nearest_minute(),
                    RtcRequest::Sync => self.rtc.sync_to_next_minute(),
                };
                let mut out: String<80> = String::new();
                match result {
                    Ok(dt) => {
                        self.local_secs = dt.to_secs();
                        let _ =
                            writeln!(out, "{:<9} is {} {}", "rtc", dt, dt.weekday());
                    }
                    Err(_) => {
                        let _ = writeln!(out, "RTC update failed");
                    }
                }
                self.mux
                    .respond(origin, &mut self.serial, &mut self.net, &out);
            }
            SideEffect::Restart => {
                self.log("Restarting clock");
                let _ = self.rtc.disable_square_wave();
                self.mux.close_network(&mut self.net);
                return StepOutcome::Restart;
            }
        }
        StepOutcome::Continue
    }

    fn load_document(&mut self, name: &str) -> Result<options::LoadStats, StorageError> {
        let mut buf = [0u8; DOC_MAX];
        let len = self.storage.load(name, &mut buf)?;
        let text = core::str::from_utf8(&buf[..len]).map_err(|_| StorageError::Corrupted)?;
        Ok(options::apply_document(&mut self.registry, text))
    }

    fn join_stored(&mut self) {
        let mut ssid: String<{ options::TEXT_MAX }> = String::new();
        let mut passwd: String<{ options::TEXT_MAX }> = String::new();
        let _ = ssid.push_str(self.registry.text("ssid"));
        let _ = passwd.push_str(self.registry.text("passwd"));
        self.log_fmt(format_args!("Joining {}", ssid));
        match self.net.join(&ssid, &passwd) {
            Ok(()) => self.log_fmt(format_args!("Joined {}", ssid)),
            Err(_) => self.log_fmt(format_args!("Failed to join {}", ssid)),
        }
    }

    /// Timestamped log line to every open console and the log document
    fn log(&mut self, text: &str) {
        self.log_fmt(format_args!("{}", text));
    }

    fn log_fmt(&mut self, args: core::fmt::Arguments<'_>) {
        let ts = DateTime::from_secs(self.local_secs);
        self.emit_log(Some(ts), args);
    }

    /// Log line without a timestamp (before the clock is seeded)
    fn log_untimed_fmt(&mut self, args: core::fmt::Arguments<'_>) {
        self.emit_log(None, args);
    }

    fn emit_log(&mut self, ts: Option<DateTime>, args: core::fmt::Arguments<'_>) {
        let mut text: String<LOG_LINE_MAX> = String::new();
        let _ = text.write_fmt(args);
        let line = Logger::format_line(ts.as_ref(), &text);
        self.mux
            .broadcast(&mut self.serial, &mut self.net, &line);
        if let Some(notice) =
            self.logger
                .append(&mut self.registry, &mut self.storage, &line)
        {
            let line = Logger::format_line(ts.as_ref(), notice);
            self.mux
                .broadcast(&mut self.serial, &mut self.net, &line);
        }
    }
}
