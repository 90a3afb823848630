//! One-second clock driving the digit display and the lunar annotation.
//!
//! [`ClockCore`] is the synchronous state machine; [`ClockTicker`] runs it
//! on a tokio interval and publishes every tick through a watch channel.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::digits::ClockDigits;
use crate::lunar::{LunarConverter, LunarInfo};
use crate::time_source::{LocalTimeSource, TimeSource};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Where the 24-hour flag comes from.
#[derive(Debug, Clone)]
pub enum HourFormat {
    /// Evaluated once at construction.
    Fixed(bool),
    /// Re-read on every tick.
    Watched(watch::Receiver<bool>),
}

impl HourFormat {
    pub fn is_24_hour(&self) -> bool {
        match self {
            Self::Fixed(value) => *value,
            Self::Watched(rx) => *rx.borrow(),
        }
    }
}

impl From<bool> for HourFormat {
    fn from(value: bool) -> Self {
        Self::Fixed(value)
    }
}

impl From<watch::Receiver<bool>> for HourFormat {
    fn from(rx: watch::Receiver<bool>) -> Self {
        Self::Watched(rx)
    }
}

/// What the clock face observes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    pub now: NaiveDateTime,
    pub is_24_hour: bool,
    pub digits: ClockDigits,
    pub lunar: LunarInfo,
    /// Civil date `lunar` was computed for.
    pub lunar_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub digits_changed: bool,
    pub lunar_recomputed: bool,
}

/// Tick-by-tick clock state; recomputes the lunar annotation only when the
/// local date differs from the one it was last computed for.
pub struct ClockCore {
    converter: Arc<dyn LunarConverter>,
    state: ClockState,
}

impl ClockCore {
    pub fn new(converter: Arc<dyn LunarConverter>, now: NaiveDateTime, is_24_hour: bool) -> Self {
        let lunar_date = now.date();
        let state = ClockState {
            now,
            is_24_hour,
            digits: ClockDigits::from_time(&now, is_24_hour),
            lunar: converter.convert(lunar_date),
            lunar_date,
        };
        Self { converter, state }
    }

    pub fn tick_at(&mut self, now: NaiveDateTime, is_24_hour: bool) -> TickOutcome {
        let digits = ClockDigits::from_time(&now, is_24_hour);
        let digits_changed = digits != self.state.digits;
        self.state.now = now;
        self.state.is_24_hour = is_24_hour;
        self.state.digits = digits;

        let date = now.date();
        let lunar_recomputed = date != self.state.lunar_date;
        if lunar_recomputed {
            self.state.lunar = self.converter.convert(date);
            self.state.lunar_date = date;
        }

        TickOutcome {
            digits_changed,
            lunar_recomputed,
        }
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }
}

struct Inner {
    core: ClockCore,
    active: bool,
}

struct Shared {
    inner: Mutex<Inner>,
    state: watch::Sender<ClockState>,
    time_source: Arc<dyn TimeSource>,
    hour_format: HourFormat,
}

impl Shared {
    /// Ticks only while active; the check and the publish share the lock so
    /// nothing is published once `stop()` has returned.
    fn tick(&self) {
        let mut inner = self.inner.lock();
        if !inner.active {
            return;
        }
        let now = self.time_source.now();
        let outcome = inner.core.tick_at(now, self.hour_format.is_24_hour());
        if outcome.lunar_recomputed {
            tracing::debug!("Date changed to {}, lunar: {}", now.date(), inner.core.state().lunar);
        }
        self.state.send_replace(inner.core.state().clone());
    }
}

struct Running {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Start/stop lifecycle around [`ClockCore`].
///
/// `start()` must be called from within a tokio runtime.
pub struct ClockTicker {
    shared: Arc<Shared>,
    running: Mutex<Option<Running>>,
}

impl ClockTicker {
    pub fn new(converter: impl LunarConverter, hour_format: impl Into<HourFormat>) -> Self {
        Self::with_time_source(converter, hour_format, LocalTimeSource)
    }

    pub fn with_time_source(
        converter: impl LunarConverter,
        hour_format: impl Into<HourFormat>,
        time_source: impl TimeSource,
    ) -> Self {
        let hour_format = hour_format.into();
        let core = ClockCore::new(Arc::new(converter), time_source.now(), hour_format.is_24_hour());
        let (state, _) = watch::channel(core.state().clone());
        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    core,
                    active: false,
                }),
                state,
                time_source: Arc::new(time_source),
                hour_format,
            }),
            running: Mutex::new(None),
        }
    }

    /// Tick once immediately, then every [`TICK_PERIOD`]. No-op if running.
    pub fn start(&self) {
        let mut running = self.running.lock();
        if running.is_some() {
            return;
        }

        self.shared.inner.lock().active = true;
        self.shared.tick();

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => shared.tick(),
                }
            }
            tracing::trace!("Clock task exited");
        });

        *running = Some(Running { cancel, handle });
        tracing::debug!("Clock started");
    }

    /// Stop ticking. Once this returns no further state is published.
    pub fn stop(&self) {
        let Some(running) = self.running.lock().take() else {
            return;
        };
        self.shared.inner.lock().active = false;
        running.cancel.cancel();
        running.handle.abort();
        tracing::debug!("Clock stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running.lock().is_some()
    }

    pub fn subscribe(&self) -> watch::Receiver<ClockState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> ClockState {
        self.shared.state.borrow().clone()
    }
}

impl Drop for ClockTicker {
    fn drop(&mut self) {
        self.stop();
    }
}
