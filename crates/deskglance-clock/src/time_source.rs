//! Wall-clock abstraction so the ticker can run against simulated time.

use chrono::{Local, NaiveDateTime};

pub trait TimeSource: Send + Sync + 'static {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// The system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimeSource;

impl TimeSource for LocalTimeSource {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

impl<F> TimeSource for F
where
    F: Fn() -> NaiveDateTime + Send + Sync + 'static,
{
    fn now(&self) -> NaiveDateTime {
        self()
    }
}
