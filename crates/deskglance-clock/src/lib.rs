//! Desk clock core for DeskGlance
//!
//! Splits wall-clock time into six display digits (12/24-hour aware) once a
//! second and keeps a lunar-calendar annotation that is recomputed only when
//! the local date changes.

pub mod digits;
pub mod lunar;
pub mod ticker;
pub mod time_source;

pub use digits::{display_hour, ClockDigits};
pub use lunar::{LunarConverter, LunarInfo, SexagenaryConverter};
pub use ticker::{ClockCore, ClockState, ClockTicker, HourFormat, TickOutcome, TICK_PERIOD};
pub use time_source::{LocalTimeSource, TimeSource};
