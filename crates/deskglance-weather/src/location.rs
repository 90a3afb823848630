//! Device geolocation capability.
//!
//! Platforms report positions through success/error callbacks. The
//! [`current_position`] bridge turns one request into a single awaited
//! result: whichever callback fires first wins and the other becomes a
//! no-op.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

use crate::error::LocationError;

/// A device-reported position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: Option<f64>,
}

/// Request options handed to the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    /// Upper bound the platform waits before reporting `Timeout`.
    pub timeout: Duration,
    pub enable_high_accuracy: bool,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            enable_high_accuracy: false,
        }
    }
}

pub type PositionCallback = Box<dyn FnOnce(Position) + Send>;
pub type PositionErrorCallback = Box<dyn FnOnce(LocationError) + Send>;

/// Callback-style position query, as platforms expose it.
///
/// Implementations must honour `options.timeout` themselves and call at
/// most one of the callbacks. Dropping both without calling either is
/// reported as [`LocationError::Unavailable`].
pub trait Geolocator: Send + Sync {
    fn get_current_position(
        &self,
        options: PositionOptions,
        on_success: PositionCallback,
        on_error: PositionErrorCallback,
    );
}

/// Issue one position request and wait for its outcome.
pub async fn current_position<G>(
    geolocator: &G,
    options: PositionOptions,
) -> Result<Position, LocationError>
where
    G: Geolocator + ?Sized,
{
    let (tx, rx) = oneshot::channel::<Result<Position, LocationError>>();
    let slot = Arc::new(Mutex::new(Some(tx)));
    let error_slot = Arc::clone(&slot);

    geolocator.get_current_position(
        options,
        Box::new(move |position| complete(&slot, Ok(position))),
        Box::new(move |error| complete(&error_slot, Err(error))),
    );

    rx.await.unwrap_or(Err(LocationError::Unavailable))
}

type ResultSlot = Mutex<Option<oneshot::Sender<Result<Position, LocationError>>>>;

fn complete(slot: &ResultSlot, result: Result<Position, LocationError>) {
    match slot.lock().take() {
        Some(tx) => {
            // Receiver gone means the request was abandoned; nothing to do.
            let _ = tx.send(result);
        }
        None => tracing::debug!("Ignoring second geolocation callback"),
    }
}
