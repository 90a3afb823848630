//! Per-resolver memory of the last real location, so repeated refreshes
//! skip geolocation prompts and geocoding calls.

use parking_lot::Mutex;

use crate::types::ResolvedLocation;

#[derive(Debug, Default)]
pub struct LocationCache {
    slot: Mutex<Option<ResolvedLocation>>,
}

impl LocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ResolvedLocation> {
        self.slot.lock().clone()
    }

    /// Remember `location`, replacing any previous one. Fallback locations
    /// are ignored; returns whether the location was stored.
    pub fn store(&self, location: ResolvedLocation) -> bool {
        if !location.is_real_location {
            return false;
        }
        tracing::debug!(
            "Caching location {} ({}, {})",
            location.display_name,
            location.latitude,
            location.longitude
        );
        *self.slot.lock() = Some(location);
        true
    }

    pub fn clear(&self) {
        self.slot.lock().take();
    }
}
