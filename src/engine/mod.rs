mod conflict;
mod error;
mod mutations;
mod occupancy;
mod queries;
mod store;

pub use conflict::{find_overlaps, validate_range};
pub use error::EngineError;
pub use mutations::CreatedBooking;
pub use occupancy::{classify_day, classify_month, half_occupied, occupant, selectable};
pub use queries::{summarize, Summary};
pub use store::{
    map_raw, parse_timestamp, BookingStore, InMemoryStore, NewBooking, PaymentUpdate, RawBooking,
};

use std::sync::Arc;

use crate::identity::IdentityProvider;
use crate::model::*;
use crate::notify::NotifyHub;

/// The booking interval engine: validation, half-day occupancy, overlap
/// detection, and derived values over bookings held by an external gateway.
/// All computations are synchronous and pure; the only awaits are gateway
/// and identity calls.
pub struct Engine {
    store: Arc<dyn BookingStore>,
    identity: Arc<dyn IdentityProvider>,
    pub notify: Arc<NotifyHub>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn BookingStore>,
        identity: Arc<dyn IdentityProvider>,
        notify: Arc<NotifyHub>,
    ) -> Self {
        Self {
            store,
            identity,
            notify,
        }
    }

    /// Acting user for attribution, or `NotAuthenticated`. Every mutation
    /// resolves this before touching the gateway.
    pub(super) async fn acting_user(&self) -> Result<UserId, EngineError> {
        self.identity
            .current_user()
            .await
            .ok_or(EngineError::NotAuthenticated)
    }

    /// Fresh snapshot of active bookings. Conflict checks run against the
    /// snapshot fetched immediately beforehand; concurrent writers can still
    /// race, so the results are best-effort by design (see DESIGN.md).
    pub(super) async fn snapshot(&self) -> Result<Vec<Booking>, EngineError> {
        let rows = self
            .store
            .list_active()
            .await
            .map_err(count_store_failure)?;
        metrics::histogram!(crate::observability::SNAPSHOT_SIZE).record(rows.len() as f64);
        Ok(rows)
    }
}

/// Tally a failed gateway call, then hand the error back to the caller.
pub(super) fn count_store_failure(e: EngineError) -> EngineError {
    metrics::counter!(crate::observability::STORE_FAILURES_TOTAL).increment(1);
    e
}
