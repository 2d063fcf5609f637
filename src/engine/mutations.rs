use tracing::info;
use ulid::Ulid;

use crate::model::*;
use crate::notify::BookingChange;
use crate::palette;

use super::conflict::{find_overlaps, now, validate_range, validate_rate};
use super::store::{NewBooking, PaymentUpdate};
use super::{count_store_failure, Engine, EngineError};

/// Outcome of a create: the persisted booking plus the advisory conflict
/// set. Whether conflicting creations should be refused is the caller's
/// policy; the engine reports, it does not block.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedBooking {
    pub booking: Booking,
    pub conflicts: Vec<Booking>,
}

impl Engine {
    /// Validate the draft, compute derived values, detect conflicts against
    /// a fresh snapshot, and persist. Validation errors are returned before
    /// any gateway write — a failed create leaves no partial state behind.
    pub async fn create_booking(
        &self,
        draft: BookingDraft,
    ) -> Result<CreatedBooking, EngineError> {
        let user = self.acting_user().await?;
        let stay = validate_range(draft.check_in, draft.check_out)?;
        validate_rate(draft.daily_rate)?;

        let snapshot = self.snapshot().await?;
        let conflicts: Vec<Booking> = find_overlaps(&stay, &snapshot)
            .into_iter()
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            metrics::counter!(crate::observability::CONFLICTS_DETECTED_TOTAL).increment(1);
            tracing::warn!(
                nights = stay.nights(),
                conflicts = conflicts.len(),
                "creating booking over existing stays"
            );
        }

        let derived = compute_derived(&stay, draft.daily_rate);
        let created_at = now();
        // A booking marked paid at creation still gets full attribution.
        let (paid_at, paid_by) = if draft.is_paid {
            (Some(created_at), Some(user))
        } else {
            (None, None)
        };

        let record = NewBooking {
            owner_id: user,
            renter_name: draft.renter_name,
            stay,
            daily_rate: draft.daily_rate,
            is_paid: draft.is_paid,
            paid_at,
            paid_by,
            created_at,
            created_by: user,
            color: palette::next_color(&snapshot, user).to_owned(),
        };
        let booking = self
            .store
            .insert(record)
            .await
            .map_err(count_store_failure)?;

        metrics::counter!(crate::observability::BOOKINGS_CREATED_TOTAL).increment(1);
        info!(
            id = %booking.id,
            nights = derived.duration_days,
            total = derived.total_amount,
            "booking created"
        );
        self.notify.send(user, &BookingChange::Created(booking.clone()));
        Ok(CreatedBooking { booking, conflicts })
    }

    pub async fn mark_paid(&self, id: Ulid) -> Result<(), EngineError> {
        self.set_payment(id, true).await
    }

    pub async fn mark_unpaid(&self, id: Ulid) -> Result<(), EngineError> {
        self.set_payment(id, false).await
    }

    /// Payment toggle. Flag and attribution always move together: paid sets
    /// `paid_at`/`paid_by`, unpaid clears both. Re-applying the current
    /// state issues a redundant write and nothing else.
    pub async fn set_payment(&self, id: Ulid, paid: bool) -> Result<(), EngineError> {
        let user = self.acting_user().await?;
        let update = if paid {
            PaymentUpdate {
                is_paid: true,
                paid_at: Some(now()),
                paid_by: Some(user),
            }
        } else {
            PaymentUpdate {
                is_paid: false,
                paid_at: None,
                paid_by: None,
            }
        };
        self.store
            .update_payment(id, update)
            .await
            .map_err(count_store_failure)?;

        metrics::counter!(crate::observability::PAYMENT_TOGGLES_TOTAL).increment(1);
        info!(id = %id, paid, "payment updated");
        self.notify
            .send(user, &BookingChange::PaymentUpdated { id, is_paid: paid });
        Ok(())
    }

    /// Soft delete: the row stays in storage with deletion attribution and
    /// drops out of every occupancy and overlap computation. Terminal — no
    /// reactivation path.
    pub async fn deactivate(&self, id: Ulid) -> Result<(), EngineError> {
        let user = self.acting_user().await?;
        self.store
            .soft_delete(id, user, now())
            .await
            .map_err(count_store_failure)?;

        metrics::counter!(crate::observability::SOFT_DELETES_TOTAL).increment(1);
        info!(id = %id, "booking deactivated");
        self.notify.send(user, &BookingChange::Deactivated { id });
        Ok(())
    }
}
