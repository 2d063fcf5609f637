use chrono::{DateTime, Utc};

use crate::model::*;

use super::EngineError;

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Normalize both timestamps to their calendar day and enforce the strict
/// `check_out > check_in` invariant. A same-day stay is invalid. Pure, no
/// side effects; must run before any derived calculation or gateway write.
pub fn validate_range(
    check_in: DateTime<Utc>,
    check_out: DateTime<Utc>,
) -> Result<Stay, EngineError> {
    let check_in = day_of(normalize(check_in));
    let check_out = day_of(normalize(check_out));
    if check_out <= check_in {
        return Err(EngineError::CheckOutNotAfterCheckIn);
    }
    Ok(Stay::new(check_in, check_out))
}

pub(crate) fn validate_rate(rate: f64) -> Result<(), EngineError> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(EngineError::NonPositiveRate(rate));
    }
    Ok(())
}

/// Active bookings whose stay intersects the candidate under the half-open
/// rule: `[a1,a2)` and `[b1,b2)` overlap iff `a1 < b2 && b1 < a2`. Touching
/// stays (one's check-out equals the other's check-in) are compatible — the
/// departing guest leaves before noon, the arriving one comes after.
///
/// Advisory only: the create path reports the conflict set to the caller and
/// never hard-blocks on it.
pub fn find_overlaps<'a>(candidate: &Stay, bookings: &'a [Booking]) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.is_active && b.stay.overlaps(candidate))
        .collect()
}
