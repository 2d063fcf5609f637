use serde::Serialize;

use crate::model::*;

use super::conflict::find_overlaps;
use super::occupancy;
use super::{Engine, EngineError};

/// Totals over the active bookings, for the summary report screen.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub bookings: usize,
    pub nights: i64,
    pub billed: f64,
    pub collected: f64,
    pub outstanding: f64,
    pub paid_count: usize,
    pub unpaid_count: usize,
}

/// Fold the active bookings into report totals. Inactive rows are skipped
/// even if the caller passes a stale snapshot.
pub fn summarize(bookings: &[Booking]) -> Summary {
    let mut summary = Summary::default();
    for b in bookings.iter().filter(|b| b.is_active) {
        let total = b.total_amount();
        summary.bookings += 1;
        summary.nights += b.duration_days();
        summary.billed += total;
        if b.is_paid {
            summary.collected += total;
            summary.paid_count += 1;
        } else {
            summary.outstanding += total;
            summary.unpaid_count += 1;
        }
    }
    summary
}

impl Engine {
    /// Active bookings, newest first.
    pub async fn list_active(&self) -> Result<Vec<Booking>, EngineError> {
        self.snapshot().await
    }

    /// Occupancy of one day against a fresh snapshot.
    pub async fn day_status(&self, day: Day) -> Result<Occupancy, EngineError> {
        let snapshot = self.snapshot().await?;
        Ok(occupancy::classify_day(day, &snapshot))
    }

    /// Occupancy of every day of a civil month, for calendar rendering.
    pub async fn month_status(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<(Day, Occupancy)>, EngineError> {
        let snapshot = self.snapshot().await?;
        Ok(occupancy::classify_month(year, month, &snapshot))
    }

    /// Active bookings conflicting with a candidate stay, against a fresh
    /// snapshot. Advisory — see `create_booking`.
    pub async fn conflicts_for(&self, candidate: &Stay) -> Result<Vec<Booking>, EngineError> {
        let snapshot = self.snapshot().await?;
        Ok(find_overlaps(candidate, &snapshot)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Report totals over the active bookings.
    pub async fn report(&self) -> Result<Summary, EngineError> {
        let snapshot = self.snapshot().await?;
        Ok(summarize(&snapshot))
    }
}
