use chrono::Datelike;

use crate::model::*;

// ── Half-Day Occupancy Classifier ─────────────────────────────────

/// True if `half` of `day` is occupied by any active booking.
/// Inactive (soft-deleted) bookings never occupy anything, even if a stale
/// snapshot still carries them.
pub fn half_occupied(day: Day, half: DayHalf, bookings: &[Booking]) -> bool {
    bookings
        .iter()
        .filter(|b| b.is_active)
        .any(|b| b.stay.occupies(day, half))
}

/// Classify a day into exactly one of the four occupancy states, unioning
/// the half-day rule across all active bookings.
pub fn classify_day(day: Day, bookings: &[Booking]) -> Occupancy {
    let morning = half_occupied(day, DayHalf::Morning, bookings);
    let afternoon = half_occupied(day, DayHalf::Afternoon, bookings);
    Occupancy::from_halves(morning, afternoon)
}

/// The active booking occupying one half of a day, if any. Calendar cells
/// render the occupant's name and color per half.
pub fn occupant<'a>(day: Day, half: DayHalf, bookings: &'a [Booking]) -> Option<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.is_active)
        .find(|b| b.stay.occupies(day, half))
}

/// Classify every day of a civil month, in order, for calendar rendering.
pub fn classify_month(year: i32, month: u32, bookings: &[Booking]) -> Vec<(Day, Occupancy)> {
    let Some(first) = Day::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(31);
    let mut day = first;
    loop {
        out.push((day, classify_day(day, bookings)));
        match day.succ_opt() {
            Some(next) if next.month() == month => day = next,
            _ => break,
        }
    }
    out
}

/// Date-picker filter: only fully booked days are unselectable. A
/// morning-booked day remains a valid new check-out and an afternoon-booked
/// day a valid new check-in; any resulting same-half contention is surfaced
/// by overlap detection, not blocked here.
pub fn selectable(day: Day, bookings: &[Booking]) -> bool {
    classify_day(day, bookings) != Occupancy::FullyBooked
}
