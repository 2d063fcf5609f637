use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Calendar day — the only date granularity the engine reasons in.
pub type Day = NaiveDate;

/// Acting user, as handed out by the identity provider.
pub type UserId = Ulid;

/// Reference hour all stored timestamps are anchored to. Anchoring at noon
/// instead of midnight keeps date-only comparisons stable across timezone
/// offsets near the day boundary.
pub const ANCHOR_HOUR: u32 = 12;

/// Anchor a timestamp at noon of its calendar day, discarding the original
/// time-of-day.
pub fn normalize(value: DateTime<Utc>) -> DateTime<Utc> {
    at_anchor(value.date_naive())
}

/// Noon of the given day as a UTC timestamp.
pub fn at_anchor(day: Day) -> DateTime<Utc> {
    let noon = NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).expect("noon is a valid time");
    Utc.from_utc_datetime(&day.and_time(noon))
}

/// Calendar day of a timestamp.
pub fn day_of(value: DateTime<Utc>) -> Day {
    value.date_naive()
}

/// Half-open day interval `[check_in, check_out)` — the check-out day is
/// morning-only, so it is excluded from the occupied range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub check_in: Day,
    pub check_out: Day,
}

impl Stay {
    pub fn new(check_in: Day, check_out: Day) -> Self {
        debug_assert!(check_in < check_out, "Stay check_in must be before check_out");
        Self { check_in, check_out }
    }

    /// Nights spent, i.e. whole days between check-in and check-out.
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn overlaps(&self, other: &Stay) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    /// Occupancy of one half of `day` under the half-day rule:
    /// check-in day → afternoon only, check-out day → morning only,
    /// strictly-between days → both halves.
    pub fn occupies(&self, day: Day, half: DayHalf) -> bool {
        if self.check_in < day && day < self.check_out {
            return true;
        }
        match half {
            DayHalf::Morning => day == self.check_out,
            DayHalf::Afternoon => day == self.check_in,
        }
    }
}

/// One half of a calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayHalf {
    Morning,
    Afternoon,
}

/// Occupancy state of a calendar day across all active bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Occupancy {
    Available,
    MorningBooked,
    AfternoonBooked,
    FullyBooked,
}

impl Occupancy {
    pub fn from_halves(morning: bool, afternoon: bool) -> Self {
        match (morning, afternoon) {
            (true, true) => Occupancy::FullyBooked,
            (true, false) => Occupancy::MorningBooked,
            (false, true) => Occupancy::AfternoonBooked,
            (false, false) => Occupancy::Available,
        }
    }
}

/// Derived billing values — always recomputed, never stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Derived {
    pub duration_days: i64,
    pub total_amount: f64,
}

/// `duration_days = nights`, `total_amount = nights × rate`. Defined only for
/// a valid stay and a positive rate; both are enforced upstream on the create
/// path.
pub fn compute_derived(stay: &Stay, daily_rate: f64) -> Derived {
    let duration_days = stay.nights();
    Derived {
        duration_days,
        total_amount: duration_days as f64 * daily_rate,
    }
}

/// A rental booking. `id` is assigned by the persistence gateway; the only
/// mutations after creation are the payment toggle and the soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub owner_id: UserId,
    pub renter_name: String,
    pub stay: Stay,
    pub daily_rate: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<UserId>,
    pub is_active: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub deleted_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    /// Display tag for visual grouping; no bearing on interval semantics.
    pub color: String,
}

impl Booking {
    pub fn duration_days(&self) -> i64 {
        self.stay.nights()
    }

    pub fn total_amount(&self) -> f64 {
        compute_derived(&self.stay, self.daily_rate).total_amount
    }
}

/// Form input for creating a booking. Timestamps may carry any time-of-day;
/// the engine normalizes them before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDraft {
    pub renter_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    pub daily_rate: f64,
    pub is_paid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn normalize_anchors_at_noon() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 45, 9).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 0, 1, 0).unwrap();
        assert_eq!(normalize(late), normalize(early));
        assert_eq!(normalize(late), at_anchor(day(2024, 3, 1)));
    }

    #[test]
    fn stay_nights() {
        let s = Stay::new(day(2024, 3, 1), day(2024, 3, 3));
        assert_eq!(s.nights(), 2);
        let single = Stay::new(day(2024, 3, 1), day(2024, 3, 2));
        assert_eq!(single.nights(), 1);
    }

    #[test]
    fn stay_overlap_half_open() {
        let a = Stay::new(day(2024, 3, 1), day(2024, 3, 3));
        let b = Stay::new(day(2024, 3, 2), day(2024, 3, 4));
        let c = Stay::new(day(2024, 3, 3), day(2024, 3, 5));
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching: one stay's check-out is the other's check-in.
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
    }

    #[test]
    fn stay_occupies_halves() {
        let s = Stay::new(day(2024, 3, 1), day(2024, 3, 3));
        // Check-in day: afternoon only.
        assert!(!s.occupies(day(2024, 3, 1), DayHalf::Morning));
        assert!(s.occupies(day(2024, 3, 1), DayHalf::Afternoon));
        // Between: both halves.
        assert!(s.occupies(day(2024, 3, 2), DayHalf::Morning));
        assert!(s.occupies(day(2024, 3, 2), DayHalf::Afternoon));
        // Check-out day: morning only.
        assert!(s.occupies(day(2024, 3, 3), DayHalf::Morning));
        assert!(!s.occupies(day(2024, 3, 3), DayHalf::Afternoon));
        // Outside.
        assert!(!s.occupies(day(2024, 3, 4), DayHalf::Morning));
        assert!(!s.occupies(day(2024, 2, 29), DayHalf::Afternoon));
    }

    #[test]
    fn single_night_never_fills_a_day() {
        let s = Stay::new(day(2024, 3, 1), day(2024, 3, 2));
        for d in [day(2024, 3, 1), day(2024, 3, 2)] {
            let both = s.occupies(d, DayHalf::Morning) && s.occupies(d, DayHalf::Afternoon);
            assert!(!both);
        }
    }

    #[test]
    fn derived_values() {
        let s = Stay::new(day(2024, 3, 1), day(2024, 3, 3));
        let d = compute_derived(&s, 100.0);
        assert_eq!(d.duration_days, 2);
        assert_eq!(d.total_amount, 200.0);
    }

    #[test]
    fn occupancy_from_halves_exhaustive() {
        assert_eq!(Occupancy::from_halves(false, false), Occupancy::Available);
        assert_eq!(Occupancy::from_halves(true, false), Occupancy::MorningBooked);
        assert_eq!(Occupancy::from_halves(false, true), Occupancy::AfternoonBooked);
        assert_eq!(Occupancy::from_halves(true, true), Occupancy::FullyBooked);
    }
}
