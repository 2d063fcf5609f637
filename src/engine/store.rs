use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use ulid::Ulid;

use crate::model::*;

use super::conflict::validate_range;
use super::EngineError;

/// A validated booking ready for persistence. The store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub owner_id: UserId,
    pub renter_name: String,
    pub stay: Stay,
    pub daily_rate: f64,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub created_by: UserId,
    pub color: String,
}

/// Payment flag plus attribution, written as one atomic update so the three
/// fields can never disagree in storage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentUpdate {
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub paid_by: Option<UserId>,
}

/// Persistence gateway. Implementations own durability, retries, and
/// row-level access control; every write is all-or-nothing from the engine's
/// point of view.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Active bookings, newest first by creation time.
    async fn list_active(&self) -> Result<Vec<Booking>, EngineError>;
    async fn insert(&self, record: NewBooking) -> Result<Booking, EngineError>;
    async fn update_payment(&self, id: Ulid, update: PaymentUpdate) -> Result<(), EngineError>;
    async fn soft_delete(
        &self,
        id: Ulid,
        deleted_by: UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), EngineError>;
}

// ── Raw record mapping ───────────────────────────────────────────

/// A booking row as the managed backend returns it: stringly-typed ids and
/// timestamps, optional fields that older rows may lack.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBooking {
    pub id: String,
    pub owner_id: String,
    pub renter_name: String,
    pub check_in: String,
    pub check_out: String,
    pub daily_rate: f64,
    pub is_paid: bool,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub paid_by: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub deleted_at: Option<String>,
    #[serde(default)]
    pub deleted_by: Option<String>,
    pub created_at: String,
    pub created_by: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// The one place raw rows become typed bookings. Rows that break an
/// invariant (unparsable date, missing color, payment flag disagreeing with
/// its attribution) are rejected rather than silently defaulted.
pub fn map_raw(raw: RawBooking) -> Result<Booking, EngineError> {
    let id = parse_id(&raw.id, "id")?;
    let owner_id = parse_id(&raw.owner_id, "owner_id")?;
    let created_by = parse_id(&raw.created_by, "created_by")?;

    let check_in = parse_timestamp(&raw.check_in)?;
    let check_out = parse_timestamp(&raw.check_out)?;
    let stay = validate_range(check_in, check_out)?;
    let created_at = parse_timestamp(&raw.created_at)?;

    let paid_at = raw.paid_at.as_deref().map(parse_timestamp).transpose()?;
    let paid_by = raw
        .paid_by
        .as_deref()
        .map(|s| parse_id(s, "paid_by"))
        .transpose()?;
    match (raw.is_paid, &paid_at, &paid_by) {
        (true, Some(_), Some(_)) | (false, None, None) => {}
        _ => return Err(EngineError::MalformedRecord("payment attribution")),
    }

    let deleted_at = raw.deleted_at.as_deref().map(parse_timestamp).transpose()?;
    let deleted_by = raw
        .deleted_by
        .as_deref()
        .map(|s| parse_id(s, "deleted_by"))
        .transpose()?;

    let color = match raw.color {
        Some(c) if !c.is_empty() => c,
        _ => return Err(EngineError::MalformedRecord("color")),
    };

    Ok(Booking {
        id,
        owner_id,
        renter_name: raw.renter_name,
        stay,
        daily_rate: raw.daily_rate,
        is_paid: raw.is_paid,
        paid_at,
        paid_by,
        is_active: raw.is_active,
        deleted_at,
        deleted_by,
        created_at,
        created_by,
        color,
    })
}

fn parse_id(raw: &str, field: &'static str) -> Result<Ulid, EngineError> {
    raw.parse().map_err(|_| EngineError::MalformedRecord(field))
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` anchored at noon.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, EngineError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(at_anchor(date));
    }
    Err(EngineError::InvalidDate(raw.to_owned()))
}

// ── In-memory store ──────────────────────────────────────────────

/// Reference `BookingStore` used by tests and demos. Assigns ids, applies
/// the payment triple and the soft-delete atomically under the map guard.
pub struct InMemoryStore {
    bookings: DashMap<Ulid, Booking>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            bookings: DashMap::new(),
        }
    }

    /// Every row, inactive ones included — soft-deleted bookings are never
    /// purged.
    pub fn all(&self) -> Vec<Booking> {
        self.bookings.iter().map(|e| e.value().clone()).collect()
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn list_active(&self) -> Result<Vec<Booking>, EngineError> {
        let mut rows: Vec<Booking> = self
            .bookings
            .iter()
            .filter(|e| e.value().is_active)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert(&self, record: NewBooking) -> Result<Booking, EngineError> {
        let booking = Booking {
            id: Ulid::new(),
            owner_id: record.owner_id,
            renter_name: record.renter_name,
            stay: record.stay,
            daily_rate: record.daily_rate,
            is_paid: record.is_paid,
            paid_at: record.paid_at,
            paid_by: record.paid_by,
            is_active: true,
            deleted_at: None,
            deleted_by: None,
            created_at: record.created_at,
            created_by: record.created_by,
            color: record.color,
        };
        self.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn update_payment(&self, id: Ulid, update: PaymentUpdate) -> Result<(), EngineError> {
        let mut entry = self
            .bookings
            .get_mut(&id)
            .ok_or(EngineError::NotFound(id))?;
        entry.is_paid = update.is_paid;
        entry.paid_at = update.paid_at;
        entry.paid_by = update.paid_by;
        Ok(())
    }

    async fn soft_delete(
        &self,
        id: Ulid,
        deleted_by: UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let mut entry = self
            .bookings
            .get_mut(&id)
            .ok_or(EngineError::NotFound(id))?;
        entry.is_active = false;
        entry.deleted_at = Some(deleted_at);
        entry.deleted_by = Some(deleted_by);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawBooking {
        RawBooking {
            id: Ulid::new().to_string(),
            owner_id: Ulid::new().to_string(),
            renter_name: "Maria".into(),
            check_in: "2024-03-01".into(),
            check_out: "2024-03-03T09:30:00Z".into(),
            daily_rate: 100.0,
            is_paid: false,
            paid_at: None,
            paid_by: None,
            is_active: true,
            deleted_at: None,
            deleted_by: None,
            created_at: "2024-02-20T15:04:05Z".into(),
            created_by: Ulid::new().to_string(),
            color: Some("blue".into()),
        }
    }

    #[test]
    fn map_raw_normalizes_dates() {
        let booking = map_raw(raw()).unwrap();
        assert_eq!(booking.stay.nights(), 2);
        assert_eq!(
            booking.stay.check_in,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        // 09:30 on the check-out timestamp is discarded.
        assert_eq!(
            booking.stay.check_out,
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
    }

    #[test]
    fn map_raw_accepts_json_rows() {
        let mut r = raw();
        r.is_paid = true;
        r.paid_at = Some("2024-02-21T10:00:00Z".into());
        r.paid_by = Some(Ulid::new().to_string());
        let json = serde_json::to_string(&serde_json::json!({
            "id": r.id, "owner_id": r.owner_id, "renter_name": r.renter_name,
            "check_in": r.check_in, "check_out": r.check_out,
            "daily_rate": r.daily_rate, "is_paid": r.is_paid,
            "paid_at": r.paid_at, "paid_by": r.paid_by,
            "is_active": r.is_active, "created_at": r.created_at,
            "created_by": r.created_by, "color": r.color,
        }))
        .unwrap();
        let parsed: RawBooking = serde_json::from_str(&json).unwrap();
        let booking = map_raw(parsed).unwrap();
        assert!(booking.is_paid);
        assert!(booking.paid_at.is_some() && booking.paid_by.is_some());
    }

    #[test]
    fn map_raw_rejects_bad_date() {
        let mut r = raw();
        r.check_in = "not-a-date".into();
        assert!(matches!(map_raw(r), Err(EngineError::InvalidDate(_))));
    }

    #[test]
    fn map_raw_rejects_missing_color() {
        let mut r = raw();
        r.color = None;
        assert!(matches!(
            map_raw(r),
            Err(EngineError::MalformedRecord("color"))
        ));
        let mut r = raw();
        r.color = Some(String::new());
        assert!(matches!(
            map_raw(r),
            Err(EngineError::MalformedRecord("color"))
        ));
    }

    #[test]
    fn map_raw_rejects_mixed_payment_state() {
        let mut r = raw();
        r.is_paid = true; // flag set, attribution missing
        assert!(matches!(
            map_raw(r),
            Err(EngineError::MalformedRecord("payment attribution"))
        ));

        let mut r = raw();
        r.paid_at = Some("2024-02-21T10:00:00Z".into());
        r.paid_by = Some(Ulid::new().to_string());
        // attribution set, flag cleared
        assert!(map_raw(r).is_err());
    }

    #[test]
    fn map_raw_rejects_inverted_range() {
        let mut r = raw();
        r.check_in = "2024-03-05".into();
        r.check_out = "2024-03-05".into();
        assert!(matches!(
            map_raw(r),
            Err(EngineError::CheckOutNotAfterCheckIn)
        ));
    }

    #[tokio::test]
    async fn list_active_is_newest_first() {
        let store = InMemoryStore::new();
        let owner = Ulid::new();
        for (i, name) in ["first", "second", "third"].iter().enumerate() {
            store
                .insert(NewBooking {
                    owner_id: owner,
                    renter_name: (*name).into(),
                    stay: Stay::new(
                        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                        NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                    ),
                    daily_rate: 100.0,
                    is_paid: false,
                    paid_at: None,
                    paid_by: None,
                    created_at: at_anchor(
                        NaiveDate::from_ymd_opt(2024, 2, 1 + i as u32).unwrap(),
                    ),
                    created_by: owner,
                    color: "blue".into(),
                })
                .await
                .unwrap();
        }
        let rows = store.list_active().await.unwrap();
        let names: Vec<_> = rows.iter().map(|b| b.renter_name.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn update_payment_unknown_id() {
        let store = InMemoryStore::new();
        let err = store
            .update_payment(
                Ulid::new(),
                PaymentUpdate {
                    is_paid: true,
                    paid_at: Some(Utc::now()),
                    paid_by: Some(Ulid::new()),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound(_)));
    }

    #[tokio::test]
    async fn soft_deleted_rows_survive_but_leave_the_active_list() {
        let store = InMemoryStore::new();
        let owner = Ulid::new();
        let booking = store
            .insert(NewBooking {
                owner_id: owner,
                renter_name: "Ana".into(),
                stay: Stay::new(
                    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
                ),
                daily_rate: 80.0,
                is_paid: false,
                paid_at: None,
                paid_by: None,
                created_at: Utc::now(),
                created_by: owner,
                color: "green".into(),
            })
            .await
            .unwrap();

        store.soft_delete(booking.id, owner, Utc::now()).await.unwrap();
        assert!(store.list_active().await.unwrap().is_empty());

        let all = store.all();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);
        assert!(all[0].deleted_at.is_some() && all[0].deleted_by.is_some());
    }
}
