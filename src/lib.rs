pub mod engine;
pub mod identity;
pub mod model;
pub mod notify;
pub mod observability;
pub mod palette;

pub use engine::{
    classify_day, classify_month, find_overlaps, map_raw, selectable, summarize, validate_range,
    BookingStore, CreatedBooking, Engine, EngineError, InMemoryStore, NewBooking, PaymentUpdate,
    RawBooking, Summary,
};
pub use identity::{FixedIdentity, IdentityProvider};
pub use model::{
    compute_derived, Booking, BookingDraft, Day, DayHalf, Derived, Occupancy, Stay, UserId,
};
pub use notify::{BookingChange, NotifyHub};
