use crate::model::{Booking, UserId};

/// Display tags cycled through for visual grouping on the calendar.
pub const PALETTE: [&str; 7] = [
    "blue", "green", "pink", "purple", "indigo", "orange", "yellow",
];

/// Next display color for a new booking: advance the palette from the acting
/// user's most recently created active booking, wrapping around. A color not
/// in the palette (or no prior booking) restarts at the first entry.
///
/// Pure over the snapshot passed in — color choice is never ambient state.
pub fn next_color(existing: &[Booking], owner: UserId) -> &'static str {
    let last = existing
        .iter()
        .filter(|b| b.is_active && b.owner_id == owner)
        .max_by_key(|b| (b.created_at, b.id))
        .map(|b| b.color.as_str());

    match last.and_then(|c| PALETTE.iter().position(|p| *p == c)) {
        Some(idx) => PALETTE[(idx + 1) % PALETTE.len()],
        None => PALETTE[0],
    }
}
