use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::settings::ShopSettings;
use crate::scheduling::conflict::intervals_overlap;

/// Re-validates a candidate occupied interval against a date's booking set,
/// returning the id of the first active booking it overlaps.
///
/// This is the shared conflict check behind both admission (inside the
/// exclusive write scope, against the re-read active set) and the approval
/// transition (which excludes the booking being approved via `exclude`).
/// Existing bookings contribute their occupied intervals, stored or derived.
pub fn find_conflict(
    candidate_start: u16,
    candidate_occupy: u16,
    others: &[Booking],
    settings: &ShopSettings,
    exclude: Option<Uuid>,
) -> Option<Uuid> {
    // Saturating end: an oversized span still collides with everything it
    // reaches instead of wrapping past it.
    let candidate_end = candidate_start.saturating_add(candidate_occupy);
    others
        .iter()
        .filter(|b| Some(b.id) != exclude)
        .filter(|b| b.status.is_active())
        .find(|b| {
            let (start, end) = b.occupied_interval(settings);
            intervals_overlap(candidate_start, candidate_end, start, end)
        })
        .map(|b| b.id)
}
