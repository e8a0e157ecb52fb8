use crate::models::settings::ShopSettings;
use crate::scheduling::time::ceil_to_step;

/// Converts a service's nominal duration into the span it reserves on the
/// calendar. Short services get a mandatory rest appended and the total is
/// rounded up to the configured step; everything else occupies exactly its
/// duration.
///
/// Overlap checks use this value for existing bookings, while a new
/// candidate's window fit is judged by its nominal duration. The asymmetry is
/// deliberate: the rest after a short service is enforced against whoever
/// books next, without widening the slot shown for the short service itself.
pub fn occupied_minutes(duration_minutes: u16, settings: &ShopSettings) -> u16 {
    if duration_minutes < settings.short_service_threshold_minutes {
        ceil_to_step(
            duration_minutes.saturating_add(settings.rest_minutes_after_short),
            settings.extra_round_minutes,
        )
    } else {
        duration_minutes
    }
}
