/// Overlap test for half-open intervals `[a_start, a_end)` and
/// `[b_start, b_end)`.
pub fn intervals_overlap(a_start: u16, a_end: u16, b_start: u16, b_end: u16) -> bool {
    a_start < b_end && b_start < a_end
}

/// A candidate is free iff `[start, start + duration)` overlaps no busy
/// interval and no break interval. The end is saturating, so an out-of-range
/// duration widens the candidate instead of wrapping it.
pub fn is_free(start: u16, duration_minutes: u16, busy: &[(u16, u16)], breaks: &[(u16, u16)]) -> bool {
    let end = start.saturating_add(duration_minutes);
    busy.iter()
        .chain(breaks.iter())
        .all(|&(s, e)| !intervals_overlap(start, end, s, e))
}
