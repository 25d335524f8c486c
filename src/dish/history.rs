// Incremental slicing of the dish's per-second history ring.
//
// The dish keeps a fixed-size ring; the sample with counter `c` lives at index `c % ring.len()`
// and `current` is the counter the next sample will get. The ring holds counters
// `current - len .. current` once it has wrapped.

/// Returns the samples with counters in `since .. current`, oldest first.
///
/// - `since == None`: everything still in the ring (first fetch).
/// - `since > current`: the dish counter went backwards (reboot); resync by taking everything
///   recorded since the reset that the ring still holds.
/// - Gaps longer than the ring are truncated to the ring.
pub fn samples_since(ring: &[f32], current: u64, since: Option<u64>) -> Vec<f64> {
    let len = ring.len() as u64;
    if len == 0 {
        return Vec::new();
    }
    let oldest = current.saturating_sub(len);
    let start = match since {
        Some(since) if since <= current => since.max(oldest),
        _ => oldest,
    };
    (start..current)
        .map(|counter| f64::from(ring[(counter % len) as usize]))
        .collect()
}
