// Incremental history read

/// Samples the dish recorded after the requested counter, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBatch {
    /// Dish counter of the newest sample in its ring; the next fetch starts after it.
    pub end_counter: u64,
    /// Per-second drop rates (0.0-1.0).
    pub samples: Vec<f64>,
}
