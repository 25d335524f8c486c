// Domain models: dish status snapshot, derived gauges, history batches

mod history;
mod status;

pub use history::HistoryBatch;
pub use status::{DishGauges, StatusFields, UNKNOWN_LABEL};
