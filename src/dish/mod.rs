// Dish telemetry boundary: connection lifecycle and the two reads the poller needs

mod grpc;
pub mod history;

use std::future::Future;

use crate::models::{HistoryBatch, StatusFields};

pub use grpc::{GrpcDishConnector, GrpcDishSession};

#[derive(Debug, thiserror::Error)]
pub enum DishError {
    /// Could not reach the dish, or the call failed in transport (includes timeouts).
    #[error("connection error: {0}")]
    Connection(String),
    /// The dish answered with something the monitor cannot use.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<tonic::transport::Error> for DishError {
    fn from(e: tonic::transport::Error) -> Self {
        DishError::Connection(e.to_string())
    }
}

impl From<tonic::Status> for DishError {
    fn from(s: tonic::Status) -> Self {
        DishError::Connection(format!("{:?}: {}", s.code(), s.message()))
    }
}

/// Opens sessions to one dish.
pub trait DishConnector: Send + Sync + 'static {
    type Session: DishSession;

    /// Address used in logs.
    fn target(&self) -> &str;

    fn connect(&self) -> impl Future<Output = Result<Self::Session, DishError>> + Send;
}

/// A live connection. Dropping it without `close` is allowed but skips the disconnect log.
pub trait DishSession: Send + Sized + 'static {
    fn fetch_status(&mut self) -> impl Future<Output = Result<StatusFields, DishError>> + Send;

    /// Samples recorded after `since` (exclusive). `None` asks for the whole ring.
    fn fetch_history_since(
        &mut self,
        since: Option<u64>,
    ) -> impl Future<Output = Result<HistoryBatch, DishError>> + Send;

    fn close(self) -> impl Future<Output = ()> + Send;
}
