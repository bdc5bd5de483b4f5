//! Maps data-layer errors to vejr_core::AppError for consistent user-facing messages.
//! Each source crate has its own module to keep mappings small and readable.

mod location;
mod storage;
mod weather;

use vejr_core::AppError;
use vejr_services::StorageError;
use vejr_weather::{BatchFetchError, LocationError, WeatherFetchError};

/// Any failure a screen operation can run into
#[derive(Debug, thiserror::Error)]
pub enum ScreenError {
    #[error(transparent)]
    Weather(#[from] WeatherFetchError),

    #[error(transparent)]
    Batch(#[from] BatchFetchError),

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// A blocking storage task panicked or was cancelled
    #[error("Background task failed: {0}")]
    Task(String),
}

impl From<ScreenError> for AppError {
    fn from(e: ScreenError) -> Self {
        match e {
            ScreenError::Weather(e) => weather::fetch_error(e),
            ScreenError::Batch(e) => weather::batch_error(e),
            ScreenError::Location(e) => location::lookup_error(e),
            ScreenError::Storage(e) => storage::storage_error(e),
            ScreenError::Task(s) => AppError::Service(s),
        }
    }
}
