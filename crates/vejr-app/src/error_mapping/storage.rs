use vejr_core::{AppError, StorageError as CoreStorageError};
use vejr_services::StorageError;

pub(super) fn storage_error(e: StorageError) -> AppError {
    match e {
        StorageError::Backend(s) => AppError::Storage(CoreStorageError::Unavailable(s)),
        StorageError::Corrupt { key, message } => {
            AppError::Storage(CoreStorageError::Corruption(format!("{}: {}", key, message)))
        }
        StorageError::Validation(s) => AppError::Storage(CoreStorageError::InvalidInput(s)),
    }
}
