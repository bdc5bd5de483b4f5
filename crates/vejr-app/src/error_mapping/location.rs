use vejr_core::{AppError, LocationError as CoreLocationError};
use vejr_weather::LocationError;

pub(super) fn lookup_error(e: LocationError) -> AppError {
    match e {
        LocationError::MissingCity => AppError::Location(CoreLocationError::CityMissing),
        other => AppError::Location(CoreLocationError::LookupFailed(other.to_string())),
    }
}
