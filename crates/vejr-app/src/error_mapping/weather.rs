use vejr_core::{AppError, NetworkError, ReqwestErrorExt, WeatherError};
use vejr_weather::{BatchFetchError, FetchCause, WeatherFetchError};

pub(super) fn fetch_error(e: WeatherFetchError) -> AppError {
    let city = e.city;
    match e.cause {
        FetchCause::EmptyCity => AppError::Weather(WeatherError::CityNotFound(city)),
        FetchCause::Network(err) => AppError::Network((&err).into_network_error()),
        FetchCause::Status { status: 404, .. } => AppError::Weather(WeatherError::CityNotFound(city)),
        FetchCause::Status { status: 401, .. } => AppError::Weather(WeatherError::InvalidApiKey),
        FetchCause::Status { status, .. } if status >= 500 => {
            AppError::Weather(WeatherError::ServiceUnavailable)
        }
        FetchCause::Status { status, message } => {
            AppError::Weather(WeatherError::ApiError(format!("{} ({})", message, status)))
        }
        FetchCause::Parse(s) => AppError::Network(NetworkError::InvalidResponse(s)),
    }
}

pub(super) fn batch_error(e: BatchFetchError) -> AppError {
    AppError::Weather(WeatherError::BatchFailed(format!(
        "{} of {} cities failed, first: {}",
        e.failed, e.total, e.first.city
    )))
}
