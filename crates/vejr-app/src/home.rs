//! Home screen: weather for one city, detected or typed.

use vejr_core::AppError;

use crate::error_mapping::ScreenError;
use crate::services::AppServices;
use crate::state::{HomeState, LoadingGuard, Notice};

/// Screen activation: detect the default city from the network address and
/// load its weather. If detection fails the city stays empty and nothing is
/// fetched.
pub async fn activate(services: &AppServices, mut state: HomeState) -> HomeState {
    match services.locator.resolve_default_city().await {
        Ok(city) => state.city = city,
        Err(e) => {
            tracing::warn!("Default city lookup failed: {}", e);
            let error = AppError::from(ScreenError::from(e));
            state.notice = Some(Notice::error(&error));
            return state;
        }
    }

    load_weather(services, state).await
}

/// Look up weather for a typed city.
pub async fn search(services: &AppServices, mut state: HomeState, city: &str) -> HomeState {
    state.city = city.trim().to_string();
    load_weather(services, state).await
}

/// Add the city in the search field to the saved list.
pub async fn save_current_city(services: &AppServices, mut state: HomeState) -> HomeState {
    let city = state.city.clone();
    state.notice = Some(match services.save_city(&city).await {
        Ok(outcome) if outcome.added => Notice::success(format!("{} er blevet gemt.", city)),
        Ok(_) => Notice::info(format!("{} er allerede gemt.", city)),
        Err(e) => {
            tracing::warn!("Saving {:?} failed: {}", city, e);
            Notice::error(&AppError::from(e))
        }
    });
    state
}

/// Show or hide the detail panel.
pub fn toggle_details(mut state: HomeState) -> HomeState {
    state.show_details = !state.show_details;
    state
}

async fn load_weather(services: &AppServices, mut state: HomeState) -> HomeState {
    if state.city.is_empty() {
        return state;
    }

    let result = {
        let _loading = LoadingGuard::start(&mut state.loading, &services.home_loading);
        services.weather.fetch_current_and_forecast(&state.city).await
    };

    match result {
        Ok(snapshot) => {
            state.weather = Some(snapshot);
            state.notice = None;
        }
        Err(e) => {
            tracing::warn!("{}", e);
            state.weather = None;
            state.notice = Some(Notice::error(&AppError::from(ScreenError::from(e))));
        }
    }
    state
}
