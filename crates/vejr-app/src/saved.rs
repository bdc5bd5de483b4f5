//! Saved-cities screen: current weather for every saved city.

use vejr_core::AppError;
use vejr_weather::BatchWeatherResult;

use crate::error_mapping::ScreenError;
use crate::services::AppServices;
use crate::state::{LoadingGuard, Notice, SavedCityCard, SavedState};

/// Screen activation: load the saved list, then fetch weather for all of it.
pub async fn activate(services: &AppServices, mut state: SavedState) -> SavedState {
    match services.saved_cities().await {
        Ok(cities) => state.cities = cities,
        Err(e) => {
            tracing::warn!("Loading saved cities failed: {}", e);
            state.notice = Some(Notice::error(&AppError::from(e)));
            return state;
        }
    }

    refresh_weather(services, state).await
}

/// Remove `city` from the saved list and drop its card.
pub async fn unsave(services: &AppServices, mut state: SavedState, city: &str) -> SavedState {
    if let Err(e) = services.unsave_city(city).await {
        tracing::warn!("Removing {:?} failed: {}", city, e);
        state.notice = Some(Notice::error(&AppError::from(e)));
        return state;
    }

    match services.saved_cities().await {
        Ok(cities) => {
            state.cities = cities;
            state.cards.retain(|card| card.city != city);
            state.failed.retain(|c| c != city);
            state.notice = Some(Notice::success(format!("{} has been removed.", city)));
        }
        Err(e) => {
            state.notice = Some(Notice::error(&AppError::from(e)));
        }
    }
    state
}

async fn refresh_weather(services: &AppServices, mut state: SavedState) -> SavedState {
    let result = {
        let _loading = LoadingGuard::start(&mut state.loading, &services.saved_loading);
        services
            .weather
            .fetch_all_saved(&state.cities, services.batch_mode)
            .await
    };

    match result {
        Ok(batch) => {
            state.cards = cards_in_saved_order(&state.cities, &batch);
            state.failed = batch.failures().map(|(city, _)| city.to_string()).collect();
            state.notice = None;
        }
        Err(e) => {
            tracing::warn!("{}", e);
            state.cards.clear();
            state.failed = state.cities.clone();
            state.notice = Some(Notice::error(&AppError::from(ScreenError::from(e))));
        }
    }
    state
}

/// One card per saved city that has weather under exactly the saved name.
fn cards_in_saved_order(cities: &[String], batch: &BatchWeatherResult) -> Vec<SavedCityCard> {
    cities
        .iter()
        .filter_map(|city| {
            let weather = batch.weather(city);
            if weather.is_none() {
                tracing::debug!("No weather under saved name {:?}", city);
            }
            weather.map(|w| SavedCityCard::new(city, w))
        })
        .collect()
}
