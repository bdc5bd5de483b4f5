//! Shared services used by the screens.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use vejr_core::{AppError, Config, ConfigError};
use vejr_services::{AddOutcome, KeyValueStore, SavedCityStore, SqliteKvStore};
use vejr_weather::{BatchMode, IpLocator, NormalizeOptions, WeatherProvider};

use crate::error_mapping::ScreenError;

pub type SavedCities = SavedCityStore<Box<dyn KeyValueStore>>;

/// Clients and stores built once at startup and shared by every screen.
#[derive(Clone)]
pub struct AppServices {
    pub weather: Arc<WeatherProvider>,
    pub locator: Arc<IpLocator>,
    pub saved: Arc<SavedCities>,
    pub batch_mode: BatchMode,
    pub(crate) home_loading: Arc<watch::Sender<bool>>,
    pub(crate) saved_loading: Arc<watch::Sender<bool>>,
}

impl AppServices {
    pub fn new(
        weather: WeatherProvider,
        locator: IpLocator,
        store: Box<dyn KeyValueStore>,
        batch_mode: BatchMode,
    ) -> Self {
        Self {
            weather: Arc::new(weather),
            locator: Arc::new(locator),
            saved: Arc::new(SavedCityStore::new(store)),
            batch_mode,
            home_loading: Arc::new(watch::channel(false).0),
            saved_loading: Arc::new(watch::channel(false).0),
        }
    }

    /// Follows whether the home screen has a weather request in flight.
    pub fn watch_home_loading(&self) -> watch::Receiver<bool> {
        self.home_loading.subscribe()
    }

    /// Follows whether the saved-cities screen has a batch in flight.
    pub fn watch_saved_loading(&self) -> watch::Receiver<bool> {
        self.saved_loading.subscribe()
    }

    /// Build every service from configuration. The SQLite database is
    /// created if missing.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let timeout = Duration::from_secs(config.weather.request_timeout_secs);

        let target_hour = config
            .forecast
            .parsed_target_hour()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        let locale = config
            .forecast
            .parsed_locale()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        let weather =
            WeatherProvider::new(&config.weather.base_url, &config.weather.api_key, timeout)
                .map_err(|e| AppError::Service(format!("Failed to create weather client: {}", e)))?
                .with_normalize_options(NormalizeOptions::new(target_hour, locale));

        let locator =
            IpLocator::new(&config.geolocation.base_url, &config.geolocation.token, timeout)
                .map_err(|e| {
                    AppError::Service(format!("Failed to create geolocation client: {}", e))
                })?;

        let store = SqliteKvStore::new(&config.storage.database_path)
            .map_err(ScreenError::from)
            .map_err(AppError::from)?;

        let batch_mode = match config.batch.mode {
            vejr_core::BatchMode::Isolated => BatchMode::Isolated,
            vejr_core::BatchMode::AllOrNothing => BatchMode::AllOrNothing,
        };

        tracing::info!(
            "Services ready (database: {}, batch mode: {:?})",
            config.storage.database_path.display(),
            batch_mode
        );

        Ok(Self::new(weather, locator, Box::new(store), batch_mode))
    }

    /// Saved cities, read off the async runtime.
    pub async fn saved_cities(&self) -> Result<Vec<String>, ScreenError> {
        let saved = Arc::clone(&self.saved);
        tokio::task::spawn_blocking(move || saved.list())
            .await
            .map_err(|e| ScreenError::Task(e.to_string()))?
            .map_err(ScreenError::from)
    }

    pub async fn save_city(&self, city: &str) -> Result<AddOutcome, ScreenError> {
        let saved = Arc::clone(&self.saved);
        let city = city.to_string();
        tokio::task::spawn_blocking(move || saved.add(&city))
            .await
            .map_err(|e| ScreenError::Task(e.to_string()))?
            .map_err(ScreenError::from)
    }

    pub async fn unsave_city(&self, city: &str) -> Result<(), ScreenError> {
        let saved = Arc::clone(&self.saved);
        let city = city.to_string();
        tokio::task::spawn_blocking(move || saved.remove(&city))
            .await
            .map_err(|e| ScreenError::Task(e.to_string()))?
            .map_err(ScreenError::from)
    }
}
