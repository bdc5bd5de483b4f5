//! Screen state.
//!
//! Each screen owns a plain value that is passed into an operation and
//! returned updated. Nothing here is global.

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use vejr_core::AppError;
use vejr_weather::display::{flag_url, ConditionsSummary};
use vejr_weather::{CityWeather, WeatherSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Info,
    Error,
}

/// One-line message for the user, replacing a modal alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Error notice carrying the user-facing message of `error`.
    pub fn error(error: &AppError) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: error.user_message().to_string(),
        }
    }
}

/// Sets a loading flag on creation and clears it when dropped, so every exit
/// path of an operation releases it.
///
/// The state value is owned by the running operation, so its flag is always
/// `false` again by the time the caller gets the state back. The same
/// transitions are published on `observers`, which is where anyone else sees
/// a request in flight.
pub struct LoadingGuard<'a> {
    flag: &'a mut bool,
    observers: &'a watch::Sender<bool>,
}

impl<'a> LoadingGuard<'a> {
    pub fn start(flag: &'a mut bool, observers: &'a watch::Sender<bool>) -> Self {
        *flag = true;
        observers.send_replace(true);
        Self { flag, observers }
    }

    pub fn is_loading(&self) -> bool {
        *self.flag
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
        self.observers.send_replace(false);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomeState {
    /// City in the search field
    pub city: String,
    pub weather: Option<WeatherSnapshot>,
    pub loading: bool,
    pub show_details: bool,
    pub notice: Option<Notice>,
}

impl HomeState {
    /// Card text for the current conditions, if weather is loaded.
    pub fn current_summary(&self) -> Option<ConditionsSummary> {
        self.weather
            .as_ref()
            .map(|w| ConditionsSummary::from_conditions(&w.current))
    }
}

/// A saved city with weather to show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCityCard {
    /// Name as saved by the user
    pub city: String,
    pub weather: CityWeather,
    pub summary: ConditionsSummary,
    pub flag_url: String,
}

impl SavedCityCard {
    pub fn new(city: &str, weather: &CityWeather) -> Self {
        Self {
            city: city.to_string(),
            summary: ConditionsSummary::from_conditions(&weather.current),
            flag_url: flag_url(&weather.location.country_code),
            weather: weather.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SavedState {
    /// Saved names in insertion order
    pub cities: Vec<String>,
    /// Cards in saved order; cities without weather are left out
    pub cards: Vec<SavedCityCard>,
    /// Cities whose lookup failed in the last batch
    pub failed: Vec<String>,
    pub loading: bool,
    pub notice: Option<Notice>,
}
