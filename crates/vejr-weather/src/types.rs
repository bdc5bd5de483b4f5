use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Icon categories derived from a free-text weather description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Rain,
    Clouds,
    Sun,
    Snow,
    Clear,
    #[default]
    Default,
}

/// One entry of the classification table: a description containing
/// `needle` belongs to `category`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryRule {
    pub needle: &'static str,
    pub category: WeatherCategory,
}

impl CategoryRule {
    /// Case-sensitive substring test.
    pub fn matches(&self, description: &str) -> bool {
        description.contains(self.needle)
    }
}

/// Classification rules in priority order. Needles overlap in real
/// descriptions ("light rain and cloud"), so the first match wins.
pub const CATEGORY_RULES: [CategoryRule; 5] = [
    CategoryRule { needle: "rain", category: WeatherCategory::Rain },
    CategoryRule { needle: "cloud", category: WeatherCategory::Clouds },
    CategoryRule { needle: "sun", category: WeatherCategory::Sun },
    CategoryRule { needle: "snow", category: WeatherCategory::Snow },
    CategoryRule { needle: "clear", category: WeatherCategory::Clear },
];

impl WeatherCategory {
    /// Classify a provider description using [`CATEGORY_RULES`].
    pub fn classify(description: &str) -> Self {
        CATEGORY_RULES
            .iter()
            .find(|rule| rule.matches(description))
            .map_or(Self::Default, |rule| rule.category)
    }

    /// Get icon name (matches the forecast asset file stems)
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Rain => "rain",
            Self::Clouds => "cloud",
            Self::Sun => "sun",
            Self::Snow => "snow",
            Self::Clear | Self::Default => "clear-sky",
        }
    }
}

/// City as named by the user or the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    /// ISO 3166 alpha-2 code, empty when the provider omits it
    pub country_code: String,
}

/// Conditions for one sample. Values are kept exactly as the provider sent
/// them; rounding happens only in [`crate::display`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: f64,
    pub pressure_hpa: f64,
    /// Not every station reports visibility
    pub visibility_m: Option<f64>,
    pub wind_speed_ms: f64,
    /// Gusts are omitted by the provider in calm conditions
    pub wind_gust_ms: Option<f64>,
    pub description: String,
    /// Short provider label such as "Rain" or "Clouds"
    pub main_category: String,
}

impl CurrentConditions {
    pub fn category(&self) -> WeatherCategory {
        WeatherCategory::classify(&self.description)
    }
}

/// A timestamped entry of the three-hourly feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: NaiveDateTime,
    pub conditions: CurrentConditions,
}

/// Representative sample for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub formatted_label: String,
    pub conditions: CurrentConditions,
}

/// Current conditions plus daily forecast for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: CurrentConditions,
    /// Chronological, at most five days
    pub forecast: Vec<ForecastDay>,
}

/// Present-moment conditions for one city (no forecast)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    pub location: Location,
    pub current: CurrentConditions,
}

/// Why a single-city fetch failed
#[derive(Debug, thiserror::Error)]
pub enum FetchCause {
    #[error("city name is empty")]
    EmptyCity,
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Parse(String),
}

/// Weather for one city could not be fetched
#[derive(Debug, thiserror::Error)]
#[error("Could not fetch weather for {city}: {cause}")]
pub struct WeatherFetchError {
    pub city: String,
    #[source]
    pub cause: FetchCause,
}

impl WeatherFetchError {
    pub fn new(city: impl Into<String>, cause: FetchCause) -> Self {
        Self {
            city: city.into(),
            cause,
        }
    }

    /// The provider did not recognise the city name.
    pub fn is_unknown_city(&self) -> bool {
        matches!(self.cause, FetchCause::Status { status: 404, .. })
    }

    /// The provider rejected the API key.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.cause, FetchCause::Status { status: 401, .. })
    }
}

/// An all-or-nothing batch had at least one failing city
#[derive(Debug, thiserror::Error)]
#[error("Batch fetch failed: {failed} of {total} cities failed")]
pub struct BatchFetchError {
    pub failed: usize,
    pub total: usize,
    #[source]
    pub first: WeatherFetchError,
}

/// Default-city lookup errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Geolocation provider returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Geolocation response did not include a city")]
    MissingCity,
}
