//! OpenWeatherMap client.
//!
//! Two endpoints are used: `/forecast` (three-hourly feed, about five days)
//! for the home screen and `/weather` (single current sample) for saved
//! cities. Units are always metric.

use chrono::NaiveDateTime;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::batch::{fetch_all_with, BatchMode, BatchWeatherResult};
use crate::forecast::{normalize, NormalizeOptions, FEED_TIMESTAMP_FORMAT};
use crate::types::{
    BatchFetchError, CityWeather, CurrentConditions, FetchCause, ForecastSample, Location,
    WeatherFetchError, WeatherSnapshot,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const USER_AGENT: &str = "Vejr/0.1.0";

/// Unit system sent with every request.
pub const UNITS: &str = "metric";

/// Feed index treated as "now": index 0 may already be in the past, index 1
/// is the first stable future bucket.
pub const CURRENT_SAMPLE_OFFSET: usize = 1;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    list: Vec<RawSample>,
    city: RawCity,
}

#[derive(Debug, Deserialize)]
struct RawCity {
    name: String,
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    dt_txt: String,
    #[serde(flatten)]
    fields: RawFields,
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    name: String,
    #[serde(default)]
    sys: RawSys,
    #[serde(flatten)]
    fields: RawFields,
}

#[derive(Debug, Default, Deserialize)]
struct RawSys {
    #[serde(default)]
    country: String,
}

/// Fields shared by forecast samples and current responses
#[derive(Debug, Deserialize)]
struct RawFields {
    main: RawMain,
    #[serde(default)]
    weather: Vec<RawDescription>,
    #[serde(default)]
    wind: RawWind,
    visibility: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct RawDescription {
    main: String,
    description: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawWind {
    #[serde(default)]
    speed: f64,
    gust: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl RawFields {
    fn to_conditions(&self) -> Result<CurrentConditions, FetchCause> {
        let weather = self
            .weather
            .first()
            .ok_or_else(|| FetchCause::Parse("sample has no weather description".to_string()))?;

        Ok(CurrentConditions {
            temperature_c: self.main.temp,
            feels_like_c: self.main.feels_like,
            temp_min_c: self.main.temp_min,
            temp_max_c: self.main.temp_max,
            humidity_pct: self.main.humidity,
            pressure_hpa: self.main.pressure,
            visibility_m: self.visibility,
            wind_speed_ms: self.wind.speed,
            wind_gust_ms: self.wind.gust,
            description: weather.description.clone(),
            main_category: weather.main.clone(),
        })
    }
}

/// Parse the feed into typed samples. Entries with an unreadable timestamp
/// cannot be placed on a day and are dropped.
fn forecast_samples(list: &[RawSample]) -> Result<Vec<ForecastSample>, FetchCause> {
    let mut samples = Vec::with_capacity(list.len());
    for raw in list {
        let timestamp = match NaiveDateTime::parse_from_str(&raw.dt_txt, FEED_TIMESTAMP_FORMAT) {
            Ok(ts) => ts,
            Err(e) => {
                tracing::warn!("Dropping forecast sample with timestamp {:?}: {}", raw.dt_txt, e);
                continue;
            }
        };
        samples.push(ForecastSample {
            timestamp,
            conditions: raw.fields.to_conditions()?,
        });
    }
    Ok(samples)
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: String,
    api_key: String,
    options: NormalizeOptions,
}

impl WeatherProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            options: NormalizeOptions::default(),
        })
    }

    /// Replace the daily selection settings.
    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn normalize_options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Current conditions and up to five daily summaries for `city`.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current_and_forecast(
        &self,
        city: &str,
    ) -> Result<WeatherSnapshot, WeatherFetchError> {
        let response: ForecastResponse = self.get_json("forecast", city).await?;
        let fail = |cause| WeatherFetchError::new(city, cause);

        let current = response
            .list
            .get(CURRENT_SAMPLE_OFFSET)
            .ok_or_else(|| {
                fail(FetchCause::Parse(format!(
                    "forecast feed has {} samples, expected more than {}",
                    response.list.len(),
                    CURRENT_SAMPLE_OFFSET
                )))
            })?
            .fields
            .to_conditions()
            .map_err(fail)?;

        let samples = forecast_samples(&response.list).map_err(fail)?;
        let forecast = normalize(&samples, &self.options);

        tracing::info!(
            "Fetched forecast for {} ({} samples, {} days)",
            response.city.name,
            response.list.len(),
            forecast.len()
        );

        Ok(WeatherSnapshot {
            location: Location {
                name: response.city.name,
                country_code: response.city.country,
            },
            current,
            forecast,
        })
    }

    /// Present-moment conditions for `city`. The returned location carries
    /// the provider's spelling of the name.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_current_only(&self, city: &str) -> Result<CityWeather, WeatherFetchError> {
        let response: CurrentResponse = self.get_json("weather", city).await?;
        let current = response
            .fields
            .to_conditions()
            .map_err(|cause| WeatherFetchError::new(city, cause))?;

        Ok(CityWeather {
            location: Location {
                name: response.name,
                country_code: response.sys.country,
            },
            current,
        })
    }

    /// Current conditions for every city, fetched concurrently.
    pub async fn fetch_all_saved(
        &self,
        cities: &[String],
        mode: BatchMode,
    ) -> Result<BatchWeatherResult, BatchFetchError> {
        fetch_all_with(cities, mode, |city| async move {
            self.fetch_current_only(&city).await
        })
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        city: &str,
    ) -> Result<T, WeatherFetchError> {
        if city.trim().is_empty() {
            return Err(WeatherFetchError::new(city, FetchCause::EmptyCity));
        }

        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", UNITS)])
            .send()
            .await
            .map_err(|e| WeatherFetchError::new(city, FetchCause::Network(e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|body| body.message)
                .unwrap_or(text);
            tracing::debug!("Weather provider returned {} for {}: {}", status, city, message);
            return Err(WeatherFetchError::new(
                city,
                FetchCause::Status {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherFetchError::new(city, FetchCause::Parse(e.to_string())))
    }
}
