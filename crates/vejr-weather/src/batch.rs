//! Concurrent weather lookup for the saved-cities screen.
//!
//! Every city is dispatched at once and the batch settles only after all
//! calls have finished; there is no early exit on the first failure.

use std::collections::BTreeMap;
use std::future::Future;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::types::{BatchFetchError, CityWeather, WeatherFetchError};

/// How a batch treats individual failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Each city succeeds or fails on its own
    #[default]
    Isolated,
    /// Any failing city fails the whole batch
    AllOrNothing,
}

/// Per-city outcome of a batch fetch.
///
/// Successes are keyed by the city name the provider returned, which may
/// differ in spelling or case from the saved name. Failures are keyed by the
/// requested name.
#[derive(Debug, Default)]
pub struct BatchWeatherResult {
    entries: BTreeMap<String, Result<CityWeather, WeatherFetchError>>,
}

impl BatchWeatherResult {
    pub fn get(&self, city: &str) -> Option<&Result<CityWeather, WeatherFetchError>> {
        self.entries.get(city)
    }

    pub fn weather(&self, city: &str) -> Option<&CityWeather> {
        self.entries.get(city).and_then(|r| r.as_ref().ok())
    }

    pub fn failure(&self, city: &str) -> Option<&WeatherFetchError> {
        self.entries.get(city).and_then(|r| r.as_ref().err())
    }

    pub fn successes(&self) -> impl Iterator<Item = (&str, &CityWeather)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().ok().map(|w| (k.as_str(), w)))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &WeatherFetchError)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| v.as_ref().err().map(|e| (k.as_str(), e)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Run `fetch` for every city concurrently and assemble the outcomes.
///
/// In [`BatchMode::AllOrNothing`] the first failure in input order is
/// reported together with the number of failed cities. On a key collision
/// the later input wins and the dropped outcome is logged.
pub async fn fetch_all_with<F, Fut>(
    cities: &[String],
    mode: BatchMode,
    fetch: F,
) -> Result<BatchWeatherResult, BatchFetchError>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<CityWeather, WeatherFetchError>>,
{
    let total = cities.len();
    tracing::debug!("Fetching weather for {} saved cities ({:?})", total, mode);

    let outcomes = join_all(cities.iter().map(|city| fetch(city.clone()))).await;

    if mode == BatchMode::AllOrNothing {
        let mut successes = Vec::with_capacity(total);
        let mut errors = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(weather) => successes.push(weather),
                Err(e) => errors.push(e),
            }
        }

        let failed = errors.len();
        if let Some(first) = errors.into_iter().next() {
            tracing::warn!("Batch failed: {} of {} cities", failed, total);
            return Err(BatchFetchError {
                failed,
                total,
                first,
            });
        }

        let entries = successes
            .into_iter()
            .map(|w| (w.location.name.clone(), Ok(w)))
            .collect();
        return Ok(BatchWeatherResult { entries });
    }

    let mut entries = BTreeMap::new();
    for (requested, outcome) in cities.iter().zip(outcomes) {
        let key = match &outcome {
            Ok(weather) => weather.location.name.clone(),
            Err(e) => {
                tracing::warn!("Weather for {} failed: {}", requested, e);
                requested.clone()
            }
        };
        if let Some(dropped) = entries.insert(key.clone(), outcome) {
            tracing::warn!(
                "{} resolved to {}, which is already in the batch; replacing earlier {} outcome",
                requested,
                key,
                if dropped.is_ok() { "successful" } else { "failed" }
            );
        }
    }

    let result = BatchWeatherResult { entries };
    tracing::info!(
        "Batch done: {} succeeded, {} failed",
        result.successes().count(),
        result.failures().count()
    );
    Ok(result)
}
