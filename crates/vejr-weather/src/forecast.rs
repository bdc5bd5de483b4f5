//! Daily forecast selection.
//!
//! The provider's forecast feed holds a sample every three hours for about
//! five days. A day is represented by its sample at the target hour (noon
//! by default); nothing is averaged or interpolated.

use chrono::{Locale, NaiveDate, NaiveTime};

use crate::types::{ForecastDay, ForecastSample};

/// Maximum number of days returned by [`normalize`].
pub const FORECAST_DAYS: usize = 5;

/// Long date label, e.g. "fredag 28. juni 2024" for `da_DK`.
pub const DEFAULT_LABEL_FORMAT: &str = "%A %-d. %B %Y";

/// Timestamp layout of the provider's `dt_txt` field.
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Settings for selecting and labelling daily samples
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    pub target_hour: NaiveTime,
    pub locale: Locale,
    pub label_format: String,
}

impl NormalizeOptions {
    pub fn new(target_hour: NaiveTime, locale: Locale) -> Self {
        Self {
            target_hour,
            locale,
            label_format: DEFAULT_LABEL_FORMAT.to_string(),
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default();
        Self::new(noon, Locale::da_DK)
    }
}

/// Reduce a chronological feed to at most [`FORECAST_DAYS`] daily summaries.
///
/// Only samples whose time of day equals `options.target_hour` are kept, in
/// feed order. A short feed, or a day without a sample at the target hour,
/// yields fewer entries; an empty feed yields an empty vector.
pub fn normalize(samples: &[ForecastSample], options: &NormalizeOptions) -> Vec<ForecastDay> {
    let mut days: Vec<ForecastDay> = Vec::with_capacity(FORECAST_DAYS);

    for sample in samples
        .iter()
        .filter(|s| s.timestamp.time() == options.target_hour)
    {
        if days.len() == FORECAST_DAYS {
            break;
        }

        let date = sample.timestamp.date();
        // one entry per calendar day
        if days.last().is_some_and(|day| day.date == date) {
            continue;
        }

        days.push(ForecastDay {
            date,
            formatted_label: format_day_label(date, options),
            conditions: sample.conditions.clone(),
        });
    }

    tracing::debug!(
        "Normalized {} samples into {} forecast days",
        samples.len(),
        days.len()
    );
    days
}

/// Locale-formatted long date for a forecast card title.
pub fn format_day_label(date: NaiveDate, options: &NormalizeOptions) -> String {
    date.and_time(NaiveTime::default())
        .and_utc()
        .format_localized(&options.label_format, options.locale)
        .to_string()
}
