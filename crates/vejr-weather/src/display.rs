//! Text shown on weather cards.
//!
//! Stored values stay unrounded; rounding is applied here only.

use serde::{Deserialize, Serialize};

use crate::types::{CurrentConditions, WeatherCategory};

const FLAG_BASE_URL: &str = "https://flagsapi.com";

/// Round to the nearest integer with halves going up (`-2.5` becomes `-2`).
pub fn round_for_display(value: f64) -> i64 {
    // `value + 0.5` can itself round up, so compare against the floor instead
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

pub fn visibility_km(visibility_m: f64) -> f64 {
    visibility_m / 1000.0
}

/// Flag image for an ISO 3166 alpha-2 country code.
pub fn flag_url(country_code: &str) -> String {
    format!(
        "{}/{}/shiny/64.png",
        FLAG_BASE_URL,
        country_code.to_ascii_uppercase()
    )
}

/// Card text for one set of conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionsSummary {
    pub category: WeatherCategory,
    pub icon: String,
    /// Always visible: temperature, high/low and the short label
    pub headline: Vec<String>,
    /// Shown when the details panel is open
    pub details: Vec<String>,
}

impl ConditionsSummary {
    pub fn from_conditions(conditions: &CurrentConditions) -> Self {
        let category = conditions.category();

        let headline = vec![
            format!("Temperatur: {}°C", round_for_display(conditions.temperature_c)),
            format!(
                "H: {}°C - L: {}°C",
                round_for_display(conditions.temp_max_c),
                round_for_display(conditions.temp_min_c)
            ),
            conditions.main_category.clone(),
        ];

        let mut details = vec![
            format!("Føles som: {}°C", round_for_display(conditions.feels_like_c)),
            format!("Luftfugtighed: {}%", conditions.humidity_pct),
        ];
        if let Some(visibility) = conditions.visibility_m {
            details.push(format!("Sigtbarhed: {}km", visibility_km(visibility)));
        }
        details.push(format!("Vind: {}m/s", conditions.wind_speed_ms));
        if let Some(gust) = conditions.wind_gust_ms {
            details.push(format!("Vindstød: {}m/s", gust));
        }
        details.push(format!("Lufttryk: {}hPa", conditions.pressure_hpa));

        Self {
            category,
            icon: category.icon_name().to_string(),
            headline,
            details,
        }
    }
}
