//! Weather data for Vejr
//!
//! OpenWeatherMap client, daily forecast selection, batch lookup for saved
//! cities and default-city detection via IP geolocation.

pub mod batch;
pub mod display;
pub mod forecast;
pub mod location;
pub mod provider;
pub mod types;

pub use batch::{BatchMode, BatchWeatherResult};
pub use display::ConditionsSummary;
pub use forecast::{normalize, NormalizeOptions};
pub use location::IpLocator;
pub use provider::WeatherProvider;
pub use types::*;
