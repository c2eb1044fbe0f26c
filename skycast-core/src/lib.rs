//! Core library for the `skycast` weather dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Fetch collaborators for WeatherAPI.com and OpenWeather, plus a TTL cache
//! - The forecast normalizer: schema adapters, unit conversion, icon lookup,
//!   hourly windowing, daily aggregation and air-quality categories
//! - Shared, presentation-ready records
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod aqi;
pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod icons;
pub mod model;
pub mod normalizer;
pub mod provider;
pub mod service;
pub mod units;

#[cfg(test)]
mod testdata;

pub use cache::CachingFetcher;
pub use config::{Config, ProviderConfig};
pub use error::{FetchError, WeatherError};
pub use forecast::HourlyWindow;
pub use icons::{ConditionIcons, Icon};
pub use model::{
    AirQuality, Alert, Condition, CurrentConditions, DailyForecast, Dashboard, Forecast,
    HourlyForecast, Location, Pollutant, WeatherReport, WeatherRequest,
};
pub use normalizer::Normalizer;
pub use provider::{ProviderId, RawWeatherPayload, WeatherFetcher};
pub use service::WeatherService;
pub use units::UnitSystem;
