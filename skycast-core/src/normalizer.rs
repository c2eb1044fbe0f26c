use std::sync::Arc;

use crate::{
    error::Result,
    icons::ConditionIcons,
    model::WeatherReport,
    provider::{RawWeatherPayload, openweather, weatherapi},
    units::UnitSystem,
};

/// Turns raw provider JSON into a [`WeatherReport`].
///
/// Pure and synchronous: no clock, no I/O. The icon table is injected and
/// shared read-only.
#[derive(Debug, Clone)]
pub struct Normalizer {
    icons: Arc<ConditionIcons>,
}

impl Normalizer {
    pub fn new(icons: Arc<ConditionIcons>) -> Self {
        Self { icons }
    }

    pub fn normalize(
        &self,
        payload: &RawWeatherPayload,
        units: UnitSystem,
    ) -> Result<WeatherReport> {
        match payload {
            RawWeatherPayload::WeatherApi(doc) => weatherapi::normalize(doc, units, &self.icons),
            RawWeatherPayload::OpenWeather { current, forecast } => {
                openweather::normalize(current, forecast.as_ref(), units, &self.icons)
            }
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(Arc::new(ConditionIcons::standard()))
    }
}
