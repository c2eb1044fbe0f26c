use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::{collections::BTreeMap, fmt};

use crate::{
    aqi::AirQualityCategory,
    forecast::{self, HourlyWindow},
    icons::{ConditionIcons, Icon},
    provider::ProviderId,
    units::UnitSystem,
};

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub location: String,
    pub units: UnitSystem,
    /// Wall-clock hour (0..=23) the hourly window starts at; `None` means now.
    pub reference_hour: Option<u32>,
}

impl WeatherRequest {
    pub fn new(location: impl Into<String>, units: UnitSystem) -> Self {
        Self { location: location.into(), units, reference_hour: None }
    }

    pub fn at_hour(mut self, hour: u32) -> Self {
        self.reference_hour = Some(hour);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Condition {
    pub text: String,
    pub icon: Icon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Condition {
    /// Attach the table's glyph for `text`.
    pub fn resolve(text: impl Into<String>, icons: &ConditionIcons) -> Self {
        let text = text.into();
        Self { icon: icons.resolve(&text), text, description: None, image_url: None }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description.filter(|d| !d.is_empty());
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub name: String,
    pub region: Option<String>,
    pub country: Option<String>,
    pub local_time: Option<NaiveDateTime>,
}

impl Location {
    /// "name, region, country", skipping empty parts.
    pub fn display_name(&self) -> String {
        std::iter::once(self.name.as_str())
            .chain(self.region.as_deref())
            .chain(self.country.as_deref())
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pollutant {
    CarbonMonoxide,
    Ozone,
    NitrogenDioxide,
    SulphurDioxide,
    Pm2_5,
    Pm10,
}

impl Pollutant {
    pub fn label(&self) -> &'static str {
        match self {
            Pollutant::CarbonMonoxide => "Carbon Monoxide (CO)",
            Pollutant::Ozone => "Ozone (O₃)",
            Pollutant::NitrogenDioxide => "Nitrogen dioxide (NO₂)",
            Pollutant::SulphurDioxide => "Sulfur dioxide (SO₂)",
            Pollutant::Pm2_5 => "Fine particles (PM2.5)",
            Pollutant::Pm10 => "Particles (PM10)",
        }
    }
}

impl fmt::Display for Pollutant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Present only when the provider sent an air-quality block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirQuality {
    /// Concentrations in μg/m³, rounded to two decimals.
    pub pollutants: BTreeMap<Pollutant, f64>,
    /// `None` when the index was present but not an integer.
    pub epa_index: Option<u8>,
    pub category: AirQualityCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    /// Local wall-clock time at the location.
    pub observed_at: NaiveDateTime,
    pub temperature: f64,
    /// Falls back to `temperature` when the provider omits it.
    pub feels_like: f64,
    pub humidity: Option<u8>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<String>,
    pub wind_gust: Option<f64>,
    pub uv_index: Option<f64>,
    pub visibility: Option<f64>,
    pub precipitation: f64,
    pub condition: Condition,
    pub air_quality: Option<AirQuality>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    pub time: NaiveDateTime,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: Condition,
    pub precipitation: f64,
    pub wind_speed: Option<f64>,
    pub humidity: Option<u8>,
    pub chance_of_rain: Option<u8>,
}

impl HourlyForecast {
    pub fn hour(&self) -> u32 {
        self.time.hour()
    }

    pub fn date(&self) -> NaiveDate {
        self.time.date()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub condition: Condition,
    pub max_temp: f64,
    pub min_temp: f64,
    pub total_precipitation: f64,
    pub chance_of_rain: Option<u8>,
    pub hours: Vec<HourlyForecast>,
}

impl DailyForecast {
    /// First record seen for the day.
    pub fn representative(&self) -> Option<&HourlyForecast> {
        self.hours.first()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub headline: String,
    pub description: String,
    pub event: String,
    pub severity: Option<String>,
    pub instruction: Option<String>,
    pub effective: Option<DateTime<FixedOffset>>,
    pub expires: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Forecast {
    Available { days: Vec<DailyForecast> },
    /// Current conditions were fetched but the forecast was not.
    Unavailable { reason: String },
}

impl Forecast {
    pub fn days(&self) -> &[DailyForecast] {
        match self {
            Forecast::Available { days } => days,
            Forecast::Unavailable { .. } => &[],
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Forecast::Available { .. })
    }
}

/// Normalized, unit-resolved record set for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub provider: ProviderId,
    pub units: UnitSystem,
    pub location: Location,
    pub current: CurrentConditions,
    pub forecast: Forecast,
    pub alerts: Vec<Alert>,
}

impl WeatherReport {
    pub fn today(&self) -> Option<&DailyForecast> {
        self.forecast.days().first()
    }

    /// Up to twelve of today's hours starting at `reference_hour`.
    pub fn hourly_window(&self, reference_hour: u32) -> HourlyWindow {
        match self.today() {
            Some(day) if !day.hours.is_empty() => {
                HourlyWindow::Hours(forecast::window_hours(&day.hours, reference_hour))
            }
            _ => HourlyWindow::Unavailable,
        }
    }

    /// Day cards: at most five days, in order.
    pub fn daily_summary(&self) -> &[DailyForecast] {
        forecast::summary_days(self.forecast.days())
    }

    /// The first `count` hourly records across all forecast days.
    pub fn upcoming_hours(&self, count: usize) -> Vec<&HourlyForecast> {
        self.forecast.days().iter().flat_map(|d| d.hours.iter()).take(count).collect()
    }
}

/// A report plus the hourly window resolved for the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub report: WeatherReport,
    pub reference_hour: u32,
    pub hourly: HourlyWindow,
}
