use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{FetchError, Result, WeatherError},
    forecast::{DayBucket, group_by_day},
    icons::ConditionIcons,
    model::{
        Condition, CurrentConditions, DailyForecast, Forecast, HourlyForecast, Location,
        WeatherReport,
    },
    provider::{ProviderId, RawWeatherPayload, WeatherFetcher, get_json, http_client},
    units::{UnitSystem, direction},
};

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const ICON_URL_BASE: &str = "https://openweathermap.org/img/wn";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: http_client()? })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, endpoint: &str, location: &str) -> std::result::Result<Value, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        get_json(
            &self.http,
            ProviderId::OpenWeather,
            &url,
            &[("q", location), ("appid", self.api_key.as_str()), ("units", "metric")],
        )
        .await
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    /// Always requests metric data; imperial values are derived during
    /// normalization. A failed forecast request after a successful current
    /// request is kept in the payload instead of failing the fetch.
    async fn fetch(
        &self,
        location: &str,
        _units: UnitSystem,
    ) -> std::result::Result<RawWeatherPayload, FetchError> {
        let current = self.get("weather", location).await?;

        let forecast = self.get("forecast", location).await;
        if let Err(e) = &forecast {
            tracing::warn!(location, error = %e, "OpenWeather forecast unavailable");
        }

        Ok(RawWeatherPayload::OpenWeather { current, forecast })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    deg: Option<f64>,
    gust: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwVolume {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    timezone: Option<i64>,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    visibility: Option<f64>,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
    sys: Option<OwSys>,
}

#[derive(Debug, Deserialize)]
struct OwCity {
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    pop: Option<f64>,
    rain: Option<OwVolume>,
    snow: Option<OwVolume>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
    city: Option<OwCity>,
}

/// Normalize the current document and forecast outcome. Every value
/// arrives metric and is converted here when `units` is imperial.
pub(crate) fn normalize(
    current: &Value,
    forecast: std::result::Result<&Value, &FetchError>,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<WeatherReport> {
    let parsed = OwCurrentResponse::deserialize(current)
        .map_err(|e| malformed(format!("current: {e}")))?;
    let offset = parsed.timezone.unwrap_or(0);
    let observed_at = local_time("dt", parsed.dt, offset)?;

    let location = Location {
        name: parsed.name.clone(),
        region: None,
        country: parsed.sys.as_ref().and_then(|s| s.country.clone()).filter(|c| !c.is_empty()),
        local_time: Some(observed_at),
    };

    let precip_mm = volume(parsed.rain.as_ref(), parsed.snow.as_ref(), |v| v.one_hour);
    let current = CurrentConditions {
        observed_at,
        temperature: units.temperature_from_celsius(parsed.main.temp),
        feels_like: units.temperature_from_celsius(parsed.main.feels_like),
        humidity: Some(parsed.main.humidity),
        pressure: Some(units.pressure_from_hpa(parsed.main.pressure)),
        wind_speed: Some(units.speed_from_mps(parsed.wind.speed)),
        wind_direction: parsed.wind.deg.map(|d| direction::degree_to_compass(d).to_string()),
        wind_gust: parsed.wind.gust.map(|g| units.speed_from_mps(g)),
        uv_index: None,
        visibility: parsed.visibility.map(|v| units.distance_from_metres(v)),
        precipitation: units.precipitation_from_mm(precip_mm),
        condition: condition("weather", &parsed.weather, icons)?,
        air_quality: None,
    };

    let forecast = match forecast {
        Ok(doc) => Forecast::Available { days: forecast_days(doc, offset, units, icons)? },
        Err(e) => Forecast::Unavailable { reason: e.to_string() },
    };

    Ok(WeatherReport {
        provider: ProviderId::OpenWeather,
        units,
        location,
        current,
        forecast,
        alerts: Vec::new(),
    })
}

fn forecast_days(
    doc: &Value,
    fallback_offset: i64,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<Vec<DailyForecast>> {
    let parsed =
        OwForecastResponse::deserialize(doc).map_err(|e| malformed(format!("forecast: {e}")))?;
    let offset = parsed.city.and_then(|c| c.timezone).unwrap_or(fallback_offset);

    let hours = parsed
        .list
        .into_iter()
        .map(|entry| hourly_forecast(entry, offset, units, icons))
        .collect::<Result<Vec<_>>>()?;

    Ok(group_by_day(hours).into_iter().filter_map(daily_forecast).collect())
}

fn hourly_forecast(
    entry: OwForecastEntry,
    offset: i64,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<HourlyForecast> {
    let precip_mm = volume(entry.rain.as_ref(), entry.snow.as_ref(), |v| v.three_hours);
    Ok(HourlyForecast {
        time: local_time("list[].dt", entry.dt, offset)?,
        temperature: units.temperature_from_celsius(entry.main.temp),
        feels_like: units.temperature_from_celsius(entry.main.feels_like),
        condition: condition("list[].weather", &entry.weather, icons)?,
        precipitation: units.precipitation_from_mm(precip_mm),
        wind_speed: Some(units.speed_from_mps(entry.wind.speed)),
        humidity: Some(entry.main.humidity),
        chance_of_rain: entry.pop.map(|p| (p * 100.0).round().clamp(0.0, 100.0) as u8),
    })
}

/// Summarize one day: the first snapshot's condition, extremes and totals
/// across all of the day's snapshots.
fn daily_forecast(bucket: DayBucket) -> Option<DailyForecast> {
    let condition = bucket.representative()?.condition.clone();
    let temps = bucket.entries.iter().map(|h| h.temperature);

    Some(DailyForecast {
        date: bucket.date,
        condition,
        max_temp: temps.clone().fold(f64::NEG_INFINITY, f64::max),
        min_temp: temps.fold(f64::INFINITY, f64::min),
        total_precipitation: bucket.entries.iter().map(|h| h.precipitation).sum(),
        chance_of_rain: bucket.entries.iter().filter_map(|h| h.chance_of_rain).max(),
        hours: bucket.entries,
    })
}

fn condition(field: &str, weather: &[OwWeather], icons: &ConditionIcons) -> Result<Condition> {
    let w = weather.first().ok_or_else(|| malformed(format!("{field}: no condition entry")))?;
    Ok(Condition::resolve(w.main.clone(), icons)
        .with_description(w.description.clone())
        .with_image_url(w.icon.as_ref().map(|code| format!("{ICON_URL_BASE}/{code}@2x.png"))))
}

fn volume(
    rain: Option<&OwVolume>,
    snow: Option<&OwVolume>,
    pick: impl Fn(&OwVolume) -> Option<f64>,
) -> f64 {
    [rain, snow].into_iter().flatten().filter_map(&pick).sum()
}

/// Unix seconds to wall-clock time at the location.
fn local_time(field: &str, ts: i64, offset: i64) -> Result<NaiveDateTime> {
    ts.checked_add(offset)
        .and_then(|local| DateTime::from_timestamp(local, 0))
        .map(|dt| dt.naive_utc())
        .ok_or_else(|| malformed(format!("{field}: timestamp {ts} out of range")))
}

fn malformed(reason: impl Into<String>) -> WeatherError {
    WeatherError::malformed(ProviderId::OpenWeather, reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{forecast::SUMMARY_DAYS, testdata, units::temperature};
    use chrono::{NaiveDate, Timelike};

    fn icons() -> ConditionIcons {
        ConditionIcons::standard()
    }

    #[test]
    fn current_metric_converts_wind_and_visibility() {
        let current = testdata::openweather_current();
        let forecast = testdata::openweather_forecast(40);
        let report = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();

        let c = &report.current;
        assert_eq!(c.temperature, 20.0);
        assert_eq!(c.wind_speed, Some(18.0));
        assert_eq!(c.wind_gust, Some(28.8));
        assert_eq!(c.visibility, Some(10.0));
        assert_eq!(c.precipitation, 0.5);
        assert_eq!(c.pressure, Some(1012.0));
        assert_eq!(c.wind_direction.as_deref(), Some("WSW"));
        assert!(c.uv_index.is_none());
        assert!(c.air_quality.is_none());
        assert_eq!(c.observed_at.hour(), 13);
        assert_eq!(c.observed_at.minute(), 30);

        assert_eq!(c.condition.text, "Clouds");
        assert_eq!(c.condition.icon.as_str(), "☁️");
        assert_eq!(c.condition.description.as_deref(), Some("broken clouds"));
        assert_eq!(
            c.condition.image_url.as_deref(),
            Some("https://openweathermap.org/img/wn/04d@2x.png")
        );
        assert_eq!(report.location.display_name(), "London, GB");
        assert_eq!(report.location.local_time, Some(c.observed_at));
    }

    #[test]
    fn imperial_uses_algebraic_conversion() {
        let current = testdata::openweather_current();
        let forecast = testdata::openweather_forecast(40);
        let report = normalize(&current, Ok(&forecast), UnitSystem::Imperial, &icons()).unwrap();

        let c = &report.current;
        assert_eq!(c.temperature, 68.0);
        assert!((c.wind_speed.unwrap() - 11.184681).abs() < 1e-4);
        assert!((c.visibility.unwrap() - 6.213712).abs() < 1e-4);
        assert!((c.precipitation - 0.019685).abs() < 1e-4);
    }

    #[test]
    fn imperial_converts_back_to_metric() {
        let current = testdata::openweather_current();
        let forecast = testdata::openweather_forecast(40);
        let metric = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();
        let imperial = normalize(&current, Ok(&forecast), UnitSystem::Imperial, &icons()).unwrap();

        let back = temperature::f2c(imperial.current.temperature);
        assert!((back - metric.current.temperature).abs() < 1e-6);

        let pairs = metric.forecast.days().iter().zip(imperial.forecast.days());
        for (m, i) in pairs {
            for (mh, ih) in m.hours.iter().zip(&i.hours) {
                assert!((temperature::f2c(ih.temperature) - mh.temperature).abs() < 1e-6);
                assert!((temperature::f2c(ih.feels_like) - mh.feels_like).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn forty_snapshots_aggregate_into_five_days() {
        let current = testdata::openweather_current();
        let forecast = testdata::openweather_forecast(40);
        let report = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();

        let days = report.forecast.days();
        assert_eq!(days.len(), 5);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
        for (i, day) in days.iter().enumerate() {
            assert_eq!(day.hours.len(), 8, "day {i}");
            let rep = day.representative().unwrap();
            assert_eq!(rep.hour(), 0);
            assert_eq!(rep.temperature, 10.0 + (i * 8) as f64);
        }

        let summary = report.daily_summary();
        assert_eq!(summary.len(), SUMMARY_DAYS);
    }

    #[test]
    fn daily_record_summarizes_its_snapshots() {
        let current = testdata::openweather_current();
        let forecast = testdata::openweather_forecast(40);
        let report = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();

        let day = &report.forecast.days()[0];
        assert_eq!(day.condition.text, "Clear");
        assert_eq!(day.min_temp, 10.0);
        assert_eq!(day.max_temp, 17.0);
        // entries 1, 3, 5, 7 carry 1.5 mm
        assert_eq!(day.total_precipitation, 6.0);
        assert_eq!(day.chance_of_rain, Some(80));
        assert_eq!(day.hours[1].condition.text, "Rain");
        assert_eq!(day.hours[1].chance_of_rain, Some(20));
    }

    #[test]
    fn forecast_starting_mid_day_yields_six_buckets_five_in_summary() {
        let current = testdata::openweather_current();
        let mut forecast = testdata::openweather_forecast(44);
        let list = forecast["list"].as_array_mut().unwrap();
        list.drain(..4);

        let report = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();
        let days = report.forecast.days();
        assert_eq!(days.len(), 6);
        assert_eq!(days[0].hours.len(), 4);
        assert_eq!(days[0].representative().unwrap().hour(), 12);
        assert_eq!(days[5].hours.len(), 4);
        assert_eq!(report.daily_summary().len(), 5);
        assert_eq!(report.upcoming_hours(8).len(), 8);
    }

    #[test]
    fn forecast_fetch_failure_is_partial_success() {
        let current = testdata::openweather_current();
        let err = FetchError::Status {
            provider: ProviderId::OpenWeather,
            status: 502,
            message: "Bad Gateway".into(),
        };

        let report = normalize(&current, Err(&err), UnitSystem::Metric, &icons()).unwrap();
        assert_eq!(report.current.temperature, 20.0);
        match &report.forecast {
            Forecast::Unavailable { reason } => assert!(reason.contains("502")),
            other => panic!("expected unavailable forecast, got {other:?}"),
        }
        assert!(report.hourly_window(0).is_unavailable());
    }

    #[test]
    fn missing_temperature_is_malformed() {
        let mut current = testdata::openweather_current();
        current["main"].as_object_mut().unwrap().remove("temp");
        let forecast = testdata::openweather_forecast(8);

        let err =
            normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("temp"), "{err}");
    }

    #[test]
    fn empty_weather_list_is_malformed() {
        let mut current = testdata::openweather_current();
        current["weather"] = serde_json::json!([]);
        let forecast = testdata::openweather_forecast(8);

        let err = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap_err();
        assert!(err.to_string().contains("no condition entry"), "{err}");
    }

    #[test]
    fn malformed_forecast_document_fails_whole_request() {
        let current = testdata::openweather_current();
        let forecast = serde_json::json!({ "list": [{ "dt": "soon" }] });

        let err = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn missing_timezone_falls_back_to_utc() {
        let mut current = testdata::openweather_current();
        current.as_object_mut().unwrap().remove("timezone");
        let mut forecast = testdata::openweather_forecast(8);
        forecast["city"].as_object_mut().unwrap().remove("timezone");

        let report = normalize(&current, Ok(&forecast), UnitSystem::Metric, &icons()).unwrap();
        assert_eq!(report.current.observed_at.hour(), 12);
        // local midnight in UTC+1 is 23:00 the previous day in UTC
        let days = report.forecast.days();
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2024, 5, 5).unwrap());
        assert_eq!(days[0].hours.len(), 1);
    }
}
