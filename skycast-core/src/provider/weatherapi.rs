use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::{
    aqi,
    error::{FetchError, Result, WeatherError},
    icons::ConditionIcons,
    model::{
        AirQuality, Alert, Condition, CurrentConditions, DailyForecast, Forecast, HourlyForecast,
        Location, Pollutant, WeatherReport,
    },
    provider::{ProviderId, RawWeatherPayload, WeatherFetcher, get_json, http_client},
    units::UnitSystem,
};

const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";
const FORECAST_DAYS: &str = "3";
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Index used when the air-quality block carries no `us-epa-index`.
const DEFAULT_EPA_INDEX: u8 = 1;

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> anyhow::Result<Self> {
        Ok(Self { api_key, base_url: DEFAULT_BASE_URL.to_string(), http: http_client()? })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WeatherFetcher for WeatherApiClient {
    /// Both unit families are present in every response, so `units` does not
    /// change the request.
    async fn fetch(
        &self,
        location: &str,
        _units: UnitSystem,
    ) -> std::result::Result<RawWeatherPayload, FetchError> {
        let url = format!("{}/forecast.json", self.base_url);

        let doc = get_json(
            &self.http,
            ProviderId::WeatherApi,
            &url,
            &[
                ("key", self.api_key.as_str()),
                ("q", location),
                ("days", FORECAST_DAYS),
                ("aqi", "yes"),
                ("alerts", "yes"),
            ],
        )
        .await?;

        Ok(RawWeatherPayload::WeatherApi(doc))
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    region: Option<String>,
    country: Option<String>,
    localtime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaAirQuality {
    co: Option<f64>,
    o3: Option<f64>,
    no2: Option<f64>,
    so2: Option<f64>,
    pm2_5: Option<f64>,
    pm10: Option<f64>,
    #[serde(rename = "us-epa-index")]
    us_epa_index: Option<Value>,
}

/// Paired unit fields are all optional here; only the twin selected by the
/// request's units is ever required, and only for temperature.
#[derive(Debug, Deserialize)]
struct WaCurrent {
    last_updated: String,
    temp_c: Option<f64>,
    temp_f: Option<f64>,
    feelslike_c: Option<f64>,
    feelslike_f: Option<f64>,
    humidity: Option<u8>,
    pressure_mb: Option<f64>,
    pressure_in: Option<f64>,
    wind_kph: Option<f64>,
    wind_mph: Option<f64>,
    wind_dir: Option<String>,
    gust_kph: Option<f64>,
    gust_mph: Option<f64>,
    uv: Option<f64>,
    vis_km: Option<f64>,
    vis_miles: Option<f64>,
    precip_mm: Option<f64>,
    precip_in: Option<f64>,
    condition: WaCondition,
    air_quality: Option<WaAirQuality>,
}

#[derive(Debug, Deserialize)]
struct WaDay {
    maxtemp_c: Option<f64>,
    maxtemp_f: Option<f64>,
    mintemp_c: Option<f64>,
    mintemp_f: Option<f64>,
    totalprecip_mm: Option<f64>,
    totalprecip_in: Option<f64>,
    daily_chance_of_rain: Option<Value>,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaHour {
    time: String,
    temp_c: Option<f64>,
    temp_f: Option<f64>,
    feelslike_c: Option<f64>,
    feelslike_f: Option<f64>,
    condition: WaCondition,
    precip_mm: Option<f64>,
    precip_in: Option<f64>,
    wind_kph: Option<f64>,
    wind_mph: Option<f64>,
    humidity: Option<u8>,
    chance_of_rain: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    date: String,
    day: WaDay,
    /// Kept raw so one bad record is dropped instead of failing the day.
    #[serde(default)]
    hour: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    #[serde(default)]
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct WaAlert {
    headline: Option<String>,
    desc: Option<String>,
    event: Option<String>,
    severity: Option<String>,
    instruction: Option<String>,
    effective: Option<String>,
    expires: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WaAlerts {
    #[serde(default)]
    alert: Vec<WaAlert>,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
    forecast: Option<WaForecast>,
    alerts: Option<WaAlerts>,
}

/// Normalize a `forecast.json` document. Paired `_c`/`_f`, `_kph`/`_mph`
/// fields are selected by `units`; nothing is converted.
pub(crate) fn normalize(
    doc: &Value,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<WeatherReport> {
    let parsed = WaResponse::deserialize(doc).map_err(|e| malformed(e.to_string()))?;

    let location = Location {
        local_time: parsed
            .location
            .localtime
            .as_deref()
            .and_then(|t| NaiveDateTime::parse_from_str(t, LOCAL_TIME_FORMAT).ok()),
        name: parsed.location.name,
        region: parsed.location.region.filter(|r| !r.is_empty()),
        country: parsed.location.country.filter(|c| !c.is_empty()),
    };

    let current = current_conditions(parsed.current, units, icons)?;

    let forecast = match parsed.forecast {
        Some(f) => Forecast::Available {
            days: f
                .forecastday
                .into_iter()
                .map(|d| daily_forecast(d, units, icons))
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .flatten()
                .collect(),
        },
        None => Forecast::Unavailable { reason: "response has no forecast block".to_string() },
    };

    let alerts = parsed
        .alerts
        .map(|a| a.alert.into_iter().map(alert).collect())
        .unwrap_or_default();

    Ok(WeatherReport {
        provider: ProviderId::WeatherApi,
        units,
        location,
        current,
        forecast,
        alerts,
    })
}

fn current_conditions(
    c: WaCurrent,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<CurrentConditions> {
    let temperature = units
        .pick(c.temp_c, c.temp_f)
        .ok_or_else(|| malformed(format!("missing field `{}`", units.pick("temp_c", "temp_f"))))?;

    Ok(CurrentConditions {
        observed_at: parse_local("current.last_updated", &c.last_updated)?,
        temperature,
        feels_like: units.pick(c.feelslike_c, c.feelslike_f).unwrap_or(temperature),
        humidity: c.humidity,
        pressure: units.pick(c.pressure_mb, c.pressure_in),
        wind_speed: units.pick(c.wind_kph, c.wind_mph),
        wind_direction: c.wind_dir.filter(|d| !d.is_empty()),
        wind_gust: units.pick(c.gust_kph, c.gust_mph),
        uv_index: c.uv,
        visibility: units.pick(c.vis_km, c.vis_miles),
        precipitation: units.pick(c.precip_mm, c.precip_in).unwrap_or(0.0),
        condition: condition(c.condition, icons),
        air_quality: c.air_quality.map(air_quality),
    })
}

/// `Ok(None)` drops a day that has neither its own extremes nor any usable
/// hourly record to derive them from.
fn daily_forecast(
    d: WaForecastDay,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> Result<Option<DailyForecast>> {
    let date = NaiveDate::parse_from_str(&d.date, "%Y-%m-%d")
        .map_err(|e| malformed(format!("forecastday.date '{}': {e}", d.date)))?;

    let mut hours = Vec::with_capacity(d.hour.len());
    for (index, raw) in d.hour.iter().enumerate() {
        match hourly_forecast(raw, units, icons) {
            Ok(hour) => hours.push(hour),
            Err(reason) => {
                tracing::warn!(%date, index, %reason, "Skipping unusable hourly record");
            }
        }
    }

    let max_temp = units
        .pick(d.day.maxtemp_c, d.day.maxtemp_f)
        .or_else(|| hours.iter().map(|h| h.temperature).reduce(f64::max));
    let min_temp = units
        .pick(d.day.mintemp_c, d.day.mintemp_f)
        .or_else(|| hours.iter().map(|h| h.temperature).reduce(f64::min));

    let (Some(max_temp), Some(min_temp)) = (max_temp, min_temp) else {
        tracing::warn!(%date, "Skipping forecast day without temperatures");
        return Ok(None);
    };

    let total_precipitation = units
        .pick(d.day.totalprecip_mm, d.day.totalprecip_in)
        .unwrap_or_else(|| hours.iter().map(|h| h.precipitation).sum());

    Ok(Some(DailyForecast {
        date,
        condition: condition(d.day.condition, icons),
        max_temp,
        min_temp,
        total_precipitation,
        chance_of_rain: percent(d.day.daily_chance_of_rain.as_ref()),
        hours,
    }))
}

/// One hourly record. Time, condition text and the selected temperature are
/// required; everything else degrades.
fn hourly_forecast(
    raw: &Value,
    units: UnitSystem,
    icons: &ConditionIcons,
) -> std::result::Result<HourlyForecast, String> {
    let h = WaHour::deserialize(raw).map_err(|e| e.to_string())?;
    let time = NaiveDateTime::parse_from_str(&h.time, LOCAL_TIME_FORMAT)
        .map_err(|e| format!("hour.time '{}': {e}", h.time))?;
    let temperature = units
        .pick(h.temp_c, h.temp_f)
        .ok_or_else(|| format!("missing field `{}`", units.pick("temp_c", "temp_f")))?;

    Ok(HourlyForecast {
        time,
        temperature,
        feels_like: units.pick(h.feelslike_c, h.feelslike_f).unwrap_or(temperature),
        condition: condition(h.condition, icons),
        precipitation: units.pick(h.precip_mm, h.precip_in).unwrap_or(0.0),
        wind_speed: units.pick(h.wind_kph, h.wind_mph),
        humidity: h.humidity,
        chance_of_rain: percent(h.chance_of_rain.as_ref()),
    })
}

fn condition(c: WaCondition, icons: &ConditionIcons) -> Condition {
    // icons come protocol-relative: //cdn.weatherapi.com/...
    let image_url = c.icon.filter(|i| !i.is_empty()).map(|icon| {
        if icon.starts_with("//") { format!("https:{icon}") } else { icon }
    });
    Condition::resolve(c.text, icons).with_image_url(image_url)
}

fn air_quality(aq: WaAirQuality) -> AirQuality {
    let pollutants: BTreeMap<Pollutant, f64> = [
        (Pollutant::CarbonMonoxide, aq.co),
        (Pollutant::Ozone, aq.o3),
        (Pollutant::NitrogenDioxide, aq.no2),
        (Pollutant::SulphurDioxide, aq.so2),
        (Pollutant::Pm2_5, aq.pm2_5),
        (Pollutant::Pm10, aq.pm10),
    ]
    .into_iter()
    .filter_map(|(p, v)| v.map(|v| (p, (v * 100.0).round() / 100.0)))
    .collect();

    let epa_index = match aq.us_epa_index {
        None => Some(DEFAULT_EPA_INDEX),
        Some(v) => integer_index(&v),
    };

    let category = match epa_index {
        Some(index) => aqi::categorize(index),
        None => {
            tracing::debug!("Unparseable us-epa-index; category unknown");
            aqi::SeverityBand::Unknown.into()
        }
    };

    AirQuality { pollutants, epa_index, category }
}

/// Integral JSON number (`3` or `3.0`) that fits in a u8.
fn integer_index(value: &Value) -> Option<u8> {
    let n = value.as_f64()?;
    if n.fract() != 0.0 || !(0.0..=f64::from(u8::MAX)).contains(&n) {
        return None;
    }
    Some(n as u8)
}

/// Percentages arrive as numbers or, in older responses, numeric strings.
fn percent(value: Option<&Value>) -> Option<u8> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Some(n.round().clamp(0.0, 100.0) as u8)
}

fn alert(a: WaAlert) -> Alert {
    Alert {
        headline: a.headline.unwrap_or_default(),
        description: a.desc.unwrap_or_default(),
        event: a.event.unwrap_or_default(),
        severity: a.severity.filter(|s| !s.is_empty()),
        instruction: a.instruction.filter(|s| !s.is_empty()),
        effective: a.effective.as_deref().and_then(parse_alert_time),
        expires: a.expires.as_deref().and_then(parse_alert_time),
    }
}

fn parse_alert_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| tracing::debug!(value, error = %e, "Unparseable alert timestamp"))
        .ok()
}

fn parse_local(field: &str, value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, LOCAL_TIME_FORMAT)
        .map_err(|e| malformed(format!("{field} '{value}': {e}")))
}

fn malformed(reason: impl Into<String>) -> WeatherError {
    WeatherError::malformed(ProviderId::WeatherApi, reason)
}
