use crate::{
    Config, FetchError,
    provider::{openweather::OpenWeatherClient, weatherapi::WeatherApiClient},
    units::UnitSystem,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fmt::{self, Debug},
    str::FromStr,
    time::Duration,
};

pub mod openweather;
pub mod weatherapi;

const HTTP_TIMEOUT_SECS: u64 = 15;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Upstream weather service. The lowercase name is used on the command line,
/// in the config file and in JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// OpenWeather `/weather` + `/forecast` (metric, 3-hour steps).
    OpenWeather,
    /// WeatherAPI.com `forecast.json` (paired unit fields, hourly).
    WeatherApi,
}

impl ProviderId {
    pub const ALL: [ProviderId; 2] = [ProviderId::OpenWeather, ProviderId::WeatherApi];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::WeatherApi => "weatherapi",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|id| id.as_str()).collect();
                anyhow::anyhow!(
                    "Unknown provider '{s}'. Supported providers: {}.",
                    known.join(", ")
                )
            })
    }
}

/// Raw provider JSON, tagged by schema family.
#[derive(Debug, Clone)]
pub enum RawWeatherPayload {
    /// One `forecast.json` document: location, current, forecastday[] with
    /// nested hour[], optional air_quality and alerts.
    WeatherApi(Value),

    /// Separate current-weather document plus the outcome of the 5-day /
    /// 3-hour forecast request, which may have failed on its own.
    OpenWeather { current: Value, forecast: Result<Value, FetchError> },
}

impl RawWeatherPayload {
    pub fn provider(&self) -> ProviderId {
        match self {
            RawWeatherPayload::WeatherApi(_) => ProviderId::WeatherApi,
            RawWeatherPayload::OpenWeather { .. } => ProviderId::OpenWeather,
        }
    }

    /// False when part of the payload failed to fetch.
    pub fn is_complete(&self) -> bool {
        match self {
            RawWeatherPayload::WeatherApi(_) => true,
            RawWeatherPayload::OpenWeather { forecast, .. } => forecast.is_ok(),
        }
    }
}

/// Transport collaborator: turns a location into raw provider JSON.
///
/// Implementations own URLs, keys and HTTP concerns; normalization never
/// sees them.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(
        &self,
        location: &str,
        units: UnitSystem,
    ) -> Result<RawWeatherPayload, FetchError>;
}

#[async_trait]
impl<T: WeatherFetcher + ?Sized> WeatherFetcher for Box<T> {
    async fn fetch(
        &self,
        location: &str,
        units: UnitSystem,
    ) -> Result<RawWeatherPayload, FetchError> {
        (**self).fetch(location, units).await
    }
}

/// Construct a fetcher from config and explicit ProviderId.
pub fn fetcher_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let api_key = config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `skycast configure {id}` and enter your API key."
        )
    })?;

    let boxed: Box<dyn WeatherFetcher> = match id {
        ProviderId::OpenWeather => Box::new(OpenWeatherClient::new(api_key.to_owned())?),
        ProviderId::WeatherApi => Box::new(WeatherApiClient::new(api_key.to_owned())?),
    };

    Ok(boxed)
}

/// Construct the default fetcher from config, using `default_provider` field.
pub fn default_fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let id = config.default_provider_id()?;
    fetcher_from_config(id, config)
}

pub(crate) fn http_client() -> anyhow::Result<Client> {
    use anyhow::Context;

    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")
}

/// GET `url` and parse the body as JSON, mapping every failure to a
/// [`FetchError`] for `provider`.
pub(crate) async fn get_json(
    http: &Client,
    provider: ProviderId,
    url: &str,
    query: &[(&str, &str)],
) -> Result<Value, FetchError> {
    tracing::debug!(%provider, url, "Fetching weather data");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| FetchError::Transport { provider, message: e.to_string() })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| FetchError::Transport { provider, message: e.to_string() })?;

    if !status.is_success() {
        tracing::warn!(%provider, url, status = status.as_u16(), "Provider request failed");
        return Err(FetchError::Status {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| FetchError::InvalidBody { provider, message: e.to_string() })
}

/// Pull the provider's own error text out of an error body: OpenWeather
/// sends `{"message": ..}`, WeatherAPI sends `{"error": {"message": ..}}`.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message").or_else(|| v.pointer("/error/message")))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
