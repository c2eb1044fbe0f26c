use chrono::Timelike;

use crate::{
    error::Result,
    model::{Dashboard, WeatherReport, WeatherRequest},
    normalizer::Normalizer,
    provider::WeatherFetcher,
    units::UnitSystem,
};

/// Fetch-then-normalize for one location. A fetch failure is returned
/// before any normalization is attempted.
#[derive(Debug)]
pub struct WeatherService<F> {
    fetcher: F,
    normalizer: Normalizer,
}

impl<F: WeatherFetcher> WeatherService<F> {
    pub fn new(fetcher: F, normalizer: Normalizer) -> Self {
        Self { fetcher, normalizer }
    }

    pub async fn report(&self, location: &str, units: UnitSystem) -> Result<WeatherReport> {
        let payload = self.fetcher.fetch(location, units).await?;
        let report = self.normalizer.normalize(&payload, units)?;

        tracing::info!(
            provider = %report.provider,
            location = %report.location.display_name(),
            %units,
            days = report.forecast.days().len(),
            alerts = report.alerts.len(),
            "Weather report ready"
        );

        Ok(report)
    }

    /// Report plus today's hourly window. Without an explicit reference
    /// hour the local clock's current hour is used.
    pub async fn dashboard(&self, request: &WeatherRequest) -> Result<Dashboard> {
        let report = self.report(&request.location, request.units).await?;
        let reference_hour =
            request.reference_hour.unwrap_or_else(|| chrono::Local::now().hour());
        let hourly = report.hourly_window(reference_hour);

        Ok(Dashboard { report, reference_hour, hourly })
    }
}
