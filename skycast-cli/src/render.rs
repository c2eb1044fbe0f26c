//! Plain-text dashboard rendering.

use std::fmt;

use skycast_core::{AirQuality, Alert, Dashboard, Forecast, HourlyForecast, UnitSystem};

const UPCOMING_HOURS: usize = 8;

pub struct DashboardView<'a> {
    dashboard: &'a Dashboard,
    upcoming: bool,
}

impl<'a> DashboardView<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self { dashboard, upcoming: false }
    }

    pub fn with_upcoming(mut self, upcoming: bool) -> Self {
        self.upcoming = upcoming;
        self
    }
}

impl fmt::Display for DashboardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.dashboard.report;
        let units = report.units;
        let deg = units.temperature_label();
        let speed = units.speed_label();

        write!(f, "{}  [{}]", report.location.display_name(), report.provider)?;
        if let Some(local) = report.location.local_time {
            write!(f, "  local time {}", local.format("%Y-%m-%d %H:%M"))?;
        }
        writeln!(f)?;
        writeln!(f)?;

        let c = &report.current;
        writeln!(f, "Now  {} {}", c.condition.icon, c.condition.text)?;
        if let Some(desc) = &c.condition.description {
            writeln!(f, "  {desc}")?;
        }
        writeln!(
            f,
            "  Temperature    {:.1}{deg} (feels like {:.1}{deg})",
            c.temperature, c.feels_like
        )?;
        if let Some(humidity) = c.humidity {
            writeln!(f, "  Humidity       {humidity}%")?;
        }
        if c.wind_speed.is_some() || c.wind_direction.is_some() {
            write!(f, "  Wind          ")?;
            if let Some(wind) = c.wind_speed {
                write!(f, " {wind:.1} {speed}")?;
            }
            if let Some(dir) = &c.wind_direction {
                write!(f, " {dir}")?;
            }
            if let Some(gust) = c.wind_gust {
                write!(f, ", gusts {gust:.1} {speed}")?;
            }
            writeln!(f)?;
        }
        if let Some(pressure) = c.pressure {
            writeln!(f, "  Pressure       {pressure:.2} {}", units.pressure_label())?;
        }
        if let Some(vis) = c.visibility {
            writeln!(f, "  Visibility     {vis:.1} {}", units.distance_label())?;
        }
        writeln!(f, "  Precipitation  {:.1} {}", c.precipitation, units.precipitation_label())?;
        if let Some(uv) = c.uv_index {
            writeln!(f, "  UV index       {uv:.1}")?;
        }
        writeln!(f, "  Observed       {}", c.observed_at.format("%Y-%m-%d %H:%M"))?;

        if let Some(aq) = &c.air_quality {
            writeln!(f)?;
            air_quality(f, aq)?;
        }

        writeln!(f)?;
        match &report.forecast {
            Forecast::Available { .. } => {
                writeln!(f, "Next days")?;
                for day in report.daily_summary() {
                    write!(
                        f,
                        "  {}  {} {:<24} {:>6.1} / {:>6.1}{deg}",
                        day.date.format("%a %d %b"),
                        day.condition.icon,
                        day.condition.text,
                        day.max_temp,
                        day.min_temp,
                    )?;
                    if let Some(chance) = day.chance_of_rain {
                        write!(f, "  rain {chance}%")?;
                    }
                    let precip = day.total_precipitation;
                    writeln!(f, "  {precip:.1} {}", units.precipitation_label())?;
                }
            }
            Forecast::Unavailable { reason } => writeln!(f, "Forecast unavailable: {reason}")?,
        }

        if !report.alerts.is_empty() {
            writeln!(f)?;
            writeln!(f, "Alerts")?;
            for alert in &report.alerts {
                alert_line(f, alert)?;
            }
        }

        let window = &self.dashboard.hourly;
        if !window.is_unavailable() {
            writeln!(f)?;
            writeln!(f, "Today from {:02}:00", self.dashboard.reference_hour)?;
            if window.hours().is_empty() {
                writeln!(f, "  no more hours today")?;
            }
            for hour in window.hours() {
                hour_line(f, hour, units, "%H:%M")?;
            }
        }

        if self.upcoming {
            writeln!(f)?;
            writeln!(f, "Next {UPCOMING_HOURS} records")?;
            for hour in report.upcoming_hours(UPCOMING_HOURS) {
                hour_line(f, hour, units, "%a %H:%M")?;
            }
        }

        Ok(())
    }
}

fn air_quality(f: &mut fmt::Formatter<'_>, aq: &AirQuality) -> fmt::Result {
    write!(f, "Air quality  {} ({})", aq.category.label, aq.category.band.color())?;
    if let Some(index) = aq.epa_index {
        write!(f, "  EPA index {index}")?;
    }
    writeln!(f)?;
    for (pollutant, value) in &aq.pollutants {
        writeln!(f, "  {:<26} {value:.2} μg/m³", pollutant.label())?;
    }
    Ok(())
}

fn alert_line(f: &mut fmt::Formatter<'_>, alert: &Alert) -> fmt::Result {
    let title = if alert.event.is_empty() { &alert.headline } else { &alert.event };
    write!(f, "  ! {title}")?;
    if let Some(severity) = &alert.severity {
        write!(f, " ({severity})")?;
    }
    if let Some(expires) = alert.expires {
        write!(f, " until {}", expires.format("%Y-%m-%d %H:%M"))?;
    }
    writeln!(f)?;
    if !alert.headline.is_empty() && alert.headline != *title {
        writeln!(f, "    {}", alert.headline)?;
    }
    if let Some(instruction) = &alert.instruction {
        writeln!(f, "    {instruction}")?;
    }
    Ok(())
}

fn hour_line(
    f: &mut fmt::Formatter<'_>,
    hour: &HourlyForecast,
    units: UnitSystem,
    time_format: &str,
) -> fmt::Result {
    write!(
        f,
        "  {}  {} {:>6.1}{}  {:<24}",
        hour.time.format(time_format),
        hour.condition.icon,
        hour.temperature,
        units.temperature_label(),
        hour.condition.text,
    )?;
    if let Some(chance) = hour.chance_of_rain {
        write!(f, " rain {chance}%")?;
    }
    writeln!(f)
}
