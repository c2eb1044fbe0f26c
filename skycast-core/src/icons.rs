//! Condition label to display glyph lookup.

use serde::{Serialize, Serializer};
use std::{collections::HashMap, fmt};

/// Glyph returned for any condition label missing from the table.
pub const FALLBACK_ICON: Icon = Icon("🌡️");

/// A display glyph for a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Icon(&'static str);

impl Icon {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_fallback(&self) -> bool {
        *self == FALLBACK_ICON
    }
}

impl fmt::Display for Icon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

/// Every condition string WeatherAPI.com is known to emit, followed by the
/// OpenWeather condition groups (`weather[].main`).
const STANDARD_ICONS: &[(&str, &str)] = &[
    ("Sunny", "☀️"),
    ("Clear", "🌞"),
    ("Partly cloudy", "⛅"),
    ("Cloudy", "☁️"),
    ("Overcast", "☁️"),
    ("Mist", "🌫️"),
    ("Patchy rain possible", "🌦️"),
    ("Patchy snow possible", "🌨️"),
    ("Patchy sleet possible", "🌧️"),
    ("Patchy freezing drizzle possible", "🌧️"),
    ("Thundery outbreaks possible", "⛈️"),
    ("Blowing snow", "❄️"),
    ("Blizzard", "❄️"),
    ("Fog", "🌫️"),
    ("Freezing fog", "🌫️"),
    ("Patchy light drizzle", "🌧️"),
    ("Light drizzle", "🌧️"),
    ("Freezing drizzle", "🌧️"),
    ("Heavy freezing drizzle", "🌧️"),
    ("Patchy light rain", "🌧️"),
    ("Light rain", "🌧️"),
    ("Moderate rain at times", "🌧️"),
    ("Moderate rain", "🌧️"),
    ("Heavy rain at times", "🌧️"),
    ("Heavy rain", "🌧️"),
    ("Light freezing rain", "🌧️"),
    ("Moderate or heavy freezing rain", "🌧️"),
    ("Light sleet", "🌨️"),
    ("Moderate or heavy sleet", "🌨️"),
    ("Patchy light snow", "🌨️"),
    ("Light snow", "🌨️"),
    ("Patchy moderate snow", "🌨️"),
    ("Moderate snow", "❄️"),
    ("Patchy heavy snow", "❄️"),
    ("Heavy snow", "❄️"),
    ("Ice pellets", "🧊"),
    ("Light rain shower", "🌦️"),
    ("Moderate or heavy rain shower", "🌦️"),
    ("Torrential rain shower", "🌧️"),
    ("Light sleet showers", "🌨️"),
    ("Moderate or heavy sleet showers", "🌨️"),
    ("Light snow showers", "🌨️"),
    ("Moderate or heavy snow showers", "❄️"),
    ("Light showers of ice pellets", "🧊"),
    ("Moderate or heavy showers of ice pellets", "🧊"),
    ("Patchy light rain with thunder", "⛈️"),
    ("Moderate or heavy rain with thunder", "⛈️"),
    ("Patchy light snow with thunder", "⛈️"),
    ("Moderate or heavy snow with thunder", "⛈️"),
    // OpenWeather groups
    ("Clouds", "☁️"),
    ("Rain", "🌧️"),
    ("Drizzle", "🌧️"),
    ("Thunderstorm", "⛈️"),
    ("Snow", "❄️"),
    ("Haze", "🌫️"),
    ("Smoke", "🌫️"),
    ("Dust", "🌫️"),
    ("Sand", "🌫️"),
    ("Ash", "🌋"),
    ("Squall", "💨"),
    ("Tornado", "🌪️"),
];

/// Read-only condition table. Built once at startup and shared behind an
/// `Arc`; there is no mutation API.
#[derive(Debug, Clone)]
pub struct ConditionIcons {
    table: HashMap<&'static str, Icon>,
}

impl ConditionIcons {
    /// The table covering both supported providers.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ICONS)
    }

    /// Later duplicates of a label are ignored.
    pub fn from_entries(entries: &[(&'static str, &'static str)]) -> Self {
        let mut table = HashMap::with_capacity(entries.len());
        for (label, glyph) in entries {
            table.entry(*label).or_insert(Icon(*glyph));
        }
        Self { table }
    }

    /// Exact, case-sensitive lookup. Never fails: unknown labels map to
    /// [`FALLBACK_ICON`].
    pub fn resolve(&self, condition: &str) -> Icon {
        match self.table.get(condition) {
            Some(icon) => *icon,
            None => {
                tracing::debug!(condition = %condition, "No icon for condition; using fallback");
                FALLBACK_ICON
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl Default for ConditionIcons {
    fn default() -> Self {
        Self::standard()
    }
}
