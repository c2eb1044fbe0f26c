use serde::Serialize;
use std::fmt;

/// Severity band of the US EPA air-quality index (1..=6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityBand {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
    /// Index outside 1..=6, or present but not an integer.
    Unknown,
}

impl SeverityBand {
    pub fn label(&self) -> &'static str {
        match self {
            SeverityBand::Good => "Good",
            SeverityBand::Moderate => "Moderate",
            SeverityBand::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            SeverityBand::Unhealthy => "Unhealthy",
            SeverityBand::VeryUnhealthy => "Very Unhealthy",
            SeverityBand::Hazardous => "Hazardous",
            SeverityBand::Unknown => "Unknown",
        }
    }

    /// Badge colour used by the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            SeverityBand::Good => "green",
            SeverityBand::Moderate => "yellow",
            SeverityBand::UnhealthyForSensitiveGroups => "orange",
            SeverityBand::Unhealthy => "red",
            SeverityBand::VeryUnhealthy => "purple",
            SeverityBand::Hazardous => "maroon",
            SeverityBand::Unknown => "grey",
        }
    }
}

impl fmt::Display for SeverityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AirQualityCategory {
    pub band: SeverityBand,
    pub label: &'static str,
}

impl From<SeverityBand> for AirQualityCategory {
    fn from(band: SeverityBand) -> Self {
        Self { band, label: band.label() }
    }
}

/// Ordered threshold table; position `i` holds the band for index `i + 1`.
const BANDS: [SeverityBand; 6] = [
    SeverityBand::Good,
    SeverityBand::Moderate,
    SeverityBand::UnhealthyForSensitiveGroups,
    SeverityBand::Unhealthy,
    SeverityBand::VeryUnhealthy,
    SeverityBand::Hazardous,
];

/// Map a 1..=6 EPA index to its band. Out-of-range input yields
/// [`SeverityBand::Unknown`].
pub fn categorize(index: u8) -> AirQualityCategory {
    let band = usize::from(index)
        .checked_sub(1)
        .and_then(|i| BANDS.get(i).copied())
        .unwrap_or(SeverityBand::Unknown);
    band.into()
}
