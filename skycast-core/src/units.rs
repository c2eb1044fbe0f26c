use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Measurement convention requested by the caller.
///
/// Chosen once per request. Adapters use it to pick (or compute) the right
/// raw value, and renderers use it for suffix labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial]
    }

    /// Select between a provider's paired metric/imperial fields.
    pub fn pick<T>(self, metric: T, imperial: T) -> T {
        match self {
            UnitSystem::Metric => metric,
            UnitSystem::Imperial => imperial,
        }
    }

    pub fn temperature_label(self) -> &'static str {
        self.pick("°C", "°F")
    }

    pub fn speed_label(self) -> &'static str {
        self.pick("km/h", "mph")
    }

    pub fn precipitation_label(self) -> &'static str {
        self.pick("mm", "in")
    }

    pub fn distance_label(self) -> &'static str {
        self.pick("km", "miles")
    }

    pub fn pressure_label(self) -> &'static str {
        self.pick("mb", "inHg")
    }

    pub fn temperature_from_celsius(self, celsius: f64) -> f64 {
        self.pick(celsius, temperature::c2f(celsius))
    }

    pub fn speed_from_mps(self, mps: f64) -> f64 {
        self.pick(speed::mps2kph(mps), speed::mps2mph(mps))
    }

    pub fn precipitation_from_mm(self, mm: f64) -> f64 {
        self.pick(mm, length::mm2in(mm))
    }

    pub fn distance_from_metres(self, metres: f64) -> f64 {
        self.pick(length::m2km(metres), length::m2mi(metres))
    }

    pub fn pressure_from_hpa(self, hpa: f64) -> f64 {
        self.pick(hpa, pressure::hpa2inhg(hpa))
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(UnitSystem::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(UnitSystem::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial."
            )),
        }
    }
}

pub mod temperature {
    pub fn f2c(temp_f: f64) -> f64 {
        (temp_f - 32.0) * 5.0 / 9.0
    }

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }
}

pub mod speed {
    const MPS_PER_MPH: f64 = 0.44704;

    pub fn mps2kph(mps: f64) -> f64 {
        mps * 3.6
    }

    pub fn mps2mph(mps: f64) -> f64 {
        mps / MPS_PER_MPH
    }
}

pub mod length {
    const MM_PER_INCH: f64 = 25.4;
    const METRES_PER_MILE: f64 = 1609.344;

    pub fn mm2in(mm: f64) -> f64 {
        mm / MM_PER_INCH
    }

    pub fn m2km(metres: f64) -> f64 {
        metres / 1000.0
    }

    pub fn m2mi(metres: f64) -> f64 {
        metres / METRES_PER_MILE
    }
}

pub mod pressure {
    const INHG_PER_HPA: f64 = 0.029_529_983_071_4;

    pub fn hpa2inhg(hpa: f64) -> f64 {
        hpa * INHG_PER_HPA
    }
}

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    pub fn degree_to_compass(deg: f64) -> &'static str {
        let deg = (deg % 360.0) + 360.0;
        let val = (deg / 22.5 + 0.5) as usize;
        COMPASS[val % 16]
    }
}
