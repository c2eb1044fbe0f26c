//! Provider payload fixtures shared by unit tests.

use serde_json::{Value, json};

/// 2024-05-06 00:00 local time in a UTC+1 zone.
pub const OW_LOCAL_MIDNIGHT: i64 = 1_714_950_000;
pub const OW_TZ_OFFSET: i64 = 3600;

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn wa_hour(date: &str, hour: u32) -> Value {
    let temp_c = 23.0 + f64::from(hour) * 0.5;
    let is_day = u8::from((6..19).contains(&hour));
    let text = if hour < 12 { "Clear" } else { "Partly cloudy" };
    json!({
        "time_epoch": 1_714_953_600 + i64::from(hour) * 3600,
        "time": format!("{date} {hour:02}:00"),
        "temp_c": temp_c,
        "temp_f": round1(temp_c * 1.8 + 32.0),
        "is_day": is_day,
        "condition": {
            "text": text,
            "icon": "//cdn.weatherapi.com/weather/64x64/night/113.png",
            "code": 1000
        },
        "wind_mph": 5.6,
        "wind_kph": 9.0,
        "wind_degree": 290,
        "wind_dir": "WNW",
        "pressure_mb": 1008.0,
        "pressure_in": 29.77,
        "precip_mm": 0.0,
        "precip_in": 0.0,
        "humidity": 55,
        "cloud": 10,
        "feelslike_c": temp_c + 1.0,
        "feelslike_f": round1((temp_c + 1.0) * 1.8 + 32.0),
        "chance_of_rain": 0
    })
}

fn wa_day(
    date: &str,
    condition: &str,
    chance: Value,
    maxes: (f64, f64),
    mins: (f64, f64),
) -> Value {
    json!({
        "date": date,
        "date_epoch": 1_714_953_600,
        "day": {
            "maxtemp_c": maxes.0,
            "maxtemp_f": maxes.1,
            "mintemp_c": mins.0,
            "mintemp_f": mins.1,
            "avgtemp_c": 27.4,
            "maxwind_kph": 16.6,
            "totalprecip_mm": 0.4,
            "totalprecip_in": 0.02,
            "avghumidity": 48,
            "daily_will_it_rain": 0,
            "daily_chance_of_rain": chance,
            "condition": {
                "text": condition,
                "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png",
                "code": 1000
            },
            "uv": 8.0
        },
        "astro": { "sunrise": "06:04 AM", "sunset": "06:59 PM" },
        "hour": (0..24).map(|h| wa_hour(date, h)).collect::<Vec<_>>()
    })
}

/// A complete WeatherAPI.com `forecast.json` response for three days.
pub fn weatherapi_payload() -> Value {
    json!({
        "location": {
            "name": "Pune",
            "region": "Maharashtra",
            "country": "India",
            "lat": 18.53,
            "lon": 73.87,
            "tz_id": "Asia/Kolkata",
            "localtime_epoch": 1_714_985_400,
            "localtime": "2024-05-06 14:20"
        },
        "current": {
            "last_updated_epoch": 1_714_984_500,
            "last_updated": "2024-05-06 14:15",
            "temp_c": 31.0,
            "temp_f": 87.8,
            "is_day": 1,
            "condition": {
                "text": "Partly cloudy",
                "icon": "//cdn.weatherapi.com/weather/64x64/day/116.png",
                "code": 1003
            },
            "wind_mph": 6.9,
            "wind_kph": 11.2,
            "wind_degree": 290,
            "wind_dir": "WNW",
            "pressure_mb": 1008.0,
            "pressure_in": 29.77,
            "precip_mm": 0.1,
            "precip_in": 0.0,
            "humidity": 46,
            "cloud": 25,
            "feelslike_c": 34.2,
            "feelslike_f": 93.6,
            "vis_km": 6.0,
            "vis_miles": 3.0,
            "uv": 7.0,
            "gust_mph": 9.2,
            "gust_kph": 14.8,
            "air_quality": {
                "co": 453.95,
                "no2": 12.3,
                "o3": 68.666,
                "so2": 6.2,
                "pm2_5": 23.1,
                "pm10": 41.7,
                "us-epa-index": 2,
                "gb-defra-index": 2
            }
        },
        "forecast": {
            "forecastday": [
                wa_day("2024-05-06", "Sunny", json!(20), (33.0, 91.4), (22.0, 71.6)),
                wa_day(
                    "2024-05-07",
                    "Patchy rain possible",
                    json!("85"),
                    (30.1, 86.2),
                    (21.5, 70.7)
                ),
                wa_day("2024-05-08", "Moderate rain", json!(90), (28.0, 82.4), (21.0, 69.8))
            ]
        },
        "alerts": {
            "alert": [{
                "headline": "Heat advisory issued for Pune",
                "msgtype": "Alert",
                "severity": "Moderate",
                "urgency": "Expected",
                "areas": "Pune",
                "category": "Met",
                "certainty": "Likely",
                "event": "Heat Advisory",
                "note": "",
                "effective": "2024-05-06T10:00:00+05:30",
                "expires": "",
                "desc": "Temperatures up to 40 C expected.",
                "instruction": "Stay hydrated."
            }]
        }
    })
}

/// OpenWeather `/weather` response. 20 °C, 5 m/s, 10 km visibility.
pub fn openweather_current() -> Value {
    json!({
        "coord": { "lon": -0.1257, "lat": 51.5085 },
        "weather": [{ "id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d" }],
        "base": "stations",
        "main": {
            "temp": 20.0,
            "feels_like": 19.5,
            "temp_min": 18.0,
            "temp_max": 21.0,
            "pressure": 1012,
            "humidity": 60
        },
        "visibility": 10000,
        "wind": { "speed": 5.0, "deg": 240, "gust": 8.0 },
        "rain": { "1h": 0.5 },
        "clouds": { "all": 75 },
        "dt": OW_LOCAL_MIDNIGHT + 13 * 3600 + 30 * 60,
        "sys": {
            "type": 2,
            "id": 2075535,
            "country": "GB",
            "sunrise": 1_714_969_000,
            "sunset": 1_715_024_000
        },
        "timezone": OW_TZ_OFFSET,
        "id": 2643743,
        "name": "London",
        "cod": 200
    })
}

/// One 3-hour forecast snapshot, `index` steps after local midnight.
pub fn openweather_entry(index: i64) -> Value {
    let (id, main, description, icon) = if index % 2 == 0 {
        (800, "Clear", "clear sky", "01d")
    } else {
        (500, "Rain", "light rain", "10d")
    };
    let mut entry = json!({
        "dt": OW_LOCAL_MIDNIGHT + index * 3 * 3600,
        "main": {
            "temp": 10.0 + index as f64,
            "feels_like": 9.0 + index as f64,
            "temp_min": 9.0,
            "temp_max": 11.0,
            "pressure": 1015,
            "sea_level": 1015,
            "grnd_level": 1012,
            "humidity": 70,
            "temp_kf": 0.0
        },
        "weather": [{
            "id": id,
            "main": main,
            "description": description,
            "icon": icon
        }],
        "clouds": { "all": 20 },
        "wind": { "speed": 2.5, "deg": 180, "gust": 4.0 },
        "visibility": 10000,
        "pop": (index % 5) as f64 * 0.2,
        "sys": { "pod": "d" },
        "dt_txt": "ignored"
    });
    if index % 2 == 1 {
        entry["rain"] = json!({ "3h": 1.5 });
    }
    entry
}

/// OpenWeather `/forecast` response with `count` snapshots starting at
/// local midnight.
pub fn openweather_forecast(count: i64) -> Value {
    json!({
        "cod": "200",
        "message": 0,
        "cnt": count,
        "list": (0..count).map(openweather_entry).collect::<Vec<_>>(),
        "city": {
            "id": 2643743,
            "name": "London",
            "coord": { "lat": 51.5085, "lon": -0.1257 },
            "country": "GB",
            "population": 1_000_000,
            "timezone": OW_TZ_OFFSET,
            "sunrise": 1_714_969_000,
            "sunset": 1_715_024_000
        }
    })
}
