#![allow(dead_code)]

use serde_json::{Value, json};

pub const WEATHER_PATH: &str = "/data/2.5/weather";

pub fn current_weather() -> Value {
    json!({
        "coord": {"lon": -57.95, "lat": 48.95},
        "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04d"}],
        "main": {"temp": 300.0, "feels_like": 298.4, "temp_min": 299.0, "temp_max": 301.0,
                 "pressure": 1012, "humidity": 81},
        "wind": {"speed": 5.0, "deg": 67, "gust": 7.2},
        "sys": {"country": "CA", "sunrise": 1714551000, "sunset": 1714604000},
        "name": "Corner Brook",
        "dt": 1714588440,
        "cod": 200
    })
}
