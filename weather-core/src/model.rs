use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::CoordinatesError;

/// A single latitude/longitude fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    latitude: f64,
    longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinatesError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinatesError::Latitude(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinatesError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Measurement convention requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
    Standard,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [UnitSystem] {
        &[UnitSystem::Metric, UnitSystem::Imperial, UnitSystem::Standard]
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
        match value.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            "standard" => Ok(UnitSystem::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown unit system '{value}'. Supported: metric, imperial, standard."
            )),
        }
    }
}

/// Input of one current-weather fetch.
#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub coordinates: Coordinates,
    pub units: UnitSystem,
    pub api_key: String,
}

/// Body of the OpenWeather current-weather endpoint, reduced to the fields we display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub weather: Vec<WeatherCondition>,
    pub main: MainMetrics,
    pub wind: Wind,
    pub sys: Sys,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MainMetrics {
    pub temp: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub humidity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    // Omitted by the API in calm conditions.
    #[serde(default)]
    pub deg: f64,
    #[serde(default)]
    pub gust: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sys {
    #[serde(rename = "type", default)]
    pub kind: i64,
    #[serde(default)]
    pub id: f64,
    pub country: String,
    /// Unix seconds.
    pub sunrise: i64,
    /// Unix seconds.
    pub sunset: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_accept_bounds() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        assert!(matches!(
            Coordinates::new(90.5, 0.0),
            Err(CoordinatesError::Latitude(_))
        ));
        assert!(matches!(
            Coordinates::new(0.0, -181.0),
            Err(CoordinatesError::Longitude(_))
        ));
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn unit_system_parse_is_case_insensitive() {
        for units in UnitSystem::all() {
            let parsed: UnitSystem = units.as_str().to_uppercase().parse().expect("known unit");
            assert_eq!(*units, parsed);
        }
        assert!("kelvin".parse::<UnitSystem>().is_err());
    }

    #[test]
    fn response_tolerates_missing_optional_fields() {
        let body = r#"{
            "coord": {"lon": -0.13, "lat": 51.51},
            "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
            "main": {"temp": 12.5, "feels_like": 11.0, "temp_min": 10.0, "temp_max": 14.0, "pressure": 1012, "humidity": 81},
            "wind": {"speed": 4.1},
            "sys": {"country": "GB", "sunrise": 1700000000, "sunset": 1700032000},
            "name": "London"
        }"#;

        let parsed: WeatherResponse = serde_json::from_str(body).expect("valid body");
        assert_eq!(parsed.wind.gust, 0.0);
        assert_eq!(parsed.sys.kind, 0);
        assert_eq!(parsed.weather[0].icon, "01d");
        assert_eq!(parsed.main.humidity, 81);
    }
}
