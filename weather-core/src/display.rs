//! Mapping of a [`WeatherResponse`] onto the strings and icon shown on screen.
//!
//! Everything here is pure: time zone and locale region are passed in.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::model::WeatherResponse;

/// Regions whose users read temperatures in Fahrenheit.
const FAHRENHEIT_REGIONS: &[&str] = &["US", "LR", "MM"];

/// Glyph category for the main weather icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Clear,
    Cloud,
    Rain,
    Storm,
    Snow,
    Mist,
}

impl IconCategory {
    /// Look up an OpenWeather icon code. `None` for codes outside the table.
    pub fn from_icon_code(code: &str) -> Option<Self> {
        match code {
            "01d" | "01n" => Some(Self::Clear),
            "02d" | "02n" | "03d" | "03n" | "04d" | "04n" => Some(Self::Cloud),
            "09d" | "09n" | "10d" | "10n" => Some(Self::Rain),
            "11d" | "11n" => Some(Self::Storm),
            "13d" | "13n" => Some(Self::Snow),
            "50d" | "50n" => Some(Self::Mist),
            _ => None,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Clear => "☀",
            Self::Cloud => "☁",
            Self::Rain => "🌧",
            Self::Storm => "⛈",
            Self::Snow => "❄",
            Self::Mist => "🌫",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
            Self::Mist => "mist",
        }
    }
}

/// Strings and icon ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayModel {
    pub condition: String,
    pub description: String,
    pub temperature: String,
    pub sunrise: String,
    pub sunset: String,
    pub humidity: String,
    pub temp_min: String,
    pub temp_max: String,
    pub wind_speed: String,
    pub place: String,
    pub country: String,
    pub icon: Option<IconCategory>,
}

/// `°F` for the Fahrenheit regions, `°C` otherwise.
///
/// Derived from the locale only; it does not look at the unit system the
/// data was requested in.
pub fn temperature_suffix(locale_region: &str) -> &'static str {
    let region = locale_region.trim();
    if FAHRENHEIT_REGIONS.iter().any(|r| r.eq_ignore_ascii_case(region)) {
        "°F"
    } else {
        "°C"
    }
}

/// Region code of a POSIX locale name: `en_US.UTF-8` gives `US`.
pub fn region_from_locale(locale: &str) -> Option<String> {
    let name = locale.split(['.', '@']).next()?;
    let (_, region) = name.split_once(['_', '-'])?;
    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

/// Unix seconds as `HH:mm` in `tz`; `--:--` when out of range.
pub fn clock_time<Tz>(unix_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match DateTime::<Utc>::from_timestamp(unix_secs, 0) {
        Some(utc) => utc.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

pub fn map_for_display<Tz>(
    response: &WeatherResponse,
    locale_region: &str,
    tz: &Tz,
    prior_icon: Option<IconCategory>,
) -> DisplayModel
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let first = response.weather.first();
    let suffix = temperature_suffix(locale_region);

    let mapped = first.and_then(|w| IconCategory::from_icon_code(&w.icon));
    if let (Some(w), None) = (first, mapped) {
        tracing::debug!(code = %w.icon, "unmapped icon code, keeping previous icon");
    }
    let icon = mapped.or(prior_icon);

    DisplayModel {
        condition: first.map(|w| w.main.clone()).unwrap_or_default(),
        description: first.map(|w| w.description.clone()).unwrap_or_default(),
        temperature: format!("{}{suffix}", decimal(response.main.temp)),
        sunrise: clock_time(response.sys.sunrise, tz),
        sunset: clock_time(response.sys.sunset, tz),
        humidity: format!("{} per cent", response.main.humidity),
        temp_min: format!("{} min", decimal(response.main.temp_min)),
        temp_max: format!("{} max", decimal(response.main.temp_max)),
        wind_speed: decimal(response.wind.speed),
        place: response.name.clone(),
        country: response.sys.country.clone(),
        icon,
    }
}

/// Always at least one fractional digit: `12.0`, `12.5`.
fn decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
