//! Core library for the `localweather` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The OpenWeather current-weather client behind a provider trait
//! - Location sources and a network reachability probe
//! - Mapping of weather data onto display strings
//! - The screen controller that ties one fetch cycle together
//!
//! It is used by `localweather-cli`, but can also be reused by other front ends.

pub mod config;
pub mod display;
pub mod error;
pub mod location;
pub mod model;
pub mod network;
pub mod provider;
pub mod screen;

pub use config::{Config, LocationConfig, LocationConsent};
pub use display::{DisplayModel, IconCategory, map_for_display};
pub use error::{FetchError, LocationError, ScreenError};
pub use location::{FixedLocation, IpLocation, LocationProvider, PermissionStatus};
pub use model::{Coordinates, UnitSystem, WeatherRequest, WeatherResponse};
pub use network::{Connectivity, TcpProbe};
pub use provider::{WeatherProvider, openweather::OpenWeatherClient};
pub use screen::{ScreenController, ScreenSettings, ScreenState, ScreenUi};
