//! Location fix sources.
//!
//! A provider answers three questions before it is asked for a fix: is the
//! service switched on, has the user allowed it, and (if not yet decided)
//! what does the user say when asked.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::LocationConsent, error::LocationError, model::Coordinates, screen::ScreenUi,
};

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    /// Denied this time; asking again with an explanation is allowed.
    Denied,
    PermanentlyDenied,
    Undetermined,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    fn services_enabled(&self) -> bool;

    fn permission(&self) -> PermissionStatus;

    /// Ask the user; returns the resulting status.
    fn request_permission(&mut self, ui: &mut dyn ScreenUi) -> PermissionStatus;

    /// One best-effort fix.
    async fn next_fix(&self) -> Result<Coordinates, LocationError>;
}

/// Coordinates supplied up front (flags or config).
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coordinates: Coordinates,
}

impl FixedLocation {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    fn services_enabled(&self) -> bool {
        true
    }

    fn permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    fn request_permission(&mut self, _ui: &mut dyn ScreenUi) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn next_fix(&self) -> Result<Coordinates, LocationError> {
        Ok(self.coordinates)
    }
}

/// Approximate fix from an IP geolocation service.
///
/// Sending the lookup discloses the user's address to a third party, so it
/// is gated on stored consent.
#[derive(Debug, Clone)]
pub struct IpLocation {
    http: Client,
    url: String,
    enabled: bool,
    consent: Option<LocationConsent>,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpLocation {
    pub fn new(
        url: impl Into<String>,
        enabled: bool,
        consent: Option<LocationConsent>,
        timeout: Duration,
    ) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        Ok(Self { http, url: url.into(), enabled, consent })
    }

    /// Consent as it stands after any prompting, for persisting.
    pub fn consent(&self) -> Option<LocationConsent> {
        self.consent
    }
}

#[async_trait]
impl LocationProvider for IpLocation {
    fn services_enabled(&self) -> bool {
        self.enabled
    }

    fn permission(&self) -> PermissionStatus {
        match self.consent {
            Some(LocationConsent::Granted) => PermissionStatus::Granted,
            Some(LocationConsent::Denied) => PermissionStatus::Denied,
            Some(LocationConsent::Never) => PermissionStatus::PermanentlyDenied,
            None => PermissionStatus::Undetermined,
        }
    }

    fn request_permission(&mut self, ui: &mut dyn ScreenUi) -> PermissionStatus {
        let answer = ui.ask_location_permission();
        self.consent = match answer {
            PermissionStatus::Granted => Some(LocationConsent::Granted),
            PermissionStatus::Denied => Some(LocationConsent::Denied),
            PermissionStatus::PermanentlyDenied => Some(LocationConsent::Never),
            PermissionStatus::Undetermined => self.consent,
        };
        self.permission()
    }

    async fn next_fix(&self) -> Result<Coordinates, LocationError> {
        if self.permission() != PermissionStatus::Granted {
            return Err(LocationError::PermissionDenied {
                permanent: self.permission() == PermissionStatus::PermanentlyDenied,
            });
        }

        let unavailable = |e: reqwest::Error| LocationError::Unavailable(e.to_string());

        let body: IpApiResponse = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)?;

        if body.status != "success" {
            return Err(LocationError::Unavailable(
                body.message.unwrap_or_else(|| format!("lookup status '{}'", body.status)),
            ));
        }

        let (Some(lat), Some(lon)) = (body.lat, body.lon) else {
            return Err(LocationError::Unavailable(
                "lookup response has no coordinates".to_string(),
            ));
        };

        let fix =
            Coordinates::new(lat, lon).map_err(|e| LocationError::Unavailable(e.to_string()))?;
        tracing::info!(latitude = fix.latitude(), longitude = fix.longitude(), "got location fix");
        Ok(fix)
    }
}
