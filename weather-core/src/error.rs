//! Error types shared by the client, the location layer and the screen controller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatesError {
    #[error("Latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

/// Failure of a single current-weather request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Bad request (HTTP 400)")]
    BadRequest,

    #[error("Not found (HTTP 404)")]
    NotFound,

    #[error("Request failed with HTTP {status}")]
    Generic { status: u16 },

    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Unreadable response body: {0}")]
    InvalidBody(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            _ => Self::Generic { status },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
            Self::Generic { .. } => "generic",
            Self::NetworkFailure(_) => "network_failure",
            Self::InvalidBody(_) => "invalid_body",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location services are disabled")]
    ServiceDisabled,

    #[error("Location permission denied")]
    PermissionDenied { permanent: bool },

    #[error("Timed out waiting for a location fix")]
    Timeout,

    #[error("Location unavailable: {0}")]
    Unavailable(String),
}

/// Why a screen cycle ended without a display model.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    #[error("Location services are disabled")]
    LocationServiceDisabled,

    #[error("Location permission denied (permanent: {permanent})")]
    PermissionDenied { permanent: bool },

    #[error("Timed out waiting for a location fix")]
    LocationTimeout,

    #[error("Location error: {0}")]
    Location(String),

    #[error("Network unavailable")]
    NetworkUnavailable,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Cancelled")]
    Cancelled,
}

impl From<LocationError> for ScreenError {
    fn from(err: LocationError) -> Self {
        match err {
            LocationError::ServiceDisabled => Self::LocationServiceDisabled,
            LocationError::PermissionDenied { permanent } => Self::PermissionDenied { permanent },
            LocationError::Timeout => Self::LocationTimeout,
            LocationError::Unavailable(msg) => Self::Location(msg),
        }
    }
}

impl ScreenError {
    /// Whether the controller already told the user via a notice.
    pub fn shown_as_notice(&self) -> bool {
        matches!(
            self,
            Self::LocationServiceDisabled
                | Self::PermissionDenied { permanent: true }
                | Self::NetworkUnavailable
        )
    }

    /// Short text suitable for a transient notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::LocationServiceDisabled => "Your location is turned off. Turn it on".to_string(),
            Self::PermissionDenied { permanent: true } => "You have denied permission".to_string(),
            Self::PermissionDenied { permanent: false } => {
                "Location permission is required to show local weather".to_string()
            }
            Self::LocationTimeout => "Could not get a location fix in time".to_string(),
            Self::Location(msg) => format!("Could not determine location: {msg}"),
            Self::NetworkUnavailable => "Internet not available".to_string(),
            Self::Fetch(FetchError::InvalidRequest(msg)) => format!("Invalid request: {msg}"),
            Self::Fetch(FetchError::BadRequest) => "Bad connection".to_string(),
            Self::Fetch(FetchError::NotFound) => "Weather not found".to_string(),
            Self::Fetch(FetchError::Generic { status }) => format!("Generic error (HTTP {status})"),
            Self::Fetch(FetchError::NetworkFailure(_)) => {
                "Network error. Check your connection.".to_string()
            }
            Self::Fetch(FetchError::InvalidBody(_)) => "Unexpected weather data".to_string(),
            Self::Cancelled => "Cancelled".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert_eq!(FetchError::from_status(400), FetchError::BadRequest);
        assert_eq!(FetchError::from_status(404), FetchError::NotFound);
        assert_eq!(FetchError::from_status(500), FetchError::Generic { status: 500 });
        assert_eq!(FetchError::from_status(401), FetchError::Generic { status: 401 });
    }

    #[test]
    fn location_errors_map_to_screen_errors() {
        assert_eq!(
            ScreenError::from(LocationError::PermissionDenied { permanent: true }),
            ScreenError::PermissionDenied { permanent: true }
        );
        assert_eq!(ScreenError::from(LocationError::Timeout), ScreenError::LocationTimeout);
    }

    #[test]
    fn notice_errors() {
        assert!(ScreenError::NetworkUnavailable.shown_as_notice());
        assert!(!ScreenError::PermissionDenied { permanent: false }.shown_as_notice());
        assert!(!ScreenError::Fetch(FetchError::NotFound).shown_as_notice());
    }

    #[test]
    fn user_messages() {
        assert!(ScreenError::NetworkUnavailable.user_message().contains("Internet"));
        assert!(
            ScreenError::PermissionDenied { permanent: true }
                .user_message()
                .contains("denied")
        );
        assert_eq!(
            ScreenError::PermissionDenied { permanent: true }.to_string(),
            "Location permission denied (permanent: true)"
        );
    }
}
