//! One "weather where I am" screen: location checks, fix, fetch, render.
//!
//! A cycle walks `Idle -> CheckingLocationService -> RequestingPermission ->
//! AwaitingFix -> Fetching -> Done | Failed`. The loading indicator is held by
//! a guard, so it is hidden on every way out of `Fetching`. Cancelling the
//! controller's token aborts a pending fix wait or fetch; once cancelled, the
//! controller stays cancelled.

use chrono::TimeZone;
use std::{fmt::Display, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{
    display::{DisplayModel, map_for_display},
    error::ScreenError,
    location::{LocationProvider, PermissionStatus},
    model::{UnitSystem, WeatherRequest},
    network::Connectivity,
    provider::WeatherProvider,
};

/// Platform surface the controller talks to.
pub trait ScreenUi: Send {
    /// Transient message, like a toast.
    fn notice(&mut self, message: &str);

    /// Explain why location is needed. `true` if the user wants to be asked again.
    fn show_permission_rationale(&mut self) -> bool;

    fn ask_location_permission(&mut self) -> PermissionStatus;

    fn show_loading(&mut self);

    fn hide_loading(&mut self);

    fn render(&mut self, model: &DisplayModel);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState {
    Idle,
    CheckingLocationService,
    RequestingPermission,
    AwaitingFix,
    Fetching,
    Done,
    Failed(ScreenError),
}

#[derive(Debug, Clone)]
pub struct ScreenSettings {
    pub units: UnitSystem,
    pub api_key: String,
    pub locale_region: String,
    pub fix_timeout: Duration,
}

struct LoadingGuard<'a> {
    ui: &'a mut dyn ScreenUi,
}

impl<'a> LoadingGuard<'a> {
    fn show(ui: &'a mut dyn ScreenUi) -> Self {
        ui.show_loading();
        Self { ui }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.ui.hide_loading();
    }
}

pub struct ScreenController<L, Tz> {
    location: L,
    weather: Arc<dyn WeatherProvider>,
    network: Box<dyn Connectivity>,
    settings: ScreenSettings,
    tz: Tz,
    state: ScreenState,
    displayed: Option<DisplayModel>,
    cancel: CancellationToken,
}

impl<L, Tz> ScreenController<L, Tz>
where
    L: LocationProvider,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: Display,
{
    pub fn new(
        location: L,
        weather: Arc<dyn WeatherProvider>,
        network: Box<dyn Connectivity>,
        settings: ScreenSettings,
        tz: Tz,
    ) -> Self {
        Self {
            location,
            weather,
            network,
            settings,
            tz,
            state: ScreenState::Idle,
            displayed: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn state(&self) -> &ScreenState {
        &self.state
    }

    /// Model currently on screen, if any cycle has succeeded.
    pub fn displayed(&self) -> Option<&DisplayModel> {
        self.displayed.as_ref()
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn into_location(self) -> L {
        self.location
    }

    /// Cancelling this token aborts the running cycle and all later ones.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run one cycle from `Idle`. Failures are logged and also returned.
    pub async fn run_cycle(&mut self, ui: &mut dyn ScreenUi) -> Result<DisplayModel, ScreenError> {
        self.enter(ScreenState::Idle);

        match self.cycle(ui).await {
            Ok(model) => {
                self.enter(ScreenState::Done);
                Ok(model)
            }
            Err(err) => {
                match &err {
                    ScreenError::Fetch(fetch) => {
                        tracing::error!(kind = fetch.kind(), error = %fetch, "weather fetch failed")
                    }
                    ScreenError::Cancelled => tracing::info!("screen cycle cancelled"),
                    other => tracing::error!(error = %other, "screen cycle failed"),
                }
                self.enter(ScreenState::Failed(err.clone()));
                Err(err)
            }
        }
    }

    async fn cycle(&mut self, ui: &mut dyn ScreenUi) -> Result<DisplayModel, ScreenError> {
        if self.cancel.is_cancelled() {
            return Err(ScreenError::Cancelled);
        }

        self.enter(ScreenState::CheckingLocationService);
        if !self.location.services_enabled() {
            ui.notice(&ScreenError::LocationServiceDisabled.user_message());
            return Err(ScreenError::LocationServiceDisabled);
        }

        self.enter(ScreenState::RequestingPermission);
        self.ensure_permission(ui)?;

        self.enter(ScreenState::AwaitingFix);
        let fix = tokio::select! {
            _ = self.cancel.cancelled() => return Err(ScreenError::Cancelled),
            res = tokio::time::timeout(self.settings.fix_timeout, self.location.next_fix()) => {
                match res {
                    Ok(fix) => fix?,
                    Err(_) => return Err(ScreenError::LocationTimeout),
                }
            }
        };
        tracing::info!(latitude = fix.latitude(), longitude = fix.longitude(), "location fix");

        self.enter(ScreenState::Fetching);
        if !self.network.is_online().await {
            ui.notice(&ScreenError::NetworkUnavailable.user_message());
            return Err(ScreenError::NetworkUnavailable);
        }

        let request = WeatherRequest {
            coordinates: fix,
            units: self.settings.units,
            api_key: self.settings.api_key.clone(),
        };

        let response = {
            let _loading = LoadingGuard::show(ui);
            tokio::select! {
                _ = self.cancel.cancelled() => Err(ScreenError::Cancelled),
                res = self.weather.current_weather(&request) => res.map_err(ScreenError::from),
            }
        }?;

        let prior_icon = self.displayed.as_ref().and_then(|m| m.icon);
        let model =
            map_for_display(&response, &self.settings.locale_region, &self.tz, prior_icon);

        ui.render(&model);
        self.displayed = Some(model.clone());
        Ok(model)
    }

    fn ensure_permission(&mut self, ui: &mut dyn ScreenUi) -> Result<(), ScreenError> {
        let mut status = self.location.permission();

        if status == PermissionStatus::Undetermined {
            status = self.location.request_permission(ui);
        } else if status == PermissionStatus::Denied && ui.show_permission_rationale() {
            status = self.location.request_permission(ui);
        }

        match status {
            PermissionStatus::Granted => Ok(()),
            PermissionStatus::PermanentlyDenied => {
                ui.notice(&ScreenError::PermissionDenied { permanent: true }.user_message());
                Err(ScreenError::PermissionDenied { permanent: true })
            }
            PermissionStatus::Denied | PermissionStatus::Undetermined => {
                Err(ScreenError::PermissionDenied { permanent: false })
            }
        }
    }

    fn enter(&mut self, state: ScreenState) {
        tracing::debug!(from = ?self.state, to = ?state, "screen state");
        self.state = state;
    }
}
