use std::fmt;

use serde::{Deserialize, Serialize};

use crate::options::{Color, PresentationOptions};
use crate::url_builder::ValueWallUrl;

/// Host-issued id of a live web surface.
///
/// The manager never owns the surface; it only remembers which handle is
/// current and forgets it when the host reports the surface closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceHandle(pub u64);

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// What the host needs to build and display the Value Wall surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub url: ValueWallUrl,
    pub close_button_color: Color,
}

pub type DismissCompletion = Box<dyn FnOnce() + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("web surface host failed to present: {message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Platform web-view collaborator.
///
/// `present` displays a surface that loads `request.url` from `anchor` and
/// starts loading immediately. `dismiss` tears the surface down and runs
/// `completion` once teardown has finished.
pub trait WebSurfaceHost {
    type Anchor;

    fn present(
        &mut self,
        anchor: &Self::Anchor,
        request: &SurfaceRequest,
    ) -> Result<SurfaceHandle, HostError>;

    fn dismiss(
        &mut self,
        handle: SurfaceHandle,
        animated: bool,
        completion: Option<DismissCompletion>,
    );
}

/// Notifications a surface sends back to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceEvent {
    LoadStarted,
    LoadFinished,
    LoadFailed { message: String },
    /// The surface tore itself down (close affordance, host navigation).
    Closed,
}

impl SurfaceEvent {
    /// started=0 finished=1 failed=2 closed=3
    pub fn from_u8(value: u8, message: String) -> Option<Self> {
        match value {
            0 => Some(Self::LoadStarted),
            1 => Some(Self::LoadFinished),
            2 => Some(Self::LoadFailed { message }),
            3 => Some(Self::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoadStarted => "load_started",
            Self::LoadFinished => "load_finished",
            Self::LoadFailed { .. } => "load_failed",
            Self::Closed => "closed",
        }
    }
}

/// Loading-indicator state of the active surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivePresentation {
    pub handle: SurfaceHandle,
    pub url: ValueWallUrl,
    pub close_button_color: Color,
    pub load_state: LoadState,
}

/// What happens to the current surface when the Value Wall is shown again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    /// Track the new surface and leave the previous one on screen.
    #[default]
    KeepPrevious,
    /// Ask the host to dismiss the previous surface before presenting.
    DismissPrevious,
}

/// Tracks at most one presented Value Wall surface.
///
/// Idle when `active` is `None`, Presenting otherwise. Load events only move
/// `load_state`; they never change Idle/Presenting.
#[derive(Debug, Default)]
pub struct PresentationManager {
    active: Option<ActivePresentation>,
    policy: ReplacementPolicy,
}

impl PresentationManager {
    #[must_use]
    pub fn new(policy: ReplacementPolicy) -> Self {
        Self {
            active: None,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    #[must_use]
    pub fn is_presenting(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active(&self) -> Option<&ActivePresentation> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.load_state == LoadState::Loading)
    }

    /// Under `DismissPrevious`, tears down the tracked surface ahead of a
    /// new presentation and returns its handle. A no-op under `KeepPrevious`
    /// or when Idle.
    ///
    /// Must run before the anchor for the next surface is resolved, since
    /// the tracked surface is usually the topmost screen.
    pub fn dismiss_for_replacement<H: WebSurfaceHost>(
        &mut self,
        host: &mut H,
    ) -> Option<SurfaceHandle> {
        if self.policy != ReplacementPolicy::DismissPrevious {
            return None;
        }
        let previous = self.active.take()?;
        tracing::debug!(handle = %previous.handle, "dismissing previous value wall surface");
        host.dismiss(previous.handle, false, None);
        Some(previous.handle)
    }

    /// Presents `url` from `anchor` and tracks the resulting handle.
    ///
    /// On host failure the tracked presentation, if any, is left as is.
    /// Replacement dismissal is not done here; see `dismiss_for_replacement`.
    pub fn present<H: WebSurfaceHost>(
        &mut self,
        host: &mut H,
        anchor: &H::Anchor,
        url: ValueWallUrl,
        options: &PresentationOptions,
    ) -> Result<SurfaceHandle, HostError> {
        let request = SurfaceRequest {
            url,
            close_button_color: options.resolved_close_button_color(),
        };
        let handle = host.present(anchor, &request).inspect_err(|error| {
            tracing::warn!(error = %error, url = %request.url, "value wall presentation failed");
        })?;

        if let Some(previous) = &self.active {
            tracing::debug!(
                previous = %previous.handle,
                next = %handle,
                "replacing tracked value wall surface without dismissing it"
            );
        }
        tracing::debug!(%handle, url = %request.url, "value wall presented");

        self.active = Some(ActivePresentation {
            handle,
            url: request.url,
            close_button_color: request.close_button_color,
            load_state: LoadState::Loading,
        });
        Ok(handle)
    }

    /// Tears down the tracked surface. When Idle, `completion` runs right
    /// away so callers can chain on dismissal unconditionally.
    pub fn dismiss<H: WebSurfaceHost>(
        &mut self,
        host: &mut H,
        animated: bool,
        completion: Option<DismissCompletion>,
    ) {
        match self.active.take() {
            Some(active) => {
                tracing::debug!(handle = %active.handle, animated, "dismissing value wall");
                host.dismiss(active.handle, animated, completion);
            }
            None => {
                tracing::debug!("dismiss requested with no value wall presented");
                if let Some(completion) = completion {
                    completion();
                }
            }
        }
    }

    /// Applies a host notification. Returns `false` when the event belongs to
    /// a surface that is no longer tracked.
    pub fn handle_event(&mut self, handle: SurfaceHandle, event: &SurfaceEvent) -> bool {
        let Some(active) = self.active.as_mut().filter(|active| active.handle == handle) else {
            tracing::debug!(
                %handle,
                event = event.as_str(),
                "ignoring event for untracked surface"
            );
            return false;
        };

        match event {
            SurfaceEvent::LoadStarted => active.load_state = LoadState::Loading,
            SurfaceEvent::LoadFinished => active.load_state = LoadState::Loaded,
            SurfaceEvent::LoadFailed { message } => {
                tracing::warn!(%handle, error = %message, "value wall failed to load");
                active.load_state = LoadState::Failed;
            }
            SurfaceEvent::Closed => {
                tracing::debug!(%handle, "value wall closed by host");
                self.active = None;
            }
        }
        true
    }

    /// Forgets the tracked surface without asking the host to dismiss it.
    pub fn clear(&mut self) -> Option<ActivePresentation> {
        self.active.take()
    }
}
