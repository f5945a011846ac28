use crate::anchor::AnchorResolver;
use crate::config::{SdkConfig, SdkSettings};
use crate::error::ShowError;
use crate::mode::Mode;
use crate::options::PresentationOptions;
use crate::presentation::{
    ActivePresentation, DismissCompletion, PresentationManager, SurfaceEvent, SurfaceHandle,
    WebSurfaceHost,
};
use crate::session::{Metadata, SessionConfiguration};
use crate::url_builder::{ValueWallUrl, build_url};

/// The Tesoro SDK context.
///
/// The host application constructs one `Tesoro` per process and keeps it for
/// the process lifetime. It owns the session configuration and the
/// presentation state, and it talks to the platform through the injected
/// `WebSurfaceHost` and `AnchorResolver`.
///
/// All methods take `&mut self` and are meant to be called from the host's
/// UI thread. The context does no locking of its own; callers on several
/// threads must serialize access.
///
/// ```ignore
/// let mut tesoro = Tesoro::new(host, resolver);
/// tesoro.configure(Mode::Production, "player_123", None);
/// if !tesoro.show_value_wall(&PresentationOptions::default()) {
///     // not configured, or nothing to present from
/// }
/// ```
pub struct Tesoro<H, R> {
    session: SessionConfiguration,
    presentation: PresentationManager,
    host: H,
    resolver: R,
}

impl<H, R> Tesoro<H, R>
where
    H: WebSurfaceHost,
    R: AnchorResolver<Anchor = H::Anchor>,
{
    pub fn new(host: H, resolver: R) -> Self {
        Self::with_settings(host, resolver, SdkSettings::default())
    }

    pub fn with_settings(host: H, resolver: R, settings: SdkSettings) -> Self {
        Self {
            session: SessionConfiguration::new(),
            presentation: PresentationManager::new(settings.replacement_policy),
            host,
            resolver,
        }
    }

    /// Replaces the whole session configuration. Calling it again simply
    /// overwrites the previous values.
    pub fn configure(
        &mut self,
        mode: Mode,
        player_id: impl Into<String>,
        metadata: Option<Metadata>,
    ) {
        let player_id = player_id.into();
        tracing::debug!(
            %mode,
            player_id = %player_id,
            metadata_entries = metadata.as_ref().map_or(0, Metadata::len),
            "tesoro configured"
        );
        self.session.configure(mode, player_id, metadata);
    }

    pub fn configure_from(&mut self, config: SdkConfig) {
        self.configure(config.mode, config.player_id, config.metadata);
    }

    /// Presents the Value Wall from the topmost screen.
    ///
    /// Returns `true` iff a presentation was initiated. Failures are logged.
    /// A failed show leaves the presentation state untouched, apart from a
    /// `DismissPrevious` teardown that already ran.
    pub fn show_value_wall(&mut self, options: &PresentationOptions) -> bool {
        match self.try_show_value_wall(options) {
            Ok(_) => true,
            Err(error) => {
                tracing::error!(code = error.code(), error = %error, "value wall not shown");
                false
            }
        }
    }

    /// Builds the URL, then (under `DismissPrevious`) tears down the tracked
    /// surface, then resolves the anchor and presents.
    ///
    /// The replacement dismissal happens before anchor resolution so the new
    /// surface is never presented from the one being torn down. If anchor
    /// resolution or the host fails after that, the manager stays Idle.
    pub fn try_show_value_wall(
        &mut self,
        options: &PresentationOptions,
    ) -> Result<SurfaceHandle, ShowError> {
        let url = self.value_wall_url()?;
        self.presentation.dismiss_for_replacement(&mut self.host);
        let anchor = self.resolver.resolve_anchor().ok_or(ShowError::NoAnchor)?;
        let handle = self
            .presentation
            .present(&mut self.host, &anchor, url, options)?;
        Ok(handle)
    }

    /// The URL the Value Wall would load for the current session.
    pub fn value_wall_url(&self) -> Result<ValueWallUrl, ShowError> {
        let (mode, player_id, metadata) = self.session.identity().ok_or(ShowError::NotConfigured)?;
        Ok(build_url(mode, player_id, metadata)?)
    }

    /// Dismisses the Value Wall if one is tracked. `completion` always runs,
    /// immediately when nothing is presented.
    pub fn dismiss(&mut self, animated: bool, completion: Option<DismissCompletion>) {
        self.presentation.dismiss(&mut self.host, animated, completion);
    }

    /// Entry point for surface notifications coming back from the host.
    pub fn handle_surface_event(&mut self, handle: SurfaceHandle, event: &SurfaceEvent) -> bool {
        self.presentation.handle_event(handle, event)
    }

    /// Clears configuration and forgets any tracked surface. The surface
    /// itself is not dismissed.
    pub fn reset(&mut self) {
        self.session.reset();
        if let Some(active) = self.presentation.clear() {
            tracing::debug!(handle = %active.handle, "reset dropped tracked value wall surface");
        }
        tracing::debug!("tesoro reset");
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.session.is_configured()
    }

    #[must_use]
    pub fn current_mode(&self) -> Option<Mode> {
        self.session.mode()
    }

    #[must_use]
    pub fn session(&self) -> &SessionConfiguration {
        &self.session
    }

    #[must_use]
    pub fn is_presenting(&self) -> bool {
        self.presentation.is_presenting()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.presentation.is_loading()
    }

    #[must_use]
    pub fn active_presentation(&self) -> Option<&ActivePresentation> {
        self.presentation.active()
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}
