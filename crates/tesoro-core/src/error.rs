use crate::presentation::HostError;
use crate::url_builder::UrlBuildError;

/// Why a Value Wall presentation was not initiated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShowError {
    #[error("tesoro sdk is not configured; call configure() first")]
    NotConfigured,
    #[error("unable to find a screen to present the value wall from")]
    NoAnchor,
    #[error(transparent)]
    UrlBuild(#[from] UrlBuildError),
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ShowError {
    /// Stable code for logs and the C bridge.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::NoAnchor => "no_anchor",
            Self::UrlBuild(_) => "url_build_failed",
            Self::Host(_) => "host_present_failed",
        }
    }
}
