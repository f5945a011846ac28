//! Core of the Tesoro Value Wall SDK.
//!
//! Holds the player session, builds the Value Wall URL, and tracks the single
//! presented web surface. Rendering is left to the host through
//! [`WebSurfaceHost`] and [`AnchorResolver`].

pub mod anchor;
pub mod config;
pub mod error;
pub mod mode;
pub mod options;
pub mod presentation;
pub mod sdk;
pub mod session;
pub mod url_builder;

pub use anchor::{AnchorResolver, ContainerKind, ScreenContainer, TopmostScreenResolver};
pub use config::{SdkConfig, SdkSettings, resolve_mode};
pub use error::ShowError;
pub use mode::Mode;
pub use options::{Color, PresentationOptions};
pub use presentation::{
    ActivePresentation, DismissCompletion, HostError, LoadState, ReplacementPolicy, SurfaceEvent,
    SurfaceHandle, SurfaceRequest, WebSurfaceHost,
};
pub use sdk::Tesoro;
pub use session::{Metadata, SessionConfiguration};
pub use url_builder::{ValueWallUrl, build_url};
