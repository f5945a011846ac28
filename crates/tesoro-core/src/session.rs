use std::collections::BTreeMap;

use crate::mode::Mode;

/// Caller-supplied key/value pairs forwarded to the Value Wall.
///
/// A `BTreeMap` keeps keys in ascending order, which is the order the URL
/// builder emits them in.
pub type Metadata = BTreeMap<String, String>;

/// Identity and metadata of the current player session.
///
/// Configured iff both a mode and a player id are present; metadata is
/// optional. `configure` replaces every field, it never merges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionConfiguration {
    mode: Option<Mode>,
    player_id: Option<String>,
    metadata: Option<Metadata>,
}

impl SessionConfiguration {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Player id is not validated; an empty string is accepted.
    pub fn configure(
        &mut self,
        mode: Mode,
        player_id: impl Into<String>,
        metadata: Option<Metadata>,
    ) {
        self.mode = Some(mode);
        self.player_id = Some(player_id.into());
        self.metadata = metadata;
    }

    pub fn reset(&mut self) {
        self.mode = None;
        self.player_id = None;
        self.metadata = None;
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.mode.is_some() && self.player_id.is_some()
    }

    #[must_use]
    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    #[must_use]
    pub fn player_id(&self) -> Option<&str> {
        self.player_id.as_deref()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        self.metadata.as_ref()
    }

    /// Returns the configured `(mode, player_id, metadata)` triple, or `None`
    /// when the session is not configured.
    #[must_use]
    pub fn identity(&self) -> Option<(Mode, &str, Option<&Metadata>)> {
        match (self.mode, self.player_id.as_deref()) {
            (Some(mode), Some(player_id)) => Some((mode, player_id, self.metadata.as_ref())),
            _ => None,
        }
    }
}
