use std::fmt;

use url::Url;
use url::form_urlencoded;

use crate::mode::Mode;
use crate::session::Metadata;

pub const PLAYER_ID_PARAM: &str = "playerId";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlBuildError {
    #[error("value wall url `{url}` failed to parse: {message}")]
    Malformed { url: String, message: String },
}

/// A fully-qualified Value Wall URL.
///
/// `as_str` returns the exact assembled text (the base endpoint is not
/// normalized with a trailing `/`); `url` exposes the parsed form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWallUrl {
    raw: String,
    parsed: Url,
}

impl ValueWallUrl {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.parsed
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.parsed.query()
    }

    /// Decoded query parameters in emission order.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parsed
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect()
    }
}

impl fmt::Display for ValueWallUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for ValueWallUrl {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Builds the Value Wall URL for a player.
///
/// `playerId` is always the first parameter. Metadata entries follow in
/// ascending key order, so equal inputs always produce byte-identical URLs.
/// Values are encoded by the `application/x-www-form-urlencoded` serializer
/// and are otherwise passed through untouched, including a metadata key that
/// repeats `playerId`.
pub fn build_url(
    mode: Mode,
    player_id: &str,
    metadata: Option<&Metadata>,
) -> Result<ValueWallUrl, UrlBuildError> {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair(PLAYER_ID_PARAM, player_id);
    if let Some(metadata) = metadata {
        // BTreeMap iteration is already sorted by key.
        query.extend_pairs(metadata.iter());
    }

    let raw = format!("{}?{}", mode.base_endpoint(), query.finish());
    let parsed = Url::parse(&raw).map_err(|error| UrlBuildError::Malformed {
        url: raw.clone(),
        message: error.to_string(),
    })?;

    Ok(ValueWallUrl { raw, parsed })
}
