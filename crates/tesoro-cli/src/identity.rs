use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use tesoro_core::{Metadata, Mode, SdkConfig, resolve_mode};

/// Player identity flags shared by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct IdentityArgs {
    /// production or test. Falls back to the config file, then TESORO_MODE.
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Player identifier sent as the `playerId` query parameter.
    #[arg(long)]
    pub player_id: Option<String>,

    /// Metadata entry as KEY=VALUE; repeatable. Added on top of config metadata.
    #[arg(long = "meta", value_parser = parse_meta_entry)]
    pub meta: Vec<(String, String)>,

    /// JSON or TOML file holding `mode`, `player_id` and `metadata`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn parse_meta_entry(raw: &str) -> Result<(String, String), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("metadata entry `{raw}` must look like KEY=VALUE"));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("metadata entry `{raw}` has an empty key"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn load_config_file(path: &Path) -> Result<SdkConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let is_toml = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("toml"));
    let config = if is_toml {
        SdkConfig::from_toml_str(&raw)
    } else {
        SdkConfig::from_json_str(&raw)
    };
    config.with_context(|| format!("parse config {}", path.display()))
}

/// Merges flags over the optional config file. Flags win for mode and
/// player id; `--meta` entries are layered over file metadata.
pub fn resolve_identity(args: &IdentityArgs) -> Result<SdkConfig> {
    let file = args.config.as_deref().map(load_config_file).transpose()?;

    let (mode, source) = resolve_mode(args.mode.or(file.as_ref().map(|config| config.mode)));
    tracing::debug!(%mode, source = %source, "resolved mode");

    let Some(player_id) = args
        .player_id
        .clone()
        .or_else(|| file.as_ref().map(|config| config.player_id.clone()))
    else {
        bail!("a player id is required (--player-id or config file)");
    };

    let mut metadata = file.and_then(|config| config.metadata);
    if !args.meta.is_empty() {
        metadata
            .get_or_insert_with(Metadata::new)
            .extend(args.meta.iter().cloned());
    }

    Ok(SdkConfig {
        mode,
        player_id,
        metadata,
    })
}
