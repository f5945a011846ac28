use std::io::Write;

use anyhow::Result;
use clap::{Args, Parser};
use tesoro_core::{Color, PresentationOptions, ReplacementPolicy, SdkSettings, build_url};

mod identity;
mod simulate;

pub use identity::{IdentityArgs, resolve_identity};
pub use simulate::{Step, TranscriptEntry, run_script};

#[derive(Parser)]
#[command(name = "tesoro")]
#[command(about = "Tesoro Value Wall developer CLI")]
pub struct TesoroCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print the Value Wall URL for a player
    Url(UrlArgs),
    /// Drive a presentation lifecycle against an in-process host and print a JSON transcript
    Simulate(SimulateArgs),
}

#[derive(Args, Debug)]
pub struct UrlArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub identity: IdentityArgs,

    /// `label` or a #RRGGBB / #RRGGBBAA hex color
    #[arg(long)]
    pub close_button_color: Option<Color>,

    /// Dismiss the tracked surface before presenting a new one
    #[arg(long)]
    pub dismiss_previous: bool,

    /// Steps to run, in order
    #[arg(
        long = "step",
        value_enum,
        value_delimiter = ',',
        default_values = ["configure", "show", "load-finished", "dismiss"]
    )]
    pub steps: Vec<Step>,
}

pub fn run(out: &mut impl Write) -> Result<()> {
    run_cli(TesoroCli::parse(), out)
}

pub fn run_cli(cli: TesoroCli, out: &mut impl Write) -> Result<()> {
    match cli.command {
        Commands::Url(args) => {
            let identity = resolve_identity(&args.identity)?;
            let url = build_url(
                identity.mode,
                &identity.player_id,
                identity.metadata.as_ref(),
            )?;
            writeln!(out, "{url}")?;
        }
        Commands::Simulate(args) => {
            let identity = resolve_identity(&args.identity)?;
            let settings = SdkSettings {
                replacement_policy: if args.dismiss_previous {
                    ReplacementPolicy::DismissPrevious
                } else {
                    ReplacementPolicy::KeepPrevious
                },
            };
            let options = PresentationOptions {
                close_button_color: args.close_button_color,
            };
            for entry in run_script(&identity, settings, &options, &args.steps) {
                writeln!(out, "{}", serde_json::to_string(&entry)?)?;
            }
        }
    }
    Ok(())
}
