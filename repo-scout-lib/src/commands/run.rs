//! Command dispatch logic for repo-scout

use super::{InitArgs, ScanArgs, init_config, scan};
use crate::{Host, Result};
use clap::builder::Styles;
use clap::builder::styling::{AnsiColor, Effects};
use clap::{Parser, Subcommand};

const CLAP_STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[derive(Parser, Debug)]
#[command(name = "repo-scout", version, author, long_about = None)]
#[command(about = "Discover GitHub repositories and score them against evaluation rules")]
#[command(styles = CLAP_STYLES)]
struct Cli {
    #[command(subcommand)]
    command: ScoutSubcommand,
}

#[derive(Subcommand, Debug)]
enum ScoutSubcommand {
    /// Discover repositories, evaluate them and write the results to a CSV file
    Scan(Box<ScanArgs>),
    /// Generate a default configuration file
    Init(InitArgs),
}

/// Dispatch command-line arguments to the appropriate handler
///
/// This function parses the command-line arguments and executes the corresponding
/// subcommand. It's designed to be called from main.rs with the program arguments.
///
/// # Errors
///
/// Returns an error if command parsing fails or if the executed command fails
pub async fn run<I, T, H>(host: &mut H, args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
    H: Host,
{
    match &Cli::parse_from(args).command {
        ScoutSubcommand::Scan(scan_args) => scan(host, scan_args).await,
        ScoutSubcommand::Init(init_args) => init_config(host, init_args),
    }
}
