//! CLI for kubedev
//!
//! One positional subcommand, configuration entirely via environment
//! variables / `.env` file:
//! - `kubedev up` - bring the cluster up, merge kubeconfigs, deploy add-ons
//! - `kubedev down` - tear the cluster down
//! - `kubedev restart` - down (failure tolerated) then up
//! - `kubedev prerequisites` - kernel headers + libbpf toolchain
//! - `kubedev containerruntime` - install the container engine
//!
//! Any unrecognized subcommand falls through to `up` with a warning,
//! matching the historical behavior.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;

pub use commands::*;
pub use display::*;

#[derive(Parser, Debug)]
#[command(name = "kubedev")]
#[command(about = "Bootstrap a local development Kubernetes cluster")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a .env file with configuration overrides
    #[arg(long, value_name = "FILE", global = true)]
    pub env_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Bring the cluster up and deploy configured add-ons
    Up,

    /// Tear the cluster down and drop its kubeconfig
    Down,

    /// Tear down (tolerating failure) and bring back up
    Restart,

    /// Install kernel headers and the libbpf toolchain
    Prerequisites,

    /// Install the configured container engine
    #[command(name = "containerruntime", visible_alias = "container-runtime")]
    ContainerRuntime,

    /// Anything else is treated as `up` (historical behavior)
    #[command(external_subcommand)]
    Other(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_up() {
        let cli = Cli::parse_from(["kubedev", "up"]);
        assert!(matches!(cli.command, Commands::Up));
    }

    #[test]
    fn test_parse_down() {
        let cli = Cli::parse_from(["kubedev", "down"]);
        assert!(matches!(cli.command, Commands::Down));
    }

    #[test]
    fn test_parse_containerruntime_alias() {
        let cli = Cli::parse_from(["kubedev", "container-runtime"]);
        assert!(matches!(cli.command, Commands::ContainerRuntime));
    }

    #[test]
    fn test_unrecognized_falls_through() {
        let cli = Cli::parse_from(["kubedev", "bogus"]);
        match cli.command {
            Commands::Other(args) => assert_eq!(args[0], "bogus"),
            other => panic!("expected fall-through, got {other:?}"),
        }
    }

    #[test]
    fn test_verbose_count() {
        let cli = Cli::parse_from(["kubedev", "-vv", "up"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_env_file_flag() {
        let cli = Cli::parse_from(["kubedev", "--env-file", "dev.env", "up"]);
        assert_eq!(cli.env_file, Some(PathBuf::from("dev.env")));
    }
}
