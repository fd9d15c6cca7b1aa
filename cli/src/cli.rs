//! # CLI Interface
//!
//! `starname-genesis` argument structure, clap derive. Two subcommands:
//! `migrate` and `version`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::logging::LogFormat;

/// Builds a stargate genesis from an exported `iov-mainnet-2` state.
///
/// The exported document is patched for the chosen network, converted by
/// `starnamed migrate` and, unless told otherwise, booted once to prove
/// the result is usable.
#[derive(Parser, Debug)]
#[command(
    name = "starname-genesis",
    about = "Starname stargate genesis builder",
    version,
    propagate_version = true
)]
pub struct GenesisCli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Patch, convert and validate an exported state.
    Migrate(MigrateArgs),
    /// Print version information and exit.
    Version,
}

/// Target network of a migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Network {
    /// The genesis test-suite chain.
    Jestnet,
    /// The public test network.
    Stargatenet,
    /// Production.
    Mainnet,
}

/// Arguments for the `migrate` subcommand.
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Network to build the genesis for.
    #[arg(long, value_enum, env = "STARNAME_NETWORK")]
    pub network: Network,

    /// Exported `iov-mainnet-2` state (JSON).
    #[arg(long, env = "STARNAME_EXPORTED")]
    pub exported: PathBuf,

    /// Home directory handed to `starnamed`. The artifacts land in
    /// `<home>/config`.
    #[arg(long, env = "STARNAME_HOME")]
    pub home: PathBuf,

    /// Pipeline configuration file (JSON). Omitted fields keep their
    /// defaults; `--home` always wins over the file.
    #[arg(long, short = 'c', env = "STARNAME_CONFIG")]
    pub config: Option<PathBuf>,

    /// `starnamed` executable.
    #[arg(long, env = "STARNAMED", default_value = "starnamed")]
    pub starnamed: PathBuf,

    /// Validator to inject (JSON with moniker, addresses and keys).
    ///
    /// Required for stargatenet. On mainnet it turns the run into a local
    /// boot rehearsal and the genesis must not be published.
    #[arg(long, env = "STARNAME_VALIDATOR_KEY")]
    pub validator_key: Option<PathBuf>,

    /// Stop after the conversion; do not boot the result.
    #[arg(long)]
    pub skip_boot: bool,

    /// Log output format.
    #[arg(long, value_enum, env = "STARNAME_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        GenesisCli::command().debug_assert();
    }

    #[test]
    fn parses_migrate() {
        let cli = GenesisCli::try_parse_from([
            "starname-genesis",
            "migrate",
            "--network",
            "stargatenet",
            "--exported",
            "export.json",
            "--home",
            "/tmp/star",
            "--validator-key",
            "key.json",
            "--skip-boot",
            "--log-format",
            "json",
        ])
        .unwrap();

        let Commands::Migrate(args) = cli.command else {
            panic!("expected migrate");
        };
        assert_eq!(args.network, Network::Stargatenet);
        assert_eq!(args.home, PathBuf::from("/tmp/star"));
        assert_eq!(args.validator_key, Some(PathBuf::from("key.json")));
        assert!(args.skip_boot);
        assert_eq!(args.log_format, LogFormat::Json);
        assert_eq!(args.starnamed, PathBuf::from("starnamed"));
    }

    #[test]
    fn network_is_required() {
        let result = GenesisCli::try_parse_from([
            "starname-genesis",
            "migrate",
            "--exported",
            "export.json",
            "--home",
            "/tmp/star",
        ]);
        assert!(result.is_err());
    }
}
