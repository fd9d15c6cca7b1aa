// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Starname Genesis Builder
//!
//! Entry point for the `starname-genesis` binary. Parses arguments,
//! initializes logging, reads the exported state and runs the migration
//! pipeline against the real `starnamed` executable.
//!
//! - `migrate` : patch, convert and boot-validate an exported state
//! - `version` : print build version information

mod cli;
mod logging;

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;

use starname_migration::config::{JESTNET_CHAIN_ID, MAINNET_CHAIN_ID, TESTNET_CHAIN_ID};
use starname_migration::mutators::ValidatorKey;
use starname_migration::patch::TestnetParams;
use starname_migration::process::{StarnamedConversion, StarnamedValidation};
use starname_migration::{ChainPatch, MigrationPipeline, PipelineConfig, StateDocument};

use cli::{Commands, GenesisCli, MigrateArgs, Network};

const DEFAULT_LOG_DIRECTIVE: &str = "starname_genesis=info,starname_migration=info";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = GenesisCli::parse();

    match cli.command {
        Commands::Migrate(args) => migrate(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Runs one migration and prints a summary of the result.
async fn migrate(args: MigrateArgs) -> Result<()> {
    logging::init_logging(DEFAULT_LOG_DIRECTIVE, args.log_format);

    let config = load_config(&args)?;
    let validator = args
        .validator_key
        .as_deref()
        .map(load_validator_key)
        .transpose()?;
    let patch = build_patch(args.network, validator)?;
    let chain_id = patch.expected_chain_id();

    tracing::info!(
        network = ?args.network,
        exported = %args.exported.display(),
        home = %config.home.display(),
        boot_validation = config.boot_validation,
        "starting migration"
    );

    let mut doc = StateDocument::read(&args.exported)
        .with_context(|| format!("failed to load exported state {}", args.exported.display()))?;
    // Exports carry the old chain id; the operator's choice of network
    // decides the identity.
    tracing::info!(from = %doc.chain_id, to = chain_id, "stamping chain id");
    doc.chain_id = chain_id.to_string();

    let genesis_path = config.genesis_path();
    let mut pipeline = MigrationPipeline::new(
        config,
        patch,
        StarnamedConversion::new(&args.starnamed),
        StarnamedValidation::new(&args.starnamed),
    );

    let genesis = pipeline
        .run(doc)
        .await
        .with_context(|| format!("migration for {} failed", chain_id))?;

    let summary = Summary::of(&genesis);
    println!("Genesis built successfully.");
    println!("  Chain id   : {}", summary.chain_id);
    println!("  Validators : {}", summary.validators);
    println!("  Genesis    : {}", genesis_path.display());

    Ok(())
}

/// Pipeline configuration from the optional file, with flags applied on top.
fn load_config(args: &MigrateArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    config.home = args.home.clone();
    if args.skip_boot {
        config.boot_validation = false;
    }
    Ok(config)
}

fn load_validator_key(path: &Path) -> Result<ValidatorKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read validator key {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse validator key {}", path.display()))
}

fn build_patch(network: Network, validator: Option<ValidatorKey>) -> Result<ChainPatch> {
    let patch = match network {
        Network::Jestnet => {
            if validator.is_some() {
                tracing::warn!("jestnet takes no validator; ignoring --validator-key");
            }
            ChainPatch::Jestnet
        }
        Network::Stargatenet => match validator {
            Some(key) => ChainPatch::Testnet(TestnetParams::stargatenet(key)),
            None => bail!("stargatenet needs --validator-key"),
        },
        Network::Mainnet => {
            if validator.is_some() {
                tracing::warn!("validator injected into mainnet: rehearsal only, do not publish");
            }
            ChainPatch::Mainnet { validator }
        }
    };
    Ok(patch)
}

/// What gets printed once the pipeline is done.
#[derive(Debug, PartialEq, Eq)]
struct Summary {
    chain_id: String,
    validators: usize,
}

impl Summary {
    /// Reads the converted genesis. v0.40 keeps the staking validators
    /// under `app_state.staking.validators`; a missing list counts as zero.
    fn of(genesis: &Value) -> Self {
        Self {
            chain_id: genesis["chain_id"].as_str().unwrap_or_default().to_string(),
            validators: genesis["app_state"]["staking"]["validators"]
                .as_array()
                .map_or(0, Vec::len),
        }
    }
}

/// Prints version information to stdout.
fn print_version() {
    println!("starname-genesis {}", env!("CARGO_PKG_VERSION"));
    println!("networks         {}, {}, {}", JESTNET_CHAIN_ID, TESTNET_CHAIN_ID, MAINNET_CHAIN_ID);
}
