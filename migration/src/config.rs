//! # Migration Configuration & Constants
//!
//! Every magic address, limit and file name the migration relies on lives
//! here. Most of them are one-shot values: they describe the state of
//! `iov-mainnet-2` at export time and the shape `starnamed` v0.40 expects,
//! so changing them is less "tuning" and more "migrating a different chain".
//!
//! The runtime knobs (where to work, what to burn, how long to watch the
//! node boot) are gathered in [`PipelineConfig`], which is passed to the
//! pipeline explicitly. Nothing is read from the environment here.

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Chain Identities
// ---------------------------------------------------------------------------

/// Jestnet, the throwaway chain the genesis test suite boots.
pub const JESTNET_CHAIN_ID: &str = "jestnet";

/// Stargatenet, the public test network.
pub const TESTNET_CHAIN_ID: &str = "stargatenet";

/// The production network after the stargate upgrade.
pub const MAINNET_CHAIN_ID: &str = "iov-mainnet-ibc";

// ---------------------------------------------------------------------------
// Accounts of Note
// ---------------------------------------------------------------------------

/// blackhole*iov. Tokens sent here were meant to disappear; the migration
/// makes that official.
pub const BLACKHOLE_ADDRESS: &str = "star1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqjewks3";

/// `_star1Custodian`, the multisig that held tokens and starnames for
/// holders who never claimed a star1 address.
pub const CUSTODY_REMAINDER_ADDRESS: &str = "star12uv6k3c650kvm2wpa38wwlq8azayq6tlh75d3y";

/// The custody destination is whoever owns `custodian*iov` at export time.
pub const CUSTODIAN_NAME: &str = "custodian";

/// Domain of the custody destination starname.
pub const CUSTODIAN_DOMAIN: &str = "iov";

/// Name of the staking module account that holds bonded tokens.
pub const BONDED_POOL_NAME: &str = "bonded_tokens_pool";

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Production fee and staking denomination.
pub const MAINNET_DENOM: &str = "uiov";

/// Test network denomination, deliberately different so nobody mistakes
/// test tokens for real ones.
pub const TESTNET_DENOM: &str = "uvoi";

/// Base units per unit of tendermint voting power.
pub const POWER_REDUCTION: u64 = 1_000_000;

// ---------------------------------------------------------------------------
// Consensus Parameters (values taken from cosmoshub-4)
// ---------------------------------------------------------------------------

/// Maximum evidence size in bytes.
pub const EVIDENCE_MAX_BYTES: &str = "50000";

/// Maximum evidence age: 48 hours, in nanoseconds.
pub const EVIDENCE_MAX_AGE_DURATION: &str = "172800000000000";

/// Maximum evidence age in blocks.
pub const EVIDENCE_MAX_AGE_NUM_BLOCKS: &str = "1000000";

// ---------------------------------------------------------------------------
// Monetary Policy
// ---------------------------------------------------------------------------

/// The zero of cosmos-sdk `sdk.Dec`, 18 decimal places.
pub const DEC_ZERO: &str = "0.000000000000000000";

/// Expected blocks per year at ~7.2s block time.
pub const BLOCKS_PER_YEAR: &str = "4360000";

/// Bonded ratio goal. Must stay strictly positive: the v0.40 mint module
/// divides by it and panics on zero.
pub const GOAL_BONDED: &str = "0.670000000000000000";

// ---------------------------------------------------------------------------
// Subsystem Defaults
// ---------------------------------------------------------------------------

/// The only IBC light client enabled on mainnet.
pub const IBC_TENDERMINT_CLIENT: &str = "07-tendermint";

/// Additional client enabled on the test network.
pub const IBC_SOLOMACHINE_CLIENT: &str = "06-solomachine";

/// ICS-20 transfer port.
pub const TRANSFER_PORT_ID: &str = "transfer";

/// Wasm access type that nobody can satisfy. Contracts arrive by governance only.
pub const WASM_PERMISSION_NOBODY: &str = "Nobody";

/// Maximum wasm code size in bytes (1.2 MiB).
pub const WASM_MAX_CODE_SIZE: &str = "1228800";

/// Production unbonding period: 21 days.
pub const MAINNET_UNBONDING_TIME: &str = "1814400s";

// ---------------------------------------------------------------------------
// External Runtime
// ---------------------------------------------------------------------------

/// Name of the chain executable looked up on `PATH`.
pub const STARNAMED: &str = "starnamed";

/// Target schema version passed to `starnamed migrate`.
pub const TARGET_SCHEMA_VERSION: &str = "v0.40";

/// Substring tendermint prints once the node has loaded its validator key
/// and is taking part in consensus.
pub const READINESS_MARKER: &str = "This node is a validator";

/// Intermediate artifact: the patched v0.39 document.
pub const LAUNCHPAD_FILE: &str = "launchpad.json";

/// Final artifact: the converted v0.40 genesis.
pub const GENESIS_FILE: &str = "genesis.json";

/// Height state written by the private validator, relative to home.
pub const HEIGHT_STATE_FILE: &str = "data/priv_validator_state.json";

/// Files and directories a boot-validation run leaves behind that have no
/// business in a release bundle. Relative to home.
pub const BOOT_BYPRODUCTS: &[&str] = &[
    "config/addrbook.json",
    "data/application.db",
    "data/blockstore.db",
    "data/cs.wal",
    "data/evidence.db",
    "data/snapshots",
    "data/state.db",
    "data/tx_index.db",
    "data/wasm",
];

/// Default settle window before a readiness marker is honored.
pub const DEFAULT_SETTLE_WINDOW: Duration = Duration::from_secs(5);

/// Default upper bound on a boot-validation run.
pub const DEFAULT_BOOT_TIMEOUT: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Reference to a starname (`name*domain`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NameRef {
    /// Name part, left of the `*`.
    pub name: String,
    /// Domain part, right of the `*`.
    pub domain: String,
}

impl std::fmt::Display for NameRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.name, self.domain)
    }
}

/// Runtime configuration for one pipeline run.
///
/// `home` is owned exclusively by the run. Two concurrent runs must use
/// different homes; nothing here locks it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Working directory handed to both `starnamed` invocations.
    pub home: PathBuf,
    /// File name of the intermediate artifact under `<home>/config`.
    pub launchpad_file: String,
    /// File name of the final artifact under `<home>/config`.
    pub genesis_file: String,
    /// Accounts whose tokens are destroyed.
    pub flammable: Vec<String>,
    /// Account swept into the custody destination.
    pub custody_source: String,
    /// Starname whose owner receives the custody sweep.
    pub custody_destination: NameRef,
    /// Whether to boot the converted genesis at all.
    pub boot_validation: bool,
    /// Substring that marks the node as booted.
    pub readiness_marker: String,
    /// Minimum time the node must run before the marker counts.
    #[serde(with = "duration_secs")]
    pub settle_window: Duration,
    /// Hard limit on the boot-validation run.
    #[serde(with = "duration_secs")]
    pub boot_timeout: Duration,
    /// Height state file, relative to `home`.
    pub height_state_file: PathBuf,
    /// Byproducts removed after boot validation, relative to `home`.
    pub byproducts: Vec<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from("data"),
            launchpad_file: LAUNCHPAD_FILE.to_string(),
            genesis_file: GENESIS_FILE.to_string(),
            flammable: vec![BLACKHOLE_ADDRESS.to_string()],
            custody_source: CUSTODY_REMAINDER_ADDRESS.to_string(),
            custody_destination: NameRef {
                name: CUSTODIAN_NAME.to_string(),
                domain: CUSTODIAN_DOMAIN.to_string(),
            },
            boot_validation: true,
            readiness_marker: READINESS_MARKER.to_string(),
            settle_window: DEFAULT_SETTLE_WINDOW,
            boot_timeout: DEFAULT_BOOT_TIMEOUT,
            height_state_file: PathBuf::from(HEIGHT_STATE_FILE),
            byproducts: BOOT_BYPRODUCTS.iter().map(PathBuf::from).collect(),
        }
    }
}

impl PipelineConfig {
    /// Defaults rooted at `home`.
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            ..Default::default()
        }
    }

    /// `<home>/config`
    pub fn config_dir(&self) -> PathBuf {
        self.home.join("config")
    }

    /// Full path of the intermediate artifact.
    pub fn launchpad_path(&self) -> PathBuf {
        self.config_dir().join(&self.launchpad_file)
    }

    /// Full path of the final artifact.
    pub fn genesis_path(&self) -> PathBuf {
        self.config_dir().join(&self.genesis_file)
    }
}

/// Durations in config files are plain seconds (fractions allowed).
mod duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids_are_distinct() {
        assert_ne!(JESTNET_CHAIN_ID, TESTNET_CHAIN_ID);
        assert_ne!(TESTNET_CHAIN_ID, MAINNET_CHAIN_ID);
        assert_ne!(JESTNET_CHAIN_ID, MAINNET_CHAIN_ID);
    }

    #[test]
    fn test_denoms_differ_between_networks() {
        // Test tokens must never look like real ones.
        assert_ne!(MAINNET_DENOM, TESTNET_DENOM);
    }

    #[test]
    fn test_goal_bonded_is_positive() {
        let goal: f64 = GOAL_BONDED.parse().unwrap();
        assert!(goal > 0.0);
    }

    #[test]
    fn test_default_paths() {
        let config = PipelineConfig::with_home("/tmp/home");
        assert_eq!(
            config.launchpad_path(),
            PathBuf::from("/tmp/home/config/launchpad.json")
        );
        assert_eq!(
            config.genesis_path(),
            PathBuf::from("/tmp/home/config/genesis.json")
        );
        assert_eq!(config.flammable, vec![BLACKHOLE_ADDRESS.to_string()]);
        assert!(config.boot_validation);
    }

    #[test]
    fn test_partial_config_file_keeps_defaults() {
        let config: PipelineConfig = serde_json::from_str(
            r#"{ "home": "/srv/star", "settle_window": 1.5, "boot_validation": false }"#,
        )
        .unwrap();

        assert_eq!(config.home, PathBuf::from("/srv/star"));
        assert_eq!(config.settle_window, Duration::from_millis(1500));
        assert!(!config.boot_validation);
        assert_eq!(config.readiness_marker, READINESS_MARKER);
        assert_eq!(config.custody_destination.to_string(), "custodian*iov");
        assert_eq!(config.byproducts.len(), BOOT_BYPRODUCTS.len());
    }

    #[test]
    fn test_settle_window_shorter_than_timeout() {
        assert!(DEFAULT_SETTLE_WINDOW < DEFAULT_BOOT_TIMEOUT);
    }
}
