//! # The Exported-State Document
//!
//! A typed view over the v0.39 export. Only the fields the migration reads
//! or writes are spelled out; everything else rides along in a flattened
//! `extra` map on the nearest struct, so a document survives
//! deserialize → serialize without losing a single key.
//!
//! Field names follow the JSON. Where the JSON name is unhelpful the Rust
//! name differs and `#[serde(rename)]` says so (the starname module calls
//! its names "accounts", which collides with the auth accounts).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::amount::Amount;
use super::lenient;

/// Unknown keys preserved verbatim.
pub type Extra = Map<String, Value>;

// ---------------------------------------------------------------------------
// Root
// ---------------------------------------------------------------------------

/// The whole exported snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDocument {
    pub chain_id: String,
    pub consensus_params: ConsensusParams,
    pub app_state: AppState,
    /// Genesis validator set (tendermint side).
    #[serde(default)]
    pub validators: Vec<GenesisValidator>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Tendermint engine parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsensusParams {
    pub evidence: EvidenceParams,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Evidence limits. v0.39 has `max_age`/`max_num`, v0.40 the other three.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age_num_blocks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_num: Option<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// An entry of the tendermint genesis validator set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenesisValidator {
    pub address: String,
    pub pub_key: PubKey,
    pub power: Amount,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Amino-typed public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubKey {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// App State
// ---------------------------------------------------------------------------

/// Per-module application state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    pub auth: AuthState,
    pub supply: SupplyState,
    pub staking: StakingState,
    #[serde(default)]
    pub distribution: DistributionState,
    #[serde(default)]
    pub slashing: SlashingState,
    pub mint: MintState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gov: Option<GovState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crisis: Option<CrisisState>,
    pub configuration: ConfigurationState,
    #[serde(rename = "starname")]
    pub domain_registry: DomainRegistry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ibc: Option<IbcState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer: Option<TransferState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<CapabilityState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wasm: Option<WasmState>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Auth & Supply
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Amino envelope around an account.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: BaseAccount,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Amino type of plain user accounts.
pub const BASE_ACCOUNT_TYPE: &str = "cosmos-sdk/Account";

/// Amino type of module accounts (fee collector, bonded pool, ...).
pub const MODULE_ACCOUNT_TYPE: &str = "cosmos-sdk/ModuleAccount";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BaseAccount {
    pub address: String,
    #[serde(default)]
    pub coins: Vec<Coin>,
    #[serde(default)]
    pub public_key: Value,
    #[serde(default, with = "lenient")]
    pub account_number: String,
    #[serde(default, with = "lenient")]
    pub sequence: String,
    /// Module accounts only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Account {
    /// A fresh, never-used user account.
    pub fn new(address: &str, coins: Vec<Coin>) -> Self {
        Self {
            kind: BASE_ACCOUNT_TYPE.to_string(),
            value: BaseAccount {
                address: address.to_string(),
                coins,
                public_key: Value::Null,
                account_number: "0".to_string(),
                sequence: "0".to_string(),
                name: None,
                extra: Extra::new(),
            },
            extra: Extra::new(),
        }
    }

    /// Attaches a `"//name"` annotation, the convention for labelling
    /// hand-made accounts in genesis files.
    pub fn labelled(mut self, label: &str) -> Self {
        self.extra
            .insert("//name".to_string(), Value::String(label.to_string()));
        self
    }

    pub fn address(&self) -> &str {
        &self.value.address
    }

    /// Balance of `denom`, zero when the account holds none.
    pub fn balance(&self, denom: &str) -> Amount {
        self.value
            .coins
            .iter()
            .filter(|c| c.denom == denom)
            .map(|c| c.amount)
            .sum()
    }
}

/// `{denom, amount}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Amount,
}

impl Coin {
    pub fn new(denom: &str, amount: impl Into<Amount>) -> Self {
        Self {
            denom: denom.to_string(),
            amount: amount.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SupplyState {
    #[serde(default)]
    pub supply: Vec<Coin>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Staking
// ---------------------------------------------------------------------------

/// Status code of a bonded validator in v0.39 amino JSON.
pub const STATUS_BONDED: u8 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingState {
    pub params: StakingParams,
    pub last_total_power: Amount,
    #[serde(default)]
    pub last_validator_powers: Vec<ValidatorPower>,
    #[serde(default)]
    pub validators: Vec<StakingValidator>,
    #[serde(default)]
    pub delegations: Vec<Delegation>,
    #[serde(default)]
    pub unbonding_delegations: Vec<Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingParams {
    pub unbonding_time: String,
    pub max_validators: u32,
    pub bond_denom: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidatorPower {
    #[serde(rename = "Address")]
    pub address: String,
    #[serde(rename = "Power")]
    pub power: Amount,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StakingValidator {
    pub operator_address: String,
    pub consensus_pubkey: String,
    #[serde(default)]
    pub jailed: bool,
    pub status: u8,
    pub tokens: Amount,
    pub delegator_shares: String,
    pub description: Description,
    #[serde(default, with = "lenient")]
    pub unbonding_height: String,
    #[serde(default)]
    pub unbonding_time: String,
    pub commission: Value,
    #[serde(default, with = "lenient")]
    pub min_self_delegation: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub identity: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub security_contact: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator_address: String,
    pub validator_address: String,
    pub shares: String,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Distribution & Slashing
// ---------------------------------------------------------------------------

/// Reward bookkeeping, one list per record kind, each keyed by validator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistributionState {
    #[serde(default)]
    pub outstanding_rewards: Vec<ValidatorRecord>,
    #[serde(default)]
    pub validator_accumulated_commissions: Vec<ValidatorRecord>,
    #[serde(default)]
    pub validator_historical_rewards: Vec<ValidatorRecord>,
    #[serde(default)]
    pub validator_current_rewards: Vec<ValidatorRecord>,
    #[serde(default)]
    pub delegator_starting_infos: Vec<ValidatorRecord>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A distribution record: the validator key plus whatever body the record
/// kind carries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub validator_address: String,
    #[serde(flatten)]
    pub body: Extra,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SlashingState {
    /// Keyed by consensus address.
    #[serde(default)]
    pub signing_infos: BTreeMap<String, Value>,
    /// Keyed by consensus address.
    #[serde(default)]
    pub missed_blocks: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Mint, Gov, Crisis
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MintState {
    pub minter: Minter,
    pub params: MintParams,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minter {
    pub inflation: String,
    pub annual_provisions: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MintParams {
    pub mint_denom: String,
    pub inflation_rate_change: String,
    pub inflation_max: String,
    pub inflation_min: String,
    pub goal_bonded: String,
    #[serde(with = "lenient")]
    pub blocks_per_year: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GovState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_params: Option<DepositParams>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DepositParams {
    #[serde(default)]
    pub min_deposit: Vec<Coin>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrisisState {
    pub constant_fee: Coin,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// A configuration value. The export mixes JSON numbers (counts) and
/// strings (durations in nanoseconds, decimal fees, addresses).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Count(u64),
    Text(String),
    Other(Value),
}

impl ConfigValue {
    pub fn text(s: impl Into<String>) -> Self {
        ConfigValue::Text(s.into())
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationState {
    pub config: BTreeMap<String, ConfigValue>,
    #[serde(default)]
    pub fees: BTreeMap<String, ConfigValue>,
    #[serde(flatten)]
    pub extra: Extra,
}

// ---------------------------------------------------------------------------
// Domain Registry
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DomainRegistry {
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default, rename = "accounts")]
    pub names: Vec<Name>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
    pub admin: String,
    #[serde(default, with = "lenient")]
    pub valid_until: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Name {
    pub domain: String,
    #[serde(default)]
    pub name: String,
    pub owner: String,
    #[serde(default, with = "lenient")]
    pub valid_until: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificates: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_uri: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub resource: String,
}

// ---------------------------------------------------------------------------
// Injected Subsystems
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IbcState {
    pub client_genesis: ClientGenesis,
    pub connection_genesis: ConnectionGenesis,
    pub channel_genesis: ChannelGenesis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientGenesis {
    pub clients: Vec<Value>,
    pub clients_consensus: Vec<Value>,
    pub create_localhost: bool,
    pub params: ClientParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientParams {
    pub allowed_clients: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionGenesis {
    pub connections: Vec<Value>,
    pub client_connection_paths: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelGenesis {
    pub channels: Vec<Value>,
    pub acknowledgements: Vec<Value>,
    pub commitments: Vec<Value>,
    pub receipts: Vec<Value>,
    pub send_sequences: Vec<Value>,
    pub recv_sequences: Vec<Value>,
    pub ack_sequences: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferState {
    pub port_id: String,
    pub denom_traces: Vec<Value>,
    pub params: TransferParams,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransferParams {
    pub send_enabled: bool,
    pub receive_enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapabilityState {
    pub index: String,
    pub owners: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WasmState {
    pub params: WasmParams,
    pub codes: Vec<Value>,
    pub contracts: Vec<Value>,
    pub sequences: Vec<Value>,
    pub gen_msgs: Vec<Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WasmParams {
    pub code_upload_access: AccessConfig,
    pub instantiate_default_permission: String,
    pub max_wasm_code_size: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    pub permission: String,
    pub address: String,
}
