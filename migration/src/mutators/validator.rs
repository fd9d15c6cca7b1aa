//! InjectDominantValidator -- lets a single operator-controlled node produce
//! blocks on a copy of the network.
//!
//! The injected validator gets four times the voting power of everybody
//! else combined, i.e. 80% of the new total, comfortably past the 2/3 that
//! tendermint needs to commit. Everything the staking, distribution and
//! slashing modules cross-check at genesis is written alongside it:
//!
//! ```text
//! auth          funding account (created if absent) + bonded pool credit
//! supply        + power × 10^6 of the bond denom
//! staking       validator, self-delegation, last power, totals
//! distribution  outstanding, commission, historical(0), current(1), starting info
//! slashing      signing info + empty missed-block list
//! validators    tendermint genesis entry
//! ```
//!
//! Run it after any denomination rename; it reads the bond denom as it is.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::{Effect, Mutator};
use crate::config::{BONDED_POOL_NAME, POWER_REDUCTION};
use crate::error::{MigrationError, MigrationResult};
use crate::state::{
    add_coin, Account, Amount, Delegation, Description, Extra, GenesisValidator, PubKey,
    StakingValidator, StateDocument, ValidatorPower, ValidatorRecord, STATUS_BONDED,
};

/// Voting power multiple of the existing set.
const DOMINANCE: u64 = 4;

const EPOCH: &str = "1970-01-01T00:00:00Z";

/// Identity of the validator to inject, as produced by the key export
/// helper next to the node's `priv_validator_key.json`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorKey {
    pub moniker: String,
    /// `star1…` self-delegator.
    pub account_address: String,
    /// `starvaloper1…`
    pub operator_address: String,
    /// `starvalconspub1…`
    pub consensus_pubkey: String,
    /// `starvalcons1…`, the slashing module key.
    pub consensus_address: String,
    /// Hex address in the tendermint validator set.
    pub tendermint_address: String,
    /// Base64 ed25519 public key.
    pub tendermint_pubkey: String,
}

#[derive(Clone, Debug)]
pub struct InjectDominantValidator {
    key: ValidatorKey,
}

impl InjectDominantValidator {
    pub fn new(key: ValidatorKey) -> Self {
        Self { key }
    }

    fn record(&self, body: Value) -> ValidatorRecord {
        let body = match body {
            Value::Object(map) => map,
            _ => Extra::new(),
        };
        ValidatorRecord {
            validator_address: self.key.operator_address.clone(),
            body,
        }
    }

    fn staking_validator(&self, tokens: Amount, update_time: &str) -> StakingValidator {
        StakingValidator {
            operator_address: self.key.operator_address.clone(),
            consensus_pubkey: self.key.consensus_pubkey.clone(),
            jailed: false,
            status: STATUS_BONDED,
            tokens,
            delegator_shares: tokens.to_dec_string(),
            description: Description {
                moniker: self.key.moniker.clone(),
                ..Description::default()
            },
            unbonding_height: "0".to_string(),
            unbonding_time: EPOCH.to_string(),
            commission: json!({
                "commission_rates": {
                    "rate": "0.100000000000000000",
                    "max_rate": "0.200000000000000000",
                    "max_change_rate": "0.010000000000000000"
                },
                "update_time": update_time
            }),
            min_self_delegation: "1".to_string(),
            extra: Extra::new(),
        }
    }

    fn check_absent(&self, doc: &StateDocument) -> MigrationResult<()> {
        let staking = &doc.app_state.staking;
        if staking
            .validators
            .iter()
            .any(|v| v.operator_address == self.key.operator_address)
        {
            return Err(MigrationError::AlreadyPresent(format!(
                "staking validator {}",
                self.key.operator_address
            )));
        }
        if doc
            .validators
            .iter()
            .any(|v| v.address == self.key.tendermint_address)
        {
            return Err(MigrationError::AlreadyPresent(format!(
                "genesis validator {}",
                self.key.tendermint_address
            )));
        }
        Ok(())
    }
}

impl Mutator for InjectDominantValidator {
    fn name(&self) -> &'static str {
        "InjectDominantValidator"
    }

    fn effect(&self) -> Effect {
        Effect::Balances
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let existing = doc.total_validator_power();
        if existing.is_zero() {
            return Err(MigrationError::InvariantViolation(
                "existing validator set has no voting power".to_string(),
            ));
        }
        self.check_absent(doc)?;

        let power = existing.checked_mul(DOMINANCE)?;
        let tokens = power.checked_mul(POWER_REDUCTION)?;
        let denom = doc.app_state.staking.params.bond_denom.clone();
        let key = &self.key;

        // -- auth & supply ----------------------------------------------------
        let pool = doc
            .module_account_mut(BONDED_POOL_NAME)
            .ok_or_else(|| {
                MigrationError::NotFound(format!("module account {}", BONDED_POOL_NAME))
            })?;
        add_coin(&mut pool.value.coins, &denom, tokens)?;
        doc.increase_supply(&denom, tokens)?;

        if doc.account(&key.account_address).is_none() {
            doc.app_state
                .auth
                .accounts
                .push(Account::new(&key.account_address, Vec::new()).labelled(&key.moniker));
        }

        // -- staking ----------------------------------------------------------
        let update_time = doc
            .extra
            .get("genesis_time")
            .and_then(Value::as_str)
            .unwrap_or(EPOCH)
            .to_string();
        let staking = &mut doc.app_state.staking;
        staking.validators.push(self.staking_validator(tokens, &update_time));
        staking.delegations.push(Delegation {
            delegator_address: key.account_address.clone(),
            validator_address: key.operator_address.clone(),
            shares: tokens.to_dec_string(),
            extra: Extra::new(),
        });
        staking.last_validator_powers.push(ValidatorPower {
            address: key.operator_address.clone(),
            power,
        });
        staking.last_total_power = staking.last_total_power.checked_add(power)?;
        staking.params.max_validators = staking.params.max_validators.saturating_add(1);

        // -- distribution -----------------------------------------------------
        let distribution = &mut doc.app_state.distribution;
        distribution
            .outstanding_rewards
            .push(self.record(json!({ "outstanding_rewards": [] })));
        distribution
            .validator_accumulated_commissions
            .push(self.record(json!({ "accumulated": [] })));
        distribution.validator_historical_rewards.push(self.record(json!({
            "period": "0",
            "rewards": { "cumulative_reward_ratio": [], "reference_count": 2 }
        })));
        distribution.validator_current_rewards.push(self.record(json!({
            "rewards": { "rewards": [], "period": "1" }
        })));
        distribution.delegator_starting_infos.push(self.record(json!({
            "delegator_address": key.account_address,
            "starting_info": {
                "previous_period": "0",
                "stake": tokens.to_dec_string(),
                "height": "0"
            }
        })));

        // -- slashing ---------------------------------------------------------
        let slashing = &mut doc.app_state.slashing;
        slashing.signing_infos.insert(
            key.consensus_address.clone(),
            json!({
                "address": key.consensus_address,
                "start_height": "0",
                "index_offset": "0",
                "jailed_until": EPOCH,
                "tombstoned": false,
                "missed_blocks_counter": "0"
            }),
        );
        slashing
            .missed_blocks
            .insert(key.consensus_address.clone(), json!([]));

        // -- tendermint -------------------------------------------------------
        doc.validators.push(GenesisValidator {
            address: key.tendermint_address.clone(),
            pub_key: PubKey {
                kind: "tendermint/PubKeyEd25519".to_string(),
                value: key.tendermint_pubkey.clone(),
            },
            power,
            name: key.moniker.clone(),
            extra: Extra::new(),
        });

        info!(
            operator = %key.operator_address,
            %power,
            %tokens,
            %denom,
            "dominant validator injected"
        );
        Ok(())
    }
}
