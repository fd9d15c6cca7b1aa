//! Stargatenet -- the public test network.
//!
//! Starts from a real mainnet export so the test network carries real data,
//! then makes it safe and convenient to play with: a handful of well-known
//! accounts get plenty of tokens, durations shrink to minutes, the
//! configurer becomes a test multisig, the token is renamed so test tokens
//! cannot pass for real ones, and a validator the operator controls takes
//! over block production.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::{IBC_SOLOMACHINE_CLIENT, MAINNET_DENOM, TESTNET_DENOM};
use crate::error::{MigrationError, MigrationResult};
use crate::mutators::{
    Effect, InjectDominantValidator, Mutator, MutatorChain, RenameDenomination, ValidatorKey,
};
use crate::state::{Account, Amount, Coin, ConfigValue, Description, StateDocument};

// ---------------------------------------------------------------------------
// Well-known Test Accounts
// ---------------------------------------------------------------------------

const DAVE: &str = "star1478t4fltj689nqu83vsmhz27quk7uggjwe96yk";
const BOJACK: &str = "star1z6rhjmdh2e9s6lvfzfwrh8a3kjuuy58y74l29t";
const FAUCET: &str = "star13hestkc5egttc2d7v4f0kcpxzlr5j0zhyq2jxh";
/// Multisig of w1, w2, w3 and p1 with threshold 3.
const MSIG1: &str = "star1ml9muux6m8w69532lwsu40caecc3vmg2s9nrtg";
const W1: &str = "star19jj4wc3lxd54hkzl42m7ze73rzy3dd3wry2f3q";
const W2: &str = "star1l4mvu36chkj9lczjhy9anshptdfm497fune6la";
const W3: &str = "star1aj9qqrftdqussgpnq6lqj08gwy6ysppf53c8e9";

/// One million tokens.
const RICH: u64 = 1_000_000_000_000;
/// One billion tokens.
const FAUCET_FUNDS: u64 = 1_000_000_000_000_000;

const ASSET_URI: &str = "asset:iov";
const TESTNET_ASSET_URI: &str = "asset-testnet:iov";

/// An account created from scratch on the test network.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestAccount {
    pub label: String,
    pub address: String,
    pub amount: Amount,
}

impl TestAccount {
    fn new(label: &str, address: &str, amount: u64) -> Self {
        Self {
            label: label.to_string(),
            address: address.to_string(),
            amount: Amount::from(amount),
        }
    }
}

/// Everything the test network patch needs to know.
#[derive(Clone, Debug)]
pub struct TestnetParams {
    /// Existing accounts whose balance is raised to `rich_balance`. Absent
    /// ones are skipped: not every export has them.
    pub rich: Vec<String>,
    pub rich_balance: Amount,
    /// Accounts added to the document.
    pub accounts: Vec<TestAccount>,
    /// Who may change the starname configuration.
    pub configurer: String,
    pub denom: String,
    /// Block producer.
    pub validator: ValidatorKey,
}

impl TestnetParams {
    /// The stargatenet setup, with the given block producer.
    pub fn stargatenet(validator: ValidatorKey) -> Self {
        Self {
            rich: vec![DAVE.to_string(), BOJACK.to_string()],
            rich_balance: Amount::from(RICH),
            accounts: vec![
                TestAccount::new("faucet", FAUCET, FAUCET_FUNDS),
                TestAccount::new("msig1", MSIG1, RICH),
                TestAccount::new("w1", W1, RICH),
                TestAccount::new("w2", W2, RICH),
                TestAccount::new("w3", W3, RICH),
            ],
            configurer: MSIG1.to_string(),
            denom: TESTNET_DENOM.to_string(),
            validator,
        }
    }
}

// ---------------------------------------------------------------------------
// Mutators
// ---------------------------------------------------------------------------

/// Raises balances and adds test accounts, minting exactly what it hands out.
#[derive(Clone, Debug)]
pub struct FundTestAccounts {
    rich: Vec<String>,
    rich_balance: Amount,
    accounts: Vec<TestAccount>,
}

impl Mutator for FundTestAccounts {
    fn name(&self) -> &'static str {
        "FundTestAccounts"
    }

    fn effect(&self) -> Effect {
        Effect::Balances
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let denom = doc.app_state.staking.params.bond_denom.clone();

        for address in &self.rich {
            let Some(account) = doc.account_mut(address) else {
                debug!(%address, "test account not in export, skipped");
                continue;
            };
            let held = account.balance(&denom);
            account.value.coins.retain(|c| c.denom != denom);
            account.value.coins.push(Coin::new(&denom, self.rich_balance));

            if self.rich_balance >= held {
                doc.increase_supply(&denom, self.rich_balance.checked_sub(held)?)?;
            } else {
                doc.decrease_supply(&denom, held.checked_sub(self.rich_balance)?)?;
            }
        }

        for test in &self.accounts {
            if doc.account(&test.address).is_some() {
                return Err(MigrationError::AlreadyPresent(format!(
                    "auth account {} ({})",
                    test.address, test.label
                )));
            }
            let account = Account::new(&test.address, vec![Coin::new(&denom, test.amount)]);
            doc.app_state.auth.accounts.push(account.labelled(&test.label));
            doc.increase_supply(&denom, test.amount)?;
        }
        Ok(())
    }
}

/// Test-network limits, configurer and fee schedule.
#[derive(Clone, Debug)]
pub struct TestnetConfiguration {
    configurer: String,
}

impl TestnetConfiguration {
    fn limits(&self) -> Vec<(&'static str, ConfigValue)> {
        vec![
            (
                "//note",
                ConfigValue::text(
                    "msig1 multisig address from w1,w2,w3,p1 in iovns/docs/cli, threshold 3",
                ),
            ),
            ("account_grace_period", ConfigValue::text("60s")),
            ("account_renewal_count_max", ConfigValue::Count(2)),
            ("account_renewal_period", ConfigValue::text("180s")),
            ("resources_max", ConfigValue::Count(10)),
            ("certificate_count_max", ConfigValue::Count(3)),
            ("certificate_size_max", ConfigValue::text("1000")),
            ("configurer", ConfigValue::text(self.configurer.clone())),
            ("domain_grace_period", ConfigValue::text("60s")),
            ("domain_renewal_count_max", ConfigValue::Count(2)),
            ("domain_renewal_period", ConfigValue::text("300s")),
            ("metadata_size_max", ConfigValue::text("1000")),
        ]
    }

    fn fees(denom: &str) -> BTreeMap<String, ConfigValue> {
        [
            ("fee_coin_denom", denom),
            ("fee_coin_price", "0.0000001"),
            ("fee_default", "0.500000000000000000"),
            ("register_account_closed", "0.500000000000000000"),
            ("register_account_open", "0.500000000000000000"),
            ("transfer_account_closed", "0.500000000000000000"),
            ("transfer_account_open", "10.000000000000000000"),
            ("replace_account_resources", "1.000000000000000000"),
            ("add_account_certificate", "50.000000000000000000"),
            ("del_account_certificate", "10.000000000000000000"),
            ("set_account_metadata", "15.000000000000000000"),
            ("register_domain_1", "1000.000000000000000000"),
            ("register_domain_2", "500.000000000000000000"),
            ("register_domain_3", "200.000000000000000000"),
            ("register_domain_4", "100.000000000000000000"),
            ("register_domain_5", "50.000000000000000000"),
            ("register_domain_default", "25.000000000000000000"),
            ("register_open_domain_multiplier", "10.00000000000000000"),
            ("transfer_domain_closed", "12.500000000000000000"),
            ("transfer_domain_open", "125.000000000000000000"),
            ("renew_domain_open", "12345.000000000000000000"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), ConfigValue::text(v)))
        .collect()
    }
}

impl Mutator for TestnetConfiguration {
    fn name(&self) -> &'static str {
        "TestnetConfiguration"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let denom = doc.app_state.staking.params.bond_denom.clone();
        let configuration = &mut doc.app_state.configuration;

        for (key, value) in self.limits() {
            configuration.config.insert(key.to_string(), value);
        }
        configuration.fees = Self::fees(&denom);
        Ok(())
    }
}

/// Points `asset:iov` resources at the test network's asset.
#[derive(Clone, Copy, Debug)]
pub struct RewriteResourceUris;

impl Mutator for RewriteResourceUris {
    fn name(&self) -> &'static str {
        "RewriteResourceUris"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let mut rewritten = 0usize;
        for name in doc.app_state.domain_registry.names.iter_mut() {
            for resource in name.resources.iter_mut().flatten() {
                if resource.uri == ASSET_URI {
                    resource.uri = TESTNET_ASSET_URI.to_string();
                    rewritten += 1;
                }
            }
        }
        info!(rewritten, "resource uris");
        Ok(())
    }
}

/// Adds an IBC light client type to the allow list.
#[derive(Clone, Copy, Debug)]
pub struct AllowLightClient(pub &'static str);

impl Mutator for AllowLightClient {
    fn name(&self) -> &'static str {
        "AllowLightClient"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let ibc = doc
            .app_state
            .ibc
            .as_mut()
            .ok_or_else(|| MigrationError::NotFound("app_state.ibc".to_string()))?;
        let allowed = &mut ibc.client_genesis.params.allowed_clients;
        if !allowed.iter().any(|c| c == self.0) {
            allowed.push(self.0.to_string());
        }
        Ok(())
    }
}

/// Replaces validator descriptions with numbered placeholders. Real
/// operators did not sign up to appear on a test network.
#[derive(Clone, Copy, Debug)]
pub struct AnonymizeValidators;

impl Mutator for AnonymizeValidators {
    fn name(&self) -> &'static str {
        "AnonymizeValidators"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        for (i, validator) in doc.app_state.staking.validators.iter_mut().enumerate() {
            validator.description = Description {
                moniker: format!("validator{}", i + 1),
                ..Description::default()
            };
        }
        Ok(())
    }
}

pub fn mutators(params: &TestnetParams) -> MutatorChain {
    MutatorChain::new()
        .then(FundTestAccounts {
            rich: params.rich.clone(),
            rich_balance: params.rich_balance,
            accounts: params.accounts.clone(),
        })
        .then(TestnetConfiguration {
            configurer: params.configurer.clone(),
        })
        .then(RewriteResourceUris)
        .then(AllowLightClient(IBC_SOLOMACHINE_CLIENT))
        .then(AnonymizeValidators)
        .then(RenameDenomination::new(MAINNET_DENOM, &params.denom))
        .then(InjectDominantValidator::new(params.validator.clone()))
}
