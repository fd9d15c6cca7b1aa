//! # State Module
//!
//! The in-memory exported snapshot and the rules it has to obey.
//!
//! ```text
//! amount.rs      -- U256-backed decimal amounts, never floats
//! document.rs    -- Typed StateDocument with lossless unknown-field carry
//! invariants.rs  -- Supply audit and domain-reference checks
//! ```
//!
//! A `StateDocument` is built once from the export, threaded by `&mut`
//! through the mutators, serialized, and dropped. Nobody else holds it.

pub mod amount;
pub mod document;
pub mod invariants;
mod lenient;

use std::path::Path;

use serde_json::Value;

use crate::error::{MigrationError, MigrationResult};

pub use amount::Amount;
pub use document::*;
pub use invariants::{check_domain_references, check_supply, SupplyAudit};

impl StateDocument {
    /// Parses an exported snapshot.
    pub fn from_json(json: &str) -> MigrationResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses an exported snapshot from disk.
    pub fn read(path: &Path) -> MigrationResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| MigrationError::io(path, e))?;
        Self::from_json(&json)
    }

    /// The document as a JSON tree. Object keys come out sorted because
    /// `serde_json::Map` is a `BTreeMap` without `preserve_order`.
    pub fn to_value(&self) -> MigrationResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical on-disk form: sorted keys, two-space indent.
    pub fn to_canonical_json(&self) -> MigrationResult<String> {
        canonical_json(&self.to_value()?)
    }

    // -- auth -----------------------------------------------------------------

    pub fn accounts(&self) -> &[Account] {
        &self.app_state.auth.accounts
    }

    pub fn account(&self, address: &str) -> Option<&Account> {
        self.accounts().iter().find(|a| a.address() == address)
    }

    pub fn account_mut(&mut self, address: &str) -> Option<&mut Account> {
        self.app_state
            .auth
            .accounts
            .iter_mut()
            .find(|a| a.address() == address)
    }

    /// Removes and returns the account at `address`.
    pub fn remove_account(&mut self, address: &str) -> MigrationResult<Account> {
        let accounts = &mut self.app_state.auth.accounts;
        let index = accounts
            .iter()
            .position(|a| a.address() == address)
            .ok_or_else(|| {
                MigrationError::NotFound(format!("{} in app_state.auth.accounts", address))
            })?;
        Ok(accounts.remove(index))
    }

    /// The module account called `name`, e.g. `bonded_tokens_pool`.
    pub fn module_account_mut(&mut self, name: &str) -> Option<&mut Account> {
        self.app_state
            .auth
            .accounts
            .iter_mut()
            .find(|a| a.kind == MODULE_ACCOUNT_TYPE && a.value.name.as_deref() == Some(name))
    }

    // -- supply ---------------------------------------------------------------

    /// Total supply of `denom`, zero if the denom has no entry.
    pub fn supply_of(&self, denom: &str) -> Amount {
        self.app_state
            .supply
            .supply
            .iter()
            .filter(|c| c.denom == denom)
            .map(|c| c.amount)
            .sum()
    }

    /// Raises the supply of `denom` by `delta`, creating the entry if needed.
    pub fn increase_supply(&mut self, denom: &str, delta: Amount) -> MigrationResult<()> {
        add_coin(&mut self.app_state.supply.supply, denom, delta)
    }

    /// Lowers the supply of `denom` by `delta`.
    pub fn decrease_supply(&mut self, denom: &str, delta: Amount) -> MigrationResult<()> {
        sub_coin(&mut self.app_state.supply.supply, denom, delta)
    }

    // -- domain registry ------------------------------------------------------

    /// The registered name `name*domain`.
    pub fn name_entry(&self, name: &str, domain: &str) -> Option<&Name> {
        self.app_state
            .domain_registry
            .names
            .iter()
            .find(|n| n.name == name && n.domain == domain)
    }

    pub fn domain(&self, name: &str) -> Option<&Domain> {
        self.app_state
            .domain_registry
            .domains
            .iter()
            .find(|d| d.name == name)
    }

    /// Sum of the genesis validators' voting power.
    pub fn total_validator_power(&self) -> Amount {
        self.validators.iter().map(|v| v.power).sum()
    }
}

/// Adds `amount` of `denom` to a coin list, merging into an existing entry.
pub fn add_coin(coins: &mut Vec<Coin>, denom: &str, amount: Amount) -> MigrationResult<()> {
    match coins.iter_mut().find(|c| c.denom == denom) {
        Some(coin) => coin.amount = coin.amount.checked_add(amount)?,
        None => coins.push(Coin {
            denom: denom.to_string(),
            amount,
        }),
    }
    Ok(())
}

/// Takes `amount` of `denom` out of a coin list.
pub fn sub_coin(coins: &mut [Coin], denom: &str, amount: Amount) -> MigrationResult<()> {
    if amount.is_zero() {
        return Ok(());
    }
    let coin = coins
        .iter_mut()
        .find(|c| c.denom == denom)
        .ok_or_else(|| MigrationError::InvariantViolation(format!("no {} to debit", denom)))?;
    coin.amount = coin.amount.checked_sub(amount)?;
    Ok(())
}

/// Serializes any JSON tree in canonical form.
pub fn canonical_json(value: &Value) -> MigrationResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
