//! # Structural Invariants
//!
//! Two rules the document must keep:
//!
//! 1. **Supply conservation.** For every denom, `supply[denom]` equals the
//!    sum of that denom across all account balances.
//! 2. **Referential integrity.** Every name belongs to a domain that exists.
//!
//! Rule 1 is checked in two ways. The pipeline refuses an export that does
//! not satisfy it ([`check_supply`]), and every balance mutator is
//! checked twice. First its *drift* is audited: `supply − Σ balances`
//! must be the same after the step as before it, which names the
//! offending step precisely. Then the strict equality is checked again.
//! A burn lowers both sides, an injection raises both sides, a transfer
//! moves neither.

use std::collections::{BTreeMap, BTreeSet};

use super::amount::Amount;
use super::document::StateDocument;
use crate::error::{MigrationError, MigrationResult};

/// Per-denom totals of the supply list and of all account balances.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupplyAudit {
    supply: BTreeMap<String, Amount>,
    balances: BTreeMap<String, Amount>,
}

impl SupplyAudit {
    /// Takes the totals of `doc` as they are right now.
    pub fn capture(doc: &StateDocument) -> Self {
        let mut supply: BTreeMap<String, Amount> = BTreeMap::new();
        for coin in &doc.app_state.supply.supply {
            let total = supply.entry(coin.denom.clone()).or_default();
            *total = total.saturating_add(coin.amount);
        }

        let mut balances: BTreeMap<String, Amount> = BTreeMap::new();
        for coin in doc.accounts().iter().flat_map(|a| &a.value.coins) {
            let total = balances.entry(coin.denom.clone()).or_default();
            *total = total.saturating_add(coin.amount);
        }

        Self { supply, balances }
    }

    fn supply_of(&self, denom: &str) -> Amount {
        self.supply.get(denom).copied().unwrap_or_default()
    }

    fn balances_of(&self, denom: &str) -> Amount {
        self.balances.get(denom).copied().unwrap_or_default()
    }

    fn denoms<'a>(&'a self, other: &'a SupplyAudit) -> BTreeSet<&'a str> {
        self.supply
            .keys()
            .chain(self.balances.keys())
            .chain(other.supply.keys())
            .chain(other.balances.keys())
            .map(String::as_str)
            .collect()
    }

    /// Verifies that `after` has the same per-denom drift as `self`.
    ///
    /// Compared as `before.supply + after.balances == after.supply +
    /// before.balances`, which needs no signed arithmetic.
    pub fn verify_conserved(&self, after: &SupplyAudit, step: &str) -> MigrationResult<()> {
        for denom in self.denoms(after) {
            let lhs = self.supply_of(denom).checked_add(after.balances_of(denom))?;
            let rhs = after.supply_of(denom).checked_add(self.balances_of(denom))?;
            if lhs != rhs {
                return Err(MigrationError::InvariantViolation(format!(
                    "{} broke supply conservation for {}: supply {} -> {}, balances {} -> {}",
                    step,
                    denom,
                    self.supply_of(denom),
                    after.supply_of(denom),
                    self.balances_of(denom),
                    after.balances_of(denom),
                )));
            }
        }
        Ok(())
    }

    /// The audit as it would read after renaming `from` to `to`. Totals of
    /// the two denoms are merged when both were present.
    pub fn renamed(&self, from: &str, to: &str) -> SupplyAudit {
        fn rename(
            totals: &BTreeMap<String, Amount>,
            from: &str,
            to: &str,
        ) -> BTreeMap<String, Amount> {
            let mut out: BTreeMap<String, Amount> = BTreeMap::new();
            for (denom, amount) in totals {
                let key = if denom == from { to } else { denom.as_str() };
                let total = out.entry(key.to_string()).or_default();
                *total = total.saturating_add(*amount);
            }
            out
        }

        Self {
            supply: rename(&self.supply, from, to),
            balances: rename(&self.balances, from, to),
        }
    }

    /// `true` when supply equals balances for every denom.
    pub fn is_exact(&self) -> bool {
        self.denoms(self)
            .into_iter()
            .all(|d| self.supply_of(d) == self.balances_of(d))
    }

    /// Fails unless supply equals balances for every denom. `stage` names
    /// the point of the run in the error.
    pub fn verify_exact(&self, stage: &str) -> MigrationResult<()> {
        for denom in self.denoms(self) {
            if self.supply_of(denom) != self.balances_of(denom) {
                return Err(MigrationError::InvariantViolation(format!(
                    "{}: supply of {} is {} but accounts hold {}",
                    stage,
                    denom,
                    self.supply_of(denom),
                    self.balances_of(denom),
                )));
            }
        }
        Ok(())
    }
}

/// Strict supply check: `supply[denom] == Σ balances[denom]` for all denoms.
pub fn check_supply(doc: &StateDocument) -> MigrationResult<()> {
    SupplyAudit::capture(doc).verify_exact("exported state")
}

/// Every `names[i].domain` must name an existing domain.
pub fn check_domain_references(doc: &StateDocument) -> MigrationResult<()> {
    let registry = &doc.app_state.domain_registry;
    let domains: BTreeSet<&str> = registry.domains.iter().map(|d| d.name.as_str()).collect();

    match registry
        .names
        .iter()
        .find(|n| !domains.contains(n.domain.as_str()))
    {
        Some(orphan) => Err(MigrationError::InvariantViolation(format!(
            "name {:?} references missing domain {:?}",
            orphan.name, orphan.domain
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn fixture_supply_is_exact() {
        let doc = testing::exported();
        assert!(SupplyAudit::capture(&doc).is_exact());
        check_supply(&doc).unwrap();
    }

    #[test]
    fn conservation_accepts_matching_deltas() {
        let mut doc = testing::exported();
        let before = SupplyAudit::capture(&doc);

        // Burn 10 from both sides.
        let account = doc.account_mut(testing::ALICE).unwrap();
        account.value.coins[0].amount = account
            .value
            .coins[0]
            .amount
            .checked_sub(Amount::from(10))
            .unwrap();
        doc.decrease_supply("uiov", Amount::from(10)).unwrap();

        before
            .verify_conserved(&SupplyAudit::capture(&doc), "test")
            .unwrap();
    }

    #[test]
    fn conservation_rejects_one_sided_edit() {
        let mut doc = testing::exported();
        let before = SupplyAudit::capture(&doc);

        doc.increase_supply("uiov", Amount::from(1)).unwrap();

        let err = before
            .verify_conserved(&SupplyAudit::capture(&doc), "printer")
            .unwrap_err();
        assert!(err.to_string().contains("printer"));
        assert!(check_supply(&doc).is_err());
    }

    #[test]
    fn conservation_tolerates_preexisting_drift() {
        let mut doc = testing::exported();
        doc.increase_supply("uiov", Amount::from(3)).unwrap();
        let before = SupplyAudit::capture(&doc);
        assert!(!before.is_exact());

        // Alice held 1000: a proper burn keeps the drift at 3.
        doc.remove_account(testing::ALICE).unwrap();
        doc.decrease_supply("uiov", Amount::from(1000)).unwrap();
        before
            .verify_conserved(&SupplyAudit::capture(&doc), "burn")
            .unwrap();

        // A sloppy one does not.
        let before = SupplyAudit::capture(&doc);
        doc.remove_account(testing::DAVE).unwrap();
        assert!(before
            .verify_conserved(&SupplyAudit::capture(&doc), "sloppy burn")
            .is_err());
    }

    #[test]
    fn orphan_name_is_rejected() {
        let mut doc = testing::exported();
        check_domain_references(&doc).unwrap();

        doc.app_state.domain_registry.names[0].domain = "nowhere".to_string();
        let err = check_domain_references(&doc).unwrap_err();
        assert!(matches!(err, MigrationError::InvariantViolation(_)));
    }
}
