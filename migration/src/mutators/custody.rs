//! TransferCustody -- sweeps the custody remainder account into whoever owns
//! the custodian starname.
//!
//! The weave-era chain parked unclaimed tokens and starnames on a multisig.
//! Its replacement is not a fixed address: it is resolved at migration time
//! from the registry, so re-pointing `custodian*iov` before the export is
//! enough to change the destination.

use tracing::info;

use super::{Effect, Mutator};
use crate::config::NameRef;
use crate::error::{MigrationError, MigrationResult};
use crate::state::{add_coin, StateDocument};

#[derive(Clone, Debug)]
pub struct TransferCustody {
    from: String,
    destination: NameRef,
}

impl TransferCustody {
    pub fn new(from: &str, destination: NameRef) -> Self {
        Self {
            from: from.to_string(),
            destination,
        }
    }

    /// Current owner of the destination starname.
    fn resolve_destination(&self, doc: &StateDocument) -> MigrationResult<String> {
        doc.name_entry(&self.destination.name, &self.destination.domain)
            .map(|n| n.owner.clone())
            .ok_or_else(|| {
                MigrationError::NotFound(format!("{} in app_state.starname", self.destination))
            })
    }
}

impl Mutator for TransferCustody {
    fn name(&self) -> &'static str {
        "TransferCustody"
    }

    fn effect(&self) -> Effect {
        Effect::Balances
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let to = self.resolve_destination(doc)?;
        if to == self.from {
            return Err(MigrationError::InvariantViolation(format!(
                "{} is owned by the custody account itself",
                self.destination
            )));
        }
        if doc.account(&to).is_none() {
            return Err(MigrationError::NotFound(format!(
                "{} in app_state.auth.accounts",
                to
            )));
        }

        // Both sides exist; from here on nothing can fail half-way.
        let source = doc.remove_account(&self.from)?;
        let destination = doc
            .account_mut(&to)
            .ok_or_else(|| MigrationError::NotFound(format!("{} in app_state.auth.accounts", to)))?;
        for coin in &source.value.coins {
            add_coin(&mut destination.value.coins, &coin.denom, coin.amount)?;
        }

        let registry = &mut doc.app_state.domain_registry;
        let mut domains = 0usize;
        for domain in registry.domains.iter_mut().filter(|d| d.admin == self.from) {
            domain.admin = to.clone();
            domains += 1;
        }
        let mut names = 0usize;
        for name in registry.names.iter_mut().filter(|n| n.owner == self.from) {
            name.owner = to.clone();
            names += 1;
        }

        info!(from = %self.from, %to, domains, names, "custody transferred");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CUSTODIAN_DOMAIN, CUSTODIAN_NAME};
    use crate::state::Amount;
    use crate::testing;

    fn custodian() -> NameRef {
        NameRef {
            name: CUSTODIAN_NAME.to_string(),
            domain: CUSTODIAN_DOMAIN.to_string(),
        }
    }

    fn held_by(doc: &StateDocument, address: &str) -> usize {
        let registry = &doc.app_state.domain_registry;
        registry.domains.iter().filter(|d| d.admin == address).count()
            + registry.names.iter().filter(|n| n.owner == address).count()
    }

    #[test]
    fn sweeps_balance_into_custodian() {
        let mut doc = testing::exported();
        assert_eq!(
            doc.account(testing::CUSTODY_REMAINDER).unwrap().balance("uiov"),
            Amount::from(1000)
        );
        assert_eq!(
            doc.account(testing::CUSTODIAN).unwrap().balance("uiov"),
            Amount::from(500)
        );

        TransferCustody::new(testing::CUSTODY_REMAINDER, custodian())
            .apply(&mut doc)
            .unwrap();

        assert!(doc.account(testing::CUSTODY_REMAINDER).is_none());
        assert_eq!(doc.account(testing::CUSTODIAN).unwrap().balance("uiov"), Amount::from(1500));
        assert_eq!(doc.supply_of("uiov"), Amount::from(testing::TOTAL_SUPPLY));
    }

    #[test]
    fn reassigns_registry_entries() {
        let mut doc = testing::exported();
        let old = held_by(&doc, testing::CUSTODY_REMAINDER);
        let new = held_by(&doc, testing::CUSTODIAN);
        assert_eq!(old, 3);

        TransferCustody::new(testing::CUSTODY_REMAINDER, custodian())
            .apply(&mut doc)
            .unwrap();

        assert_eq!(held_by(&doc, testing::CUSTODY_REMAINDER), 0);
        assert_eq!(held_by(&doc, testing::CUSTODIAN), old + new);
        assert_eq!(doc.domain("0000").unwrap().admin, testing::CUSTODIAN);
    }

    #[test]
    fn missing_source_is_not_found() {
        let mut doc = testing::exported();
        doc.remove_account(testing::CUSTODY_REMAINDER).unwrap();

        let err = TransferCustody::new(testing::CUSTODY_REMAINDER, custodian())
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotFound(_)));
    }

    #[test]
    fn missing_destination_name_is_not_found() {
        let mut doc = testing::exported();
        doc.app_state
            .domain_registry
            .names
            .retain(|n| n.name != CUSTODIAN_NAME);
        let snapshot = doc.clone();

        let err = TransferCustody::new(testing::CUSTODY_REMAINDER, custodian())
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotFound(ref m) if m.contains("custodian*iov")));
        assert_eq!(doc, snapshot);
    }

    #[test]
    fn missing_destination_account_leaves_document_alone() {
        let mut doc = testing::exported();
        doc.remove_account(testing::CUSTODIAN).unwrap();
        let snapshot = doc.clone();

        let err = TransferCustody::new(testing::CUSTODY_REMAINDER, custodian())
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotFound(_)));
        assert_eq!(doc, snapshot);
    }
}
