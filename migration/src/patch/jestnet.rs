//! Jestnet -- the chain the genesis test suite boots.
//!
//! The only difference from a mainnet export is that the first domain must
//! outlive the suite's expiry checks.

use chrono::{TimeZone, Utc};

use crate::error::{MigrationError, MigrationResult};
use crate::mutators::{Mutator, MutatorChain};
use crate::state::StateDocument;

/// Moves the first domain's expiry to 2021-10-01T00:00:01Z.
#[derive(Clone, Copy, Debug)]
pub struct ExtendFirstDomain;

impl ExtendFirstDomain {
    fn valid_until() -> MigrationResult<i64> {
        Utc.with_ymd_and_hms(2021, 10, 1, 0, 0, 1)
            .single()
            .map(|t| t.timestamp())
            .ok_or_else(|| MigrationError::InvariantViolation("bad jestnet expiry".to_string()))
    }
}

impl Mutator for ExtendFirstDomain {
    fn name(&self) -> &'static str {
        "ExtendFirstDomain"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let valid_until = Self::valid_until()?;
        let domain = doc
            .app_state
            .domain_registry
            .domains
            .first_mut()
            .ok_or_else(|| MigrationError::NotFound("app_state.starname.domains[0]".to_string()))?;
        domain.valid_until = valid_until.to_string();
        Ok(())
    }
}

pub fn mutators() -> MutatorChain {
    MutatorChain::new().then(ExtendFirstDomain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ChainPatch;
    use crate::testing;

    #[test]
    fn extends_first_domain() {
        let mut doc = testing::exported();
        doc.chain_id = "jestnet".to_string();

        ChainPatch::Jestnet.apply(&mut doc).unwrap();

        assert_eq!(doc.app_state.domain_registry.domains[0].valid_until, "1633046401");
        // The rest of the registry is left alone.
        assert_eq!(doc.app_state.domain_registry.domains[1].valid_until, "1633046400");
    }

    #[test]
    fn empty_registry_is_not_found() {
        let mut doc = testing::exported();
        doc.app_state.domain_registry.domains.clear();

        let err = ExtendFirstDomain.apply(&mut doc).unwrap_err();
        assert!(matches!(err, MigrationError::NotFound(_)));
    }
}
