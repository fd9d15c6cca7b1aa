//! iov-mainnet-ibc -- production. Deliberately minimal.

use tracing::info;

use crate::config::{MAINNET_CHAIN_ID, MAINNET_UNBONDING_TIME};
use crate::error::MigrationResult;
use crate::mutators::{InjectDominantValidator, Mutator, MutatorChain, ValidatorKey};
use crate::state::StateDocument;

/// Stamps the final chain identity.
#[derive(Clone, Copy, Debug)]
pub struct SetChainId(pub &'static str);

impl Mutator for SetChainId {
    fn name(&self) -> &'static str {
        "SetChainId"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        doc.chain_id = self.0.to_string();
        Ok(())
    }
}

/// Sets the staking unbonding period (a Go duration string).
#[derive(Clone, Copy, Debug)]
pub struct SetUnbondingTime(pub &'static str);

impl Mutator for SetUnbondingTime {
    fn name(&self) -> &'static str {
        "SetUnbondingTime"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let params = &mut doc.app_state.staking.params;
        info!(from = %params.unbonding_time, to = self.0, "unbonding time");
        params.unbonding_time = self.0.to_string();
        Ok(())
    }
}

pub fn mutators(validator: Option<ValidatorKey>) -> MutatorChain {
    MutatorChain::new()
        .then(SetChainId(MAINNET_CHAIN_ID))
        .then(SetUnbondingTime(MAINNET_UNBONDING_TIME))
        .then_some(validator.map(InjectDominantValidator::new))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ChainPatch;
    use crate::state::Amount;
    use crate::testing;

    fn mainnet() -> StateDocument {
        let mut doc = testing::exported();
        doc.chain_id = MAINNET_CHAIN_ID.to_string();
        doc
    }

    #[test]
    fn sets_unbonding_time() {
        let mut doc = mainnet();
        let validators = doc.validators.len();

        ChainPatch::Mainnet { validator: None }.apply(&mut doc).unwrap();

        assert_eq!(doc.chain_id, "iov-mainnet-ibc");
        assert_eq!(doc.app_state.staking.params.unbonding_time, "1814400s");
        assert_eq!(doc.validators.len(), validators);
        // Mainnet keeps its denom.
        assert_eq!(doc.app_state.staking.params.bond_denom, "uiov");
    }

    #[test]
    fn rehearsal_validator_is_optional() {
        let mut doc = mainnet();
        let patch = ChainPatch::Mainnet {
            validator: Some(testing::validator_key()),
        };
        assert_eq!(patch.mutators().len(), 3);

        patch.apply(&mut doc).unwrap();

        assert_eq!(doc.validators.last().unwrap().power, Amount::from(400));
    }
}
