//! # Chain Patches
//!
//! Network-specific mutator bundles applied after the common mutators. The
//! operator picks the patch; it is never inferred from the document, and a
//! document whose `chain_id` does not match is refused before anything is
//! touched.
//!
//! ```text
//! jestnet.rs   -- fixture network: one domain expiry moved
//! testnet.rs   -- stargatenet: funded test accounts, uvoi, a dominant validator
//! mainnet.rs   -- iov-mainnet-ibc: final identity, 21-day unbonding
//! ```

pub mod jestnet;
pub mod mainnet;
pub mod testnet;

use tracing::info;

use crate::config::{JESTNET_CHAIN_ID, MAINNET_CHAIN_ID, TESTNET_CHAIN_ID};
use crate::error::{MigrationError, MigrationResult};
use crate::mutators::{MutatorChain, ValidatorKey};
use crate::state::StateDocument;

pub use testnet::{TestAccount, TestnetParams};

/// The network a migration targets.
#[derive(Clone, Debug)]
pub enum ChainPatch {
    /// The fixture chain used by the genesis test suite.
    Jestnet,
    /// The public test network.
    Testnet(TestnetParams),
    /// Production. A validator may be injected for a local boot rehearsal.
    Mainnet { validator: Option<ValidatorKey> },
}

impl ChainPatch {
    /// The `chain_id` a document must declare for this patch to apply.
    pub fn expected_chain_id(&self) -> &'static str {
        match self {
            ChainPatch::Jestnet => JESTNET_CHAIN_ID,
            ChainPatch::Testnet(_) => TESTNET_CHAIN_ID,
            ChainPatch::Mainnet { .. } => MAINNET_CHAIN_ID,
        }
    }

    /// The patch's mutators, in application order.
    pub fn mutators(&self) -> MutatorChain {
        match self {
            ChainPatch::Jestnet => jestnet::mutators(),
            ChainPatch::Testnet(params) => testnet::mutators(params),
            ChainPatch::Mainnet { validator } => mainnet::mutators(validator.clone()),
        }
    }

    /// Checks the chain identity, then applies the patch.
    pub fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let expected = self.expected_chain_id();
        if doc.chain_id != expected {
            return Err(MigrationError::WrongNetwork {
                expected: expected.to_string(),
                found: doc.chain_id.clone(),
            });
        }

        let chain = self.mutators();
        info!(chain_id = expected, steps = chain.len(), "applying chain patch");
        chain.apply(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn wrong_network_is_refused_untouched() {
        let mut doc = testing::exported();
        let snapshot = doc.clone();

        for patch in [
            ChainPatch::Jestnet,
            ChainPatch::Testnet(TestnetParams::stargatenet(testing::validator_key())),
            ChainPatch::Mainnet { validator: None },
        ] {
            let err = patch.apply(&mut doc).unwrap_err();
            match err {
                MigrationError::WrongNetwork { expected, found } => {
                    assert_eq!(expected, patch.expected_chain_id());
                    assert_eq!(found, "iov-mainnet-2");
                }
                other => panic!("expected WrongNetwork, got {other:?}"),
            }
            assert_eq!(doc, snapshot);
        }
    }

    #[test]
    fn expected_ids() {
        assert_eq!(ChainPatch::Jestnet.expected_chain_id(), "jestnet");
        assert_eq!(
            ChainPatch::Mainnet { validator: None }.expected_chain_id(),
            "iov-mainnet-ibc"
        );
    }
}
