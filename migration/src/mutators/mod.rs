//! # Mutators
//!
//! Single-concern edits to a [`StateDocument`]. Each one is a small struct
//! implementing [`Mutator`]; parameters (addresses, keys, denoms) are fields,
//! never globals.
//!
//! ```text
//! burn.rs        -- BurnTokens: delete accounts, shrink supply
//! consensus.rs   -- UpdateConsensusParams: evidence limits for v0.40
//! ibc.rs         -- EnableCrossChainMessaging: ibc/transfer/capability
//! wasm.rs        -- InjectExecutionEngineParams: wasm defaults
//! custody.rs     -- TransferCustody: sweep _star1Custodian into custodian*iov
//! mint.rs        -- AdjustMonetaryPolicy: zero inflation
//! durations.rs   -- NormalizeDurationFields: ns integers → "Ns", renames
//! denom.rs       -- RenameDenomination: recursive denom rewrite
//! validator.rs   -- InjectDominantValidator: a validator with > 2/3 power
//! ```
//!
//! ## Ordering
//!
//! Order matters and is fixed by [`common`]. Mutators are applied through a
//! [`MutatorChain`], which audits supply conservation around every mutator
//! whose [`Effect`] says it moves balances.

pub mod burn;
pub mod consensus;
pub mod custody;
pub mod denom;
pub mod durations;
pub mod ibc;
pub mod mint;
pub mod validator;
pub mod wasm;

use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::error::MigrationResult;
use crate::state::{StateDocument, SupplyAudit};

pub use burn::BurnTokens;
pub use consensus::UpdateConsensusParams;
pub use custody::TransferCustody;
pub use denom::RenameDenomination;
pub use durations::NormalizeDurationFields;
pub use ibc::EnableCrossChainMessaging;
pub use mint::AdjustMonetaryPolicy;
pub use validator::{InjectDominantValidator, ValidatorKey};
pub use wasm::InjectExecutionEngineParams;

/// What a mutator does to the supply ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Touches no balance and no supply entry.
    Structural,
    /// Moves balances and/or supply; `supply − Σ balances` must not change.
    Balances,
    /// Renames denominations; the audit is re-based afterwards.
    Denominations,
}

/// A named, single-responsibility edit of the state document.
pub trait Mutator: Send + Sync {
    /// Stable name used in logs and invariant messages.
    fn name(&self) -> &'static str;

    /// How the mutator affects balances. Defaults to [`Effect::Structural`].
    fn effect(&self) -> Effect {
        Effect::Structural
    }

    /// Applies the edit in place.
    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()>;
}

/// An ordered list of mutators, applied with supply auditing.
#[derive(Default)]
pub struct MutatorChain {
    steps: Vec<Box<dyn Mutator>>,
}

impl MutatorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step.
    pub fn then(mut self, mutator: impl Mutator + 'static) -> Self {
        self.steps.push(Box::new(mutator));
        self
    }

    /// Appends an optional step.
    pub fn then_some(self, mutator: Option<impl Mutator + 'static>) -> Self {
        match mutator {
            Some(m) => self.then(m),
            None => self,
        }
    }

    /// Names of the steps, in application order.
    pub fn names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Applies every step in order, stopping at the first error.
    ///
    /// After any step that touches balances, supply must equal the sum of
    /// balances for every denom.
    pub fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        for step in &self.steps {
            let audit = match step.effect() {
                Effect::Balances => Some(SupplyAudit::capture(doc)),
                Effect::Structural | Effect::Denominations => None,
            };

            step.apply(doc)?;

            if step.effect() != Effect::Structural {
                let after = SupplyAudit::capture(doc);
                if let Some(before) = audit {
                    before.verify_conserved(&after, step.name())?;
                }
                after.verify_exact(step.name())?;
                debug!(mutator = step.name(), "supply exact");
            }
            info!(mutator = step.name(), accounts = doc.accounts().len(), "applied");
        }
        Ok(())
    }
}

/// The mutators every network gets, in their fixed order.
pub fn common(config: &PipelineConfig) -> MutatorChain {
    MutatorChain::new()
        .then(BurnTokens::new(config.flammable.clone()))
        .then(UpdateConsensusParams)
        .then(EnableCrossChainMessaging)
        .then(InjectExecutionEngineParams)
        .then(TransferCustody::new(
            &config.custody_source,
            config.custody_destination.clone(),
        ))
        .then(AdjustMonetaryPolicy)
        .then(NormalizeDurationFields)
}
