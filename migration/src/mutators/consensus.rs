//! UpdateConsensusParams -- evidence limits in the v0.40 shape.
//!
//! Tendermint 0.34 replaced `max_age` with a duration/blocks pair and
//! dropped `max_num` in favour of `max_bytes`. Values match cosmoshub-4.

use super::Mutator;
use crate::config::{EVIDENCE_MAX_AGE_DURATION, EVIDENCE_MAX_AGE_NUM_BLOCKS, EVIDENCE_MAX_BYTES};
use crate::error::MigrationResult;
use crate::state::StateDocument;

/// Overwrites the evidence limits. Idempotent; cannot fail.
#[derive(Clone, Copy, Debug)]
pub struct UpdateConsensusParams;

impl Mutator for UpdateConsensusParams {
    fn name(&self) -> &'static str {
        "UpdateConsensusParams"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let evidence = &mut doc.consensus_params.evidence;

        evidence.max_num = None;
        evidence.max_age = None;

        evidence.max_bytes = Some(EVIDENCE_MAX_BYTES.to_string());
        evidence.max_age_duration = Some(EVIDENCE_MAX_AGE_DURATION.to_string());
        evidence.max_age_num_blocks = Some(EVIDENCE_MAX_AGE_NUM_BLOCKS.to_string());
        Ok(())
    }
}
