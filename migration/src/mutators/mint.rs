//! AdjustMonetaryPolicy -- no new tokens, ever.
//!
//! Inflation and its bounds go to zero, but `goal_bonded` stays positive:
//! the v0.40 mint module divides by it on every block.

use super::Mutator;
use crate::config::{BLOCKS_PER_YEAR, DEC_ZERO, GOAL_BONDED};
use crate::error::MigrationResult;
use crate::state::StateDocument;

#[derive(Clone, Copy, Debug)]
pub struct AdjustMonetaryPolicy;

impl Mutator for AdjustMonetaryPolicy {
    fn name(&self) -> &'static str {
        "AdjustMonetaryPolicy"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let mint = &mut doc.app_state.mint;

        mint.minter.inflation = DEC_ZERO.to_string();
        mint.minter.annual_provisions = DEC_ZERO.to_string();

        mint.params.inflation_rate_change = DEC_ZERO.to_string();
        mint.params.inflation_max = DEC_ZERO.to_string();
        mint.params.inflation_min = DEC_ZERO.to_string();
        mint.params.blocks_per_year = BLOCKS_PER_YEAR.to_string();
        mint.params.goal_bonded = GOAL_BONDED.to_string();
        Ok(())
    }
}
