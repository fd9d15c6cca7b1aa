//! BurnTokens -- deletes accounts outright and takes their balances out of
//! the supply. There is no "burn address" on the new chain; the tokens
//! simply stop existing.

use tracing::{info, warn};

use super::{Effect, Mutator};
use crate::error::MigrationResult;
use crate::state::StateDocument;

/// Removes each listed account and shrinks supply by what it held.
#[derive(Clone, Debug)]
pub struct BurnTokens {
    addresses: Vec<String>,
}

impl BurnTokens {
    pub fn new(addresses: Vec<String>) -> Self {
        Self { addresses }
    }
}

impl Mutator for BurnTokens {
    fn name(&self) -> &'static str {
        "BurnTokens"
    }

    fn effect(&self) -> Effect {
        Effect::Balances
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        for address in &self.addresses {
            let account = doc.remove_account(address)?;

            if account.value.coins.is_empty() {
                warn!(%address, "burning an account with no coins");
            }
            for coin in &account.value.coins {
                doc.decrease_supply(&coin.denom, coin.amount)?;
                info!(%address, denom = %coin.denom, amount = %coin.amount, "burned");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MigrationError;
    use crate::state::{check_supply, Amount};
    use crate::testing;

    #[test]
    fn burns_account_and_supply() {
        let mut doc = testing::exported();
        let before = doc.accounts().len();
        let supply = doc.supply_of("uiov");

        BurnTokens::new(vec![testing::BLACKHOLE.to_string()])
            .apply(&mut doc)
            .unwrap();

        assert!(doc.account(testing::BLACKHOLE).is_none());
        assert_eq!(doc.accounts().len(), before - 1);
        assert_eq!(
            doc.supply_of("uiov"),
            supply.checked_sub(Amount::from(250)).unwrap()
        );
        check_supply(&doc).unwrap();
    }

    #[test]
    fn burns_several() {
        let mut doc = testing::exported();
        let before = doc.accounts().len();
        let burn = vec![testing::BLACKHOLE.to_string(), testing::DAVE.to_string()];

        BurnTokens::new(burn.clone()).apply(&mut doc).unwrap();

        for address in &burn {
            assert!(doc.account(address).is_none());
        }
        assert_eq!(doc.accounts().len(), before - burn.len());
        assert_eq!(
            doc.supply_of("uiov"),
            Amount::from(testing::TOTAL_SUPPLY - 250 - 20)
        );
    }

    #[test]
    fn missing_address_is_not_found() {
        let mut doc = testing::exported();
        let err = BurnTokens::new(vec!["star1ghost".to_string()])
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, MigrationError::NotFound(ref what) if what.contains("star1ghost")));
    }
}
