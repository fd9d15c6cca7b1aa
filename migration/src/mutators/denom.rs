//! RenameDenomination -- rewrites one denomination to another everywhere in
//! the document.
//!
//! Coins hide at arbitrary depth (distribution rewards, gov deposits,
//! module params), so this walks the whole JSON tree instead of a list of
//! known paths. Only string values sitting under a `denom` key, or a key
//! ending in `_denom`, are touched; a memo or a URI that happens to contain
//! the old denom stays as it is.
//!
//! If the target denom already exists in a coin list, the two entries are
//! merged additively so the list keeps one coin per denom.

use serde_json::Value;
use tracing::info;

use super::{Effect, Mutator};
use crate::error::{MigrationError, MigrationResult};
use crate::state::{Amount, StateDocument, SupplyAudit};

#[derive(Clone, Debug)]
pub struct RenameDenomination {
    from: String,
    to: String,
}

impl RenameDenomination {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    /// Rewrites matching denom tags under `value`, returning how many
    /// were rewritten.
    fn rewrite(&self, value: &mut Value) -> MigrationResult<usize> {
        let mut rewritten = 0;
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter_mut() {
                    if is_denom_key(key) {
                        if let Value::String(denom) = child {
                            if *denom == self.from {
                                *denom = self.to.clone();
                                rewritten += 1;
                            }
                            continue;
                        }
                    }
                    rewritten += self.rewrite(child)?;
                }
            }
            Value::Array(items) => {
                for item in items.iter_mut() {
                    rewritten += self.rewrite(item)?;
                }
                if rewritten > 0 {
                    merge_coins(items, &self.to)?;
                }
            }
            _ => {}
        }
        Ok(rewritten)
    }
}

fn is_denom_key(key: &str) -> bool {
    key == "denom" || key.ends_with("_denom")
}

/// Folds every `{denom, amount}` entry of `denom` in `items` into the first.
fn merge_coins(items: &mut Vec<Value>, denom: &str) -> MigrationResult<()> {
    let coins: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| {
            item.get("denom").and_then(Value::as_str) == Some(denom) && item.get("amount").is_some()
        })
        .map(|(i, _)| i)
        .collect();

    let [first, rest @ ..] = coins.as_slice() else {
        return Ok(());
    };
    if rest.is_empty() {
        return Ok(());
    }

    let mut total = Amount::ZERO;
    for &i in &coins {
        let amount: Amount = serde_json::from_value(items[i]["amount"].clone()).map_err(|_| {
            MigrationError::InvariantViolation(format!(
                "cannot merge {} coins with amount {}",
                denom, items[i]["amount"]
            ))
        })?;
        total = total.checked_add(amount)?;
    }

    items[*first]["amount"] = Value::String(total.to_string());
    for &i in rest.iter().rev() {
        items.remove(i);
    }
    Ok(())
}

impl Mutator for RenameDenomination {
    fn name(&self) -> &'static str {
        "RenameDenomination"
    }

    fn effect(&self) -> Effect {
        Effect::Denominations
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let before = SupplyAudit::capture(doc);

        let mut tree = doc.to_value()?;
        let rewritten = self.rewrite(&mut tree)?;
        *doc = serde_json::from_value(tree)?;

        before
            .renamed(&self.from, &self.to)
            .verify_conserved(&SupplyAudit::capture(doc), self.name())?;

        info!(from = %self.from, to = %self.to, rewritten, "denomination renamed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{check_supply, Coin};
    use crate::testing;
    use serde_json::json;

    fn denom_tags(value: &Value, denom: &str) -> usize {
        match value {
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) if is_denom_key(k) && s == denom => 1,
                    other => denom_tags(other, denom),
                })
                .sum(),
            Value::Array(items) => items.iter().map(|v| denom_tags(v, denom)).sum(),
            _ => 0,
        }
    }

    fn balance_entries(doc: &StateDocument) -> usize {
        doc.accounts().iter().map(|a| a.value.coins.len()).sum()
    }

    #[test]
    fn no_old_tag_survives() {
        let mut doc = testing::exported();
        let entries = balance_entries(&doc);
        assert!(denom_tags(&doc.to_value().unwrap(), "uiov") > 0);

        RenameDenomination::new("uiov", "uvoi").apply(&mut doc).unwrap();

        let tree = doc.to_value().unwrap();
        assert_eq!(denom_tags(&tree, "uiov"), 0);
        assert_eq!(balance_entries(&doc), entries);
        assert_eq!(doc.app_state.mint.params.mint_denom, "uvoi");
        assert_eq!(doc.app_state.staking.params.bond_denom, "uvoi");
        let rewards = &tree["app_state"]["distribution"]["outstanding_rewards"][0];
        assert_eq!(rewards["outstanding_rewards"][0]["denom"], "uvoi");
        assert_eq!(tree["app_state"]["configuration"]["fees"]["fee_coin_denom"], "uvoi");
        check_supply(&doc).unwrap();
    }

    #[test]
    fn leaves_lookalike_strings_alone() {
        let mut doc = testing::exported();
        doc.extra.insert("memo".to_string(), json!("pay me in uiov"));
        doc.app_state.domain_registry.names[0].owner = "uiov".to_string();

        RenameDenomination::new("uiov", "uvoi").apply(&mut doc).unwrap();

        assert_eq!(doc.extra["memo"], "pay me in uiov");
        assert_eq!(doc.app_state.domain_registry.names[0].owner, "uiov");
    }

    #[test]
    fn merges_colliding_coins() {
        let mut doc = testing::exported();
        doc.account_mut(testing::ALICE)
            .unwrap()
            .value
            .coins
            .push(Coin::new("uvoi", 5u64));
        doc.increase_supply("uvoi", Amount::from(5)).unwrap();

        RenameDenomination::new("uiov", "uvoi").apply(&mut doc).unwrap();

        let alice = doc.account(testing::ALICE).unwrap();
        assert_eq!(alice.value.coins, vec![Coin::new("uvoi", 1005u64)]);
        assert_eq!(doc.app_state.supply.supply.len(), 1);
        assert_eq!(doc.supply_of("uvoi"), Amount::from(testing::TOTAL_SUPPLY + 5));
    }

    #[test]
    fn merges_deeply_nested_lists() {
        let mut value = json!({
            "a": [{ "b": [{ "denom": "x", "amount": "1" }, { "denom": "y", "amount": "2" }] }]
        });
        let n = RenameDenomination::new("x", "y").rewrite(&mut value).unwrap();
        assert_eq!(n, 1);
        assert_eq!(value, json!({ "a": [{ "b": [{ "denom": "y", "amount": "3" }] }] }));
    }
}
