//! NormalizeDurationFields -- starname configuration in the v0.40 dialect.
//!
//! The weave-era module stored periods as nanosecond integers and called the
//! renewal knobs `*_renew_*`. The v0.40 module wants Go duration strings and
//! `*_renewal_*`. Values already in duration form are left alone, so the
//! mutator can run twice.

use std::collections::BTreeMap;

use tracing::debug;

use super::Mutator;
use crate::error::{MigrationError, MigrationResult};
use crate::state::{ConfigValue, StateDocument};

/// Old key → new key.
const RENAMES: &[(&str, &str)] = &[
    ("account_renew_count_max", "account_renewal_count_max"),
    ("account_renew_period", "account_renewal_period"),
    ("domain_renew_count_max", "domain_renewal_count_max"),
    ("domain_renew_period", "domain_renewal_period"),
];

/// Keys holding durations, by their new names.
const DURATIONS: &[&str] = &[
    "account_grace_period",
    "account_renewal_period",
    "domain_grace_period",
    "domain_renewal_period",
];

const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Clone, Copy, Debug)]
pub struct NormalizeDurationFields;

impl Mutator for NormalizeDurationFields {
    fn name(&self) -> &'static str {
        "NormalizeDurationFields"
    }

    fn apply(&self, doc: &mut StateDocument) -> MigrationResult<()> {
        let config = &mut doc.app_state.configuration.config;

        for (old, new) in RENAMES {
            if let Some(value) = config.remove(*old) {
                debug!(from = old, to = new, "renamed configuration key");
                config.insert(new.to_string(), value);
            }
        }

        for key in DURATIONS {
            normalize(config, key)?;
        }
        Ok(())
    }
}

fn normalize(config: &mut BTreeMap<String, ConfigValue>, key: &str) -> MigrationResult<()> {
    let Some(value) = config.get_mut(key) else {
        return Ok(());
    };

    let nanos = match value {
        ConfigValue::Count(n) => *n,
        ConfigValue::Text(s) if is_duration_string(s) => return Ok(()),
        ConfigValue::Text(s) => s.parse::<u64>().map_err(|_| not_a_duration(key, s))?,
        ConfigValue::Other(v) => return Err(not_a_duration(key, &v.to_string())),
    };

    *value = ConfigValue::text(format_duration(nanos));
    Ok(())
}

fn not_a_duration(key: &str, value: &str) -> MigrationError {
    MigrationError::InvariantViolation(format!(
        "configuration.config.{} is not a duration: {}",
        key, value
    ))
}

/// `"<digits><unit>"` with a Go duration unit suffix.
fn is_duration_string(s: &str) -> bool {
    let digits = s.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == 'µ');
    digits.len() < s.len()
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit() || b == b'.')
}

/// Whole seconds where possible, nanoseconds otherwise.
fn format_duration(nanos: u64) -> String {
    if nanos % NANOS_PER_SEC == 0 {
        format!("{}s", nanos / NANOS_PER_SEC)
    } else {
        format!("{}ns", nanos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn text<'a>(doc: &'a StateDocument, key: &str) -> Option<&'a str> {
        doc.app_state.configuration.config.get(key).and_then(ConfigValue::as_str)
    }

    #[test]
    fn converts_nanoseconds_and_renames() {
        let mut doc = testing::exported();
        NormalizeDurationFields.apply(&mut doc).unwrap();

        assert_eq!(text(&doc, "account_grace_period"), Some("2592000s"));
        assert_eq!(text(&doc, "account_renewal_period"), Some("31557600s"));
        assert_eq!(text(&doc, "domain_grace_period"), Some("2592000s"));
        assert_eq!(text(&doc, "domain_renewal_period"), Some("31557600s"));

        let config = &doc.app_state.configuration.config;
        assert_eq!(config.get("account_renewal_count_max"), Some(&ConfigValue::Count(2)));
        assert_eq!(config.get("domain_renewal_count_max"), Some(&ConfigValue::Count(2)));
        for (old, _) in RENAMES {
            assert!(!config.contains_key(*old), "{} should be gone", old);
        }
        // Unrelated keys are untouched.
        assert_eq!(config.get("resources_max"), Some(&ConfigValue::Count(10)));
    }

    #[test]
    fn numeric_durations_are_accepted() {
        let mut doc = testing::exported();
        doc.app_state
            .configuration
            .config
            .insert("domain_grace_period".to_string(), ConfigValue::Count(60 * NANOS_PER_SEC));

        NormalizeDurationFields.apply(&mut doc).unwrap();
        assert_eq!(text(&doc, "domain_grace_period"), Some("60s"));
    }

    #[test]
    fn second_application_changes_nothing() {
        let mut once = testing::exported();
        NormalizeDurationFields.apply(&mut once).unwrap();
        let mut twice = once.clone();
        NormalizeDurationFields.apply(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn garbage_is_rejected() {
        let mut doc = testing::exported();
        doc.app_state
            .configuration
            .config
            .insert("account_grace_period".to_string(), ConfigValue::text("forever"));

        let err = NormalizeDurationFields.apply(&mut doc).unwrap_err();
        assert!(err.to_string().contains("account_grace_period"));
    }

    #[test]
    fn duration_formatting() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(1_814_400 * NANOS_PER_SEC), "1814400s");
        assert_eq!(format_duration(1_500_000_000), "1500000000ns");
        assert!(is_duration_string("60s"));
        assert!(is_duration_string("1.5h"));
        assert!(!is_duration_string("60"));
        assert!(!is_duration_string("s"));
    }
}
