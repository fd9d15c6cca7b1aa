//! Shared fixtures for unit tests.
//!
//! A miniature `iov-mainnet-2` export: five user accounts, the bonded pool,
//! two validators worth 100 power between them, and a starname registry in
//! which `_star1Custodian` still administers one domain and owns two names.
//! Supply matches balances exactly.

use serde_json::{json, Value};

use crate::mutators::ValidatorKey;
use crate::state::StateDocument;

pub const BLACKHOLE: &str = "star1qqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqqjewks3";
pub const CUSTODY_REMAINDER: &str = "star12uv6k3c650kvm2wpa38wwlq8azayq6tlh75d3y";
pub const CUSTODIAN: &str = "star1cw6vgl46my0pa690r8h5z4pq67mawedlqd9ukm";
pub const IOV_SAS: &str = "star1nrnx8mft8mks3l2akduxdjlf8rwqs8r9l36a78";
pub const ALICE: &str = "star1hdwwfca6v62am23uuem9fgdwa8yp06mdhv4yjh";
pub const DAVE: &str = "star1478t4fltj689nqu83vsmhz27quk7uggjwe96yk";
pub const BONDED_POOL: &str = "star1fl48vsnmsdzcv85q5d2q4z5ajdha8yu3r4gj9h";

/// 250 + 1000 + 500 + 1000 + 20 + 100_000_000
pub const TOTAL_SUPPLY: u64 = 100_002_770;

fn user(address: &str, amount: u64) -> Value {
    json!({
        "type": "cosmos-sdk/Account",
        "value": {
            "address": address,
            "coins": [{ "denom": "uiov", "amount": amount.to_string() }],
            "public_key": null,
            "account_number": "0",
            "sequence": "0"
        }
    })
}

fn validator(operator: &str, moniker: &str, tokens: u64) -> Value {
    json!({
        "operator_address": operator,
        "consensus_pubkey": format!("starvalconspub1{}", moniker),
        "jailed": false,
        "status": 2,
        "tokens": tokens.to_string(),
        "delegator_shares": format!("{}.000000000000000000", tokens),
        "description": {
            "moniker": moniker,
            "identity": "ABCDEF0123456789",
            "website": format!("https://{}.example", moniker),
            "security_contact": format!("security@{}.example", moniker),
            "details": "Running since weave."
        },
        "unbonding_height": "0",
        "unbonding_time": "1970-01-01T00:00:00Z",
        "commission": {
            "commission_rates": {
                "rate": "0.100000000000000000",
                "max_rate": "0.200000000000000000",
                "max_change_rate": "0.010000000000000000"
            },
            "update_time": "2020-10-01T00:00:00Z"
        },
        "min_self_delegation": "1"
    })
}

pub fn exported_json() -> Value {
    json!({
        "genesis_time": "2020-10-01T00:00:00Z",
        "chain_id": "iov-mainnet-2",
        "app_hash": "",
        "consensus_params": {
            "block": { "max_bytes": "22020096", "max_gas": "-1", "time_iota_ms": "1000" },
            "evidence": { "max_age": "100000", "max_num": 50 },
            "validator": { "pub_key_types": ["ed25519"] }
        },
        "validators": [
            {
                "address": "0A1B2C3D4E5F60718293A4B5C6D7E8F901234567",
                "pub_key": { "type": "tendermint/PubKeyEd25519", "value": "dmFsaWRhdG9yLW9uZS1wdWJrZXktYnl0ZXMtMzI=" },
                "power": "60",
                "name": "val1"
            },
            {
                "address": "1B2C3D4E5F60718293A4B5C6D7E8F9012345678A",
                "pub_key": { "type": "tendermint/PubKeyEd25519", "value": "dmFsaWRhdG9yLXR3by1wdWJrZXktYnl0ZXMtMzI=" },
                "power": "40",
                "name": "val2"
            }
        ],
        "app_state": {
            "auth": {
                "params": { "max_memo_characters": "256", "tx_sig_limit": "7" },
                "accounts": [
                    user(BLACKHOLE, 250),
                    user(CUSTODY_REMAINDER, 1000),
                    user(CUSTODIAN, 500),
                    user(ALICE, 1000),
                    user(DAVE, 20),
                    {
                        "type": "cosmos-sdk/ModuleAccount",
                        "value": {
                            "address": BONDED_POOL,
                            "coins": [{ "denom": "uiov", "amount": "100000000" }],
                            "public_key": null,
                            "account_number": "7",
                            "sequence": "0",
                            "name": "bonded_tokens_pool",
                            "permissions": ["burner", "staking"]
                        }
                    }
                ]
            },
            "bank": { "send_enabled": true },
            "supply": {
                "supply": [{ "denom": "uiov", "amount": TOTAL_SUPPLY.to_string() }]
            },
            "staking": {
                "params": {
                    "unbonding_time": "259200000000000",
                    "max_validators": 100,
                    "max_entries": 7,
                    "historical_entries": 0,
                    "bond_denom": "uiov"
                },
                "last_total_power": "100",
                "last_validator_powers": [
                    { "Address": "starvaloper1val1", "Power": "60" },
                    { "Address": "starvaloper1val2", "Power": "40" }
                ],
                "validators": [
                    validator("starvaloper1val1", "val1", 60_000_000),
                    validator("starvaloper1val2", "val2", 40_000_000)
                ],
                "delegations": [
                    { "delegator_address": "star1val1owner", "validator_address": "starvaloper1val1", "shares": "60000000.000000000000000000" },
                    { "delegator_address": "star1val2owner", "validator_address": "starvaloper1val2", "shares": "40000000.000000000000000000" }
                ],
                "unbonding_delegations": [],
                "redelegations": [],
                "exported": true
            },
            "distribution": {
                "params": { "community_tax": "0.020000000000000000", "withdraw_addr_enabled": true },
                "fee_pool": { "community_pool": [{ "denom": "uiov", "amount": "12.500000000000000000" }] },
                "delegator_withdraw_infos": [],
                "previous_proposer": "",
                "outstanding_rewards": [
                    { "validator_address": "starvaloper1val1", "outstanding_rewards": [{ "denom": "uiov", "amount": "3.000000000000000000" }] }
                ],
                "validator_accumulated_commissions": [],
                "validator_historical_rewards": [],
                "validator_current_rewards": [],
                "delegator_starting_infos": [],
                "validator_slash_events": []
            },
            "slashing": {
                "params": { "signed_blocks_window": "10000", "min_signed_per_window": "0.050000000000000000" },
                "signing_infos": {
                    "starvalcons1val1": {
                        "address": "starvalcons1val1",
                        "start_height": "0",
                        "index_offset": "42",
                        "jailed_until": "1970-01-01T00:00:00Z",
                        "tombstoned": false,
                        "missed_blocks_counter": "0"
                    }
                },
                "missed_blocks": { "starvalcons1val1": [] }
            },
            "mint": {
                "minter": { "inflation": "0.130000000000000000", "annual_provisions": "123.000000000000000000" },
                "params": {
                    "mint_denom": "uiov",
                    "inflation_rate_change": "0.130000000000000000",
                    "inflation_max": "0.200000000000000000",
                    "inflation_min": "0.070000000000000000",
                    "goal_bonded": "0.670000000000000000",
                    "blocks_per_year": "6311520"
                }
            },
            "gov": {
                "starting_proposal_id": "1",
                "deposit_params": {
                    "min_deposit": [{ "denom": "uiov", "amount": "10000000" }],
                    "max_deposit_period": "172800000000000"
                },
                "voting_params": { "voting_period": "172800000000000" }
            },
            "crisis": { "constant_fee": { "denom": "uiov", "amount": "1000" } },
            "configuration": {
                "config": {
                    "configurer": IOV_SAS,
                    "valid_domain_name": "^[-_a-z0-9]{4,16}$",
                    "account_grace_period": "2592000000000000",
                    "account_renew_count_max": 2,
                    "account_renew_period": "31557600000000000",
                    "domain_grace_period": "2592000000000000",
                    "domain_renew_count_max": 2,
                    "domain_renew_period": "31557600000000000",
                    "resources_max": 10,
                    "certificate_count_max": 3,
                    "certificate_size_max": "10000",
                    "metadata_size_max": "86400"
                },
                "fees": {
                    "fee_coin_denom": "uiov",
                    "fee_coin_price": "0.0000001",
                    "fee_default": "0.500000000000000000"
                }
            },
            "starname": {
                "domains": [
                    { "name": "iov", "admin": IOV_SAS, "valid_until": "1924991999", "type": "open", "broker": "" },
                    { "name": "0000", "admin": CUSTODY_REMAINDER, "valid_until": "1633046400", "type": "closed", "broker": "" }
                ],
                "accounts": [
                    { "domain": "iov", "name": "", "owner": IOV_SAS, "valid_until": "1924991999", "broker": "" },
                    { "domain": "iov", "name": "custodian", "owner": CUSTODIAN, "valid_until": "1924991999", "broker": "" },
                    { "domain": "iov", "name": "...", "owner": CUSTODY_REMAINDER, "valid_until": "1633046400", "broker": "" },
                    {
                        "domain": "iov",
                        "name": "violette",
                        "owner": ALICE,
                        "valid_until": "1633046400",
                        "resources": [{ "uri": "asset:iov", "resource": ALICE }],
                        "certificates": [],
                        "metadata_uri": "",
                        "broker": ""
                    },
                    { "domain": "0000", "name": "", "owner": CUSTODY_REMAINDER, "valid_until": "1633046400", "broker": "" }
                ]
            },
            "params": null,
            "upgrade": {}
        }
    })
}

pub fn exported() -> StateDocument {
    serde_json::from_value(exported_json()).expect("fixture should deserialize")
}

pub fn validator_key() -> ValidatorKey {
    ValidatorKey {
        moniker: "stargatenet".to_string(),
        account_address: "star1td80vcdypt2pen58jhg46f0zxdhk2p9yakujmp".to_string(),
        operator_address: "starvaloper1td80vcdypt2pen58jhg46f0zxdhk2p9y".to_string(),
        consensus_pubkey: "starvalconspub1stargatenet".to_string(),
        consensus_address: "starvalcons1stargatenet".to_string(),
        tendermint_address: "5B1F4E0C2A9D8E7F6A5B4C3D2E1F0A9B8C7D6E5F".to_string(),
        tendermint_pubkey: "c3RhcmdhdGVuZXQtcHVia2V5LWJ5dGVzLTMyLi4=".to_string(),
    }
}
