//! Genesis presets: endowed dev accounts, two sufficient assets for running
//! auctions against, and the default fundraising parameters.

use crate::{
    AccountId, AssetId, AssetsConfig, Balance, BalancesConfig, FundraisingConfig,
    RuntimeGenesisConfig, SudoConfig, UNIT,
};
use alloc::{vec, vec::Vec};
use frame_support::build_struct_json_patch;
use serde_json::Value;
use sp_genesis_builder::{self, PresetId};
use sp_keyring::Sr25519Keyring;

/// Token offered in the sample auctions.
pub const OFFERING_ASSET: AssetId = 1;
/// Stable coin bidders pay with.
pub const PAYING_ASSET: AssetId = 2;

const ENDOWMENT: Balance = 1_000_000 * UNIT;
const ASSET_ENDOWMENT: Balance = 10_000_000 * UNIT;

fn fundraising_genesis(endowed_accounts: Vec<AccountId>, root: AccountId) -> Value {
    let endowments: Vec<(AccountId, Balance)> =
        endowed_accounts.iter().cloned().map(|account| (account, ENDOWMENT)).collect();

    // The auctioneer holds the offering token, everybody else the paying one.
    let mut asset_accounts = vec![(OFFERING_ASSET, root.clone(), ASSET_ENDOWMENT)];
    asset_accounts.extend(
        endowed_accounts
            .iter()
            .filter(|account| **account != root)
            .cloned()
            .map(|account| (PAYING_ASSET, account, ASSET_ENDOWMENT)),
    );

    build_struct_json_patch!(RuntimeGenesisConfig {
        balances: BalancesConfig { balances: endowments },
        sudo: SudoConfig { key: Some(root.clone()) },
        assets: AssetsConfig {
            assets: vec![(OFFERING_ASSET, root.clone(), true, 1), (PAYING_ASSET, root.clone(), true, 1)],
            metadata: vec![
                (OFFERING_ASSET, b"Fundraising Token".to_vec(), b"FUND".to_vec(), 12),
                (PAYING_ASSET, b"Stable Coin".to_vec(), b"USDX".to_vec(), 12),
            ],
            accounts: asset_accounts,
        },
        fundraising: FundraisingConfig {
            auction_creation_fee: 100 * UNIT,
            place_bid_fee: UNIT,
            extended_period: pallet_fundraising::DEFAULT_EXTENDED_PERIOD,
        },
    })
}

fn dev_accounts() -> Vec<AccountId> {
    vec![
        Sr25519Keyring::Alice.to_account_id(),
        Sr25519Keyring::Bob.to_account_id(),
        Sr25519Keyring::Charlie.to_account_id(),
        Sr25519Keyring::Dave.to_account_id(),
        Sr25519Keyring::Eve.to_account_id(),
    ]
}

/// Development genesis config - for local testing
pub fn development_config_genesis() -> Value {
    fundraising_genesis(dev_accounts(), Sr25519Keyring::Alice.to_account_id())
}

/// Local testnet genesis config
pub fn local_config_genesis() -> Value {
    let mut accounts = dev_accounts();
    accounts.push(Sr25519Keyring::Ferdie.to_account_id());
    fundraising_genesis(accounts, Sr25519Keyring::Alice.to_account_id())
}

/// Provides the JSON representation of predefined genesis config for given `id`.
pub fn get_preset(id: &PresetId) -> Option<Vec<u8>> {
    let patch = match id.as_ref() {
        sp_genesis_builder::DEV_RUNTIME_PRESET => development_config_genesis(),
        sp_genesis_builder::LOCAL_TESTNET_RUNTIME_PRESET => local_config_genesis(),
        _ => return None,
    };
    serde_json::to_string(&patch).ok().map(|json| json.into_bytes())
}

/// List of supported presets.
pub fn preset_names() -> Vec<PresetId> {
    vec![
        PresetId::from(sp_genesis_builder::DEV_RUNTIME_PRESET),
        PresetId::from(sp_genesis_builder::LOCAL_TESTNET_RUNTIME_PRESET),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_listed_preset_builds() {
        for name in preset_names() {
            let json = get_preset(&name).expect("listed preset exists");
            let patch: Value = serde_json::from_slice(&json).unwrap();
            assert!(patch["fundraising"]["extendedPeriod"].is_u64());
            assert_eq!(patch["assets"]["assets"].as_array().map(|a| a.len()), Some(2));
        }
        assert!(get_preset(&PresetId::from("unknown")).is_none());
    }
}
