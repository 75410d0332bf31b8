//! Chain specifications of the fundraising chain.

use fundraising_runtime::{SS58_PREFIX, WASM_BINARY};
use sc_service::{ChainType, Properties};

/// Specialized `ChainSpec` for the fundraising chain.
pub type ChainSpec = sc_service::GenericChainSpec;

/// Chain id used when `--chain` is left empty.
pub const DEFAULT_CHAIN_ID: &str = "fundraising";

fn properties() -> Properties {
    let mut properties = Properties::new();
    properties.insert("tokenSymbol".into(), "UNIT".into());
    properties.insert("tokenDecimals".into(), 12.into());
    properties.insert("ss58Format".into(), SS58_PREFIX.into());
    properties
}

fn wasm_binary() -> Result<&'static [u8], String> {
    WASM_BINARY.ok_or_else(|| "Runtime wasm not available".to_string())
}

/// Development chain specification (single node, authors every block)
pub fn development_chain_spec() -> Result<ChainSpec, String> {
    Ok(ChainSpec::builder(wasm_binary()?, None)
        .with_name("Fundraising Development")
        .with_id("fundraising_dev")
        .with_chain_type(ChainType::Development)
        .with_properties(properties())
        .with_genesis_config_preset_name(sp_genesis_builder::DEV_RUNTIME_PRESET)
        .build())
}

/// Local testnet chain specification (multiple nodes)
pub fn local_chain_spec() -> Result<ChainSpec, String> {
    Ok(ChainSpec::builder(wasm_binary()?, None)
        .with_name("Fundraising Local Testnet")
        .with_id("fundraising_local")
        .with_chain_type(ChainType::Local)
        .with_properties(properties())
        .with_genesis_config_preset_name(sp_genesis_builder::LOCAL_TESTNET_RUNTIME_PRESET)
        .build())
}

/// The chain behind [`DEFAULT_CHAIN_ID`].
pub fn fundraising_chain_spec() -> Result<ChainSpec, String> {
    Ok(ChainSpec::builder(wasm_binary()?, None)
        .with_name("Fundraising")
        .with_id(DEFAULT_CHAIN_ID)
        .with_chain_type(ChainType::Live)
        .with_properties(properties())
        .with_genesis_config_preset_name(sp_genesis_builder::LOCAL_TESTNET_RUNTIME_PRESET)
        .build())
}
