//! Interval block authoring.
//!
//! The authority proposes a block on top of the best block every `block_time`
//! and imports it straight into the client. Blocks carry no seal; the import
//! queue trusts whatever the authority produced.

use crate::service::FullClient;
use fundraising_runtime::{opaque::Block, BlockNumber};
use sc_consensus::{BlockImport, BlockImportParams, ForkChoiceStrategy, StateAction, StorageChanges};
use sp_consensus::{BlockOrigin, Environment, Proposer, SelectChain};
use sp_runtime::{
    generic::Digest,
    traits::{Block as BlockT, Header as HeaderT},
};
use std::{sync::Arc, time::Duration};
use tokio::time::MissedTickBehavior;

const LOG_TARGET: &str = "authoring";

/// A failed authoring attempt. The next tick tries again.
#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    #[error("Failed to fetch the best block: {0}")]
    BestChain(String),

    #[error("Failed to create inherent data: {0}")]
    Inherents(String),

    #[error("Failed to create proposer: {0}")]
    Proposer(String),

    #[error("Failed to propose block: {0}")]
    Propose(String),

    #[error("Failed to import block #{0}: {1}")]
    Import(BlockNumber, String),
}

/// Authors a block every `block_time` until the node shuts down.
pub async fn authoring_loop<PF, SC>(
    client: Arc<FullClient>,
    mut proposer_factory: PF,
    select_chain: SC,
    block_time: Duration,
) where
    PF: Environment<Block> + Send + 'static,
    PF::Proposer: Proposer<Block>,
    SC: SelectChain<Block> + 'static,
{
    log::info!(target: LOG_TARGET, "Authoring a block every {} ms", block_time.as_millis());

    let mut interval = tokio::time::interval(block_time);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        match author_block(&client, &mut proposer_factory, &select_chain, block_time).await {
            Ok((number, extrinsics)) => log::info!(
                target: LOG_TARGET,
                "Authored block #{} with {} extrinsics",
                number,
                extrinsics
            ),
            Err(e) => log::warn!(target: LOG_TARGET, "{}", e),
        }
    }
}

/// Proposes one block on top of the best block and imports it.
///
/// Returns the new block number and its extrinsic count.
async fn author_block<PF, SC>(
    client: &Arc<FullClient>,
    proposer_factory: &mut PF,
    select_chain: &SC,
    block_time: Duration,
) -> Result<(BlockNumber, usize), AuthoringError>
where
    PF: Environment<Block>,
    PF::Proposer: Proposer<Block>,
    SC: SelectChain<Block>,
{
    let parent = select_chain
        .best_chain()
        .await
        .map_err(|e| AuthoringError::BestChain(e.to_string()))?;

    let timestamp = sp_timestamp::InherentDataProvider::from_system_time();
    let mut inherent_data = sp_inherents::InherentData::new();
    inherent_data
        .put_data(sp_timestamp::INHERENT_IDENTIFIER, &timestamp.timestamp())
        .map_err(|e| AuthoringError::Inherents(e.to_string()))?;

    let proposer = proposer_factory
        .init(&parent)
        .await
        .map_err(|e| AuthoringError::Proposer(e.to_string()))?;

    // Leave half of the interval for import and propagation.
    let proposal = proposer
        .propose(inherent_data, Digest::default(), block_time / 2, None)
        .await
        .map_err(|e| AuthoringError::Propose(e.to_string()))?;

    let (header, body) = proposal.block.deconstruct();
    let number = *header.number();
    let extrinsics = body.len();

    let mut import_params = BlockImportParams::new(BlockOrigin::Own, header);
    import_params.body = Some(body);
    import_params.fork_choice = Some(ForkChoiceStrategy::LongestChain);
    import_params.state_action =
        StateAction::ApplyChanges(StorageChanges::Changes(proposal.storage_changes));

    client
        .import_block(import_params)
        .await
        .map_err(|e| AuthoringError::Import(number, e.to_string()))?;

    Ok((number, extrinsics))
}
