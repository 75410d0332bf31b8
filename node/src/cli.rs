use sc_cli::RunCmd;

/// Executable name, also used as the implementation name in telemetry.
pub const APP_NAME: &str = "fundraisingd";

/// Shortest accepted `--block-time`. The timestamp pallet rejects blocks
/// closer together than its minimum period.
pub const MIN_BLOCK_TIME: u64 = fundraising_runtime::SLOT_DURATION / 2;

#[derive(Debug, clap::Parser)]
pub struct Cli {
    #[command(subcommand)]
    pub subcommand: Option<Subcommand>,

    #[clap(flatten)]
    pub run: RunCmd,

    /// Milliseconds between two blocks authored by this node.
    ///
    /// Only used when the node runs as an authority (`--validator` or `--dev`).
    #[arg(
        long,
        value_name = "MILLIS",
        default_value_t = fundraising_runtime::MILLI_SECS_PER_BLOCK,
        value_parser = clap::value_parser!(u64).range(MIN_BLOCK_TIME..)
    )]
    pub block_time: u64,
}

#[derive(Debug, clap::Subcommand)]
#[allow(clippy::large_enum_variant)]
pub enum Subcommand {
    /// Key management cli utilities
    #[command(subcommand)]
    Key(sc_cli::KeySubcommand),

    /// Build a chain specification.
    BuildSpec(sc_cli::BuildSpecCmd),

    /// Validate blocks.
    CheckBlock(sc_cli::CheckBlockCmd),

    /// Export blocks.
    ExportBlocks(sc_cli::ExportBlocksCmd),

    /// Export the state of a given block into a chain spec.
    ExportState(sc_cli::ExportStateCmd),

    /// Import blocks.
    ImportBlocks(sc_cli::ImportBlocksCmd),

    /// Remove the whole chain.
    PurgeChain(sc_cli::PurgeChainCmd),

    /// Revert the chain to a previous state.
    Revert(sc_cli::RevertCmd),

    /// Db meta columns information.
    ChainInfo(sc_cli::ChainInfoCmd),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn block_time_defaults_to_the_runtime_block_time() {
        let cli = Cli::try_parse_from(["fundraisingd"]).unwrap();
        assert_eq!(cli.block_time, fundraising_runtime::MILLI_SECS_PER_BLOCK);
    }

    #[test]
    fn block_time_below_the_minimum_period_is_rejected() {
        assert!(Cli::try_parse_from(["fundraisingd", "--block-time", "0"]).is_err());
        assert!(Cli::try_parse_from(["fundraisingd", "--block-time", "2999"]).is_err());

        let cli = Cli::try_parse_from(["fundraisingd", "--block-time", "3000"]).unwrap();
        assert_eq!(cli.block_time, MIN_BLOCK_TIME);
    }
}
