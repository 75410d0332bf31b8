//! Default data directory of the node.
//!
//! Without `--base-path`, the node keeps its databases and keystore under
//! `$HOME/.fundraising`. Development chains keep using a temporary directory.

use crate::cli::{Cli, Subcommand};
use sc_cli::SharedParams;
use std::path::PathBuf;

/// Directory under the user's home holding all node data.
pub const NODE_HOME_DIR: &str = ".fundraising";

/// `$HOME/.fundraising`, if the home directory is known.
pub fn default_node_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(NODE_HOME_DIR))
}

/// Points every command that touches the database at the default node home.
pub fn apply(cli: &mut Cli) {
    let home = default_node_home();
    let shared = match &mut cli.subcommand {
        None => &mut cli.run.shared_params,
        Some(Subcommand::CheckBlock(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::ExportBlocks(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::ExportState(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::ImportBlocks(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::PurgeChain(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::Revert(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::ChainInfo(cmd)) => &mut cmd.shared_params,
        Some(Subcommand::Key(_)) | Some(Subcommand::BuildSpec(_)) => return,
    };
    apply_home(shared, home);
}

fn apply_home(shared: &mut SharedParams, home: Option<PathBuf>) {
    if shared.base_path.is_some() || shared.dev {
        return;
    }
    shared.base_path = home;
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Params {
        #[clap(flatten)]
        shared: SharedParams,
    }

    fn parse(args: &[&str]) -> SharedParams {
        Params::parse_from(std::iter::once("fundraisingd").chain(args.iter().copied())).shared
    }

    #[test]
    fn home_is_used_without_base_path() {
        let mut shared = parse(&[]);
        apply_home(&mut shared, Some(PathBuf::from("/home/user/.fundraising")));
        assert_eq!(shared.base_path, Some(PathBuf::from("/home/user/.fundraising")));
    }

    #[test]
    fn explicit_base_path_wins() {
        let mut shared = parse(&["--base-path", "/data/node"]);
        apply_home(&mut shared, Some(PathBuf::from("/home/user/.fundraising")));
        assert_eq!(shared.base_path, Some(PathBuf::from("/data/node")));
    }

    #[test]
    fn dev_chain_keeps_temporary_storage() {
        let mut shared = parse(&["--dev"]);
        apply_home(&mut shared, Some(PathBuf::from("/home/user/.fundraising")));
        assert_eq!(shared.base_path, None);
    }

    #[test]
    fn default_home_ends_with_node_dir() {
        if let Some(home) = default_node_home() {
            assert!(home.ends_with(NODE_HOME_DIR));
        }
    }
}
