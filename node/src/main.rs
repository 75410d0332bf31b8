//! Fundraising Chain Node
//!
//! Runs a chain whose runtime sells tokens through fixed price and batch
//! auctions.
//!
//! ## Usage
//!
//! Start a single-node development chain that authors its own blocks:
//! ```bash
//! fundraisingd --dev
//! ```
//!
//! Export the default chain specification:
//! ```bash
//! fundraisingd build-spec --chain fundraising > fundraising.json
//! ```

#![warn(missing_docs)]

mod authoring;
mod chain_spec;
mod cli;
mod command;
mod node_home;
mod rpc;
mod service;

fn main() {
    if let Err(e) = command::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1)
    }
}
