//! Mining module - coinbase transaction assembly

mod miner;

pub use miner::*;
