//! Consensus module - versions, rewards, blocks, fusion, proof of work and difficulty

mod amounts;
mod block;
mod difficulty;
mod fusion;
mod pow;
mod rewards;
mod upgrades;

pub use amounts::*;
pub use block::*;
pub use difficulty::*;
pub use fusion::*;
pub use pow::*;
pub use rewards::*;
pub use upgrades::*;
