//! Transaction model - structure, binary format and extra records

pub mod extra;
mod transaction;

pub use transaction::*;
