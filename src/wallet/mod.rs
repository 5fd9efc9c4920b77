//! Wallet module - account addresses and their text encoding

mod address;
pub mod base58;

pub use address::*;
