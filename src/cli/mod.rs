//! CLI command handlers

pub mod commands;

pub use commands::{check, hex_decode, install, vin_check};
