//! Scripts for deploying and initializing the Janex smart contracts.

#![deny(missing_docs)]

pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod errors;
pub mod networks;
pub mod solidity;
pub mod utils;
