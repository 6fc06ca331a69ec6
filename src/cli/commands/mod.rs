//! Command implementations for the keyrace CLI

pub mod config;
pub mod run;
