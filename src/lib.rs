//! stockdash: historical price analysis with technical indicators.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`], argument parsing in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
pub mod logging;
