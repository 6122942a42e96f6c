//! PhishSim Common - Shared types and utilities
//!
//! This crate provides the configuration, the error type and the typed
//! backend records shared by the PhishSim console components.

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
