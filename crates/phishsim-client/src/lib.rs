//! PhishSim Client - REST backend access
//!
//! The console never talks to the backend except through the [`Backend`]
//! trait; [`ApiClient`] is its HTTP implementation.

mod backend;
mod client;

pub use backend::Backend;
pub use client::{ApiClient, ApiClientConfig};
