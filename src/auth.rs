//! Credential management: scheme dispatch, token state, and OAuth 2.0 renewal.

pub mod manager;
pub mod metrics;
pub mod secret;
pub mod state;

mod token_endpoint;

pub use manager::*;
pub use metrics::*;
pub use secret::*;
pub use state::*;
