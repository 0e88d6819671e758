//! Provider configuration and provider-family presets.
//!
//! `config` holds the validated, immutable [`ProviderConfig`] consumed by the strategy adapter.
//! `preset` supplies endpoint defaults for known provider families so only credentials and the
//! callback URL have to be configured for them.

pub mod config;
pub mod preset;

pub use config::*;
pub use preset::*;
