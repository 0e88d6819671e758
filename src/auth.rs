//! Identifiers, secrets, and the transient result types exchanged with the host.

pub mod id;
pub mod response;
pub mod secret;

pub use id::*;
pub use response::*;
pub use secret::*;
