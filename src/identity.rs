//! Identity resolution: raw provider profiles in, internal identities out.
//!
//! Everything here is pure except [`IdentityIssuer`], which is the host's session-token minting
//! collaborator and is only carried through the handlers.

pub mod id_token;
pub mod issuer;
pub mod profile;
pub mod resolver;

pub use id_token::*;
pub use issuer::*;
pub use profile::*;
pub use resolver::*;
