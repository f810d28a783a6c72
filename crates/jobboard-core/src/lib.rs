//! # Jobboard Core
//!
//! Turns a long-lived identity session into a short-lived API credential
//! for the job-processing backend.
//!
//! ## Components
//!
//! - **KeyProvider**: imports the RS256 signing key once and shares it
//! - **TokenMinter**: signs audience-scoped credentials with a fixed TTL
//! - **SessionPipeline**: re-mints credentials before expiry (enrich) and
//!   projects the session for the browser (expose)
//! - **CredentialVerifier**: the backend's view of a credential
//!
//! ## Invariants
//!
//! 1. `exp - iat == ttl_secs` for every minted credential
//! 2. A credential with at least `skew_secs` of validity left is never re-minted
//! 3. A failed re-mint never falls back to the previous credential

pub mod clock;
pub mod config;
pub mod error;
pub mod keys;
pub mod mint;
pub mod refresh;
pub mod types;
pub mod verify;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TokenConfig;
pub use error::{AuthError, Result};
pub use keys::{EnvKeySource, KeyProvider, KeySource, PemKeySource, SigningKey};
pub use mint::{CredentialIssuer, TokenMinter};
pub use refresh::{CredentialState, RefreshOutcome, SessionPipeline};
pub use types::{ApiClaims, ApiCredential, ClientSession, IdentitySession, MintRequest, SessionUser};
pub use verify::CredentialVerifier;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
