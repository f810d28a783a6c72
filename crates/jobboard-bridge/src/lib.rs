//! Identity Bridge
//!
//! Turns identity-provider profiles into identities that may hold a
//! dashboard session. The OAuth handshake itself is done by the provider
//! library; this crate only sees the resulting profile document.
//!
//! Sign-in is refused when the profile carries no email address.
//!
//! ```ignore
//! use jobboard_bridge::{handlers::*, IdentityBridgeBuilder, ProviderKind};
//!
//! let bridge = IdentityBridgeBuilder::new()
//!     .with_handler(GoogleHandler::new())
//!     .with_handler(GitHubHandler::new())
//!     .build();
//!
//! let identity = bridge.sign_in(ProviderKind::GitHub, &profile)?;
//! ```

pub mod bridge;
pub mod error;
pub mod handlers;
pub mod types;

pub use bridge::{IdentityBridge, IdentityBridgeBuilder, ProfileHandler};
pub use error::{BridgeError, Result};
pub use types::{ProviderKind, VerifiedIdentity};

/// Bridge with every production provider registered
pub fn default_bridge() -> IdentityBridge {
    IdentityBridgeBuilder::new()
        .with_handler(handlers::GoogleHandler::new())
        .with_handler(handlers::GitHubHandler::new())
        .build()
}
