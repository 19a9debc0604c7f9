//! # TonerDesk Auth
//!
//! Access-token handling for the TonerDesk API.
//!
//! Tokens are issued by the authentication service and carry the actor's
//! permission record, so authorization needs no database lookup:
//!
//! - [`claims`]: the [`Claims`] embedded in access tokens
//! - [`jwt`]: token creation and verification
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_auth::{create_access_token, verify_token};
//! use tonerdesk_config::JwtConfig;
//! use tonerdesk_core::Actor;
//!
//! let config = JwtConfig::from_env();
//! let actor = Actor::default().with_write_modules(["printers"]);
//!
//! let token = create_access_token("17", "tech@example.com", &actor, &config)?;
//! let claims = verify_token(&token, &config)?;
//! assert!(claims.actor.can_write("printers"));
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
