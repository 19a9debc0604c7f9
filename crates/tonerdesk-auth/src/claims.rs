//! JWT claim structures for access tokens.

use serde::{Deserialize, Serialize};
use tonerdesk_core::Actor;
use utoipa::ToSchema;

/// JWT claims for access tokens.
///
/// The actor's permission columns are flattened into the top level, so a
/// token payload looks like the `users` row it was minted from:
///
/// ```json
/// {"sub":"17","email":"tech@example.com",
///  "page_permissions":["printers"],"location_permissions":null,
///  "read_write_permissions":["printers"],"exp":1767225600,"iat":1767222000}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    /// User ID (subject claim)
    pub sub: String,
    /// User's email address
    pub email: String,
    /// Permission record evaluated by the access policy
    #[serde(flatten)]
    pub actor: Actor,
    /// Token expiration timestamp (Unix timestamp)
    pub exp: usize,
    /// Token issued-at timestamp (Unix timestamp)
    pub iat: usize,
}
