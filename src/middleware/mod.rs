//! Request extractors for authentication and access checks.
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>`
//! 2. [`auth::AuthUser`] verifies the JWT and exposes the embedded actor
//! 3. Page or write-module checks run against that actor
//! 4. The handler executes if every check passes
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{AuthUser, RequireConfigWrite};
//!
//! async fn create_field(RequireConfigWrite(auth_user): RequireConfigWrite) {
//!     // Only runs when the actor may write "config"
//! }
//!
//! async fn save_printer(auth_user: AuthUser) -> Result<(), AppError> {
//!     auth_user.require_write("printers")?;
//!     Ok(())
//! }
//! ```

pub mod auth;
