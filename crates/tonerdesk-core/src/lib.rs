//! # TonerDesk Core
//!
//! Foundational pieces shared by every TonerDesk crate:
//!
//! - [`access`]: the access policy evaluator and the [`Actor`] permission record
//! - [`errors`]: application error type with HTTP response conversion
//! - [`permissions`]: well-known page and module names
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_core::{Actor, AppError, permissions};
//!
//! fn ensure_config_write(actor: &Actor) -> Result<(), AppError> {
//!     if !actor.can_write(permissions::MODULE_CONFIG) {
//!         return Err(AppError::forbidden("Read-only access to config"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod access;
pub mod errors;
pub mod permissions;

// Re-export commonly used types at crate root
pub use access::{
    Actor, LocationPermissions, can_access_page, can_view_department, can_view_province,
    can_view_site, can_write,
};
pub use errors::AppError;
