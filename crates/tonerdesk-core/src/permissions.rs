//! Well-known page and module names.
//!
//! Page names are the screens guarding entity and configuration reads;
//! module names are the write scopes checked by the HTTP handlers. The
//! evaluator in [`crate::access`] compares plain strings and gives none of
//! these any special meaning.
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_core::permissions;
//!
//! if actor.can_write(permissions::MODULE_CONFIG) {
//!     // Create a custom field
//! }
//! ```

// =============================================================================
// Pages
// =============================================================================

pub const PAGE_PRINTERS: &str = "printers";
pub const PAGE_INVENTORY: &str = "inventory";
pub const PAGE_ORDERS: &str = "orders";
/// Configuration screens, including custom-field administration.
pub const PAGE_CONFIG: &str = "config";

// =============================================================================
// Write modules
// =============================================================================

pub const MODULE_PRINTERS: &str = "printers";
pub const MODULE_CONSUMABLES: &str = "consumables";
pub const MODULE_ORDERS: &str = "orders";
/// Custom-field definitions and other configuration records.
pub const MODULE_CONFIG: &str = "config";
