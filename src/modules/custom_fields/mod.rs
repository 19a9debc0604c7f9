//! Custom fields: administrator-defined attributes attached to printers,
//! consumables, orders and any other [`HasCustomFields`] entity.
//!
//! - [`service::CustomFieldStore`] reads and writes values through a
//!   [`repository::CustomFieldRepository`]
//! - [`admin::CustomFieldAdmin`] manages definitions
//! - [`controller`] / [`router`] expose both over HTTP
//!
//! [`HasCustomFields`]: tonerdesk_models::entity::HasCustomFields

pub mod admin;
pub mod controller;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub use memory::InMemoryCustomFieldRepository;
pub use repository::{CustomFieldRepository, PgCustomFieldRepository, StoreError};
pub use router::{init_custom_fields_router, init_entity_custom_fields_router};
pub use service::{CustomFieldStore, normalize_value};
