//! # TonerDesk Models
//!
//! Domain models and DTOs shared by the TonerDesk API, CLI and stores.
//!
//! # Modules
//!
//! - [`custom_fields`]: custom-field definitions, stored values and DTOs
//! - [`entity`]: entity kinds and entity-type tag resolution
//! - [`ids`]: strongly-typed row ids
//!
//! # Example
//!
//! ```ignore
//! use tonerdesk_models::entity::{EntityKind, EntityRef};
//! use tonerdesk_models::ids::EntityId;
//!
//! let printer = EntityRef::new(EntityKind::Printer, EntityId::new(7));
//! assert_eq!(printer.kind.tag(), "printer");
//! ```

pub mod custom_fields;
pub mod entity;
pub mod ids;

// Re-export commonly used types at crate root for convenience
pub use custom_fields::{
    CreateCustomFieldDto, CustomField, CustomFieldFilterParams, CustomFieldValue,
    CustomFieldValueResponse, DistinctValuesResponse, EntityCustomFieldValues, FieldType,
    MessageResponse, SetCustomFieldValueDto, SetCustomFieldValuesDto, SluggedValue,
    UpdateCustomFieldDto, UpdateCustomFieldResponse, generate_slug,
};
pub use entity::{EntityKind, EntityRef, HasCustomFields};
pub use ids::{CustomFieldId, CustomFieldValueId, EntityId};
