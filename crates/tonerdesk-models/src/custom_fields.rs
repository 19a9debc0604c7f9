//! Custom-field definitions, stored values, and their DTOs.
//!
//! A [`CustomField`] is an administrator-defined attribute for one entity type;
//! a [`CustomFieldValue`] is the value one entity instance holds for it.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{
    Database, Decode, Encode, FromRow, Type,
    postgres::PgTypeInfo,
};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::entity::EntityKind;
use crate::ids::{CustomFieldId, CustomFieldValueId, EntityId};

/// Builds a URL-friendly slug from a display name.
///
/// Latin accents are folded to ASCII, everything is lowercased, and each run
/// of other characters becomes a single `-`.
pub fn generate_slug(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut pending_separator = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            if pending_separator && !result.is_empty() {
                result.push('-');
            }
            pending_separator = false;
            result.push(c);
        } else {
            pending_separator = true;
        }
    }

    result
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Input widget and value shape of a custom field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    Select,
    Checkbox,
    Textarea,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        FieldType::Text,
        FieldType::Number,
        FieldType::Date,
        FieldType::Select,
        FieldType::Checkbox,
        FieldType::Textarea,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Select => "select",
            FieldType::Checkbox => "checkbox",
            FieldType::Textarea => "textarea",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("Unknown field type: {}", s))
    }
}

// Stored as plain TEXT.
impl Type<sqlx::Postgres> for FieldType {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for FieldType {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for FieldType {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as Decode<'r, sqlx::Postgres>>::decode(value)?;
        raw.parse::<FieldType>().map_err(Into::into)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomField {
    pub id: CustomFieldId,
    pub entity_type: String,
    pub name: String,
    pub slug: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Choices for `select` fields.
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<serde_json::Value>,
    pub is_required: bool,
    pub order: i32,
    pub help_text: Option<String>,
    pub is_active: bool,
    pub show_in_table: bool,
    pub table_order: i32,
    pub show_in_creation_wizard: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CustomFieldValue {
    pub id: CustomFieldValueId,
    pub custom_field_id: CustomFieldId,
    pub entity_type: String,
    pub entity_id: EntityId,
    pub value: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored value joined with the slug of its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SluggedValue {
    pub slug: String,
    pub value: Option<String>,
}

// DTOs

fn validate_entity_type(entity_type: &str) -> Result<(), ValidationError> {
    let kind = EntityKind::from_tag(entity_type);
    if kind.is_definable() && kind.tag() == entity_type {
        Ok(())
    } else {
        Err(ValidationError::new("entity_type")
            .with_message("Entity type must be one of: printer, consumable, order".into()))
    }
}

fn validate_create_options(dto: &CreateCustomFieldDto) -> Result<(), ValidationError> {
    if dto.field_type == FieldType::Select && dto.options.is_none() {
        return Err(ValidationError::new("options")
            .with_message("Options are required for select fields".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
#[validate(schema(function = "validate_create_options"))]
pub struct CreateCustomFieldDto {
    #[validate(custom(function = "validate_entity_type"))]
    pub entity_type: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub options: Option<Vec<String>>,
    pub is_required: Option<bool>,
    pub order: Option<i32>,
    pub help_text: Option<String>,
    pub show_in_table: Option<bool>,
    #[validate(range(min = 0, message = "Table order must not be negative"))]
    pub table_order: Option<i32>,
    pub show_in_creation_wizard: Option<bool>,
}

/// Partial update; entity type and slug never change after creation.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateCustomFieldDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub options: Option<Vec<String>>,
    pub is_required: Option<bool>,
    pub order: Option<i32>,
    /// Absent keeps the current text, `null` clears it.
    #[serde(
        default,
        deserialize_with = "deserialize_nullable",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    #[allow(clippy::option_option)]
    pub help_text: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub show_in_table: Option<bool>,
    #[validate(range(min = 0, message = "Table order must not be negative"))]
    pub table_order: Option<i32>,
    pub show_in_creation_wizard: Option<bool>,
}

/// Keeps an explicit `null` apart from a missing key: a present key always
/// yields `Some`, so `null` becomes `Some(None)`.
fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct CustomFieldFilterParams {
    /// Only return fields for this entity type
    pub entity_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DistinctValuesResponse {
    pub values: Vec<String>,
}

/// Slug to value map for one entity, as returned alongside the entity itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct EntityCustomFieldValues {
    pub custom_field_values: BTreeMap<String, Option<String>>,
}

/// Bulk write body. Values may be any JSON scalar; `null` and `""` clear.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SetCustomFieldValuesDto {
    #[schema(value_type = Object)]
    pub custom_field_values: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SetCustomFieldValueDto {
    #[serde(default)]
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CustomFieldValueResponse {
    pub slug: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCustomFieldResponse {
    pub message: String,
    pub data: CustomField,
}
